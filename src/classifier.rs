use crate::models::NewsItem;

/// Keyword classifier for politically-themed stories.
///
/// Matching is a plain substring search over the lower-cased text, so a term
/// like `vote` also matches `devoted`.
#[derive(Debug, Clone)]
pub struct Classifier {
    terms: Vec<String>,
}

impl Classifier {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms = terms
            .into_iter()
            .map(|term| term.as_ref().to_lowercase())
            .filter(|term| !term.trim().is_empty())
            .collect();
        Self { terms }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn is_political(&self, item: &NewsItem) -> bool {
        self.is_political_text(item.title.as_deref(), item.content.as_deref())
    }

    /// An item with neither title nor body is never political.
    pub fn is_political_text(&self, title: Option<&str>, body: Option<&str>) -> bool {
        let text = format!("{} {}", title.unwrap_or(""), body.unwrap_or("")).to_lowercase();
        if text.trim().is_empty() {
            return false;
        }
        self.terms.iter().any(|term| text.contains(term.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_political_terms;

    fn classifier() -> Classifier {
        Classifier::new(default_political_terms())
    }

    fn item(title: Option<&str>, content: Option<&str>) -> NewsItem {
        NewsItem {
            title: title.map(String::from),
            link: None,
            pub_date: None,
            content: content.map(String::from),
            source: "Test".to_string(),
            category: "tech".to_string(),
        }
    }

    #[test]
    fn test_plain_tech_story_passes() {
        assert!(!classifier().is_political(&item(Some("AI breakthrough announced"), None)));
    }

    #[test]
    fn test_title_match() {
        assert!(classifier().is_political(&item(Some("Senate votes on policy"), None)));
    }

    #[test]
    fn test_body_match() {
        let story = item(
            Some("New chip fab opens"),
            Some("Funding came from a government grant."),
        );
        assert!(classifier().is_political(&story));
    }

    #[test]
    fn test_match_is_case_insensitive() {
        assert!(classifier().is_political(&item(Some("PRESIDENT visits lab"), None)));
    }

    #[test]
    fn test_substring_semantics_are_preserved() {
        // "devoted" contains "vote"
        assert!(classifier().is_political(&item(Some("A devoted maker community"), None)));
    }

    #[test]
    fn test_empty_item_fails_open() {
        assert!(!classifier().is_political(&item(None, None)));
        assert!(!classifier().is_political(&item(Some(""), Some(""))));
    }

    #[test]
    fn test_term_does_not_span_title_and_body() {
        // "vo" + " " + "te" must not produce a match
        let c = Classifier::new(["vote"]);
        assert!(!c.is_political_text(Some("bravo"), Some("temperature")));
    }

    #[test]
    fn test_custom_terms_are_lowercased() {
        let c = Classifier::new(["Tariff", ""]);
        assert_eq!(c.terms(), &["tariff".to_string()]);
        assert!(c.is_political_text(Some("New tariffs on GPUs"), None));
    }

    #[test]
    fn test_blank_terms_never_match() {
        let c = Classifier::new(["  ", "\t", "senate"]);
        assert_eq!(c.terms(), &["senate".to_string()]);
        assert!(!c.is_political_text(Some("double  space"), Some("tab\tseparated")));
        assert!(!c.is_political_text(Some("Chip news"), Some("fast chips")));
    }
}
