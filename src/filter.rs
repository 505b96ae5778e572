use crate::models::NewsItem;

/// Narrow `items` to the requested categories. An empty request means all.
pub fn filter_by_categories<S: AsRef<str>>(items: &[NewsItem], requested: &[S]) -> Vec<NewsItem> {
    if requested.is_empty() {
        return items.to_vec();
    }

    items
        .iter()
        .filter(|item| requested.iter().any(|c| c.as_ref() == item.category))
        .cloned()
        .collect()
}

/// Split the `categories` query parameter. Keys are not validated: an unknown
/// key just matches nothing.
pub fn parse_categories(param: Option<&str>) -> Vec<String> {
    param
        .unwrap_or("")
        .split(',')
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}
