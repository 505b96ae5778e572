//! Calm News - a politics-free RSS aggregator
//!
//! This crate fetches a fixed set of categorized RSS/Atom feeds, drops
//! politically-themed items by keyword, caches the merged result for a time
//! window and serves it as JSON to a small browser client.

pub mod aggregator;
pub mod cache;
pub mod classifier;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod models;
pub mod routes;
