//! Post summary and entry models

use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;

/// Display-ready summary of a content record
///
/// Built once per read from the content store and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    slug: String,
    title: String,
    description: String,
    date: NaiveDate,
}

impl Post {
    pub fn new(slug: String, title: String, description: String, date: NaiveDate) -> Self {
        Self {
            slug,
            title,
            description,
            date,
        }
    }

    /// URL-safe identifier, unique within its category
    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Publication date, the listing order key
    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

/// A post summary together with its markdown body
#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    pub post: Post,

    /// Raw markdown after the front-matter
    pub body: String,
}

/// Listing order: newest first, ties by slug so listings are stable
pub fn newest_first(a: &Post, b: &Post) -> Ordering {
    b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(slug: &str, date: &str) -> Post {
        Post::new(
            slug.to_string(),
            slug.to_uppercase(),
            String::new(),
            date.parse().unwrap(),
        )
    }

    #[test]
    fn test_sort_newest_first() {
        let mut posts = vec![
            post("a", "2024-01-01"),
            post("b", "2024-03-01"),
            post("c", "2024-02-01"),
        ];
        posts.sort_by(newest_first);
        let slugs: Vec<_> = posts.iter().map(Post::slug).collect();
        assert_eq!(slugs, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_same_day_ordered_by_slug() {
        let mut posts = vec![post("zeta", "2024-05-05"), post("alpha", "2024-05-05")];
        posts.sort_by(newest_first);
        assert_eq!(posts[0].slug(), "alpha");
    }

    #[test]
    fn test_serializes_iso_date() {
        let json = serde_json::to_value(post("hello", "2024-01-15")).unwrap();
        assert_eq!(json["date"], "2024-01-15");
        assert_eq!(json["slug"], "hello");
    }
}
