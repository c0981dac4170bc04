//! List site content

use anyhow::Result;
use std::io::Write;

use crate::content::{ContentRepository, ContentStore, Post};
use crate::helpers::format_date;
use crate::Site;

/// List the posts of a category, or the categories when none is given
pub fn run(site: &Site, category: Option<&str>, limit: Option<usize>, json: bool) -> Result<()> {
    let repository = site.repository();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match category {
        Some(category) => {
            let posts = repository.get_contents(category, limit)?;
            write_posts(&mut out, site, category, &posts, json)
        }
        None => write_categories(&mut out, &repository, json),
    }
}

fn write_posts(
    out: &mut impl Write,
    site: &Site,
    category: &str,
    posts: &[Post],
    json: bool,
) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, posts)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "{} ({}):", category, posts.len())?;
    for post in posts {
        writeln!(
            out,
            "  {} - {} [{}]",
            format_date(post.date(), &site.config.date_format),
            post.title(),
            post.slug()
        )?;
    }
    Ok(())
}

fn write_categories<S: ContentStore>(
    out: &mut impl Write,
    repository: &ContentRepository<S>,
    json: bool,
) -> Result<()> {
    let categories = repository.categories()?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &categories)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "Categories ({}):", categories.len())?;
    for category in categories {
        let count = repository.get_contents(&category, None)?.len();
        writeln!(out, "  {} ({})", category, count)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::MemoryStore;
    use tempfile::TempDir;

    fn doc(title: &str, date: &str) -> String {
        format!("---\ntitle: {}\ndate: {}\n---\n", title, date)
    }

    fn repository() -> ContentRepository<MemoryStore> {
        ContentRepository::new(
            MemoryStore::new()
                .with_category("notes")
                .with_record("posts", "a", &doc("Alpha", "2024-01-01"))
                .with_record("posts", "b", &doc("Beta", "2024-03-01")),
        )
    }

    #[test]
    fn test_write_posts_text() {
        let tmp = TempDir::new().unwrap();
        let site = Site::new(tmp.path()).unwrap();
        let posts = repository().get_contents("posts", Some(1)).unwrap();

        let mut out = Vec::new();
        write_posts(&mut out, &site, "posts", &posts, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "posts (1):\n  2024-03-01 - Beta [b]\n");
    }

    #[test]
    fn test_write_posts_json() {
        let tmp = TempDir::new().unwrap();
        let site = Site::new(tmp.path()).unwrap();
        let posts = repository().get_contents("posts", None).unwrap();

        let mut out = Vec::new();
        write_posts(&mut out, &site, "posts", &posts, true).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["slug"], "b");
        assert_eq!(value[1]["date"], "2024-01-01");
    }

    #[test]
    fn test_write_categories() {
        let mut out = Vec::new();
        write_categories(&mut out, &repository(), true).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value, serde_json::json!(["notes", "posts"]));
    }
}
