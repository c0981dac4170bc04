//! Create a new post

use anyhow::{bail, Result};
use std::fs;
use std::path::PathBuf;

use crate::content::is_valid_category;
use crate::Site;

/// Create a new post in `category`, returning its path
pub fn create_post(
    site: &Site,
    title: &str,
    category: &str,
    description: Option<&str>,
) -> Result<PathBuf> {
    if !is_valid_category(category) {
        bail!("Invalid category name: {}", category);
    }

    let slug = slug::slugify(title);
    if slug.is_empty() {
        bail!("Title must contain at least one letter or digit: {:?}", title);
    }

    let target_dir = site.content_dir.join(category);
    fs::create_dir_all(&target_dir)?;

    let file_path = target_dir.join(format!("{}.md", slug));
    if file_path.exists() {
        bail!("File already exists: {:?}", file_path);
    }

    let today = chrono::Local::now().date_naive();
    let content = format!(
        "---\ntitle: {}\ndescription: {}\ndate: {}\n---\n",
        yaml_string(title),
        yaml_string(description.unwrap_or("")),
        today.format("%Y-%m-%d")
    );

    fs::write(&file_path, content)?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}

/// Quote a value for a YAML front-matter line
fn yaml_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("{:?}", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_post_is_listed() {
        let tmp = TempDir::new().unwrap();
        let site = Site::new(tmp.path()).unwrap();

        let path = create_post(&site, "Hello: \"World\"", "posts", Some("Greets")).unwrap();
        assert!(path.ends_with("posts/hello-world.md"));

        let posts = site.repository().get_contents("posts", None).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title(), "Hello: \"World\"");
        assert_eq!(posts[0].description(), "Greets");
    }

    #[test]
    fn test_create_post_refuses_overwrite() {
        let tmp = TempDir::new().unwrap();
        let site = Site::new(tmp.path()).unwrap();
        create_post(&site, "Same", "posts", None).unwrap();
        assert!(create_post(&site, "Same", "posts", None).is_err());
    }

    #[test]
    fn test_create_post_rejects_bad_input() {
        let tmp = TempDir::new().unwrap();
        let site = Site::new(tmp.path()).unwrap();
        assert!(create_post(&site, "Title", "../etc", None).is_err());
        assert!(create_post(&site, "!!!", "posts", None).is_err());
    }
}
