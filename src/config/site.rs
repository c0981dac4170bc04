//! Site configuration (_config.yml or _config.toml)

use anyhow::{bail, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::content::MalformedPolicy;

/// Config file names, in lookup order
pub const CONFIG_FILES: [&str; 2] = ["_config.yml", "_config.toml"];

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub keywords: Vec<String>,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub content_dir: String,
    pub public_dir: String,
    pub static_dir: String,

    // Content
    pub blog_category: String,
    pub recent_posts: usize,
    pub render_drafts: bool,
    pub malformed: MalformedPolicy,
    pub cache: bool,

    // Date format (Moment.js style)
    pub date_format: String,

    #[serde(default)]
    pub highlight: HighlightConfig,

    // Navigation and footer links
    pub nav: Vec<LinkConfig>,
    pub links: IndexMap<String, Vec<LinkConfig>>,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Site".to_string(),
            description: String::new(),
            author: "John Doe".to_string(),
            language: "en".to_string(),
            keywords: Vec::new(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            content_dir: "content".to_string(),
            public_dir: "public".to_string(),
            static_dir: "static".to_string(),

            blog_category: "posts".to_string(),
            recent_posts: 4,
            render_drafts: false,
            malformed: MalformedPolicy::Skip,
            cache: true,

            date_format: "YYYY-MM-DD".to_string(),
            highlight: HighlightConfig::default(),

            nav: vec![
                LinkConfig::new("Home", "/"),
                LinkConfig::new("Blog", "/blog"),
            ],
            links: IndexMap::new(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file, picking the format by extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        let config: SiteConfig = match path.extension().and_then(|e| e.to_str()) {
            Some("yml") | Some("yaml") => serde_yaml::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            _ => bail!("Unsupported config format: {:?}", path),
        };

        Ok(config)
    }

    /// Find the config file in a site directory, if any
    pub fn find<P: AsRef<Path>>(base_dir: P) -> Option<PathBuf> {
        CONFIG_FILES
            .iter()
            .map(|name| base_dir.as_ref().join(name))
            .find(|path| path.is_file())
    }
}

/// A navigation or footer link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    pub title: String,
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
}

impl LinkConfig {
    pub fn new(title: &str, href: &str) -> Self {
        Self {
            title: title.to_string(),
            href: href.to_string(),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: Icon) -> Self {
        self.icon = Some(icon);
        self
    }

    /// Whether the link leaves the site
    pub fn is_external(&self) -> bool {
        self.href.starts_with("http://") || self.href.starts_with("https://")
    }
}

/// Icon names a link may carry; drawing them is up to the stylesheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Icon {
    Github,
    X,
    Linkedin,
    Mail,
    Rss,
    Link,
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.blog_category, "posts");
        assert_eq!(config.recent_posts, 4);
        assert_eq!(config.malformed, MalformedPolicy::Skip);
        assert!(config.cache);
        assert_eq!(config.nav.len(), 2);
    }

    #[test]
    fn test_parse_yaml_config() {
        let yaml = r#"
title: Madat's Site
author: Madat
recent_posts: 6
malformed: abort
highlight:
  line_number: false
links:
  personal:
    - title: GitHub
      href: https://github.com/example
      icon: github
    - title: X/Twitter
      href: https://twitter.com/example
      icon: x
  work:
    - title: Email
      href: mailto:me@example.com
google_analytics: UA-1
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "Madat's Site");
        assert_eq!(config.recent_posts, 6);
        assert_eq!(config.malformed, MalformedPolicy::Abort);
        assert!(!config.highlight.line_number);
        assert_eq!(config.highlight.theme, "base16-ocean.dark");

        let groups: Vec<_> = config.links.keys().cloned().collect();
        assert_eq!(groups, vec!["personal", "work"]);
        assert_eq!(config.links["personal"][1].icon, Some(Icon::X));
        assert!(config.links["personal"][0].is_external());
        assert_eq!(config.links["work"][0].icon, None);
        assert!(config.extra.contains_key("google_analytics"));
    }

    #[test]
    fn test_load_toml_config() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("_config.toml");
        fs::write(
            &path,
            r#"
title = "Toml Site"
content_dir = "docs"

[[nav]]
title = "Writing"
href = "/blog"
"#,
        )
        .unwrap();

        assert_eq!(SiteConfig::find(tmp.path()), Some(path.clone()));
        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.title, "Toml Site");
        assert_eq!(config.content_dir, "docs");
        assert_eq!(config.nav, vec![LinkConfig::new("Writing", "/blog")]);
    }

    #[test]
    fn test_yaml_preferred_over_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("_config.toml"), "title = \"T\"").unwrap();
        fs::write(tmp.path().join("_config.yml"), "title: Y").unwrap();
        let found = SiteConfig::find(tmp.path()).unwrap();
        assert!(found.ends_with("_config.yml"));
    }

    #[test]
    fn test_unknown_format_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.ini");
        fs::write(&path, "title=x").unwrap();
        assert!(SiteConfig::load(&path).is_err());
    }
}
