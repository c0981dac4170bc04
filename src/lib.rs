//! folio-rs: a personal website built from a markdown content store
//!
//! Posts live as markdown files with front-matter, one directory per content
//! category. The content repository turns them into ordered summaries, which
//! the dev server and the static generator feed to the built-in templates.

pub mod cache;
pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::cache::ContentCache;
use crate::content::{ContentRepository, FsStore};

/// The main site application
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Content directory, one subdirectory per category
    pub content_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Static assets copied verbatim
    pub static_dir: PathBuf,
}

impl Site {
    /// Create a new site instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();

        let config = match config::SiteConfig::find(&base_dir) {
            Some(path) => {
                tracing::debug!("Loading config from {:?}", path);
                config::SiteConfig::load(&path)?
            }
            None => config::SiteConfig::default(),
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a site with an explicit configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let content_dir = base_dir.join(&config.content_dir);
        let public_dir = base_dir.join(&config.public_dir);
        let static_dir = base_dir.join(&config.static_dir);

        Self {
            config,
            base_dir,
            content_dir,
            public_dir,
            static_dir,
        }
    }

    /// Content repository over the content directory, with the configured policies
    pub fn repository(&self) -> ContentRepository<FsStore> {
        ContentRepository::new(FsStore::new(&self.content_dir))
            .render_drafts(self.config.render_drafts)
            .malformed(self.config.malformed)
    }

    /// Listing cache over [`Site::repository`], honouring the `cache` setting
    pub fn cache(&self) -> ContentCache<FsStore> {
        if self.config.cache {
            ContentCache::new(self.repository())
        } else {
            ContentCache::disabled(self.repository())
        }
    }

    /// Existing paths whose changes affect the rendered site
    pub fn watch_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![self.content_dir.clone(), self.static_dir.clone()];
        paths.extend(config::SiteConfig::find(&self.base_dir));
        paths.retain(|p| p.exists());
        paths
    }

    /// Generate the static site
    pub fn generate(&self) -> Result<()> {
        commands::generate::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Create a new post
    pub fn new_post(
        &self,
        title: &str,
        category: &str,
        description: Option<&str>,
    ) -> Result<PathBuf> {
        commands::new::create_post(self, title, category, description)
    }
}
