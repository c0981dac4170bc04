//! Generator module - writes the site's pages as static HTML files

use anyhow::{Context as _, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::content::{ContentRepository, ContentStore, Post};
use crate::templates::TemplateRenderer;
use crate::Site;

/// Static site generator over the built-in templates
pub struct Generator<'a, S> {
    site: &'a Site,
    repository: ContentRepository<S>,
    renderer: TemplateRenderer,
}

/// What a generation run produced
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerateStats {
    pub posts: usize,
    pub pages: usize,
    pub assets: usize,
}

impl<'a, S: ContentStore> Generator<'a, S> {
    /// Create a new generator
    pub fn new(site: &'a Site, repository: ContentRepository<S>) -> Result<Self> {
        let renderer = TemplateRenderer::new(&site.config)?;
        Ok(Self {
            site,
            repository,
            renderer,
        })
    }

    /// Generate the entire site into the public directory
    pub fn generate(&self) -> Result<GenerateStats> {
        let public_dir = &self.site.public_dir;
        let category = &self.site.config.blog_category;
        fs::create_dir_all(public_dir)?;

        let entries = self.repository.get_entries(category)?;
        let posts: Vec<Post> = entries.iter().map(|entry| entry.post.clone()).collect();
        let mut stats = GenerateStats {
            posts: posts.len(),
            ..Default::default()
        };

        // Home page shows the most recent posts
        let recent = &posts[..posts.len().min(self.site.config.recent_posts)];
        self.write_page(&public_dir.join("index.html"), &self.renderer.render_home(recent)?)?;

        let blog_dir = public_dir.join("blog");
        self.write_page(&blog_dir.join("index.html"), &self.renderer.render_blog(&posts)?)?;
        stats.pages += 2;

        for entry in &entries {
            let path = blog_dir.join(entry.post.slug()).join("index.html");
            self.write_page(&path, &self.renderer.render_post(entry)?)?;
            stats.pages += 1;
        }

        let not_found = self
            .renderer
            .render_not_found("The page you are looking for does not exist.")?;
        self.write_page(&public_dir.join("404.html"), &not_found)?;
        stats.pages += 1;

        stats.assets = self.copy_static_assets()?;

        Ok(stats)
    }

    fn write_page(&self, path: &Path, html: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, html).with_context(|| format!("Failed to write {:?}", path))?;
        tracing::debug!("Generated: {:?}", path);
        Ok(())
    }

    /// Copy the static directory verbatim into the public directory
    fn copy_static_assets(&self) -> Result<usize> {
        let static_dir = &self.site.static_dir;
        if !static_dir.is_dir() {
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;
            let dest: PathBuf = self.site.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
            copied += 1;
        }

        Ok(copied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentError, MemoryStore, RecordResult};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Counts how often the store is actually read
    struct CountingStore {
        inner: MemoryStore,
        reads: Arc<AtomicUsize>,
    }

    impl ContentStore for CountingStore {
        fn categories(&self) -> Result<Vec<String>, ContentError> {
            self.inner.categories()
        }

        fn records(&self, category: &str) -> Result<Vec<RecordResult>, ContentError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.records(category)
        }
    }

    fn doc(title: &str, date: &str) -> String {
        format!("---\ntitle: {}\ndate: {}\n---\n\n# {}\n", title, date, title)
    }

    fn site(tmp: &TempDir) -> Site {
        Site::new(tmp.path()).unwrap()
    }

    #[test]
    fn test_generate_writes_pages() {
        let tmp = TempDir::new().unwrap();
        let site = site(&tmp);
        fs::create_dir_all(site.static_dir.join("img")).unwrap();
        fs::write(site.static_dir.join("img/logo.svg"), "<svg/>").unwrap();

        let store = MemoryStore::new()
            .with_record("posts", "one", &doc("One", "2024-01-01"))
            .with_record("posts", "two", &doc("Two", "2024-02-01"));
        let generator = Generator::new(&site, ContentRepository::new(store)).unwrap();
        let stats = generator.generate().unwrap();

        assert_eq!(
            stats,
            GenerateStats {
                posts: 2,
                pages: 5,
                assets: 1
            }
        );

        let public = &site.public_dir;
        assert!(public.join("index.html").is_file());
        assert!(public.join("404.html").is_file());
        assert!(public.join("img/logo.svg").is_file());

        let post = fs::read_to_string(public.join("blog/two/index.html")).unwrap();
        assert!(post.contains("<h1>Two</h1>"));

        let blog = fs::read_to_string(public.join("blog/index.html")).unwrap();
        assert!(blog.find("/blog/two").unwrap() < blog.find("/blog/one").unwrap());
    }

    #[test]
    fn test_home_page_is_limited_to_recent_posts() {
        let tmp = TempDir::new().unwrap();
        let mut site = site(&tmp);
        site.config.recent_posts = 1;

        let store = MemoryStore::new()
            .with_record("posts", "old", &doc("Old", "2023-01-01"))
            .with_record("posts", "new", &doc("New", "2024-01-01"));
        Generator::new(&site, ContentRepository::new(store))
            .unwrap()
            .generate()
            .unwrap();

        let home = fs::read_to_string(site.public_dir.join("index.html")).unwrap();
        assert!(home.contains("/blog/new"));
        assert!(!home.contains("/blog/old"));
    }

    #[test]
    fn test_generate_reads_store_once() {
        let tmp = TempDir::new().unwrap();
        let site = site(&tmp);

        let mut inner = MemoryStore::new().with_record("posts", "broken", "---\ntitle: Broken\n---\n");
        for day in 1..=20 {
            let slug = format!("post-{}", day);
            inner = inner.with_record("posts", &slug, &doc(&slug, &format!("2024-01-{:02}", day)));
        }
        let reads = Arc::new(AtomicUsize::new(0));
        let store = CountingStore {
            inner,
            reads: Arc::clone(&reads),
        };

        let stats = Generator::new(&site, ContentRepository::new(store))
            .unwrap()
            .generate()
            .unwrap();

        assert_eq!(stats.posts, 20);
        assert_eq!(stats.pages, 23);
        assert_eq!(reads.load(Ordering::SeqCst), 1);
        assert!(site.public_dir.join("blog/post-20/index.html").is_file());
    }

    #[test]
    fn test_missing_blog_category_fails() {
        let tmp = TempDir::new().unwrap();
        let site = site(&tmp);
        let generator = Generator::new(&site, ContentRepository::new(MemoryStore::new())).unwrap();

        let err = generator.generate().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ContentError>(),
            Some(ContentError::NotFound { .. })
        ));
    }
}
