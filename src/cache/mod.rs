//! Process-owned read-through cache for post listings
//!
//! Listings are cached per category as the full ordered sequence, so any
//! `limit` can be served from one read. Errors are never cached. Callers own
//! invalidation: the dev server clears the cache whenever its file watcher
//! sees a change under the content directory.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::content::{ContentError, ContentRepository, ContentStore, Entry, Post};

/// Read-through cache in front of a [`ContentRepository`]
pub struct ContentCache<S> {
    repository: ContentRepository<S>,
    listings: RwLock<HashMap<String, Arc<[Post]>>>,
    enabled: bool,
}

impl<S: ContentStore> ContentCache<S> {
    pub fn new(repository: ContentRepository<S>) -> Self {
        Self {
            repository,
            listings: RwLock::new(HashMap::new()),
            enabled: true,
        }
    }

    /// A cache that always reads through to the store
    pub fn disabled(repository: ContentRepository<S>) -> Self {
        Self {
            enabled: false,
            ..Self::new(repository)
        }
    }

    pub fn repository(&self) -> &ContentRepository<S> {
        &self.repository
    }

    /// Same contract as [`ContentRepository::get_contents`]
    pub fn get_contents(
        &self,
        category: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Post>, ContentError> {
        let listing = self.listing(category)?;
        let end = limit.map_or(listing.len(), |limit| limit.min(listing.len()));
        Ok(listing[..end].to_vec())
    }

    /// Entries are read fresh, only listings are cached
    pub fn get_content(&self, category: &str, slug: &str) -> Result<Entry, ContentError> {
        self.repository.get_content(category, slug)
    }

    fn listing(&self, category: &str) -> Result<Arc<[Post]>, ContentError> {
        if !self.enabled {
            return Ok(self.repository.get_contents(category, None)?.into());
        }

        {
            let listings = self.listings.read().unwrap_or_else(|e| e.into_inner());
            if let Some(listing) = listings.get(category) {
                return Ok(Arc::clone(listing));
            }
        }

        let listing: Arc<[Post]> = self.repository.get_contents(category, None)?.into();
        tracing::debug!("Cached {} posts for {}", listing.len(), category);

        let mut listings = self.listings.write().unwrap_or_else(|e| e.into_inner());
        listings.insert(category.to_string(), Arc::clone(&listing));
        Ok(listing)
    }

    /// Drop the cached listing of one category
    pub fn invalidate(&self, category: &str) {
        let mut listings = self.listings.write().unwrap_or_else(|e| e.into_inner());
        listings.remove(category);
    }

    /// Drop every cached listing
    pub fn clear(&self) {
        let mut listings = self.listings.write().unwrap_or_else(|e| e.into_inner());
        if !listings.is_empty() {
            tracing::debug!("Clearing {} cached listings", listings.len());
        }
        listings.clear();
    }
}
