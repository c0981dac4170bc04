//! Content repository - turns stored records into ordered post summaries

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::markdown::summarize;
use super::post::newest_first;
use super::store::{ContentStore, Record};
use super::{ContentError, Entry, FrontMatter, Post};

/// Longest description derived from a post body
const DESCRIPTION_CHARS: usize = 160;

/// What to do with a record whose metadata cannot be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Log the record and leave it out of the listing
    #[default]
    Skip,
    /// Fail the whole read
    Abort,
}

/// Read access to the posts of every category in a store
pub struct ContentRepository<S> {
    store: S,
    render_drafts: bool,
    malformed: MalformedPolicy,
}

impl<S: ContentStore> ContentRepository<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            render_drafts: false,
            malformed: MalformedPolicy::default(),
        }
    }

    /// Include drafts in listings and lookups
    pub fn render_drafts(mut self, enabled: bool) -> Self {
        self.render_drafts = enabled;
        self
    }

    pub fn malformed(mut self, policy: MalformedPolicy) -> Self {
        self.malformed = policy;
        self
    }

    /// Known categories, sorted by name
    pub fn categories(&self) -> Result<Vec<String>, ContentError> {
        self.store.categories()
    }

    /// Posts of `category`, newest first, truncated to `limit` when given
    pub fn get_contents(
        &self,
        category: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Post>, ContentError> {
        let mut posts: Vec<Post> = self
            .get_entries(category)?
            .into_iter()
            .map(|entry| entry.post)
            .collect();

        if let Some(limit) = limit {
            posts.truncate(limit);
        }

        tracing::debug!("Listed {} posts from {}", posts.len(), category);
        Ok(posts)
    }

    /// Every entry of `category` with its body, in listing order, from one read
    pub fn get_entries(&self, category: &str) -> Result<Vec<Entry>, ContentError> {
        let mut entries = self.load_entries(category)?;
        entries.sort_by(|a, b| newest_first(&a.post, &b.post));
        Ok(entries)
    }

    /// A single entry of `category`, looked up by slug
    pub fn get_content(&self, category: &str, slug: &str) -> Result<Entry, ContentError> {
        self.load_entries(category)?
            .into_iter()
            .find(|entry| entry.post.slug() == slug)
            .ok_or_else(|| ContentError::EntryNotFound {
                category: category.to_string(),
                slug: slug.to_string(),
            })
    }

    /// Parse every record of a category, applying the draft and malformed policies
    fn load_entries(&self, category: &str) -> Result<Vec<Entry>, ContentError> {
        let records = self.store.records(category)?;

        let mut entries: Vec<Entry> = Vec::with_capacity(records.len());
        let mut seen = HashSet::new();

        for record in records {
            let parsed = record.and_then(|record| {
                let parsed = parse_record(&record)?;
                Ok((record, parsed))
            });

            let (record, parsed) = match parsed {
                Ok(ok) => ok,
                Err(e) => {
                    self.handle_malformed(category, e)?;
                    continue;
                }
            };

            if parsed.draft && !self.render_drafts {
                tracing::debug!("Skipping draft {}", record.source);
                continue;
            }

            let slug = parsed.entry.post.slug();
            if !seen.insert(slug.to_string()) {
                let e = ContentError::malformed(
                    &record.source,
                    format!("duplicate slug '{}'", slug),
                );
                self.handle_malformed(category, e)?;
                continue;
            }

            entries.push(parsed.entry);
        }

        Ok(entries)
    }

    fn handle_malformed(&self, category: &str, e: ContentError) -> Result<(), ContentError> {
        match self.malformed {
            MalformedPolicy::Skip => {
                tracing::warn!("Skipping record in {}: {}", category, e);
                Ok(())
            }
            MalformedPolicy::Abort => Err(e),
        }
    }
}

/// A parsed record and whether it is a draft
struct ParsedEntry {
    entry: Entry,
    draft: bool,
}

/// Derive the summary of a single record
fn parse_record(record: &Record) -> Result<ParsedEntry, ContentError> {
    let malformed = |reason: String| ContentError::malformed(&record.source, reason);

    let (fm, body) = FrontMatter::parse(&record.text).map_err(|e| malformed(e.to_string()))?;

    let title = fm
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| malformed("missing title".to_string()))?
        .to_string();

    let date = match fm.date.as_deref() {
        None => return Err(malformed("missing date".to_string())),
        Some(raw) => fm
            .parse_date()
            .ok_or_else(|| malformed(format!("unparseable date '{}'", raw)))?,
    };

    let slug = slug::slugify(&record.identifier);
    if slug.is_empty() {
        return Err(malformed("empty identifier".to_string()));
    }

    let description = match fm.description.as_deref().map(str::trim) {
        Some(description) if !description.is_empty() => description.to_string(),
        _ => summarize(body, DESCRIPTION_CHARS),
    };

    Ok(ParsedEntry {
        draft: fm.is_draft(),
        entry: Entry {
            post: Post::new(slug, title, description, date),
            body: body.to_string(),
        },
    })
}
