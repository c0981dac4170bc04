//! Content module - content stores, front-matter and the post listing

mod error;
mod frontmatter;
mod markdown;
mod post;
mod repository;
mod store;

pub use error::ContentError;
pub use frontmatter::FrontMatter;
pub use markdown::{summarize, MarkdownRenderer};
pub use post::{Entry, Post};
pub use repository::{ContentRepository, MalformedPolicy};
pub use store::{is_valid_category, ContentStore, FsStore, MemoryStore, Record, RecordResult};
