//! Helper functions for templates and views

mod date;
mod url;

pub use date::*;
pub use url::*;
