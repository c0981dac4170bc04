//! Configuration module

mod site;

pub use site::HighlightConfig;
pub use site::Icon;
pub use site::LinkConfig;
pub use site::SiteConfig;
pub use site::CONFIG_FILES;
