pub mod config;
pub mod error;
pub mod html;
pub mod lenient;
pub mod ranking;
pub mod store;
pub mod types;

pub use config::Config;
pub use error::{Result, ShowcaseError};
pub use html::html_escape;
pub use ranking::{crawl_order, dedup_by_url, display_order, DISPLAY_LIMIT};
pub use store::SnapshotStore;
pub use types::*;
