pub mod config;
pub mod document;
pub mod fixture;
pub mod paths;
pub mod storage;

pub use crate::config::{AppConfig, ConfigService};
pub use crate::document::load_document;
pub use crate::fixture::{BundledFixture, FileFixture, fixture_source};
pub use crate::paths::RyoaoPaths;
pub use crate::storage::FileTokenStore;
