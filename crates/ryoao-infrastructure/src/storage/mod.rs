//! File-backed storage.

mod atomic_toml;
mod token_store;

pub use atomic_toml::{AtomicTomlError, AtomicTomlFile};
pub use token_store::FileTokenStore;
