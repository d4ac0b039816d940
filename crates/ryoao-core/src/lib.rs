pub mod analysis;
pub mod backend;
pub mod conversation;
pub mod document;
pub mod error;
pub mod notice;
pub mod session;
pub mod storage;

// Re-export common error type
pub use error::{Result, RyoaoError};
