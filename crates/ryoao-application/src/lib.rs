//! Application layer for ryoao.
//!
//! Coordinates the domain types from `ryoao-core` with the backend and
//! storage collaborators: the session lifecycle, analysis and chat requests,
//! the conversation log and report export.

pub mod analysis_service;
pub mod conversation;
pub mod report;
pub mod session_store;

#[cfg(test)]
mod testing;

pub use analysis_service::AnalysisService;
pub use conversation::ConversationThread;
pub use report::{ReportDocument, ReportPage, ReportRenderer, ReportRow};
pub use session_store::SessionStore;
