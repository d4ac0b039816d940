//! Analysis domain module.
//!
//! # Module Structure
//!
//! - `model`: Risk findings (`Severity`, `RiskRecord`, `AnalysisResult`, `HistoryEntry`)
//! - `parser`: Conversion of raw backend text into validated records (`parse`, `ParseError`)

mod model;
mod parser;

pub use model::{AnalysisResult, HistoryEntry, RiskRecord, Severity};
pub use parser::{ParseError, parse, strip_decoration};
