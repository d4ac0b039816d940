//! Risk finding types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity rank of a single risk finding.
///
/// The backend answers with Japanese ranks (`高`, `中`, `低`); English labels
/// are accepted as well so both spellings map onto the same three ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Parses a severity label, returning `None` for anything outside the three ranks.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("high") || label == "高" {
            Some(Self::High)
        } else if label.eq_ignore_ascii_case("medium") || label == "中" {
            Some(Self::Medium)
        } else if label.eq_ignore_ascii_case("low") || label == "低" {
            Some(Self::Low)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Badge color used when listing findings.
    pub fn badge_color(&self) -> &'static str {
        match self {
            Self::High => "red",
            Self::Medium => "yellow",
            Self::Low => "blue",
        }
    }

    pub fn is_high(&self) -> bool {
        matches!(self, Self::High)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| format!("unknown severity: {s}"))
    }
}

/// A single validated risk finding.
///
/// Serializes with the backend's field names (`rank`, `action`) so a list of
/// records can be sent back verbatim as chat context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskRecord {
    #[serde(rename = "rank")]
    pub severity: Severity,
    pub title: String,
    pub description: String,
    #[serde(rename = "action")]
    pub recommended_action: String,
}

impl RiskRecord {
    pub fn new(
        severity: Severity,
        title: impl Into<String>,
        description: impl Into<String>,
        recommended_action: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            title: title.into(),
            description: description.into(),
            recommended_action: recommended_action.into(),
        }
    }
}

/// The ordered findings for the currently loaded document.
///
/// Order is the analysis output order and is preserved by every consumer.
/// An empty result is a legitimate outcome (no findings), never a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AnalysisResult {
    records: Vec<RiskRecord>,
}

impl AnalysisResult {
    pub fn new(records: Vec<RiskRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[RiskRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RiskRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of findings ranked `High`.
    pub fn high_count(&self) -> usize {
        self.records.iter().filter(|r| r.severity.is_high()).count()
    }

    pub fn into_records(self) -> Vec<RiskRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a AnalysisResult {
    type Item = &'a RiskRecord;
    type IntoIter = std::slice::Iter<'a, RiskRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// A past analysis as listed by the backend's history endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub filename: String,
    /// Raw analysis text as stored by the backend (not validated).
    pub result_json: String,
    pub created_at: String,
}
