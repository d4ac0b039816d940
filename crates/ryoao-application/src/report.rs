//! ReportRenderer - paginated HTML export of an analysis.
//!
//! Rendering is split in two steps. [`ReportRenderer::render_at`] lays the
//! findings out into a [`ReportDocument`] (pure and deterministic), and
//! [`ReportDocument::to_html`] turns that layout into markup through a
//! minijinja template.

use chrono::{DateTime, Utc};
use minijinja::{Environment, context};
use ryoao_core::analysis::RiskRecord;
use ryoao_core::{Result, RyoaoError};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const REPORT_FILE_PREFIX: &str = "risk-report_";
pub const REPORT_FILE_EXTENSION: &str = "html";
pub const DEFAULT_ROWS_PER_PAGE: usize = 12;

const DEFAULT_TITLE: &str = "Contract Risk Analysis Report";
const DEFAULT_GENERATOR: &str = "ryoao AI system";
const FALLBACK_NAME: &str = "contract";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

const TEMPLATE_NAME: &str = "report.html";
const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{ report.title }} - {{ report.display_name }}</title>
<style>
  body { font-family: "Noto Sans JP", sans-serif; margin: 14mm; color: #222; }
  h1 { color: rgb(33, 150, 243); font-size: 22pt; font-weight: normal; margin-bottom: 4mm; }
  .meta { color: #646464; font-size: 10pt; line-height: 1.6; }
  table { width: 100%; border-collapse: collapse; font-size: 9pt; margin-top: 6mm; }
  th { background: rgb(33, 150, 243); color: #fff; font-weight: normal; text-align: left; }
  th, td { padding: 5px; border: 1px solid #ddd; vertical-align: top; }
  td.severity { width: 20mm; text-align: center; }
  td.title { width: 40mm; }
  tr.high td.severity { color: #ff0000; }
  .page { page-break-after: always; }
  .page:last-child { page-break-after: auto; }
  .page-number { color: #999; font-size: 8pt; text-align: right; }
</style>
</head>
<body>
<header>
  <h1>{{ report.title }}</h1>
  <div class="meta">
    <div>Document: {{ report.display_name }}</div>
    <div>Generated by: {{ report.generator }}</div>
    <div>Issued: {{ report.generated_at }}</div>
  </div>
</header>
{% for page in report.pages %}
<section class="page">
  <table>
    <thead>
      <tr><th>Severity</th><th>Item</th><th>Risk</th><th>Recommended action</th></tr>
    </thead>
    <tbody>
    {%- for row in page.rows %}
      <tr class="{{ 'high' if row.highlighted else 'normal' }}">
        <td class="severity">{{ row.severity }}</td>
        <td class="title">{{ row.title }}</td>
        <td>{{ row.description }}</td>
        <td>{{ row.action }}</td>
      </tr>
    {%- endfor %}
    </tbody>
  </table>
  <div class="page-number">{{ page.number }} / {{ report.pages | length }}</div>
</section>
{% endfor %}
</body>
</html>
"#;

/// Lays out findings into fixed-size report pages.
#[derive(Debug, Clone)]
pub struct ReportRenderer {
    rows_per_page: usize,
    title: String,
    generator: String,
}

impl Default for ReportRenderer {
    fn default() -> Self {
        Self {
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            title: DEFAULT_TITLE.to_string(),
            generator: DEFAULT_GENERATOR.to_string(),
        }
    }
}

impl ReportRenderer {
    /// A page always holds at least one row.
    pub fn with_rows_per_page(rows_per_page: usize) -> Self {
        Self {
            rows_per_page: rows_per_page.max(1),
            ..Self::default()
        }
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    /// Renders with the current time as the generation timestamp.
    pub fn render(&self, records: &[RiskRecord], display_name: &str) -> ReportDocument {
        self.render_at(records, display_name, Utc::now())
    }

    pub fn render_at(
        &self,
        records: &[RiskRecord],
        display_name: &str,
        generated_at: DateTime<Utc>,
    ) -> ReportDocument {
        let rows: Vec<ReportRow> = records.iter().map(ReportRow::from_record).collect();

        let mut pages: Vec<ReportPage> = rows
            .chunks(self.rows_per_page)
            .enumerate()
            .map(|(i, chunk)| ReportPage {
                number: i + 1,
                rows: chunk.to_vec(),
            })
            .collect();
        if pages.is_empty() {
            pages.push(ReportPage {
                number: 1,
                rows: Vec::new(),
            });
        }

        let display_name = if display_name.trim().is_empty() {
            FALLBACK_NAME.to_string()
        } else {
            display_name.to_string()
        };

        ReportDocument {
            file_name: report_file_name(&display_name),
            title: self.title.clone(),
            display_name,
            generator: self.generator.clone(),
            generated_at: generated_at.format(TIMESTAMP_FORMAT).to_string(),
            pages,
        }
    }
}

/// A rendered report, ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportDocument {
    pub file_name: String,
    pub title: String,
    pub display_name: String,
    pub generator: String,
    pub generated_at: String,
    pub pages: Vec<ReportPage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportPage {
    /// 1-based.
    pub number: usize,
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub severity: String,
    pub title: String,
    pub description: String,
    pub action: String,
    /// Set for High findings; the severity cell is drawn in red.
    pub highlighted: bool,
    pub badge_color: String,
}

impl ReportRow {
    fn from_record(record: &RiskRecord) -> Self {
        Self {
            severity: record.severity.as_str().to_string(),
            title: record.title.clone(),
            description: record.description.clone(),
            action: record.recommended_action.clone(),
            highlighted: record.severity.is_high(),
            badge_color: record.severity.badge_color().to_string(),
        }
    }
}

impl ReportDocument {
    /// All rows across pages, in input order.
    pub fn rows(&self) -> impl Iterator<Item = &ReportRow> {
        self.pages.iter().flat_map(|page| page.rows.iter())
    }

    pub fn row_count(&self) -> usize {
        self.pages.iter().map(|page| page.rows.len()).sum()
    }

    pub fn to_html(&self) -> Result<String> {
        let mut env = Environment::new();
        env.add_template(TEMPLATE_NAME, TEMPLATE)
            .map_err(|e| RyoaoError::report(format!("Invalid report template: {e}")))?;
        let template = env
            .get_template(TEMPLATE_NAME)
            .map_err(|e| RyoaoError::report(e.to_string()))?;

        template
            .render(context! { report => self })
            .map_err(|e| RyoaoError::report(format!("Failed to render report: {e}")))
    }

    /// Writes the HTML into `dir` under [`ReportDocument::file_name`].
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let html = self.to_html()?;
        std::fs::create_dir_all(dir).map_err(|e| {
            RyoaoError::storage(format!("Cannot create {}: {}", dir.display(), e))
        })?;

        let path = dir.join(&self.file_name);
        std::fs::write(&path, html).map_err(|e| {
            RyoaoError::storage(format!("Cannot write {}: {}", path.display(), e))
        })?;
        tracing::info!(path = %path.display(), rows = self.row_count(), "Report written");
        Ok(path)
    }
}

/// Prefix, sanitized display name and extension.
pub fn report_file_name(display_name: &str) -> String {
    let sanitized: String = display_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let sanitized = sanitized.trim_matches('.');
    let stem = if sanitized.is_empty() {
        FALLBACK_NAME
    } else {
        sanitized
    };
    format!("{REPORT_FILE_PREFIX}{stem}.{REPORT_FILE_EXTENSION}")
}
