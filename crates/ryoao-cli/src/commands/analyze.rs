use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use ryoao_core::analysis::AnalysisResult;
use ryoao_core::notice::Notice;
use ryoao_infrastructure::load_document;

use crate::app::App;
use crate::output;

pub async fn run(
    app: &App,
    file: Option<PathBuf>,
    report: bool,
    out: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let (result, display_name) = analyze_file(app, file.as_deref()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(result.as_ref())?);
    } else {
        output::findings(&result);
    }

    if report {
        let path = export_report(app, &result, &display_name, out)?;
        output::notice(&Notice::success(
            "Report saved",
            path.display().to_string(),
        ));
    }
    Ok(())
}

/// Loads `file` (when given) and runs the analysis. Returns the result and
/// the name the report should carry.
pub async fn analyze_file(
    app: &App,
    file: Option<&Path>,
) -> Result<(Arc<AnalysisResult>, String)> {
    let document = match file {
        Some(path) => Some(load_document(path).await?),
        None => None,
    };
    let display_name = document
        .as_ref()
        .map(|d| d.file_name.clone())
        .unwrap_or_default();

    eprintln!("{}", "Analyzing...".bright_black());
    let result = app.analysis.analyze(document).await?;
    Ok((result, display_name))
}

pub fn export_report(
    app: &App,
    result: &AnalysisResult,
    display_name: &str,
    out: Option<PathBuf>,
) -> Result<PathBuf> {
    let document = app.renderer.render(result.records(), display_name);
    Ok(document.write_to(&app.report_dir(out))?)
}

pub async fn history(app: &App) -> Result<()> {
    let entries = app.analysis.history().await?;
    output::history(&entries);
    Ok(())
}
