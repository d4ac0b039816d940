//! Terminal rendering of notices and findings.

use colored::{ColoredString, Colorize};
use ryoao_core::analysis::{AnalysisResult, HistoryEntry, RiskRecord};
use ryoao_core::notice::{Notice, NoticeLevel};

pub fn notice(notice: &Notice) {
    let title = match notice.level {
        NoticeLevel::Info => notice.title.bright_blue().bold(),
        NoticeLevel::Success => notice.title.bright_green().bold(),
        NoticeLevel::Warning => notice.title.yellow().bold(),
        NoticeLevel::Error => notice.title.red().bold(),
    };
    let line = format!("{} {}", title, notice.message);
    if notice.level == NoticeLevel::Error {
        eprintln!("{line}");
    } else {
        println!("{line}");
    }
}

fn badge(record: &RiskRecord) -> ColoredString {
    format!("[{:^6}]", record.severity.as_str())
        .color(record.severity.badge_color())
        .bold()
}

pub fn findings(result: &AnalysisResult) {
    if result.is_empty() {
        println!("{}", "No risks found.".bright_green());
        return;
    }

    println!(
        "{}",
        format!("{} findings, {} high", result.len(), result.high_count()).bright_black()
    );
    for (i, record) in result.iter().enumerate() {
        println!();
        println!("{} {}. {}", badge(record), i + 1, record.title.bold());
        println!("  {}", record.description);
        println!("  {} {}", "->".bright_cyan(), record.recommended_action.cyan());
    }
}

pub fn history(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("{}", "No past analyses.".bright_black());
        return;
    }
    for entry in entries {
        println!(
            "{} {} {}",
            format!("#{}", entry.id).bright_black(),
            entry.created_at.bright_black(),
            entry.filename
        );
    }
}
