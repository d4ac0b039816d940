use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use ryoao_core::RyoaoError;
use ryoao_core::notice::Notice;
use ryoao_core::session::{ModeSignal, Session};

use super::analyze::{analyze_file, export_report};
use crate::app::{App, dummy_notice};
use crate::output;

const COMMANDS: [&str; 5] = ["/analyze", "/report", "/dummy", "/live", "/quit"];

/// Completion, hints and highlighting for slash commands.
struct ChatHelper;

impl Helper for ChatHelper {}

impl Completer for ChatHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') {
            return Ok((0, vec![]));
        }

        let candidates = COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for ChatHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for ChatHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(' ') {
            return None;
        }
        COMMANDS
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Validator for ChatHelper {}

/// Analyzes `file`, then answers questions about the findings until `/quit`.
pub async fn run(app: &App, file: Option<PathBuf>, signal: &ModeSignal) -> Result<()> {
    let mut signal = signal.clone();
    let (result, mut display_name) = analyze_file(app, file.as_deref()).await?;
    output::findings(&result);

    let mut rl = Editor::new()?;
    rl.set_helper(Some(ChatHelper));

    println!();
    println!("{}", "=== ryoao chat ===".bright_magenta().bold());
    println!(
        "{}",
        "Ask about the findings. /report exports, /analyze re-runs, /quit exits.".bright_black()
    );

    loop {
        let line = match rl.readline(">> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type /quit to exit.".yellow());
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(trimmed);

        let outcome = match trimmed {
            "/quit" | "/exit" => break,
            "/report" => report(app, &display_name),
            "/dummy" => {
                signal = ModeSignal::dummy();
                switch_mode(app, &signal)
            }
            "/live" => {
                signal = ModeSignal::none();
                switch_mode(app, &signal)
            }
            "/analyze" => match analyze_file(app, file.as_deref()).await {
                Ok((result, name)) => {
                    display_name = name;
                    output::findings(&result);
                    Ok(())
                }
                Err(err) => Err(err),
            },
            question => ask(app, &signal, question).await,
        };

        if let Err(err) = outcome {
            match err.downcast_ref::<RyoaoError>() {
                Some(err) => output::notice(&err.to_notice()),
                None => eprintln!("{}", format!("Error: {err:#}").red()),
            }
        }
    }

    println!("{}", "Goodbye!".bright_green());
    Ok(())
}

async fn ask(app: &App, signal: &ModeSignal, question: &str) -> Result<()> {
    app.session.observe_signal(signal)?;
    app.thread.set_pending_input(question);

    let reply = app.thread.send_pending().await?;
    for line in reply.lines() {
        println!("{}", line.bright_blue());
    }
    println!();
    Ok(())
}

fn report(app: &App, display_name: &str) -> Result<()> {
    let Some(result) = app.analysis.current() else {
        output::notice(&Notice::warning("No analysis", "Run /analyze first."));
        return Ok(());
    };
    let path = export_report(app, &result, display_name, None)?;
    output::notice(&Notice::success("Report saved", path.display().to_string()));
    Ok(())
}

fn switch_mode(app: &App, signal: &ModeSignal) -> Result<()> {
    match app.session.observe_signal(signal)? {
        Session::Dummy => output::notice(&dummy_notice()),
        Session::Live { .. } => output::notice(&Notice::info(
            "Live mode",
            "Resumed your session. Run /analyze to start over.",
        )),
        Session::LoggedOut => output::notice(&Notice::warning(
            "Logged out",
            "No stored session. Run `ryoao login` first.",
        )),
    }
    Ok(())
}
