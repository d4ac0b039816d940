use std::borrow::Cow::{self, Borrowed, Owned};

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::config::Configurer;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{ColorMode, Editor, Helper};
use ryoao_core::notice::Notice;
use ryoao_core::session::Session;

use crate::app::{App, dummy_notice};
use crate::output;

/// Echoes `*` for every typed character.
struct PasswordMask;

impl Helper for PasswordMask {}

impl Completer for PasswordMask {
    type Candidate = Pair;
}

impl Hinter for PasswordMask {
    type Hint = String;
}

impl Validator for PasswordMask {}

impl Highlighter for PasswordMask {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.is_empty() {
            Borrowed(line)
        } else {
            Owned("*".repeat(line.chars().count()))
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

fn prompt_password() -> Result<String> {
    let mut rl: Editor<PasswordMask, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(PasswordMask));
    rl.set_color_mode(ColorMode::Forced);
    rl.set_auto_add_history(false);
    Ok(rl.readline("Password: ")?)
}

pub async fn login(app: &App, username: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => prompt_password()?,
    };

    app.session.login_with_credentials(username, &password).await?;
    output::notice(&Notice::success(
        "Logged in",
        format!("Welcome, {username}. Upload a contract to start."),
    ));
    Ok(())
}

pub fn logout(app: &App) -> Result<()> {
    app.session.logout()?;
    output::notice(&Notice::info("Logged out", "The stored session was removed."));
    Ok(())
}

pub fn status(app: &App) {
    match app.session.current() {
        Session::Live { .. } => {
            println!("{} {}", "live".bright_green().bold(), app.config.api_base_url);
        }
        Session::Dummy => output::notice(&dummy_notice()),
        Session::LoggedOut => {
            println!("{}", "logged out".bright_black());
            println!("{}", "Run `ryoao login -u <user>` or pass --dummy.".bright_black());
        }
    }
}
