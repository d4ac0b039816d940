use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use ryoao_core::RyoaoError;
use ryoao_core::session::ModeSignal;
use ryoao_infrastructure::RyoaoPaths;

mod app;
mod commands;
mod logging;
mod output;

use app::App;

#[derive(Parser)]
#[command(name = "ryoao")]
#[command(about = "ryoao - AI contract risk review from the terminal", long_about = None)]
#[command(version)]
struct Cli {
    /// Use the bundled sample analysis; nothing is sent to the server
    #[arg(long, global = true)]
    dummy: bool,

    /// Location fragment acting as the mode trigger ("#dummy" forces dummy mode)
    #[arg(long, env = "RYOAO_FRAGMENT", global = true)]
    fragment: Option<String>,

    /// Directory holding config.toml, credentials and logs
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and remember the session
    Login {
        #[arg(short, long)]
        username: String,
        /// Prompted for when omitted
        #[arg(short, long, env = "RYOAO_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Log out and forget the stored session
    Logout,
    /// Show the current session mode
    Status,
    /// Analyze a contract (PDF or text)
    Analyze {
        /// Contract file; optional in dummy mode
        file: Option<PathBuf>,
        /// Also export an HTML report
        #[arg(long)]
        report: bool,
        /// Report output directory
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
        /// Print findings as JSON
        #[arg(long)]
        json: bool,
    },
    /// Analyze a contract, then ask follow-up questions
    Chat {
        file: Option<PathBuf>,
    },
    /// List past analyses
    History,
}

impl Cli {
    fn signal(&self) -> ModeSignal {
        if self.dummy {
            ModeSignal::dummy()
        } else {
            self.fragment
                .clone()
                .map(ModeSignal::from_fragment)
                .unwrap_or_else(ModeSignal::none)
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let paths = RyoaoPaths::new(cli.config.as_deref());
    let _log_guard = logging::init(&paths);

    match run(cli, paths).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<RyoaoError>() {
                Some(err) => output::notice(&err.to_notice()),
                None => eprintln!("{} {:#}", "error:".red().bold(), err),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, paths: RyoaoPaths) -> anyhow::Result<()> {
    let signal = cli.signal();
    let app = App::build(paths)?;
    if let Some(notice) = app.start(&signal)? {
        output::notice(&notice);
    }

    match cli.command {
        Commands::Login { username, password } => {
            commands::session::login(&app, &username, password).await?
        }
        Commands::Logout => commands::session::logout(&app)?,
        Commands::Status => commands::session::status(&app),
        Commands::Analyze {
            file,
            report,
            out,
            json,
        } => commands::analyze::run(&app, file, report, out, json).await?,
        Commands::Chat { file } => commands::chat::run(&app, file, &signal).await?,
        Commands::History => commands::analyze::history(&app).await?,
    }

    Ok(())
}
