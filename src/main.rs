use clap::{CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::Shell;
use gitverse::commands;
use gitverse::config::GitVerseConfig;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "gitverse")]
#[command(about = "GitHub repository health dashboard", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API (GitHub proxy, dashboard and summary endpoints)
    #[command(short_flag = 's')]
    Serve {
        /// Address to listen on (overrides config and GITVERSE_BIND)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Score and summarize one repository
    #[command(short_flag = 'a')]
    Analyze {
        /// Repository URL (e.g., https://github.com/owner/repo) or owner/repo
        #[arg(value_hint = ValueHint::Url)]
        repo: String,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
        /// Also write a markdown report to this file
        #[arg(long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
    },
    /// Show the effective configuration (credentials are never printed)
    Config {
        /// Write the current settings to the config file
        #[arg(long)]
        init: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gitverse=info")))
        .init();

    let cli = Cli::parse();
    let config = GitVerseConfig::load();

    match cli.command {
        None => commands::display_banner(),
        Some(Commands::Serve { bind }) => commands::serve(config, bind).await?,
        Some(Commands::Analyze { repo, json, out }) => {
            commands::analyze_repo(&config, &repo, json, out.as_deref()).await?
        }
        Some(Commands::Config { init }) => commands::show_config(&config, init)?,
        Some(Commands::Completions { shell }) => {
            commands::generate_completions(shell, &mut Cli::command())
        }
    }

    Ok(())
}
