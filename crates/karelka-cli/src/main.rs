use clap::{ArgAction, Parser, Subcommand};
use commands::{config, sync};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "karelka")]
#[command(about = "Karelka - push watched media from your library to Trakt")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync watched items to the Trakt history log (one-time run)
    #[command(
        long_about = "Read fully watched progress records from the local library database, resolve each against Trakt, append watched entries to your history, and write a JSON report of what synced and what failed. Per-item failures are recorded in the report and never fail the run."
    )]
    Sync {
        /// Write the report to this path instead of the data directory
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,
    },
    /// Configure credentials and settings
    #[command(
        long_about = "Manage configuration and credentials. Use subcommands to view settings, set up the Trakt API application, or point at the library database. Running without a subcommand shows the current configuration."
    )]
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks sensitive data)
    Show,

    /// Configure Trakt (OAuth flow)
    #[command(
        long_about = "Configure Trakt API credentials and perform OAuth authentication. You'll need to create a Trakt API application at https://trakt.tv/oauth/applications first."
    )]
    Trakt {
        /// Trakt Client ID (if not provided, will prompt)
        #[arg(long)]
        client_id: Option<String>,

        /// Trakt Client Secret (if not provided, will prompt)
        #[arg(long)]
        client_secret: Option<String>,
    },

    /// Configure the local progress database
    Store {
        /// Database URL, e.g. sqlite:///var/lib/mediacenter/library.db
        #[arg(long)]
        database_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    logging::init_logging(cli.verbose, cli.quiet)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Sync { report } => sync::run_sync(report, &output).await,
        Commands::Config { cmd } => {
            let cmd = cmd.unwrap_or(ConfigCommands::Show);
            config::run_config(cmd, &output).await
        }
    }
}
