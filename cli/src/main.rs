use std::path::PathBuf;

use clap::{Parser, Subcommand};

use iseeyou_cli::commands::{self, ReplayOptions};
use iseeyou_cli::logging;

#[derive(Parser)]
#[command(version, about = "Replay targeting scenarios and manage tracker settings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario file through the tracker and print every notification
    Replay {
        scenario: PathBuf,
        /// Use this config file instead of the stored one
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Pace frames in wall-clock time
        #[arg(long)]
        realtime: bool,
        /// Seed for generated highlight colors
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Inspect or reset the stored configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    Show {
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    Path,
    Reset {
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let cli = Cli::parse();
    let _log_guard = logging::init();

    match cli.command {
        Commands::Replay {
            scenario,
            config,
            realtime,
            seed,
        } => {
            let options = ReplayOptions {
                scenario,
                config,
                realtime,
                seed,
            };
            let summary = commands::replay(&options).await?;
            commands::print_summary(&summary);
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { file } => commands::show_config(file.as_deref())?,
            ConfigAction::Path => commands::show_config_path()?,
            ConfigAction::Reset { file } => commands::reset_config(file.as_deref())?,
        },
    }

    Ok(())
}
