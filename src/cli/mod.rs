use clap::{Parser, Subcommand};
use council::observability::{init_logging, LogFormat};

pub mod config;
pub mod init;
pub mod inspect;
pub mod run;
pub mod version;

#[derive(Parser)]
#[command(name = "council")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Host CLI for the council governance engine", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default configuration file
    Init {
        /// Path to config file (default: <config dir>/council/config.toml)
        #[arg(long)]
        config: Option<String>,

        /// Initial controller address (repeat for several, in registry order)
        #[arg(long = "controller", required = true)]
        controllers: Vec<String>,

        /// Snapshot path to record in the config (default: next to the config)
        #[arg(long)]
        snapshot: Option<String>,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Replay a JSON-lines message log through the engine
    Run {
        /// Path to config file (default: <config dir>/council/config.toml)
        #[arg(long)]
        config: Option<String>,

        /// Message log, one JSON message per line ("-" for stdin)
        #[arg(long, default_value = "-")]
        input: String,

        /// Snapshot to load from and save to (overrides the config)
        #[arg(long)]
        snapshot: Option<String>,
    },

    /// Show controllers, open proposals and digest of a snapshot
    Inspect {
        /// Snapshot file (default: the config's snapshot_path)
        #[arg(long)]
        snapshot: Option<String>,

        /// Path to config file (default: <config dir>/council/config.toml)
        #[arg(long)]
        config: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Display version information
    Version,
}

pub async fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Init {
            config,
            controllers,
            snapshot,
            force,
        } => {
            init_logging(LogFormat::Compact, "warn");
            init::execute(config, controllers, snapshot, force).await
        }
        Commands::Run {
            config,
            input,
            snapshot,
        } => run::execute(config, input, snapshot).await,
        Commands::Inspect {
            snapshot,
            config,
            json,
        } => {
            init_logging(LogFormat::Compact, "warn");
            inspect::execute(snapshot, config, json).await
        }
        Commands::Version => {
            version::execute();
            Ok(())
        }
    }
}
