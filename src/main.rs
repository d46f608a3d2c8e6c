use anyhow::Result;
use clap::{Parser, Subcommand};
use vigil::commands;

#[derive(Parser)]
#[command(name = "vigil")]
#[command(about = "TikTok repost monitoring daemon", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the monitoring loop (exits 0 on shutdown and on restart requests)
    Run,

    /// Run a single check cycle and exit
    Check,

    /// Show persisted monitoring stats
    Status,

    /// Notification utilities
    Notify {
        #[command(subcommand)]
        command: NotifyCommands,
    },
}

#[derive(Subcommand)]
enum NotifyCommands {
    /// Send a test notification through every enabled channel
    Test,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run => commands::run(),
        Commands::Check => commands::check(),
        Commands::Status => commands::status(),
        Commands::Notify { command } => match command {
            NotifyCommands::Test => commands::notify_test(),
        },
    }
}
