use clap::{Parser, Subcommand};
use focusflow_core::Config;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "focusflow", version, about = "FocusFlow Pomodoro timer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Goal checklist
    Goals {
        #[command(subcommand)]
        action: commands::goals::GoalsAction,
    },
    /// Weekly focus statistics
    Stats {
        /// Print the raw analytics record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Account, premium and integrations
    Account {
        #[command(subcommand)]
        action: commands::account::AccountAction,
    },
    /// Stored app settings (theme, notifications)
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Recover an interrupted session and run the daily reset until interrupted
    Daemon,
    /// Deliver a raw JSON message to the session controller
    Send {
        /// Message, e.g. '{"type":"CHECK_PREMIUM"}'
        message: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let loaded = Config::load();
    let level = loaded
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    logging::init(&level);
    let config = loaded.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "falling back to default config");
        Config::default()
    });

    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(&config, action).await,
        Commands::Goals { action } => commands::goals::run(&config, action),
        Commands::Stats { json } => commands::stats::run(&config, json),
        Commands::Account { action } => commands::account::run(&config, action),
        Commands::Settings { action } => commands::settings::run(&config, action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Daemon => commands::daemon::run(&config).await,
        Commands::Send { message } => commands::send::run(&config, &message).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
