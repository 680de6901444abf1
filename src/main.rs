//! calclaw CLI entry point.
//!
//! This is the main binary for calclaw.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use calclaw::agent::BookingAgent;
use calclaw::calendar::CalendarClient;
use calclaw::config::AppConfig;
use calclaw::server::{self, AppState};
use calclaw::tools::ToolRegistry;

/// Conversational calendar booking assistant.
#[derive(Parser)]
#[command(name = "calclaw")]
#[command(about = "Book, reschedule, and cancel calendar events by chatting.")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "calclaw.json")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the chat server
    Serve {
        /// Port to listen on (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Validate the configuration and show a summary
    CheckConfig,

    /// Write a default configuration file
    Init {
        /// Destination path
        #[arg(default_value = "calclaw.json")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up CALENDAR_API_TOKEN / OPENAI_API_KEY from a local .env, if any
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Serve { port } => {
            let mut config = load_config(&cli.config)?;
            if let Some(port) = port {
                config.server.port = port;
            }
            config
                .validate()
                .context("configuration is not valid; run `calclaw check-config`")?;

            tracing::info!(
                calendar_id = %config.calendar.calendar_id,
                timezone = %config.calendar.timezone,
                model = %config.llm.model,
                "starting calclaw"
            );

            let calendar = Arc::new(CalendarClient::new(&config.calendar)?);
            let registry = Arc::new(ToolRegistry::with_calendar_tools(
                calendar,
                config.assume,
            ));
            let agent = BookingAgent::new(&config.llm, registry.clone(), config.assume);

            let state = Arc::new(AppState { agent, registry });
            server::serve(state, &config.server_addr(), config.server.cors_enabled).await?;
        }

        Commands::CheckConfig => {
            let config = load_config(&cli.config)?;
            match config.validate() {
                Ok(()) => {
                    println!("Configuration OK");
                    println!();
                    println!("Server:      {}", config.server_addr());
                    println!("Calendar:    {}", config.calendar.calendar_id);
                    println!("Timezone:    {}", config.calendar.timezone);
                    println!("Model:       {}", config.llm.model);
                    println!(
                        "Assumed now: {}-{:02}",
                        config.assume.year, config.assume.month
                    );
                    println!(
                        "Secrets:     calendar token {}, model key {}",
                        presence(&config.calendar.api_token),
                        presence(&config.llm.api_key)
                    );
                }
                Err(err) => {
                    println!("Configuration invalid: {}", err);
                    std::process::exit(1);
                }
            }
        }

        Commands::Init { path } => {
            if path.exists() {
                anyhow::bail!("refusing to overwrite existing {}", path.display());
            }
            AppConfig::default().save(&path)?;
            println!("Wrote default configuration to {}", path.display());
            println!();
            println!("Next steps:");
            println!("  1. Set calendar.calendar_id in {}", path.display());
            println!("  2. Export CALENDAR_API_TOKEN and OPENAI_API_KEY");
            println!("  3. Run: calclaw serve");
        }
    }

    Ok(())
}

/// Load configuration, falling back to defaults when the file is absent so
/// an env-only setup still works.
fn load_config(path: &PathBuf) -> anyhow::Result<AppConfig> {
    let mut config = if path.exists() {
        AppConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        AppConfig::default()
    };
    config.apply_env();
    Ok(config)
}

fn presence(secret: &str) -> &'static str {
    if secret.is_empty() {
        "missing"
    } else {
        "set"
    }
}
