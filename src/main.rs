use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

mod domain;
mod application;
mod infrastructure;

use infrastructure::config::Config;
use infrastructure::adapters::{ConsoleAdapter, TelegramAdapter};
use infrastructure::random::OsRandom;
use application::errors::{BotError, ConfigError};
use application::messaging::{CommandRouter, RollParser};
use application::messaging::router::drain_tasks;
use application::services::DiceService;
use domain::traits::Bot;

/// Back-off after a failed poll
const RETRY_DELAY_SECS: u64 = 5;

/// How long in-flight replies may take after a shutdown signal
const SHUTDOWN_GRACE_SECS: u64 = 10;

#[derive(Parser)]
#[command(name = "roll-bot")]
#[command(about = "A chat bot that answers /roll XdY with secure dice", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Bot token (overrides config)
    #[arg(short, long)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run => run_bot(&cli.config, cli.token),
        Commands::Version => {
            println!("roll-bot v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(&cli.config),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn load_config(config_path: &str) -> Result<Config, ConfigError> {
    if std::path::Path::new(config_path).exists() {
        Config::load(config_path)
    } else {
        tracing::info!("No config at {}, using environment and defaults", config_path);
        Config::load_env()
    }
}

fn run_bot(config_path: &str, token_override: Option<String>) -> Result<(), BotError> {
    let config = load_config(config_path)?;
    tracing::info!(
        "Starting {} (max {} dice, max {} sides)",
        config.bot.name, config.dice.max_count, config.dice.max_sides
    );

    let router = Arc::new(CommandRouter::new(
        RollParser::new(config.dice.max_count, config.dice.max_sides),
        DiceService::new(Arc::new(OsRandom::new())),
    ));

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| BotError::Internal(format!("Failed to start runtime: {}", e)))?;

    if let Some(token) = token_override.or_else(|| config.telegram_token()) {
        rt.block_on(async {
            let mut bot = TelegramAdapter::new(token, config.bot.name.clone());
            bot.fetch_bot_info().await?;
            let bot = Arc::new(bot);

            bot.start().await?;
            let mut tasks = JoinSet::new();
            tokio::select! {
                _ = run_telegram_bot(bot.clone(), router, config.poll_timeout(), &mut tasks) => {}
                _ = shutdown_signal() => {}
            }
            drain_tasks(&mut tasks, Duration::from_secs(SHUTDOWN_GRACE_SECS)).await;
            bot.stop().await
        })
    } else if !config.console_enabled() {
        Err(ConfigError::MissingField("adapters.telegram.token (console adapter is disabled)".to_string()).into())
    } else {
        // Run console bot (dev mode)
        rt.block_on(async {
            let bot = ConsoleAdapter::new(config.bot.name.clone());

            bot.start().await?;
            tokio::select! {
                result = run_console_bot(&bot, &router) => result?,
                _ = shutdown_signal() => {}
            }
            bot.stop().await
        })
    }
}

/// Poll Telegram forever, handling each message on its own task
async fn run_telegram_bot(
    bot: Arc<TelegramAdapter>,
    router: Arc<CommandRouter>,
    timeout_seconds: i64,
    tasks: &mut JoinSet<()>,
) {
    let info = bot.bot_info();
    tracing::info!("Bot started: {} (@{})", info.name, info.username);
    tracing::info!("Bot is now running. Press CTRL-C to exit.");

    let mut offset: i64 = 0;

    loop {
        match bot.get_updates(offset, timeout_seconds).await {
            Ok(updates) => {
                if !updates.is_empty() {
                    tracing::debug!("Received {} updates", updates.len());
                }
                // Reap finished replies
                while tasks.try_join_next().is_some() {}

                for update in &updates {
                    let Some(message) = update.message.as_ref().and_then(|m| m.to_domain()) else {
                        continue;
                    };
                    router.spawn_on_message(tasks, bot.clone(), message);
                }

                offset = TelegramAdapter::get_next_offset(&updates, offset);
            }
            Err(e) => {
                tracing::error!("Failed to get updates: {}", e);
                tokio::time::sleep(tokio::time::Duration::from_secs(RETRY_DELAY_SECS)).await;
            }
        }
    }
}

/// Read stdin until EOF
async fn run_console_bot(bot: &ConsoleAdapter, router: &CommandRouter) -> Result<(), BotError> {
    while let Some(message) = bot.next_message().await? {
        router.on_message(bot, &message).await;
    }
    Ok(())
}

/// Resolves on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for CTRL-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}

fn init_config(config_path: &str) -> Result<(), BotError> {
    if std::path::Path::new(config_path).exists() {
        return Err(ConfigError::InvalidValue(format!("{} already exists", config_path)).into());
    }

    let yaml = Config::default().to_yaml()?;
    std::fs::write(config_path, yaml)
        .map_err(|e| ConfigError::Parse(format!("Failed to write config: {}", e)))?;

    println!("Created {}", config_path);
    Ok(())
}
