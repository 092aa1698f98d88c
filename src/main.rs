use std::sync::Arc;
use clap::{Parser, Subcommand};

use rtm_bot::infrastructure::adapters::ConsoleConnection;
use rtm_bot::infrastructure::runtime::TokioSpawner;
use rtm_bot::{Bot, BotError, Command, Config, Conversation, ListenerConversation};

#[derive(Parser)]
#[command(name = "rtm-bot")]
#[command(about = "A chat-bot event dispatcher for Slack RTM", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Slack token (overrides config)
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

    match cli.command {
        Commands::Run => {
            if let Err(e) = run_bot(cli.config, cli.token) {
                tracing::error!("{}", e);
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!("rtm-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config();
        }
    }
}

fn run_bot(config_path: String, token_override: Option<String>) -> Result<(), BotError> {
    let mut config = if std::path::Path::new(&config_path).exists() {
        Config::load(&config_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        })
    } else {
        Config::load_env()
    };
    if let Some(token) = token_override {
        config.slack.token = Some(token);
    }

    tracing::info!("Starting {}", config.bot.name);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| BotError::Internal(format!("Failed to start runtime: {}", e)))?;

    rt.block_on(async {
        let bot = if config.slack.token().is_ok() {
            Bot::connect(&config.slack).await?
        } else {
            tracing::info!("No Slack token configured, starting console session");
            Bot::with_connection("", Arc::new(ConsoleConnection::new()), Arc::new(TokioSpawner))
        };

        bot.set_prefix(config.bot.prefix.as_str());
        bot.ignore_own_messages(config.bot.ignore_own_messages);
        register_defaults(&bot)?;
        bot.listen().await;
        Ok::<(), BotError>(())
    })
}

fn register_defaults(bot: &Bot) -> Result<(), BotError> {
    bot.register_command(
        Command::new("hello {name}", |conv: Conversation| async move {
            let name = conv.param("name").unwrap_or("there").to_string();
            if let Err(e) = conv.reply(format!("Hello, {}!", name)).await {
                tracing::warn!("Failed to reply: {}", e);
            }
        })?
        .with_description("Say hello"),
    )?;

    bot.register_command(
        Command::new("ping", |conv: Conversation| async move {
            if let Err(e) = conv.reply("pong").await {
                tracing::warn!("Failed to reply: {}", e);
            }
        })?
        .with_description("Check the bot is alive"),
    )?;

    bot.hear(r"(?i)\bthanks?\b", |conv: ListenerConversation| async move {
        if let Err(e) = conv.say("You're welcome!").await {
            tracing::warn!("Failed to reply: {}", e);
        }
    })?;

    Ok(())
}

fn init_config() {
    match serde_yaml::to_string(&Config::default()) {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to config.yaml and adjust as needed.");
        }
        Err(e) => tracing::error!("Failed to render config: {}", e),
    }
}
