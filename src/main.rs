use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::Arc;

use cogbot::application::errors::BotError;
use cogbot::application::messaging::MessageParser;
use cogbot::application::services::{AdminService, MessageService};
use cogbot::cogs::{BuiltinCatalog, CogRegistry, CogSource, GuildScope, HostContext};
use cogbot::domain::entities::User;
use cogbot::domain::traits::{Bot, EventBus, GuildStore};
use cogbot::infrastructure::adapters::ConsoleAdapter;
use cogbot::infrastructure::cogs::DirectorySource;
use cogbot::infrastructure::config::Config;
use cogbot::infrastructure::database::SqliteGuildStore;
use cogbot::infrastructure::events::LocalEventBus;
use cogbot::infrastructure::storage::MemoryGuildStore;

#[derive(Parser)]
#[command(name = "cogbot")]
#[command(about = "A chat bot host with hot-reloadable cogs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Cogs directory (overrides config)
    #[arg(long)]
    cogs_dir: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot with the console adapter
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
    /// Discover and load cogs, print what was found, then exit
    Cogs,
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
        Commands::Run => load_config(&cli.config, cli.cogs_dir).and_then(run_bot),
        Commands::Version => {
            println!("cogbot v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(),
        Commands::Cogs => load_config(&cli.config, cli.cogs_dir).and_then(list_cogs),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn load_config(path: &str, cogs_dir: Option<String>) -> Result<Config, BotError> {
    let mut config = if Path::new(path).exists() {
        Config::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        })
    } else {
        Config::load_env()
    };

    if let Some(dir) = cogs_dir {
        config.cogs.directory = dir.into();
    }
    config.validate()?;
    Ok(config)
}

fn open_store(config: &Config) -> Result<Arc<dyn GuildStore>, BotError> {
    let defaults = config.guilds.default_cogs.clone();
    match &config.guilds.database {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let store = SqliteGuildStore::new(path, defaults)
                .map_err(|e| BotError::Storage(e.into()))?;
            tracing::info!("Guild database initialized at {}", path.display());
            Ok(Arc::new(store))
        }
        None => {
            tracing::info!("No guild database configured, keeping enablement in memory");
            Ok(Arc::new(MemoryGuildStore::new(defaults)))
        }
    }
}

fn build_registry(config: &Config, bus: Arc<dyn EventBus>) -> Result<Arc<CogRegistry>, BotError> {
    let host = HostContext {
        bot_name: config.bot.name.clone(),
        prefix: config.bot.prefix.clone(),
        guilds: GuildScope::new(open_store(config)?),
    };
    let source: Arc<dyn CogSource> = Arc::new(
        DirectorySource::new(&config.cogs.directory, BuiltinCatalog::standard())
            .with_builtin_fallback(config.cogs.builtin_fallback),
    );
    Ok(Arc::new(CogRegistry::new(source, bus, host)))
}

fn run_bot(config: Config) -> Result<(), BotError> {
    tracing::info!("Starting cogbot: {}", config.bot.name);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let bus: Arc<dyn EventBus> = Arc::new(LocalEventBus::new());
        let registry = build_registry(&config, bus.clone())?;

        if config.cogs.auto_load {
            let report = registry.discover_and_load_all().await;
            for (locator, reason) in &report.failed {
                tracing::warn!("Cog at {} failed to load: {}", locator, reason);
            }
        }

        let guild = config.console.guild_id.clone();
        registry.host().guilds.ensure_guild(&guild).await?;

        let admin = Arc::new(AdminService::new(registry));
        let service = MessageService::new(
            ConsoleAdapter::new(config.bot.name.clone()),
            MessageParser::new(config.bot.prefix.clone()),
            admin,
            bus,
        );
        let user = User::new(config.console.user_id.clone()).with_username("console");
        run_console_bot(&service, &guild, user).await
    })
}

async fn run_console_bot(service: &MessageService<ConsoleAdapter>, guild: &str, user: User) -> Result<(), BotError> {
    let bot = service.bot();
    bot.start().await?;

    let info = bot.bot_info();
    tracing::info!("Bot started: @{} in guild {}", info.username, guild);

    // Main loop (for console mode)
    while let Some(input) = bot.read_line("> ").await {
        if input.is_empty() {
            continue;
        }
        if input == "/quit" || input == "/exit" {
            break;
        }

        match service.handle_text(guild, &input, Some(user.clone())).await {
            Ok(Some(response)) => {
                service.respond(guild, &response).await?;
            }
            Ok(None) => {}
            Err(e) => {
                service.respond(guild, &format!("Error: {}", e)).await?;
            }
        }
    }

    tracing::info!("Console input closed, shutting down");
    Ok(())
}

fn list_cogs(config: Config) -> Result<(), BotError> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let registry = build_registry(&config, Arc::new(LocalEventBus::new()))?;
        let report = registry.discover_and_load_all().await;

        for info in registry.cogs_info() {
            let degraded = if info.degraded { " [degraded]" } else { "" };
            println!(
                "{:<16} {:<20} {} command(s), {} event(s){}",
                info.id, info.name, info.commands, info.events, degraded
            );
        }
        for skipped in &report.skipped {
            println!("skipped: {}", skipped);
        }
        for (locator, reason) in &report.failed {
            println!("failed:  {} ({})", locator, reason);
        }
        Ok(())
    })
}

fn init_config() -> Result<(), BotError> {
    let yaml = Config::default().to_yaml()?;
    println!("{}", yaml);
    println!("\nSave this to config.yaml and adjust as needed.");
    Ok(())
}
