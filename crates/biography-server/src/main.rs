use anyhow::Context;
use biography_core::badge::BADGE_TABLE_VERSION;
use biography_core::content::catalogue::CATALOGUE_VERSION;
use biography_infrastructure::{ConfigService, connect};
use biography_server::{AppState, router};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "biography-server")]
#[command(about = "Biography content and visibility engine", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Overrides `[database] url`
    #[arg(long)]
    database_url: Option<String>,

    /// Overrides `[server] bind`
    #[arg(long)]
    bind: Option<String>,

    #[arg(long, value_enum, default_value_t)]
    log_format: LogFormat,
}

fn init_tracing(default_level: &str, format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigService::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }

    init_tracing(&config.logging.level, cli.log_format);

    let pool = connect(&config.database)
        .await
        .context("Failed to open database")?;
    let app = router(AppState::sqlite(pool, &config));

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    tracing::info!(
        catalogue_version = CATALOGUE_VERSION,
        badge_table_version = BADGE_TABLE_VERSION,
        "[Server] Listening on {}",
        config.server.bind
    );

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
