use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use product_image_studio::ai::{ImageGenService, OpenRouterHttpClient, OpenRouterImageClient};
use product_image_studio::db::Database;
use product_image_studio::models::Config;
use product_image_studio::pipeline::Pipeline;
use product_image_studio::server;
use product_image_studio::storage::SupabaseStorageClient;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "product-image-studio")]
#[command(about = "AI product photo generation and editing service")]
struct CliArgs {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API (default).
    Serve {
        /// Address to bind, overriding BIND_ADDRESS.
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },
    /// Apply database migrations and exit.
    Migrate,
    /// Check whether an OpenRouter API key is accepted.
    CheckKey {
        #[arg(value_name = "KEY")]
        key: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "product_image_studio=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    let outcome = match args.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => serve(&config, bind).await,
        Command::Migrate => migrate(&config).await,
        Command::CheckKey { key } => check_key(&config, &key).await,
    };

    if let Err(e) = &outcome {
        error!("{:#}", e);
    }
    outcome
}

async fn serve(config: &Config, bind: Option<String>) -> Result<()> {
    info!("Starting product-image-studio");

    let pipeline = Pipeline::from_config(config)
        .await
        .context("Failed to initialize application")?;

    let address = bind.unwrap_or_else(|| config.bind_address.clone());
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    server::serve(listener, Arc::new(pipeline)).await?;
    info!("Server stopped");
    Ok(())
}

async fn migrate(config: &Config) -> Result<()> {
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;
    db.close().await;
    Ok(())
}

async fn check_key(config: &Config, key: &str) -> Result<()> {
    let http_client = reqwest::Client::new();
    let store = SupabaseStorageClient::from_config(config, http_client.clone())?;
    let http = OpenRouterHttpClient::from_config(config, http_client);
    let client = OpenRouterImageClient::new(http, Arc::new(store));

    if client.validate_key(key).await {
        println!("API key is valid");
    } else {
        println!("API key was rejected");
    }
    Ok(())
}
