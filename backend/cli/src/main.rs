use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use edgegate_completion::{HttpProvider, MockProvider};
use edgegate_config::GateConfig;
use edgegate_core::CompletionProvider;
use edgegate_gateway::{start_server, GatewayState};
use edgegate_keystore::{FileStore, KeyCache};

#[derive(Parser)]
#[command(name = "edgegate")]
#[command(about = "EdgeGate — device-authentication and request-brokering gateway")]
#[command(version)]
struct Cli {
    /// Path to the YAML config file.
    #[arg(short, long, default_value = "edgegate.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway server
    Serve {
        /// Override the configured listen address
        #[arg(short, long)]
        listen: Option<String>,
    },
    /// Compute a provisioning signature the way device firmware does
    Sign {
        /// Device identifier to sign for
        #[arg(short, long)]
        device_id: String,
        /// Factory secret (defaults to the configured one)
        #[arg(short, long)]
        secret: Option<String>,
        /// Unix-seconds timestamp (defaults to now)
        #[arg(short, long)]
        ts: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = edgegate_config::load_config(&cli.config).await?;

    match cli.command {
        Commands::Serve { listen } => {
            let config = GateConfig {
                listen_addr: listen.unwrap_or(config.listen_addr),
                ..config
            };
            run_server(config).await?;
        }
        Commands::Sign {
            device_id,
            secret,
            ts,
        } => {
            let secret = secret
                .or(config.factory_secret)
                .context("no factory secret given and none configured")?;
            let ts = ts.unwrap_or_else(|| {
                SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs() as i64
            });
            let sig = edgegate_auth::sign_hex(secret.as_bytes(), &device_id, ts);
            println!(r#"{{"device_id":"{device_id}","ts":{ts},"sig":"{sig}"}}"#);
        }
    }

    Ok(())
}

async fn run_server(config: GateConfig) -> Result<()> {
    logging::init_logger(&config.state_dir, &config.log_level);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("invalid listen address: {}", config.listen_addr))?;

    let store = Arc::new(FileStore::new(&config.state_dir));
    let cache = Arc::new(KeyCache::new(
        store,
        config.factory_secret.clone(),
        config.factory_secret_name.clone(),
        config.device_keys_name.clone(),
    ));

    let completion: Arc<dyn CompletionProvider> = if config.completion_url.is_empty() {
        info!("No completion URL configured; using mock provider");
        Arc::new(MockProvider::new())
    } else {
        Arc::new(HttpProvider::new(
            &config.completion_url,
            config.request_timeout_secs,
        )?)
    };

    let state = GatewayState::new(cache, completion, Arc::new(config));
    start_server(addr, state).await
}
