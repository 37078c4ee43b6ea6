//! sweeft-api server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) and serves
//! the storefront's config and verification endpoints over HTTP. The
//! processor secret key stays in this process; the client only ever sees
//! the public key.

use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use sweeft_api::{AppState, PaystackVerifier, ServerConfig};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Sweeft store backend")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: std::path::PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("SWEEFT"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let verifier =
    PaystackVerifier::new(&server_cfg.paystack_base_url, &server_cfg.paystack_secret_key)
      .context("failed to build verifier client")?;

  let state = AppState {
    config:   Arc::new(server_cfg.clone()),
    verifier: Arc::new(verifier),
  };

  let app = sweeft_api::router(state).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
