//! `sweeft` — terminal storefront for the Sweeft project store.
//!
//! # Usage
//!
//! ```
//! sweeft --api-url https://store.example --store-dir ~/.local/share/sweeft
//! sweeft --config ~/.config/sweeft/config.toml
//! sweeft --return-url 'https://store.example/?reference=PRJ_1_AB&project=P1'
//! ```

mod app;
mod client;
mod delivery;
mod gateway;
mod ui;

use std::{io, path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use client::{ClientConfig, RemoteVerifier, StoreClient};
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use delivery::DownloadDelivery;
use gateway::{CancelHandle, LocalCallbackGateway};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use sweeft_catalog::{NormalizeOptions, parse_catalog};
use sweeft_core::flow::PurchaseFlow;
use sweeft_store::ProfileStore;

/// The human-edited sheet feed, in the vendor's tabular envelope.
const DEFAULT_CATALOG_URL: &str = "https://docs.google.com/spreadsheets/d/1mtOy-WiKy1Jd85amuJeh_JLWxWlAVvCr/gviz/tq?sheet=sweeft%20projects";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "sweeft", about = "Terminal storefront for the Sweeft project store")]
struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the store backend (default: http://localhost:8080).
  #[arg(long, env = "SWEEFT_API_URL")]
  api_url: Option<String>,

  /// Catalog source URL; may be given multiple times, tried in order.
  #[arg(long = "catalog-url", env = "SWEEFT_CATALOG_URL")]
  catalog_urls: Vec<String>,

  /// Hosted checkout page (default: <api-url>/checkout).
  #[arg(long, env = "SWEEFT_CHECKOUT_URL")]
  checkout_url: Option<String>,

  /// Profile directory for device-scoped purchases.
  #[arg(long, env = "SWEEFT_STORE_DIR")]
  store_dir: Option<PathBuf>,

  /// Where delivered assets are written.
  #[arg(long, env = "SWEEFT_DOWNLOAD_DIR")]
  download_dir: Option<PathBuf>,

  /// A return URL carrying `reference` and `project` from an external
  /// payment page; verified before any entitlement is granted.
  #[arg(long, value_name = "URL")]
  return_url: Option<String>,

  /// Do not spawn a browser for checkout (headless environments).
  #[arg(long)]
  no_browser: bool,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file. `public_key` is the inline
/// fallback used when the config endpoint is unreachable.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  api_url:      Option<String>,
  #[serde(default)]
  catalog_urls: Vec<String>,
  #[serde(default)]
  checkout_url: Option<String>,
  #[serde(default)]
  store_dir:    Option<PathBuf>,
  #[serde(default)]
  download_dir: Option<PathBuf>,
  #[serde(default)]
  public_key:   Option<String>,
  #[serde(default)]
  fixed_price:  Option<u32>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_url = args
    .api_url
    .or(file_cfg.api_url)
    .unwrap_or_else(|| "http://localhost:8080".to_string());
  let catalog_urls = if !args.catalog_urls.is_empty() {
    args.catalog_urls.clone()
  } else if !file_cfg.catalog_urls.is_empty() {
    file_cfg.catalog_urls.clone()
  } else {
    vec![DEFAULT_CATALOG_URL.to_string()]
  };
  let checkout_url = args
    .checkout_url
    .or(file_cfg.checkout_url)
    .unwrap_or_else(|| format!("{}/checkout", api_url.trim_end_matches('/')));
  let store_dir = args
    .store_dir
    .or(file_cfg.store_dir)
    .map(|p| expand_tilde(&p))
    .unwrap_or_else(|| home_dir().join(".local/share/sweeft"));
  let download_dir = args
    .download_dir
    .or(file_cfg.download_dir)
    .map(|p| expand_tilde(&p))
    .unwrap_or_else(|| home_dir().join("Downloads"));
  let options = NormalizeOptions {
    default_price: file_cfg.fixed_price.unwrap_or(2500),
  };

  let client = StoreClient::new(ClientConfig {
    api_base_url: api_url,
    catalog_urls,
  })?;

  let store = ProfileStore::open(&store_dir)
    .await
    .with_context(|| format!("opening profile store at {}", store_dir.display()))?;

  // Public key: config endpoint first, inline fallback second. With
  // neither, browsing still works and checkout fails gracefully.
  let public_key = match client.fetch_public_key().await {
    Ok(key) => Some(key),
    Err(e) => {
      tracing::warn!(error = %format!("{e:#}"), "config endpoint unreachable; using fallback");
      file_cfg.public_key
    }
  };

  // Wire the purchase flow.
  let (events_tx, events_rx) = tokio::sync::mpsc::unbounded_channel();
  let cancel = CancelHandle::default();
  let mut checkout_gateway = LocalCallbackGateway::new(checkout_url, cancel.clone());
  if args.no_browser {
    checkout_gateway = checkout_gateway.without_browser_launch();
  }
  let flow = Arc::new(PurchaseFlow::new(
    store.clone(),
    checkout_gateway,
    RemoteVerifier { client: client.clone() },
    DownloadDelivery::new(download_dir, events_tx.clone()),
    public_key,
  ));

  let mut app = App::new(flow, store, cancel, events_tx, events_rx);
  app.refresh_owned().await;

  // Load the catalog; a failure becomes the persistent banner.
  let loaded = match client.fetch_catalog_body().await {
    Ok(body) => parse_catalog(&body, &options).map_err(anyhow::Error::from),
    Err(e) => Err(e),
  };
  app.set_catalog(loaded);

  // Redirect/return path: verify before any entitlement.
  if let Some(url) = &args.return_url {
    app.process_return_url(url).await;
  }

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    // Apply anything detached tasks reported since the last frame.
    app.poll_events().await;

    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(evt) = maybe_event {
      match evt {
        Event::Key(key) => {
          let cont = app.handle_key(key).await?;
          if !cont {
            break;
          }
        }
        Event::Resize(_, _) => {
          // Terminal will redraw on next iteration.
        }
        _ => {}
      }
    }
  }

  Ok(())
}

// ─── Path helpers ─────────────────────────────────────────────────────────────

fn home_dir() -> PathBuf {
  std::env::var("HOME").map(PathBuf::from).unwrap_or_default()
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &std::path::Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
