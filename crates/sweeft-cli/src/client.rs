//! Async HTTP client for the catalog source and the store backend.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde::Deserialize;
use sweeft_core::{Error as CoreError, verify::PaymentVerifier};

/// Connection settings for the remote collaborators.
#[derive(Debug, Clone)]
pub struct ClientConfig {
  /// Base URL of the store backend (`/api/config`, `/api/verify`).
  pub api_base_url: String,
  /// Catalog sources, tried in order.
  pub catalog_urls: Vec<String>,
}

/// HTTP client for everything the storefront fetches.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based. All calls
/// run under a bounded timeout; the gateway interaction does not go through
/// here and has none.
#[derive(Clone)]
pub struct StoreClient {
  client: Client,
  config: ClientConfig,
}

#[derive(Debug, Deserialize)]
struct ConfigResponse {
  #[serde(rename = "PAYSTACK_PUBLIC_KEY")]
  paystack_public_key: String,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
  verified: bool,
}

impl StoreClient {
  pub fn new(config: ClientConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn api_url(&self, path: &str) -> String {
    format!("{}{path}", self.config.api_base_url.trim_end_matches('/'))
  }

  // ── Catalog source ────────────────────────────────────────────────────────

  /// Fetch the raw catalog payload.
  ///
  /// Transport-level concerns only: each configured source is tried in
  /// order, twice, with a cache-busting `t` parameter; the first successful
  /// body wins. Parsing belongs to `sweeft-catalog`.
  pub async fn fetch_catalog_body(&self) -> Result<String> {
    if self.config.catalog_urls.is_empty() {
      return Err(anyhow!("no catalog sources configured"));
    }

    let mut last_error = None;
    for source in &self.config.catalog_urls {
      for _attempt in 0..2 {
        let stamp = chrono::Utc::now().timestamp_millis();
        let joiner = if source.contains('?') { '&' } else { '?' };
        let url = format!("{source}{joiner}t={stamp}");

        match self.client.get(&url).send().await {
          Ok(response) if response.status().is_success() => {
            return response.text().await.context("reading catalog body");
          }
          Ok(response) => {
            last_error = Some(anyhow!("GET {source} → {}", response.status()));
          }
          Err(e) => last_error = Some(anyhow!(e).context(format!("GET {source} failed"))),
        }
      }
    }

    Err(last_error.unwrap_or_else(|| anyhow!("catalog fetch failed")))
  }

  // ── Store backend ─────────────────────────────────────────────────────────

  /// `GET /api/config` — the gateway public key.
  pub async fn fetch_public_key(&self) -> Result<String> {
    let response = self
      .client
      .get(self.api_url("/api/config"))
      .send()
      .await
      .context("GET /api/config failed")?;

    if !response.status().is_success() {
      return Err(anyhow!("GET /api/config → {}", response.status()));
    }
    let body: ConfigResponse = response.json().await.context("deserialising config")?;
    Ok(body.paystack_public_key)
  }

  /// `POST /api/verify` — whether the backend confirms `reference`.
  pub async fn verify_reference(&self, reference: &str) -> Result<bool> {
    let response = self
      .client
      .post(self.api_url("/api/verify"))
      .json(&serde_json::json!({ "reference": reference }))
      .send()
      .await
      .context("POST /api/verify failed")?;

    if !response.status().is_success() {
      return Err(anyhow!("POST /api/verify → {}", response.status()));
    }
    let body: VerifyResponse = response.json().await.context("deserialising verdict")?;
    Ok(body.verified)
  }
}

// ─── Core seam adapter ────────────────────────────────────────────────────────

/// [`PaymentVerifier`] backed by the store backend.
#[derive(Clone)]
pub struct RemoteVerifier {
  pub client: StoreClient,
}

impl PaymentVerifier for RemoteVerifier {
  async fn verify(&self, reference: &str) -> sweeft_core::Result<bool> {
    self
      .client
      .verify_reference(reference)
      .await
      .map_err(|e| CoreError::Verification(format!("{e:#}")))
  }
}
