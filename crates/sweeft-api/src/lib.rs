//! Store backend for the Sweeft project store.
//!
//! Exposes the two endpoints the storefront client consumes:
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/api/config` | Public gateway key for checkout setup |
//! | `POST` | `/api/verify` | `{reference}` → `{verified}`, fail-closed |
//!
//! The processor secret key never leaves this process.

pub mod config;
pub mod error;
pub mod verify;

pub use error::{Error, Result};
pub use verify::{PaystackVerifier, TransactionVerifier};

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;

// ─── Configuration ────────────────────────────────────────────────────────────

fn default_paystack_base_url() -> String { "https://api.paystack.co".to_string() }

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub paystack_public_key: String,
  pub paystack_secret_key: String,
  #[serde(default = "default_paystack_base_url")]
  pub paystack_base_url:   String,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<V> {
  pub config:   Arc<ServerConfig>,
  pub verifier: Arc<V>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build an axum [`Router`] for the store backend.
pub fn router<V>(state: AppState<V>) -> Router
where
  V: TransactionVerifier + Clone + Send + Sync + 'static,
{
  Router::new()
    .route("/api/config", get(config::handler::<V>))
    .route("/api/verify", post(verify::handler::<V>))
    .with_state(state)
}

// ─── Test support ─────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod test_helpers {
  use std::sync::Arc;

  use super::*;

  /// A verifier with a canned answer, for handler tests.
  #[derive(Clone)]
  pub struct CannedVerifier {
    pub answer: Option<bool>,
  }

  impl TransactionVerifier for CannedVerifier {
    async fn verify(&self, _reference: &str) -> Result<bool> {
      match self.answer {
        Some(v) => Ok(v),
        None => {
          // Manufacture a transport-layer failure without touching the
          // network: an unparseable URL fails at request build time.
          let err = reqwest::Client::new().get("::not a url::").build().unwrap_err();
          Err(Error::Upstream(err))
        }
      }
    }
  }

  pub fn test_state(answer: Option<bool>) -> AppState<CannedVerifier> {
    AppState {
      config:   Arc::new(ServerConfig {
        host:                "127.0.0.1".into(),
        port:                0,
        paystack_public_key: "pk_test_abc".into(),
        paystack_secret_key: "sk_test_abc".into(),
        paystack_base_url:   default_paystack_base_url(),
      }),
      verifier: Arc::new(CannedVerifier { answer }),
    }
  }
}
