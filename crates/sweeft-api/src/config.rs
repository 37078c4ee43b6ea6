//! Handler for `GET /api/config`.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{AppState, verify::TransactionVerifier};

/// The public checkout configuration. Field name matches the key the
/// storefront client (and its inline fallback block) expects.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigResponse {
  #[serde(rename = "PAYSTACK_PUBLIC_KEY")]
  pub paystack_public_key: String,
}

/// `GET /api/config`
pub async fn handler<V>(State(state): State<AppState<V>>) -> Json<ConfigResponse>
where
  V: TransactionVerifier,
{
  Json(ConfigResponse {
    paystack_public_key: state.config.paystack_public_key.clone(),
  })
}
