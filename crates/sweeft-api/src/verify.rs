//! Transaction verification — `POST /api/verify`.
//!
//! The handler is fail-closed by construction: only a processor-confirmed
//! reference yields `{"verified": true}`. Upstream trouble of any kind is an
//! unverified result, never a 5xx, so the client's own fail-closed handling
//! sees one consistent shape.

use std::{future::Future, time::Duration};

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{AppState, Result};

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
  pub reference: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
  pub verified: bool,
}

// ─── Verifier trait ──────────────────────────────────────────────────────────

/// Asks the payment processor whether `reference` settled successfully.
///
/// Methods return `Send` futures so the trait can be used from axum handlers
/// on a multi-threaded runtime.
pub trait TransactionVerifier: Send + Sync {
  fn verify<'a>(
    &'a self,
    reference: &'a str,
  ) -> impl Future<Output = Result<bool>> + Send + 'a;
}

// ─── Paystack implementation ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct PaystackEnvelope {
  status: bool,
  #[serde(default)]
  data:   Option<PaystackTransaction>,
}

#[derive(Debug, Deserialize)]
struct PaystackTransaction {
  status: String,
}

/// Verifier backed by the processor's `GET /transaction/verify/{reference}`.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct PaystackVerifier {
  client:     reqwest::Client,
  base_url:   String,
  secret_key: String,
}

impl PaystackVerifier {
  pub fn new(base_url: &str, secret_key: &str) -> reqwest::Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self {
      client,
      base_url: base_url.trim_end_matches('/').to_string(),
      secret_key: secret_key.to_string(),
    })
  }
}

impl TransactionVerifier for PaystackVerifier {
  async fn verify(&self, reference: &str) -> Result<bool> {
    let url = format!("{}/transaction/verify/{reference}", self.base_url);
    let response = self
      .client
      .get(url)
      .bearer_auth(&self.secret_key)
      .send()
      .await?;

    if !response.status().is_success() {
      tracing::debug!(reference, status = %response.status(), "processor declined lookup");
      return Ok(false);
    }

    let envelope: PaystackEnvelope = response.json().await?;
    Ok(envelope.status && envelope.data.is_some_and(|t| t.status == "success"))
  }
}

// ─── Handler ─────────────────────────────────────────────────────────────────

/// `POST /api/verify` — body `{"reference": "..."}`.
pub async fn handler<V>(
  State(state): State<AppState<V>>,
  Json(body): Json<VerifyRequest>,
) -> Json<VerifyResponse>
where
  V: TransactionVerifier,
{
  let verified = match state.verifier.verify(&body.reference).await {
    Ok(confirmed) => confirmed,
    Err(e) => {
      tracing::warn!(reference = %body.reference, error = %e, "verification lookup failed");
      false
    }
  };

  tracing::info!(reference = %body.reference, verified, "verification processed");
  Json(VerifyResponse { verified })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use tower::ServiceExt as _;

  use super::*;
  use crate::{router, test_helpers::test_state};

  async fn post_verify(answer: Option<bool>, reference: &str) -> VerifyResponse {
    let app = router(test_state(answer));
    let body = serde_json::json!({ "reference": reference }).to_string();

    let response = app
      .oneshot(
        Request::builder()
          .method("POST")
          .uri("/api/verify")
          .header(header::CONTENT_TYPE, "application/json")
          .body(Body::from(body))
          .unwrap(),
      )
      .await
      .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  #[tokio::test]
  async fn confirmed_reference_verifies() {
    let response = post_verify(Some(true), "PRJ_1_ABC").await;
    assert!(response.verified);
  }

  #[tokio::test]
  async fn declined_reference_does_not_verify() {
    let response = post_verify(Some(false), "PRJ_1_ABC").await;
    assert!(!response.verified);
  }

  #[tokio::test]
  async fn upstream_failure_fails_closed() {
    let response = post_verify(None, "PRJ_1_ABC").await;
    assert!(!response.verified);
  }

  #[tokio::test]
  async fn malformed_body_is_rejected() {
    let app = router(test_state(Some(true)));
    let response = app
      .oneshot(
        Request::builder()
          .method("POST")
          .uri("/api/verify")
          .header(header::CONTENT_TYPE, "application/json")
          .body(Body::from("{}"))
          .unwrap(),
      )
      .await
      .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
  }

  #[test]
  fn paystack_envelope_shapes_decode() {
    let confirmed: PaystackEnvelope = serde_json::from_str(
      r#"{"status":true,"message":"Verification successful","data":{"status":"success","amount":250000}}"#,
    )
    .unwrap();
    assert!(confirmed.status);
    assert_eq!(confirmed.data.unwrap().status, "success");

    let abandoned: PaystackEnvelope =
      serde_json::from_str(r#"{"status":true,"data":{"status":"abandoned"}}"#).unwrap();
    assert_eq!(abandoned.data.unwrap().status, "abandoned");

    let missing: PaystackEnvelope = serde_json::from_str(r#"{"status":false}"#).unwrap();
    assert!(missing.data.is_none());
  }
}
