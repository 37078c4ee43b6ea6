//! The server-side payment verification seam.

use crate::Result;

/// Asks the store backend whether the gateway really settled `reference`.
///
/// Callers must treat any `Err` the same as `Ok(false)` — verification is
/// fail-closed and never grants entitlement on doubt.
pub trait PaymentVerifier {
  async fn verify(&self, reference: &str) -> Result<bool>;
}
