//! Error types for `sweeft-core`.

use thiserror::Error;

use crate::purchase::PurchaseState;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid buyer email: {0:?}")]
  InvalidEmail(String),

  #[error("illegal purchase transition: {from:?} -> {to:?}")]
  InvalidTransition {
    from: PurchaseState,
    to:   PurchaseState,
  },

  /// No payment public key could be obtained, so a checkout cannot be opened.
  #[error("payment is not available: no gateway public key configured")]
  PaymentUnavailable,

  #[error("gateway error: {0}")]
  Gateway(String),

  #[error("verification error: {0}")]
  Verification(String),

  #[error("delivery error: {0}")]
  Delivery(String),

  #[error("entitlement store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
