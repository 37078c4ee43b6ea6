//! Error type for `sweeft-api`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The payment processor could not be reached or answered garbage.
  /// Handlers map this to an unverified result rather than a 5xx.
  #[error("upstream verification request failed: {0}")]
  Upstream(#[from] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
