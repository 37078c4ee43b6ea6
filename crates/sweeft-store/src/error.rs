//! Error type for `sweeft-store`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("storage i/o error: {0}")]
  Io(#[from] std::io::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
