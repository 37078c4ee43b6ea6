//! Error type for `sweeft-catalog`.
//!
//! Only a structurally unparseable payload is an error; malformed rows are
//! skipped and counted, never raised.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The response body contains no `{ … }` region to parse.
  #[error("payload does not contain a JSON object")]
  MissingEnvelope,

  #[error("payload is not valid JSON: {0}")]
  Json(#[from] serde_json::Error),

  /// Valid JSON, but neither a tabular response nor a catalog document.
  #[error("payload has no recognizable catalog shape")]
  UnrecognizedShape,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
