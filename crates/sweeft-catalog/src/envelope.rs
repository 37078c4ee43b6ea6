//! Raw payload decoding.
//!
//! The remote source answers in one of two shapes, and the caller does not
//! know in advance which is active:
//!
//! - a tabular payload wrapped in a vendor envelope
//!   (`…setResponse({ "table": { "rows": [ { "c": [ { "v": … } ] } ] } });`),
//!   which must be unwrapped before JSON parsing;
//! - a plain catalog document (`{ "schools": […], "projects": […] }`).

use serde::Deserialize;
use serde_json::Value;

use crate::{
  error::{Error, Result},
  normalize::RawProject,
};
use sweeft_core::project::School;

// ─── Decoded shapes ──────────────────────────────────────────────────────────

/// A single source row: sparse, positional, untyped cells.
pub type RawRow = Vec<Option<Value>>;

/// The two recognized payload shapes, decoded but not yet normalized.
pub enum RawCatalog {
  /// Tabular rows from the enveloped vendor response.
  Rows(Vec<RawRow>),
  /// A plain catalog document.
  Document(CatalogDocument),
}

#[derive(Debug, Deserialize)]
pub struct CatalogDocument {
  #[serde(default)]
  pub schools:  Vec<School>,
  #[serde(default)]
  pub projects: Vec<RawProject>,
}

// ─── Vendor envelope ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct VendorResponse {
  table: VendorTable,
}

#[derive(Deserialize)]
struct VendorTable {
  #[serde(default)]
  rows: Vec<VendorRow>,
}

#[derive(Deserialize)]
struct VendorRow {
  #[serde(default)]
  c: Vec<Option<VendorCell>>,
}

#[derive(Deserialize)]
struct VendorCell {
  #[serde(default)]
  v: Option<Value>,
}

/// Locate the JSON object inside an (optionally) enveloped text body: the
/// substring from the first `{` to the last `}`. A plain JSON document is
/// its own envelope.
pub fn extract_json(body: &str) -> Result<&str> {
  let start = body.find('{').ok_or(Error::MissingEnvelope)?;
  let end = body.rfind('}').ok_or(Error::MissingEnvelope)?;
  if end < start {
    return Err(Error::MissingEnvelope);
  }
  Ok(&body[start..=end])
}

/// Decode a raw response body into one of the recognized catalog shapes.
pub fn parse_payload(body: &str) -> Result<RawCatalog> {
  let json = extract_json(body)?;
  let value: Value = serde_json::from_str(json)?;

  let Some(object) = value.as_object() else {
    return Err(Error::UnrecognizedShape);
  };

  if object.contains_key("table") {
    let response: VendorResponse = serde_json::from_value(value)?;
    let rows = response
      .table
      .rows
      .into_iter()
      .map(|row| row.c.into_iter().map(|cell| cell.and_then(|c| c.v)).collect())
      .collect();
    return Ok(RawCatalog::Rows(rows));
  }

  if object.contains_key("projects") {
    let document: CatalogDocument = serde_json::from_value(value)?;
    return Ok(RawCatalog::Document(document));
  }

  Err(Error::UnrecognizedShape)
}

#[cfg(test)]
mod tests {
  use super::*;

  const ENVELOPED: &str = concat!(
    "/*O_o*/\n",
    "google.visualization.Query.setResponse(",
    r#"{"version":"0.6","table":{"cols":[{"label":"id"}],"rows":[{"c":[{"v":"P1"},{"v":"Name"},null]}]}}"#,
    ");"
  );

  #[test]
  fn unwraps_the_vendor_envelope() {
    let RawCatalog::Rows(rows) = parse_payload(ENVELOPED).unwrap() else {
      panic!("expected rows");
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], Some(Value::String("P1".into())));
    assert_eq!(rows[0][2], None);
  }

  #[test]
  fn accepts_a_plain_document() {
    let body = r#"{"schools":[],"projects":[{"id":"P1","name":"N","driveId":"d1"}]}"#;
    let RawCatalog::Document(doc) = parse_payload(body).unwrap() else {
      panic!("expected document");
    };
    assert_eq!(doc.projects.len(), 1);
  }

  #[test]
  fn body_without_braces_is_a_load_error() {
    assert!(matches!(
      parse_payload("error: quota exceeded"),
      Err(Error::MissingEnvelope)
    ));
    assert!(matches!(parse_payload("}{"), Err(Error::MissingEnvelope)));
  }

  #[test]
  fn invalid_json_between_braces_is_a_load_error() {
    assert!(matches!(
      parse_payload("callback({not json});"),
      Err(Error::Json(_))
    ));
  }

  #[test]
  fn unrelated_object_is_not_a_catalog() {
    assert!(matches!(
      parse_payload(r#"{"status":"ok"}"#),
      Err(Error::UnrecognizedShape)
    ));
  }
}
