//! Catalog codec for the Sweeft project store.
//!
//! Converts raw remote payloads into a validated, filterable catalog. Pure
//! synchronous; no HTTP or storage dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use sweeft_catalog::{NormalizeOptions, parse_catalog};
//!
//! let body = r#"{"schools":[],"projects":[]}"#;
//! let catalog = parse_catalog(body, &NormalizeOptions::default()).unwrap();
//! println!("{} projects ({} rows dropped)", catalog.projects.len(), catalog.skipped);
//! ```

pub mod envelope;
pub mod error;
pub mod index;
pub mod normalize;
pub mod schools;

pub use error::{Error, Result};
pub use index::{CatalogIndex, ProjectFilter};
pub use normalize::NormalizeOptions;

use sweeft_core::project::{Project, School};

use crate::{
  envelope::RawCatalog,
  normalize::{normalize_projects, normalize_rows},
};

// ─── Public types ────────────────────────────────────────────────────────────

/// One normalized catalog snapshot.
#[derive(Debug)]
pub struct Catalog {
  /// The school directory driving the hierarchical filter UI.
  pub schools:  Vec<School>,
  /// Exposed projects, in source order.
  pub projects: Vec<Project>,
  /// Source rows dropped during normalization.
  pub skipped:  usize,
}

impl Catalog {
  pub fn into_index(self) -> CatalogIndex {
    CatalogIndex::new(self.schools, self.projects)
  }
}

// ─── Public API ──────────────────────────────────────────────────────────────

/// Parse a raw catalog response of either recognized shape.
///
/// The tabular shape carries no school directory of its own, so the static
/// one applies; the document shape supplies its own. Either way every
/// project's `school` is derived from the department directory, not read
/// from the source.
pub fn parse_catalog(body: &str, options: &NormalizeOptions) -> Result<Catalog> {
  let (schools, normalized) = match envelope::parse_payload(body)? {
    RawCatalog::Rows(rows) => {
      (schools::school_directory(), normalize_rows(rows, options))
    }
    RawCatalog::Document(doc) => {
      (doc.schools, normalize_projects(doc.projects, options))
    }
  };

  Ok(Catalog {
    schools,
    projects: normalized.projects,
    skipped: normalized.skipped,
  })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  const ENVELOPED: &str = concat!(
    "/*O_o*/\n",
    "google.visualization.Query.setResponse(",
    r#"{"table":{"rows":["#,
    r#"{"c":[{"v":"P1"},{"v":"Fraud Detection System"},{"v":"Department of Computer Science"},{"v":"Flags suspicious card activity."},{"v":"3000"},{"v":"abc123"},{"v":"2024-01-01"},{"v":"active"}]},"#,
    r#"{"c":[{"v":"P2"},{"v":"Shelved Project"},{"v":"Department of Marketing"},{"v":"Old."},{"v":"3000"},{"v":"def456"},{"v":"2023-01-01"},{"v":"inactive"}]}"#,
    r#"]}}"#,
    ");"
  );

  #[test]
  fn enveloped_payload_yields_the_static_directory() {
    let catalog = parse_catalog(ENVELOPED, &NormalizeOptions::default()).unwrap();

    assert_eq!(catalog.projects.len(), 1);
    assert_eq!(catalog.skipped, 1);
    assert_eq!(catalog.projects[0].id, "P1");
    assert_eq!(
      catalog.projects[0].school,
      "SCHOOL OF APPLIED SCIENCE AND TECHNOLOGY"
    );
    assert!(!catalog.schools.is_empty());
  }

  #[test]
  fn inactive_rows_never_reach_the_index() {
    let catalog = parse_catalog(ENVELOPED, &NormalizeOptions::default()).unwrap();
    let index = catalog.into_index();
    let all = index.filter(&ProjectFilter::default());
    assert!(all.iter().all(|p| p.id != "P2"));
  }

  #[test]
  fn document_payload_keeps_its_own_school_directory() {
    let body = r#"{
      "schools": [{"name": "SCHOOL OF BUSINESS STUDIES", "departments": ["Department of Marketing"]}],
      "projects": [
        {"id": "P1", "name": "Retail Survey", "category": "Department of Marketing", "price": 2500, "driveId": "d1"}
      ]
    }"#;
    let catalog = parse_catalog(body, &NormalizeOptions::default()).unwrap();

    assert_eq!(catalog.schools.len(), 1);
    assert_eq!(catalog.projects.len(), 1);
    // `school` is still derived from the department directory.
    assert_eq!(catalog.projects[0].school, "SCHOOL OF BUSINESS STUDIES");
  }

  #[test]
  fn project_department_may_be_absent_from_the_directory() {
    // Inconsistency between a project's department and the school directory
    // is tolerated: the project resolves to the sentinel.
    let body = r#"{
      "schools": [{"name": "SCHOOL OF BUSINESS STUDIES", "departments": ["Department of Marketing"]}],
      "projects": [
        {"id": "P1", "name": "X", "category": "Department of Dance", "driveId": "d1"}
      ]
    }"#;
    let catalog = parse_catalog(body, &NormalizeOptions::default()).unwrap();
    assert_eq!(catalog.projects[0].school, "Unknown School");
  }
}
