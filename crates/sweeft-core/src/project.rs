//! Project and school types — the catalog's unit of sale.
//!
//! A [`Project`] is immutable once normalized for a given catalog snapshot.
//! Its `school` field is derived from the department directory at
//! normalization time and is never read back from the source.

use serde::{Deserialize, Serialize};

/// School name substituted when a department has no directory entry.
pub const UNKNOWN_SCHOOL: &str = "Unknown School";

// ─── Project ─────────────────────────────────────────────────────────────────

/// One sellable catalog entry. Every exposed project is active and carries a
/// non-empty `id` and `asset_ref`; rows violating that are dropped upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
  /// Opaque identifier, stable within one catalog snapshot.
  pub id:          String,
  pub name:        String,
  /// Free-text classification; drives the school lookup.
  pub department:  String,
  /// Derived — a directory value or [`UNKNOWN_SCHOOL`], never empty.
  pub school:      String,
  pub description: String,
  /// Whole-currency price (naira). The gateway is paid in minor units.
  pub price:       u32,
  /// Opaque locator for the underlying Drive file.
  pub asset_ref:   String,
}

impl Project {
  /// Direct-download locator for the underlying asset.
  pub fn download_url(&self) -> String {
    format!(
      "https://drive.google.com/uc?export=download&id={}",
      self.asset_ref
    )
  }

  /// Browser view locator for the underlying asset.
  pub fn view_url(&self) -> String {
    format!("https://drive.google.com/file/d/{}/view", self.asset_ref)
  }

  /// File name used when saving the delivered asset locally.
  pub fn download_file_name(&self) -> String {
    let stem: String = self
      .name
      .split_whitespace()
      .collect::<Vec<_>>()
      .join("_");
    format!("{stem}.pdf")
  }

  /// The charge amount in minor currency units (kobo).
  pub fn amount_minor(&self) -> u64 { u64::from(self.price) * 100 }
}

// ─── School ──────────────────────────────────────────────────────────────────

/// A school with its ordered department list. Drives the hierarchical filter
/// UI only; never authoritative over [`Project::school`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct School {
  pub name:        String,
  pub departments: Vec<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn project(name: &str, asset_ref: &str) -> Project {
    Project {
      id:          "P1".into(),
      name:        name.into(),
      department:  "Department of Computer Science".into(),
      school:      "SCHOOL OF APPLIED SCIENCE AND TECHNOLOGY".into(),
      description: "A test project".into(),
      price:       2500,
      asset_ref:   asset_ref.into(),
    }
  }

  #[test]
  fn download_url_embeds_asset_ref() {
    let p = project("Fraud Detection System", "abc123");
    assert_eq!(
      p.download_url(),
      "https://drive.google.com/uc?export=download&id=abc123"
    );
    assert_eq!(p.view_url(), "https://drive.google.com/file/d/abc123/view");
  }

  #[test]
  fn download_file_name_collapses_whitespace() {
    let p = project("Fraud  Detection System", "abc123");
    assert_eq!(p.download_file_name(), "Fraud_Detection_System.pdf");
  }

  #[test]
  fn amount_minor_is_price_times_hundred() {
    let p = project("X", "abc123");
    assert_eq!(p.amount_minor(), 250_000);
  }
}
