//! Row normalization — loosely-typed source rows to validated [`Project`]s.
//!
//! Pure function of its inputs. Malformed rows are dropped and counted,
//! never raised; source order is preserved; duplicate ids pass through
//! untouched (uniqueness is the source's documented responsibility).

use serde::Deserialize;
use serde_json::Value;

use crate::{envelope::RawRow, schools::school_for_department};
use sweeft_core::project::Project;

/// Substituted when a row carries no description.
const FALLBACK_DESCRIPTION: &str = "No description available.";

/// Catalog-wide settings applied during normalization.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
  /// Price substituted when the source omits or garbles the price cell.
  pub default_price: u32,
}

impl Default for NormalizeOptions {
  fn default() -> Self { Self { default_price: 2500 } }
}

/// The normalized output: exposed projects plus the count of dropped rows.
#[derive(Debug)]
pub struct Normalized {
  pub projects: Vec<Project>,
  pub skipped:  usize,
}

// ─── Column contract ─────────────────────────────────────────────────────────

/// Fixed positions for the tabular source. Column 6 (date added) is not part
/// of the catalog and is ignored.
mod col {
  pub const ID: usize = 0;
  pub const NAME: usize = 1;
  pub const DEPARTMENT: usize = 2;
  pub const DESCRIPTION: usize = 3;
  pub const PRICE: usize = 4;
  pub const ASSET_REF: usize = 5;
  pub const STATUS: usize = 7;
}

// ─── Field extraction ────────────────────────────────────────────────────────

/// The fields shared by both source shapes, before validation.
struct RowFields {
  id:          Option<String>,
  name:        Option<String>,
  department:  Option<String>,
  description: Option<String>,
  price:       Option<String>,
  asset_ref:   Option<String>,
  status:      Option<String>,
}

/// A project entry from the plain-document source shape. Loosely typed: the
/// feed is human-edited, so prices arrive as numbers or strings and any
/// field may be missing.
#[derive(Debug, Deserialize)]
pub struct RawProject {
  #[serde(default)]
  pub id:          Option<String>,
  #[serde(default)]
  pub name:        Option<String>,
  /// The document shape historically calls the department `category`.
  #[serde(default, alias = "department")]
  pub category:    Option<String>,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub price:       Option<Value>,
  #[serde(default, rename = "driveId", alias = "assetRef")]
  pub drive_id:    Option<String>,
  #[serde(default)]
  pub status:      Option<String>,
}

/// Render a sparse cell as trimmed text; empty cells collapse to `None`.
fn cell_text(cell: Option<&Value>) -> Option<String> {
  let rendered = match cell? {
    Value::String(s) => s.trim().to_string(),
    Value::Number(n) => n.to_string(),
    Value::Bool(b) => b.to_string(),
    Value::Null => return None,
    other => other.to_string(),
  };
  if rendered.is_empty() { None } else { Some(rendered) }
}

fn non_empty(field: Option<String>) -> Option<String> {
  field.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl RowFields {
  fn from_row(row: &RawRow) -> Self {
    let cell = |index: usize| cell_text(row.get(index).and_then(Option::as_ref));
    Self {
      id:          cell(col::ID),
      name:        cell(col::NAME),
      department:  cell(col::DEPARTMENT),
      description: cell(col::DESCRIPTION),
      price:       cell(col::PRICE),
      asset_ref:   cell(col::ASSET_REF),
      status:      cell(col::STATUS),
    }
  }

  fn from_project(raw: RawProject) -> Self {
    Self {
      id:          non_empty(raw.id),
      name:        non_empty(raw.name),
      department:  non_empty(raw.category),
      description: non_empty(raw.description),
      price:       raw.price.as_ref().and_then(|v| cell_text(Some(v))),
      asset_ref:   non_empty(raw.drive_id),
      status:      non_empty(raw.status),
    }
  }
}

// ─── Normalization ───────────────────────────────────────────────────────────

/// Validate one row's fields. `None` means the row is skipped.
fn normalize_fields(fields: RowFields, options: &NormalizeOptions) -> Option<Project> {
  // A project without an id, a name, or an asset is not a valid entry.
  let id = fields.id?;
  let name = fields.name?;
  let asset_ref = fields.asset_ref?;

  // Absent status defaults to active; anything else is hidden.
  let status = fields.status.unwrap_or_else(|| "active".to_string());
  if !status.eq_ignore_ascii_case("active") {
    return None;
  }

  let department = fields.department.unwrap_or_default();
  let school = school_for_department(&department).to_string();

  // A garbled price never fails the row.
  let price = fields
    .price
    .and_then(|p| p.trim().parse::<u32>().ok())
    .unwrap_or(options.default_price);

  Some(Project {
    id,
    name,
    department,
    school,
    description: fields
      .description
      .unwrap_or_else(|| FALLBACK_DESCRIPTION.to_string()),
    price,
    asset_ref,
  })
}

/// Normalize tabular rows, preserving source order.
pub fn normalize_rows(rows: Vec<RawRow>, options: &NormalizeOptions) -> Normalized {
  normalize_all(rows.iter().map(RowFields::from_row), options)
}

/// Normalize document-shape project entries, preserving source order.
pub fn normalize_projects(
  raw: Vec<RawProject>,
  options: &NormalizeOptions,
) -> Normalized {
  normalize_all(raw.into_iter().map(RowFields::from_project), options)
}

fn normalize_all(
  fields: impl Iterator<Item = RowFields>,
  options: &NormalizeOptions,
) -> Normalized {
  let mut projects = Vec::new();
  let mut skipped = 0usize;
  for row in fields {
    match normalize_fields(row, options) {
      Some(project) => projects.push(project),
      None => skipped += 1,
    }
  }
  Normalized { projects, skipped }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
