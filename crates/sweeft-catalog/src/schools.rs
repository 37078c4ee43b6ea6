//! The static department→school directory.
//!
//! Loaded once as an immutable map. Lookup is a case-sensitive exact match
//! on the trimmed department string; anything unlisted resolves to the
//! [`UNKNOWN_SCHOOL`] sentinel, never to an empty value.

use std::{collections::HashMap, sync::LazyLock};

use sweeft_core::project::{School, UNKNOWN_SCHOOL};

/// School names with their departments, in display order.
const DIRECTORY: &[(&str, &[&str])] = &[
  ("SCHOOL OF APPLIED SCIENCE AND TECHNOLOGY", &[
    "Department of Computer Science",
    "Department of Science Laboratory Technology",
    "Department of Statistics",
    "Department of Food Technology",
    "Department of Hospitality Management",
  ]),
  ("SCHOOL OF ENGINEERING TECHNOLOGY", &[
    "Department of Electrical Electronic Engineering",
    "Department of Mechanical Engineering",
    "Department of Civil Engineering",
    "Department of Computer Engineering",
    "Department of Agricultural Engineering",
  ]),
  ("SCHOOL OF BUSINESS STUDIES", &[
    "Department of Accountancy",
    "Department of Banking and Finance",
    "Department of Business Administration and Management",
    "Department of Marketing",
    "Department of Office Technology and Management",
  ]),
  ("SCHOOL OF ENVIRONMENTAL STUDIES", &[
    "Department of Architecture",
    "Department of Building Technology",
    "Department of Estate Management",
    "Department of Quantity Surveying",
    "Department of Surveying and Geoinformatics",
    "Department of Urban and Regional Planning",
  ]),
];

static DEPARTMENT_INDEX: LazyLock<HashMap<&'static str, &'static str>> =
  LazyLock::new(|| {
    let mut index = HashMap::new();
    for (school, departments) in DIRECTORY {
      for department in *departments {
        index.insert(*department, *school);
      }
    }
    index
  });

/// Resolve the school for `department`, falling back to the sentinel.
pub fn school_for_department(department: &str) -> &'static str {
  DEPARTMENT_INDEX
    .get(department.trim())
    .copied()
    .unwrap_or(UNKNOWN_SCHOOL)
}

/// The full directory as [`School`] records, in display order.
pub fn school_directory() -> Vec<School> {
  DIRECTORY
    .iter()
    .map(|(name, departments)| School {
      name:        (*name).to_string(),
      departments: departments.iter().map(|d| (*d).to_string()).collect(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn known_department_resolves() {
    assert_eq!(
      school_for_department("Department of Computer Science"),
      "SCHOOL OF APPLIED SCIENCE AND TECHNOLOGY"
    );
    assert_eq!(
      school_for_department("Department of Marketing"),
      "SCHOOL OF BUSINESS STUDIES"
    );
  }

  #[test]
  fn lookup_trims_but_never_fuzzes() {
    assert_eq!(
      school_for_department("  Department of Marketing  "),
      "SCHOOL OF BUSINESS STUDIES"
    );
    // Case-sensitive exact match only.
    assert_eq!(
      school_for_department("department of marketing"),
      UNKNOWN_SCHOOL
    );
    assert_eq!(school_for_department("Dept. of Marketing"), UNKNOWN_SCHOOL);
  }

  #[test]
  fn directory_departments_are_unique() {
    let all: Vec<&str> = DIRECTORY
      .iter()
      .flat_map(|(_, ds)| ds.iter().copied())
      .collect();
    let mut deduped = all.clone();
    deduped.sort_unstable();
    deduped.dedup();
    assert_eq!(all.len(), deduped.len());
  }
}
