//! The in-memory catalog index and filter engine.
//!
//! Answers independent predicates over the normalized project list. The
//! school→department UI coupling is the caller's concern; the engine itself
//! applies whatever predicates it is given.

use sweeft_core::project::{Project, School};

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Optional, independent predicates. `None` means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
  /// Exact-string match on the derived school.
  pub school:     Option<String>,
  /// Exact-string match on the department.
  pub department: Option<String>,
  /// Case-insensitive substring match over name, department, school, and
  /// description.
  pub query:      Option<String>,
}

impl ProjectFilter {
  pub fn is_empty(&self) -> bool {
    self.school.is_none() && self.department.is_none() && self.query.is_none()
  }
}

// ─── Index ───────────────────────────────────────────────────────────────────

/// The normalized catalog, held in source order.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
  schools:  Vec<School>,
  projects: Vec<Project>,
}

impl CatalogIndex {
  pub fn new(schools: Vec<School>, projects: Vec<Project>) -> Self {
    Self { schools, projects }
  }

  pub fn schools(&self) -> &[School] { &self.schools }

  pub fn projects(&self) -> &[Project] { &self.projects }

  pub fn len(&self) -> usize { self.projects.len() }

  pub fn is_empty(&self) -> bool { self.projects.is_empty() }

  /// First project with `id`, if any.
  pub fn get(&self, id: &str) -> Option<&Project> {
    self.projects.iter().find(|p| p.id == id)
  }

  /// Projects satisfying all supplied predicates, in catalog order.
  /// No predicates returns the full catalog unchanged.
  pub fn filter(&self, filter: &ProjectFilter) -> Vec<&Project> {
    let query = filter.query.as_deref().map(str::to_lowercase);
    self
      .projects
      .iter()
      .filter(|p| {
        filter.school.as_deref().is_none_or(|s| p.school == s)
          && filter.department.as_deref().is_none_or(|d| p.department == d)
          && query.as_deref().is_none_or(|q| search_haystack(p).contains(q))
      })
      .collect()
  }

  /// Valid department choices for a school selection. `None` means all
  /// schools: the flattened directory in display order.
  pub fn departments_for(&self, school: Option<&str>) -> Vec<String> {
    match school {
      None => self
        .schools
        .iter()
        .flat_map(|s| s.departments.iter().cloned())
        .collect(),
      Some(name) => self
        .schools
        .iter()
        .find(|s| s.name == name)
        .map(|s| s.departments.clone())
        .unwrap_or_default(),
    }
  }
}

/// The lowercased concatenation the free-text predicate matches against.
fn search_haystack(project: &Project) -> String {
  format!(
    "{} {} {} {}",
    project.name, project.department, project.school, project.description
  )
  .to_lowercase()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use crate::schools::{school_directory, school_for_department};

  fn project(id: &str, name: &str, department: &str) -> Project {
    Project {
      id:          id.into(),
      name:        name.into(),
      department:  department.into(),
      school:      school_for_department(department).to_string(),
      description: format!("{name} write-up"),
      price:       2500,
      asset_ref:   format!("drive-{id}"),
    }
  }

  fn index() -> CatalogIndex {
    CatalogIndex::new(school_directory(), vec![
      project("P1", "Fraud Detection System", "Department of Computer Science"),
      project("P2", "Retail Loyalty Survey", "Department of Marketing"),
      project("P3", "Bridge Load Analysis", "Department of Civil Engineering"),
      project("P4", "Sales Forecasting Model", "Department of Marketing"),
    ])
  }

  #[test]
  fn no_predicates_returns_the_catalog_unchanged() {
    let idx = index();
    let all = idx.filter(&ProjectFilter::default());
    let ids: Vec<&str> = all.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["P1", "P2", "P3", "P4"]);

    // Referential transparency: same arguments, same result.
    assert_eq!(all, idx.filter(&ProjectFilter::default()));
  }

  #[test]
  fn independent_predicates_commute() {
    let idx = index();
    let school = "SCHOOL OF BUSINESS STUDIES".to_string();
    let department = "Department of Marketing".to_string();

    let by_school = idx.filter(&ProjectFilter {
      school: Some(school.clone()),
      ..Default::default()
    });
    let narrowed: Vec<&Project> = by_school
      .into_iter()
      .filter(|p| p.department == department)
      .collect();

    let combined = idx.filter(&ProjectFilter {
      school:     Some(school),
      department: Some(department),
      query:      None,
    });

    assert_eq!(narrowed, combined);
    assert_eq!(
      combined.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
      ["P2", "P4"]
    );
  }

  #[test]
  fn query_matches_case_insensitively_across_fields() {
    let idx = index();

    // Matches via the department field regardless of case.
    let hits = idx.filter(&ProjectFilter {
      query: Some("MARKETING".into()),
      ..Default::default()
    });
    let ids: Vec<&str> = hits.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["P2", "P4"]);

    // Substring, not tokenized.
    let hits = idx.filter(&ProjectFilter {
      query: Some("fraud detect".into()),
      ..Default::default()
    });
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "P1");

    // Absent substring matches nothing.
    let hits = idx.filter(&ProjectFilter {
      query: Some("blockchain".into()),
      ..Default::default()
    });
    assert!(hits.is_empty());
  }

  #[test]
  fn school_predicate_is_exact() {
    let idx = index();
    let hits = idx.filter(&ProjectFilter {
      school: Some("school of business studies".into()),
      ..Default::default()
    });
    assert!(hits.is_empty());
  }

  #[test]
  fn departments_follow_the_school_selection() {
    let idx = index();

    let business = idx.departments_for(Some("SCHOOL OF BUSINESS STUDIES"));
    assert!(business.contains(&"Department of Marketing".to_string()));
    assert!(!business.contains(&"Department of Computer Science".to_string()));

    let all = idx.departments_for(None);
    assert!(all.contains(&"Department of Marketing".to_string()));
    assert!(all.contains(&"Department of Computer Science".to_string()));

    assert!(idx.departments_for(Some("SCHOOL OF NOWHERE")).is_empty());
  }

  #[test]
  fn get_returns_the_first_match() {
    let idx = index();
    assert_eq!(idx.get("P3").map(|p| p.name.as_str()), Some("Bridge Load Analysis"));
    assert!(idx.get("P9").is_none());
  }
}
