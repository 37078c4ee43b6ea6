//! The `EntitlementStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `sweeft-store`).
//! It is the single source of truth for "can this device redownload a
//! project without paying", and is mutated exclusively by the purchase
//! flow's entitled transition.

use std::future::Future;

use crate::project::Project;

/// Abstraction over the device-scoped entitlement store.
///
/// Ownership entries grow monotonically; nothing in normal operation removes
/// them. Implementations must make `record` durable before returning, so a
/// delivery retry after a crash can still find the entitlement.
pub trait EntitlementStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Whether `project_id` has been paid for on this device.
  fn has<'a>(
    &'a self,
    project_id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Record ownership of `project`.
  ///
  /// Idempotent on the ownership set: recording an already-owned id is a
  /// no-op there, but still refreshes the last-purchase record so "retry
  /// last download" always targets the most recent successful transaction.
  fn record<'a>(
    &'a self,
    project: &'a Project,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// All owned project ids, in recording order.
  fn owned(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// The full project of the most recent successful purchase, if the
  /// shorter-lived scope still holds it. Best-effort.
  fn last_purchase(
    &self,
  ) -> impl Future<Output = Result<Option<Project>, Self::Error>> + Send + '_;
}
