//! The delivery seam — triggering the asset transfer for an entitled project.

use crate::{Result, project::Project};

/// Starts one asset transfer to the buyer's device.
///
/// Safe to invoke repeatedly for the same project: each call independently
/// triggers a transfer of the same artifact. Implementations emit their own
/// start notification and do not track transfer completion (the transfer
/// mechanism has no acknowledgment channel).
pub trait DeliveryExecutor {
  async fn deliver(&self, project: &Project) -> Result<()>;
}
