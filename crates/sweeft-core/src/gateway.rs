//! The payment gateway seam — an opaque, externally-driven checkout.
//!
//! The gateway itself is a third-party service; this module only defines the
//! handoff contract. The adapter resolves with either a success carrying the
//! gateway's reference or a close signal carrying nothing.

use serde::{Deserialize, Serialize};

use crate::{
  Result,
  project::Project,
  purchase::{BuyerEmail, Reference},
};

/// Charge currency. All catalog prices are naira; the gateway is paid kobo.
pub const CURRENCY: &str = "NGN";

// ─── Checkout request ────────────────────────────────────────────────────────

/// One display-metadata entry forwarded to the gateway's receipt UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutField {
  pub display_name:  String,
  pub variable_name: String,
  pub value:         String,
}

/// Everything the gateway needs to open a checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
  pub public_key: String,
  pub email:      String,
  /// Minor currency units (kobo).
  pub amount:     u64,
  pub currency:   String,
  pub reference:  String,
  pub project_id: String,
  pub metadata:   Vec<CheckoutField>,
}

impl CheckoutRequest {
  pub fn new(
    public_key: &str,
    project: &Project,
    email: &BuyerEmail,
    reference: &Reference,
  ) -> Self {
    let field = |display: &str, variable: &str, value: &str| CheckoutField {
      display_name:  display.to_string(),
      variable_name: variable.to_string(),
      value:         value.to_string(),
    };
    Self {
      public_key: public_key.to_string(),
      email:      email.as_str().to_string(),
      amount:     project.amount_minor(),
      currency:   CURRENCY.to_string(),
      reference:  reference.as_str().to_string(),
      project_id: project.id.clone(),
      metadata:   vec![
        field("Project", "project_name", &project.name),
        field("Project ID", "project_id", &project.id),
        field("Department", "department", &project.department),
        field("School", "school", &project.school),
      ],
    }
  }
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// How the gateway interaction ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayOutcome {
  /// The in-page success callback fired with the gateway's reference.
  Completed { reference: String },
  /// The buyer closed the checkout without completing payment.
  Closed,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Handoff to the external checkout. The future resolves when the gateway's
/// own UI does; no timeout is applied here.
pub trait PaymentGateway {
  async fn checkout(&self, request: &CheckoutRequest) -> Result<GatewayOutcome>;
}
