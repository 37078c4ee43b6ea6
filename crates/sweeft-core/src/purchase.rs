//! Purchase transaction — the ephemeral state of one checkout attempt.
//!
//! A transaction exists only for the duration of a single purchase attempt
//! and is discarded on every terminal state. The only side effect that
//! outlives it is the entitlement recorded on the `Entitled` transition.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, project::Project};

// ─── Buyer email ─────────────────────────────────────────────────────────────

/// A buyer-supplied receipt address. The only structural requirement is a
/// literal `@`; the gateway performs its own validation downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerEmail(String);

impl BuyerEmail {
  pub fn parse(raw: &str) -> Result<Self> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.contains('@') {
      return Err(Error::InvalidEmail(raw.to_string()));
    }
    Ok(Self(trimmed.to_string()))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

// ─── Reference ───────────────────────────────────────────────────────────────

/// A gateway transaction reference, unique per checkout attempt.
///
/// Format: `PRJ_<unix-millis>_<6 uppercase hex chars>`. A fresh reference is
/// generated for every attempt; references are never reused across retries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference(String);

impl Reference {
  pub fn generate() -> Self {
    let millis = Utc::now().timestamp_millis();
    let suffix: String = Uuid::new_v4()
      .simple()
      .to_string()
      .chars()
      .take(6)
      .collect::<String>()
      .to_uppercase();
    Self(format!("PRJ_{millis}_{suffix}"))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl From<String> for Reference {
  fn from(raw: String) -> Self { Self(raw) }
}

impl std::fmt::Display for Reference {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── State ───────────────────────────────────────────────────────────────────

/// Lifecycle of one purchase attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseState {
  Initiated,
  AwaitingGateway,
  /// The gateway's in-page success callback fired. Client-asserted.
  PaidClientSide,
  /// The server confirmed the reference (redirect path only).
  Verified,
  VerificationFailed,
  Entitled,
  Delivered,
  Cancelled,
}

impl PurchaseState {
  /// Terminal states destroy the transaction.
  pub fn is_terminal(self) -> bool {
    matches!(
      self,
      Self::Delivered | Self::Cancelled | Self::VerificationFailed
    )
  }
}

// ─── Transaction ─────────────────────────────────────────────────────────────

/// The in-flight record of one purchase attempt.
#[derive(Debug, Clone)]
pub struct Transaction {
  pub project_id:      String,
  pub buyer_email:     Option<BuyerEmail>,
  pub reference:       Option<Reference>,
  /// Expected charge in minor currency units (kobo).
  pub amount_expected: u64,
  pub state:           PurchaseState,
}

impl Transaction {
  /// Open a transaction for a not-yet-owned project.
  pub fn open(project: &Project) -> Self {
    Self {
      project_id:      project.id.clone(),
      buyer_email:     None,
      reference:       None,
      amount_expected: project.amount_minor(),
      state:           PurchaseState::Initiated,
    }
  }

  fn transition(&mut self, from: PurchaseState, to: PurchaseState) -> Result<()> {
    if self.state != from {
      return Err(Error::InvalidTransition { from: self.state, to });
    }
    self.state = to;
    Ok(())
  }

  /// Attach the buyer email and a fresh reference, then hand off to the
  /// gateway. Rejected unless the transaction is freshly initiated.
  pub fn authorize(&mut self, email: BuyerEmail, reference: Reference) -> Result<()> {
    self.transition(PurchaseState::Initiated, PurchaseState::AwaitingGateway)?;
    self.buyer_email = Some(email);
    self.reference = Some(reference);
    Ok(())
  }

  /// The gateway reported the buyer closed the checkout without paying.
  pub fn cancel(&mut self) -> Result<()> {
    self.transition(PurchaseState::AwaitingGateway, PurchaseState::Cancelled)
  }

  /// The gateway's in-page success callback fired with `reference`.
  pub fn paid_client_side(&mut self, reference: Reference) -> Result<()> {
    self.transition(PurchaseState::AwaitingGateway, PurchaseState::PaidClientSide)?;
    self.reference = Some(reference);
    Ok(())
  }

  /// Entitlement has been durably recorded.
  pub fn entitled(&mut self) -> Result<()> {
    match self.state {
      PurchaseState::PaidClientSide | PurchaseState::Verified => {
        self.state = PurchaseState::Entitled;
        Ok(())
      }
      from => Err(Error::InvalidTransition {
        from,
        to: PurchaseState::Entitled,
      }),
    }
  }

  /// Asset transfer has been triggered.
  pub fn delivered(&mut self) -> Result<()> {
    self.transition(PurchaseState::Entitled, PurchaseState::Delivered)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn project() -> Project {
    Project {
      id:          "P1".into(),
      name:        "Fraud Detection System".into(),
      department:  "Department of Computer Science".into(),
      school:      "SCHOOL OF APPLIED SCIENCE AND TECHNOLOGY".into(),
      description: "desc".into(),
      price:       3000,
      asset_ref:   "abc123".into(),
    }
  }

  #[test]
  fn email_requires_at_sign() {
    assert!(BuyerEmail::parse("buyer@example.com").is_ok());
    assert!(BuyerEmail::parse("  padded@example.com ").is_ok());
    assert!(matches!(
      BuyerEmail::parse("no-at-sign"),
      Err(Error::InvalidEmail(_))
    ));
    assert!(matches!(BuyerEmail::parse("   "), Err(Error::InvalidEmail(_))));
  }

  #[test]
  fn references_are_unique_per_attempt() {
    let a = Reference::generate();
    let b = Reference::generate();
    assert_ne!(a, b);
    assert!(a.as_str().starts_with("PRJ_"));
  }

  #[test]
  fn happy_path_transitions() {
    let mut txn = Transaction::open(&project());
    assert_eq!(txn.state, PurchaseState::Initiated);
    assert_eq!(txn.amount_expected, 300_000);

    let email = BuyerEmail::parse("buyer@example.com").unwrap();
    txn.authorize(email, Reference::generate()).unwrap();
    assert_eq!(txn.state, PurchaseState::AwaitingGateway);

    txn.paid_client_side(Reference::from("PRJ_X".to_string())).unwrap();
    txn.entitled().unwrap();
    txn.delivered().unwrap();
    assert_eq!(txn.state, PurchaseState::Delivered);
    assert!(txn.state.is_terminal());
  }

  #[test]
  fn cancel_only_from_awaiting_gateway() {
    let mut txn = Transaction::open(&project());
    assert!(txn.cancel().is_err());

    let email = BuyerEmail::parse("buyer@example.com").unwrap();
    txn.authorize(email, Reference::generate()).unwrap();
    txn.cancel().unwrap();
    assert_eq!(txn.state, PurchaseState::Cancelled);
    assert!(txn.state.is_terminal());
  }

  #[test]
  fn entitled_requires_payment_evidence() {
    let mut txn = Transaction::open(&project());
    let err = txn.entitled().unwrap_err();
    assert!(matches!(err, Error::InvalidTransition { .. }));
  }
}
