//! Purchase flow — drives one attempt from intent to entitlement.
//!
//! The flow is the only component that mutates the entitlement store. Two
//! success paths exist: the gateway's in-page callback (trusted as-is) and
//! the return-URL path, which goes through server-side verification because
//! URL parameters are attacker-controllable.

use crate::{
  Error, Result,
  delivery::DeliveryExecutor,
  gateway::{CheckoutRequest, GatewayOutcome, PaymentGateway},
  project::Project,
  purchase::{BuyerEmail, Reference, Transaction},
  store::EntitlementStore,
  verify::PaymentVerifier,
};

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Result of a buy request for a project.
#[derive(Debug)]
pub enum BuyOutcome {
  /// Already owned — delivery was triggered directly; no transaction was
  /// created and the gateway was never contacted.
  Redownload,
  /// A transaction was opened; the caller must collect a buyer email and
  /// call [`PurchaseFlow::checkout`].
  EmailRequired(Transaction),
}

/// Result of a gateway handoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
  /// Paid via the in-page callback; entitlement recorded and delivery
  /// triggered.
  Completed { reference: String },
  /// The buyer closed the checkout. No entitlement change.
  Cancelled,
}

/// Result of processing a return-URL pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
  /// Server confirmed the reference; entitlement recorded and delivery
  /// triggered.
  Verified {
    project_id: String,
    reference:  String,
  },
  /// The server did not confirm (or could not be reached). Fail closed.
  NotVerified { reference: String },
  /// The named project is not in the current catalog snapshot.
  UnknownProject { project_id: String },
}

// ─── Return-URL location ─────────────────────────────────────────────────────

/// A `(reference, projectId)` pair carried back from an external payment
/// page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnParams {
  pub reference:  String,
  pub project_id: String,
}

/// The visible location the client returned on, with one-shot extraction of
/// the return parameters.
///
/// `take_params` strips `reference` and `project` from the held URL the
/// first time both are present, so a later reload of the same location can
/// never re-trigger verification.
#[derive(Debug, Clone)]
pub struct ReturnLocation {
  url: String,
}

impl ReturnLocation {
  pub fn new(url: impl Into<String>) -> Self {
    Self { url: url.into() }
  }

  /// The location as it should currently be displayed.
  pub fn visible(&self) -> &str { &self.url }

  /// Extract the return parameters, if both are present, stripping them
  /// from the visible location. Subsequent calls return `None`.
  pub fn take_params(&mut self) -> Option<ReturnParams> {
    let (path, query) = self.url.split_once('?')?;
    let (path, query) = (path.to_string(), query.to_string());

    let mut reference = None;
    let mut project_id = None;
    let mut remainder: Vec<String> = Vec::new();

    for pair in query.split('&').filter(|p| !p.is_empty()) {
      let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
      match key {
        "reference" => reference = Some(decode_component(value)),
        "project" => project_id = Some(decode_component(value)),
        _ => remainder.push(pair.to_string()),
      }
    }

    let (reference, project_id) = match (reference, project_id) {
      (Some(r), Some(p)) => (r, p),
      // Both must be present together or neither is processed.
      _ => return None,
    };

    self.url = if remainder.is_empty() {
      path
    } else {
      format!("{path}?{}", remainder.join("&"))
    };

    Some(ReturnParams { reference, project_id })
  }
}

/// Minimal `application/x-www-form-urlencoded` component decoder.
fn decode_component(raw: &str) -> String {
  let bytes = raw.as_bytes();
  let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
  let mut i = 0;
  while i < bytes.len() {
    match bytes[i] {
      b'+' => {
        out.push(b' ');
        i += 1;
      }
      b'%' => {
        let hex = bytes.get(i + 1..i + 3);
        match hex.and_then(|h| u8::from_str_radix(std::str::from_utf8(h).ok()?, 16).ok()) {
          Some(b) => {
            out.push(b);
            i += 3;
          }
          None => {
            out.push(bytes[i]);
            i += 1;
          }
        }
      }
      b => {
        out.push(b);
        i += 1;
      }
    }
  }
  String::from_utf8_lossy(&out).into_owned()
}

// ─── Flow ────────────────────────────────────────────────────────────────────

/// The purchase orchestrator.
pub struct PurchaseFlow<S, G, V, D> {
  store:      S,
  gateway:    G,
  verifier:   V,
  delivery:   D,
  /// `None` when both the config endpoint and the inline fallback failed;
  /// checkout then fails gracefully with [`Error::PaymentUnavailable`].
  public_key: Option<String>,
}

impl<S, G, V, D> PurchaseFlow<S, G, V, D>
where
  S: EntitlementStore,
  G: PaymentGateway,
  V: PaymentVerifier,
  D: DeliveryExecutor,
{
  pub fn new(
    store: S,
    gateway: G,
    verifier: V,
    delivery: D,
    public_key: Option<String>,
  ) -> Self {
    Self {
      store,
      gateway,
      verifier,
      delivery,
      public_key,
    }
  }

  // ── Buy ───────────────────────────────────────────────────────────────────

  /// Handle a buy request. Owned projects short-circuit straight to
  /// delivery (buy becomes redownload); everything else opens a transaction.
  pub async fn begin(&self, project: &Project) -> Result<BuyOutcome> {
    if self.store_has(&project.id).await? {
      self.delivery.deliver(project).await?;
      return Ok(BuyOutcome::Redownload);
    }
    Ok(BuyOutcome::EmailRequired(Transaction::open(project)))
  }

  /// Validate the buyer email, hand off to the gateway, and drive the
  /// transaction to a terminal state.
  ///
  /// An invalid email leaves the transaction untouched so the caller can
  /// re-prompt.
  pub async fn checkout(
    &self,
    txn: &mut Transaction,
    project: &Project,
    raw_email: &str,
  ) -> Result<CheckoutOutcome> {
    let email = BuyerEmail::parse(raw_email)?;
    let public_key = self
      .public_key
      .as_deref()
      .ok_or(Error::PaymentUnavailable)?;

    let reference = Reference::generate();
    let request = CheckoutRequest::new(public_key, project, &email, &reference);
    txn.authorize(email, reference)?;

    match self.gateway.checkout(&request).await {
      Ok(GatewayOutcome::Completed { reference }) => {
        txn.paid_client_side(Reference::from(reference.clone()))?;
        // Client-asserted success: the in-page callback is trusted without a
        // verification round-trip. Only the return-URL path verifies.
        self.record(project).await?;
        txn.entitled()?;
        self.trigger_delivery(project).await;
        txn.delivered()?;
        Ok(CheckoutOutcome::Completed { reference })
      }
      Ok(GatewayOutcome::Closed) => {
        txn.cancel()?;
        Ok(CheckoutOutcome::Cancelled)
      }
      Err(e) => {
        txn.cancel()?;
        Err(e)
      }
    }
  }

  // ── Return-URL reconciliation ─────────────────────────────────────────────

  /// Process a return-URL pair. Only a server-confirmed reference grants
  /// entitlement; a non-confirmed response or a transport failure grants
  /// nothing.
  pub async fn reconcile(
    &self,
    params: &ReturnParams,
    project: Option<&Project>,
  ) -> Result<ReconcileOutcome> {
    let Some(project) = project else {
      return Ok(ReconcileOutcome::UnknownProject {
        project_id: params.project_id.clone(),
      });
    };

    let confirmed = match self.verifier.verify(&params.reference).await {
      Ok(confirmed) => confirmed,
      Err(e) => {
        tracing::warn!(reference = %params.reference, error = %e, "verification call failed");
        false
      }
    };

    if !confirmed {
      return Ok(ReconcileOutcome::NotVerified {
        reference: params.reference.clone(),
      });
    }

    self.record(project).await?;
    self.trigger_delivery(project).await;
    Ok(ReconcileOutcome::Verified {
      project_id: project.id.clone(),
      reference:  params.reference.clone(),
    })
  }

  // ── Redelivery ────────────────────────────────────────────────────────────

  /// Retry the most recent successful purchase's download, if the
  /// shorter-lived record still holds it.
  pub async fn redeliver_last(&self) -> Result<Option<Project>> {
    match self.store_last_purchase().await? {
      Some(project) => {
        self.delivery.deliver(&project).await?;
        Ok(Some(project))
      }
      None => Ok(None),
    }
  }

  // ── Internals ─────────────────────────────────────────────────────────────

  async fn store_has(&self, project_id: &str) -> Result<bool> {
    self
      .store
      .has(project_id)
      .await
      .map_err(|e| Error::Store(Box::new(e)))
  }

  /// Durably record ownership. Must complete before delivery is triggered.
  async fn record(&self, project: &Project) -> Result<()> {
    self
      .store
      .record(project)
      .await
      .map_err(|e| Error::Store(Box::new(e)))
  }

  async fn store_last_purchase(&self) -> Result<Option<Project>> {
    self
      .store
      .last_purchase()
      .await
      .map_err(|e| Error::Store(Box::new(e)))
  }

  /// Ownership, once recorded, is never revoked by a failed download.
  async fn trigger_delivery(&self, project: &Project) {
    if let Err(e) = self.delivery.deliver(project).await {
      tracing::warn!(project = %project.id, error = %e, "delivery failed; entitlement kept");
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
