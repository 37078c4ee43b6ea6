//! Application state machine and event dispatcher.

use std::{sync::Arc, time::Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use sweeft_catalog::{Catalog, CatalogIndex, ProjectFilter};
use sweeft_core::{
  Error as CoreError,
  flow::{BuyOutcome, CheckoutOutcome, PurchaseFlow, ReconcileOutcome, ReturnLocation},
  project::Project,
  purchase::{BuyerEmail, Transaction},
  store::EntitlementStore as _,
};
use sweeft_store::ProfileStore;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::{
  client::RemoteVerifier,
  delivery::DownloadDelivery,
  gateway::{CancelHandle, LocalCallbackGateway},
};

/// The fully-wired purchase flow used by the storefront.
pub type StoreFlow =
  PurchaseFlow<ProfileStore, LocalCallbackGateway, RemoteVerifier, DownloadDelivery>;

// ─── Notices & events ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
  Info,
  Success,
  Error,
}

/// A transient status-bar message.
#[derive(Debug, Clone)]
pub struct Notice {
  pub kind: NoticeKind,
  pub text: String,
}

impl Notice {
  pub fn info(text: impl Into<String>) -> Self {
    Self { kind: NoticeKind::Info, text: text.into() }
  }

  pub fn success(text: impl Into<String>) -> Self {
    Self { kind: NoticeKind::Success, text: text.into() }
  }

  pub fn error(text: impl Into<String>) -> Self {
    Self { kind: NoticeKind::Error, text: text.into() }
  }
}

/// Messages posted back to the UI loop by detached tasks.
pub enum AppEvent {
  CheckoutFinished {
    project: Project,
    result:  sweeft_core::Result<CheckoutOutcome>,
  },
  Notice(Notice),
}

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// The browsable project grid with filters.
  Storefront,
  /// The purchase modal (email entry) over the storefront.
  Purchase,
  /// The post-payment success / download screen.
  Download,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub screen: Screen,

  /// The catalog snapshot, or empty when the load failed.
  pub index: CatalogIndex,

  /// Persistent load-failure banner; no partial catalog is ever shown.
  pub catalog_error: Option<String>,

  // ── Filters ──
  /// 0 = all schools, otherwise 1-based into `index.schools()`.
  pub school_cursor: usize,
  /// 0 = all departments, otherwise 1-based into `departments()`.
  pub dept_cursor: usize,
  pub search: String,
  pub search_active: bool,

  /// Cursor position within the filtered project list.
  pub list_cursor: usize,

  /// Owned project ids, mirrored from the entitlement store.
  pub owned: Vec<String>,

  // ── Purchase modal ──
  pub modal_project: Option<Project>,
  pub modal_email: String,
  pub modal_error: Option<String>,
  pending_txn: Option<Transaction>,

  /// Project id currently awaiting the gateway; its buy action is disabled
  /// and the grid renders it as processing.
  pub processing: Option<String>,

  // ── Download screen ──
  pub download_project: Option<Project>,
  pub download_reference: String,

  /// Most recent transient notice and when it was posted.
  pub notice: Option<(Notice, Instant)>,

  // ── Wiring ──
  pub flow: Arc<StoreFlow>,
  pub store: ProfileStore,
  cancel: CancelHandle,
  pub events_tx: UnboundedSender<AppEvent>,
  events_rx: UnboundedReceiver<AppEvent>,
}

impl App {
  pub fn new(
    flow: Arc<StoreFlow>,
    store: ProfileStore,
    cancel: CancelHandle,
    events_tx: UnboundedSender<AppEvent>,
    events_rx: UnboundedReceiver<AppEvent>,
  ) -> Self {
    Self {
      screen: Screen::Storefront,
      index: CatalogIndex::default(),
      catalog_error: None,
      school_cursor: 0,
      dept_cursor: 0,
      search: String::new(),
      search_active: false,
      list_cursor: 0,
      owned: Vec::new(),
      modal_project: None,
      modal_email: String::new(),
      modal_error: None,
      pending_txn: None,
      processing: None,
      download_project: None,
      download_reference: String::new(),
      notice: None,
      flow,
      store,
      cancel,
      events_tx,
      events_rx,
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Install the catalog load result: a snapshot, or the persistent banner.
  pub fn set_catalog(&mut self, loaded: anyhow::Result<Catalog>) {
    match loaded {
      Ok(catalog) => {
        tracing::info!(
          projects = catalog.projects.len(),
          skipped = catalog.skipped,
          "catalog loaded"
        );
        self.index = catalog.into_index();
        self.catalog_error = None;
      }
      Err(e) => {
        tracing::error!(error = %format!("{e:#}"), "catalog load failed");
        self.index = CatalogIndex::default();
        self.catalog_error =
          Some("Failed to load projects. Please restart or check your connection.".into());
      }
    }
  }

  pub async fn refresh_owned(&mut self) {
    match self.store.owned().await {
      Ok(owned) => self.owned = owned,
      Err(e) => tracing::warn!(error = %e, "could not read entitlements"),
    }
  }

  pub fn is_owned(&self, project_id: &str) -> bool {
    self.owned.iter().any(|id| id == project_id)
  }

  pub fn set_notice(&mut self, notice: Notice) {
    self.notice = Some((notice, Instant::now()));
  }

  // ── Filtered view ─────────────────────────────────────────────────────────

  pub fn selected_school(&self) -> Option<String> {
    (self.school_cursor > 0)
      .then(|| self.index.schools().get(self.school_cursor - 1))
      .flatten()
      .map(|s| s.name.clone())
  }

  /// Department choices constrained to the selected school.
  pub fn departments(&self) -> Vec<String> {
    self.index.departments_for(self.selected_school().as_deref())
  }

  pub fn selected_department(&self) -> Option<String> {
    (self.dept_cursor > 0)
      .then(|| self.departments().get(self.dept_cursor - 1).cloned())
      .flatten()
  }

  pub fn current_filter(&self) -> ProjectFilter {
    ProjectFilter {
      school:     self.selected_school(),
      department: self.selected_department(),
      query:      {
        let trimmed = self.search.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
      },
    }
  }

  pub fn visible_projects(&self) -> Vec<&Project> {
    self.index.filter(&self.current_filter())
  }

  pub fn cursor_project(&self) -> Option<&Project> {
    let list = self.visible_projects();
    list.get(self.list_cursor).copied()
  }

  // ── Background events ─────────────────────────────────────────────────────

  /// Drain events posted by detached tasks since the last frame.
  pub async fn poll_events(&mut self) {
    while let Ok(event) = self.events_rx.try_recv() {
      match event {
        AppEvent::Notice(notice) => self.set_notice(notice),
        AppEvent::CheckoutFinished { project, result } => {
          self.on_checkout_finished(project, result).await;
        }
      }
    }
  }

  async fn on_checkout_finished(
    &mut self,
    project: Project,
    result: sweeft_core::Result<CheckoutOutcome>,
  ) {
    self.processing = None;
    match result {
      Ok(CheckoutOutcome::Completed { reference }) => {
        self.refresh_owned().await;
        self.download_project = Some(project);
        self.download_reference = reference;
        self.screen = Screen::Download;
      }
      // User intent, not an error: quietly return to the unentitled state.
      Ok(CheckoutOutcome::Cancelled) => {}
      Err(CoreError::PaymentUnavailable) => {
        self.set_notice(Notice::error(
          "Payment system not available. Please try again later.",
        ));
      }
      Err(e) => {
        self.set_notice(Notice::error(format!("Purchase failed: {e}")));
      }
    }
  }

  // ── Purchase actions ──────────────────────────────────────────────────────

  /// Buy (or redownload) the project under the cursor.
  async fn buy_selected(&mut self) -> anyhow::Result<()> {
    let Some(project) = self.cursor_project().cloned() else {
      return Ok(());
    };
    // Rendered as processing while awaiting the gateway; no second attempt.
    if self.processing.as_deref() == Some(project.id.as_str()) {
      return Ok(());
    }

    match self.flow.begin(&project).await {
      Ok(BuyOutcome::Redownload) => {
        // Delivery posts its own start notice.
      }
      Ok(BuyOutcome::EmailRequired(txn)) => {
        self.pending_txn = Some(txn);
        self.modal_project = Some(project);
        self.modal_email.clear();
        self.modal_error = None;
        self.screen = Screen::Purchase;
      }
      Err(e) => self.set_notice(Notice::error(format!("{e}"))),
    }
    Ok(())
  }

  /// Confirm the purchase modal: validate the email, then hand the
  /// transaction to the gateway on a detached task.
  fn confirm_purchase(&mut self) {
    if BuyerEmail::parse(&self.modal_email).is_err() {
      self.modal_error = Some("Please enter a valid email address".into());
      return;
    }
    let (Some(project), Some(mut txn)) =
      (self.modal_project.take(), self.pending_txn.take())
    else {
      self.screen = Screen::Storefront;
      return;
    };

    let email = self.modal_email.trim().to_string();
    self.processing = Some(project.id.clone());
    self.modal_error = None;
    self.screen = Screen::Storefront;

    let flow = self.flow.clone();
    let events = self.events_tx.clone();
    tokio::spawn(async move {
      let result = flow.checkout(&mut txn, &project, &email).await;
      events
        .send(AppEvent::CheckoutFinished { project, result })
        .ok();
    });
  }

  /// Retry the most recent successful purchase's download.
  async fn retry_last_download(&mut self) {
    match self.flow.redeliver_last().await {
      Ok(Some(_)) => {}
      Ok(None) => {
        self.set_notice(Notice::error(
          "Download session expired. Please purchase again.",
        ));
        self.screen = Screen::Storefront;
      }
      Err(e) => self.set_notice(Notice::error(format!("{e}"))),
    }
  }

  // ── Return-URL reconciliation ─────────────────────────────────────────────

  /// Process a return URL carried into this run. The parameters are
  /// consumed from the location exactly once, whatever the outcome.
  pub async fn process_return_url(&mut self, url: &str) {
    let mut location = ReturnLocation::new(url);
    let Some(params) = location.take_params() else {
      return;
    };

    self.set_notice(Notice::info("Verifying payment…"));
    let project = self.index.get(&params.project_id).cloned();

    match self.flow.reconcile(&params, project.as_ref()).await {
      Ok(ReconcileOutcome::Verified { reference, .. }) => {
        self.refresh_owned().await;
        self.download_project = project;
        self.download_reference = reference;
        self.screen = Screen::Download;
      }
      Ok(ReconcileOutcome::NotVerified { .. }) => {
        self.set_notice(Notice::error(
          "Payment verification failed. Please contact support.",
        ));
      }
      Ok(ReconcileOutcome::UnknownProject { project_id }) => {
        self.set_notice(Notice::error(format!(
          "Returned project {project_id} is not in the catalog."
        )));
      }
      Err(e) => self.set_notice(Notice::error(format!("{e}"))),
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    // Esc while a checkout is in flight closes the gateway overlay. The
    // in-flight transaction cancels; entitlements are untouched.
    if self.processing.is_some() && key.code == KeyCode::Esc {
      self.cancel.cancel();
      return Ok(true);
    }

    match self.screen {
      Screen::Purchase => self.handle_modal_key(key),
      Screen::Download => self.handle_download_key(key).await,
      Screen::Storefront if self.search_active => Ok(self.handle_search_key(key)),
      Screen::Storefront => self.handle_storefront_key(key).await,
    }
  }

  fn handle_search_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Esc => {
        self.search_active = false;
        self.search.clear();
        self.list_cursor = 0;
      }
      KeyCode::Enter => self.search_active = false,
      KeyCode::Backspace => {
        self.search.pop();
        self.list_cursor = 0;
      }
      KeyCode::Char(c) => {
        self.search.push(c);
        self.list_cursor = 0;
      }
      _ => {}
    }
    true
  }

  async fn handle_storefront_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),

      // Navigation
      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.visible_projects().len();
        if len > 0 && self.list_cursor + 1 < len {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }

      // Filters
      KeyCode::Char('/') => {
        self.search_active = true;
        self.search.clear();
        self.list_cursor = 0;
      }
      KeyCode::Char('s') => {
        // Selecting a school resets the department choice.
        self.school_cursor = (self.school_cursor + 1) % (self.index.schools().len() + 1);
        self.dept_cursor = 0;
        self.list_cursor = 0;
      }
      KeyCode::Char('d') => {
        self.dept_cursor = (self.dept_cursor + 1) % (self.departments().len() + 1);
        self.list_cursor = 0;
      }
      KeyCode::Esc => {
        self.school_cursor = 0;
        self.dept_cursor = 0;
        self.search.clear();
        self.list_cursor = 0;
      }

      // Purchase / redownload
      KeyCode::Enter => self.buy_selected().await?,

      // Retry the last successful download
      KeyCode::Char('r') => self.retry_last_download().await,

      _ => {}
    }
    Ok(true)
  }

  fn handle_modal_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Esc => {
        // Abandoning the modal before the gateway opens discards the
        // transaction entirely.
        self.pending_txn = None;
        self.modal_project = None;
        self.modal_error = None;
        self.screen = Screen::Storefront;
      }
      KeyCode::Enter => self.confirm_purchase(),
      KeyCode::Backspace => {
        self.modal_email.pop();
      }
      KeyCode::Char(c) => {
        self.modal_email.push(c);
        self.modal_error = None;
      }
      _ => {}
    }
    Ok(true)
  }

  async fn handle_download_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),
      KeyCode::Char('d') | KeyCode::Char('r') => self.retry_last_download().await,
      KeyCode::Esc | KeyCode::Char('b') => {
        self.download_project = None;
        self.download_reference.clear();
        self.screen = Screen::Storefront;
      }
      _ => {}
    }
    Ok(true)
  }
}
