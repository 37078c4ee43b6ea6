//! Local-callback payment gateway adapter.
//!
//! The checkout itself happens in the buyer's browser on the gateway's own
//! page. This adapter opens that page with a loopback callback URL, then
//! waits for whichever comes first:
//!
//! - the gateway redirecting the browser to `/callback?reference=…` — the
//!   in-page success path, client-asserted;
//! - the user pressing cancel in the storefront — the close signal.
//!
//! No timeout applies; the gateway resolves through its own UI.

use std::sync::Arc;

use sweeft_core::{
  Error, Result,
  gateway::{CheckoutRequest, GatewayOutcome, PaymentGateway},
};
use tokio::{
  io::{AsyncReadExt, AsyncWriteExt},
  net::TcpListener,
  sync::Notify,
};

const CALLBACK_PAGE: &str = "<html><body><h3>Payment received.</h3>\
<p>You can close this tab and return to the Sweeft store.</p></body></html>";

/// Signal used by the UI to report that the buyer closed the checkout.
#[derive(Clone, Default)]
pub struct CancelHandle {
  notify: Arc<Notify>,
}

impl CancelHandle {
  pub fn cancel(&self) { self.notify.notify_one(); }
}

/// Gateway adapter that hands off to the browser and listens on loopback.
#[derive(Clone)]
pub struct LocalCallbackGateway {
  /// Base URL of the gateway's hosted checkout page.
  checkout_url:   String,
  cancel:         CancelHandle,
  launch_browser: bool,
}

impl LocalCallbackGateway {
  pub fn new(checkout_url: String, cancel: CancelHandle) -> Self {
    Self {
      checkout_url,
      cancel,
      launch_browser: true,
    }
  }

  /// For headless environments: skip spawning a browser and rely on the
  /// page URL surfaced in the UI.
  pub fn without_browser_launch(mut self) -> Self {
    self.launch_browser = false;
    self
  }

  fn checkout_page_url(&self, request: &CheckoutRequest, callback: &str) -> String {
    let q = |v: &str| encode_component(v);
    format!(
      "{}?key={}&email={}&amount={}&currency={}&reference={}&project={}&callback={}",
      self.checkout_url.trim_end_matches('/'),
      q(&request.public_key),
      q(&request.email),
      request.amount,
      q(&request.currency),
      q(&request.reference),
      q(&request.project_id),
      q(callback),
    )
  }
}

impl PaymentGateway for LocalCallbackGateway {
  async fn checkout(&self, request: &CheckoutRequest) -> Result<GatewayOutcome> {
    // Bind first so the page we open always has a live callback target.
    let listener = TcpListener::bind(("127.0.0.1", 0))
      .await
      .map_err(|e| Error::Gateway(format!("binding callback listener: {e}")))?;
    let port = listener
      .local_addr()
      .map_err(|e| Error::Gateway(e.to_string()))?
      .port();

    let callback = format!("http://127.0.0.1:{port}/callback");
    let page = self.checkout_page_url(request, &callback);

    if self.launch_browser {
      open_in_browser(&page);
    }
    tracing::info!(reference = %request.reference, %page, "checkout opened");

    tokio::select! {
      reference = wait_for_callback(listener) => {
        let reference = reference?;
        Ok(GatewayOutcome::Completed { reference })
      }
      _ = self.cancel.notify.notified() => Ok(GatewayOutcome::Closed),
    }
  }
}

/// Accept loopback connections until one carries a callback reference.
async fn wait_for_callback(listener: TcpListener) -> Result<String> {
  loop {
    let (mut stream, _) = listener
      .accept()
      .await
      .map_err(|e| Error::Gateway(format!("callback accept: {e}")))?;

    let mut buf = vec![0u8; 4096];
    let n = stream
      .read(&mut buf)
      .await
      .map_err(|e| Error::Gateway(format!("callback read: {e}")))?;
    let request = String::from_utf8_lossy(&buf[..n]);

    let reference = request
      .lines()
      .next()
      .and_then(parse_callback_reference);

    let body = CALLBACK_PAGE;
    let response = format!(
      "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
      body.len(),
    );
    stream.write_all(response.as_bytes()).await.ok();
    stream.shutdown().await.ok();

    if let Some(reference) = reference {
      return Ok(reference);
    }
    // Anything else (favicon probes, paths without a reference) keeps the
    // listener alive for the real callback.
  }
}

/// Extract `reference` from a request line like
/// `GET /callback?reference=PRJ_1_AB HTTP/1.1`.
fn parse_callback_reference(request_line: &str) -> Option<String> {
  let target = request_line.split_whitespace().nth(1)?;
  let (path, query) = target.split_once('?')?;
  if !path.starts_with("/callback") {
    return None;
  }
  query
    .split('&')
    .filter_map(|pair| pair.split_once('='))
    .find(|(key, _)| *key == "reference")
    .map(|(_, value)| decode_component(value))
    .filter(|r| !r.is_empty())
}

/// Best-effort: failure to spawn a browser is not fatal, the page URL is
/// also surfaced in the UI.
fn open_in_browser(url: &str) {
  #[cfg(target_os = "macos")]
  let launcher = "open";
  #[cfg(target_os = "windows")]
  let launcher = "explorer";
  #[cfg(not(any(target_os = "macos", target_os = "windows")))]
  let launcher = "xdg-open";

  if let Err(e) = std::process::Command::new(launcher)
    .arg(url)
    .stdout(std::process::Stdio::null())
    .stderr(std::process::Stdio::null())
    .spawn()
  {
    tracing::warn!(error = %e, "could not launch browser");
  }
}

// ─── Query-component codecs ──────────────────────────────────────────────────

fn encode_component(raw: &str) -> String {
  let mut out = String::with_capacity(raw.len());
  for byte in raw.bytes() {
    match byte {
      b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
        out.push(byte as char);
      }
      _ => out.push_str(&format!("%{byte:02X}")),
    }
  }
  out
}

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
      b'%' => match bytes
        .get(i + 1..i + 3)
        .and_then(|h| u8::from_str_radix(std::str::from_utf8(h).ok()?, 16).ok())
      {
        Some(b) => {
          out.push(b);
          i += 3;
        }
        None => {
          out.push(bytes[i]);
          i += 1;
        }
      },
      b => {
        out.push(b);
        i += 1;
      }
    }
  }
  String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn callback_reference_is_extracted_from_the_request_line() {
    assert_eq!(
      parse_callback_reference("GET /callback?reference=PRJ_1_AB HTTP/1.1"),
      Some("PRJ_1_AB".to_string())
    );
    assert_eq!(
      parse_callback_reference("GET /callback?foo=1&reference=R%20X HTTP/1.1"),
      Some("R X".to_string())
    );
  }

  #[test]
  fn other_paths_are_ignored() {
    assert_eq!(parse_callback_reference("GET /favicon.ico HTTP/1.1"), None);
    assert_eq!(parse_callback_reference("GET /callback HTTP/1.1"), None);
    assert_eq!(
      parse_callback_reference("GET /callback?reference= HTTP/1.1"),
      None
    );
  }

  #[test]
  fn component_codec_round_trips() {
    let raw = "buyer+one@example.com";
    assert_eq!(decode_component(&encode_component(raw)), raw);
  }

  #[tokio::test]
  async fn cancel_resolves_the_checkout_as_closed() {
    use sweeft_core::{
      project::Project,
      purchase::{BuyerEmail, Reference},
    };

    let cancel = CancelHandle::default();
    let gateway =
      LocalCallbackGateway::new("http://127.0.0.1:1/checkout".into(), cancel.clone())
        .without_browser_launch();

    let project = Project {
      id:          "P1".into(),
      name:        "X".into(),
      department:  "D".into(),
      school:      "S".into(),
      description: "d".into(),
      price:       2500,
      asset_ref:   "r".into(),
    };
    let email = BuyerEmail::parse("buyer@example.com").unwrap();
    let reference = Reference::generate();
    let request = CheckoutRequest::new("pk_test", &project, &email, &reference);

    let handle = tokio::spawn(async move { gateway.checkout(&request).await });
    // Give the adapter a beat to bind, then close the overlay.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    cancel.cancel();

    let outcome = handle.await.unwrap().unwrap();
    assert_eq!(outcome, GatewayOutcome::Closed);
  }
}
