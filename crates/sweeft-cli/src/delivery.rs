//! Download-based delivery executor.
//!
//! Each call independently triggers one transfer of the project asset into
//! the download directory. The transfer itself runs detached after a short
//! fixed delay (so the success screen renders first) and is never awaited:
//! there is no acknowledgment channel, only a best-effort failure notice.

use std::{path::PathBuf, time::Duration};

use sweeft_core::{Result, delivery::DeliveryExecutor, project::Project};
use tokio::{io::AsyncWriteExt, sync::mpsc::UnboundedSender};

use crate::app::{AppEvent, Notice};

/// Delay between the entitlement side of a purchase and the transfer start.
const TRANSFER_DELAY: Duration = Duration::from_secs(1);

#[derive(Clone)]
pub struct DownloadDelivery {
  client:       reqwest::Client,
  download_dir: PathBuf,
  events:       UnboundedSender<AppEvent>,
}

impl DownloadDelivery {
  pub fn new(download_dir: PathBuf, events: UnboundedSender<AppEvent>) -> Self {
    Self {
      client: reqwest::Client::new(),
      download_dir,
      events,
    }
  }

  fn notify(&self, notice: Notice) {
    self.events.send(AppEvent::Notice(notice)).ok();
  }
}

impl DeliveryExecutor for DownloadDelivery {
  async fn deliver(&self, project: &Project) -> Result<()> {
    let file_name = project.download_file_name();
    self.notify(Notice::success(format!(
      "Download started: {file_name}. Check your downloads folder."
    )));

    let url = project.download_url();
    let target = self.download_dir.join(&file_name);
    let client = self.client.clone();
    let events = self.events.clone();

    tokio::spawn(async move {
      tokio::time::sleep(TRANSFER_DELAY).await;
      if let Err(e) = transfer(&client, &url, &target).await {
        tracing::warn!(%url, error = %e, "asset transfer failed");
        events
          .send(AppEvent::Notice(Notice::error(format!(
            "Download failed: {e}. Use \"download again\" to retry."
          ))))
          .ok();
      } else {
        tracing::info!(target = %target.display(), "asset transfer finished");
      }
    });

    Ok(())
  }
}

async fn transfer(
  client: &reqwest::Client,
  url: &str,
  target: &std::path::Path,
) -> anyhow::Result<()> {
  use anyhow::Context as _;

  if let Some(parent) = target.parent() {
    tokio::fs::create_dir_all(parent).await.ok();
  }

  let response = client.get(url).send().await.context("requesting asset")?;
  if !response.status().is_success() {
    anyhow::bail!("asset host answered {}", response.status());
  }

  let bytes = response.bytes().await.context("reading asset body")?;
  let mut file = tokio::fs::File::create(target)
    .await
    .context("creating download file")?;
  file.write_all(&bytes).await.context("writing download file")?;
  file.flush().await.ok();
  Ok(())
}
