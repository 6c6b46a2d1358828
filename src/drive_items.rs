//! DriveItem resource: listing, searching, uploading and downloading files.

use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use serde_json::json;
use tracing::{debug, info};

use crate::error::{GraphError, Result};
use crate::models::{ConflictBehavior, DriveItem, DriveItemList, UploadSession, UploadStatus};
use crate::session::{error_for_status, GraphSession};

/// Largest payload sent as a single range of an upload session.
pub const MAX_SINGLE_RANGE_BYTES: u64 = 60_000_000;

/// Range size for payloads above [`MAX_SINGLE_RANGE_BYTES`]. Graph requires a
/// multiple of 320 KiB.
pub const UPLOAD_CHUNK_SIZE: u64 = 10 * 1024 * 1024;

const OCTET_STREAM: &str = "application/octet-stream";

/// Client for drive items of one container (site, group, drive, user or me).
#[derive(Debug, Clone)]
pub struct DriveItems {
    base_url: String,
    session: GraphSession,
}

impl DriveItems {
    pub fn new(base_url: impl Into<String>, session: GraphSession) -> Self {
        Self {
            base_url: base_url.into(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List the children of an item. Use `root` for the drive root.
    pub async fn list_children(&self, item_id: &str) -> Result<DriveItemList> {
        let url = format!("{}/drive/items/{}/children", self.base_url, item_id);
        let response = self.session.get(&url).await?.send().await?;
        let response = error_for_status(response).await?;
        Ok(response.json().await?)
    }

    /// Search the drive from its root.
    ///
    /// `query` is inserted into the URL as-is. A single quote in it ends the
    /// OData string literal, so callers must escape or strip quotes themselves.
    pub async fn search(&self, query: &str) -> Result<DriveItemList> {
        let url = format!("{}/drive/root/search(q='{}')", self.base_url, query);
        let response = self.session.get(&url).await?.send().await?;
        let response = error_for_status(response).await?;
        Ok(response.json().await?)
    }

    /// Upload a file in a single request.
    ///
    /// Graph accepts this for content up to about 4 MB. Size is not checked here.
    pub async fn upload_small(&self, content: Vec<u8>, file_name: &str) -> Result<DriveItem> {
        let url = format!("{}/drive/items/root:/{}:/content", self.base_url, file_name);
        debug!(file_name, bytes = content.len(), "simple upload");

        let response = self
            .session
            .put(&url)
            .await?
            .header(CONTENT_TYPE, OCTET_STREAM)
            .body(content)
            .send()
            .await?;
        let response = error_for_status(response).await?;
        Ok(response.json().await?)
    }

    /// Allocate an upload session for `file_name` under the drive root.
    pub async fn create_upload_session(
        &self,
        file_name: &str,
        conflict_behavior: ConflictBehavior,
    ) -> Result<UploadSession> {
        let url = format!(
            "{}/drive/items/root:/{}:/createUploadSession",
            self.base_url, file_name
        );
        let body = json!({
            "item": {
                "@microsoft.graph.conflictBehavior": conflict_behavior,
            }
        });

        let response = self.session.post(&url).await?.json(&body).send().await?;
        let response = error_for_status(response).await?;
        let upload_session: UploadSession = response.json().await?;
        debug!(
            file_name,
            expires = upload_session.expiration_date_time.as_deref().unwrap_or("-"),
            "upload session created"
        );
        Ok(upload_session)
    }

    /// Upload a file through an upload session.
    ///
    /// Up to [`MAX_SINGLE_RANGE_BYTES`] the payload is sent as one range
    /// `0-(byte_size-1)/byte_size`. Larger payloads are sent as consecutive
    /// [`UPLOAD_CHUNK_SIZE`] ranges. Before each range, its start is checked
    /// against the `nextExpectedRanges` the server last reported. `byte_size` is
    /// expected to equal `content.len()`.
    pub async fn upload_large(
        &self,
        content: Vec<u8>,
        byte_size: u64,
        file_name: &str,
        conflict_behavior: ConflictBehavior,
    ) -> Result<DriveItem> {
        let upload_session = self
            .create_upload_session(file_name, conflict_behavior)
            .await?;

        let range_size = if byte_size <= MAX_SINGLE_RANGE_BYTES {
            info!(file_name, byte_size, "uploading in one range");
            content.len().max(1)
        } else {
            info!(file_name, byte_size, "uploading in chunks");
            UPLOAD_CHUNK_SIZE as usize
        };

        let mut expected_start = upload_session.next_expected_start();
        let mut offset: u64 = 0;
        let mut ranges = content.chunks(range_size).peekable();

        while let Some(chunk) = ranges.next() {
            if let Some(expected) = expected_start.filter(|&expected| expected != offset) {
                return Err(GraphError::ContentError(format!(
                    "upload of {} expected range starting at {}, next range starts at {}",
                    file_name, expected, offset
                )));
            }

            let response = self
                .put_range(&upload_session.upload_url, chunk.to_vec(), offset, byte_size)
                .await?;
            offset += chunk.len() as u64;

            if ranges.peek().is_none() {
                return Ok(response.json().await?);
            }

            // Intermediate ranges answer 202 with the ranges still missing.
            let body = response.bytes().await?;
            expected_start = if body.is_empty() {
                None
            } else {
                serde_json::from_slice::<UploadStatus>(&body)?.next_expected_start()
            };
        }

        Err(GraphError::ContentError(format!(
            "upload of {} finished without a drive item",
            file_name
        )))
    }

    async fn put_range(
        &self,
        upload_url: &str,
        chunk: Vec<u8>,
        start: u64,
        total: u64,
    ) -> Result<reqwest::Response> {
        let len = chunk.len() as u64;
        let content_range = format!(
            "bytes {}-{}/{}",
            start,
            (start + len).saturating_sub(1),
            total
        );
        debug!(%content_range, "uploading range");

        let response = self
            .session
            .put(upload_url)
            .await?
            .header(CONTENT_TYPE, OCTET_STREAM)
            .header(CONTENT_LENGTH, len.to_string())
            .header("Content-Range", content_range)
            .body(chunk)
            .send()
            .await?;
        error_for_status(response).await
    }

    /// Download the content of an item.
    ///
    /// Fetches the item's short-lived download URL, then the bytes behind it.
    pub async fn download(&self, item_id: &str) -> Result<Vec<u8>> {
        let url = format!(
            "{}/drive/items/{}?select=id,@microsoft.graph.downloadUrl",
            self.base_url, item_id
        );
        let response = self.session.get(&url).await?.send().await?;

        if !response.status().is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(GraphError::ContentError(error_body));
        }

        let item: DriveItem = response.json().await?;
        let download_url = item.download_url.ok_or_else(|| {
            GraphError::ContentError(format!("item {} has no download URL", item_id))
        })?;

        let response = self.session.get(&download_url).await?.send().await?;
        let response = error_for_status(response).await?;
        let bytes = response.bytes().await?;
        info!(item_id, bytes = bytes.len(), "downloaded item");
        Ok(bytes.to_vec())
    }
}
