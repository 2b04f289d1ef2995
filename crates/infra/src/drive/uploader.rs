//! Drive upload-and-convert client
//!
//! Uploads an office file to the Drive v3 files endpoint as a
//! `multipart/related` request whose metadata part asks for conversion into
//! the Google Workspace format. Supports an optional per-account upload
//! folder, resolved by name once and cached on the account. Remote failures
//! are surfaced with status context and never retried here.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use docrouter_core::ports::Uploader;
use docrouter_domain::{ConversionTarget, DocRouterError, GoogleAccount, Result, UploadResult};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::auth::authenticator::GoogleAuthenticator;

const DRIVE_BASE_URL: &str = "https://www.googleapis.com";
const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
const HTTP_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Deserialize)]
struct DriveUploadResponse {
    id: String,
    #[serde(rename = "webViewLink")]
    web_view_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FolderListResponse {
    files: Vec<FolderEntry>,
}

#[derive(Debug, Deserialize)]
struct FolderEntry {
    id: String,
}

/// Drive client implementing the `Uploader` port
pub struct DriveUploader {
    http: Client,
    authenticator: Arc<GoogleAuthenticator>,
    default_folder_id: Option<String>,
    base_url: String,
}

impl DriveUploader {
    /// Create an uploader against the public Drive API.
    #[must_use]
    pub fn new(authenticator: Arc<GoogleAuthenticator>, default_folder_id: Option<String>) -> Self {
        Self::with_base_url(authenticator, default_folder_id, DRIVE_BASE_URL.to_string())
    }

    /// Create an uploader against an explicit base URL (tests).
    #[must_use]
    pub fn with_base_url(
        authenticator: Arc<GoogleAuthenticator>,
        default_folder_id: Option<String>,
        base_url: String,
    ) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { http, authenticator, default_folder_id, base_url }
    }

    /// Resolve the Drive folder uploads for this account should land in.
    ///
    /// A configured folder name is looked up (or created) once and the
    /// resolved id cached on the account; without a preference the
    /// environment-provided default applies.
    async fn parent_folder_id(
        &self,
        account: &GoogleAccount,
        access_token: &str,
    ) -> Result<Option<String>> {
        let Some(folder_name) = account.preferred_folder_name.as_deref().filter(|n| !n.is_empty())
        else {
            return Ok(self.default_folder_id.clone());
        };

        if let Some(cached) = &account.preferred_folder_id {
            return Ok(Some(cached.clone()));
        }

        let folder_id = match self.find_folder(folder_name, access_token).await? {
            Some(existing) => existing,
            None => self.create_folder(folder_name, access_token).await?,
        };

        self.authenticator.cache_preferred_folder_id(&account.id, folder_id.clone()).await?;
        debug!(folder = %folder_name, id = %folder_id, "resolved upload folder");

        Ok(Some(folder_id))
    }

    async fn find_folder(&self, name: &str, access_token: &str) -> Result<Option<String>> {
        let escaped = name.replace('\'', "\\'");
        let query = format!(
            "name = '{escaped}' and mimeType = '{FOLDER_MIME_TYPE}' and trashed = false and 'root' in parents"
        );

        let response = self
            .http
            .get(format!("{}/drive/v3/files", self.base_url))
            .query(&[
                ("q", query.as_str()),
                ("spaces", "drive"),
                ("fields", "files(id)"),
                ("pageSize", "1"),
                ("supportsAllDrives", "true"),
            ])
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|err| DocRouterError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocRouterError::UploadFailed(format!(
                "folder lookup failed with status {status}: {body}"
            )));
        }

        let listed: FolderListResponse = response
            .json()
            .await
            .map_err(|err| DocRouterError::InvalidResponse(err.to_string()))?;

        Ok(listed.files.into_iter().next().map(|entry| entry.id))
    }

    async fn create_folder(&self, name: &str, access_token: &str) -> Result<String> {
        let body = serde_json::json!({
            "name": name,
            "mimeType": FOLDER_MIME_TYPE,
            "parents": ["root"],
        });

        let response = self
            .http
            .post(format!("{}/drive/v3/files", self.base_url))
            .query(&[("supportsAllDrives", "true"), ("fields", "id")])
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|err| DocRouterError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocRouterError::UploadFailed(format!(
                "folder creation failed with status {status}: {body}"
            )));
        }

        let created: FolderEntry = response
            .json()
            .await
            .map_err(|err| DocRouterError::InvalidResponse(err.to_string()))?;

        Ok(created.id)
    }
}

#[async_trait]
impl Uploader for DriveUploader {
    async fn upload_and_convert(
        &self,
        path: &Path,
        target: ConversionTarget,
        account: &GoogleAccount,
    ) -> Result<UploadResult> {
        let access_token = self.authenticator.valid_access_token(&account.id).await?;
        let parent = self.parent_folder_id(account, &access_token).await?;

        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string());

        let mut metadata = serde_json::json!({
            "name": name,
            "mimeType": target.google_mime_type(),
        });
        if let Some(folder) = parent.filter(|f| !f.is_empty()) {
            metadata["parents"] = serde_json::json!([folder]);
        }

        let (body, boundary) =
            build_multipart_related(&metadata, &bytes, target.upload_content_type())?;

        let response = self
            .http
            .post(format!("{}/upload/drive/v3/files", self.base_url))
            .query(&[
                ("uploadType", "multipart"),
                ("supportsAllDrives", "true"),
                ("fields", "id,webViewLink"),
            ])
            .bearer_auth(&access_token)
            .header(CONTENT_TYPE, format!("multipart/related; boundary={boundary}"))
            .body(body)
            .send()
            .await
            .map_err(|err| DocRouterError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocRouterError::UploadFailed(format!("status {status}: {body}")));
        }

        let uploaded: DriveUploadResponse = response
            .json()
            .await
            .map_err(|err| DocRouterError::InvalidResponse(err.to_string()))?;

        let remote_view_url = uploaded.web_view_link.ok_or_else(|| {
            DocRouterError::InvalidResponse("upload response carried no webViewLink".to_string())
        })?;

        info!(remote_id = %uploaded.id, "file uploaded and converted");

        Ok(UploadResult { remote_id: uploaded.id, remote_view_url })
    }
}

/// Assemble a `multipart/related` body: a JSON metadata part followed by the
/// file content part.
fn build_multipart_related(
    metadata: &serde_json::Value,
    file: &[u8],
    file_mime_type: &str,
) -> Result<(Vec<u8>, String)> {
    let boundary = format!("boundary-{}", uuid::Uuid::new_v4());
    let metadata_bytes =
        serde_json::to_vec(metadata).map_err(|err| DocRouterError::Internal(err.to_string()))?;

    let mut body = Vec::with_capacity(file.len() + metadata_bytes.len() + 256);
    body.extend_from_slice(
        format!("--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n").as_bytes(),
    );
    body.extend_from_slice(&metadata_bytes);
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(format!("--{boundary}\r\nContent-Type: {file_mime_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(file);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Ok((body, boundary))
}

#[cfg(test)]
mod tests {
    //! Unit tests for multipart assembly.
    use super::*;

    /// Validates `build_multipart_related` behavior for the body layout
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures the body opens with the boundary and closes with the
    ///   terminator.
    /// - Ensures both parts and the file bytes are present.
    #[test]
    fn multipart_body_layout() {
        let metadata = serde_json::json!({"name": "report", "mimeType": "x"});
        let (body, boundary) =
            build_multipart_related(&metadata, b"FILEBYTES", "application/test").unwrap();

        let text = String::from_utf8_lossy(&body);
        assert!(text.starts_with(&format!("--{boundary}\r\n")));
        assert!(text.contains("Content-Type: application/json; charset=UTF-8"));
        assert!(text.contains("Content-Type: application/test"));
        assert!(text.contains("FILEBYTES"));
        assert!(text.ends_with(&format!("\r\n--{boundary}--\r\n")));
    }
}
