//! Drive v3 listing client over HTTP.

use super::{ListingClient, StorageQuota};
use crate::provider::remote::RawEntry;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_DRIVE_ENDPOINT: &str = "https://www.googleapis.com/drive/v3";

const LIST_FIELDS: &str = "files(id, name, mimeType, size, createdTime, webContentLink, iconLink)";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    #[serde(default)]
    mime_type: String,
    size: Option<String>,
    created_time: Option<DateTime<Utc>>,
    web_content_link: Option<String>,
    icon_link: Option<String>,
}

impl From<DriveFile> for RawEntry {
    fn from(file: DriveFile) -> Self {
        RawEntry {
            id: file.id,
            name: file.name,
            content_type_tag: file.mime_type,
            byte_size: file.size.and_then(|s| s.parse().ok()),
            created_timestamp: file.created_time,
            download_url: file.web_content_link,
            thumbnail_url: file.icon_link,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct About {
    storage_quota: Option<Quota>,
}

#[derive(Debug, Deserialize)]
struct Quota {
    limit: Option<String>,
    usage: Option<String>,
}

/// Drive files listing client
pub struct DriveHttpClient {
    client: reqwest::Client,
    endpoint: String,
    access_token: Option<String>,
}

impl DriveHttpClient {
    pub fn new(endpoint: Option<String>, access_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            endpoint: endpoint
                .unwrap_or_else(|| DEFAULT_DRIVE_ENDPOINT.to_string())
                .trim_end_matches('/')
                .to_string(),
            access_token,
        }
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, String> {
        let response = self
            .authorized(self.client.get(url).query(query))
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;
        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| format!("Parse error: {}", e))
    }
}

/// Query selecting the non-trashed children of `parent_id`.
pub fn children_query(parent_id: &str) -> String {
    format!("'{}' in parents and trashed = false", parent_id.replace('\'', "\\'"))
}

#[async_trait]
impl ListingClient for DriveHttpClient {
    async fn list_page(&self, parent_id: &str, page_size: u32) -> Result<Vec<RawEntry>, String> {
        let url = format!("{}/files", self.endpoint);
        let query = [
            ("q", children_query(parent_id)),
            ("pageSize", page_size.to_string()),
            ("fields", LIST_FIELDS.to_string()),
        ];
        let list: FileList = self.get_json(&url, &query).await?;
        debug!(parent = parent_id, count = list.files.len(), "Drive listing page");
        Ok(list.files.into_iter().map(RawEntry::from).collect())
    }

    async fn storage_quota(&self) -> Result<Option<StorageQuota>, String> {
        let url = format!("{}/about", self.endpoint);
        let about: About = self
            .get_json(&url, &[("fields", "storageQuota".to_string())])
            .await?;
        Ok(about.storage_quota.and_then(|quota| {
            let usage = quota.usage?.parse().ok()?;
            Some(StorageQuota {
                usage,
                limit: quota.limit.and_then(|l| l.parse().ok()),
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drive_file_maps_absent_fields_to_none() {
        let file: DriveFile = serde_json::from_str(
            r#"{"id":"f1","name":"Notes","mimeType":"application/vnd.google-apps.folder"}"#,
        )
        .unwrap();
        let raw = RawEntry::from(file);
        assert_eq!(raw.byte_size, None);
        assert_eq!(raw.created_timestamp, None);
        assert_eq!(raw.download_url, None);
    }

    #[test]
    fn drive_file_parses_string_sizes_and_timestamps() {
        let file: DriveFile = serde_json::from_str(
            r#"{"id":"v1","name":"a.mp4","mimeType":"video/mp4","size":"1048576",
                "createdTime":"2023-11-01T10:00:00.000Z","webContentLink":"https://dl/v1"}"#,
        )
        .unwrap();
        let raw = RawEntry::from(file);
        assert_eq!(raw.byte_size, Some(1_048_576));
        assert!(raw.created_timestamp.is_some());
        assert_eq!(raw.download_url.as_deref(), Some("https://dl/v1"));
    }

    #[test]
    fn children_query_escapes_quotes() {
        assert_eq!(children_query("root"), "'root' in parents and trashed = false");
        assert_eq!(children_query("a'b"), "'a\\'b' in parents and trashed = false");
    }

    #[test]
    fn endpoint_trailing_slash_is_trimmed() {
        let client = DriveHttpClient::new(Some("http://localhost:9000/".to_string()), None);
        assert_eq!(client.endpoint, "http://localhost:9000");
    }
}
