//! Object storage for avatar images (Supabase Storage).
//!
//! Keys are flat: no directory nesting, so a single bucket-level access
//! policy covers every object. Every upload overwrites an existing object of
//! the same key.

use crate::config::StoreConfig;
use crate::error::{sanitize_error_message, ConfigError, ServiceError, StoreError};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Page size used when listing a bucket.
const LIST_LIMIT: u32 = 1000;

/// Key for a freshly generated avatar: `{user}_{style}_{YYYYmmdd_HHMMSS}.png`.
///
/// The timestamp keeps repeated runs from colliding.
pub fn generated_object_key(user: &str, style: &str, timestamp: NaiveDateTime) -> String {
    format!(
        "{}_{}_{}.png",
        user.to_lowercase(),
        style,
        timestamp.format("%Y%m%d_%H%M%S")
    )
}

/// Key for a pre-made avatar file: `{user}_{file name}`.
pub fn seeded_object_key(user: &str, file_name: &str) -> String {
    format!("{}_{}", user.to_lowercase(), file_name)
}

/// A bucket of publicly readable objects.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `data` under `key`, replacing any existing object.
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str)
        -> Result<(), StoreError>;

    /// Public URL under which `key` is served.
    fn public_url(&self, key: &str) -> String;

    /// Names of every object in the bucket.
    async fn list(&self) -> Result<Vec<String>, StoreError>;

    /// Deletes the named objects in one call.
    async fn remove(&self, keys: &[String]) -> Result<(), StoreError>;
}

/// [`ObjectStore`] over the Supabase Storage REST API.
pub struct SupabaseStorage {
    client: reqwest::Client,
    base_url: Url,
    service_key: String,
    bucket: String,
}

impl SupabaseStorage {
    /// Creates a storage client for the configured bucket.
    ///
    /// Fails if the project URL cannot carry a path.
    pub fn new(config: &StoreConfig) -> Result<Self, ConfigError> {
        let base_url = Url::parse(&config.url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ConfigError::InvalidUrl(config.url.clone()))?;
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            service_key: config.service_key.clone(),
            bucket: config.bucket.clone(),
        })
    }

    /// `{project}/storage/v1/{segments...}`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["storage", "v1"])
                .extend(segments);
        }
        url
    }

    fn object_url(&self, key: &str) -> Url {
        self.endpoint(&["object", self.bucket.as_str(), key])
    }

    async fn list_page(&self, offset: u32) -> Result<Vec<String>, StoreError> {
        let body = ListRequest {
            prefix: "",
            limit: LIST_LIMIT,
            offset,
            sort_by: SortBy {
                column: "name",
                order: "asc",
            },
        };
        let url = self.endpoint(&["object", "list", self.bucket.as_str()]);
        let response = self
            .authorized(self.client.post(url))
            .json(&body)
            .send()
            .await
            .map_err(ServiceError::from)?;
        let response = Self::check(response).await?;

        let bytes = response.bytes().await.map_err(ServiceError::from)?;
        let entries: Vec<ObjectEntry> =
            serde_json::from_slice(&bytes).map_err(ServiceError::from)?;
        Ok(entries.into_iter().filter_map(|e| e.name).collect())
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        Err(classify_error(status.as_u16(), &text))
    }
}

/// Maps a failed storage response to a [`StoreError`].
///
/// Supabase reports policy violations either as a 401/403 status or as a 400
/// whose JSON body carries `"statusCode": "403"`.
fn classify_error(status: u16, body: &str) -> StoreError {
    let reported = serde_json::from_str::<StorageErrorBody>(body)
        .ok()
        .and_then(|b| b.status_code)
        .and_then(|code| match code {
            serde_json::Value::String(s) => s.parse::<u16>().ok(),
            serde_json::Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
            _ => None,
        });

    let denied = matches!(status, 401 | 403)
        || matches!(reported, Some(401 | 403))
        || body.to_lowercase().contains("row-level security");

    if denied {
        StoreError::AccessDenied(sanitize_error_message(body))
    } else {
        StoreError::Service(ServiceError::from_status(status, body))
    }
}

#[async_trait]
impl ObjectStore for SupabaseStorage {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError> {
        let response = self
            .authorized(self.client.post(self.object_url(key)))
            .header("content-type", content_type)
            .header("x-upsert", "true")
            .body(data)
            .send()
            .await
            .map_err(ServiceError::from)?;
        Self::check(response).await?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        self.endpoint(&["object", "public", self.bucket.as_str(), key])
            .into()
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        let mut offset = 0;
        loop {
            let page = self.list_page(offset).await?;
            let full = page.len() >= LIST_LIMIT as usize;
            names.extend(page.into_iter().filter(|name| !name.is_empty()));
            if !full {
                break;
            }
            offset += LIST_LIMIT;
        }
        Ok(names)
    }

    async fn remove(&self, keys: &[String]) -> Result<(), StoreError> {
        let url = self.endpoint(&["object", self.bucket.as_str()]);
        let response = self
            .authorized(self.client.delete(url))
            .json(&RemoveRequest { prefixes: keys })
            .send()
            .await
            .map_err(ServiceError::from)?;
        Self::check(response).await?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ListRequest<'a> {
    prefix: &'a str,
    limit: u32,
    offset: u32,
    #[serde(rename = "sortBy")]
    sort_by: SortBy<'a>,
}

#[derive(Debug, Serialize)]
struct SortBy<'a> {
    column: &'a str,
    order: &'a str,
}

#[derive(Debug, Serialize)]
struct RemoveRequest<'a> {
    prefixes: &'a [String],
}

#[derive(Debug, Deserialize)]
struct ObjectEntry {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StorageErrorBody {
    #[serde(default, rename = "statusCode")]
    status_code: Option<serde_json::Value>,
}
