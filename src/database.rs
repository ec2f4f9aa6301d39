//! The `users` table: name lookup and avatar field updates (Supabase PostgREST).

use crate::config::StoreConfig;
use crate::error::{DatabaseError, ServiceError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Primary key of a `users` row, kept as the JSON value PostgREST returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(serde_json::Value);

impl UserId {
    /// Wraps a raw id value.
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// The id as it appears in a PostgREST filter (`id=eq.<this>`).
    pub fn as_filter_value(&self) -> String {
        match &self.0 {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_filter_value())
    }
}

/// Full overwrite of a user's avatar fields.
///
/// Only constructible from a non-empty list; `avatar_url` is always the first
/// entry of `avatar_options`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvatarUpdate {
    avatar_url: String,
    avatar_options: Vec<String>,
}

impl AvatarUpdate {
    /// Builds the update, or `None` for an empty list.
    pub fn from_urls(urls: Vec<String>) -> Option<Self> {
        let primary = urls.first()?.clone();
        Some(Self {
            avatar_url: primary,
            avatar_options: urls,
        })
    }

    /// The primary avatar URL.
    pub fn primary(&self) -> &str {
        &self.avatar_url
    }

    /// All avatar URLs, primary first.
    pub fn options(&self) -> &[String] {
        &self.avatar_options
    }
}

/// Read/write access to user records.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Looks up the id of the user with this exact name.
    async fn find_user_id(&self, name: &str) -> Result<Option<UserId>, ServiceError>;

    /// Overwrites the avatar fields of the user with this id.
    async fn update_avatars(&self, id: &UserId, update: &AvatarUpdate)
        -> Result<(), ServiceError>;
}

/// Resolves `name` and replaces its avatars with `urls`.
///
/// Returns the number of URLs written.
pub async fn save_avatars(
    directory: &dyn UserDirectory,
    name: &str,
    urls: Vec<String>,
) -> Result<usize, DatabaseError> {
    let update = AvatarUpdate::from_urls(urls).ok_or(DatabaseError::EmptyAvatarList)?;
    let id = directory
        .find_user_id(name)
        .await?
        .ok_or_else(|| DatabaseError::UserNotFound(name.to_string()))?;

    directory.update_avatars(&id, &update).await?;
    tracing::info!(user = name, count = update.options().len(), "saved avatars to database");
    Ok(update.options().len())
}

/// [`UserDirectory`] over the Supabase PostgREST API.
pub struct SupabaseUsers {
    client: reqwest::Client,
    endpoint: String,
    service_key: String,
}

impl SupabaseUsers {
    /// Creates a client for the `users` table of the configured project.
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/rest/v1/users", config.url.trim_end_matches('/')),
            service_key: config.service_key.clone(),
        }
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn rows(response: reqwest::Response) -> Result<Vec<UserRow>, ServiceError> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ServiceError::from_status(status.as_u16(), &text));
        }
        Ok(serde_json::from_slice(&response.bytes().await?)?)
    }
}

#[async_trait]
impl UserDirectory for SupabaseUsers {
    async fn find_user_id(&self, name: &str) -> Result<Option<UserId>, ServiceError> {
        let response = self
            .authorized(self.client.get(&self.endpoint))
            .query(&[("select", "id".to_string()), ("name", format!("eq.{name}"))])
            .send()
            .await?;

        let mut rows = Self::rows(response).await?;
        if rows.len() > 1 {
            return Err(ServiceError::MalformedResponse(format!(
                "{} users named '{name}'",
                rows.len()
            )));
        }
        Ok(rows.pop().map(|row| UserId(row.id)))
    }

    async fn update_avatars(
        &self,
        id: &UserId,
        update: &AvatarUpdate,
    ) -> Result<(), ServiceError> {
        let response = self
            .authorized(self.client.patch(&self.endpoint))
            .query(&[("id", format!("eq.{}", id.as_filter_value()))])
            .header("Prefer", "return=representation")
            .json(update)
            .send()
            .await?;

        // A row can vanish between lookup and update.
        if Self::rows(response).await?.is_empty() {
            return Err(ServiceError::NotFound(format!("user id {id}")));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct UserRow {
    id: serde_json::Value,
}
