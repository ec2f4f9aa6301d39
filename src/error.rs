//! Error types for the avatar jobs.
//!
//! Every external adapter reports failures through [`ServiceError`], a closed
//! set of kinds shared by the vision, image, storage and database services.
//! Adapter-specific enums wrap it where the adapter has extra failure modes of
//! its own.

use std::path::PathBuf;

/// Longest error body kept in a message.
const MAX_ERROR_BODY_LEN: usize = 500;

/// Failure kinds shared by every external service adapter.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Transport failure (DNS, TLS, connection reset, body read).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Credentials missing, invalid, or not allowed to do this.
    #[error("authorization failed: {0}")]
    Authorization(String),

    /// The addressed resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The service answered, but not with what we expected.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Any other non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

impl ServiceError {
    /// Classifies a non-success HTTP status and its body.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = sanitize_error_message(body);
        match status {
            401 | 403 => Self::Authorization(message),
            404 => Self::NotFound(message),
            _ => Self::Api { status, message },
        }
    }

    /// Returns true if the error is an authorization rejection.
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Authorization(_))
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}

/// Errors from analyzing a source photo.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    /// Source photo could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File extension is not an image type the vision service accepts.
    #[error("unsupported image type: {}", .0.display())]
    UnsupportedImage(PathBuf),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Errors from the object store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Access policy rejected the operation.
    #[error(
        "storage access denied (run the SQL in database/storage_policies.sql or disable RLS on the bucket): {0}"
    )]
    AccessDenied(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Errors from the user database.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// No `users` row matches the name.
    #[error("user '{0}' not found in database")]
    UserNotFound(String),

    /// Refused to write an empty avatar list.
    #[error("no avatar URLs to save")]
    EmptyAvatarList,

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Failure of a single (user, style) pairing. Always recoverable.
#[derive(Debug, thiserror::Error)]
pub enum PairingError {
    #[error("generation failed: {0}")]
    Synthesize(#[source] ServiceError),

    #[error("download failed: {0}")]
    Download(#[source] ServiceError),

    #[error("upload failed: {0}")]
    Upload(#[source] StoreError),
}

/// Startup failures that abort the whole run.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is absent or empty.
    #[error("{0} not set in environment")]
    MissingVar(&'static str),

    /// A required input directory does not exist.
    #[error("directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    /// The project URL cannot be used as a base for API paths.
    #[error("invalid project URL: {0}")]
    InvalidUrl(String),
}

/// Crate-level error.
#[derive(Debug, thiserror::Error)]
pub enum AvatarError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Analyze(#[from] AnalyzeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for avatar operations.
pub type Result<T> = std::result::Result<T, AvatarError>;

/// Trims an HTTP error body to something fit for a log line.
pub fn sanitize_error_message(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "(empty response body)".into();
    }
    let single_line: String = trimmed
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if single_line.chars().count() <= MAX_ERROR_BODY_LEN {
        return single_line;
    }
    let mut cut: String = single_line.chars().take(MAX_ERROR_BODY_LEN).collect();
    cut.push_str("...");
    cut
}
