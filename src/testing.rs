//! Recording in-memory adapters for pipeline tests.

use crate::analyzer::PhotoAnalyzer;
use crate::catalog::STYLES;
use crate::database::{AvatarUpdate, UserDirectory, UserId};
use crate::error::{AnalyzeError, ServiceError, StoreError};
use crate::fetch::ImageFetcher;
use crate::storage::ObjectStore;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const PNG_BYTES: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

fn stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

/// Describes every photo as `description of <file stem>`.
#[derive(Default)]
pub struct FakeAnalyzer {
    failing: HashSet<String>,
    calls: Mutex<Vec<PathBuf>>,
}

impl FakeAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes analysis of `<slug>.*` fail with a network-style error.
    pub fn fail_on(mut self, slug: &str) -> Self {
        self.failing.insert(slug.to_string());
        self
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PhotoAnalyzer for FakeAnalyzer {
    async fn analyze(&self, path: &Path) -> Result<String, AnalyzeError> {
        self.calls.lock().unwrap().push(path.to_path_buf());
        let slug = stem(path);
        if self.failing.contains(&slug) {
            return Err(AnalyzeError::Service(ServiceError::Api {
                status: 503,
                message: "vision service unavailable".into(),
            }));
        }
        Ok(format!("description of {slug}"))
    }
}

/// Answers every prompt with a fresh temporary URL.
#[derive(Default)]
pub struct FakeSynthesizer {
    failing: Vec<(String, &'static str)>,
    prompts: Mutex<Vec<String>>,
}

impl FakeSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes generation fail for one user slug and style name.
    pub fn fail_on(mut self, slug: &str, style: &str) -> Self {
        let suffix = STYLES
            .iter()
            .find(|s| s.name == style)
            .map(|s| s.prompt_suffix)
            .unwrap_or_else(|| panic!("unknown style {style}"));
        self.failing.push((format!("description of {slug}"), suffix));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl crate::synthesizer::AvatarSynthesizer for FakeSynthesizer {
    async fn synthesize(&self, prompt: &str) -> Result<String, ServiceError> {
        let mut prompts = self.prompts.lock().unwrap();
        prompts.push(prompt.to_string());
        let failed = self.failing.iter().any(|(description, suffix)| {
            prompt.contains(description.as_str()) && prompt.contains(suffix)
        });
        if failed {
            return Err(ServiceError::Api {
                status: 500,
                message: "simulated generation failure".into(),
            });
        }
        Ok(format!("https://generated.example/tmp/{}.png", prompts.len()))
    }
}

/// Returns a tiny PNG for every URL.
#[derive(Default)]
pub struct FakeFetcher {
    urls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ServiceError> {
        self.urls.lock().unwrap().push(url.to_string());
        Ok(PNG_BYTES.to_vec())
    }
}

/// Bucket kept in memory.
#[derive(Default)]
pub struct FakeStore {
    objects: Mutex<Vec<String>>,
    uploads: Mutex<Vec<(String, String)>>,
    removed: Mutex<Vec<String>>,
    fail_listing: bool,
    fail_removal: bool,
    deny_uploads_containing: Option<String>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates the bucket.
    pub fn with_objects(self, keys: &[&str]) -> Self {
        *self.objects.lock().unwrap() = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    /// Makes `list` fail with an access error.
    pub fn failing_list(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Makes `remove` fail, leaving every object in place.
    pub fn failing_remove(mut self) -> Self {
        self.fail_removal = true;
        self
    }

    /// Rejects uploads whose key contains `fragment`.
    pub fn deny_uploads_containing(mut self, fragment: &str) -> Self {
        self.deny_uploads_containing = Some(fragment.to_string());
        self
    }

    /// Keys of every upload attempt, successful or not.
    pub fn upload_attempts(&self) -> Vec<String> {
        self.uploads.lock().unwrap().iter().map(|(k, _)| k.clone()).collect()
    }

    /// Content types of every upload attempt.
    pub fn content_types(&self) -> Vec<String> {
        self.uploads.lock().unwrap().iter().map(|(_, c)| c.clone()).collect()
    }

    pub fn objects(&self) -> Vec<String> {
        self.objects.lock().unwrap().clone()
    }

    pub fn removed(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn upload(
        &self,
        key: &str,
        _data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError> {
        self.uploads
            .lock()
            .unwrap()
            .push((key.to_string(), content_type.to_string()));
        if let Some(fragment) = &self.deny_uploads_containing {
            if key.contains(fragment.as_str()) {
                return Err(StoreError::AccessDenied("row-level security".into()));
            }
        }
        let mut objects = self.objects.lock().unwrap();
        if !objects.iter().any(|k| k == key) {
            objects.push(key.to_string());
        }
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://store.example/public/{key}")
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        if self.fail_listing {
            return Err(StoreError::Service(ServiceError::Authorization(
                "listing denied".into(),
            )));
        }
        Ok(self.objects())
    }

    async fn remove(&self, keys: &[String]) -> Result<(), StoreError> {
        if self.fail_removal {
            return Err(StoreError::AccessDenied("delete rejected by policy".into()));
        }
        self.objects.lock().unwrap().retain(|k| !keys.contains(k));
        self.removed.lock().unwrap().extend(keys.iter().cloned());
        Ok(())
    }
}

/// `users` table keyed by name; the id of a user is their name.
#[derive(Default)]
pub struct FakeDirectory {
    users: HashSet<String>,
    lookups: Mutex<usize>,
    writes: Mutex<Vec<(String, AvatarUpdate)>>,
}

impl FakeDirectory {
    pub fn with_users(names: &[&str]) -> Self {
        Self {
            users: names.iter().map(|n| n.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn lookups(&self) -> usize {
        *self.lookups.lock().unwrap()
    }

    /// Every avatar write, as (user name, update).
    pub fn writes(&self) -> Vec<(String, AvatarUpdate)> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserDirectory for FakeDirectory {
    async fn find_user_id(&self, name: &str) -> Result<Option<UserId>, ServiceError> {
        *self.lookups.lock().unwrap() += 1;
        Ok(self
            .users
            .contains(name)
            .then(|| UserId::new(serde_json::Value::String(name.to_string()))))
    }

    async fn update_avatars(
        &self,
        id: &UserId,
        update: &AvatarUpdate,
    ) -> Result<(), ServiceError> {
        self.writes
            .lock()
            .unwrap()
            .push((id.as_filter_value(), update.clone()));
        Ok(())
    }
}

/// Collects formatted log output while installed as the thread's default
/// subscriber.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes `tracing` events on this thread here until the guard drops.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_target(false)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Captured lines containing `needle`.
    pub fn lines_with(&self, needle: &str) -> Vec<String> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8_lossy(&bytes)
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_string)
            .collect()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogCapture {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
