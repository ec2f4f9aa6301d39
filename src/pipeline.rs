//! The generation job: analyze each user's photo, render every style, upload,
//! and save the resulting URLs.

use crate::analyzer::PhotoAnalyzer;
use crate::catalog::{StylePreset, TeamMember, STYLES};
use crate::database::{save_avatars, UserDirectory};
use crate::error::{DatabaseError, PairingError};
use crate::fetch::ImageFetcher;
use crate::image::ImageFormat;
use crate::report::{FailureReason, JobKind, RunReport, UserOutcome};
use crate::storage::{generated_object_key, ObjectStore};
use crate::synthesizer::{compose_prompt, AvatarSynthesizer};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Source photo extensions, in lookup order.
pub const SOURCE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Finds `{dir}/{lowercased name}.{ext}` for the first extension that exists.
pub fn find_source_photo(dir: &Path, member: &TeamMember) -> Option<PathBuf> {
    let slug = member.slug();
    SOURCE_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{slug}.{ext}")))
        .find(|path| path.is_file())
}

/// Runs the per-user avatar pipeline against a set of adapters.
pub struct AvatarGenerator {
    analyzer: Arc<dyn PhotoAnalyzer>,
    synthesizer: Arc<dyn AvatarSynthesizer>,
    fetcher: Arc<dyn ImageFetcher>,
    store: Arc<dyn ObjectStore>,
    directory: Arc<dyn UserDirectory>,
}

impl AvatarGenerator {
    /// Wires the pipeline to its adapters.
    pub fn new(
        analyzer: Arc<dyn PhotoAnalyzer>,
        synthesizer: Arc<dyn AvatarSynthesizer>,
        fetcher: Arc<dyn ImageFetcher>,
        store: Arc<dyn ObjectStore>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            analyzer,
            synthesizer,
            fetcher,
            store,
            directory,
        }
    }

    /// Processes every roster member whose photo is in `source_dir`.
    pub async fn run(&self, roster: &[TeamMember], source_dir: &Path) -> RunReport {
        let mut report = RunReport::new(JobKind::Generate);

        for member in roster {
            let outcome = match find_source_photo(source_dir, member) {
                Some(photo) => self.process_user(member, &photo).await,
                None => {
                    tracing::warn!(
                        user = member.name,
                        expected = %source_dir.join(format!("{}.jpg", member.slug())).display(),
                        "no source photo found (also tried .jpeg, .png, .webp)"
                    );
                    UserOutcome::Failed(FailureReason::NoSourcePhoto)
                }
            };
            report.record(member.name, outcome);
        }

        report
    }

    /// Analyze, generate every style, then save. Never aborts the run.
    pub async fn process_user(&self, member: &TeamMember, photo: &Path) -> UserOutcome {
        tracing::info!(
            user = member.name,
            setting = member.setting_short,
            "processing user"
        );

        let description = match self.analyzer.analyze(photo).await {
            Ok(description) => description,
            Err(e) => {
                tracing::error!(user = member.name, error = %e, "photo analysis failed");
                return UserOutcome::Failed(FailureReason::Analysis(e.to_string()));
            }
        };

        let mut urls = Vec::with_capacity(STYLES.len());
        for style in &STYLES {
            match self.generate_style(member, style, &description).await {
                Ok(url) => {
                    tracing::info!(user = member.name, style = style.display_name, "✓ uploaded");
                    urls.push(url);
                }
                Err(e) => {
                    tracing::warn!(
                        user = member.name,
                        style = style.display_name,
                        error = %e,
                        "✗ style failed"
                    );
                }
            }
        }

        if urls.is_empty() {
            tracing::error!(user = member.name, "no avatars generated");
            return UserOutcome::Failed(FailureReason::NoAvatarsGenerated);
        }

        persist(self.directory.as_ref(), member.name, urls).await
    }

    /// One (user, style) pairing: generate, download, upload.
    async fn generate_style(
        &self,
        member: &TeamMember,
        style: &StylePreset,
        description: &str,
    ) -> Result<String, PairingError> {
        tracing::info!(user = member.name, style = style.display_name, "generating");
        let prompt = compose_prompt(description, style, member.setting);

        let temp_url = self
            .synthesizer
            .synthesize(&prompt)
            .await
            .map_err(PairingError::Synthesize)?;
        let data = self
            .fetcher
            .fetch(&temp_url)
            .await
            .map_err(PairingError::Download)?;

        let key = generated_object_key(
            member.name,
            style.name,
            chrono::Local::now().naive_local(),
        );
        let content_type = ImageFormat::from_magic_bytes(&data)
            .unwrap_or_default()
            .mime_type();
        self.store
            .upload(&key, data, content_type)
            .await
            .map_err(PairingError::Upload)?;

        Ok(self.store.public_url(&key))
    }
}

/// Saves `urls` for `name` and maps the result to a terminal outcome.
pub(crate) async fn persist(
    directory: &dyn UserDirectory,
    name: &str,
    urls: Vec<String>,
) -> UserOutcome {
    match save_avatars(directory, name, urls.clone()).await {
        Ok(_) => UserOutcome::Success { urls },
        Err(DatabaseError::UserNotFound(_)) => {
            tracing::error!(user = name, "user not found in database");
            UserOutcome::Failed(FailureReason::UserNotFound)
        }
        Err(e) => {
            tracing::error!(user = name, error = %e, "database update failed");
            UserOutcome::Failed(FailureReason::Database(e.to_string()))
        }
    }
}
