#![warn(missing_docs)]
//! avatar-forge - stylized profile pictures for a fixed team roster.
//!
//! Two batch jobs share this crate:
//!
//! - **generate**: for each team member, describe their source photo with a
//!   vision model, render one avatar per style preset, upload each to the
//!   object store and save the public URLs on the member's `users` row.
//! - **reupload**: clear the bucket, then upload folders of pre-made avatars
//!   and save those URLs instead.
//!
//! Every external service sits behind a trait ([`PhotoAnalyzer`],
//! [`AvatarSynthesizer`], [`ImageFetcher`], [`ObjectStore`],
//! [`UserDirectory`]) so the pipelines run unchanged against fakes.
//!
//! # Quick Start
//!
//! ```no_run
//! use avatar_forge::{
//!     AvatarGenerator, Config, HttpFetcher, OpenAiImageSynthesizer, OpenAiVisionAnalyzer,
//!     SupabaseStorage, SupabaseUsers, ROSTER,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> avatar_forge::Result<()> {
//!     let config = Config::from_env()?;
//!     let generator = AvatarGenerator::new(
//!         Arc::new(OpenAiVisionAnalyzer::from_config(&config)?),
//!         Arc::new(OpenAiImageSynthesizer::from_config(&config)?),
//!         Arc::new(HttpFetcher::new()),
//!         Arc::new(SupabaseStorage::new(&config.store)?),
//!         Arc::new(SupabaseUsers::new(&config.store)),
//!     );
//!     let report = generator.run(&ROSTER, std::path::Path::new("source_photos")).await;
//!     println!("{}", report.render());
//!     Ok(())
//! }
//! ```
//!
//! # Features
//! - `cli` (default): the `generate-avatars` and `upload-avatars` binaries.

pub mod analyzer;
pub mod catalog;
pub mod config;
pub mod database;
mod error;
pub mod fetch;
pub mod image;
pub mod pipeline;
pub mod report;
pub mod reupload;
pub mod storage;
pub mod synthesizer;

#[cfg(feature = "cli")]
#[doc(hidden)]
pub mod cli;

#[cfg(test)]
mod testing;

pub use error::{
    sanitize_error_message, AnalyzeError, AvatarError, ConfigError, DatabaseError, PairingError,
    Result, ServiceError, StoreError,
};

pub use analyzer::{is_refusal, OpenAiVisionAnalyzer, PhotoAnalyzer, FALLBACK_DESCRIPTION};
pub use catalog::{StylePreset, TeamMember, ROSTER, STYLES};
pub use config::{Config, StoreConfig};
pub use database::{save_avatars, AvatarUpdate, SupabaseUsers, UserDirectory};
pub use fetch::{HttpFetcher, ImageFetcher};
pub use pipeline::{find_source_photo, AvatarGenerator};
pub use report::{FailureReason, RunReport, UserOutcome};
pub use reupload::{clear_bucket, Reuploader};
pub use storage::{ObjectStore, SupabaseStorage};
pub use synthesizer::{compose_prompt, AvatarSynthesizer, OpenAiImageSynthesizer};
