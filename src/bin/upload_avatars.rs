//! Clears the avatar bucket and reuploads pre-made avatars from disk.

use anyhow::Context;
use avatar_forge::cli;
use avatar_forge::config::{StoreConfig, DEFAULT_BUCKET};
use avatar_forge::{ConfigError, Reuploader, SupabaseStorage, SupabaseUsers, ROSTER};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "upload-avatars")]
#[command(about = "Replace every stored avatar with the images under images/avatars")]
#[command(version)]
struct Cli {
    /// Directory with one folder of images per user, named like Julian/
    #[arg(long, default_value = "images/avatars")]
    avatars_dir: PathBuf,

    /// Storage bucket to clear and fill
    #[arg(long, default_value = DEFAULT_BUCKET)]
    bucket: String,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    cli::init(args.json);
    cli::banner("Upload Avatars", args.json);

    let store = StoreConfig::from_env()
        .context("missing configuration")?
        .with_bucket(&args.bucket);
    tracing::info!(url = %store.url, bucket = %store.bucket, "connected");

    if !args.avatars_dir.is_dir() {
        return Err(ConfigError::MissingDirectory(args.avatars_dir).into());
    }
    tracing::info!(dir = %args.avatars_dir.display(), "avatars directory");

    let reuploader = Reuploader::new(
        Arc::new(SupabaseStorage::new(&store)?),
        Arc::new(SupabaseUsers::new(&store)),
    );

    let report = reuploader.run(&ROSTER, &args.avatars_dir).await;
    cli::print_report(&report, args.json)
}
