//! Generates six stylized avatars per team member and saves them.

use anyhow::Context;
use avatar_forge::cli;
use avatar_forge::config::{Config, DEFAULT_BUCKET};
use avatar_forge::{
    AvatarGenerator, HttpFetcher, OpenAiImageSynthesizer, OpenAiVisionAnalyzer, SupabaseStorage,
    SupabaseUsers, ROSTER,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "generate-avatars")]
#[command(about = "Generate stylized avatars from source photos and upload them")]
#[command(version)]
struct Cli {
    /// Directory with one photo per user, named like julian.jpg
    #[arg(long, default_value = "source_photos")]
    source_dir: PathBuf,

    /// Storage bucket for the avatars
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
    cli::banner("Avatar Generator", args.json);

    let mut config = Config::from_env().context("missing configuration")?;
    config.store = config.store.with_bucket(&args.bucket);

    if !args.source_dir.exists() {
        std::fs::create_dir_all(&args.source_dir).with_context(|| {
            format!("creating source photos directory {}", args.source_dir.display())
        })?;
        eprintln!(
            "\nCreated source photos directory: {}",
            args.source_dir.display()
        );
        eprintln!("Please add photos for each user to it.");
        eprintln!("Name them like: julian.jpg, dave.jpg, jason.jpg, etc.");
        return Ok(());
    }

    let generator = AvatarGenerator::new(
        Arc::new(OpenAiVisionAnalyzer::from_config(&config)?),
        Arc::new(OpenAiImageSynthesizer::from_config(&config)?),
        Arc::new(HttpFetcher::new()),
        Arc::new(SupabaseStorage::new(&config.store)?),
        Arc::new(SupabaseUsers::new(&config.store)),
    );

    let report = generator.run(&ROSTER, &args.source_dir).await;
    cli::print_report(&report, args.json)
}
