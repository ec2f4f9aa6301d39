//! Shared plumbing for the two job binaries.

use crate::report::RunReport;
use tracing_subscriber::EnvFilter;

/// Loads `.env` (if any) and installs the log subscriber.
///
/// `RUST_LOG` overrides the default `info` level. With `json` output logs go
/// to stderr so stdout carries only the summary document.
pub fn init(json: bool) {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    if json {
        builder.with_writer(std::io::stderr).init();
    } else {
        builder.init();
    }
}

/// Prints a framed title line, unless the run reports as JSON.
pub fn banner(title: &str, json: bool) {
    if !json {
        println!("{}", framed(title));
    }
}

fn framed(title: &str) -> String {
    let rule = "=".repeat(60);
    format!("{rule}\n  {title}\n{rule}")
}

/// Prints the run summary as text or pretty JSON.
pub fn print_report(report: &RunReport, json: bool) -> anyhow::Result<()> {
    println!("{}", report_output(report, json)?);
    Ok(())
}

fn report_output(report: &RunReport, json: bool) -> anyhow::Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(&report.to_json())?)
    } else {
        Ok(format!("\n{}", report.render()))
    }
}
