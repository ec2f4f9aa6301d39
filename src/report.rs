//! Per-user outcomes and the end-of-run summary.

use std::fmt::Write as _;

/// Why a user ended the run without avatars in the database.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FailureReason {
    /// No photo under any accepted extension.
    #[error("No source photo")]
    NoSourcePhoto,

    /// Reupload job: the user's folder is missing or holds no images.
    #[error("No images found")]
    NoImagesFound,

    /// The vision call failed; nothing was generated.
    #[error("analysis failed: {0}")]
    Analysis(String),

    /// Every style failed.
    #[error("no avatars generated")]
    NoAvatarsGenerated,

    /// Avatars were uploaded but the `users` row does not exist.
    #[error("user not found in database")]
    UserNotFound,

    /// The database write itself failed.
    #[error("database update failed: {0}")]
    Database(String),
}

/// Terminal state of one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserOutcome {
    /// Avatars uploaded and saved; `urls` is what was written, primary first.
    Success { urls: Vec<String> },
    /// Skipped or failed.
    Failed(FailureReason),
}

impl UserOutcome {
    /// Returns true for [`UserOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Number of avatars saved, zero on failure.
    pub fn count(&self) -> usize {
        match self {
            Self::Success { urls } => urls.len(),
            Self::Failed(_) => 0,
        }
    }
}

/// Which batch job produced a report; only affects wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    /// Photo analysis + generation + upload.
    Generate,
    /// Bucket clear + reupload of pre-made images.
    Upload,
}

/// Results of one run, in roster order.
#[derive(Debug, Clone)]
pub struct RunReport {
    kind: JobKind,
    results: Vec<(String, UserOutcome)>,
}

impl RunReport {
    /// Creates an empty report.
    pub fn new(kind: JobKind) -> Self {
        Self {
            kind,
            results: Vec::new(),
        }
    }

    /// Records the outcome of one user. Each user is recorded once.
    pub fn record(&mut self, name: impl Into<String>, outcome: UserOutcome) {
        self.results.push((name.into(), outcome));
    }

    /// Outcome recorded for `name`.
    pub fn outcome(&self, name: &str) -> Option<&UserOutcome> {
        self.results
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, outcome)| outcome)
    }

    /// All results, in the order they were recorded.
    pub fn results(&self) -> &[(String, UserOutcome)] {
        &self.results
    }

    /// Number of successful users.
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|(_, o)| o.is_success()).count()
    }

    /// Number of users recorded.
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Human-readable summary table.
    pub fn render(&self) -> String {
        let rule = "=".repeat(60);
        let mut out = String::new();
        let _ = writeln!(out, "{rule}\n  SUMMARY\n{rule}");

        for (name, outcome) in &self.results {
            let _ = match (self.kind, outcome) {
                (JobKind::Generate, UserOutcome::Success { urls }) => {
                    writeln!(out, "  ✓ {name}: Generated {} avatars", urls.len())
                }
                (JobKind::Upload, UserOutcome::Success { urls }) => {
                    writeln!(out, "  ✓ {name}: {} avatars uploaded", urls.len())
                }
                (JobKind::Upload, UserOutcome::Failed(FailureReason::NoImagesFound)) => {
                    writeln!(out, "  - {name}: No images in folder (skipped)")
                }
                (_, UserOutcome::Failed(reason)) => writeln!(out, "  ✗ {name}: {reason}"),
            };
        }

        let verb = match self.kind {
            JobKind::Generate => "processed successfully",
            JobKind::Upload => "updated",
        };
        let _ = write!(
            out,
            "\nTotal: {}/{} users {verb}",
            self.succeeded(),
            self.total()
        );
        out
    }

    /// Machine-readable summary.
    pub fn to_json(&self) -> serde_json::Value {
        let users: Vec<serde_json::Value> = self
            .results
            .iter()
            .map(|(name, outcome)| match outcome {
                UserOutcome::Success { urls } => serde_json::json!({
                    "name": name,
                    "success": true,
                    "count": urls.len(),
                    "urls": urls,
                }),
                UserOutcome::Failed(reason) => serde_json::json!({
                    "name": name,
                    "success": false,
                    "count": 0,
                    "error": reason.to_string(),
                }),
            })
            .collect();

        serde_json::json!({
            "succeeded": self.succeeded(),
            "total": self.total(),
            "users": users,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(kind: JobKind) -> RunReport {
        let mut report = RunReport::new(kind);
        report.record(
            "Julian",
            UserOutcome::Success {
                urls: vec!["a".into(), "b".into()],
            },
        );
        report.record("Dave", UserOutcome::Failed(FailureReason::NoSourcePhoto));
        report.record("Jason", UserOutcome::Failed(FailureReason::NoImagesFound));
        report
    }

    #[test]
    fn test_counts() {
        let report = sample(JobKind::Generate);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.total(), 3);
        assert_eq!(report.outcome("Julian").map(UserOutcome::count), Some(2));
        assert_eq!(report.outcome("Dave").map(UserOutcome::count), Some(0));
        assert!(report.outcome("Nobody").is_none());
    }

    #[test]
    fn test_render_generate() {
        let text = sample(JobKind::Generate).render();
        assert!(text.contains("  ✓ Julian: Generated 2 avatars"));
        assert!(text.contains("  ✗ Dave: No source photo"));
        assert!(text.ends_with("Total: 1/3 users processed successfully"));
    }

    #[test]
    fn test_render_upload() {
        let text = sample(JobKind::Upload).render();
        assert!(text.contains("  ✓ Julian: 2 avatars uploaded"));
        assert!(text.contains("  - Jason: No images in folder (skipped)"));
        assert!(text.ends_with("Total: 1/3 users updated"));
    }

    #[test]
    fn test_to_json() {
        let json = sample(JobKind::Generate).to_json();
        assert_eq!(json["succeeded"], 1);
        assert_eq!(json["users"][0]["urls"][1], "b");
        assert_eq!(json["users"][1]["error"], "No source photo");
    }
}
