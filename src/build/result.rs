//! Per-target build outcomes.
//!
//! Every atlas configuration and the final descriptor emission is a target.
//! A failed target never stops its siblings, so the summary is the only
//! place where the overall outcome is decided.

use std::path::PathBuf;
use std::time::Duration;

/// Target ID of the descriptor emission step.
pub const DESCRIPTOR_TARGET: &str = "descriptor";

const ATLAS_PREFIX: &str = "atlas:";

/// Maximum number of warnings listed per target in [`BuildSummary::summary`].
const WARNINGS_PER_TARGET: usize = 5;

/// Target ID of an atlas configuration.
pub fn atlas_target_id(name: &str) -> String {
    format!("{}{}", ATLAS_PREFIX, name)
}

/// Status of a single build target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    Success,
    /// Sources were discovered but nothing was written (dry run)
    Skipped,
    Failed(String),
}

impl BuildStatus {
    /// Success or skipped.
    pub fn is_success(&self) -> bool {
        !self.is_failure()
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, BuildStatus::Failed(_))
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildStatus::Success => write!(f, "success"),
            BuildStatus::Skipped => write!(f, "skipped"),
            BuildStatus::Failed(err) => write!(f, "failed: {}", err),
        }
    }
}

/// Outcome of one atlas configuration or of the descriptor emission.
#[derive(Debug, Clone)]
pub struct TargetResult {
    /// `atlas:<name>` or [`DESCRIPTOR_TARGET`]
    pub target_id: String,
    pub status: BuildStatus,
    /// Files written by this target
    pub outputs: Vec<PathBuf>,
    pub duration: Duration,
    /// Recoverable problems, already formatted with their severity
    pub warnings: Vec<String>,
}

impl TargetResult {
    fn new(target_id: String, status: BuildStatus, outputs: Vec<PathBuf>, duration: Duration) -> Self {
        Self { target_id, status, outputs, duration, warnings: Vec::new() }
    }

    pub fn success(target_id: String, outputs: Vec<PathBuf>, duration: Duration) -> Self {
        Self::new(target_id, BuildStatus::Success, outputs, duration)
    }

    pub fn skipped(target_id: String) -> Self {
        Self::new(target_id, BuildStatus::Skipped, Vec::new(), Duration::ZERO)
    }

    pub fn failed(target_id: String, error: String, duration: Duration) -> Self {
        Self::new(target_id, BuildStatus::Failed(error), Vec::new(), duration)
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Atlas name for atlas targets, `None` for the descriptor.
    pub fn atlas_name(&self) -> Option<&str> {
        self.target_id.strip_prefix(ATLAS_PREFIX)
    }
}

/// Outcome of a complete build run, in execution order.
#[derive(Debug, Default)]
pub struct BuildSummary {
    pub targets: Vec<TargetResult>,
    pub total_duration: Duration,
}

impl BuildSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_result(&mut self, result: TargetResult) {
        self.targets.push(result);
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.total_duration = duration;
        self
    }

    pub fn target(&self, target_id: &str) -> Option<&TargetResult> {
        self.targets.iter().find(|r| r.target_id == target_id)
    }

    /// Atlas targets only, without the descriptor.
    pub fn atlases(&self) -> impl Iterator<Item = &TargetResult> {
        self.targets.iter().filter(|r| r.atlas_name().is_some())
    }

    pub fn success_count(&self) -> usize {
        self.targets.iter().filter(|r| r.status == BuildStatus::Success).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.targets.iter().filter(|r| r.status == BuildStatus::Skipped).count()
    }

    pub fn failed_count(&self) -> usize {
        self.failures().len()
    }

    /// `true` when no target failed; warnings do not count.
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    pub fn all_outputs(&self) -> Vec<&PathBuf> {
        self.targets.iter().flat_map(|r| r.outputs.iter()).collect()
    }

    pub fn all_warnings(&self) -> Vec<&String> {
        self.targets.iter().flat_map(|r| r.warnings.iter()).collect()
    }

    pub fn failures(&self) -> Vec<&TargetResult> {
        self.targets.iter().filter(|r| r.status.is_failure()).collect()
    }

    /// Human-readable report: one headline, the failed targets, then the
    /// warnings grouped by target.
    pub fn summary(&self) -> String {
        let baked = self.atlases().filter(|r| r.status == BuildStatus::Success).count();
        let atlas_total = self.atlases().count();
        let mut lines = Vec::new();

        let failures = self.failures();
        if failures.is_empty() {
            lines.push(format!("Baked {} of {} atlas(es) in {:?}", baked, atlas_total, self.total_duration));
        } else {
            lines.push(format!(
                "Build failed: {} of {} target(s) failed, {} atlas(es) baked",
                failures.len(),
                self.targets.len(),
                baked
            ));
            for target in failures {
                lines.push(format!("  - {}: {}", target.target_id, target.status));
            }
        }

        let skipped = self.skipped_count();
        if skipped > 0 {
            lines.push(format!("{} atlas(es) skipped (dry run)", skipped));
        }

        for target in self.targets.iter().filter(|r| !r.warnings.is_empty()) {
            lines.push(format!("{}: {} warning(s)", target.target_id, target.warnings.len()));
            for warning in target.warnings.iter().take(WARNINGS_PER_TARGET) {
                lines.push(format!("  {}", warning));
            }
            if target.warnings.len() > WARNINGS_PER_TARGET {
                lines.push(format!("  ... and {} more", target.warnings.len() - WARNINGS_PER_TARGET));
            }
        }

        lines.join("\n")
    }
}
