//! Generation stage ledger.
//!
//! A run walks a fixed sequence of named stages; [`StageState`] records where
//! the run is, which stages finished, and the single terminal error if one
//! occurred. The state is an explicit value owned by the orchestrator, so the
//! same logic runs headlessly in tests. The ledger is passive about ordering:
//! stages are entered and completed in canonical order by contract on the
//! orchestrator, which the pipeline test suite asserts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// StageId
// ---------------------------------------------------------------------------

/// One named step of the generation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    Idle,
    Preparing,
    FetchingSource,
    ScanningFiles,
    ExtractingContent,
    CollectingContext,
    BuildingPrompt,
    CallingModel,
    ResponseReceived,
    ModelProcessing,
    ComposingReport,
    StructuringReport,
    ParsingResponse,
    SplittingPages,
    Rendering,
    Complete,
    Error,
}

/// The canonical stage order of a successful run.
pub const CANONICAL_STAGES: [StageId; 15] = [
    StageId::Preparing,
    StageId::FetchingSource,
    StageId::ScanningFiles,
    StageId::ExtractingContent,
    StageId::CollectingContext,
    StageId::BuildingPrompt,
    StageId::CallingModel,
    StageId::ResponseReceived,
    StageId::ModelProcessing,
    StageId::ComposingReport,
    StageId::StructuringReport,
    StageId::ParsingResponse,
    StageId::SplittingPages,
    StageId::Rendering,
    StageId::Complete,
];

/// Number of canonical stages; the denominator of the progress formula.
pub const TOTAL_STAGES: usize = CANONICAL_STAGES.len();

impl StageId {
    /// Short human-readable label, used in CLI output and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Ready",
            Self::Preparing => "Preparing",
            Self::FetchingSource => "Fetching Repository",
            Self::ScanningFiles => "Scanning Files",
            Self::ExtractingContent => "Extracting Content",
            Self::CollectingContext => "Collecting Context",
            Self::BuildingPrompt => "Building Prompt",
            Self::CallingModel => "Calling Model",
            Self::ResponseReceived => "Response Received",
            Self::ModelProcessing => "Analyzing Requirements",
            Self::ComposingReport => "Composing Report",
            Self::StructuringReport => "Structuring Report",
            Self::ParsingResponse => "Parsing Response",
            Self::SplittingPages => "Splitting Pages",
            Self::Rendering => "Rendering",
            Self::Complete => "Complete",
            Self::Error => "Error",
        }
    }
}

// ---------------------------------------------------------------------------
// RunStatus
// ---------------------------------------------------------------------------

/// Coarse status bucket derived from the current stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Idle,
    Processing,
    Complete,
    Error,
}

// ---------------------------------------------------------------------------
// StageError / StageState
// ---------------------------------------------------------------------------

/// The terminal error of a failed run, tagged with the stage it hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageError {
    /// The stage that was active when the failure was recorded.
    pub stage: StageId,
    /// Raw error text from the failing operation.
    pub error: String,
    /// When the error was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Mutable per-run stage ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageState {
    status: RunStatus,
    current_stage: StageId,
    completed_stages: Vec<StageId>,
    message: String,
    progress_percent: u8,
    stage_error: Option<StageError>,
}

impl StageState {
    /// Fresh ledger at the start of a run.
    pub fn new() -> Self {
        Self {
            status: RunStatus::Idle,
            current_stage: StageId::Idle,
            completed_stages: Vec::new(),
            message: String::new(),
            progress_percent: 0,
            stage_error: None,
        }
    }

    /// Move to `stage` and replace the status message.
    ///
    /// No-op once an error has been raised.
    pub fn enter_stage(&mut self, stage: StageId, message: impl Into<String>) {
        if self.is_error() {
            return;
        }
        self.current_stage = stage;
        self.message = message.into();
        self.status = match stage {
            StageId::Error => RunStatus::Error,
            StageId::Complete => RunStatus::Complete,
            _ => RunStatus::Processing,
        };
    }

    /// Record `stage` as finished (idempotent) and re-derive progress.
    ///
    /// No-op once an error has been raised.
    pub fn complete_stage(&mut self, stage: StageId) {
        if self.is_error() {
            return;
        }
        if !self.completed_stages.contains(&stage) {
            self.completed_stages.push(stage);
            self.progress_percent = derive_progress(self.completed_stages.len());
        }
    }

    /// Record the terminal error against `stage` and stop the run.
    ///
    /// The first error wins; later calls are no-ops.
    pub fn raise_error(&mut self, stage: StageId, error: impl Into<String>) {
        if self.is_error() {
            return;
        }
        let error = error.into();
        self.current_stage = StageId::Error;
        self.status = RunStatus::Error;
        self.message = error.clone();
        self.stage_error = Some(StageError {
            stage,
            error,
            timestamp: Utc::now(),
        });
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn current_stage(&self) -> StageId {
        self.current_stage
    }

    pub fn completed_stages(&self) -> &[StageId] {
        &self.completed_stages
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Derived as `round(100 * completed / 15)`, never assigned directly.
    pub fn progress_percent(&self) -> u8 {
        self.progress_percent
    }

    pub fn stage_error(&self) -> Option<&StageError> {
        self.stage_error.as_ref()
    }

    pub fn is_error(&self) -> bool {
        self.status == RunStatus::Error
    }

    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Complete
    }
}

impl Default for StageState {
    fn default() -> Self {
        Self::new()
    }
}

fn derive_progress(completed: usize) -> u8 {
    ((completed as f64 / TOTAL_STAGES as f64) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_idle() {
        let state = StageState::new();
        assert_eq!(state.status(), RunStatus::Idle);
        assert_eq!(state.current_stage(), StageId::Idle);
        assert_eq!(state.progress_percent(), 0);
        assert!(state.completed_stages().is_empty());
        assert!(state.stage_error().is_none());
    }

    #[test]
    fn progress_derives_from_completed_count() {
        let mut state = StageState::new();
        state.complete_stage(StageId::Preparing);
        assert_eq!(state.progress_percent(), 7); // round(100 * 1/15)

        for stage in &CANONICAL_STAGES[1..8] {
            state.complete_stage(*stage);
        }
        assert_eq!(state.progress_percent(), 53); // round(100 * 8/15)

        for stage in &CANONICAL_STAGES[8..] {
            state.complete_stage(*stage);
        }
        assert_eq!(state.progress_percent(), 100);
    }

    #[test]
    fn completing_a_stage_twice_is_idempotent() {
        let mut state = StageState::new();
        state.complete_stage(StageId::Preparing);
        state.complete_stage(StageId::Preparing);
        assert_eq!(state.completed_stages(), &[StageId::Preparing]);
        assert_eq!(state.progress_percent(), 7);
    }

    #[test]
    fn status_buckets_follow_the_entered_stage() {
        let mut state = StageState::new();

        state.enter_stage(StageId::CallingModel, "calling");
        assert_eq!(state.status(), RunStatus::Processing);

        state.enter_stage(StageId::Complete, "done");
        assert_eq!(state.status(), RunStatus::Complete);
    }

    #[test]
    fn error_is_terminal_and_absorbing() {
        let mut state = StageState::new();
        state.enter_stage(StageId::FetchingSource, "fetching");
        state.raise_error(StageId::FetchingSource, "resource not found");

        assert!(state.is_error());
        assert_eq!(state.current_stage(), StageId::Error);
        let err = state.stage_error().expect("stage error recorded");
        assert_eq!(err.stage, StageId::FetchingSource);
        assert_eq!(err.error, "resource not found");

        // Later mutations are no-ops.
        state.enter_stage(StageId::CallingModel, "should not apply");
        state.complete_stage(StageId::CallingModel);
        state.raise_error(StageId::CallingModel, "second error");

        assert_eq!(state.current_stage(), StageId::Error);
        assert!(state.completed_stages().is_empty());
        assert_eq!(
            state.stage_error().unwrap().stage,
            StageId::FetchingSource
        );
    }

    #[test]
    fn canonical_order_has_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        for stage in CANONICAL_STAGES {
            assert!(seen.insert(stage), "duplicate stage {stage:?}");
        }
        assert_eq!(CANONICAL_STAGES[0], StageId::Preparing);
        assert_eq!(CANONICAL_STAGES[TOTAL_STAGES - 1], StageId::Complete);
    }
}
