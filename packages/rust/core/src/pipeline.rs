//! End-to-end generation pipeline: locator → collect → generate → paginate.
//!
//! The orchestrator walks the canonical stage sequence in order, advancing
//! the [`StageState`] ledger at every step. Only two stages perform external
//! I/O (`FetchingSource` and `CallingModel`); both are raced against the
//! configured per-call timeout. The first failure is recorded against the
//! stage that was active and halts the run; no stage is retried here (retry
//! lives inside the fetcher's own bounded loop).

use std::future::Future;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use reportforge_fetch::{Collector, RepoLocator};
use reportforge_generator::{GenerationClient, ReportPrompt, files_summary};
use reportforge_paginate::{MIN_PAGES, paginate};
use reportforge_shared::{ReportForgeError, Result, RunId};

use crate::stage::{StageId, StageState};

// ---------------------------------------------------------------------------
// Config & result types
// ---------------------------------------------------------------------------

/// Configuration for one generation run.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Repository locator (`owner/repo` or a github.com URL).
    pub locator: String,
    /// Requested page ceiling; the floor of five still applies.
    pub max_pages: usize,
    /// Optional report template text.
    pub template: Option<String>,
    /// Optional free-form extra instructions.
    pub extra_instructions: Option<String>,
    /// Timeout applied to each external call.
    pub call_timeout: Duration,
}

/// Success artifact of a run.
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    /// Run identifier.
    pub run_id: RunId,
    /// Ordered page sequence (1-indexed for display).
    pub pages: Vec<String>,
    /// The raw report text before splitting.
    pub report: String,
    /// Number of source files that fed the prompt.
    pub source_files: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Result of a run: the terminal stage ledger plus the artifact when the run
/// reached `Complete`.
#[derive(Debug)]
pub struct GenerateOutcome {
    /// Terminal stage state (`Complete` or `Error`).
    pub state: StageState,
    /// The generated report; `None` iff the run errored.
    pub report: Option<GeneratedReport>,
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Callback invoked after every stage transition.
pub trait ProgressReporter: Send + Sync {
    /// Called with the updated ledger after enter/complete/error.
    fn stage_changed(&self, state: &StageState);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn stage_changed(&self, _state: &StageState) {}
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the full generation pipeline.
///
/// Always returns an outcome; failures are reported through the stage ledger
/// rather than an `Err`, so callers can render "X failed: Y" from
/// [`StageState::stage_error`].
#[instrument(skip_all, fields(locator = %config.locator))]
pub async fn generate_report(
    config: &GenerateConfig,
    collector: &Collector,
    generator: &GenerationClient,
    progress: &dyn ProgressReporter,
) -> GenerateOutcome {
    let mut state = StageState::new();

    match run_stages(config, collector, generator, progress, &mut state).await {
        Ok(report) => {
            info!(
                run_id = %report.run_id,
                pages = report.pages.len(),
                source_files = report.source_files,
                elapsed_ms = report.elapsed.as_millis(),
                "generation complete"
            );
            GenerateOutcome {
                state,
                report: Some(report),
            }
        }
        Err(e) => {
            let stage = state.current_stage();
            warn!(stage = stage.label(), error = %e, "generation failed");
            state.raise_error(stage, e.to_string());
            progress.stage_changed(&state);
            GenerateOutcome {
                state,
                report: None,
            }
        }
    }
}

/// Drive the canonical stages in order; the caller turns an `Err` into a
/// `raise_error` against the stage that was active.
async fn run_stages(
    config: &GenerateConfig,
    collector: &Collector,
    generator: &GenerationClient,
    progress: &dyn ProgressReporter,
    state: &mut StageState,
) -> Result<GeneratedReport> {
    let start = Instant::now();
    let run_id = RunId::new();

    enter(state, progress, StageId::Preparing, "Initializing generation run");
    let locator = RepoLocator::parse(&config.locator)?;
    complete(state, progress, StageId::Preparing);

    enter(
        state,
        progress,
        StageId::FetchingSource,
        format!("Downloading document set for {locator}"),
    );
    let files = with_timeout(config.call_timeout, collector.collect(&locator)).await?;
    complete(state, progress, StageId::FetchingSource);

    enter(
        state,
        progress,
        StageId::ScanningFiles,
        format!("Collected {} markdown files", files.len()),
    );
    complete(state, progress, StageId::ScanningFiles);

    enter(
        state,
        progress,
        StageId::ExtractingContent,
        "Summarizing collected files",
    );
    let summary = files_summary(&files);
    complete(state, progress, StageId::ExtractingContent);

    enter(
        state,
        progress,
        StageId::CollectingContext,
        "Assembling run context",
    );
    complete(state, progress, StageId::CollectingContext);

    enter(
        state,
        progress,
        StageId::BuildingPrompt,
        "Building the generation prompt",
    );
    let prompt = ReportPrompt {
        locator: locator.to_string(),
        max_pages: config.max_pages.max(MIN_PAGES),
        has_template: config.template.is_some(),
        extra_instructions: config.extra_instructions.clone(),
        files_summary: summary,
    };
    complete(state, progress, StageId::BuildingPrompt);

    enter(
        state,
        progress,
        StageId::CallingModel,
        "Sending request to the generation service",
    );
    let report_text =
        with_timeout(config.call_timeout, generator.generate_report(&prompt)).await?;
    complete(state, progress, StageId::CallingModel);

    enter(
        state,
        progress,
        StageId::ResponseReceived,
        "Generation request acknowledged",
    );
    complete(state, progress, StageId::ResponseReceived);

    enter(
        state,
        progress,
        StageId::ModelProcessing,
        "Interpreting the model response",
    );
    complete(state, progress, StageId::ModelProcessing);

    enter(
        state,
        progress,
        StageId::ComposingReport,
        "Composing the project report",
    );
    complete(state, progress, StageId::ComposingReport);

    enter(
        state,
        progress,
        StageId::StructuringReport,
        "Organizing the report into sections",
    );
    complete(state, progress, StageId::StructuringReport);

    enter(
        state,
        progress,
        StageId::ParsingResponse,
        "Validating the generation response",
    );
    if report_text.trim().is_empty() {
        return Err(ReportForgeError::validation(
            "generation service returned an empty report",
        ));
    }
    complete(state, progress, StageId::ParsingResponse);

    enter(
        state,
        progress,
        StageId::SplittingPages,
        "Dividing the report into pages",
    );
    let pages = paginate(&report_text, config.max_pages);
    if pages.is_empty() {
        return Err(ReportForgeError::validation(
            "pagination produced no pages",
        ));
    }
    complete(state, progress, StageId::SplittingPages);

    enter(
        state,
        progress,
        StageId::Rendering,
        "Preparing pages for display",
    );
    let report = GeneratedReport {
        run_id,
        pages,
        report: report_text,
        source_files: files.len(),
        elapsed: start.elapsed(),
    };
    complete(state, progress, StageId::Rendering);

    enter(
        state,
        progress,
        StageId::Complete,
        "Report generated successfully",
    );
    complete(state, progress, StageId::Complete);

    Ok(report)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn enter(
    state: &mut StageState,
    progress: &dyn ProgressReporter,
    stage: StageId,
    message: impl Into<String>,
) {
    state.enter_stage(stage, message);
    progress.stage_changed(state);
}

fn complete(state: &mut StageState, progress: &dyn ProgressReporter, stage: StageId) {
    state.complete_stage(stage);
    progress.stage_changed(state);
}

/// Race a future against `limit`.
///
/// The losing future is dropped, which aborts its in-flight request; the
/// resulting error is indistinguishable from any other stage failure.
pub(crate) async fn with_timeout<T>(
    limit: Duration,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(ReportForgeError::Network(format!(
            "timeout after {}s",
            limit.as_secs()
        ))),
    }
}
