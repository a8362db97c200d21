//! Generation pipeline orchestration for ReportForge.
//!
//! Sequences collection → generation → pagination over the canonical stage
//! ledger, and hosts the feedback-driven single-page refinement flow.

pub mod pipeline;
pub mod refine;
pub mod stage;

pub use pipeline::{
    GenerateConfig, GenerateOutcome, GeneratedReport, ProgressReporter, SilentProgress,
    generate_report,
};
pub use refine::{RefinedPage, refine_page};
pub use stage::{CANONICAL_STAGES, RunStatus, StageError, StageId, StageState, TOTAL_STAGES};
