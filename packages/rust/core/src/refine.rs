//! Targeted re-generation of a single page from free-text feedback.
//!
//! The feedback carries no page pointer; the targeter picks the most
//! relevant page and only that section goes back to the generation service,
//! grounded by a short excerpt of the full document.

use std::time::Duration;

use tracing::{info, instrument};

use reportforge_generator::{GenerationClient, RevisionRequest};
use reportforge_paginate::{FeedbackTarget, locate_feedback_target};
use reportforge_shared::{ReportForgeError, Result};

use crate::pipeline::with_timeout;

/// Outcome of a targeted page revision.
#[derive(Debug, Clone)]
pub struct RefinedPage {
    /// Which page was matched and the keywords that matched it.
    pub target: FeedbackTarget,
    /// The revised section text returned by the service.
    pub revised: String,
}

/// Revise the single page most relevant to `feedback`.
///
/// The caller splices `revised` back into its page sequence at
/// `target.page_index`.
#[instrument(skip_all, fields(pages = pages.len()))]
pub async fn refine_page(
    pages: &[String],
    feedback: &str,
    generator: &GenerationClient,
    call_timeout: Duration,
) -> Result<RefinedPage> {
    if pages.is_empty() {
        return Err(ReportForgeError::validation("no pages to refine"));
    }

    let target = locate_feedback_target(feedback, pages);
    info!(
        page_index = target.page_index,
        keywords = ?target.keywords,
        "feedback target located"
    );

    let request = RevisionRequest {
        section: target.section.clone(),
        feedback: feedback.to_string(),
        context: pages.join("\n\n"),
    };

    let revised = with_timeout(call_timeout, generator.revise_section(&request)).await?;

    if revised.trim().is_empty() {
        return Err(ReportForgeError::validation(
            "revision returned an empty section",
        ));
    }

    Ok(RefinedPage { target, revised })
}
