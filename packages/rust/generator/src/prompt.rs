//! Prompt assembly for report generation and section revision.

use reportforge_shared::RemoteFile;

/// System instruction for the full-report call.
pub const REPORT_SYSTEM_PROMPT: &str = "You are a professional report writer. \
Produce a formal, objective report in third person with clear headings and \
consistent formatting. The report must be detailed enough to fill at least \
five A4 pages when rendered.";

/// System instruction for the targeted-revision call.
pub const REVISION_SYSTEM_PROMPT: &str = "You are a document editor. Modify \
the provided section based on user feedback. Return ONLY the modified \
section in markdown format, nothing else.";

/// Characters of full-document context included in a revision prompt.
const CONTEXT_EXCERPT_CHARS: usize = 500;

// ---------------------------------------------------------------------------
// Report prompt
// ---------------------------------------------------------------------------

/// Inputs assembled into the full-report user prompt.
#[derive(Debug, Clone)]
pub struct ReportPrompt {
    /// Repository locator as given by the user.
    pub locator: String,
    /// Effective page ceiling requested from the model.
    pub max_pages: usize,
    /// Whether a report template was supplied.
    pub has_template: bool,
    /// Free-form extra instructions, if any.
    pub extra_instructions: Option<String>,
    /// One-line summary of the collected files.
    pub files_summary: String,
}

impl ReportPrompt {
    /// Render the user message for the chat-completion call.
    pub fn user_message(&self) -> String {
        format!(
            "Generate a comprehensive project report with these details:\n\
             - Repository: {locator}\n\
             - Max Pages Requested: {max_pages}\n\
             - Template: {template}\n\
             - Additional Instructions: {extra}\n\
             - Available Markdown Files: {files}\n\
             \n\
             MANDATORY REPORT STRUCTURE (use these headings, in this order):\n\
             1. Title Page (Title, author name, date, purpose)\n\
             2. Executive Summary/Abstract (100-200 words)\n\
             3. Table of Contents\n\
             4. Introduction (background, purpose, scope)\n\
             5. Methodology (how data was gathered)\n\
             6. Findings/Results (detailed)\n\
             7. Discussion/Analysis (interpretation)\n\
             8. Conclusion (summary)\n\
             9. Recommendations (actions)\n\
             10. References/Bibliography\n\
             11. Appendices (supporting material)\n\
             \n\
             REQUIREMENTS:\n\
             - Minimum length: at least 2,000-2,500 words total (approx. 5 A4 pages).\n\
             - Each section must include 2-3 substantial paragraphs.\n\
             - Use formal, objective tone and third person.\n\
             - Use consistent headings/subheadings.\n\
             - Mention visuals (tables/charts) where relevant.\n\
             - Format as a single markdown document suitable for A4 printing.",
            locator = self.locator,
            max_pages = self.max_pages,
            template = if self.has_template { "Yes" } else { "No" },
            extra = self.extra_instructions.as_deref().unwrap_or("None"),
            files = self.files_summary,
        )
    }
}

/// One-line summary of the collected files for the report prompt.
pub fn files_summary(files: &[RemoteFile]) -> String {
    if files.is_empty() {
        return "No markdown files provided".into();
    }
    let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
    format!(
        "Found {} markdown files: {}",
        files.len(),
        paths.join(", ")
    )
}

// ---------------------------------------------------------------------------
// Revision prompt
// ---------------------------------------------------------------------------

/// Inputs assembled into the targeted-revision user prompt.
#[derive(Debug, Clone)]
pub struct RevisionRequest {
    /// The page being revised, verbatim.
    pub section: String,
    /// The user's free-text feedback.
    pub feedback: String,
    /// Full document text; only a leading excerpt reaches the prompt.
    pub context: String,
}

impl RevisionRequest {
    /// Render the user message for the revision call.
    pub fn user_message(&self) -> String {
        format!(
            "ORIGINAL SECTION:\n{section}\n\n\
             USER FEEDBACK:\n{feedback}\n\n\
             CONTEXT (for reference):\n{context}...\n\n\
             Please modify the section to address the user's feedback. Keep \
             the same markdown format and structure. Return ONLY the updated \
             section.",
            section = self.section,
            feedback = self.feedback,
            context = excerpt(&self.context, CONTEXT_EXCERPT_CHARS),
        )
    }
}

/// First `max_chars` characters of `s`, never splitting a char.
fn excerpt(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
