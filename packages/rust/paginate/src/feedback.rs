//! Heuristic mapping from free-text feedback to the page it targets.
//!
//! Feedback like "fix the typo in the methodology section" carries no page
//! pointer; instead we extract its salient keywords and pick the page with
//! the most keyword hits. There is always a target: when nothing matches,
//! the first page wins.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Keywords are lowercase alphabetic runs of at least four characters.
static KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[a-z]{4,}\b").unwrap());

/// Maximum keywords considered per feedback submission.
const MAX_KEYWORDS: usize = 5;

/// The page a feedback submission resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackTarget {
    /// 0-based index into the page sequence.
    pub page_index: usize,
    /// The targeted page's full text.
    pub section: String,
    /// Keywords extracted from the feedback, in match order.
    pub keywords: Vec<String>,
}

/// Infer which single page `feedback` is most relevant to.
///
/// Ties resolve to the earliest page index; a feedback with no matching
/// keywords targets page 0.
pub fn locate_feedback_target(feedback: &str, pages: &[String]) -> FeedbackTarget {
    let lowered = feedback.to_lowercase();
    let keywords: Vec<String> = KEYWORD_RE
        .find_iter(&lowered)
        .take(MAX_KEYWORDS)
        .map(|m| m.as_str().to_string())
        .collect();

    let mut target_index = 0;
    let mut max_matches = 0;

    for (idx, page) in pages.iter().enumerate() {
        let page_text = page.to_lowercase();
        let matches = keywords
            .iter()
            .filter(|k| page_text.contains(k.as_str()))
            .count();
        // Strictly greater: the earliest page keeps ties.
        if matches > max_matches {
            max_matches = matches;
            target_index = idx;
        }
    }

    debug!(
        page_index = target_index,
        matches = max_matches,
        keywords = ?keywords,
        "feedback target located"
    );

    FeedbackTarget {
        page_index: target_index,
        section: pages.get(target_index).cloned().unwrap_or_default(),
        keywords,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn targets_the_page_containing_the_keyword() {
        let pages = pages(&[
            "# Introduction\nThis report begins here.",
            "# Methodology\nData was gathered from the repository.",
            "# Conclusion\nFinal remarks.",
        ]);

        let target = locate_feedback_target("fix the introduction typo", &pages);
        assert_eq!(target.page_index, 0);
        assert!(target.section.contains("Introduction"));
    }

    #[test]
    fn most_matches_wins() {
        let pages = pages(&[
            "general overview text",
            "methodology details about gathering data from sources",
        ]);

        let target =
            locate_feedback_target("expand the methodology for gathering data", &pages);
        assert_eq!(target.page_index, 1);
    }

    #[test]
    fn ties_resolve_to_earliest_page() {
        let pages = pages(&[
            "the findings chapter",
            "the findings appendix",
        ]);

        let target = locate_feedback_target("rewrite the findings", &pages);
        assert_eq!(target.page_index, 0);
    }

    #[test]
    fn no_match_defaults_to_first_page() {
        let pages = pages(&["alpha", "beta", "gamma"]);

        let target = locate_feedback_target("zzzz qqqq xxxx", &pages);
        assert_eq!(target.page_index, 0);
        assert_eq!(target.section, "alpha");
    }

    #[test]
    fn short_words_are_not_keywords() {
        let target = locate_feedback_target("fix a an the or to it", &[]);
        assert!(target.keywords.is_empty());
        assert_eq!(target.page_index, 0);
        assert_eq!(target.section, "");
    }

    #[test]
    fn keywords_are_capped_at_five_in_match_order() {
        let target = locate_feedback_target(
            "alpha bravo charlie delta echo foxtrot golf",
            &[],
        );
        assert_eq!(
            target.keywords,
            vec!["alpha", "bravo", "charlie", "delta", "echo"]
        );
    }
}
