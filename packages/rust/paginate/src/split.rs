//! Deterministic pagination of a single large markdown text.
//!
//! The splitter prefers heading boundaries (levels 1-3) and greedily packs
//! heading-delimited segments into pages of an adaptive character budget.
//! Inputs too short or too heading-sparse for that to reach the page floor
//! fall back to a paragraph-based split.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Fixed floor on the page count, regardless of the caller's request.
pub const MIN_PAGES: usize = 5;

/// Readable bounds on the adaptive per-page character budget.
const MIN_CHARS_PER_PAGE: usize = 1600;
const MAX_CHARS_PER_PAGE: usize = 2400;

/// Per-page floor used by the paragraph fallback.
const FALLBACK_MIN_CHARS: usize = 1200;

/// A line opening a level 1-3 heading starts a new segment.
static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#{1,3}\s").unwrap());

/// Blank-line run separating paragraphs.
static PARAGRAPH_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\n+").unwrap());

/// Split `text` into an ordered page sequence.
///
/// The result has at most `max(requested_max_pages, MIN_PAGES)` pages. The
/// final page absorbs everything left once the ceiling is one page away, so
/// its size is unbounded. Empty input yields a single empty page; callers
/// always receive at least one page.
pub fn paginate(text: &str, requested_max_pages: usize) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }

    let effective_max = requested_max_pages.max(MIN_PAGES);
    let target = text
        .len()
        .div_ceil(effective_max)
        .clamp(MIN_CHARS_PER_PAGE, MAX_CHARS_PER_PAGE);

    let segments = heading_segments(text);
    let mut pages: Vec<String> = Vec::new();
    let mut current = String::new();

    for (i, segment) in segments.iter().enumerate() {
        if !current.is_empty()
            && current.len() + segment.len() > target
            && pages.len() < effective_max
        {
            pages.push(current.trim().to_string());
            current.clear();
        }
        current.push_str(segment);

        // Hard ceiling: once effective_max - 1 pages are closed, everything
        // still unplaced lands on the final page.
        if pages.len() == effective_max - 1 {
            for rest in &segments[i + 1..] {
                current.push_str(rest);
            }
            break;
        }
    }

    if !current.trim().is_empty() {
        pages.push(current.trim().to_string());
    }

    if pages.len() < MIN_PAGES {
        debug!(
            pages = pages.len(),
            "heading split below page floor, falling back to paragraph split"
        );
        return paragraph_fallback(text, effective_max);
    }

    pages
}

/// Slice `text` at every heading-line start, preserving every byte.
fn heading_segments(text: &str) -> Vec<&str> {
    let mut starts: Vec<usize> = HEADING_RE.find_iter(text).map(|m| m.start()).collect();
    if starts.first().copied() != Some(0) {
        starts.insert(0, 0);
    }
    starts.push(text.len());

    starts
        .windows(2)
        .map(|w| &text[w[0]..w[1]])
        .filter(|s| !s.is_empty())
        .collect()
}

/// Accumulate paragraphs into pages of at least `FALLBACK_MIN_CHARS`.
fn paragraph_fallback(text: &str, effective_max: usize) -> Vec<String> {
    let target = FALLBACK_MIN_CHARS.max(text.len() / MIN_PAGES);

    let mut chunks: Vec<String> = Vec::new();
    let mut buffer = String::new();

    for paragraph in PARAGRAPH_BREAK_RE.split(text) {
        if !buffer.is_empty() && buffer.len() + 2 + paragraph.len() > target {
            chunks.push(buffer.trim().to_string());
            buffer = paragraph.to_string();
        } else if buffer.is_empty() {
            buffer = paragraph.to_string();
        } else {
            buffer.push_str("\n\n");
            buffer.push_str(paragraph);
        }
    }

    if !buffer.trim().is_empty() {
        chunks.push(buffer.trim().to_string());
    }

    chunks.truncate(effective_max);

    if chunks.is_empty() {
        // Whitespace-only input: still hand back one page.
        chunks.push(String::new());
    }

    chunks
}
