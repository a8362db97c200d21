//! Page splitting and feedback targeting for generated reports.
//!
//! This crate is pure text manipulation with no I/O:
//! - [`paginate`] partitions one large markdown string into a bounded,
//!   ordered page sequence, preferring heading boundaries.
//! - [`locate_feedback_target`] maps free-text feedback onto the single page
//!   it most plausibly refers to.

pub mod feedback;
pub mod split;

pub use feedback::{FeedbackTarget, locate_feedback_target};
pub use split::{MIN_PAGES, paginate};
