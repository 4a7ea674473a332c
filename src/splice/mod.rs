//! Two-pass splice of a fragment into a target object.
//!
//! [`TargetLayout::analyze`] reads the target once and records where the
//! header, the vertex and index regions, and any earlier merge of the same
//! object sit. [`rewrite`] reads it a second time and emits the merged
//! lines using those positions.

mod analysis;
pub mod markers;
mod rewrite;

pub use analysis::{BlockSpan, PriorMerge, TargetLayout};
pub use markers::{Section, DEFAULT_TRAILER};
pub use rewrite::{rewrite, splice_lines, SpliceReport, Spliced};
