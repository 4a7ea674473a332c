//! X-Plane OBJ8 text format: the subset kitbash reads and rewrites.
//!
//! An OBJ8 file is line oriented. kitbash only cares about four kinds of
//! line, recognised by their first token:
//!
//! - `POINT_COUNTS` - header declaring table sizes
//! - `VT` - one vertex of the shared vertex table
//! - `IDX` / `IDX10` - offsets into the vertex table
//! - `TRIS` - a draw call referencing a range of the index table
//!
//! Everything else (texture commands, `ANIM_*`, `ATTR_*`, comments) is
//! carried through untouched.

mod index;
mod vertex;

pub use index::*;
pub use vertex::*;

use std::fmt;

use crate::util::text::{first_token, parse_count};
use crate::util::Result;

/// Header tag carrying the table sizes.
pub const TAG_POINT_COUNTS: &str = "POINT_COUNTS";
/// Vertex record tag.
pub const TAG_VERTEX: &str = "VT";
/// Prefix shared by `IDX` and `IDX10`.
pub const TAG_INDEX: &str = "IDX";
/// Draw call referencing the index table.
pub const TAG_TRIS: &str = "TRIS";

/// Structural role of a single line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    PointCounts,
    Vertex,
    Index,
    Tris,
    Other,
}

impl LineKind {
    /// Classify a line by its first token.
    ///
    /// Lines that merely contain a tag somewhere (comments, names) are `Other`.
    pub fn of(line: &str) -> Self {
        match first_token(line) {
            Some(TAG_POINT_COUNTS) => Self::PointCounts,
            Some(TAG_VERTEX) => Self::Vertex,
            Some(TAG_TRIS) => Self::Tris,
            Some(tok) if is_index_tag(tok) => Self::Index,
            _ => Self::Other,
        }
    }
}

/// `IDX` or `IDX10`.
#[inline]
pub fn is_index_tag(token: &str) -> bool {
    matches!(token.strip_prefix(TAG_INDEX), Some("" | "10"))
}

/// The `POINT_COUNTS` header.
///
/// Only `vertices` and `indices` are touched by a merge; the line and light
/// counts are carried through as-is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointCounts {
    pub vertices: usize,
    pub lines: usize,
    pub lights: usize,
    pub indices: usize,
}

impl PointCounts {
    pub fn new(vertices: usize, lines: usize, lights: usize, indices: usize) -> Self {
        Self { vertices, lines, lights, indices }
    }

    /// Parse a `POINT_COUNTS v l li i` line; `line_no` is 1-based.
    pub fn parse(line: &str, line_no: usize) -> Result<Self> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.first() != Some(&TAG_POINT_COUNTS) {
            return Err(crate::Error::parse(line_no, "not a POINT_COUNTS line"));
        }
        if parts.len() != 5 {
            return Err(crate::Error::parse(
                line_no,
                format!("POINT_COUNTS needs 4 values, found {}", parts.len() - 1),
            ));
        }
        Ok(Self {
            vertices: parse_count(parts[1], line_no, "vertex count")?,
            lines: parse_count(parts[2], line_no, "line count")?,
            lights: parse_count(parts[3], line_no, "light count")?,
            indices: parse_count(parts[4], line_no, "index count")?,
        })
    }

    /// Same header with `vertices` and `indices` replaced.
    pub fn with_totals(self, vertices: usize, indices: usize) -> Self {
        Self { vertices, indices, ..self }
    }
}

impl fmt::Display for PointCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            TAG_POINT_COUNTS, self.vertices, self.lines, self.lights, self.indices
        )
    }
}
