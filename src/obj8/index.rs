//! `IDX` / `IDX10` index records and `TRIS` draw calls.
//!
//! Index values are absolute offsets into the file-wide vertex table, and
//! `TRIS` offsets are absolute offsets into the file-wide index table. Both
//! have to move when tables are concatenated or a block is swapped out.

use std::fmt;

use super::{is_index_tag, TAG_TRIS};
use crate::util::text::{indentation, parse_count};
use crate::util::{Error, Result};

/// A single `IDX` or `IDX10` line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexRecord {
    pub tag: String,
    pub indices: Vec<usize>,
}

impl IndexRecord {
    /// Parse an index line; `line_no` is 1-based.
    pub fn parse(line: &str, line_no: usize) -> Result<Self> {
        let mut tokens = line.split_whitespace();
        let tag = match tokens.next() {
            Some(tag) if is_index_tag(tag) => tag.to_string(),
            _ => return Err(Error::parse(line_no, "not an IDX line")),
        };
        let indices = tokens
            .map(|tok| parse_count(tok, line_no, &tag))
            .collect::<Result<Vec<_>>>()?;
        if indices.is_empty() {
            return Err(Error::parse(line_no, format!("{tag} has no index values")));
        }
        Ok(Self { tag, indices })
    }

    /// Number of index values on the line.
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Largest vertex offset referenced.
    pub fn max_index(&self) -> Option<usize> {
        self.indices.iter().copied().max()
    }

    /// Shift every vertex offset by `base`, leaving the tag alone.
    pub fn rebased(&self, base: usize) -> Self {
        Self {
            tag: self.tag.clone(),
            indices: self.indices.iter().map(|&i| i + base).collect(),
        }
    }

    /// Move offsets at or past `threshold` by `delta`; `None` if nothing moved.
    ///
    /// Used when a block of vertices before `threshold` grows or shrinks.
    pub fn shifted_from(&self, threshold: usize, delta: isize) -> Option<Self> {
        if delta == 0 || self.indices.iter().all(|&i| i < threshold) {
            return None;
        }
        let indices = self
            .indices
            .iter()
            .map(|&i| if i >= threshold { shift(i, delta) } else { i })
            .collect();
        Some(Self { tag: self.tag.clone(), indices })
    }
}

impl fmt::Display for IndexRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)?;
        for i in &self.indices {
            write!(f, " {i}")?;
        }
        Ok(())
    }
}

/// A `TRIS offset count` draw call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrisCall {
    pub offset: usize,
    pub count: usize,
}

impl TrisCall {
    pub fn parse(line: &str, line_no: usize) -> Result<Self> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.first() != Some(&TAG_TRIS) {
            return Err(Error::parse(line_no, "not a TRIS line"));
        }
        // allow a trailing comment after the two values
        let values: Vec<&str> = parts[1..].iter().copied().take_while(|t| !t.starts_with('#')).collect();
        if values.len() != 2 {
            return Err(Error::parse(
                line_no,
                format!("TRIS needs 2 values, found {}", values.len()),
            ));
        }
        Ok(Self {
            offset: parse_count(values[0], line_no, "TRIS offset")?,
            count: parse_count(values[1], line_no, "TRIS count")?,
        })
    }

    /// Re-emit `line` with a new offset, keeping its indentation.
    pub fn render(&self, line: &str) -> String {
        format!("{}{} {} {}", indentation(line), TAG_TRIS, self.offset, self.count)
    }
}

/// Add `base` to the offset of a `TRIS` line.
pub fn rebase_tris(line: &str, base: usize, line_no: usize) -> Result<String> {
    let mut call = TrisCall::parse(line, line_no)?;
    call.offset = call
        .offset
        .checked_add(base)
        .ok_or_else(|| Error::parse(line_no, format!("TRIS offset {} + {base} overflows", call.offset)))?;
    Ok(call.render(line))
}

/// Move a `TRIS` offset at or past `threshold` by `delta`; `None` if unchanged.
pub fn shift_tris(line: &str, threshold: usize, delta: isize, line_no: usize) -> Result<Option<String>> {
    let mut call = TrisCall::parse(line, line_no)?;
    if delta == 0 || call.offset < threshold {
        return Ok(None);
    }
    call.offset = shift(call.offset, delta);
    Ok(Some(call.render(line)))
}

#[inline]
fn shift(value: usize, delta: isize) -> usize {
    // callers only shift values past a removed block, so this never underflows
    value.saturating_add_signed(delta)
}
