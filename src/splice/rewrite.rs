//! Pass 2: stream the target again and emit the merged line sequence.
//!
//! All insertion points come from the [`TargetLayout`] as input line
//! numbers, so no counter has to be adjusted as lines are inserted.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info, instrument};

use super::analysis::{PriorMerge, TargetLayout};
use super::markers::{block_marker, is_trailer, summary_marker, Edge, Section};
use crate::fragment::Fragment;
use crate::obj8::{rebase_tris, shift_tris, IndexRecord, LineKind, PointCounts};
use crate::util::{Error, Result};

/// Where things went, for the caller's summary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpliceReport {
    /// Header before the merge.
    pub original: PointCounts,
    /// Header written by the merge.
    pub merged: PointCounts,
    /// Vertices and index values added by the fragment.
    pub added_vertices: usize,
    pub added_indices: usize,
    /// Output line of each block's start marker.
    pub vertex_block_line: usize,
    pub index_block_line: usize,
    pub anim_block_line: usize,
    /// True when an earlier merge of the same object was replaced.
    pub replaced: bool,
}

/// Merged file content plus its report.
#[derive(Clone, Debug)]
pub struct Spliced {
    pub lines: Vec<String>,
    pub report: SpliceReport,
}

/// Everything pass 2 needs, derived from the layout before reading a line.
#[derive(Clone, Debug)]
struct Plan<'a> {
    header_line: usize,
    header: PointCounts,
    /// Old summary line, rewritten in place.
    summary_line: Option<usize>,
    /// Added to fragment index values.
    vertex_base: usize,
    /// Added to fragment `TRIS` offsets.
    index_base: usize,
    vertex_anchor: usize,
    index_anchor: usize,
    /// `None` appends the footer at end of input.
    anim_anchor: Option<usize>,
    /// Line after the old ANIM block; dropped when it is an old trailer.
    after_anim: Option<usize>,
    prior: Option<&'a PriorMerge>,
    /// Target index values at or past `.0` move by `.1`.
    vertex_shift: (usize, isize),
    /// Target `TRIS` offsets at or past `.0` move by `.1`.
    index_shift: (usize, isize),
}

impl<'a> Plan<'a> {
    fn new(layout: &'a TargetLayout, fragment: &Fragment) -> Self {
        let added_v = fragment.vertex_count();
        let added_i = fragment.index_count();
        let orig = layout.header;

        match &layout.prior {
            None => {
                let vertex_anchor = layout.last_vertex_line.unwrap_or(layout.header_line);
                Self {
                    header_line: layout.header_line,
                    header: orig.with_totals(orig.vertices + added_v, orig.indices + added_i),
                    summary_line: None,
                    vertex_base: orig.vertices,
                    index_base: orig.indices,
                    vertex_anchor,
                    index_anchor: layout.last_index_line.unwrap_or(vertex_anchor),
                    anim_anchor: None,
                    after_anim: None,
                    prior: None,
                    vertex_shift: (usize::MAX, 0),
                    index_shift: (usize::MAX, 0),
                }
            }
            Some(prior) => Self {
                header_line: layout.header_line,
                header: orig.with_totals(
                    orig.vertices - prior.vertex_count + added_v,
                    orig.indices - prior.index_count + added_i,
                ),
                summary_line: prior.summary_line,
                vertex_base: prior.vertex_base,
                index_base: prior.index_base,
                vertex_anchor: prior.vertices.end,
                index_anchor: prior.indices.end,
                anim_anchor: Some(prior.anim.end),
                after_anim: Some(prior.anim.end + 1),
                prior: Some(prior),
                vertex_shift: (
                    prior.vertex_base + prior.vertex_count,
                    added_v as isize - prior.vertex_count as isize,
                ),
                index_shift: (
                    prior.index_base + prior.index_count,
                    added_i as isize - prior.index_count as isize,
                ),
            },
        }
    }

    fn dropped(&self, line_no: usize, line: &str, trailer: &str) -> bool {
        self.prior.is_some_and(|prior| prior.covers(line_no))
            || (Some(line_no) == self.after_anim && is_old_trailer(line, trailer))
    }
}

/// Output under construction.
struct Emitter<'a> {
    out: Vec<String>,
    fragment: &'a Fragment,
    name: &'a str,
    trailer: &'a str,
}

impl Emitter<'_> {
    fn push(&mut self, line: impl Into<String>) {
        self.out.push(line.into());
    }

    /// Emit a bracketed block and return the output line of its start marker.
    fn block<I>(&mut self, section: Section, body: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        self.push(block_marker(self.name, section, Edge::Start));
        let line = self.out.len();
        self.out.extend(body);
        self.push(block_marker(self.name, section, Edge::End));
        line
    }

    fn vertices(&mut self) -> usize {
        let fragment = self.fragment;
        self.block(Section::Vertices, fragment.vertex_lines.iter().cloned())
    }

    fn indices(&mut self, base: usize) -> usize {
        let fragment = self.fragment;
        let body = fragment.index_records.iter().map(|rec| rec.rebased(base).to_string());
        self.block(Section::Indices, body)
    }

    fn anim(&mut self, base: usize) -> Result<usize> {
        let body = self
            .fragment
            .footer
            .iter()
            .enumerate()
            .map(|(i, line)| match LineKind::of(line) {
                LineKind::Tris => rebase_tris(line, base, i + 1),
                _ => Ok(line.clone()),
            })
            .collect::<Result<Vec<String>>>()?;
        let line = self.block(Section::Anim, body);
        let trailer = self.trailer.to_string();
        self.push(trailer);
        Ok(line)
    }
}

/// Re-open the analyzed target and produce the merged lines.
///
/// Fails with [`Error::Rewrite`] if the file cannot be opened again or no
/// longer matches the layout from pass 1.
#[instrument(skip_all, fields(path = %layout.path.display(), object = %name))]
pub fn rewrite(layout: &TargetLayout, fragment: &Fragment, name: &str, trailer: &str) -> Result<Spliced> {
    let path = layout.path.as_path();
    let file = File::open(path).map_err(|e| rewrite_err(path, e.to_string()))?;
    let lines = BufReader::new(file)
        .lines()
        .map(|line| line.map_err(|e| rewrite_err(path, e.to_string())));
    let spliced = splice_lines(lines, layout, fragment, name, trailer)?;
    info!(
        vertices = spliced.report.merged.vertices,
        indices = spliced.report.merged.indices,
        replaced = spliced.report.replaced,
        "target rewritten"
    );
    Ok(spliced)
}

/// Pass 2 over any line source.
pub fn splice_lines<I>(
    lines: I,
    layout: &TargetLayout,
    fragment: &Fragment,
    name: &str,
    trailer: &str,
) -> Result<Spliced>
where
    I: Iterator<Item = Result<String>>,
{
    let plan = Plan::new(layout, fragment);
    debug!(?plan, "splice plan");

    let mut em = Emitter {
        out: Vec::with_capacity(layout.line_count + fragment.vertex_count() + fragment.footer.len() + 16),
        fragment,
        name,
        trailer,
    };
    let (mut vertex_block_line, mut index_block_line, mut anim_block_line) = (0, 0, 0);
    let mut line_count = 0;

    for (idx, line) in lines.enumerate() {
        let line = line?;
        let line_no = idx + 1;
        line_count = line_no;
        if line_no > layout.line_count {
            return Err(rewrite_err(&layout.path, "target grew since it was analyzed"));
        }

        if line_no == plan.header_line {
            if LineKind::of(&line) != LineKind::PointCounts {
                return Err(rewrite_err(&layout.path, "POINT_COUNTS moved since the target was analyzed"));
            }
            if plan.summary_line.is_none() {
                em.push(summary_marker(name, fragment.vertex_count(), fragment.index_count()));
            }
            em.push(plan.header.to_string());
        } else if Some(line_no) == plan.summary_line {
            em.push(summary_marker(name, fragment.vertex_count(), fragment.index_count()));
        } else if !plan.dropped(line_no, &line, trailer) {
            em.push(shift_line(line, line_no, &plan)?);
        }

        if line_no == plan.vertex_anchor {
            vertex_block_line = em.vertices();
        }
        if line_no == plan.index_anchor {
            index_block_line = em.indices(plan.vertex_base);
        }
        if Some(line_no) == plan.anim_anchor {
            anim_block_line = em.anim(plan.index_base)?;
        }
    }

    if line_count != layout.line_count {
        return Err(rewrite_err(&layout.path, "target shrank since it was analyzed"));
    }
    if plan.anim_anchor.is_none() {
        anim_block_line = em.anim(plan.index_base)?;
    }

    Ok(Spliced {
        lines: em.out,
        report: SpliceReport {
            original: layout.header,
            merged: plan.header,
            added_vertices: fragment.vertex_count(),
            added_indices: fragment.index_count(),
            vertex_block_line,
            index_block_line,
            anim_block_line,
            replaced: plan.prior.is_some(),
        },
    })
}

/// A kitbash attribution line, or the configured trailer whatever its text.
fn is_old_trailer(line: &str, trailer: &str) -> bool {
    let trailer = trailer.trim();
    is_trailer(line) || (!trailer.is_empty() && line.trim() == trailer)
}

/// Move target references past a replaced block; other lines pass through.
fn shift_line(line: String, line_no: usize, plan: &Plan<'_>) -> Result<String> {
    let (v_threshold, v_delta) = plan.vertex_shift;
    let (i_threshold, i_delta) = plan.index_shift;
    match LineKind::of(&line) {
        LineKind::Index if v_delta != 0 => {
            let shifted = IndexRecord::parse(&line, line_no)?.shifted_from(v_threshold, v_delta);
            Ok(shifted.map_or(line, |rec| rec.to_string()))
        }
        LineKind::Tris if i_delta != 0 => {
            Ok(shift_tris(&line, i_threshold, i_delta, line_no)?.unwrap_or(line))
        }
        _ => Ok(line),
    }
}

fn rewrite_err(path: &Path, reason: impl Into<String>) -> Error {
    Error::Rewrite { path: path.to_path_buf(), reason: reason.into() }
}
