//! Pass 1: find the region boundaries of the target and any earlier merge.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use super::markers::{closed_section, is_trailer, parse_marker, Edge, Marker, Section};
use crate::obj8::{IndexRecord, LineKind, PointCounts};
use crate::util::{Error, Result};

/// Inclusive 1-based line range between a start and an end marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockSpan {
    pub start: usize,
    pub end: usize,
}

impl BlockSpan {
    #[inline]
    pub fn contains(&self, line: usize) -> bool {
        (self.start..=self.end).contains(&line)
    }
}

/// An earlier merge of the same object found in the target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriorMerge {
    pub summary_line: Option<usize>,
    pub vertices: BlockSpan,
    pub indices: BlockSpan,
    pub anim: BlockSpan,
    /// Attribution line directly after the ANIM block, if present.
    pub trailer_line: Option<usize>,
    /// Vertices in the target before the old VT block.
    pub vertex_base: usize,
    /// Vertices inside the old VT block.
    pub vertex_count: usize,
    /// Index values in the target before the old IDX block.
    pub index_base: usize,
    /// Index values inside the old IDX block.
    pub index_count: usize,
}

impl PriorMerge {
    /// True if `line` belongs to the old merge and is dropped on replace.
    pub fn covers(&self, line: usize) -> bool {
        self.summary_line == Some(line)
            || self.trailer_line == Some(line)
            || self.vertices.contains(line)
            || self.indices.contains(line)
            || self.anim.contains(line)
    }
}

/// Result of the analysis pass. All line numbers are 1-based input lines.
#[derive(Clone, Debug)]
pub struct TargetLayout {
    pub path: PathBuf,
    pub line_count: usize,
    pub header_line: usize,
    pub header: PointCounts,
    /// Last line whose first token is `VT`, or the end marker directly
    /// after it when that line closes an earlier merge.
    pub last_vertex_line: Option<usize>,
    /// Same for `IDX` / `IDX10`.
    pub last_index_line: Option<usize>,
    /// `VT` lines counted.
    pub vertex_count: usize,
    /// Index values counted over all index lines.
    pub index_count: usize,
    pub prior: Option<PriorMerge>,
}

/// Marker bookkeeping while scanning.
#[derive(Default)]
struct MarkerScan {
    summary_line: Option<usize>,
    open: Option<(Section, usize)>,
    vertices: Option<BlockSpan>,
    indices: Option<BlockSpan>,
    anim: Option<BlockSpan>,
    trailer_line: Option<usize>,
    vertex_base: usize,
    vertex_end: usize,
    index_base: usize,
    index_end: usize,
    seen: bool,
}

impl MarkerScan {
    fn span_mut(&mut self, section: Section) -> &mut Option<BlockSpan> {
        match section {
            Section::Vertices => &mut self.vertices,
            Section::Indices => &mut self.indices,
            Section::Anim => &mut self.anim,
        }
    }

    fn marker(&mut self, marker: Marker, line_no: usize, vertices: usize, indices: usize) -> Result<()> {
        self.seen = true;
        match marker {
            Marker::Summary => {
                self.summary_line.get_or_insert(line_no);
            }
            Marker::Block(section, Edge::Start) => {
                if let Some((open, _)) = self.open {
                    return Err(Error::parse(line_no, format!("{section} block opened inside {open} block")));
                }
                if self.span_mut(section).is_some() {
                    return Err(Error::parse(line_no, format!("second {section} block for the same object")));
                }
                match section {
                    Section::Vertices => self.vertex_base = vertices,
                    Section::Indices => self.index_base = indices,
                    Section::Anim => {}
                }
                self.open = Some((section, line_no));
            }
            Marker::Block(section, Edge::End) => {
                let start = match self.open.take() {
                    Some((open, start)) if open == section => start,
                    _ => return Err(Error::parse(line_no, format!("{section} end marker without a start"))),
                };
                match section {
                    Section::Vertices => self.vertex_end = vertices,
                    Section::Indices => self.index_end = indices,
                    Section::Anim => {}
                }
                *self.span_mut(section) = Some(BlockSpan { start, end: line_no });
            }
        }
        Ok(())
    }

    fn finish(self, line_count: usize) -> Result<Option<PriorMerge>> {
        if !self.seen {
            return Ok(None);
        }
        if let Some((section, start)) = self.open {
            return Err(Error::parse(start, format!("{section} block is never closed")));
        }
        match (self.vertices, self.indices, self.anim) {
            (Some(vertices), Some(indices), Some(anim)) => Ok(Some(PriorMerge {
                summary_line: self.summary_line,
                vertices,
                indices,
                anim,
                trailer_line: self.trailer_line,
                vertex_base: self.vertex_base,
                vertex_count: self.vertex_end - self.vertex_base,
                index_base: self.index_base,
                index_count: self.index_end - self.index_base,
            })),
            _ => Err(Error::parse(
                line_count,
                "earlier merge markers are incomplete (need VT, IDX and ANIM blocks)",
            )),
        }
    }
}

impl TargetLayout {
    /// Stream the target once and record its layout.
    ///
    /// Opening or reading the file fails with [`Error::Analysis`]; malformed
    /// structural lines and header counts that disagree with the file fail
    /// with [`Error::Parse`] / [`Error::CountMismatch`].
    #[instrument(skip_all, fields(path = %path.as_ref().display(), object = %name))]
    pub fn analyze(path: impl AsRef<Path>, name: &str) -> Result<Self> {
        let path = path.as_ref();
        let analysis_err = |source| Error::Analysis { path: path.to_path_buf(), source };
        let file = File::open(path).map_err(analysis_err)?;
        let reader = BufReader::new(file);
        let lines = reader.lines().map(|line| line.map_err(analysis_err));
        let layout = Self::scan(path, lines, name)?;
        info!(
            vertices = layout.vertex_count,
            indices = layout.index_count,
            last_vt = ?layout.last_vertex_line,
            last_idx = ?layout.last_index_line,
            merged_before = layout.prior.is_some(),
            "target analyzed"
        );
        Ok(layout)
    }

    /// Analyze in-memory text, for callers that already hold the file.
    pub fn analyze_str(path: impl Into<PathBuf>, text: &str, name: &str) -> Result<Self> {
        let path = path.into();
        Self::scan(&path, text.lines().map(|l| Ok(l.to_string())), name)
    }

    fn scan<I>(path: &Path, lines: I, name: &str) -> Result<Self>
    where
        I: Iterator<Item = Result<String>>,
    {
        let mut header: Option<(usize, PointCounts)> = None;
        let mut last_vertex_line = None;
        let mut last_index_line = None;
        let mut vertex_count = 0;
        let mut index_count = 0;
        let mut markers = MarkerScan::default();
        let mut line_count = 0;

        for (idx, line) in lines.enumerate() {
            let line = line?;
            let line_no = idx + 1;
            line_count = line_no;

            match LineKind::of(&line) {
                LineKind::Vertex => {
                    last_vertex_line = Some(line_no);
                    vertex_count += 1;
                }
                LineKind::Index => {
                    last_index_line = Some(line_no);
                    index_count += IndexRecord::parse(&line, line_no)?.len();
                }
                LineKind::PointCounts => {
                    if let Some((first, _)) = header {
                        return Err(Error::parse(
                            line_no,
                            format!("second POINT_COUNTS (first on line {first})"),
                        ));
                    }
                    header = Some((line_no, PointCounts::parse(&line, line_no)?));
                }
                LineKind::Tris | LineKind::Other => {
                    // keep insertion points outside blocks merged earlier
                    match closed_section(&line) {
                        Some(Section::Vertices) if last_vertex_line == Some(line_no - 1) => {
                            last_vertex_line = Some(line_no);
                        }
                        Some(Section::Indices) if last_index_line == Some(line_no - 1) => {
                            last_index_line = Some(line_no);
                        }
                        _ => {}
                    }
                    if let Some(marker) = parse_marker(&line, name) {
                        debug!(line = line_no, ?marker, "existing marker");
                        markers.marker(marker, line_no, vertex_count, index_count)?;
                    } else if is_trailer(&line)
                        && markers.anim.is_some_and(|anim| anim.end + 1 == line_no)
                    {
                        markers.trailer_line = Some(line_no);
                    }
                }
            }
        }

        let Some((header_line, header)) = header else {
            return Err(Error::parse(line_count, "target has no POINT_COUNTS header"));
        };
        if header.vertices != vertex_count {
            return Err(Error::CountMismatch {
                what: "target vertex",
                declared: header.vertices,
                actual: vertex_count,
            });
        }
        if header.indices != index_count {
            return Err(Error::CountMismatch {
                what: "target index",
                declared: header.indices,
                actual: index_count,
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            line_count,
            header_line,
            header,
            last_vertex_line,
            last_index_line,
            vertex_count,
            index_count,
            prior: markers.finish(line_count)?,
        })
    }
}
