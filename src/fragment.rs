//! Manipulator fragment reader.
//!
//! The fragment is a complete OBJ8 file of its own. Its preamble (texture,
//! `POINT_COUNTS`) is consumed for bookkeeping, its `VT` lines are moved into
//! place, its index lines are kept for re-basing, and everything after the
//! index region (the `ANIM`/`ATTR_manip` section) is carried as footer.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info, instrument, warn};

use crate::obj8::{IndexRecord, LineKind, PointCounts, TrisCall, Vertex};
use crate::placement::Placement;
use crate::util::{Error, Result};

/// A manipulator object ready to be spliced into a target.
#[derive(Clone, Debug, Default)]
pub struct Fragment {
    /// Transformed vertices in canonical `VT` form.
    pub vertex_lines: Vec<String>,
    /// Index records as read, still relative to the fragment's own table.
    pub index_records: Vec<IndexRecord>,
    /// Lines following the index region, verbatim.
    pub footer: Vec<String>,
    /// `POINT_COUNTS` of the fragment, if it had one.
    pub header: Option<PointCounts>,
}

/// Where the reader is within the file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Region {
    Preamble,
    Indices,
    Footer,
}

impl Fragment {
    /// Read and transform a fragment file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn read(path: impl AsRef<Path>, placement: &Placement) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let fragment = Self::parse(BufReader::new(file), placement).map_err(|e| match e {
            Error::Io { source, .. } => Error::io(path, source),
            other => other,
        })?;
        info!(
            vertices = fragment.vertex_count(),
            indices = fragment.index_count(),
            footer = fragment.footer.len(),
            "fragment loaded"
        );
        Ok(fragment)
    }

    /// Parse a fragment from any line source, transforming every vertex.
    pub fn parse<R: BufRead>(reader: R, placement: &Placement) -> Result<Self> {
        let mut fragment = Self::default();
        let mut region = Region::Preamble;
        let mut index_line_nos = Vec::new();
        let mut tris_calls = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.map_err(|e| Error::io("<fragment>", e))?;
            let kind = LineKind::of(&line);

            if kind == LineKind::Index {
                if region == Region::Footer {
                    return Err(Error::parse(line_no, "index line after the index region ended"));
                }
                region = Region::Indices;
                fragment.index_records.push(IndexRecord::parse(&line, line_no)?);
                index_line_nos.push(line_no);
                continue;
            }
            if region != Region::Preamble {
                region = Region::Footer;
                if kind == LineKind::Tris {
                    tris_calls.push((TrisCall::parse(&line, line_no)?, line_no));
                }
                fragment.footer.push(line);
                continue;
            }

            match kind {
                LineKind::PointCounts => {
                    if fragment.header.is_some() {
                        return Err(Error::parse(line_no, "duplicate POINT_COUNTS"));
                    }
                    fragment.header = Some(PointCounts::parse(&line, line_no)?);
                }
                LineKind::Vertex => {
                    let vertex = Vertex::parse(&line, line_no)?.transformed(placement);
                    fragment.vertex_lines.push(vertex.to_string());
                }
                _ => {}
            }
        }

        fragment.validate(&index_line_nos, &tris_calls)?;
        debug!(
            vertex_lines = fragment.vertex_lines.len(),
            index_lines = fragment.index_records.len(),
            "fragment parsed"
        );
        Ok(fragment)
    }

    /// Number of vertices contributed.
    pub fn vertex_count(&self) -> usize {
        self.vertex_lines.len()
    }

    /// Number of index values contributed (not lines).
    pub fn index_count(&self) -> usize {
        self.index_records.iter().map(IndexRecord::len).sum()
    }

    /// Check the header against the records and every index against the table.
    ///
    /// `index_line_nos` holds the source line of each index record and
    /// `tris_calls` every footer draw call with its source line.
    fn validate(&self, index_line_nos: &[usize], tris_calls: &[(TrisCall, usize)]) -> Result<()> {
        match self.header {
            Some(header) => {
                if header.vertices != self.vertex_count() {
                    return Err(Error::CountMismatch {
                        what: "fragment vertex",
                        declared: header.vertices,
                        actual: self.vertex_count(),
                    });
                }
                if header.indices != self.index_count() {
                    return Err(Error::CountMismatch {
                        what: "fragment index",
                        declared: header.indices,
                        actual: self.index_count(),
                    });
                }
            }
            None => warn!("fragment has no POINT_COUNTS, using counted totals"),
        }

        let vertex_count = self.vertex_count();
        for (record, &line_no) in self.index_records.iter().zip(index_line_nos) {
            if let Some(max) = record.max_index().filter(|&max| max >= vertex_count) {
                return Err(Error::parse(
                    line_no,
                    format!("index {max} out of range for {vertex_count} vertices"),
                ));
            }
        }

        let index_count = self.index_count();
        for &(call, line_no) in tris_calls {
            if call.offset.checked_add(call.count).is_none_or(|end| end > index_count) {
                return Err(Error::parse(
                    line_no,
                    format!(
                        "TRIS {} {} runs past {index_count} indices",
                        call.offset, call.count
                    ),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIP: &str = "\
I
800
OBJ

TEXTURE cockpit.png
POINT_COUNTS 4 0 0 6

VT 0 0 0 0 0 1 0 0
VT 1 0 0 0 0 1 1 0
VT 1 1 0 0 0 1 1 1
VT 0 1 0 0 0 1 0 1

IDX 0 1 2
IDX 0 2 3

ATTR_manip_drag_axis hand 0 0 1 0 1 sim/knob
\tTRIS 0 6
ATTR_manip_none
";

    fn parse(text: &str) -> Result<Fragment> {
        Fragment::parse(text.as_bytes(), &Placement::IDENTITY)
    }

    #[test]
    fn test_parse_regions() {
        let f = parse(MANIP).unwrap();
        assert_eq!(f.header, Some(PointCounts::new(4, 0, 0, 6)));
        assert_eq!(f.vertex_count(), 4);
        assert_eq!(f.index_count(), 6);
        assert_eq!(f.index_records.len(), 2);
        assert_eq!(f.vertex_lines[1], Vertex::parse("VT 1 0 0 0 0 1 1 0", 1).unwrap().to_string());
        assert_eq!(
            f.footer,
            vec!["", "ATTR_manip_drag_axis hand 0 0 1 0 1 sim/knob", "\tTRIS 0 6", "ATTR_manip_none"]
        );
    }

    #[test]
    fn test_vertices_are_transformed() {
        let placement = Placement { offset_z: 2.0, ..Placement::IDENTITY };
        let f = Fragment::parse(MANIP.as_bytes(), &placement).unwrap();
        assert!(f.vertex_lines[0].starts_with("VT\t0.00000000\t0.00000000\t2.00000000\t"));
    }

    #[test]
    fn test_header_mismatch() {
        let text = MANIP.replace("POINT_COUNTS 4 0 0 6", "POINT_COUNTS 5 0 0 6");
        assert!(matches!(
            parse(&text),
            Err(Error::CountMismatch { declared: 5, actual: 4, .. })
        ));
        let text = MANIP.replace("POINT_COUNTS 4 0 0 6", "POINT_COUNTS 4 0 0 9");
        assert!(matches!(parse(&text), Err(Error::CountMismatch { declared: 9, actual: 6, .. })));
    }

    #[test]
    fn test_missing_header_uses_counts() {
        let text = MANIP.replace("POINT_COUNTS 4 0 0 6\n", "");
        let f = parse(&text).unwrap();
        assert_eq!(f.header, None);
        assert_eq!((f.vertex_count(), f.index_count()), (4, 6));
    }

    #[test]
    fn test_bad_vertex_fails() {
        let text = MANIP.replace("VT 1 1 0 0 0 1 1 1", "VT 1 1 0 0 0 1 1");
        assert!(matches!(parse(&text), Err(Error::Parse { line: 10, .. })));
    }

    #[test]
    fn test_index_out_of_range() {
        let text = MANIP.replace("IDX 0 2 3", "IDX 0 2 4");
        assert!(matches!(parse(&text), Err(Error::Parse { line: 14, .. })));
    }

    #[test]
    fn test_tris_out_of_range() {
        let text = MANIP.replace("\tTRIS 0 6", "\tTRIS 3 6");
        assert!(matches!(parse(&text), Err(Error::Parse { line: 17, .. })));
        let text = MANIP.replace("\tTRIS 0 6", "\tTRIS 18446744073709551615 2");
        assert!(matches!(parse(&text), Err(Error::Parse { line: 17, .. })));
    }

    #[test]
    fn test_non_contiguous_index_region() {
        let text = MANIP.replace("ATTR_manip_none", "IDX 0 1 2");
        assert!(matches!(parse(&text), Err(Error::Parse { line: 18, .. })));
    }
}
