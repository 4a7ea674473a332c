//! Comment lines bracketing a merged object.
//!
//! ```text
//! # KITBASH - wiper1 VTs: 4 TRIs: 6
//! POINT_COUNTS ...
//! ...
//! # KITBASH - wiper1 VT start
//! VT ...
//! # KITBASH - wiper1 VT end
//! ...
//! # KITBASH - wiper1 IDX start
//! IDX ...
//! # KITBASH - wiper1 IDX end
//! ...
//! # KITBASH - wiper1 ANIM start
//! ...
//! # KITBASH - wiper1 ANIM end
//! # KITBASH 2.0 by Jemma Studios
//! ```
//!
//! Files merged by the 1.x/2.0 tool use `start VT section` word order; those
//! are recognised too so an old merge can be replaced.

use std::fmt;

/// Every kitbash comment starts with this.
pub const KITBASH_COMMENT: &str = "# KITBASH";
/// Prefix of a per-object marker.
pub const MARKER_PREFIX: &str = "# KITBASH - ";
/// Attribution line written after each merged footer.
pub const DEFAULT_TRAILER: &str = "# KITBASH 2.0 by Jemma Studios";

/// Region of the target a marker block covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    Vertices,
    Indices,
    Anim,
}

impl Section {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vertices => "VT",
            Self::Indices => "IDX",
            Self::Anim => "ANIM",
        }
    }

    fn from_word(word: &str) -> Option<Self> {
        match word {
            "VT" => Some(Self::Vertices),
            "IDX" => Some(Self::Indices),
            "ANIM" => Some(Self::Anim),
            _ => None,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Start,
    End,
}

impl Edge {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
        }
    }

    fn from_word(word: &str) -> Option<Self> {
        match word {
            "start" => Some(Self::Start),
            "end" => Some(Self::End),
            _ => None,
        }
    }
}

/// A recognised marker for one object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    /// `# KITBASH - <name> VTs: <n> TRIs: <n>` above the header.
    Summary,
    /// Start or end of a section block.
    Block(Section, Edge),
}

/// `# KITBASH - <name> <section> <start|end>`
pub fn block_marker(name: &str, section: Section, edge: Edge) -> String {
    format!("{MARKER_PREFIX}{name} {section} {}", edge.as_str())
}

/// `# KITBASH - <name> VTs: <v> TRIs: <i>`
pub fn summary_marker(name: &str, vertices: usize, indices: usize) -> String {
    format!("{MARKER_PREFIX}{name} VTs: {vertices} TRIs: {indices}")
}

/// Recognise a marker belonging to `name`.
///
/// The name is compared ignoring case, like the descriptor lookup. Markers
/// for other objects, including ones whose name merely starts with `name`,
/// return `None`.
pub fn parse_marker(line: &str, name: &str) -> Option<Marker> {
    let rest = line.trim().strip_prefix(MARKER_PREFIX)?;
    let (head, tail) = (rest.get(..name.len())?, rest.get(name.len()..)?);
    if head.to_lowercase() != name.to_lowercase() {
        return None;
    }
    let rest = tail.strip_prefix(' ')?;
    let words: Vec<&str> = rest.split_whitespace().collect();
    match words.as_slice() {
        ["VTs:", _, "TRIs:", _] => Some(Marker::Summary),
        [section, edge] => Some(Marker::Block(Section::from_word(section)?, Edge::from_word(edge)?)),
        [edge, section, "section"] => {
            Some(Marker::Block(Section::from_word(section)?, Edge::from_word(edge)?))
        }
        _ => None,
    }
}

/// Section closed by an end marker of any object.
pub fn closed_section(line: &str) -> Option<Section> {
    let rest = line.trim().strip_prefix(MARKER_PREFIX)?;
    let words: Vec<&str> = rest.split_whitespace().collect();
    match words.as_slice() {
        [_, .., "end", section, "section"] => Section::from_word(section),
        [_, .., section, "end"] => Section::from_word(section),
        _ => None,
    }
}

/// A kitbash attribution line (not a per-object marker).
pub fn is_trailer(line: &str) -> bool {
    let line = line.trim();
    line.starts_with(KITBASH_COMMENT) && !line.starts_with(MARKER_PREFIX)
}
