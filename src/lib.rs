//! # Kitbash
//!
//! Merge an X-Plane OBJ8 manipulator object into a cockpit object.
//!
//! The manipulator is placed using the rotation and offset recorded for it
//! in the aircraft's `.acf` descriptor, then its vertices, index records and
//! animation footer are spliced into the cockpit file. Header counts, index
//! references and `TRIS` offsets are kept consistent, and the spliced
//! regions are bracketed with marker comments so a later run can replace
//! them.
//!
//! ## Modules
//!
//! - [`util`] - Errors, math helpers, text helpers
//! - [`obj8`] - OBJ8 line records (`VT`, `IDX`, `TRIS`, `POINT_COUNTS`)
//! - [`acf`] - Descriptor lookup producing a [`Placement`]
//! - [`fragment`] - Manipulator reader
//! - [`splice`] - Two-pass target analysis and rewrite
//! - [`persist`] - Backup and write-back
//! - [`settings`] - Persisted configuration
//! - [`merge`] - The whole pipeline
//!
//! ## Example
//!
//! ```ignore
//! use kitbash::prelude::*;
//!
//! let report = merge("plane.acf", "wiper1", "wiper1.obj", "cockpit.obj", &MergeOptions::default())?;
//! println!("{} vertices now", report.splice.merged.vertices);
//! ```

pub mod util;
pub mod obj8;
pub mod acf;
pub mod placement;
pub mod fragment;
pub mod splice;
pub mod persist;
pub mod settings;
pub mod merge;

// Re-export commonly used types
pub use util::{Error, Result};
pub use placement::Placement;
pub use merge::{merge, MergeOptions, MergeReport};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, Result};
    pub use crate::placement::Placement;
    pub use crate::obj8::{IndexRecord, PointCounts, Vertex};
    pub use crate::fragment::Fragment;
    pub use crate::splice::{SpliceReport, TargetLayout};
    pub use crate::settings::Settings;
    pub use crate::merge::{merge, MergeOptions, MergeReport};
}
