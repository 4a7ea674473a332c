//! End-to-end merge: descriptor lookup, fragment read, splice, write-back.

use std::path::{Path, PathBuf};

use tracing::{info, info_span, warn};

use crate::acf::read_placement;
use crate::fragment::Fragment;
use crate::persist::{commit, MAX_BACKUPS};
use crate::placement::Placement;
use crate::settings::Settings;
use crate::splice::{rewrite, SpliceReport, TargetLayout, DEFAULT_TRAILER};
use crate::util::{Error, Result};

/// Knobs for a single merge run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeOptions {
    /// Replace an earlier merge of the same object instead of failing with
    /// [`Error::AlreadyMerged`].
    pub overwrite: bool,
    pub backup_limit: u32,
    pub trailer: String,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self { overwrite: false, backup_limit: MAX_BACKUPS, trailer: DEFAULT_TRAILER.to_string() }
    }
}

impl From<&Settings> for MergeOptions {
    fn from(s: &Settings) -> Self {
        Self { overwrite: s.overwrite, backup_limit: s.backup_limit, trailer: s.trailer.clone() }
    }
}

impl MergeOptions {
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// Outcome of a successful merge.
#[derive(Clone, Debug)]
pub struct MergeReport {
    pub placement: Placement,
    /// Where the original target was moved.
    pub backup: PathBuf,
    pub splice: SpliceReport,
}

/// Merge object `name` from `manip` into `cockpit`, placed per `acf`.
///
/// Nothing is written unless every read and parse succeeded and the
/// original target was backed up.
pub fn merge(
    acf: impl AsRef<Path>,
    name: &str,
    manip: impl AsRef<Path>,
    cockpit: impl AsRef<Path>,
    opts: &MergeOptions,
) -> Result<MergeReport> {
    let cockpit = cockpit.as_ref();
    let _span = info_span!("merge", object = %name).entered();

    let placement = read_placement(acf, name)?;
    let fragment = Fragment::read(manip, &placement)?;
    let layout = TargetLayout::analyze(cockpit, name)?;

    if layout.prior.is_some() {
        if !opts.overwrite {
            return Err(Error::AlreadyMerged(name.to_string()));
        }
        warn!("replacing earlier merge of {name}");
    }

    let spliced = rewrite(&layout, &fragment, name, &opts.trailer)?;
    let backup = commit(cockpit, &spliced.lines, opts.backup_limit)?;
    info!(backup = %backup.display(), "merge complete");

    Ok(MergeReport { placement, backup, splice: spliced.report })
}
