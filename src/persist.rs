//! Backup and write-back of the target.
//!
//! The original file is renamed to `<path>.SAVE<NNN>` before anything is
//! written; if no backup name can be claimed, nothing is written.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::util::{Error, Result};

/// Highest backup suffix.
pub const MAX_BACKUPS: u32 = 999;

/// `<path>.SAVE<NNN>` for a given slot.
pub fn backup_path(path: &Path, slot: u32) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".SAVE{slot:03}"));
    PathBuf::from(name)
}

/// Rename `path` to the first free backup name in `1..=limit`.
pub fn backup(path: impl AsRef<Path>, limit: u32) -> Result<PathBuf> {
    let path = path.as_ref();
    let failed = |reason: String| Error::BackupFailed { path: path.to_path_buf(), reason };

    if !path.exists() {
        return Err(failed("original file does not exist".into()));
    }
    let limit = limit.clamp(1, MAX_BACKUPS);
    let target = (1..=limit)
        .map(|slot| backup_path(path, slot))
        .find(|candidate| !candidate.exists())
        .ok_or_else(|| failed(format!("all {limit} backup names are taken")))?;

    std::fs::rename(path, &target).map_err(|e| failed(e.to_string()))?;
    debug!(backup = %target.display(), "original moved aside");
    Ok(target)
}

/// Back up `path`, then write `lines` to it, each followed by `\n`.
///
/// Returns the backup path.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn commit<S: AsRef<str>>(path: impl AsRef<Path>, lines: &[S], limit: u32) -> Result<PathBuf> {
    let path = path.as_ref();
    let saved = backup(path, limit)?;

    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut out = BufWriter::new(file);
    for line in lines {
        writeln!(out, "{}", line.as_ref()).map_err(|e| Error::io(path, e))?;
    }
    out.flush().map_err(|e| Error::io(path, e))?;

    info!(lines = lines.len(), backup = %saved.display(), "target written");
    Ok(saved)
}
