//! Error types for kitbash.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for kitbash operations.
///
/// Every variant is terminal for a merge run; nothing is retried.
#[derive(Error, Debug)]
pub enum Error {
    /// A file could not be opened, read or written
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Attachment name never appears in the descriptor
    #[error("Positioned object not found in descriptor: {0}")]
    NotFound(String),

    /// Attachment found but some placement keys were never assigned
    #[error("Incomplete placement for {name}: missing {}", missing.join(", "))]
    IncompletePlacement {
        name: String,
        missing: Vec<&'static str>,
    },

    /// A structural line is malformed
    #[error("Parse error at line {line}: {details}")]
    Parse { line: usize, details: String },

    /// A header count disagrees with the records actually present
    #[error("{what} count mismatch: header declares {declared}, file has {actual}")]
    CountMismatch {
        what: &'static str,
        declared: usize,
        actual: usize,
    },

    /// The target already carries a merge of this attachment
    #[error("{0} is already merged into the target")]
    AlreadyMerged(String),

    /// The original target could not be moved to a backup name
    #[error("Backup of {} failed: {reason}", path.display())]
    BackupFailed { path: PathBuf, reason: String },

    /// Pass 1 over the target failed
    #[error("Unable to analyze {}: {source}", path.display())]
    Analysis {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Pass 2 over the target failed
    #[error("Unable to rewrite {}: {reason}", path.display())]
    Rewrite { path: PathBuf, reason: String },
}

impl Error {
    /// Create an I/O error bound to a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// Create a parse error for a 1-based line number.
    pub fn parse(line: usize, details: impl Into<String>) -> Self {
        Self::Parse { line, details: details.into() }
    }

    /// Process exit code distinguishing each failure kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io { .. } => 2,
            Self::NotFound(_) => 3,
            Self::IncompletePlacement { .. } => 4,
            Self::Parse { .. } => 5,
            Self::CountMismatch { .. } => 6,
            Self::AlreadyMerged(_) => 7,
            Self::BackupFailed { .. } => 8,
            Self::Analysis { .. } => 9,
            Self::Rewrite { .. } => 10,
        }
    }
}

/// Result type alias for kitbash operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::IncompletePlacement {
            name: "wiper1".into(),
            missing: vec!["phi", "offset_x"],
        };
        let msg = e.to_string();
        assert!(msg.contains("wiper1"));
        assert!(msg.contains("phi, offset_x"));

        let e = Error::CountMismatch { what: "vertex", declared: 5, actual: 3 };
        assert!(e.to_string().contains('5'));
        assert!(e.to_string().contains('3'));
    }

    #[test]
    fn test_exit_codes_distinct() {
        let io = || std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let errors = [
            Error::io("a", io()),
            Error::NotFound("x".into()),
            Error::IncompletePlacement { name: "x".into(), missing: vec![] },
            Error::parse(1, "bad"),
            Error::CountMismatch { what: "index", declared: 0, actual: 1 },
            Error::AlreadyMerged("x".into()),
            Error::BackupFailed { path: "a".into(), reason: "r".into() },
            Error::Analysis { path: "a".into(), source: io() },
            Error::Rewrite { path: "a".into(), reason: "r".into() },
        ];
        let mut codes: Vec<i32> = errors.iter().map(Error::exit_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(codes.iter().all(|&c| c != 0));
    }
}
