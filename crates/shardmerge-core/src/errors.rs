//! Error types for shard collection.
//!
//! Only [`CollectError::Launch`] and [`CollectError::OutputDir`] affect the
//! caller's exit code. Every error that reaches the warnings file is titled by
//! its [`CollectErrorKind`].

use std::path::{Path, PathBuf};

/// Coarse classification; decides the title of the warning an error becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectErrorKind {
    /// The task launcher could not be started.
    LaunchFailure,
    /// The per-run task output directory could not be created.
    OutputDirUnavailable,
    /// `summary.json` missing or corrupt.
    SummaryUnavailable,
    /// A shard's `output.json` missing, empty or corrupt.
    ShardUnavailable,
    /// The per-shard coverage merge tool failed.
    CoverageMergeFailure,
    /// Reading or writing local files.
    Io,
}

impl CollectErrorKind {
    pub fn warning_title(self) -> &'static str {
        match self {
            Self::LaunchFailure => "failed to start task launcher",
            Self::OutputDirUnavailable => "failed to create task output directory",
            Self::SummaryUnavailable => "summary.json is missing or can not be read",
            Self::ShardUnavailable => "shard output is missing or can not be read",
            Self::CoverageMergeFailure => "failed to merge coverage data",
            Self::Io => "failed to write output file",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("failed to start task launcher {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create task output directory in {}: {source}", parent.display())]
    OutputDir {
        parent: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("summary file {} can not be read: {source}", path.display())]
    SummaryIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("summary file {} is not valid: {source}", path.display())]
    SummaryInvalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("missing shard output file: {}", path.display())]
    ShardMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("empty shard output file: {}", path.display())]
    ShardEmpty { path: PathBuf },

    #[error("invalid shard output file: {}: {source}", path.display())]
    ShardCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("coverage merger {tool} failed on {}: {source}", shard_dir.display())]
    CoverageMerge {
        tool: String,
        shard_dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}: {}: {source}", path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CollectError {
    pub fn io(context: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            context,
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn kind(&self) -> CollectErrorKind {
        match self {
            Self::Launch { .. } => CollectErrorKind::LaunchFailure,
            Self::OutputDir { .. } => CollectErrorKind::OutputDirUnavailable,
            Self::SummaryIo { .. } | Self::SummaryInvalid { .. } => {
                CollectErrorKind::SummaryUnavailable
            }
            Self::ShardMissing { .. } | Self::ShardEmpty { .. } | Self::ShardCorrupt { .. } => {
                CollectErrorKind::ShardUnavailable
            }
            Self::CoverageMerge { .. } => CollectErrorKind::CoverageMergeFailure,
            Self::Io { .. } => CollectErrorKind::Io,
        }
    }
}

pub type CollectResult<T> = Result<T, CollectError>;
