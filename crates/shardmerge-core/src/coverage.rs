//! Optional per-shard coverage merging.
//!
//! Each shard's coverage data is folded into a shared coverage directory by an
//! external tool. Failures only ever produce warnings.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::errors::{CollectError, CollectResult};
use crate::launcher::exit_code_from_status;
use crate::model::ShardDescriptor;
use crate::warnings::WarningSink;

pub trait CoverageMerger {
    /// Merge the coverage files found in `shard_output_dir` into
    /// `coverage_dir`. Returns the tool's exit code.
    fn merge_shard(&self, coverage_dir: &Path, shard_output_dir: &Path) -> CollectResult<i32>;
}

/// Runs `<tool> --coverage-dir <dir> --swarming-output-dir <shard dir>`.
#[derive(Debug, Clone)]
pub struct SancovMerger {
    tool: PathBuf,
}

impl SancovMerger {
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        Self { tool: tool.into() }
    }
}

impl CoverageMerger for SancovMerger {
    fn merge_shard(&self, coverage_dir: &Path, shard_output_dir: &Path) -> CollectResult<i32> {
        tracing::debug!(tool = %self.tool.display(), shard_dir = %shard_output_dir.display(), "merging coverage");
        let status = Command::new(&self.tool)
            .arg("--coverage-dir")
            .arg(coverage_dir)
            .arg("--swarming-output-dir")
            .arg(shard_output_dir)
            .status()
            .map_err(|source| CollectError::CoverageMerge {
                tool: self.tool.display().to_string(),
                shard_dir: shard_output_dir.to_path_buf(),
                source,
            })?;
        Ok(exit_code_from_status(status))
    }
}

pub fn coverage_warning_title(index: usize) -> String {
    format!("error when merging coverage data of shard {index}")
}

/// Run the merger for every shard in index order, bad shards included.
pub fn merge_coverage_data(
    merger: &dyn CoverageMerger,
    coverage_dir: &Path,
    output_dir: &Path,
    shards: &[Option<ShardDescriptor>],
    sink: &mut WarningSink,
) {
    for (index, shard) in shards.iter().enumerate() {
        let Some(shard) = shard else {
            sink.emit(
                coverage_warning_title(index),
                "shard has no usable task id in summary.json",
            );
            continue;
        };
        let shard_dir = output_dir.join(&shard.task_id);
        match merger.merge_shard(coverage_dir, &shard_dir) {
            Ok(0) => {}
            Ok(code) => sink.emit(
                coverage_warning_title(index),
                format!("coverage merger exited with code {code}"),
            ),
            Err(e) => sink.emit(coverage_warning_title(index), e.to_string()),
        }
    }
}
