//! Loading of per-shard `output.json` files.

use std::path::{Path, PathBuf};

use crate::errors::{CollectError, CollectResult};
use crate::model::ShardPayload;

pub fn shard_output_path(output_dir: &Path, task_id: &str, file_name: &str) -> PathBuf {
    output_dir.join(task_id).join(file_name)
}

/// Parse one shard's output file. Absent, empty and corrupt files are
/// distinct errors; classification into missing/incomplete is the caller's.
pub fn read_shard_payload(path: &Path) -> CollectResult<ShardPayload> {
    let content = std::fs::read(path).map_err(|source| CollectError::ShardMissing {
        path: path.to_path_buf(),
        source,
    })?;
    if content.is_empty() {
        return Err(CollectError::ShardEmpty {
            path: path.to_path_buf(),
        });
    }
    serde_json::from_slice(&content).map_err(|source| CollectError::ShardCorrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a shard payload, logging instead of failing. `None` means absent or
/// unparseable.
pub fn load_shard_json(output_dir: &Path, task_id: &str, file_name: &str) -> Option<ShardPayload> {
    let path = shard_output_path(output_dir, task_id, file_name);
    match read_shard_payload(&path) {
        Ok(payload) => Some(payload),
        Err(e) => {
            tracing::warn!(task_id, error = %e, "missing or invalid shard JSON file");
            None
        }
    }
}

/// Debug listing of what the launcher left behind. Only logs.
pub fn log_output_dir_contents(output_dir: &Path) {
    let entries = match std::fs::read_dir(output_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!(path = %output_dir.display(), error = %e, "error while examining task output dir");
            return;
        }
    };
    let contents: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
    if contents.is_empty() {
        tracing::warn!(path = %output_dir.display(), "no files found in task output dir");
    } else {
        tracing::debug!(path = %output_dir.display(), ?contents, "task output dir contents");
    }
}
