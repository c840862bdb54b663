//! Reader for the launcher's `summary.json`.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::errors::{CollectError, CollectResult};
use crate::model::{ShardDescriptor, SUMMARY_FILE};
use crate::warnings::WarningSink;

pub const SUMMARY_UNAVAILABLE_DETAIL: &str =
    "Something is seriously wrong with the task launcher or the bot.";

/// Shard list as positioned in the summary. `None` entries had no usable
/// descriptor.
pub type ShardsInfo = Vec<Option<ShardDescriptor>>;

#[derive(Debug, Deserialize)]
struct RawSummary {
    shards: Vec<Value>,
}

/// Parse `<output_dir>/summary.json`.
pub fn read_summary(output_dir: &Path) -> CollectResult<ShardsInfo> {
    let path = output_dir.join(SUMMARY_FILE);
    let content = std::fs::read(&path).map_err(|source| CollectError::SummaryIo {
        path: path.clone(),
        source,
    })?;
    let raw: RawSummary = serde_json::from_slice(&content)
        .map_err(|source| CollectError::SummaryInvalid { path, source })?;
    Ok(raw.shards.iter().map(ShardDescriptor::from_entry).collect())
}

/// Like [`read_summary`], but a missing or unreadable summary becomes a
/// warning and `None` ("no shard information"), which callers must keep
/// apart from `Some(vec![])` ("zero shards").
pub fn read_shards_info(output_dir: &Path, sink: &mut WarningSink) -> Option<ShardsInfo> {
    match read_summary(output_dir) {
        Ok(shards) => {
            tracing::debug!(shards = shards.len(), "read task summary");
            Some(shards)
        }
        Err(e) => {
            tracing::error!(error = %e, kind = ?e.kind(), "task summary unavailable");
            sink.emit(e.kind().warning_title(), SUMMARY_UNAVAILABLE_DETAIL);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CollectErrorKind;

    fn write_summary(dir: &Path, content: &str) {
        std::fs::write(dir.join(SUMMARY_FILE), content).unwrap();
    }

    #[test]
    fn reads_shard_descriptors_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write_summary(
            dir.path(),
            r#"{"shards": [{"task_id": "a", "exit_code": 0}, null, {"task_id": "c", "exit_code": "1"}]}"#,
        );
        let shards = read_summary(dir.path()).unwrap();
        assert_eq!(
            shards,
            vec![
                Some(ShardDescriptor::new("a", 0)),
                None,
                Some(ShardDescriptor::new("c", 1)),
            ]
        );
    }

    #[test]
    fn escaping_task_id_makes_the_shard_missing() {
        let root = tempfile::tempdir().unwrap();
        let output_dir = root.path().join("out");
        std::fs::create_dir_all(output_dir.join("a")).unwrap();
        std::fs::create_dir_all(root.path().join("outside")).unwrap();
        let payload = r#"{"slowest_tests": [], "results": ["r"], "test_total": 5}"#;
        std::fs::write(output_dir.join("a/output.json"), payload).unwrap();
        std::fs::write(root.path().join("outside/output.json"), payload).unwrap();
        write_summary(
            &output_dir,
            r#"{"shards": [{"task_id": "a", "exit_code": 0}, {"task_id": "../outside", "exit_code": 0}]}"#,
        );

        let mut sink = WarningSink::new();
        let shards = read_shards_info(&output_dir, &mut sink).unwrap();
        assert_eq!(shards, vec![Some(ShardDescriptor::new("a", 0)), None]);

        let merged =
            crate::merge::merge_shard_results(&output_dir, Some(shards.as_slice()), 10, &mut sink);
        assert_eq!(merged.test_total, 5);
        assert_eq!(sink.warnings()[0].title(), "some shards did not complete: 1");
    }

    #[test]
    fn missing_file_is_a_warning_and_no_info() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = WarningSink::new();
        assert_eq!(read_shards_info(dir.path(), &mut sink), None);
        assert_eq!(sink.len(), 1);
        assert_eq!(
            sink.warnings()[0].title(),
            CollectErrorKind::SummaryUnavailable.warning_title()
        );
        assert_eq!(sink.warnings()[0].detail(), SUMMARY_UNAVAILABLE_DETAIL);
    }

    #[test]
    fn corrupt_json_is_summary_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        write_summary(dir.path(), "{not json");
        let err = read_summary(dir.path()).unwrap_err();
        assert_eq!(err.kind(), CollectErrorKind::SummaryUnavailable);
    }

    #[test]
    fn missing_shards_key_is_summary_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        write_summary(dir.path(), r#"{"tasks": []}"#);
        let mut sink = WarningSink::new();
        assert_eq!(read_shards_info(dir.path(), &mut sink), None);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn zero_shards_is_not_the_same_as_no_info() {
        let dir = tempfile::tempdir().unwrap();
        write_summary(dir.path(), r#"{"shards": []}"#);
        let mut sink = WarningSink::new();
        assert_eq!(read_shards_info(dir.path(), &mut sink), Some(vec![]));
        assert!(sink.is_empty());
    }
}
