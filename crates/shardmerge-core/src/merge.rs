//! Shard merge loop: classify every shard, aggregate the usable ones.

use std::collections::BTreeSet;
use std::path::Path;

use crate::aggregate::AggregatedResults;
use crate::bad_shards::BadShards;
use crate::loader::load_shard_json;
use crate::model::{MergedOutput, ShardDescriptor, SHARD_OUTPUT_FILE, UNRELIABLE_RESULTS};
use crate::warnings::WarningSink;

pub const NO_SHARDS_TITLE: &str = "no shards were reported in summary.json";

/// Merge all shard outputs under `output_dir`.
///
/// `shards == None` means the summary was unavailable. Whatever happens, the
/// returned document has every field a caller expects.
pub fn merge_shard_results(
    output_dir: &Path,
    shards: Option<&[Option<ShardDescriptor>]>,
    slow_tests_cutoff: usize,
    sink: &mut WarningSink,
) -> MergedOutput {
    let Some(shards) = shards else {
        return MergedOutput::unreliable_empty();
    };
    if shards.is_empty() {
        sink.emit_title(NO_SHARDS_TITLE);
        return MergedOutput::unreliable_empty();
    }

    let mut tags = BTreeSet::new();
    let mut aggregated = AggregatedResults::new(slow_tests_cutoff);
    let mut bad_shards = BadShards::new();

    for (index, shard) in shards.iter().enumerate() {
        if let Some(shard) = shard {
            if shard.is_incomplete() {
                // A worker that got SIGTERM still flushes valid JSON before
                // exiting nonzero, so the payload is loaded anyway.
                tracing::info!(shard = index, exit_code = shard.exit_code, "shard exited abnormally");
                bad_shards.add_incomplete(index);
            }
            if let Some(payload) = load_shard_json(output_dir, &shard.task_id, SHARD_OUTPUT_FILE) {
                tracing::debug!(shard = index, task_id = %shard.task_id, tests = payload.test_total, "merged shard");
                aggregated.append(payload);
                continue;
            }
        }
        bad_shards.add_missing(index);
    }

    if bad_shards.not_empty() {
        tags.insert(UNRELIABLE_RESULTS.to_string());
        sink.emit(bad_shards.warning_title(), bad_shards.warning_detail());
    }

    if bad_shards.missing_count() == shards.len() {
        return MergedOutput::unreliable_empty();
    }

    aggregated.as_json(&tags)
}
