//! Shard result collection for sharded test tasks.
//!
//! A test task is fanned out by an external task launcher to N worker shards.
//! Each shard writes `<task_id>/output.json` into a shared output directory and
//! the launcher writes a `summary.json` describing every shard. This crate turns
//! that directory into:
//!
//! - one merged result document (concatenated results, top-N slowest tests,
//!   summed test count, reliability tags)
//! - a list of `(title, detail)` warnings for the calling CI step
//! - the launcher's exit code, untouched by anything that happens while merging
//!
//! # Pipeline
//!
//! ```text
//! Collector::run
//!   LAUNCH    TaskLauncher::launch            -> exit code
//!   PROCESS   summary::read_shards_info        -> Option<Vec<Option<ShardDescriptor>>>
//!             merge::merge_shard_results       -> MergedOutput
//!             coverage::merge_coverage_data    -> warnings only
//!   FINALIZE  write merged JSON, write warnings JSON, drop temp dir
//! ```
//!
//! Only the launcher's exit code decides success. Missing shards, corrupt JSON,
//! failed coverage merges and even panics while merging are downgraded to
//! warnings.

pub mod aggregate;
pub mod bad_shards;
pub mod coverage;
pub mod driver;
pub mod errors;
pub mod launcher;
pub mod loader;
pub mod merge;
pub mod model;
pub mod summary;
pub mod warnings;

pub use aggregate::AggregatedResults;
pub use bad_shards::BadShards;
pub use coverage::{CoverageMerger, SancovMerger};
pub use driver::{CollectOptions, Collector, CoverageOptions, LAUNCH_FAILURE};
pub use errors::{CollectError, CollectErrorKind};
pub use launcher::{SwarmingLauncher, TaskLauncher};
pub use merge::merge_shard_results;
pub use model::{
    MergedOutput, ShardDescriptor, ShardPayload, SlowTest, DEFAULT_SLOW_TESTS_CUTOFF,
    UNRELIABLE_RESULTS,
};
pub use warnings::{Warning, WarningSink};
