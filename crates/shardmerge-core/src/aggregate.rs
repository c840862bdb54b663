//! Running merge of shard payloads into the final document.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::model::{MergedOutput, ShardPayload, SlowTest};

/// Running merge of shard payloads. Shards must be appended in ascending
/// index order so that ties in `slowest_tests` resolve the same way every run.
#[derive(Debug, Clone)]
pub struct AggregatedResults {
    slowest_tests: Vec<SlowTest>,
    results: Vec<Value>,
    test_total: u64,
    slow_tests_cutoff: usize,
}

impl AggregatedResults {
    pub fn new(slow_tests_cutoff: usize) -> Self {
        Self {
            slowest_tests: Vec::new(),
            results: Vec::new(),
            test_total: 0,
            slow_tests_cutoff,
        }
    }

    pub fn append(&mut self, payload: ShardPayload) {
        self.slowest_tests.extend(payload.slowest_tests);
        self.results.extend(payload.results);
        self.test_total = self.test_total.saturating_add(payload.test_total);
    }

    pub fn test_total(&self) -> u64 {
        self.test_total
    }

    pub fn as_json(self, tags: &BTreeSet<String>) -> MergedOutput {
        let mut slowest_tests = self.slowest_tests;
        // sort_by is stable: equal durations keep append order.
        slowest_tests.sort_by(|a, b| b.duration_secs().total_cmp(&a.duration_secs()));
        slowest_tests.truncate(self.slow_tests_cutoff);

        MergedOutput {
            slowest_tests,
            results: self.results,
            tags: tags.iter().cloned().collect(),
            test_total: self.test_total,
        }
    }
}
