//! Classification of shards that did not deliver a complete result.

/// Explanation attached to the "some shards did not complete" warning.
/// `{shards}` is replaced by the rendered shard list.
const MISSING_SHARDS_MSG: &str = "Missing results from the following shard(s): {shards}

It can happen in following cases:
  * Test failed to start (missing *.dll/*.so dependency for example)
  * Test crashed or hung
  * Task expired because there are not enough bots available and are all used
  * Swarming service experiences problems

Please examine logs to figure out what happened.
";

/// Missing and incomplete shard indices for one run.
///
/// - missing: no descriptor, or `output.json` absent / empty / corrupt
/// - incomplete: nonzero exit code but the payload still loaded
///
/// An index is never in both lists.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BadShards {
    missing: Vec<usize>,
    incomplete: Vec<usize>,
}

impl BadShards {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_incomplete(&mut self, shard: usize) {
        if !self.incomplete.contains(&shard) {
            self.incomplete.push(shard);
        }
    }

    /// Record `shard` as missing. A shard previously recorded incomplete is
    /// moved over, so it is only counted once.
    pub fn add_missing(&mut self, shard: usize) {
        self.incomplete.retain(|&i| i != shard);
        if !self.missing.contains(&shard) {
            self.missing.push(shard);
        }
    }

    pub fn missing(&self) -> &[usize] {
        &self.missing
    }

    pub fn incomplete(&self) -> &[usize] {
        &self.incomplete
    }

    pub fn not_empty(&self) -> bool {
        !self.missing.is_empty() || !self.incomplete.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        self.missing.len()
    }

    /// Sorted union of both lists, comma separated.
    pub fn as_str(&self) -> String {
        let mut all: Vec<usize> = self
            .missing
            .iter()
            .chain(self.incomplete.iter())
            .copied()
            .collect();
        all.sort_unstable();
        all.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn warning_title(&self) -> String {
        format!("some shards did not complete: {}", self.as_str())
    }

    pub fn warning_detail(&self) -> String {
        MISSING_SHARDS_MSG.replace("{shards}", &self.as_str())
    }
}
