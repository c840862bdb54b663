//! On-disk data model: launcher summary, per-shard output and merged output.

use std::path::{Component, Path};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Tag added to the merged output when any shard is missing or incomplete.
pub const UNRELIABLE_RESULTS: &str = "UNRELIABLE_RESULTS";

/// Default number of entries kept in the merged `slowest_tests` list.
pub const DEFAULT_SLOW_TESTS_CUTOFF: usize = 100;

/// Name of the summary file the launcher writes into the output directory.
pub const SUMMARY_FILE: &str = "summary.json";

/// Name of the per-shard result file inside `<output_dir>/<task_id>/`.
pub const SHARD_OUTPUT_FILE: &str = "output.json";

/// Serde helpers: the launcher has emitted `exit_code` both as a number and as
/// a decimal string over time; null or absent means success.
mod serde_exit_code {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn deserialize<'de, D>(d: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v: Option<Value> = Option::deserialize(d)?;
        match v {
            None | Some(Value::Null) => Ok(0),
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .ok_or_else(|| serde::de::Error::custom("exit_code out of range")),
            Some(Value::String(s)) => s
                .trim()
                .parse::<i64>()
                .map_err(serde::de::Error::custom),
            Some(Value::Bool(b)) => Ok(i64::from(b)),
            Some(other) => Err(serde::de::Error::custom(format!(
                "exit_code must be a number or string, got: {other}"
            ))),
        }
    }
}

/// One entry of the summary's `shards` list. Its position is the shard index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShardDescriptor {
    /// Subdirectory of the output dir holding this shard's files.
    pub task_id: String,

    /// Nonzero when the worker terminated abnormally.
    #[serde(default, deserialize_with = "serde_exit_code::deserialize")]
    pub exit_code: i64,
}

impl ShardDescriptor {
    pub fn new(task_id: impl Into<String>, exit_code: i64) -> Self {
        Self {
            task_id: task_id.into(),
            exit_code,
        }
    }

    /// Decode one raw summary entry. `null` and entries without a usable
    /// `task_id` have no descriptor. A task id must name a single directory
    /// inside the output dir.
    pub fn from_entry(entry: &Value) -> Option<Self> {
        if entry.is_null() {
            return None;
        }
        match Self::deserialize(entry) {
            Ok(descriptor) if is_plain_component(&descriptor.task_id) => Some(descriptor),
            Ok(descriptor) => {
                tracing::warn!(task_id = %descriptor.task_id, "shard task id is not a plain directory name");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "unusable shard entry in summary");
                None
            }
        }
    }

    pub fn is_incomplete(&self) -> bool {
        self.exit_code != 0
    }
}

fn is_plain_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// An entry of a `slowest_tests` list. Only `duration` is interpreted; the
/// object is written back exactly as read, key order included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct SlowTest {
    fields: Map<String, Value>,
}

impl SlowTest {
    pub fn new(name: &str, duration: impl Into<Number>) -> Self {
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::String(name.to_string()));
        fields.insert("duration".to_string(), Value::Number(duration.into()));
        Self { fields }
    }

    pub fn duration_secs(&self) -> f64 {
        self.fields
            .get("duration")
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }

    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }
}

impl TryFrom<Map<String, Value>> for SlowTest {
    type Error = String;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        match fields.get("duration") {
            Some(Value::Number(_)) => Ok(Self { fields }),
            Some(other) => Err(format!("slow test duration must be a number, got: {other}")),
            None => Err("slow test entry has no duration".to_string()),
        }
    }
}

impl From<SlowTest> for Map<String, Value> {
    fn from(test: SlowTest) -> Self {
        test.fields
    }
}

/// Parsed content of one shard's `output.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShardPayload {
    pub slowest_tests: Vec<SlowTest>,
    pub results: Vec<Value>,
    pub test_total: u64,
}

/// The merged document handed back to the calling CI step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedOutput {
    pub slowest_tests: Vec<SlowTest>,
    pub results: Vec<Value>,
    /// Sorted, deduplicated.
    pub tags: Vec<String>,
    pub test_total: u64,
}

impl MergedOutput {
    /// Well-formed document for runs where nothing usable came back.
    pub fn unreliable_empty() -> Self {
        Self {
            slowest_tests: Vec::new(),
            results: Vec::new(),
            tags: vec![UNRELIABLE_RESULTS.to_string()],
            test_total: 0,
        }
    }

    /// Compact encoding for downstream parsers.
    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn exit_code_accepts_number_string_and_null() {
        let d = ShardDescriptor::from_entry(&json!({"task_id": "a", "exit_code": 1})).unwrap();
        assert!(d.is_incomplete());

        let d = ShardDescriptor::from_entry(&json!({"task_id": "b", "exit_code": "0"})).unwrap();
        assert!(!d.is_incomplete());

        let d = ShardDescriptor::from_entry(&json!({"task_id": "c", "exit_code": null})).unwrap();
        assert_eq!(d.exit_code, 0);

        let d = ShardDescriptor::from_entry(&json!({"task_id": "d"})).unwrap();
        assert_eq!(d, ShardDescriptor::new("d", 0));
    }

    #[test]
    fn unusable_entries_have_no_descriptor() {
        assert_eq!(ShardDescriptor::from_entry(&Value::Null), None);
        assert_eq!(ShardDescriptor::from_entry(&json!({"exit_code": 0})), None);
        assert_eq!(ShardDescriptor::from_entry(&json!("a")), None);
        assert_eq!(
            ShardDescriptor::from_entry(&json!({"task_id": "x", "exit_code": "boom"})),
            None
        );
    }

    #[test]
    fn task_ids_outside_the_output_dir_are_rejected() {
        for task_id in ["../escape", "/etc", "a/b", "..", ".", ""] {
            assert_eq!(
                ShardDescriptor::from_entry(&json!({"task_id": task_id, "exit_code": 0})),
                None,
                "{task_id:?}"
            );
        }
        assert!(ShardDescriptor::from_entry(&json!({"task_id": "4f1e2a", "exit_code": 0})).is_some());
    }

    #[test]
    fn slow_test_keeps_unknown_keys() {
        let t: SlowTest =
            serde_json::from_value(json!({"name": "mjsunit/foo", "duration": 12, "flags": ["--x"]}))
                .unwrap();
        assert_eq!(t.name(), Some("mjsunit/foo"));
        assert_eq!(t.duration_secs(), 12.0);
        let back = serde_json::to_value(&t).unwrap();
        assert_eq!(back["flags"], json!(["--x"]));
        assert_eq!(back["duration"], json!(12));
    }

    #[test]
    fn records_keep_their_key_order() {
        let payload: ShardPayload = serde_json::from_str(
            r#"{"slowest_tests": [{"name": "z", "duration": 1}], "results": [{"zeta": 1, "alpha": 2}], "test_total": 1}"#,
        )
        .unwrap();
        let mut merged = MergedOutput::unreliable_empty();
        merged.slowest_tests = payload.slowest_tests;
        merged.results = payload.results;
        let text = String::from_utf8(merged.to_json_bytes().unwrap()).unwrap();
        assert!(text.contains(r#""slowest_tests":[{"name":"z","duration":1}]"#), "{text}");
        assert!(text.contains(r#""results":[{"zeta":1,"alpha":2}]"#), "{text}");
    }

    #[test]
    fn slow_test_without_numeric_duration_is_rejected() {
        assert!(serde_json::from_value::<SlowTest>(json!({"name": "a"})).is_err());
        assert!(serde_json::from_value::<SlowTest>(json!({"name": "a", "duration": "1"})).is_err());
    }

    #[test]
    fn payload_requires_all_fields() {
        let ok = serde_json::from_value::<ShardPayload>(
            json!({"slowest_tests": [], "results": [1, 2], "test_total": 2}),
        );
        assert!(ok.is_ok());
        let missing_total =
            serde_json::from_value::<ShardPayload>(json!({"slowest_tests": [], "results": []}));
        assert!(missing_total.is_err());
    }

    #[test]
    fn merged_output_is_compact_with_fixed_key_order() {
        let bytes = MergedOutput::unreliable_empty().to_json_bytes().unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"slowest_tests":[],"results":[],"tags":["UNRELIABLE_RESULTS"],"test_total":0}"#
        );
    }
}
