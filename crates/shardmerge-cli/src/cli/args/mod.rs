use clap::Parser;
use shardmerge_core::{CollectOptions, SwarmingLauncher, DEFAULT_SLOW_TESTS_CUTOFF};
use std::path::PathBuf;

#[cfg(test)]
mod tests;

/// Everything before a literal `--` is for shardmerge; everything after it is
/// passed to the task launcher verbatim.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "shardmerge",
    version,
    about = "Run a sharded test task and merge the per-shard JSON results",
    after_help = "Example:\n  shardmerge --merged-test-output out.json --warnings-json warnings.json -- collect -server https://swarming.example.com -requests-json tasks.json"
)]
pub struct Cli {
    /// Directory in which the per-run task output directory is created
    /// [default: system temp dir]
    #[arg(long, value_name = "DIR")]
    pub temp_root_dir: Option<PathBuf>,

    /// Where to write the merged test results (JSON)
    #[arg(long, value_name = "PATH")]
    pub merged_test_output: PathBuf,

    /// Where to write the list of [title, detail] warnings (JSON)
    #[arg(long, value_name = "PATH")]
    pub warnings_json: PathBuf,

    /// Number of entries kept in the merged slowest_tests list
    #[arg(long, default_value_t = DEFAULT_SLOW_TESTS_CUTOFF)]
    pub slow_tests_cutoff: usize,

    /// Merge per-shard coverage data into this directory
    #[arg(long, value_name = "DIR", requires = "sancov_merger")]
    pub coverage_dir: Option<PathBuf>,

    /// Coverage merge tool, invoked once per shard
    #[arg(long, value_name = "PATH")]
    pub sancov_merger: Option<PathBuf>,

    /// Task launcher program
    #[arg(long, env = "SHARDMERGE_LAUNCHER", default_value = SwarmingLauncher::DEFAULT_PROGRAM)]
    pub launcher: String,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    pub verbose: bool,

    /// Arguments for the task launcher (after `--`)
    #[arg(last = true, allow_hyphen_values = true, value_name = "LAUNCHER_ARGS")]
    pub launcher_args: Vec<String>,
}

impl Cli {
    pub fn collect_options(&self) -> CollectOptions {
        let mut options =
            CollectOptions::new(self.merged_test_output.clone(), self.warnings_json.clone());
        if let Some(root) = &self.temp_root_dir {
            options.temp_root_dir = root.clone();
        }
        options.slow_tests_cutoff = self.slow_tests_cutoff;
        options
    }
}
