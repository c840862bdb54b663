use crate::cli::args::Cli;
use shardmerge_core::{Collector, CoverageOptions, SancovMerger, SwarmingLauncher};

/// Build the collector from the command line and run it. Returns the task
/// launcher's exit code.
pub fn run(cli: Cli) -> i32 {
    let options = cli.collect_options();
    let launcher = SwarmingLauncher::new(cli.launcher, cli.launcher_args);

    let mut collector = Collector::new(options, Box::new(launcher));
    if let (Some(coverage_dir), Some(tool)) = (cli.coverage_dir, cli.sancov_merger) {
        collector = collector.with_coverage(CoverageOptions {
            coverage_dir,
            merger: Box::new(SancovMerger::new(tool)),
        });
    }

    let code = collector.run();
    tracing::debug!(exit_code = code, "collection finished");
    code
}
