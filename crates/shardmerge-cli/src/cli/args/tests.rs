use super::*;
use clap::CommandFactory;
use clap::Parser;

const REQUIRED: [&str; 5] = [
    "shardmerge",
    "--merged-test-output",
    "merged.json",
    "--warnings-json",
    "warnings.json",
];

fn parse(extra: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(REQUIRED.iter().chain(extra.iter()).copied())
}

#[test]
fn cli_debug_assert() {
    Cli::command().debug_assert();
}

#[test]
fn parses_with_defaults() {
    let cli = parse(&[]).expect("parse should succeed");
    assert_eq!(cli.slow_tests_cutoff, 100);
    assert_eq!(cli.temp_root_dir, None);
    assert_eq!(cli.coverage_dir, None);
    assert!(cli.launcher_args.is_empty());

    let options = cli.collect_options();
    assert_eq!(options.temp_root_dir, std::env::temp_dir());
    assert_eq!(options.merged_test_output, PathBuf::from("merged.json"));
    assert_eq!(options.warnings_json, PathBuf::from("warnings.json"));
}

#[test]
fn everything_after_double_dash_goes_to_the_launcher() {
    let cli = parse(&[
        "--slow-tests-cutoff",
        "7",
        "--temp-root-dir",
        "/scratch",
        "--",
        "collect",
        "-server",
        "https://example.com",
        "--merged-test-output",
        "not-ours.json",
    ])
    .expect("parse should succeed");

    assert_eq!(cli.slow_tests_cutoff, 7);
    assert_eq!(cli.merged_test_output, PathBuf::from("merged.json"));
    assert_eq!(
        cli.launcher_args,
        vec![
            "collect",
            "-server",
            "https://example.com",
            "--merged-test-output",
            "not-ours.json",
        ]
    );
    assert_eq!(cli.collect_options().temp_root_dir, PathBuf::from("/scratch"));
}

#[test]
fn coverage_dir_requires_sancov_merger() {
    let err = parse(&["--coverage-dir", "cov"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

    let cli = parse(&["--coverage-dir", "cov", "--sancov-merger", "merge.py"])
        .expect("parse should succeed");
    assert_eq!(cli.coverage_dir, Some(PathBuf::from("cov")));
    assert_eq!(cli.sancov_merger, Some(PathBuf::from("merge.py")));
}

#[test]
fn sancov_merger_alone_is_accepted() {
    let cli = parse(&["--sancov-merger", "merge.py"]).expect("parse should succeed");
    assert_eq!(cli.coverage_dir, None);
}

#[test]
fn unexpected_positional_arguments_are_rejected() {
    assert!(parse(&["stray"]).is_err());
}

#[test]
fn output_paths_are_required() {
    assert!(Cli::try_parse_from(["shardmerge", "--warnings-json", "w.json"]).is_err());
    assert!(Cli::try_parse_from(["shardmerge", "--merged-test-output", "m.json"]).is_err());
}

#[test]
fn cutoff_must_be_a_number() {
    assert!(parse(&["--slow-tests-cutoff", "many"]).is_err());
}
