use tracing_subscriber::EnvFilter;

/// Log to stderr. `RUST_LOG` wins; otherwise `info`, or `debug` with `--verbose`.
pub fn init(verbose: bool) -> anyhow::Result<()> {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}
