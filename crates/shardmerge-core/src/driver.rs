//! Top-level orchestration: `LAUNCH -> PROCESS -> FINALIZE`.
//!
//! The launcher's exit code is the only thing that decides success. Merging
//! runs even when the launcher failed, and both output files are written on
//! every path, including a panic while merging.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Once;

use tempfile::TempDir;

use crate::coverage::{merge_coverage_data, CoverageMerger};
use crate::errors::{CollectError, CollectErrorKind, CollectResult};
use crate::launcher::TaskLauncher;
use crate::loader::log_output_dir_contents;
use crate::merge::merge_shard_results;
use crate::model::{MergedOutput, DEFAULT_SLOW_TESTS_CUTOFF};
use crate::summary::{read_shards_info, ShardsInfo};
use crate::warnings::WarningSink;

/// Exit code when the launcher never ran.
pub const LAUNCH_FAILURE: i32 = 1;

const TEMP_DIR_SUFFIX: &str = "_swarming";

pub const PROCESSING_FAILED_TITLE: &str = "failed to process shard output JSON";

thread_local! {
    static CAPTURING_PANICS: Cell<bool> = const { Cell::new(false) };
    static PANIC_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Parent of the per-run temporary output directory.
    pub temp_root_dir: PathBuf,
    pub merged_test_output: PathBuf,
    pub warnings_json: PathBuf,
    pub slow_tests_cutoff: usize,
}

impl CollectOptions {
    pub fn new(merged_test_output: impl Into<PathBuf>, warnings_json: impl Into<PathBuf>) -> Self {
        Self {
            temp_root_dir: std::env::temp_dir(),
            merged_test_output: merged_test_output.into(),
            warnings_json: warnings_json.into(),
            slow_tests_cutoff: DEFAULT_SLOW_TESTS_CUTOFF,
        }
    }
}

pub struct CoverageOptions {
    pub coverage_dir: PathBuf,
    pub merger: Box<dyn CoverageMerger>,
}

pub struct Collector {
    options: CollectOptions,
    launcher: Box<dyn TaskLauncher>,
    coverage: Option<CoverageOptions>,
}

impl Collector {
    pub fn new(options: CollectOptions, launcher: Box<dyn TaskLauncher>) -> Self {
        Self {
            options,
            launcher,
            coverage: None,
        }
    }

    pub fn with_coverage(mut self, coverage: CoverageOptions) -> Self {
        self.coverage = Some(coverage);
        self
    }

    /// Run one collection and return the launcher's exit code.
    pub fn run(&self) -> i32 {
        let mut sink = WarningSink::new();

        let output_dir = match self.create_output_dir() {
            Ok(dir) => dir,
            Err(e) => {
                report(&mut sink, &e);
                self.finalize(None, sink, None);
                return LAUNCH_FAILURE;
            }
        };

        let exit_code = self.launch(output_dir.path(), &mut sink);
        let merged = self.process(output_dir.path(), &mut sink);
        self.finalize(merged, sink, Some(output_dir));
        exit_code
    }

    fn create_output_dir(&self) -> CollectResult<TempDir> {
        tempfile::Builder::new()
            .prefix("shardmerge_")
            .suffix(TEMP_DIR_SUFFIX)
            .tempdir_in(&self.options.temp_root_dir)
            .map_err(|source| CollectError::OutputDir {
                parent: self.options.temp_root_dir.clone(),
                source,
            })
    }

    fn launch(&self, output_dir: &Path, sink: &mut WarningSink) -> i32 {
        tracing::debug!(output_dir = %output_dir.display(), "using task output dir");
        match self.launcher.launch(output_dir) {
            Ok(code) => code,
            Err(e) => {
                report(sink, &e);
                LAUNCH_FAILURE
            }
        }
    }

    /// Merge shard output, then coverage. Each step is isolated: a panic in
    /// one becomes a warning and does not prevent the next.
    fn process(&self, output_dir: &Path, sink: &mut WarningSink) -> Option<MergedOutput> {
        log_output_dir_contents(output_dir);

        let mut shards: Option<ShardsInfo> = None;
        let merged = guarded(sink, PROCESSING_FAILED_TITLE, |sink| {
            shards = read_shards_info(output_dir, sink);
            merge_shard_results(
                output_dir,
                shards.as_deref(),
                self.options.slow_tests_cutoff,
                sink,
            )
        });

        if let Some(coverage) = &self.coverage {
            match shards.as_deref() {
                Some(shards) => {
                    guarded(sink, CollectErrorKind::CoverageMergeFailure.warning_title(), |sink| {
                        merge_coverage_data(
                            coverage.merger.as_ref(),
                            &coverage.coverage_dir,
                            output_dir,
                            shards,
                            sink,
                        )
                    });
                }
                None => tracing::info!("no shard information, skipping coverage merge"),
            }
        }

        merged
    }

    fn finalize(&self, merged: Option<MergedOutput>, mut sink: WarningSink, output_dir: Option<TempDir>) {
        let merged = merged.unwrap_or_else(MergedOutput::unreliable_empty);
        if let Err(e) = write_merged(&self.options.merged_test_output, &merged) {
            report(&mut sink, &e);
        }

        if let Err(e) = sink.write_json(&self.options.warnings_json) {
            tracing::error!(error = %e, "warnings not written");
        }

        if let Some(dir) = output_dir {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                tracing::debug!(path = %path.display(), error = %e, "ignoring failure to remove task output dir");
            }
        }
    }
}

fn write_merged(path: &Path, merged: &MergedOutput) -> CollectResult<()> {
    let bytes = merged.to_json_bytes().map_err(|e| {
        CollectError::io("failed to encode merged output", path, std::io::Error::other(e))
    })?;
    std::fs::write(path, bytes).map_err(|e| CollectError::io("failed to write merged output", path, e))
}

/// Record an error as a warning titled by its kind.
fn report(sink: &mut WarningSink, err: &CollectError) {
    let kind = err.kind();
    tracing::error!(?kind, error = %err, "{}", kind.warning_title());
    sink.emit(kind.warning_title(), err.to_string());
}

/// Chain a panic hook that, on threads inside [`guarded`], stores the panic
/// location and a backtrace instead of printing them. Other threads keep the
/// previous hook.
fn install_panic_recorder() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if !CAPTURING_PANICS.with(Cell::get) {
                previous(info);
                return;
            }
            let location = info
                .location()
                .map_or_else(|| "<unknown>".to_string(), ToString::to_string);
            let trace = format!("panicked at {location}\n{}", Backtrace::force_capture());
            PANIC_TRACE.with(|slot| *slot.borrow_mut() = Some(trace));
        }));
    });
}

/// Run `f`, turning a panic into a warning titled `title` whose detail is the
/// panic message followed by its location and backtrace.
fn guarded<T>(
    sink: &mut WarningSink,
    title: &str,
    f: impl FnOnce(&mut WarningSink) -> T,
) -> Option<T> {
    install_panic_recorder();
    let was_capturing = CAPTURING_PANICS.with(|c| c.replace(true));
    let result = catch_unwind(AssertUnwindSafe(|| f(&mut *sink)));
    CAPTURING_PANICS.with(|c| c.set(was_capturing));

    match result {
        Ok(value) => Some(value),
        Err(payload) => {
            let mut detail = panic_message(payload.as_ref());
            if let Some(trace) = PANIC_TRACE.with(|slot| slot.borrow_mut().take()) {
                detail.push('\n');
                detail.push_str(&trace);
            }
            tracing::error!(%detail, "{title}");
            sink.emit(title, detail);
            None
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
