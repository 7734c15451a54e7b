//! Log setup.
//!
//! The terminal belongs to the UI, so logs only go to a file. Filtering follows `RUST_LOG`
//! (default `info`), e.g. `RUST_LOG=codebug_editor=debug` to watch the request lifecycle.

use anyhow::{Context, Result};
use std::panic::{self, PanicHookInfo};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize file logging. Returns the writer guard, which must live until exit; `None` when
/// no log file was requested.
pub fn init(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let Some(path) = log_file else {
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .with_context(|| format!("log file path has no file name: {}", path.display()))?;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init()
        .context("failed to install tracing subscriber")?;

    tracing::info!(path = %path.display(), "logging initialized");
    Ok(Some(guard))
}

type PanicHook = Box<dyn Fn(&PanicHookInfo<'_>) + Sync + Send + 'static>;

/// Sends panic reports to the log instead of stderr until dropped, then restores the
/// previous hook. Held while the terminal is in raw mode, where stderr output would land on
/// the alternate screen.
pub struct PanicToLog {
    previous: Option<PanicHook>,
}

impl PanicToLog {
    pub fn install() -> Self {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(|info| {
            tracing::error!(%info, "panic");
        }));
        Self {
            previous: Some(previous),
        }
    }
}

impl Drop for PanicToLog {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            panic::set_hook(previous);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fail(message: &str) {
        panic!("{message}");
    }

    #[test]
    fn test_panic_hook_is_swapped_and_restored() {
        let reported = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&reported);
        panic::set_hook(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        {
            let _quiet = PanicToLog::install();
            let _ = panic::catch_unwind(|| fail("inside raw mode"));
        }
        assert_eq!(reported.load(Ordering::SeqCst), 0);

        let _ = panic::catch_unwind(|| fail("after restore"));
        assert_eq!(reported.load(Ordering::SeqCst), 1);

        let _ = panic::take_hook();
    }
}
