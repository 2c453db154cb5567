use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Env var naming a log file. When unset, logs go to stderr.
pub const LOG_FILE_ENV: &str = "CLAUDE_SWITCH_LOG";

/// Initialize tracing.
///
/// The filter comes from `RUST_LOG` (default `warn`, or `debug` with
/// `verbose`). Set `CLAUDE_SWITCH_LOG` to a file path to log there instead
/// of stderr; the file name gets the pid appended so parallel runs do not
/// clobber each other.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if let Some(log_path) = std::env::var(LOG_FILE_ENV).ok().filter(|p| !p.is_empty()) {
        let unique_path = format!("{}.{}", log_path, std::process::id());
        match std::fs::File::create(&unique_path) {
            Ok(file) => {
                let file_layer = fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_level(true);
                tracing_subscriber::registry()
                    .with(filter)
                    .with(file_layer)
                    .init();
                return;
            }
            Err(e) => eprintln!("Warning: failed to create log file {}: {}", unique_path, e),
        }
    }

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339());
    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .init();
}
