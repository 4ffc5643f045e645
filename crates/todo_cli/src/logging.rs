use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming, default_format,
    detailed_format,
};
use std::path::PathBuf;

pub const LOG_ENV_VAR: &str = "TODOAPP_LOG";
pub const LOG_DIR_ENV_VAR: &str = "TODOAPP_LOG_DIR";
pub const LOG_FILE_BASENAME: &str = "todo";
pub const LOG_ROTATE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
pub const LOG_ROTATE_KEEP_FILES: usize = 5;

const DEFAULT_SPEC: &str = "warn";

/// Picks the level spec: `TODOAPP_LOG`, then `RUST_LOG`, then `warn`.
pub fn resolve_log_spec(app_spec: Option<String>, rust_log: Option<String>) -> String {
    app_spec
        .filter(|value| !value.trim().is_empty())
        .or_else(|| rust_log.filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_SPEC.to_string())
}

fn log_dir() -> Option<PathBuf> {
    std::env::var(LOG_DIR_ENV_VAR)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

/// Logs go to stderr, or to rotating files when `TODOAPP_LOG_DIR` is set.
pub fn init_logging() -> Result<LoggerHandle, FlexiLoggerError> {
    let spec = resolve_log_spec(
        std::env::var(LOG_ENV_VAR).ok(),
        std::env::var("RUST_LOG").ok(),
    );

    let logger = Logger::try_with_str(&spec)?;
    let logger = match log_dir() {
        Some(dir) => logger
            .log_to_file(FileSpec::default().directory(dir).basename(LOG_FILE_BASENAME))
            .format_for_files(detailed_format)
            .rotate(
                Criterion::Size(LOG_ROTATE_SIZE_BYTES),
                Naming::Numbers,
                Cleanup::KeepLogFiles(LOG_ROTATE_KEEP_FILES),
            ),
        None => logger.log_to_stderr().format(default_format),
    };

    let handle = logger.start()?;
    log::debug!("logger initialized spec={spec}");
    Ok(handle)
}
