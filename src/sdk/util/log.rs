use env_logger::{Builder, Env};

const DEFAULT_FILTER: &str = "info";

/// Logs go to stderr, filtered by `RUST_LOG` (info by default).
pub fn init_logging() {
    Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER))
        .format_timestamp_secs()
        .format_module_path(false)
        .init();
}

/// Same as [`init_logging`], but tolerates an already installed logger (tests).
pub fn try_init_logging() {
    Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER))
        .format_timestamp_secs()
        .format_module_path(false)
        .is_test(true)
        .try_init()
        .ok();
}
