use env_logger::Env;

/// Install an `env_logger` backend for the `log` facade.
///
/// `RUST_LOG` overrides the default `info` filter. Safe to call more than
/// once; only the first call installs a logger.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}
