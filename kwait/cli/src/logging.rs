use tracing_subscriber::{EnvFilter, fmt};

/// Installs the fmt subscriber. `RUST_LOG` wins over `debug` when set.
pub fn init_tracing(debug: bool) {
    let fallback = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}
