use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Install the stderr subscriber. `RUST_LOG` wins over the `-v` count.
pub fn init(verbosity: u8) {
    TRACING_INIT.call_once(|| {
        let default_directive = match verbosity {
            0 => "warn",
            1 => "info",
            _ => "debug",
        };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive));

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    });
}
