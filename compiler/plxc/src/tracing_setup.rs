use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static SUBSCRIBER: Once = Once::new();

/// Install the stderr log subscriber, once per process.
///
/// Silent unless `RUST_LOG` holds a valid filter, e.g.
/// `RUST_LOG=plx_lexer_core=trace` for every quote-engine transition or
/// `RUST_LOG=plxc=debug` for file discovery and pool sizing.
pub fn init_tracing() {
    SUBSCRIBER.call_once(|| {
        let Ok(filter) = EnvFilter::try_from_default_env() else {
            return;
        };
        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .without_time()
            .with_target(true);
        tracing_subscriber::registry().with(layer).with(filter).init();
    });
}
