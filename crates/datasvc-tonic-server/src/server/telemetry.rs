//! Log subscriber setup.
//!
//! Installs a `tracing_subscriber` registry with an `EnvFilter` (driven
//! by `RUST_LOG`, defaulting to `info`) and a human-readable fmt layer.
//! Metrics are deliberately not routed through tracing: the service
//! exposes them in the Prometheus text format instead (see
//! [`crate::server::metrics`]).

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true)
                .pretty(),
        )
        .init();
}
