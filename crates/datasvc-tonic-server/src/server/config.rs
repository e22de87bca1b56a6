//! Configuration for the data service binary.
//!
//! Arguments are parsed from the command line and the environment via
//! `clap`, then validated into a [`ServerConfig`]. The documented
//! configuration surface is the listening ports; the remaining knobs
//! (transform, label opt-in, drain timeout) keep their reference
//! defaults unless explicitly overridden.

use crate::server::transform::TransformKind;
use core::time::Duration;
use std::net::SocketAddr;

use clap::Parser;

/// Command-line and environment arguments.
#[derive(Parser, Debug)]
#[command(name = "datasvc-tonic-server", about = "gRPC string data service")]
pub struct CliArgs {
    /// Host address for both listening endpoints.
    #[arg(long, env = "DATASVC_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port for the gRPC endpoint.
    #[arg(long, env = "DATASVC_PORT", default_value_t = 1111)]
    pub port: u16,

    /// Port for the Prometheus exposition endpoint.
    #[arg(long, env = "DATASVC_METRICS_PORT", default_value_t = 9092)]
    pub metrics_port: u16,

    /// Transform applied to request payloads.
    #[arg(long, env = "DATASVC_TRANSFORM", value_enum, default_value_t = TransformKind::Uppercase)]
    pub transform: TransformKind,

    /// Label the unary request counter with the raw request value.
    ///
    /// Off by default: free-form request strings make the label
    /// cardinality unbounded. Enable only for wire compatibility with
    /// dashboards that expect the labeled series.
    #[arg(long, env = "DATASVC_LABEL_GET_REQUESTS", default_value_t = false)]
    pub label_get_requests: bool,

    /// Seconds to wait for in-flight calls to finish during shutdown.
    #[arg(long, env = "DATASVC_DRAIN_TIMEOUT_SECS", default_value_t = 30)]
    pub drain_timeout_secs: u64,
}

/// Validated server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// gRPC listening address (`host:port`).
    pub server_addr: String,
    /// Metrics exposition listening address (`host:metrics_port`).
    pub metrics_addr: String,
    /// Transform applied by every handler.
    pub transform: TransformKind,
    /// Whether the unary counter carries a per-request-value label.
    pub label_get_requests: bool,
    /// Upper bound on the graceful drain during shutdown.
    pub drain_timeout: Duration,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.port == args.metrics_port {
            anyhow::bail!(
                "gRPC and metrics endpoints must use distinct ports (both {})",
                args.port
            );
        }

        let server_addr = format!("{}:{}", args.host, args.port);
        let metrics_addr = format!("{}:{}", args.host, args.metrics_port);

        // Validate the host early so a typo fails at startup, not at bind.
        server_addr
            .parse::<SocketAddr>()
            .map_err(|e| anyhow::anyhow!("invalid listen address {server_addr}: {e}"))?;

        Ok(Self {
            server_addr,
            metrics_addr,
            transform: args.transform,
            label_get_requests: args.label_get_requests,
            drain_timeout: Duration::from_secs(args.drain_timeout_secs),
        })
    }
}
