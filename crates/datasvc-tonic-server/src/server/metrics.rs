//! Process-wide call counters and their exposition endpoint.
//!
//! [`Metrics`] is built once at startup and handed to every handler as
//! an injected dependency; tests construct their own instance against a
//! fresh registry. All instruments are backed by atomics, so concurrent
//! calls never lose increments and no handler-side locking is needed.
//!
//! The exposition side is a single `GET /metrics` route serving the
//! Prometheus text format on its own port, independent of the gRPC
//! endpoint.

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use tokio::net::TcpListener;

/// Cloneable handle over the service's counters.
///
/// Counters are monotonic and only reset by process restart. The
/// in-flight gauge is the one non-monotonic instrument; the lifecycle
/// drain reads it to decide when all accepted calls have finished.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    get_requests: IntCounter,
    // Opt-in: one series per distinct request value. Unbounded label
    // cardinality, so this stays behind a flag.
    get_requests_by_value: Option<IntCounterVec>,
    streamed_responses: IntCounter,
    put_requests: IntCounter,
    put_messages: IntCounter,
    call_errors: IntCounter,
    calls_inflight: IntGauge,
}

impl Metrics {
    /// Creates the instrument set and registers it in a fresh registry.
    pub fn new(label_get_requests: bool) -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let get_requests = IntCounter::new(
            "data_svc_get_requests_total",
            "Unary Get calls handled",
        )?;
        registry.register(Box::new(get_requests.clone()))?;

        let get_requests_by_value = if label_get_requests {
            let vec = IntCounterVec::new(
                Opts::new(
                    "data_svc_get_requests_by_value_total",
                    "Unary Get calls handled, labeled by raw request value",
                ),
                &["request"],
            )?;
            registry.register(Box::new(vec.clone()))?;
            Some(vec)
        } else {
            None
        };

        let streamed_responses = IntCounter::new(
            "data_svc_streamed_responses_total",
            "StreamingGet responses emitted (items, not calls)",
        )?;
        registry.register(Box::new(streamed_responses.clone()))?;

        let put_requests = IntCounter::new(
            "data_svc_put_requests_total",
            "StreamingPut calls completed",
        )?;
        registry.register(Box::new(put_requests.clone()))?;

        let put_messages = IntCounter::new(
            "data_svc_put_messages_total",
            "StreamingPut inbound messages received",
        )?;
        registry.register(Box::new(put_messages.clone()))?;

        let call_errors = IntCounter::new(
            "data_svc_call_errors_total",
            "Calls that ended in an error",
        )?;
        registry.register(Box::new(call_errors.clone()))?;

        let calls_inflight =
            IntGauge::new("data_svc_calls_inflight", "Calls currently executing")?;
        registry.register(Box::new(calls_inflight.clone()))?;

        Ok(Self {
            registry,
            get_requests,
            get_requests_by_value,
            streamed_responses,
            put_requests,
            put_messages,
            call_errors,
            calls_inflight,
        })
    }

    pub fn inc_get_request(&self, request: &str) {
        self.get_requests.inc();
        if let Some(by_value) = &self.get_requests_by_value {
            by_value.with_label_values(&[request]).inc();
        }
    }

    pub fn inc_streamed_response(&self) {
        self.streamed_responses.inc();
    }

    pub fn inc_put_request(&self) {
        self.put_requests.inc();
    }

    pub fn inc_put_message(&self) {
        self.put_messages.inc();
    }

    pub fn inc_call_error(&self) {
        self.call_errors.inc();
    }

    pub fn inc_inflight(&self) {
        self.calls_inflight.inc();
    }

    pub fn dec_inflight(&self) {
        self.calls_inflight.dec();
    }

    pub fn get_requests(&self) -> u64 {
        self.get_requests.get()
    }

    pub fn streamed_responses(&self) -> u64 {
        self.streamed_responses.get()
    }

    pub fn put_requests(&self) -> u64 {
        self.put_requests.get()
    }

    pub fn put_messages(&self) -> u64 {
        self.put_messages.get()
    }

    pub fn call_errors(&self) -> u64 {
        self.call_errors.get()
    }

    pub fn calls_inflight(&self) -> i64 {
        self.calls_inflight.get()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

/// Serves `GET /metrics` on the given listener until the process exits.
pub async fn serve_exposition(listener: TcpListener, metrics: Metrics) -> std::io::Result<()> {
    let app = Router::new()
        .route("/metrics", get(render_metrics))
        .with_state(metrics);
    axum::serve(listener, app).await
}

async fn render_metrics(State(metrics): State<Metrics>) -> Response {
    let families = metrics.registry().gather();
    let mut buf = Vec::new();
    match TextEncoder::new().encode(&families, &mut buf) {
        Ok(()) => ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], buf).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encoding failed: {e}"),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let metrics = Metrics::new(false).unwrap();
        assert_eq!(metrics.get_requests(), 0);
        assert_eq!(metrics.streamed_responses(), 0);
        assert_eq!(metrics.put_requests(), 0);
        assert_eq!(metrics.call_errors(), 0);
        assert_eq!(metrics.calls_inflight(), 0);
    }

    #[test]
    fn concurrent_increments_lose_no_updates() {
        let metrics = Metrics::new(false).unwrap();
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let metrics = metrics.clone();
                std::thread::spawn(move || {
                    for _ in 0..1_000 {
                        metrics.inc_get_request("req");
                    }
                })
            })
            .collect();
        for handle in threads {
            handle.join().unwrap();
        }
        assert_eq!(metrics.get_requests(), 8_000);
    }

    #[test]
    fn label_opt_in_records_per_value_series() {
        let metrics = Metrics::new(true).unwrap();
        metrics.inc_get_request("a");
        metrics.inc_get_request("a");
        metrics.inc_get_request("b");
        let by_value = metrics.get_requests_by_value.as_ref().unwrap();
        assert_eq!(by_value.with_label_values(&["a"]).get(), 2);
        assert_eq!(by_value.with_label_values(&["b"]).get(), 1);
        assert_eq!(metrics.get_requests(), 3);
    }

    #[test]
    fn inflight_gauge_tracks_up_and_down() {
        let metrics = Metrics::new(false).unwrap();
        metrics.inc_inflight();
        metrics.inc_inflight();
        assert_eq!(metrics.calls_inflight(), 2);
        metrics.dec_inflight();
        assert_eq!(metrics.calls_inflight(), 1);
    }

    #[test]
    fn exposition_renders_registered_counters() {
        let metrics = Metrics::new(false).unwrap();
        metrics.inc_get_request("x");
        let families = metrics.registry().gather();
        let mut buf = Vec::new();
        TextEncoder::new().encode(&families, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("data_svc_get_requests_total 1"));
    }
}
