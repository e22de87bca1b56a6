//! gRPC service implementation for the string data service.
//!
//! This module defines [`DataHandler`], the concrete implementation of
//! the [`DataService`] gRPC service defined in the protobuf
//! specification. It exposes the three call shapes over string
//! payloads: unary get, server-streaming get, and client-streaming put.
//!
//! ## Responsibilities
//!
//! - Apply the configured [`Transform`] to request payloads.
//! - Keep the injected [`Metrics`] counters current per unit of work.
//! - Refuse new calls once shutdown has been signaled, while letting
//!   already-accepted calls run to completion (graceful drain).
//!
//! Per-call state (the response channel of a server-streaming call, the
//! accumulator of a client-streaming call) is owned exclusively by that
//! call's task; the metrics handle is the only state shared across
//! calls, and all of its updates are atomic.

use crate::server::{
    config::ServerConfig,
    metrics::Metrics,
    streaming::{accumulator::PutAccumulator, coordinator::feed_responses},
    transform::Transform,
};
use core::pin::Pin;
use core::time::Duration;
use datasvc_tonic_core::{
    Error,
    proto::{DataRequest, DataResponse, EmptyRequest, data_service_server::DataService},
};
use futures::TryStreamExt;
use std::sync::Arc;
use tokio::{
    sync::mpsc,
    time::{sleep, timeout},
};
use tokio_stream::{Stream, wrappers::ReceiverStream};
use tokio_util::sync::CancellationToken;
use tonic::{Request, Response, Status, Streaming};

/// Number of responses a `StreamingGet` call emits.
pub const STREAMING_GET_RESPONSES: usize = 10;

/// gRPC service over string payloads.
///
/// Cloning is cheap: the handler holds the shared metrics handle, the
/// transform trait object, and the shutdown token behind `Arc`s.
#[derive(Clone)]
pub struct DataHandler {
    config: ServerConfig,
    metrics: Metrics,
    transform: Arc<dyn Transform>,
    shutdown_token: CancellationToken,
}

impl DataHandler {
    pub fn new(config: ServerConfig, metrics: Metrics, transform: Arc<dyn Transform>) -> Self {
        Self {
            config,
            metrics,
            transform,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Rejects the call if shutdown has been signaled.
    fn check_accepting(&self) -> Result<(), Status> {
        if self.shutdown_token.is_cancelled() {
            self.metrics.inc_call_error();
            return Err(Error::ServiceShutdown.into());
        }
        Ok(())
    }

    /// Initiates a graceful shutdown.
    ///
    /// New calls are refused immediately; the method then blocks until
    /// every in-flight call has finished or the configured drain
    /// timeout expires. A second invocation (or a second shutdown
    /// signal) is a no-op.
    pub async fn shutdown(&self) {
        if self.shutdown_token.is_cancelled() {
            tracing::debug!("Shutdown already in progress");
            return;
        }
        self.shutdown_token.cancel();

        tracing::info!(
            "Refusing new calls; draining {} in-flight",
            self.metrics.calls_inflight()
        );
        let drain_result = timeout(self.config.drain_timeout, async {
            while self.metrics.calls_inflight() > 0 {
                sleep(Duration::from_millis(50)).await;
            }
        })
        .await;

        match drain_result {
            Ok(()) => {
                tracing::info!("All in-flight calls drained");
            }
            Err(_) => {
                tracing::warn!(
                    "Graceful drain timed out ({} calls still active)",
                    self.metrics.calls_inflight()
                );
            }
        }
    }
}

/// Keeps the in-flight gauge balanced on every exit path of a call.
struct InflightGuard {
    metrics: Metrics,
}

impl InflightGuard {
    fn new(metrics: &Metrics) -> Self {
        metrics.inc_inflight();
        Self {
            metrics: metrics.clone(),
        }
    }
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        self.metrics.dec_inflight();
    }
}

#[tonic::async_trait]
impl DataService for DataHandler {
    type StreamingGetStream = Pin<Box<dyn Stream<Item = Result<DataResponse, Status>> + Send>>;

    /// Handles a unary request: one transformed response, one counter
    /// increment.
    #[tracing::instrument(skip_all, fields(request = %req.get_ref().request))]
    async fn get(&self, req: Request<DataRequest>) -> Result<Response<DataResponse>, Status> {
        self.check_accepting()?;
        let _guard = InflightGuard::new(&self.metrics);

        let request = req.into_inner().request;
        let value = self.transform.apply(&request);
        tracing::info!(value = %value, "computed value for request");
        self.metrics.inc_get_request(&request);

        Ok(Response::new(DataResponse { value }))
    }

    /// Handles a server-streaming request.
    ///
    /// A producer task feeds the fixed response sequence into a bounded
    /// channel; the returned stream counts each item as it is emitted
    /// to the transport. If the client disconnects mid-sequence the
    /// producer stops early and the call context is released without a
    /// completion signal.
    #[tracing::instrument(skip_all)]
    async fn streaming_get(
        &self,
        _req: Request<EmptyRequest>,
    ) -> Result<Response<Self::StreamingGetStream>, Status> {
        self.check_accepting()?;
        let guard = InflightGuard::new(&self.metrics);

        // Bounded buffer: a slow or vanished consumer stalls the
        // producer instead of piling up undeliverable items.
        let (resp_tx, resp_rx) = mpsc::channel::<Result<DataResponse, Status>>(4);

        let metrics = self.metrics.clone();
        tokio::spawn(async move {
            let _guard = guard;
            if let Err(_e) = feed_responses(STREAMING_GET_RESPONSES, resp_tx).await {
                tracing::debug!("Streaming get ended early: {_e}");
                metrics.inc_call_error();
            }
        });

        let metrics = self.metrics.clone();
        let stream =
            ReceiverStream::new(resp_rx).inspect_ok(move |_| metrics.inc_streamed_response());

        Ok(Response::new(Box::pin(stream)))
    }

    /// Handles a client-streaming request.
    ///
    /// Inbound messages are transformed and accumulated in arrival
    /// order; when the client signals stream end, exactly one response
    /// renders the full buffer. A transport error on the inbound side
    /// aborts the call with that error and no partial response.
    #[tracing::instrument(skip_all)]
    async fn streaming_put(
        &self,
        req: Request<Streaming<DataRequest>>,
    ) -> Result<Response<DataResponse>, Status> {
        self.check_accepting()?;
        let _guard = InflightGuard::new(&self.metrics);

        let mut stream = req.into_inner();
        let mut accumulator = PutAccumulator::new();

        loop {
            match stream.message().await {
                Ok(Some(msg)) => {
                    self.metrics.inc_put_message();
                    accumulator.push(self.transform.apply(&msg.request));
                }
                Ok(None) => break,
                Err(status) => {
                    tracing::warn!("Inbound stream error: {status}");
                    self.metrics.inc_call_error();
                    return Err(status);
                }
            }
        }

        let value = accumulator.render();
        tracing::info!(value = %value, "client stream complete");
        self.metrics.inc_put_request();

        Ok(Response::new(DataResponse { value }))
    }
}
