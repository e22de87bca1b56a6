#![doc = include_str!("../README.md")]

mod server;

use anyhow::Context;
use clap::Parser;
use datasvc_tonic_core::proto::{FILE_DESCRIPTOR_SET, data_service_server::DataServiceServer};
use futures::Stream;
use server::config::{CliArgs, ServerConfig};
use server::metrics::Metrics;
use server::service::handler::DataHandler;
use server::telemetry::init_telemetry;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::signal;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::server::Connected;
use tonic::{codec::CompressionEncoding, transport::Server};
use tonic_health::server::HealthReporter;
use tonic_reflection::server::Builder;
use tonic_web::GrpcWebLayer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    init_telemetry();

    let metrics = Metrics::new(config.label_get_requests)?;

    // The exposition endpoint must be listening before (or independently
    // of) the RPC endpoint; a failed bind on either port aborts startup.
    let metrics_listener = TcpListener::bind(&config.metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics endpoint on {}", config.metrics_addr))?;
    tracing::info!("Metrics exposition listening on {}", config.metrics_addr);
    tokio::spawn(server::metrics::serve_exposition(
        metrics_listener,
        metrics.clone(),
    ));

    let grpc_listener = TcpListener::bind(&config.server_addr)
        .await
        .with_context(|| format!("failed to bind gRPC endpoint on {}", config.server_addr))?;
    let incoming = TcpListenerStream::new(grpc_listener);
    tracing::info!(
        "Starting data service on {} ({} transform)",
        config.server_addr,
        config.transform
    );
    run_server_with_incoming(incoming, config, metrics).await
}

async fn run_server_with_incoming<I, IO, IE>(
    incoming: I,
    config: ServerConfig,
    metrics: Metrics,
) -> anyhow::Result<()>
where
    I: Stream<Item = Result<IO, IE>>,
    IO: AsyncRead + AsyncWrite + Connected + Unpin + Send + 'static,
    IE: Into<tower::BoxError>,
{
    let (health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<DataServiceServer<DataHandler>>()
        .await;

    let transform = config.transform.build();
    let service = DataHandler::new(config, metrics, transform);

    let reflection = Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    Server::builder()
        .accept_http1(true)
        .http2_adaptive_window(Some(true))
        .layer(
            ServiceBuilder::new()
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(GrpcWebLayer::new()),
        )
        .add_service(health_service.clone())
        .add_service(reflection)
        .add_service(build_data_service(service.clone()))
        .serve_with_incoming_shutdown(incoming, shutdown_signal(service, health_reporter))
        .await?;

    tracing::info!("Service shut down successfully");
    Ok(())
}

fn build_data_service(service: DataHandler) -> DataServiceServer<DataHandler> {
    DataServiceServer::new(service)
        .send_compressed(CompressionEncoding::Zstd)
        .send_compressed(CompressionEncoding::Gzip)
        .send_compressed(CompressionEncoding::Deflate)
        .accept_compressed(CompressionEncoding::Zstd)
        .accept_compressed(CompressionEncoding::Gzip)
        .accept_compressed(CompressionEncoding::Deflate)
}

async fn shutdown_signal(service: DataHandler, health_reporter: HealthReporter) {
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }

    tracing::info!("Shutdown signal received, terminating gracefully...");

    // 1. Publish the status
    health_reporter
        .set_not_serving::<DataServiceServer<DataHandler>>()
        .await;

    // 2. Refuse new calls and drain in-flight ones
    service.shutdown().await;
}
