//! Observability (C10): Prometheus-backed metrics registry and an async
//! HTTP exporter that serves `/metrics`, mirroring the shape of a
//! consensus engine's metrics registry.

use std::{convert::Infallible, net::SocketAddr, sync::Arc};

use bytes::Bytes;
use http_body_util::Full;
use hyper::{
    Method, Request, Response, StatusCode, body::Incoming, header, server::conn::http1,
    service::service_fn,
};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};

/// Watermarking-related Prometheus metrics.
#[derive(Clone)]
pub struct WatermarkMetrics {
    /// Latency of image embed calls, in seconds.
    pub embed_seconds: Histogram,
    /// Latency of image verify calls, in seconds.
    pub verify_seconds: Histogram,
    /// Verification outcomes, labeled by status
    /// (`verified`/`most`/`likely`/`not_verified`).
    pub verify_outcomes_total: IntCounterVec,
    /// Total embed failures.
    pub embed_failures_total: prometheus::IntCounter,
}

impl WatermarkMetrics {
    /// Registers watermarking metrics into the given `Registry`.
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let embed_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "watermark_embed_seconds",
                "Time to embed a watermark into an image, in seconds",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5,
            ]),
        )?;
        registry.register(Box::new(embed_seconds.clone()))?;

        let verify_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "watermark_verify_seconds",
                "Time to verify a candidate image, in seconds",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5,
            ]),
        )?;
        registry.register(Box::new(verify_seconds.clone()))?;

        let verify_outcomes_total = IntCounterVec::new(
            Opts::new(
                "watermark_verify_outcomes_total",
                "Total verification outcomes by status",
            ),
            &["status"],
        )?;
        registry.register(Box::new(verify_outcomes_total.clone()))?;

        let embed_failures_total = prometheus::IntCounter::with_opts(Opts::new(
            "watermark_embed_failures_total",
            "Total number of embed calls that failed",
        ))?;
        registry.register(Box::new(embed_failures_total.clone()))?;

        Ok(Self {
            embed_seconds,
            verify_seconds,
            verify_outcomes_total,
            embed_failures_total,
        })
    }
}

/// Wrapper around a Prometheus registry and the watermarking metrics.
/// Intended to be wrapped in an [`Arc`] and shared across tasks.
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Registry,
    pub watermark: WatermarkMetrics,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("auroraa".to_string()), None)?;
        let watermark = WatermarkMetrics::register(&registry)?;
        Ok(Self {
            registry,
            watermark,
        })
    }

    /// Encodes all metrics in this registry into Prometheus text format.
    pub fn gather_text(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!("failed to encode Prometheus metrics: {e}");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

/// Runs an HTTP server that exposes Prometheus metrics at `GET /metrics`.
/// All other paths return 404.
pub async fn run_prometheus_http_server(
    metrics: Arc<MetricsRegistry>,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = TcpListener::bind(addr).await?;

    loop {
        let (stream, _) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let metrics = metrics.clone();

        tokio::spawn(async move {
            let svc = service_fn(move |req| {
                let metrics = metrics.clone();
                handle_request(req, metrics)
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, svc).await {
                tracing::warn!("metrics HTTP server error: {err}");
            }
        });
    }
}

async fn handle_request(
    req: Request<Incoming>,
    metrics: Arc<MetricsRegistry>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    match (req.method(), req.uri().path()) {
        (&Method::GET, "/metrics") => {
            let body = metrics.gather_text();
            Ok(Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "text/plain; version=0.0.4")
                .body(Full::new(Bytes::from(body)))
                .unwrap())
        }
        _ => Ok(Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Full::new(Bytes::from("not found")))
            .unwrap()),
    }
}
