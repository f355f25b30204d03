//! Watermarking core library.
//!
//! This crate provides the building blocks for a cryptographically bound,
//! perceptually invisible watermarking engine:
//!
//! - a keyed signal and permutation schedule (`key_schedule`),
//! - the canonicalization / color / resize / DWT / DCT transform pipeline
//!   (`transform`),
//! - the image embed and extract algorithms (`embedder`, `extractor`),
//! - correlation-based verification (`verifier`),
//! - a calendar-quarter epoch policy (`epoch`),
//! - the watermark record model and storage/identity ports (`record`,
//!   `ports`),
//! - image service orchestration (`service`),
//! - a structured text document channel (`document`),
//! - Prometheus-based metrics (`metrics`),
//! - and top-level configuration (`config`, `error`).
//!
//! Higher-level binaries (such as the demo HTTP gateway) compose these
//! pieces into a running service.

pub mod config;
pub mod document;
pub mod embedder;
pub mod epoch;
pub mod error;
pub mod extractor;
pub mod key_schedule;
pub mod metrics;
pub mod ports;
pub mod record;
pub mod service;
pub mod transform;
pub mod verifier;

// Re-export top-level configuration types.
pub use config::{AuroraaSecret, WatermarkTunables};
pub use error::{CoreError, ErrorKind};

// Re-export the image watermarking orchestration and record model.
pub use record::{ContentType, RecordStatus, WatermarkRecord};
pub use service::{EmbedOutcome, ImageWatermarkService, ALGORITHM_VERSION};
pub use verifier::{VerificationOutcome, VerificationStatus};

// Re-export storage and identity ports.
pub use ports::{IdentityLookup, InMemoryWatermarkRepository, RepositoryError, StaticIdentityLookup, WatermarkRepository};

// Re-export the document channel.
pub use document::{
    DocEmbedOutcome, DocVerificationOutcome, DocumentState, DocumentWatermarkService, TextDocument,
};
pub use document::codec::{DocumentCodec, PlainTextDocumentCodec};

// Re-export metrics registry and HTTP exporter.
pub use metrics::{run_prometheus_http_server, MetricsRegistry, WatermarkMetrics};

/// Type alias for the default image watermark service stack used by the
/// demo gateway: an in-memory repository in place of a SQL-backed store.
pub type DefaultImageWatermarkService = ImageWatermarkService<InMemoryWatermarkRepository>;

/// Type alias for the default document watermark service stack: the
/// plain-text container codec in place of a real PDF/DOCX adapter.
pub type DefaultDocumentWatermarkService = DocumentWatermarkService<PlainTextDocumentCodec>;
