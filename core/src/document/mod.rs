//! Document channel (C7): invisible-codepoint + layout-spacing dual
//! encoding for structured text documents, sharing only the HMAC secret
//! with the image pipeline (C1-C5).
//!
//! Binary PDF/DOCX container parsing and re-serialization is delegated to
//! a [`codec::DocumentCodec`] port so the cryptographic and bit-level
//! logic modeled here — the part under test — is decoupled from any
//! particular container format library.

pub mod bits;
pub mod channels;
pub mod codec;
pub mod envelope;
pub mod frame;
pub mod service;

pub use channels::TextDocument;
pub use service::{DocEmbedOutcome, DocVerificationOutcome, DocumentWatermarkService};

/// State a document watermark operation reaches. `DocumentWatermarkService`
/// never constructs `Idle` itself — it's the state of a document nobody has
/// called `embed_doc`/`verify_doc` on yet — but attaches `Embedded`,
/// `Verified`, or `Rejected(reason)` to every [`DocEmbedOutcome`] and
/// [`DocVerificationOutcome`] it returns.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DocumentState {
    Idle,
    Embedded,
    Verified,
    Rejected(crate::error::DocRejectReason),
}
