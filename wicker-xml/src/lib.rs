//! Streaming decoder that reconstructs object graphs from a restricted XML
//! dialect, under an explicit class/member whitelist.
//!
//! The wire format is a single `<java>` root holding `<object>`, `<void>`,
//! `<array>` and literal leaf elements. DOCTYPE declarations and entity
//! references are rejected outright, independent of filter configuration.

mod decoder;
mod error;
mod frame;
mod limits;
mod listener;

pub use decoder::{SafeXmlDecoder, SafeXmlDecoderBuilder};
pub use error::{DecodeError, DecodeResult};
pub use limits::DecodeLimits;
pub use listener::{DecodeListener, TracingListener};
