//! Small helpers shared across the workspace.

pub mod fingerprint;
pub mod hex;

pub use fingerprint::key_fingerprint;
pub use hex::{hex_dump, un_hex_dump, HexError};
