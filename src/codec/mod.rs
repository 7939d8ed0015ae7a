//! Answer-set compression pipeline
//!
//! Four stages, applied in order on encode and reversed on decode:
//!
//! 1. [`coordinate`] - fold one answer's four catalog indices into a
//!    17-bit word
//! 2. [`delta`] - replace the coordinate sequence with first value plus
//!    successive differences, shrinking the magnitude of what follows
//! 3. [`radix`] - concatenate the deltas as decimal text, reinterpret
//!    the bytes as one base-256 big integer, and write it in a custom
//!    85-symbol positional numeral system
//! 4. [`payload`] - join answer and profile blobs and seal them with a
//!    position-weighted checksum

pub mod coordinate;
pub mod delta;
pub mod payload;
pub mod radix;

pub use payload::{CompressionStats, PayloadCodec};
