//! Rapport - compact, integrity-checked share links for questionnaire results
//!
//! A completed questionnaire (an ordered set of answers plus a small
//! profile) is folded into a URL fragment short enough to paste into a
//! chat message, with a checksum so a mangled link is rejected instead of
//! silently loading garbage.
//!
//! ## Link forms
//!
//! - **Self-contained**: `#x=<answers>~<profile>#<checksum>` - the whole
//!   result lives in the fragment
//! - **Remote pointer**: `#r=<id>` - the result lives in a key-value store
//! - **Fallback blob**: `#share=<base64(JSON)>` - produced at share time
//!   when the store is unreachable
//!
//! ## Pipeline
//!
//! ```text
//! AnswerSet → catalog indices → packed coordinates (17-bit words)
//!           → delta sequence  → base-256 big integer → radix-85 text
//!           → "<answers>~<profile>#<checksum>"
//! ```
//!
//! Decoding runs the pipeline in reverse and is fail-closed: a checksum
//! or count mismatch rejects the whole payload, never a truncated subset.

pub mod analyzer;
pub mod catalog;
pub mod codec;
pub mod error;
pub mod model;
pub mod share;

pub use catalog::{Catalog, ProfileField};
pub use codec::{CompressionStats, PayloadCodec};
pub use error::{Result, ShareLinkError};
pub use model::{Answer, Profile, SharedResult};
pub use share::store::{RemoteRecord, RemoteStoreClient, ResultStore, SaveOutcome};
pub use share::{LoadedShare, ShareLink, ShareOutcome, ShareResolver, ShareSource};
