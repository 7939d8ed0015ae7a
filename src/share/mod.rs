//! Share links and the resolution state machine
//!
//! A share arrives as a URL fragment in one of three forms, detected by
//! prefix and resolved along distinct paths:
//!
//! ```text
//! Idle → Detecting → DirectDecode   (x=…)     → Loaded | Rejected
//!                  → RemotePointer  (r=…)     → Loaded | Rejected
//!                  → FallbackBlob   (share=…) → Loaded | Rejected
//! ```
//!
//! Outcomes are terminal for the page lifetime: a rejected link is not
//! retried and a failed remote fetch never falls through to the blob
//! path - the fallback blob is a different link type minted at share
//! time, not a recovery strategy at load time.

pub mod store;

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::codec::PayloadCodec;
use crate::error::ShareLinkError;
use crate::model::SharedResult;

use self::store::{decode_fallback, ResultStore};

/// The three wire forms a share fragment can take
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareLink {
    /// `x=<payload>` - the result lives in the fragment itself
    Direct(String),
    /// `r=<id>` - pointer into the remote store
    Remote(String),
    /// `share=<base64 JSON>` - self-carried fallback
    Fallback(String),
}

impl ShareLink {
    /// Detect which form a URL fragment carries
    ///
    /// Returns `None` when the fragment holds no share payload at all. A
    /// leading `#` is tolerated and stripped.
    pub fn parse(fragment: &str) -> Option<Self> {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
        if let Some(payload) = fragment.strip_prefix("x=") {
            Some(Self::Direct(payload.to_string()))
        } else if let Some(id) = fragment.strip_prefix("r=") {
            Some(Self::Remote(id.to_string()))
        } else if let Some(blob) = fragment.strip_prefix("share=") {
            Some(Self::Fallback(blob.to_string()))
        } else {
            None
        }
    }

    /// Render as a URL fragment, without the leading `#`
    pub fn fragment(&self) -> String {
        match self {
            Self::Direct(payload) => format!("x={}", payload),
            Self::Remote(id) => format!("r={}", id),
            Self::Fallback(blob) => format!("share={}", blob),
        }
    }

    /// Render as a full shareable URL, replacing any fragment already on
    /// the base address
    pub fn to_url(&self, base: &str) -> String {
        let base = base.split('#').next().unwrap_or(base);
        format!("{}#{}", base, self.fragment())
    }
}

/// Which path produced a loaded result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareSource {
    Direct,
    Remote,
    Fallback,
}

/// A successfully resolved shared result
#[derive(Debug, Clone)]
pub struct LoadedShare {
    pub result: SharedResult,
    pub source: ShareSource,
}

/// Terminal outcome of share resolution
#[derive(Debug)]
pub enum ShareOutcome {
    /// No share fragment present
    Idle,
    Loaded(LoadedShare),
    Rejected(ShareLinkError),
}

impl ShareOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// Resolves a URL fragment into a shared result
///
/// Built from its collaborators rather than reaching for globals: the
/// payload codec (which carries the catalog) and the result store.
pub struct ShareResolver {
    codec: PayloadCodec,
    store: Arc<dyn ResultStore>,
}

impl ShareResolver {
    pub fn new(codec: PayloadCodec, store: Arc<dyn ResultStore>) -> Self {
        Self { codec, store }
    }

    /// Run the state machine to a terminal outcome
    ///
    /// Completes fully before returning; callers render nothing from an
    /// in-flight resolution.
    pub async fn resolve(&self, fragment: &str) -> ShareOutcome {
        let Some(link) = ShareLink::parse(fragment) else {
            debug!("No share payload in fragment");
            return ShareOutcome::Idle;
        };
        match link {
            ShareLink::Direct(payload) => self.resolve_direct(&payload),
            ShareLink::Remote(id) => self.resolve_remote(&id).await,
            ShareLink::Fallback(blob) => self.resolve_fallback(&blob),
        }
    }

    fn resolve_direct(&self, payload: &str) -> ShareOutcome {
        match self.codec.decode(payload) {
            Ok((answers, profile)) => {
                info!(answers = answers.len(), "Self-contained share link verified");
                ShareOutcome::Loaded(LoadedShare {
                    result: SharedResult::new(answers, profile),
                    source: ShareSource::Direct,
                })
            }
            Err(e) => {
                warn!(error = %e, "Rejecting self-contained share link");
                ShareOutcome::Rejected(e)
            }
        }
    }

    async fn resolve_remote(&self, id: &str) -> ShareOutcome {
        match self.store.load(id).await {
            Ok(record) if record.is_expired(Utc::now()) => {
                warn!(id = %id, expires_at = %record.expires_at, "Rejecting expired shared result");
                ShareOutcome::Rejected(ShareLinkError::Expired(record.expires_at))
            }
            Ok(record) => {
                info!(id = %id, "Remote shared result loaded");
                ShareOutcome::Loaded(LoadedShare {
                    result: record.result,
                    source: ShareSource::Remote,
                })
            }
            Err(e) => {
                warn!(id = %id, error = %e, "Rejecting remote share link");
                ShareOutcome::Rejected(e)
            }
        }
    }

    fn resolve_fallback(&self, blob: &str) -> ShareOutcome {
        match decode_fallback(blob) {
            Ok(record) => {
                info!("Fallback share blob loaded");
                ShareOutcome::Loaded(LoadedShare {
                    result: record.result,
                    source: ShareSource::Fallback,
                })
            }
            Err(e) => {
                warn!(error = %e, "Rejecting fallback share blob");
                ShareOutcome::Rejected(e)
            }
        }
    }
}
