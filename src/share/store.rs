//! Remote result store - thin REST client with a local fallback
//!
//! The store is a dumb key-value service: `PUT /results/{id}.json` and
//! `GET /results/{id}.json`, no authentication, no update or delete.
//! Ids are minted client-side and records are never mutated after
//! creation. Retention is also a client-side concern: every record
//! carries an `expiresAt` the store does not enforce, so loaders must
//! check it themselves.
//!
//! Sharing degrades instead of failing: when the store is unreachable
//! the record is folded into a base64 fallback blob and carried in the
//! link itself.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, ShareLinkError};
use crate::model::SharedResult;
use crate::share::ShareLink;

/// Client-side retention window stamped into every record
pub const RETENTION_DAYS: i64 = 90;

const REMOTE_ID_LEN: usize = 12;
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// One stored share, as PUT to and read from the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteRecord {
    #[serde(flatten)]
    pub result: SharedResult,
    pub timestamp: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl RemoteRecord {
    /// Stamp a result for storage: created now, expiring after the
    /// retention window
    pub fn new(result: SharedResult) -> Self {
        let now = Utc::now();
        Self {
            result,
            timestamp: now,
            expires_at: now + Duration::days(RETENTION_DAYS),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Storage seam for shared results
///
/// The resolver and the save flow depend on this trait, not on the HTTP
/// client, so tests and alternative backends plug in directly.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Store a record under a client-generated id
    async fn put(&self, id: &str, record: &RemoteRecord) -> Result<()>;

    /// Fetch a record by id
    ///
    /// `NotFound` (the store answered, the record is not there) and
    /// `Network` (the store did not answer) are distinct, non-retried
    /// failures.
    async fn load(&self, id: &str) -> Result<RemoteRecord>;
}

/// REST client for the result store
#[derive(Debug, Clone)]
pub struct RemoteStoreClient {
    base_url: String,
    client: reqwest::Client,
}

impl RemoteStoreClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    fn record_url(&self, id: &str) -> String {
        format!("{}/results/{}.json", self.base_url.trim_end_matches('/'), id)
    }
}

#[async_trait]
impl ResultStore for RemoteStoreClient {
    async fn put(&self, id: &str, record: &RemoteRecord) -> Result<()> {
        let response = self
            .client
            .put(self.record_url(id))
            .json(record)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ShareLinkError::Network(format!(
                "store PUT failed: HTTP {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<RemoteRecord> {
        let response = self
            .client
            .get(self.record_url(id))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ShareLinkError::NotFound(id.to_string()));
        }
        if !response.status().is_success() {
            return Err(ShareLinkError::Network(format!(
                "store GET failed: HTTP {}",
                response.status()
            )));
        }

        response
            .json::<RemoteRecord>()
            .await
            .map_err(|e| ShareLinkError::Decode(format!("record body: {}", e)))
    }
}

/// What a share attempt produced
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub link: ShareLink,
    /// True when the store was unreachable and the link carries the
    /// record itself as a fallback blob
    pub is_fallback: bool,
}

/// Share a record: try the store, degrade to a fallback blob on any
/// failure. Never fails the caller.
pub async fn save(store: &dyn ResultStore, record: &RemoteRecord) -> SaveOutcome {
    let id = generate_id();
    match store.put(&id, record).await {
        Ok(()) => {
            info!(id = %id, expires_at = %record.expires_at, "Shared result stored remotely");
            SaveOutcome {
                link: ShareLink::Remote(id),
                is_fallback: false,
            }
        }
        Err(e) => {
            warn!(error = %e, "Result store unavailable, issuing fallback blob link");
            SaveOutcome {
                link: ShareLink::Fallback(encode_fallback(record)),
                is_fallback: true,
            }
        }
    }
}

/// Fold a record into a base64 blob for a `share=` link
pub fn encode_fallback(record: &RemoteRecord) -> String {
    let json = serde_json::to_string(record).unwrap_or_default();
    BASE64.encode(json.as_bytes())
}

/// Unfold and validate a `share=` blob
pub fn decode_fallback(blob: &str) -> Result<RemoteRecord> {
    let bytes = BASE64.decode(blob.trim())?;
    let record: RemoteRecord = serde_json::from_slice(&bytes)?;
    record.result.validate()?;
    Ok(record)
}

fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REMOTE_ID_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Answer, Profile};

    fn sample_record() -> RemoteRecord {
        RemoteRecord::new(SharedResult::new(
            vec![Answer::new("Bondage", "Handcuffs", "Love", "Accept")],
            Profile {
                position: "Top".to_string(),
                pain_tolerance: "Medium".to_string(),
                theoretical_experience: "0-3 years".to_string(),
                practical_experience: "0-3 years".to_string(),
            },
        ))
    }

    #[test]
    fn test_record_expiry_window() {
        let record = sample_record();
        assert!(!record.is_expired(Utc::now()));
        assert!(record.is_expired(Utc::now() + Duration::days(RETENTION_DAYS + 1)));
    }

    #[test]
    fn test_record_wire_field_names() {
        let json = serde_json::to_string(&sample_record()).unwrap();
        assert!(json.contains("\"expiresAt\""));
        assert!(json.contains("\"timestamp\""));
        assert!(json.contains("\"answers\""));
        assert!(json.contains("\"profile\""));
    }

    #[test]
    fn test_fallback_blob_round_trip() {
        let record = sample_record();
        let blob = encode_fallback(&record);
        let decoded = decode_fallback(&blob).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_fallback_invalid_base64_rejected() {
        assert!(matches!(
            decode_fallback("not base64 at all!!!"),
            Err(ShareLinkError::Decode(_))
        ));
    }

    #[test]
    fn test_fallback_invalid_json_rejected() {
        let blob = BASE64.encode(b"{\"answers\": oops");
        assert!(matches!(
            decode_fallback(&blob),
            Err(ShareLinkError::Decode(_))
        ));
    }

    #[test]
    fn test_fallback_empty_answers_rejected() {
        let mut record = sample_record();
        record.result.answers.clear();
        let blob = encode_fallback(&record);
        assert!(matches!(
            decode_fallback(&blob),
            Err(ShareLinkError::Decode(_))
        ));
    }

    #[test]
    fn test_generated_ids_are_distinct_alphanumeric() {
        let a = generate_id();
        let b = generate_id();
        assert_eq!(a.len(), REMOTE_ID_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_record_url_shape() {
        let client = RemoteStoreClient::new("https://store.example.com/");
        assert_eq!(
            client.record_url("abc123"),
            "https://store.example.com/results/abc123.json"
        );
    }

    #[tokio::test]
    async fn test_save_degrades_to_fallback_when_unreachable() {
        // Nothing listens on the discard port; the PUT fails fast and the
        // save must degrade instead of erroring
        let client = RemoteStoreClient::new("http://127.0.0.1:9");
        let record = sample_record();
        let outcome = save(&client, &record).await;
        assert!(outcome.is_fallback);
        match outcome.link {
            ShareLink::Fallback(blob) => {
                assert_eq!(decode_fallback(&blob).unwrap(), record);
            }
            other => panic!("expected fallback link, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_unreachable_is_network_error() {
        let client = RemoteStoreClient::new("http://127.0.0.1:9");
        assert!(matches!(
            client.load("abc123").await,
            Err(ShareLinkError::Network(_))
        ));
    }
}
