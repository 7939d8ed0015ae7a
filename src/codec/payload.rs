//! Payload assembly and integrity checking
//!
//! The data segment of a self-contained link is
//! `"<answersBlob>~<profileBlob>#<checksumBlob>"`. Encoding resolves
//! answers against the catalog (silently dropping entries the catalog no
//! longer knows), runs the delta + radix pipeline, packs the profile into
//! a 16-bit word and seals everything with a position-weighted checksum.
//!
//! Decoding is fail-closed for structure and integrity (separator count,
//! checksum, element count) but tolerant per answer: a coordinate that no
//! longer resolves in the catalog drops that one answer. The asymmetry
//! mirrors the questionnaire's observed behavior - a stale catalog thins
//! a link out, a damaged link is refused outright.

use std::sync::Arc;

use num_bigint::BigUint;
use num_traits::ToPrimitive;
use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::{Catalog, ProfileField};
use crate::codec::{coordinate, delta, radix};
use crate::error::{Result, ShareLinkError};
use crate::model::{Answer, Profile};

/// Answer blob emitted for a set with no encodable entries
pub const EMPTY_SENTINEL: &str = "A";

/// Position-weighted 16-bit checksum over a data segment
///
/// `Σ byte(c)·(i+1) mod 65536`. Not cryptographic - it exists to catch
/// truncated or mangled links, not adversaries.
pub fn checksum(data: &str) -> u16 {
    let mut sum: u64 = 0;
    for (i, b) in data.bytes().enumerate() {
        sum = (sum + b as u64 * (i as u64 + 1)) % 65_536;
    }
    sum as u16
}

/// Size accounting for one encoded answer set
#[derive(Debug, Clone, Serialize)]
pub struct CompressionStats {
    pub answer_count: usize,
    /// Size of the plain JSON the link replaces
    pub json_chars: usize,
    /// Size of the encoded payload
    pub packed_chars: usize,
    pub savings_percent: i32,
}

impl CompressionStats {
    pub fn measure(answers: &[Answer], encoded: &str) -> Self {
        let json_chars = serde_json::to_string(answers).map(|s| s.len()).unwrap_or(0);
        let packed_chars = encoded.len();
        let savings_percent = if json_chars == 0 {
            0
        } else {
            (100.0 * (1.0 - packed_chars as f64 / json_chars as f64)).round() as i32
        };
        Self {
            answer_count: answers.len(),
            json_chars,
            packed_chars,
            savings_percent,
        }
    }
}

/// Encoder/decoder for the full self-contained payload
///
/// Holds the catalog it resolves against; construct one per catalog and
/// pass it by reference wherever payloads are produced or consumed.
#[derive(Debug, Clone)]
pub struct PayloadCodec {
    catalog: Arc<Catalog>,
}

impl PayloadCodec {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Encode an answer set and profile into the payload string
    ///
    /// Answers the catalog cannot resolve are dropped (logged, not an
    /// error). An empty or fully-dropped set encodes its answer blob as
    /// the [`EMPTY_SENTINEL`].
    pub fn encode(&self, answers: &[Answer], profile: &Profile) -> String {
        let mut coords = Vec::with_capacity(answers.len());
        let mut dropped = 0usize;
        for answer in answers {
            match self.resolve_coordinate(answer) {
                Some(c) => coords.push(c),
                None => {
                    dropped += 1;
                    debug!(
                        category = %answer.category,
                        question = %answer.question,
                        "Dropping answer the catalog cannot resolve"
                    );
                }
            }
        }
        if dropped > 0 {
            warn!(dropped, "Answers missing from the catalog were left out of the link");
        }

        let answers_blob = if coords.is_empty() {
            EMPTY_SENTINEL.to_string()
        } else {
            radix::pack_deltas(&delta::encode(&coords))
        };
        let profile_blob = radix::encode_u64(self.pack_profile(profile) as u64);

        let data = format!("{}~{}", answers_blob, profile_blob);
        let sum = checksum(&data);
        let encoded = format!("{}#{}", data, radix::encode_u64(sum as u64));

        let stats = CompressionStats::measure(answers, &encoded);
        debug!(
            answers = stats.answer_count,
            json_chars = stats.json_chars,
            packed_chars = stats.packed_chars,
            savings_percent = stats.savings_percent,
            "Answer set packed"
        );
        encoded
    }

    /// Decode a payload string back into an answer set and profile
    ///
    /// Fail-closed on structure and integrity; per-answer tolerant on
    /// catalog misses. Never returns a partial set on integrity failure.
    pub fn decode(&self, payload: &str) -> Result<(Vec<Answer>, Profile)> {
        let (data, checksum_part) = split_two(payload, '#').ok_or_else(|| {
            ShareLinkError::Format("expected <data>#<checksum>".to_string())
        })?;

        let computed = checksum(data);
        let transmitted = radix::from_radix(checksum_part)?;
        if transmitted != BigUint::from(computed) {
            return Err(ShareLinkError::ChecksumMismatch {
                transmitted: transmitted.to_u64().unwrap_or(u64::MAX),
                computed,
            });
        }

        let (answers_part, profile_part) = split_two(data, '~').ok_or_else(|| {
            ShareLinkError::Format("expected <answers>~<profile>".to_string())
        })?;

        let answers = self.decode_answers(answers_part)?;
        let profile = self.decode_profile(profile_part);
        debug!(
            catalog_version = %self.catalog.version(),
            answers = answers.len(),
            "Share payload decoded"
        );
        Ok((answers, profile))
    }

    fn resolve_coordinate(&self, answer: &Answer) -> Option<u32> {
        let category = self.catalog.category_index(&answer.category)?;
        let question = self.catalog.question_index(&answer.category, &answer.question)?;
        let give = self.catalog.response_index(&answer.give)?;
        let receive = self.catalog.response_index(&answer.receive)?;
        Some(coordinate::pack(
            category as u32,
            question as u32,
            give as u32,
            receive as u32,
        ))
    }

    fn decode_answers(&self, blob: &str) -> Result<Vec<Answer>> {
        if blob == EMPTY_SENTINEL {
            return Ok(Vec::new());
        }
        let deltas = radix::unpack_deltas(blob)?;
        let mut answers = Vec::with_capacity(deltas.len());
        for raw in delta::decode(&deltas) {
            let word = match u32::try_from(raw) {
                Ok(w) => w,
                Err(_) => {
                    debug!(value = raw, "Dropping coordinate outside the packable range");
                    continue;
                }
            };
            let u = coordinate::unpack(word);
            let Some(category) = self.catalog.category_name(u.category as usize) else {
                debug!(index = u.category, "Dropping answer with unknown category index");
                continue;
            };
            let Some(question) = self.catalog.question_text(u.category as usize, u.question as usize)
            else {
                debug!(
                    category = %category,
                    index = u.question,
                    "Dropping answer with unknown question index"
                );
                continue;
            };
            let give = self
                .catalog
                .response_label(u.give as usize)
                .unwrap_or_else(|| self.catalog.fallback_response());
            let receive = self
                .catalog
                .response_label(u.receive as usize)
                .unwrap_or_else(|| self.catalog.fallback_response());
            answers.push(Answer::new(category, question, give, receive));
        }
        Ok(answers)
    }

    /// Pack the four profile option indices into 4-bit fields
    ///
    /// An unresolved field packs as index 0.
    fn pack_profile(&self, profile: &Profile) -> u32 {
        let idx = |field: ProfileField, label: &str| -> u32 {
            self.catalog.profile_index(field, label).unwrap_or(0) as u32
        };
        (idx(ProfileField::Position, &profile.position) << 12)
            | (idx(ProfileField::PainTolerance, &profile.pain_tolerance) << 8)
            | (idx(ProfileField::TheoreticalExperience, &profile.theoretical_experience) << 4)
            | idx(ProfileField::PracticalExperience, &profile.practical_experience)
    }

    /// Reverse of [`Self::pack_profile`], defaulting out-of-range fields
    /// instead of failing
    fn decode_profile(&self, blob: &str) -> Profile {
        let packed = match radix::from_radix(blob).ok().and_then(|n| n.to_u32()) {
            Some(p) => p,
            None => {
                debug!("Profile blob unreadable, using catalog defaults");
                return self.catalog.default_profile();
            }
        };
        let defaults = self.catalog.default_profile();
        Profile {
            position: self.profile_or(
                ProfileField::Position,
                ((packed >> 12) & 0xF) as usize,
                defaults.position,
            ),
            pain_tolerance: self.profile_or(
                ProfileField::PainTolerance,
                ((packed >> 8) & 0xF) as usize,
                defaults.pain_tolerance,
            ),
            theoretical_experience: self.profile_or(
                ProfileField::TheoreticalExperience,
                ((packed >> 4) & 0xF) as usize,
                defaults.theoretical_experience,
            ),
            practical_experience: self.profile_or(
                ProfileField::PracticalExperience,
                (packed & 0xF) as usize,
                defaults.practical_experience,
            ),
        }
    }

    fn profile_or(&self, field: ProfileField, index: usize, default: String) -> String {
        self.catalog
            .profile_label(field, index)
            .map(str::to_string)
            .unwrap_or(default)
    }
}

/// Split into exactly two parts on `sep`; `None` for any other count
fn split_two(s: &str, sep: char) -> Option<(&str, &str)> {
    let mut parts = s.splitn(3, sep);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(b), None) => Some((a, b)),
        _ => None,
    }
}
