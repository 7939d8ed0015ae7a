//! Custom positional numeral system over a URL-fragment-safe alphabet
//!
//! 85 printable ASCII symbols; `#` and `.` are deliberately absent
//! because they separate structural parts of a link, and `~` never was a
//! symbol for the same reason. A delta sequence is serialized by joining
//! the values as decimal text, reading the bytes of that text as one
//! base-256 big integer, and writing the integer in this alphabet with a
//! length prefix for fail-closed count verification.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use crate::error::{Result, ShareLinkError};

/// Ordered symbol set; a symbol's position is its digit value
pub const ALPHABET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@$%^&*()_+-=[]{}|;:,<>?";

/// Numeral base, `ALPHABET.len()`
pub const RADIX: u32 = 85;

/// Write a big integer in the custom alphabet, most significant first
///
/// Zero encodes as the first symbol (`"A"`), never the empty string.
pub fn to_radix(n: &BigUint) -> String {
    let symbols = ALPHABET.as_bytes();
    n.to_radix_be(RADIX)
        .into_iter()
        .map(|d| symbols[d as usize] as char)
        .collect()
}

/// Inverse of [`to_radix`]; rejects characters outside the alphabet
pub fn from_radix(s: &str) -> Result<BigUint> {
    let mut digits = Vec::with_capacity(s.len());
    for c in s.chars() {
        match ALPHABET.find(c) {
            Some(i) => digits.push(i as u8),
            None => return Err(ShareLinkError::Alphabet(c)),
        }
    }
    Ok(BigUint::from_radix_be(&digits, RADIX).unwrap_or_default())
}

/// Convenience encoder for small plain integers (counts, checksums,
/// packed profiles)
pub fn encode_u64(n: u64) -> String {
    to_radix(&BigUint::from(n))
}

/// Serialize a delta sequence as `"<count>.<blob>"`
pub fn pack_deltas(deltas: &[i64]) -> String {
    let joined = deltas
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let big = BigUint::from_bytes_be(joined.as_bytes());
    format!(
        "{}.{}",
        encode_u64(deltas.len() as u64),
        to_radix(&big)
    )
}

/// Parse `"<count>.<blob>"` back into a delta sequence
///
/// Fail-closed: a wrong separator count is a `Format` error, and a
/// mismatch between the declared and decoded element count is a
/// `CountMismatch` with no partial result. Unparseable fragments inside
/// the blob are discarded and surface through the count check.
pub fn unpack_deltas(s: &str) -> Result<Vec<i64>> {
    let mut parts = s.splitn(3, '.');
    let (count_part, blob_part) = match (parts.next(), parts.next(), parts.next()) {
        (Some(c), Some(b), None) => (c, b),
        _ => {
            return Err(ShareLinkError::Format(
                "answer blob is not <count>.<blob>".to_string(),
            ))
        }
    };

    let declared = from_radix(count_part)?
        .to_usize()
        .ok_or_else(|| ShareLinkError::Format("element count out of range".to_string()))?;

    let big = from_radix(blob_part)?;
    let bytes = if big.is_zero() {
        Vec::new()
    } else {
        big.to_bytes_be()
    };
    // Corrupt blobs can peel to non-UTF-8; lossy replacement keeps the
    // fragments unparseable so they fall to the count check below.
    let joined = String::from_utf8_lossy(&bytes);

    let decoded: Vec<i64> = joined
        .split(',')
        .filter_map(|t| t.parse::<i64>().ok())
        .collect();

    if decoded.len() != declared {
        return Err(ShareLinkError::CountMismatch {
            declared,
            decoded: decoded.len(),
        });
    }
    Ok(decoded)
}
