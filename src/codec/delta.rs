//! Differential coding of coordinate sequences
//!
//! Answers arrive in presentation order, not index order, so differences
//! may be negative; they are still usually much smaller in magnitude than
//! the coordinates themselves, which keeps the big integer the radix
//! stage builds from them short.

/// First value verbatim, then successive differences
pub fn encode(coords: &[u32]) -> Vec<i64> {
    let mut deltas = Vec::with_capacity(coords.len());
    let mut prev: i64 = 0;
    for (i, &c) in coords.iter().enumerate() {
        let value = c as i64;
        deltas.push(if i == 0 { value } else { value - prev });
        prev = value;
    }
    deltas
}

/// Running prefix sum, the raw inverse of [`encode`]
///
/// Returns the raw running values: a corrupt sequence can momentarily go
/// negative and later recover, so chaining must see the negative value.
/// The payload layer drops any reconstructed value that does not fit a
/// coordinate word (defensive skip, not an error).
pub fn decode(deltas: &[i64]) -> Vec<i64> {
    let mut coords = Vec::with_capacity(deltas.len());
    let mut acc: i64 = 0;
    for (i, &d) in deltas.iter().enumerate() {
        acc = if i == 0 { d } else { acc + d };
        coords.push(acc);
    }
    coords
}
