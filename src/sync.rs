//! Line-to-time synchronization.
//!
//! A sync string looks like `"<chunk minutes>:<token>|<token>|..."`. The token at
//! position `i` names the transcript line that begins `i * chunk` minutes into the
//! recording. Tokens may carry a parenthesized comment, which is ignored:
//!
//! ```text
//! 2:1|3|(skipped a bit)5
//! ```
//!
//! decodes to `[(0, 0), (1, 0), (3, 120), (5, 240)]`.
//!
//! Decoding never fails. A string without a `:` separator yields an empty map, which
//! downstream code treats as "no timing information".

use serde::Serialize;
use tracing::{debug, trace};

use crate::{Error, Result};

/// Transcript line `line` begins at `seconds` into the recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncPair {
    pub line: usize,
    pub seconds: u64,
}

impl SyncPair {
    pub const ORIGIN: SyncPair = SyncPair {
        line: 0,
        seconds: 0,
    };

    pub fn new(line: usize, seconds: u64) -> Self {
        Self { line, seconds }
    }
}

/// An ordered line-to-time mapping.
///
/// Invariants (checked by every constructor):
/// - when non-empty, the first pair is `(0, 0)`
/// - lines are strictly increasing
/// - seconds are non-decreasing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SyncMap {
    pairs: Vec<SyncPair>,
}

impl SyncMap {
    /// Build a map from explicit `(line, seconds)` pairs, rejecting unordered input.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, u64)>,
    {
        let pairs: Vec<SyncPair> = pairs
            .into_iter()
            .map(|(line, seconds)| SyncPair::new(line, seconds))
            .collect();

        match pairs.first() {
            Some(first) if *first != SyncPair::ORIGIN => {
                return Err(Error::MissingSyncOrigin {
                    line: first.line,
                    seconds: first.seconds,
                });
            }
            _ => {}
        }

        for (index, window) in pairs.windows(2).enumerate() {
            let (prev, cur) = (window[0], window[1]);
            if cur.line <= prev.line || cur.seconds < prev.seconds {
                return Err(Error::UnorderedSync {
                    index: index + 1,
                    line: cur.line,
                    seconds: cur.seconds,
                    prev_line: prev.line,
                    prev_seconds: prev.seconds,
                });
            }
        }

        Ok(Self { pairs })
    }

    pub fn pairs(&self) -> &[SyncPair] {
        &self.pairs
    }

    pub fn iter(&self) -> impl Iterator<Item = &SyncPair> {
        self.pairs.iter()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The time at which `line` begins, if the map has an exact entry for it.
    pub fn seconds_at(&self, line: usize) -> Option<u64> {
        self.pairs
            .binary_search_by_key(&line, |p| p.line)
            .ok()
            .map(|i| self.pairs[i].seconds)
    }
}

/// Decode a compact sync string into a [`SyncMap`].
///
/// - Missing `:` separator: empty map.
/// - Chunk size that is zero, negative or not a number: one minute.
/// - Token that is zero, negative or not a number: position skipped.
/// - Token that does not advance past the previous line: position skipped, so the
///   result always satisfies the [`SyncMap`] ordering invariants.
pub fn decode(sync: &str) -> SyncMap {
    let Some((chunk, tokens)) = sync.split_once(':') else {
        debug!(len = sync.len(), "sync string has no chunk separator; no timing available");
        return SyncMap::default();
    };

    let chunk_minutes = match parse_leading_int(chunk) {
        Some(n) if n > 0 => n as u64,
        _ => 1,
    };

    let mut pairs = vec![SyncPair::ORIGIN];
    for (position, token) in strip_comments(tokens).split('|').enumerate() {
        let line = match parse_leading_int(token) {
            Some(n) if n > 0 => n as usize,
            _ => {
                trace!(position, token, "skipping sync token");
                continue;
            }
        };

        // Later positions only grow, so nothing after an overflow is representable.
        let Some(seconds) = (position as u64)
            .checked_mul(chunk_minutes)
            .and_then(|m| m.checked_mul(60))
        else {
            debug!(position, chunk_minutes, "sync time overflows; ignoring remaining tokens");
            break;
        };
        let last = pairs[pairs.len() - 1];
        if line <= last.line {
            debug!(
                position,
                line,
                prev_line = last.line,
                "dropping sync token that does not advance"
            );
            continue;
        }

        pairs.push(SyncPair::new(line, seconds));
    }

    SyncMap { pairs }
}

/// Remove every `(...)` comment. An unterminated `(`, or one whose comment would span a
/// newline, is kept as literal text.
fn strip_comments(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(open) = rest.find('(') {
        let after = &rest[open + 1..];
        match after.find([')', '\n']) {
            Some(close) if after.as_bytes()[close] == b')' => {
                out.push_str(&rest[..open]);
                rest = &after[close + 1..];
            }
            _ => {
                out.push_str(&rest[..=open]);
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Parse the leading decimal integer of `s`, skipping leading whitespace and accepting an
/// optional sign. Trailing garbage is ignored (`"12abc"` → 12).
fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let value: i64 = digits[..end].parse().ok()?;

    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(map: &SyncMap) -> Vec<(usize, u64)> {
        map.iter().map(|p| (p.line, p.seconds)).collect()
    }

    #[test]
    fn decodes_tokens_with_chunk_size_and_comments() {
        let map = decode("2:1|3|(note)5");
        assert_eq!(pairs(&map), vec![(0, 0), (1, 0), (3, 120), (5, 240)]);
    }

    #[test]
    fn missing_separator_yields_empty_map() {
        assert!(decode("bad-format").is_empty());
        assert!(decode("").is_empty());
    }

    #[test]
    fn zero_or_garbage_chunk_defaults_to_one_minute() {
        assert_eq!(pairs(&decode("0:1|2")), vec![(0, 0), (1, 0), (2, 60)]);
        assert_eq!(pairs(&decode("x:1|2")), vec![(0, 0), (1, 0), (2, 60)]);
        assert_eq!(pairs(&decode("-3:1|2")), vec![(0, 0), (1, 0), (2, 60)]);
    }

    #[test]
    fn zero_and_non_numeric_tokens_keep_their_position() {
        let map = decode("1:0|abc||12|30");
        assert_eq!(pairs(&map), vec![(0, 0), (12, 180), (30, 240)]);
    }

    #[test]
    fn tokens_with_trailing_text_use_their_leading_number() {
        assert_eq!(pairs(&decode("1: 4x|9 ")), vec![(0, 0), (4, 0), (9, 60)]);
    }

    #[test]
    fn comments_may_contain_separators() {
        let map = decode("1:5(a|b:c)|8");
        assert_eq!(pairs(&map), vec![(0, 0), (5, 0), (8, 60)]);
    }

    #[test]
    fn unterminated_comment_is_literal() {
        // "(7" fails to parse, so position 1 is skipped.
        assert_eq!(pairs(&decode("1:3|(7|9")), vec![(0, 0), (3, 0), (9, 120)]);
    }

    #[test]
    fn non_advancing_tokens_are_dropped() {
        let map = decode("1:10|5|10|20");
        assert_eq!(pairs(&map), vec![(0, 0), (10, 0), (20, 180)]);
    }

    #[test]
    fn decoded_maps_are_ordered() {
        for input in ["3:4|2|9|9|1|40", "1:|||", "5:(x)1|(y)2|3", "1:99|98|100"] {
            let map = decode(input);
            for w in map.pairs().windows(2) {
                assert!(w[0].line < w[1].line, "{input}");
                assert!(w[0].seconds <= w[1].seconds, "{input}");
            }
        }
    }

    #[test]
    fn huge_chunk_size_stops_at_overflow() {
        let map = decode("100000000000000000:1|2|3|4|5");
        // Positions 0..=3 fit in a u64; position 4 (token "5") would overflow.
        assert_eq!(
            pairs(&map),
            vec![
                (0, 0),
                (1, 0),
                (2, 6_000_000_000_000_000_000),
                (3, 12_000_000_000_000_000_000),
                (4, 18_000_000_000_000_000_000),
            ]
        );
    }

    #[test]
    fn decode_is_deterministic() {
        assert_eq!(decode("2:1|3|5"), decode("2:1|3|5"));
    }

    #[test]
    fn seconds_at_finds_exact_lines_only() {
        let map = decode("1:4|8");
        assert_eq!(map.seconds_at(0), Some(0));
        assert_eq!(map.seconds_at(8), Some(60));
        assert_eq!(map.seconds_at(5), None);
    }

    #[test]
    fn from_pairs_rejects_unordered_input() {
        let err = SyncMap::from_pairs([(0, 0), (10, 60), (5, 120)]).unwrap_err();
        assert!(matches!(err, Error::UnorderedSync { index: 2, .. }));

        let err = SyncMap::from_pairs([(0, 0), (10, 60), (12, 30)]).unwrap_err();
        assert!(matches!(err, Error::UnorderedSync { index: 2, .. }));
    }

    #[test]
    fn from_pairs_requires_origin() {
        let err = SyncMap::from_pairs([(3, 0)]).unwrap_err();
        assert!(matches!(err, Error::MissingSyncOrigin { line: 3, .. }));
        assert!(SyncMap::from_pairs(std::iter::empty()).unwrap().is_empty());
    }
}
