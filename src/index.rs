//! Index points and their placement on transcript lines.
//!
//! Index points carry their own recording time, independent of the line-level sync
//! data. To anchor one in the transcript we walk the sync map alongside the (time
//! ordered) index points and either hit an exact sync entry or interpolate a line
//! number between the two surrounding entries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::opts::TranscriptLanguage;
use crate::sync::SyncMap;

/// A named point of interest in the recording.
///
/// Its position in the record's list (the ordinal) is its identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexPoint {
    /// Seconds into the recording.
    pub time: u64,
    pub title: String,
    pub title_alt: String,
    pub partial_transcript: String,
    pub partial_transcript_alt: String,
    pub synopsis: String,
    pub synopsis_alt: String,
    pub keywords: String,
    pub keywords_alt: String,
    pub subjects: String,
    pub subjects_alt: String,
    pub gps_points: Vec<GpsPoint>,
}

impl IndexPoint {
    pub fn at(time: u64, title: impl Into<String>) -> Self {
        Self {
            time,
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn title_in(&self, lang: TranscriptLanguage) -> &str {
        pick(lang, &self.title, &self.title_alt)
    }

    pub fn partial_transcript_in(&self, lang: TranscriptLanguage) -> &str {
        pick(lang, &self.partial_transcript, &self.partial_transcript_alt)
    }

    pub fn synopsis_in(&self, lang: TranscriptLanguage) -> &str {
        pick(lang, &self.synopsis, &self.synopsis_alt)
    }

    /// Keywords are stored `;`-separated.
    pub fn keywords_in(&self, lang: TranscriptLanguage) -> Vec<&str> {
        split_terms(pick(lang, &self.keywords, &self.keywords_alt))
    }

    pub fn subjects_in(&self, lang: TranscriptLanguage) -> Vec<&str> {
        split_terms(pick(lang, &self.subjects, &self.subjects_alt))
    }
}

/// Alternate-language text falls back to the primary text when it is blank.
fn pick<'a>(lang: TranscriptLanguage, primary: &'a str, alt: &'a str) -> &'a str {
    match lang {
        TranscriptLanguage::Alternate if !alt.trim().is_empty() => alt,
        _ => primary,
    }
}

fn split_terms(s: &str) -> Vec<&str> {
    s.split(';')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// A geographic reference attached to an index point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpsPoint {
    pub location: Option<GeoCoordinate>,
    pub zoom: Option<u8>,
    pub text: String,
    pub text_alt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    /// Parse `"lat, lng"`. Anything else (including out-of-range values) is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        let (lat, lng) = s.split_once(',')?;
        let latitude: f64 = lat.trim().parse().ok()?;
        let longitude: f64 = lng.trim().parse().ok()?;

        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return None;
        }

        Some(Self {
            latitude,
            longitude,
        })
    }
}

/// Transcript line → index point ordinal. At most one index point per line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IndexAlignment {
    lines: BTreeMap<usize, usize>,
}

impl IndexAlignment {
    /// The ordinal of the index point anchored on `line`, if any.
    pub fn ordinal_at(&self, line: usize) -> Option<usize> {
        self.lines.get(&line).copied()
    }

    /// The line that index point `ordinal` is anchored on. `None` when it was never
    /// placed or a later index point took over its line.
    pub fn line_of(&self, ordinal: usize) -> Option<usize> {
        self.lines
            .iter()
            .find_map(|(&line, &o)| (o == ordinal).then_some(line))
    }

    /// Ordinal → line for every index point that kept its line, built in one pass.
    pub fn lines_by_ordinal(&self) -> BTreeMap<usize, usize> {
        self.lines
            .iter()
            .map(|(&line, &ordinal)| (ordinal, line))
            .collect()
    }

    /// `(line, ordinal)` pairs in line order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.lines.iter().map(|(&line, &ordinal)| (line, ordinal))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Anchor every index point on a transcript line.
///
/// Index points are expected in time order. For each one we advance a cursor through
/// `sync` until the cursor's time reaches the point's time:
/// - exact hit: the cursor's line
/// - overshoot: a line linearly interpolated between the previous and current pair
/// - time beyond the last pair: the last pair's line
///
/// When two index points land on the same line the later one wins.
pub fn align(sync: &SyncMap, points: &[IndexPoint]) -> IndexAlignment {
    let pairs = sync.pairs();
    let mut alignment = IndexAlignment::default();
    if pairs.is_empty() {
        return alignment;
    }

    let last = pairs.len() - 1;
    let mut cursor = 0;

    for (ordinal, point) in points.iter().enumerate() {
        let target = point.time;
        while cursor < last && pairs[cursor].seconds < target {
            cursor += 1;
        }

        let current = pairs[cursor];
        let line = if current.seconds > target && cursor > 0 {
            let prev = pairs[cursor - 1];
            interpolate_line(prev.line, prev.seconds, current.line, current.seconds, target)
        } else {
            current.line
        };

        trace!(ordinal, time = target, line, "anchored index point");
        alignment.lines.insert(line, ordinal);
    }

    alignment
}

/// `l0 + round((l1 - l0) * (t - t0) / (t1 - t0))`, clamped at line 0.
///
/// Out-of-order index points can put `t` before `t0`; the clamp keeps the result a
/// valid line.
fn interpolate_line(l0: usize, t0: u64, l1: usize, t1: u64, t: u64) -> usize {
    if t1 <= t0 {
        return l1;
    }

    // Multiply before dividing so halfway cases round exactly.
    let offset = (l1 as f64 - l0 as f64) * (t as f64 - t0 as f64) / (t1 as f64 - t0 as f64);
    let line = l0 as f64 + offset.round();
    line.max(0.0) as usize
}
