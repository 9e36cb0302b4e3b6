//! A forgiving WebVTT caption parser.
//!
//! We only need enough structure to render a caption track as a readable, seekable
//! transcript: each cue's start time and its speaker-attributed text.
//!
//! Failure policy:
//! - A timing line whose start timestamp does not parse still yields a cue, with
//!   `start: None`.
//! - Everything after the first blank line of a cue (identifiers of the next cue,
//!   `NOTE` blocks, trailing metadata) is ignored.
//! - Markup other than voice tags is stripped.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// A whole line shaped like `<start> --> <end> [settings]`, where `<start>` is made of
/// digits, colons and dots. Other lines containing `-->` are cue text.
static TIMING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*([\d:.]+)[ \t]+-->[ \t]+\S+[^\n]*$").unwrap());

/// `[HH:]MM:SS.mmm`
static TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:(\d+):)?(\d{2}):(\d{2})\.(\d{3})$").unwrap());

/// `<v Name>` or `<v.class.other Name>`
static VOICE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<v(?:\.[^\s>]*)*\s+([^>]*)>").unwrap());

static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CueSegment {
    Speaker(String),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cue {
    /// Whole seconds; `None` when the timing line could not be parsed.
    pub start: Option<u64>,

    /// False when the previous cue has the same start, so the timestamp anchor is
    /// shown once per distinct start time. Always false for `start: None`.
    pub show_timestamp: bool,

    pub segments: Vec<CueSegment>,
}

impl Cue {
    /// The cue's text without speaker labels.
    pub fn plain_text(&self) -> String {
        self.segments
            .iter()
            .filter_map(|s| match s {
                CueSegment::Text(t) => Some(t.as_str()),
                CueSegment::Speaker(_) => None,
            })
            .collect()
    }
}

/// Parse a caption track into cues, in source order.
pub fn parse(vtt: &str) -> Vec<Cue> {
    let vtt = vtt.replace("\r\n", "\n").replace('\r', "\n");

    let timings: Vec<_> = TIMING_LINE.captures_iter(&vtt).collect();
    let mut cues = Vec::with_capacity(timings.len());
    let mut prev_start: Option<Option<u64>> = None;

    for (i, caps) in timings.iter().enumerate() {
        let (Some(line), Some(start_token)) = (caps.get(0), caps.get(1)) else {
            continue;
        };

        let block_end = timings
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(vtt.len(), |m| m.start());
        let block = cue_text(&vtt[line.end()..block_end]);

        let start = parse_timestamp(start_token.as_str());
        // `None` repeats a previous `None`, but never shows an anchor anyway.
        let repeated = prev_start == Some(start);
        prev_start = Some(start);

        cues.push(Cue {
            start,
            show_timestamp: start.is_some() && !repeated,
            segments: split_voices(block),
        });
    }

    cues
}

/// Parse `[HH:]MM:SS.mmm` into whole seconds. Minutes or seconds above 59 are invalid.
pub fn parse_timestamp(s: &str) -> Option<u64> {
    let caps = TIMESTAMP.captures(s.trim())?;

    let hours: u64 = match caps.get(1) {
        Some(h) => h.as_str().parse().ok()?,
        None => 0,
    };
    let minutes: u64 = caps[2].parse().ok()?;
    let seconds: u64 = caps[3].parse().ok()?;

    if minutes > 59 || seconds > 59 {
        return None;
    }

    hours
        .checked_mul(3600)?
        .checked_add(minutes * 60 + seconds)
}

/// The caption text following a timing line, cut at the first blank line.
fn cue_text(block: &str) -> &str {
    let block = block.strip_prefix('\n').unwrap_or(block);
    let block = match block.find("\n\n") {
        Some(end) => &block[..end],
        None => block,
    };
    block.trim_end_matches('\n')
}

fn split_voices(text: &str) -> Vec<CueSegment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in VOICE_TAG.captures_iter(text) {
        let (Some(tag), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };

        push_text(&mut segments, &text[last..tag.start()]);
        segments.push(CueSegment::Speaker(name.as_str().trim().to_owned()));
        last = tag.end();
    }

    push_text(&mut segments, &text[last..]);
    segments
}

fn push_text(segments: &mut Vec<CueSegment>, raw: &str) {
    let stripped = ANY_TAG.replace_all(raw, "");
    let text = decode_entities(&stripped);
    if !text.is_empty() {
        segments.push(CueSegment::Text(text));
    }
}

fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_owned();
    }

    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", "\u{a0}")
        .replace("&lrm;", "\u{200e}")
        .replace("&rlm;", "\u{200f}")
        .replace("&amp;", "&")
}
