//! Transcript segmentation into paragraphs and render lines.
//!
//! Each source line becomes one [`RenderLine`]. Lines pick up a timestamp from the sync
//! map, an index anchor from the alignment, and (at the start of a paragraph) a speaker
//! label such as `INTERVIEWER:`. Inline `[[footnote]]N[[/footnote]]` markers become
//! footnote-reference segments.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::index::IndexAlignment;
use crate::sync::SyncMap;

static SPEAKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Z\-.' ]+):(.*)$").unwrap());

static FOOTNOTE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[footnote\]\]([0-9]+)\[\[/footnote\]\]").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TextSegment {
    Text(String),
    /// A reference to the footnote with this ordinal, as written in the marker.
    FootnoteRef(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderLine {
    /// 0-based source line number.
    pub line: usize,
    pub timestamp: Option<u64>,
    pub index_ordinal: Option<usize>,
    pub speaker: Option<String>,
    pub segments: Vec<TextSegment>,
}

impl RenderLine {
    /// The line's text with footnote references rendered as `[N]`.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for seg in &self.segments {
            match seg {
                TextSegment::Text(t) => out.push_str(t),
                TextSegment::FootnoteRef(n) => out.push_str(&format!("[{n}]")),
            }
        }
        out
    }

    pub fn is_blank(&self) -> bool {
        self.speaker.is_none()
            && self.segments.iter().all(|s| match s {
                TextSegment::Text(t) => t.trim().is_empty(),
                TextSegment::FootnoteRef(_) => false,
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderParagraph {
    pub lines: Vec<RenderLine>,
}

impl RenderParagraph {
    /// True when every line is blank and carries no timestamp or index anchor.
    pub fn is_blank(&self) -> bool {
        self.lines
            .iter()
            .all(|l| l.is_blank() && l.timestamp.is_none() && l.index_ordinal.is_none())
    }
}

/// Segment transcript body text into paragraphs.
///
/// A blank line closes the current paragraph once it holds a non-blank line; the blank
/// line itself opens the next paragraph, so runs of blank lines never produce empty
/// paragraphs. The speaker label is only looked for until the paragraph's first
/// non-blank line.
pub fn segment(body: &str, sync: &SyncMap, alignment: &IndexAlignment) -> Vec<RenderParagraph> {
    let mut paragraphs = Vec::new();
    let mut current = RenderParagraph::default();
    let mut has_content = false;

    for (i, raw) in body.split('\n').enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        let blank = line.trim().is_empty();

        if blank && has_content {
            paragraphs.push(std::mem::take(&mut current));
            has_content = false;
        }

        let (speaker, text) = if has_content {
            (None, line)
        } else {
            split_speaker(line)
        };

        current.lines.push(RenderLine {
            line: i,
            timestamp: sync.seconds_at(i),
            index_ordinal: alignment.ordinal_at(i),
            speaker,
            segments: if blank {
                vec![TextSegment::Text(String::new())]
            } else {
                split_footnote_refs(text)
            },
        });

        if !blank {
            has_content = true;
        }
    }

    if !current.lines.is_empty() {
        paragraphs.push(current);
    }

    paragraphs
}

fn split_speaker(line: &str) -> (Option<String>, &str) {
    let Some(caps) = SPEAKER.captures(line) else {
        return (None, line);
    };

    let label = caps[1].trim();
    if label.is_empty() {
        return (None, line);
    }

    let rest = caps.get(2).map_or("", |m| m.as_str());
    (Some(label.to_owned()), rest.trim_start())
}

fn split_footnote_refs(text: &str) -> Vec<TextSegment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in FOOTNOTE_REF.captures_iter(text) {
        // Ordinals too large for usize stay as literal text.
        let (Some(marker), Ok(ordinal)) = (caps.get(0), caps[1].parse::<usize>()) else {
            continue;
        };

        if marker.start() > last {
            segments.push(TextSegment::Text(text[last..marker.start()].to_owned()));
        }
        segments.push(TextSegment::FootnoteRef(ordinal));
        last = marker.end();
    }

    if last < text.len() {
        segments.push(TextSegment::Text(text[last..].to_owned()));
    }
    if segments.is_empty() {
        segments.push(TextSegment::Text(String::new()));
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexPoint, align};
    use crate::sync::decode;

    fn text(s: &str) -> TextSegment {
        TextSegment::Text(s.to_owned())
    }

    fn plain(paragraphs: &[RenderParagraph]) -> Vec<Vec<String>> {
        paragraphs
            .iter()
            .map(|p| p.lines.iter().map(RenderLine::plain_text).collect())
            .collect()
    }

    #[test]
    fn blank_lines_split_paragraphs_without_empty_ones() {
        let body = "one\ntwo\n\n\n\nthree";
        let paragraphs = segment(body, &SyncMap::default(), &IndexAlignment::default());

        assert_eq!(paragraphs.len(), 2);
        assert_eq!(plain(&paragraphs)[0], vec!["one", "two"]);
        assert_eq!(plain(&paragraphs)[1], vec!["", "", "", "three"]);
    }

    #[test]
    fn every_line_is_kept_once() {
        let body = "\n\nA: x\ny\n\nz\n";
        let paragraphs = segment(body, &SyncMap::default(), &IndexAlignment::default());
        let lines: Vec<usize> = paragraphs
            .iter()
            .flat_map(|p| p.lines.iter().map(|l| l.line))
            .collect();
        assert_eq!(lines, (0..body.split('\n').count()).collect::<Vec<_>>());
    }

    #[test]
    fn speaker_is_detected_at_paragraph_start_only() {
        let body = "  MR. O'NEIL-SMITH: Good morning.\nSECOND: not a speaker\n\nJANE DOE:Hi";
        let paragraphs = segment(body, &SyncMap::default(), &IndexAlignment::default());

        let first = &paragraphs[0].lines;
        assert_eq!(first[0].speaker.as_deref(), Some("MR. O'NEIL-SMITH"));
        assert_eq!(first[0].segments, vec![text("Good morning.")]);
        assert_eq!(first[1].speaker, None);
        assert_eq!(first[1].segments, vec![text("SECOND: not a speaker")]);

        let second = &paragraphs[1].lines;
        assert_eq!(second[0].speaker, None);
        assert_eq!(second[1].speaker.as_deref(), Some("JANE DOE"));
        assert_eq!(second[1].segments, vec![text("Hi")]);
    }

    #[test]
    fn lowercase_prefix_is_not_a_speaker() {
        let paragraphs = segment(
            "Note: lowercase",
            &SyncMap::default(),
            &IndexAlignment::default(),
        );
        assert_eq!(paragraphs[0].lines[0].speaker, None);
    }

    #[test]
    fn footnote_markers_become_references() {
        let body = "See[[footnote]]2[[/footnote]] and [[footnote]]10[[/footnote]]";
        let paragraphs = segment(body, &SyncMap::default(), &IndexAlignment::default());

        assert_eq!(
            paragraphs[0].lines[0].segments,
            vec![
                text("See"),
                TextSegment::FootnoteRef(2),
                text(" and "),
                TextSegment::FootnoteRef(10),
            ]
        );
    }

    #[test]
    fn attaches_timestamps_and_index_anchors() {
        let sync = decode("1:2|4");
        let alignment = align(&sync, &[IndexPoint::at(30, "middle")]);
        let body = "zero\none\ntwo\nthree\nfour";
        let paragraphs = segment(body, &sync, &alignment);
        let lines = &paragraphs[0].lines;

        assert_eq!(lines[0].timestamp, Some(0));
        assert_eq!(lines[1].timestamp, None);
        assert_eq!(lines[2].timestamp, Some(0));
        assert_eq!(lines[4].timestamp, Some(60));
        // 30s lies halfway between (2, 0s) and (4, 60s).
        assert_eq!(lines[3].index_ordinal, Some(0));
    }

    #[test]
    fn blank_line_yields_a_single_empty_segment() {
        let paragraphs = segment("a\n\r", &SyncMap::default(), &IndexAlignment::default());
        assert_eq!(paragraphs[1].lines[0].segments, vec![text("")]);
        assert!(paragraphs[1].is_blank());
    }

    #[test]
    fn whitespace_only_line_drops_its_whitespace() {
        let paragraphs = segment("a\n   \nb", &SyncMap::default(), &IndexAlignment::default());
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[1].lines[0].segments, vec![text("")]);
        assert_eq!(paragraphs[1].lines[1].segments, vec![text("b")]);
    }
}
