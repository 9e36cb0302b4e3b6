//! Footnote extraction.
//!
//! Transcripts may end with a block of notes:
//!
//! ```text
//! ...body text with a reference[[footnote]]1[[/footnote]]...
//!
//! [[footnotes]]
//!   [[note]]Some context [[link]]example.com/ref[[/link]][[/note]]
//!   [[note]]Another note[[/note]]
//! [[/footnotes]]
//! ```
//!
//! Notes are numbered by order of appearance, starting at 1. Inline references in the
//! body are left untouched here; the transcript segmenter resolves them.

use serde::Serialize;

const BLOCK_OPEN: &str = "[[footnotes]]";
const BLOCK_CLOSE: &str = "[[/footnotes]]";
const NOTE_OPEN: &str = "[[note]]";
const NOTE_CLOSE: &str = "[[/note]]";
const LINK_OPEN: &str = "[[link]]";
const LINK_CLOSE: &str = "[[/link]]";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Footnote {
    /// 1-based position within the footnote block.
    pub ordinal: usize,
    pub url: Option<String>,
    pub text: String,
}

/// The transcript body with the footnote block removed, plus the parsed notes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FootnoteExtraction {
    pub body: String,
    pub footnotes: Vec<Footnote>,
}

/// Split `transcript` into body text and footnotes.
///
/// The block runs from the first `[[footnotes]]` to the last `[[/footnotes]]`. Text
/// after the block is discarded. Without a complete block the transcript is returned
/// unchanged with no footnotes.
pub fn extract(transcript: &str) -> FootnoteExtraction {
    let Some((body, block)) = footnote_block(transcript) else {
        return FootnoteExtraction {
            body: transcript.to_owned(),
            footnotes: Vec::new(),
        };
    };

    let footnotes = note_contents(block)
        .enumerate()
        .map(|(i, content)| parse_note(i + 1, content))
        .collect();

    FootnoteExtraction {
        body: body.to_owned(),
        footnotes,
    }
}

fn footnote_block(s: &str) -> Option<(&str, &str)> {
    let open = s.find(BLOCK_OPEN)?;
    let inner_start = open + BLOCK_OPEN.len();
    let inner_len = s[inner_start..].rfind(BLOCK_CLOSE)?;
    Some((&s[..open], &s[inner_start..inner_start + inner_len]))
}

/// Contents of each `[[note]]...[[/note]]`, shortest match first.
fn note_contents(block: &str) -> impl Iterator<Item = &str> {
    let mut rest = block;
    std::iter::from_fn(move || {
        let (content, after) = between(rest, NOTE_OPEN, NOTE_CLOSE)?;
        rest = after;
        Some(content)
    })
}

/// Find `open ... close` in `s`, returning the enclosed text and everything after `close`.
fn between<'a>(s: &'a str, open: &str, close: &str) -> Option<(&'a str, &'a str)> {
    let start = s.find(open)? + open.len();
    let len = s[start..].find(close)?;
    Some((&s[start..start + len], &s[start + len + close.len()..]))
}

fn parse_note(ordinal: usize, content: &str) -> Footnote {
    let (text, url) = match content.find(LINK_OPEN) {
        Some(link_at) => match between(&content[link_at..], LINK_OPEN, LINK_CLOSE) {
            Some((link, after)) => {
                let text = format!("{}{}", &content[..link_at], after);
                (text, normalize_url(link))
            }
            None => (content.to_owned(), None),
        },
        None => (content.to_owned(), None),
    };

    Footnote {
        ordinal,
        url,
        text: text.trim().to_owned(),
    }
}

fn normalize_url(raw: &str) -> Option<String> {
    let url = raw.trim();
    if url.is_empty() {
        return None;
    }

    if url.starts_with("http://") || url.starts_with("https://") {
        Some(url.to_owned())
    } else {
        Some(format!("http://{url}"))
    }
}
