//! High-level API for turning a record into render units.
//!
//! `Viewer` wires the pieces together:
//! - caption track present: parse cues
//! - otherwise: decode sync → align index points → extract footnotes → segment transcript
//!
//! and then streams the result through an encoder selected by `Opts`. The lower-level
//! modules stay usable (and testable) on their own.

use std::io::{BufWriter, Write};

use serde::Serialize;
use tracing::debug;

use crate::footnotes::{self, Footnote, FootnoteExtraction};
use crate::index::{self, IndexAlignment, IndexPoint};
use crate::json_array_encoder::JsonArrayEncoder;
use crate::opts::{Opts, TranscriptLanguage};
use crate::output_type::OutputType;
use crate::record::Record;
use crate::render_encoder::{RenderEncoder, RenderItem};
use crate::sync;
use crate::text_encoder::TextEncoder;
use crate::transcript::{self, RenderParagraph};
use crate::vtt_parser::{self, Cue};
use crate::{Error, Result};

/// Everything a renderer needs to lay out a record, with no further parsing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rendering {
    pub body: Body,

    /// Index points in record order, with the line each one is anchored on.
    pub index: Vec<IndexEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Body {
    Transcript {
        paragraphs: Vec<RenderParagraph>,
        footnotes: Vec<Footnote>,
        alignment: IndexAlignment,
    },
    Captions {
        cues: Vec<Cue>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    pub ordinal: usize,
    pub time: u64,
    pub title: String,

    /// `None` in caption mode, without sync data, or when a later index point took the line.
    pub line: Option<usize>,
}

impl Rendering {
    /// The transcript line index point `ordinal` is anchored on.
    pub fn index_line(&self, ordinal: usize) -> Option<usize> {
        self.index.get(ordinal).and_then(|e| e.line)
    }

    /// Render units in reading order: body, then footnotes, then the index.
    pub fn items(&self) -> Vec<RenderItem<'_>> {
        let mut items = Vec::new();

        match &self.body {
            Body::Transcript {
                paragraphs,
                footnotes,
                ..
            } => {
                items.extend(paragraphs.iter().map(RenderItem::Paragraph));
                items.extend(footnotes.iter().map(RenderItem::Footnote));
            }
            Body::Captions { cues } => items.extend(cues.iter().map(RenderItem::Cue)),
        }

        items.extend(self.index.iter().map(|e| RenderItem::Index {
            ordinal: e.ordinal,
            line: e.line,
            time: e.time,
            title: &e.title,
        }));

        items
    }
}

/// The main high-level entry point.
///
/// A `Viewer` is cheap: it only carries options. Build one per output configuration and
/// reuse it across records.
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    opts: Opts,
}

impl Viewer {
    pub fn new(opts: Opts) -> Self {
        Self { opts }
    }

    pub fn opts(&self) -> &Opts {
        &self.opts
    }

    /// Run the pipeline for the configured language.
    ///
    /// A non-blank caption track takes precedence over the transcript. A missing sync
    /// string means "no timing", and a missing transcript renders as empty.
    pub fn build(&self, record: &Record) -> Rendering {
        let lang = self.opts.language;
        let points = &record.index_points;

        if let Some(vtt) = record.vtt_for(lang).filter(|v| !v.trim().is_empty()) {
            let cues = vtt_parser::parse(vtt);
            debug!(cues = cues.len(), "rendering caption track");

            return Rendering {
                body: Body::Captions { cues },
                index: index_entries(points, &IndexAlignment::default(), lang),
            };
        }

        let sync = sync::decode(record.sync_for(lang).unwrap_or_default());
        let alignment = index::align(&sync, points);
        let FootnoteExtraction { body, footnotes } =
            footnotes::extract(record.transcript_for(lang).unwrap_or_default());
        let paragraphs = transcript::segment(&body, &sync, &alignment);

        debug!(
            sync_pairs = sync.len(),
            anchored = alignment.len(),
            footnotes = footnotes.len(),
            paragraphs = paragraphs.len(),
            "rendering transcript"
        );

        Rendering {
            index: index_entries(points, &alignment, lang),
            body: Body::Transcript {
                paragraphs,
                footnotes,
                alignment,
            },
        }
    }

    /// Build the record's rendering and write it to `w` in the configured format.
    pub fn render<W: Write>(&self, record: &Record, w: W) -> Result<()> {
        let rendering = self.build(record);

        // Buffer output for efficiency (especially important for stdout).
        let writer = BufWriter::new(w);

        // We keep this explicit (no trait objects) to avoid lifetime surprises.
        match self.opts.output_type {
            OutputType::Json => {
                let mut encoder = JsonArrayEncoder::new(writer);
                let run_res = write_items(&rendering, &mut encoder);
                merge_run_and_close(run_res, encoder.close())
            }
            OutputType::Text => {
                let mut encoder = TextEncoder::new(writer);
                let run_res = write_items(&rendering, &mut encoder);
                merge_run_and_close(run_res, encoder.close())
            }
        }
    }
}

fn index_entries(
    points: &[IndexPoint],
    alignment: &IndexAlignment,
    lang: TranscriptLanguage,
) -> Vec<IndexEntry> {
    let lines = alignment.lines_by_ordinal();
    points
        .iter()
        .enumerate()
        .map(|(ordinal, point)| IndexEntry {
            ordinal,
            time: point.time,
            title: point.title_in(lang).to_owned(),
            line: lines.get(&ordinal).copied(),
        })
        .collect()
}

fn write_items<E: RenderEncoder>(rendering: &Rendering, encoder: &mut E) -> Result<()> {
    for item in rendering.items() {
        encoder.write_item(item)?;
    }
    Ok(())
}

fn merge_run_and_close(run_res: Result<()>, close_res: Result<()>) -> Result<()> {
    match (run_res, close_res) {
        (Ok(()), Ok(())) => Ok(()),
        (Ok(()), Err(close_err)) => Err(close_err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => Err(Error::msg(format!(
            "{err} (closing the encoder also failed: {close_err})"
        ))),
    }
}
