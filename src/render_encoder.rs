use serde::Serialize;

use crate::Result;
use crate::footnotes::Footnote;
use crate::transcript::RenderParagraph;
use crate::vtt_parser::Cue;

/// One unit of rendered output, in the order a reader encounters it.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderItem<'a> {
    Paragraph(&'a RenderParagraph),
    Cue(&'a Cue),
    Footnote(&'a Footnote),
    /// An index point and the transcript line it is anchored on, if any.
    Index {
        ordinal: usize,
        line: Option<usize>,
        time: u64,
        title: &'a str,
    },
}

pub trait RenderEncoder {
    fn write_item(&mut self, item: RenderItem<'_>) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}
