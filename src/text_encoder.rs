use std::io::Write;

use crate::Result;
use crate::footnotes::Footnote;
use crate::render_encoder::{RenderEncoder, RenderItem};
use crate::time_format::format_time;
use crate::transcript::{RenderLine, RenderParagraph};
use crate::vtt_parser::{Cue, CueSegment};

/// A `RenderEncoder` that writes a plain-text reading view.
///
/// ```text
/// {index 0} [00:00:00] JANE DOE: Hello there.[1]
/// I grew up on a farm.
///
/// 1. Some context <http://example.com>
/// ```
///
/// Items are separated by a blank line. Blank paragraphs and untimed blank lines are
/// skipped.
pub struct TextEncoder<W: Write> {
    w: W,

    /// Whether any item has been written yet (controls separators).
    started: bool,

    closed: bool,
}

impl<W: Write> TextEncoder<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            started: false,
            closed: false,
        }
    }

    fn separate(&mut self) -> Result<()> {
        if self.started {
            writeln!(&mut self.w)?;
        }
        self.started = true;
        Ok(())
    }

    fn write_paragraph(&mut self, para: &RenderParagraph) -> Result<()> {
        if para.is_blank() {
            return Ok(());
        }
        self.separate()?;

        for line in &para.lines {
            if line.is_blank() && line.timestamp.is_none() && line.index_ordinal.is_none() {
                continue;
            }
            writeln!(&mut self.w, "{}", format_line(line))?;
        }
        Ok(())
    }

    fn write_cue(&mut self, cue: &Cue) -> Result<()> {
        self.separate()?;

        let mut out = String::new();
        if let (true, Some(start)) = (cue.show_timestamp, cue.start) {
            out.push_str(&format!("[{}] ", format_time(start)));
        }
        for seg in &cue.segments {
            match seg {
                CueSegment::Speaker(name) => out.push_str(&format!("{name}: ")),
                CueSegment::Text(text) => out.push_str(text),
            }
        }

        writeln!(&mut self.w, "{}", out.trim_end())?;
        Ok(())
    }

    fn write_footnote(&mut self, note: &Footnote) -> Result<()> {
        self.separate()?;

        match &note.url {
            Some(url) => writeln!(&mut self.w, "{}. {} <{url}>", note.ordinal, note.text)?,
            None => writeln!(&mut self.w, "{}. {}", note.ordinal, note.text)?,
        }
        Ok(())
    }

    fn write_index(
        &mut self,
        ordinal: usize,
        line: Option<usize>,
        time: u64,
        title: &str,
    ) -> Result<()> {
        self.separate()?;

        let place = line.map_or_else(|| "unanchored".to_owned(), |l| format!("line {l}"));
        writeln!(
            &mut self.w,
            "{{index {ordinal}}} [{}] {title} ({place})",
            format_time(time)
        )?;
        Ok(())
    }
}

fn format_line(line: &RenderLine) -> String {
    let mut out = String::new();
    if let Some(ordinal) = line.index_ordinal {
        out.push_str(&format!("{{index {ordinal}}} "));
    }
    if let Some(ts) = line.timestamp {
        out.push_str(&format!("[{}] ", format_time(ts)));
    }
    if let Some(speaker) = &line.speaker {
        out.push_str(&format!("{speaker}: "));
    }
    out.push_str(&line.plain_text());
    out.trim_end().to_owned()
}

impl<W: Write> RenderEncoder for TextEncoder<W> {
    fn write_item(&mut self, item: RenderItem<'_>) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write item: encoder is already closed",
            ));
        }

        match item {
            RenderItem::Paragraph(p) => self.write_paragraph(p),
            RenderItem::Cue(c) => self.write_cue(c),
            RenderItem::Footnote(f) => self.write_footnote(f),
            RenderItem::Index {
                ordinal,
                line,
                time,
                title,
            } => self.write_index(ordinal, line, time, title),
        }
    }

    /// Flush the underlying writer. This is idempotent.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.w.flush()?;
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexAlignment, IndexPoint, align};
    use crate::sync::decode;
    use crate::transcript::segment;
    use crate::vtt_parser::parse;

    fn render(items: &[RenderItem<'_>]) -> anyhow::Result<String> {
        let mut out = Vec::new();
        let mut enc = TextEncoder::new(&mut out);
        for item in items {
            enc.write_item(*item)?;
        }
        enc.close()?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn text_close_without_items_emits_nothing() -> anyhow::Result<()> {
        assert_eq!(render(&[])?, "");
        Ok(())
    }

    #[test]
    fn text_renders_paragraphs_with_anchors() -> anyhow::Result<()> {
        let sync = decode("1:4");
        let alignment = align(&sync, &[IndexPoint::at(0, "Start")]);
        let paragraphs = segment(
            "ANN: Hi.[[footnote]]1[[/footnote]]\nHow are you?\n\n\nBOB: Fine.\n",
            &sync,
            &alignment,
        );
        let items: Vec<_> = paragraphs.iter().map(RenderItem::Paragraph).collect();

        assert_eq!(
            render(&items)?,
            "{index 0} [00:00:00] ANN: Hi.[1]\nHow are you?\n\n[00:00:00] BOB: Fine.\n"
        );
        Ok(())
    }

    #[test]
    fn text_renders_cues_and_footnotes() -> anyhow::Result<()> {
        let cues = parse(
            "00:00:05.000 --> 00:00:06.000\n<v Ann>One\n\n00:00:05.500 --> 00:00:07.000\nTwo\n",
        );
        let note = Footnote {
            ordinal: 1,
            url: Some("http://example.com".into()),
            text: "Context".into(),
        };

        let mut items: Vec<_> = cues.iter().map(RenderItem::Cue).collect();
        items.push(RenderItem::Footnote(&note));

        assert_eq!(
            render(&items)?,
            "[00:00:05] Ann: One\n\nTwo\n\n1. Context <http://example.com>\n"
        );
        Ok(())
    }

    #[test]
    fn text_renders_index_entries() -> anyhow::Result<()> {
        let alignment = IndexAlignment::default();
        let item = RenderItem::Index {
            ordinal: 2,
            line: alignment.line_of(2),
            time: 3725,
            title: "Moving away",
        };
        assert_eq!(
            render(&[item])?,
            "{index 2} [01:02:05] Moving away (unanchored)\n"
        );
        Ok(())
    }

    #[test]
    fn text_write_after_close_errors() -> anyhow::Result<()> {
        let note = Footnote {
            ordinal: 1,
            url: None,
            text: "x".into(),
        };
        let mut out = Vec::new();
        let mut enc = TextEncoder::new(&mut out);
        enc.close()?;
        let err = enc.write_item(RenderItem::Footnote(&note)).unwrap_err();
        assert!(err.to_string().contains("already closed"));
        Ok(())
    }
}
