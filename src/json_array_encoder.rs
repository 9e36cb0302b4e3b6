use std::io::Write;

use crate::Result;
use crate::render_encoder::{RenderEncoder, RenderItem};

/// A `RenderEncoder` that writes items as a single JSON array.
///
/// Design:
/// - We stream output directly to a `Write` implementation instead of building one large
///   `serde_json::Value`.
/// - The encoder is stateful so we can emit a well-formed JSON array incrementally.
///
/// Example output:
/// ```json
/// [
///   { "kind": "paragraph", "lines": [ ... ] },
///   { "kind": "footnote", "ordinal": 1, "url": null, "text": "..." }
/// ]
/// ```
pub struct JsonArrayEncoder<W: Write> {
    /// The underlying writer we stream JSON into.
    w: W,

    /// Whether we have written the opening `[` of the JSON array.
    started: bool,

    /// Whether the next element will be the first element in the array.
    first: bool,

    /// Whether the encoder has been closed.
    /// Once closed, no further writes are allowed.
    closed: bool,
}

impl<W: Write> JsonArrayEncoder<W> {
    /// Create a new JSON array encoder that writes to the given writer.
    ///
    /// The JSON array is opened lazily on the first write or on close.
    pub fn new(w: W) -> Self {
        Self {
            w,
            started: false,
            first: true,
            closed: false,
        }
    }

    /// Write the opening `[` of the JSON array if we have not already done so.
    fn start_if_needed(&mut self) -> Result<()> {
        if !self.started {
            self.w.write_all(b"[")?;
            self.started = true;
        }
        Ok(())
    }
}

impl<W: Write> RenderEncoder for JsonArrayEncoder<W> {
    /// Serialize a single item and append it to the JSON array.
    fn write_item(&mut self, item: RenderItem<'_>) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write item: encoder is already closed",
            ));
        }

        self.start_if_needed()?;

        // Write a comma before every element except the first.
        if !self.first {
            self.w.write_all(b",")?;
        }
        self.first = false;

        serde_json::to_writer(&mut self.w, &item)?;
        Ok(())
    }

    /// Finalize the JSON array and flush the underlying writer.
    ///
    /// This method is idempotent:
    /// - Calling `close()` multiple times is safe.
    /// - After closing, no further items may be written.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        // Ensure we still output a valid JSON array even if nothing was written.
        self.start_if_needed()?;

        self.w.write_all(b"]")?;
        self.w.flush()?;

        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::footnotes::Footnote;
    use crate::transcript::{RenderLine, RenderParagraph, TextSegment};

    fn paragraph(text: &str) -> RenderParagraph {
        RenderParagraph {
            lines: vec![RenderLine {
                line: 0,
                timestamp: Some(60),
                index_ordinal: None,
                speaker: Some("ANN".into()),
                segments: vec![
                    TextSegment::Text(text.into()),
                    TextSegment::FootnoteRef(1),
                ],
            }],
        }
    }

    #[test]
    fn json_array_close_without_items_emits_empty_array() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = JsonArrayEncoder::new(&mut out);
        enc.close()?;
        assert_eq!(std::str::from_utf8(&out)?, "[]");
        Ok(())
    }

    #[test]
    fn json_array_writes_tagged_items() -> anyhow::Result<()> {
        let para = paragraph("hello");
        let note = Footnote {
            ordinal: 1,
            url: Some("http://example.com".into()),
            text: "see".into(),
        };

        let mut out = Vec::new();
        let mut enc = JsonArrayEncoder::new(&mut out);
        enc.write_item(RenderItem::Paragraph(&para))?;
        enc.write_item(RenderItem::Footnote(&note))?;
        enc.write_item(RenderItem::Index {
            ordinal: 0,
            line: Some(3),
            time: 90,
            title: "Childhood",
        })?;
        enc.close()?;

        let parsed: serde_json::Value = serde_json::from_slice(&out)?;
        let arr = parsed.as_array().expect("expected JSON array");
        assert_eq!(arr.len(), 3);

        assert_eq!(arr[0]["kind"], "paragraph");
        let line = &arr[0]["lines"][0];
        assert_eq!(line["timestamp"], 60);
        assert_eq!(line["speaker"], "ANN");
        assert_eq!(line["segments"][0]["type"], "text");
        assert_eq!(line["segments"][0]["value"], "hello");
        assert_eq!(line["segments"][1]["type"], "footnote_ref");
        assert_eq!(line["segments"][1]["value"], 1);

        assert_eq!(arr[1]["kind"], "footnote");
        assert_eq!(arr[1]["url"], "http://example.com");

        assert_eq!(arr[2]["kind"], "index");
        assert_eq!(arr[2]["line"], 3);
        Ok(())
    }

    #[test]
    fn json_array_close_is_idempotent() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = JsonArrayEncoder::new(&mut out);
        enc.close()?;
        enc.close()?;
        assert_eq!(std::str::from_utf8(&out)?, "[]");
        Ok(())
    }

    #[test]
    fn json_array_write_after_close_errors() -> anyhow::Result<()> {
        let para = paragraph("nope");
        let mut out = Vec::new();
        let mut enc = JsonArrayEncoder::new(&mut out);
        enc.close()?;
        let err = enc.write_item(RenderItem::Paragraph(&para)).unwrap_err();
        assert!(err.to_string().contains("already closed"));
        Ok(())
    }
}
