//! The source record: a transcript, its sync data, index points and descriptive metadata.
//!
//! Records usually arrive as an XML cache file:
//!
//! ```xml
//! <ROOT>
//!   <record id="0001">
//!     <title>Interview with Jane Doe</title>
//!     <sync>1:12|30|41</sync>
//!     <transcript>JANE DOE: ...</transcript>
//!     <index>
//!       <point>
//!         <time>90</time>
//!         <title>Childhood</title>
//!         <gpspoints><gps>38.03, -84.50</gps><gps_zoom>12</gps_zoom></gpspoints>
//!       </point>
//!     </index>
//!   </record>
//! </ROOT>
//! ```
//!
//! Parsing is defensive: missing elements become `None`/empty and only a document with no
//! `<record>` at all, or an index point with a negative time, is an error.

use std::path::Path;

use roxmltree::Node;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::index::{GeoCoordinate, GpsPoint, IndexPoint};
use crate::opts::TranscriptLanguage;
use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    pub title: Option<String>,
    pub accession: Option<String>,
    pub duration: Option<String>,

    pub collection_name: Option<String>,
    pub collection_link: Option<String>,
    pub series_name: Option<String>,
    pub series_link: Option<String>,
    pub repository: Option<String>,
    pub rights: Option<String>,
    pub usage: Option<String>,
    pub funding: Option<String>,
    pub user_notes: Option<String>,

    pub language: Option<String>,
    pub transcript_alt_lang: Option<String>,
    pub translate: Option<String>,

    pub fmt: Option<String>,
    pub media_url: Option<String>,
    pub file_name: Option<String>,
    pub kembed: Option<String>,
    pub mediafile: Option<Mediafile>,

    pub sync: Option<String>,
    pub sync_alt: Option<String>,
    pub transcript: Option<String>,
    pub transcript_alt: Option<String>,
    pub vtt_transcript: Option<String>,
    pub vtt_transcript_alt: Option<String>,

    pub index_points: Vec<IndexPoint>,
}

/// Where the recording is hosted. Embedding the player is left to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mediafile {
    pub host: Option<String>,
    pub host_account_id: Option<String>,
    pub host_player_id: Option<String>,
    pub host_clip_id: Option<String>,
    pub clip_format: Option<String>,
}

impl Record {
    /// Parse an XML cache file. The first `<record>` element in the document is used.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let doc = roxmltree::Document::parse(xml)?;
        let record = doc
            .descendants()
            .find(|n| n.has_tag_name("record"))
            .ok_or_else(|| Error::InvalidRecord("document has no <record> element".into()))?;

        let text = |name: &str| child_text(record, name);

        Ok(Self {
            title: text("title"),
            accession: text("accession"),
            duration: text("duration"),
            collection_name: text("collection_name"),
            collection_link: text("collection_link"),
            series_name: text("series_name"),
            series_link: text("series_link"),
            repository: text("repository"),
            rights: text("rights"),
            usage: text("usage"),
            funding: text("funding"),
            user_notes: text("user_notes"),
            language: text("language"),
            transcript_alt_lang: text("transcript_alt_lang"),
            translate: text("translate"),
            fmt: text("fmt"),
            media_url: text("media_url"),
            file_name: text("file_name"),
            kembed: text("kembed"),
            mediafile: child(record, "mediafile").map(parse_mediafile),
            sync: text("sync"),
            sync_alt: text("sync_alt"),
            transcript: text("transcript"),
            transcript_alt: text("transcript_alt"),
            vtt_transcript: text("vtt_transcript"),
            vtt_transcript_alt: text("vtt_transcript_alt"),
            index_points: parse_index(record)?,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a record from disk. A `.json` extension selects JSON; anything else is XML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_xml(&content)
        }
    }

    /// Whether the record advertises a translated transcript.
    pub fn has_translation(&self) -> bool {
        self.translate.as_deref().map(str::trim) == Some("1")
    }

    pub fn sync_for(&self, lang: TranscriptLanguage) -> Option<&str> {
        pick(lang, &self.sync, &self.sync_alt)
    }

    pub fn transcript_for(&self, lang: TranscriptLanguage) -> Option<&str> {
        pick(lang, &self.transcript, &self.transcript_alt)
    }

    pub fn vtt_for(&self, lang: TranscriptLanguage) -> Option<&str> {
        pick(lang, &self.vtt_transcript, &self.vtt_transcript_alt)
    }
}

fn pick<'a>(
    lang: TranscriptLanguage,
    primary: &'a Option<String>,
    alt: &'a Option<String>,
) -> Option<&'a str> {
    match lang {
        TranscriptLanguage::Primary => primary.as_deref(),
        TranscriptLanguage::Alternate => alt.as_deref(),
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

/// All text beneath the direct child `name`, CDATA included.
fn child_text(node: Node, name: &str) -> Option<String> {
    let child = child(node, name)?;
    Some(
        child
            .descendants()
            .filter(|n| n.is_text())
            .filter_map(|n| n.text())
            .collect(),
    )
}

fn parse_mediafile(node: Node) -> Mediafile {
    Mediafile {
        host: child_text(node, "host"),
        host_account_id: child_text(node, "host_account_id"),
        host_player_id: child_text(node, "host_player_id"),
        host_clip_id: child_text(node, "host_clip_id"),
        clip_format: child_text(node, "clip_format"),
    }
}

fn parse_index(record: Node) -> Result<Vec<IndexPoint>> {
    let Some(index) = child(record, "index") else {
        return Ok(Vec::new());
    };

    index
        .children()
        .filter(|n| n.has_tag_name("point"))
        .enumerate()
        .map(|(ordinal, point)| parse_point(ordinal, point))
        .collect()
}

fn parse_point(ordinal: usize, node: Node) -> Result<IndexPoint> {
    let text = |name: &str| child_text(node, name).unwrap_or_default();

    Ok(IndexPoint {
        time: parse_point_time(ordinal, &text("time"))?,
        title: text("title"),
        title_alt: text("title_alt"),
        partial_transcript: text("partial_transcript"),
        partial_transcript_alt: text("partial_transcript_alt"),
        synopsis: text("synopsis"),
        synopsis_alt: text("synopsis_alt"),
        keywords: text("keywords"),
        keywords_alt: text("keywords_alt"),
        subjects: text("subjects"),
        subjects_alt: text("subjects_alt"),
        gps_points: node
            .children()
            .filter(|n| n.has_tag_name("gpspoints"))
            .map(parse_gps)
            .collect(),
    })
}

/// Whole seconds from the leading digits (`"90.5"` → 90). Missing or garbled times fall
/// back to 0; negative times are rejected.
fn parse_point_time(ordinal: usize, raw: &str) -> Result<u64> {
    let raw = raw.trim();
    if raw.starts_with('-') {
        return Err(Error::NegativeTime {
            ordinal,
            value: raw.to_owned(),
        });
    }

    let digits = raw.trim_start_matches('+');
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    match digits[..end].parse() {
        Ok(time) => Ok(time),
        Err(_) => {
            warn!(ordinal, time = raw, "index point has no usable time; using 0");
            Ok(0)
        }
    }
}

fn parse_gps(node: Node) -> GpsPoint {
    GpsPoint {
        location: child_text(node, "gps").and_then(|s| GeoCoordinate::parse(&s)),
        zoom: child_text(node, "gps_zoom").and_then(|s| s.trim().parse().ok()),
        text: child_text(node, "gps_text").unwrap_or_default(),
        text_alt: child_text(node, "gps_text_alt").unwrap_or_default(),
    }
}
