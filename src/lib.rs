//! `ohms`: transcript synchronization and annotation for oral-history records.
//!
//! This crate provides:
//! - Sync string decoding into a line → time map
//! - Index point alignment onto transcript lines
//! - Footnote extraction and transcript segmentation (speakers, anchors, references)
//! - A forgiving WebVTT caption parser
//! - Pluggable output encoders (JSON, plain text)
//!
//! Every parser degrades gracefully on malformed input; only contract violations are
//! reported as errors. Fetching records, drawing them and driving a player are left to
//! the caller.

pub mod error;
pub use error::{Error, Result};

// High-level API (most consumers should start here).
pub mod opts;
pub mod record;
pub mod viewer;

// Core parsing and alignment.
pub mod footnotes;
pub mod index;
pub mod sync;
pub mod time_format;
pub mod transcript;
pub mod vtt_parser;

// Boundary to the embedding media player.
pub mod playback;

// Output selection and encoder interfaces.
pub mod output_type;
pub mod render_encoder;

// Output encoders that serialize render units into various formats.
pub mod json_array_encoder;
pub mod text_encoder;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;

pub use opts::{Opts, TranscriptLanguage};
pub use output_type::OutputType;
pub use record::Record;
pub use viewer::{Body, Rendering, Viewer};
