use crate::output_type::OutputType;

/// Which of a record's two transcript languages to render.
///
/// Records carry a primary transcript and, optionally, a translation in the `*_alt`
/// fields (sync, transcript, caption track and index point text).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TranscriptLanguage {
    #[default]
    Primary,
    Alternate,
}

/// Options that control how a record is rendered.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// The CLI is responsible for mapping user input into this type so that other
/// frontends (tests, batch jobs, embedding players) can construct options programmatically.
#[derive(Debug, Clone, Default)]
pub struct Opts {
    /// Primary transcript or its translation.
    pub language: TranscriptLanguage,

    /// The desired output format for rendered units.
    pub output_type: OutputType,
}
