/// The supported output formats for rendered transcripts and caption tracks.
///
/// Integration notes:
/// - With the `cli` feature, `ValueEnum` allows this enum to be used directly as a CLI flag.
/// - Each variant maps to a concrete `RenderEncoder` implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputType {
    /// Output render units as a JSON array.
    #[default]
    Json,

    /// Output a plain-text reading view.
    Text,
}
