use anyhow::{Context, Result, ensure};
use clap::Parser;

use std::io::{self, BufWriter};

use ohms::logging::{self, LogFormat};
use ohms::output_type::OutputType;
use ohms::{Opts, Record, TranscriptLanguage, Viewer};

fn main() -> Result<()> {
    let params = get_params()?;
    logging::init(params.log_format);

    let record = Record::from_path(&params.record_path)
        .with_context(|| format!("failed to load record from '{}'", params.record_path))?;

    if params.alternate_language {
        ensure!(
            record.transcript_alt.is_some() || record.vtt_transcript_alt.is_some(),
            "record '{}' has no alternate-language transcript",
            params.record_path
        );
    }

    let opts = Opts {
        language: if params.alternate_language {
            TranscriptLanguage::Alternate
        } else {
            TranscriptLanguage::Primary
        },
        output_type: params.output_type,
    };

    let stdout = io::stdout();
    Viewer::new(opts).render(&record, BufWriter::new(stdout.lock()))?;
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "ohms")]
#[command(about = "Render a synchronized oral-history transcript")]
struct Params {
    /// Path to a record cache file (XML, or JSON with a `.json` extension).
    #[arg(short = 'r', long = "record")]
    pub record_path: String,

    #[arg(
        short = 'o',
        long = "output-type",
        value_enum,
        default_value_t = OutputType::Text
    )]
    pub output_type: OutputType,

    /// Render the translated transcript (`*_alt` fields).
    #[arg(long = "alt", default_value_t = false)]
    pub alternate_language: bool,

    /// Diagnostic format on stderr. Verbosity comes from `OHMS_LOG`.
    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

fn get_params() -> Result<Params> {
    Ok(Params::parse())
}
