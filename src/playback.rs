//! The boundary between rendered output and whatever is playing the recording.
//!
//! Rendered units only carry timestamps. The embedding layer implements [`Seek`] for its
//! player and passes it in when a timestamp is activated; nothing here holds on to it.

use crate::Result;
use crate::transcript::RenderLine;
use crate::vtt_parser::Cue;

/// A player that can jump to a position in the recording.
pub trait Seek {
    fn seek_to(&mut self, seconds: u64) -> Result<()>;
}

/// Seek to the start of a transcript line. Returns `false` when the line has no timestamp.
pub fn jump_to_line<S: Seek>(line: &RenderLine, player: &mut S) -> Result<bool> {
    jump(line.timestamp, player)
}

/// Seek to the start of a caption cue. Returns `false` when the cue has no valid start.
pub fn jump_to_cue<S: Seek>(cue: &Cue, player: &mut S) -> Result<bool> {
    jump(cue.start, player)
}

fn jump<S: Seek>(seconds: Option<u64>, player: &mut S) -> Result<bool> {
    match seconds {
        Some(s) => {
            player.seek_to(s)?;
            Ok(true)
        }
        None => Ok(false),
    }
}
