/// Format a second count as `HH:MM:SS`.
///
/// Hours are not wrapped at 24, so a 30-hour offset renders as `30:00:00`.
pub fn format_time(seconds: u64) -> String {
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;

    format!("{h:02}:{m:02}:{s:02}")
}
