//! Uptime clock formatting.
//!
//! The clock shows time since boot wrapped to a 24-hour cycle. There is
//! no RTC behind it, so it is not wall-clock time.

use core::fmt::Write;

use heapless::String;

const SECS_PER_DAY: i64 = 86_400;
const SECS_PER_HOUR: i64 = 3_600;

/// Always exactly `"HH:MM"`.
pub type ClockText = String<5>;

/// Format elapsed milliseconds as a zero-padded 24h `"HH:MM"`.
pub fn format_clock(elapsed_millis: i64) -> ClockText {
    let total_secs = (elapsed_millis / 1000).rem_euclid(SECS_PER_DAY);
    let hours = (total_secs / SECS_PER_HOUR) % 24;
    let minutes = (total_secs % SECS_PER_HOUR) / 60;

    let mut text = ClockText::new();
    let _ = write!(text, "{hours:02}:{minutes:02}");
    text
}
