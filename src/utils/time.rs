// Display formatting for timestamps
//
// Everything is stored as UTC. The admin dashboard and the public pages show
// Korean civil time, which has no daylight saving, so a fixed offset is exact.

use chrono::{DateTime, FixedOffset, Utc};

const KST_OFFSET_SECS: i32 = 9 * 60 * 60;
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn kst() -> FixedOffset {
    FixedOffset::east_opt(KST_OFFSET_SECS).expect("UTC+9 is a valid offset")
}

/// Render `at` as `YYYY-MM-DD HH:MM:SS` in UTC+9.
pub fn format_kst(at: DateTime<Utc>) -> String {
    at.with_timezone(&kst()).format(DISPLAY_FORMAT).to_string()
}
