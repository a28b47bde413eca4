//! Conversion from canonical timezone names to UTC offsets for displaying trade times.

use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

/// Get the current UTC offset of `canonical_timezone`, e.g. "Pacific/Auckland".
///
/// Returns `None` if the name is not a known timezone.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Convert `date_time` to the local time of `canonical_timezone`.
///
/// Falls back to UTC, with a warning in the logs, if the timezone is not known.
pub fn to_local_time(date_time: OffsetDateTime, canonical_timezone: &str) -> OffsetDateTime {
    match get_local_offset(canonical_timezone) {
        Some(offset) => date_time.to_offset(offset),
        None => {
            tracing::warn!("Unknown timezone {canonical_timezone}, displaying times in UTC");
            date_time.to_offset(UtcOffset::UTC)
        }
    }
}
