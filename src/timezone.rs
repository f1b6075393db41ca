use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

/// The current UTC offset of a canonical timezone, e.g. "Pacific/Auckland".
///
/// Returns `None` if the timezone name is unknown.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// The current wall clock time in a canonical timezone.
pub fn local_now(canonical_timezone: &str) -> Option<PrimitiveDateTime> {
    let now = OffsetDateTime::now_utc().to_offset(get_local_offset(canonical_timezone)?);

    Some(PrimitiveDateTime::new(now.date(), now.time()))
}
