use time::{
    macros::{format_description, time},
    Date, Duration, OffsetDateTime,
};

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_calendar_date(s: &str) -> Result<Date, time::error::Parse> {
    Date::parse(s.trim(), format_description!("[year]-[month]-[day]"))
}

pub fn format_calendar_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

/// Inclusive UTC bounds of `date`: `00:00:00.000Z ..= 23:59:59.999Z`.
///
/// Day bucketing is always UTC, whatever timezone the caller lives in.
pub fn utc_day_bounds(date: Date) -> (OffsetDateTime, OffsetDateTime) {
    let start = date.midnight().assume_utc();
    let end = date.with_time(time!(23:59:59.999)).assume_utc();
    (start, end)
}

/// Drops sub-millisecond precision so the `.999` end bound never misses an instant.
pub fn truncate_to_millis(ts: OffsetDateTime) -> OffsetDateTime {
    ts - Duration::nanoseconds(i64::from(ts.nanosecond() % 1_000_000))
}

pub fn falls_on(ts: OffsetDateTime, date: Date) -> bool {
    let (start, end) = utc_day_bounds(date);
    ts >= start && ts <= end
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn parses_iso_calendar_dates() {
        assert_eq!(parse_calendar_date("2025-06-15").unwrap(), date!(2025 - 06 - 15));
        assert!(parse_calendar_date("15/06/2025").is_err());
        assert!(parse_calendar_date("2025-02-30").is_err());
        assert!(parse_calendar_date("").is_err());
    }

    #[test]
    fn formats_round_trip() {
        assert_eq!(format_calendar_date(date!(2025 - 01 - 05)), "2025-01-05");
    }

    #[test]
    fn bounds_cover_the_whole_utc_day() {
        let (start, end) = utc_day_bounds(date!(2025 - 06 - 15));
        assert_eq!(start, datetime!(2025-06-15 0:00 UTC));
        assert_eq!(end, datetime!(2025-06-15 23:59:59.999 UTC));
    }

    #[test]
    fn boundary_instants() {
        let day = date!(2025 - 06 - 15);
        assert!(falls_on(datetime!(2025-06-15 0:00 UTC), day));
        assert!(falls_on(datetime!(2025-06-15 23:59:59.999 UTC), day));
        assert!(!falls_on(datetime!(2025-06-16 0:00 UTC), day));
        assert!(!falls_on(datetime!(2025-06-14 23:59:59.999 UTC), day));
    }

    #[test]
    fn truncation_keeps_whole_milliseconds() {
        assert_eq!(
            truncate_to_millis(datetime!(2025-06-15 23:59:59.9995 UTC)),
            datetime!(2025-06-15 23:59:59.999 UTC)
        );
        assert_eq!(
            truncate_to_millis(datetime!(2025-06-15 12:00:00.25 UTC)),
            datetime!(2025-06-15 12:00:00.25 UTC)
        );
        assert!(falls_on(
            truncate_to_millis(datetime!(2025-06-15 23:59:59.999999999 UTC)),
            date!(2025 - 06 - 15)
        ));
    }

    #[test]
    fn offsets_are_normalised_to_utc() {
        // 01:30 at +05:30 is still the 14th in UTC.
        let day = date!(2025 - 06 - 15);
        assert!(!falls_on(datetime!(2025-06-15 1:30 +5:30), day));
        assert!(falls_on(datetime!(2025-06-15 6:00 +5:30), day));
    }
}
