//! Local-time formatting for timeline labels

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Convert an epoch in milliseconds to local time
pub fn to_local(epoch_ms: i64, tz: &Tz) -> DateTime<Tz> {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms)
        .unwrap_or_default()
        .with_timezone(tz)
}

/// Calendar date bucket of an epoch
pub fn local_date(epoch_ms: i64, tz: &Tz) -> NaiveDate {
    to_local(epoch_ms, tz).date_naive()
}

/// `3:04 PM`
pub fn time_of_day(epoch_ms: i64, tz: &Tz) -> String {
    to_local(epoch_ms, tz).format("%-I:%M %p").to_string()
}

/// `Oct 18, 3:04 PM`
pub fn date_time(epoch_ms: i64, tz: &Tz) -> String {
    to_local(epoch_ms, tz).format("%b %-d, %-I:%M %p").to_string()
}

/// `Oct 18, 2026`
pub fn date_label(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// `2026-10-18 3:04pm PDT`
pub fn header_timestamp(now: DateTime<Utc>, tz: &Tz) -> String {
    now.with_timezone(tz).format("%Y-%m-%d %-I:%M%P %Z").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // 2026-10-18 15:04:00 UTC
    const EPOCH: i64 = 1_792_335_840_000;

    #[test]
    fn test_utc_formats() {
        let tz = chrono_tz::UTC;
        assert_eq!(time_of_day(EPOCH, &tz), "3:04 PM");
        assert_eq!(date_time(EPOCH, &tz), "Oct 18, 3:04 PM");
        assert_eq!(date_label(local_date(EPOCH, &tz)), "Oct 18, 2026");
    }

    #[test]
    fn test_header_timestamp_has_abbreviation() {
        let now = Utc.timestamp_millis_opt(EPOCH).unwrap();
        assert_eq!(
            header_timestamp(now, &chrono_tz::America::Los_Angeles),
            "2026-10-18 8:04am PDT"
        );
        assert_eq!(header_timestamp(now, &chrono_tz::UTC), "2026-10-18 3:04pm UTC");
    }

    #[test]
    fn test_date_bucket_follows_timezone() {
        // 03:00 UTC is still the previous day in New York
        let early = 1_792_292_400_000;
        assert_eq!(
            local_date(early, &chrono_tz::UTC),
            NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
        );
        assert_eq!(
            local_date(early, &chrono_tz::America::New_York),
            NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
        );
    }
}
