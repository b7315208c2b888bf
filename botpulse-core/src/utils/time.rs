use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};

/// Today as a local calendar date. All "defaults to today" query parameters
/// resolve through here so day boundaries follow the operator's wall clock.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// The first instant of the local calendar day `date`, as UTC.
pub fn local_day_start(date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    match Local.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        // Midnight was skipped by a DST jump; the day starts at the first
        // valid instant after the gap.
        LocalResult::None => Local
            .from_local_datetime(&(midnight + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&midnight)),
    }
}

/// Half-open instant range `[start, end)` covering exactly the local
/// calendar day `date`.
pub fn day_range(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    (local_day_start(date), local_day_start(date + Duration::days(1)))
}

/// Half-open instant range covering the `days` local calendar days ending at
/// and including `end` (a trailing window, day-count arithmetic rather than
/// calendar-week or calendar-month alignment).
pub fn trailing_window(end: NaiveDate, days: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    (
        local_day_start(end - Duration::days(days - 1)),
        local_day_start(end + Duration::days(1)),
    )
}

/// The local calendar date an instant falls on.
pub fn local_date_of(ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&Local).date_naive()
}

/// All dates in `[end - (days - 1), end]`, ascending. Empty when `days <= 0`.
pub fn date_sequence(end: NaiveDate, days: i64) -> Vec<NaiveDate> {
    (0..days.max(0))
        .map(|i| end - Duration::days(days - 1 - i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_range_is_one_local_day() {
        let d = date(2025, 3, 10);
        let (start, end) = day_range(d);
        assert!(start < end);
        assert_eq!(local_date_of(start), d);
        assert_eq!(local_date_of(end), date(2025, 3, 11));
    }

    #[test]
    fn trailing_window_spans_inclusive_days() {
        let end = date(2025, 3, 10);
        let (start, until) = trailing_window(end, 7);
        assert_eq!(local_date_of(start), date(2025, 3, 4));
        // The range is half-open: `until` is the first instant past the window.
        assert_eq!(local_date_of(until), date(2025, 3, 11));
    }

    #[test]
    fn single_day_window_matches_day_range() {
        let d = date(2025, 6, 1);
        assert_eq!(trailing_window(d, 1), day_range(d));
    }

    #[test]
    fn date_sequence_is_dense_and_ascending() {
        let seq = date_sequence(date(2025, 3, 10), 7);
        assert_eq!(seq.len(), 7);
        assert_eq!(seq[0], date(2025, 3, 4));
        assert_eq!(seq[6], date(2025, 3, 10));
        for pair in seq.windows(2) {
            assert_eq!(pair[1], pair[0] + Duration::days(1));
        }
    }

    #[test]
    fn date_sequence_empty_for_non_positive_days() {
        assert!(date_sequence(date(2025, 3, 10), 0).is_empty());
        assert!(date_sequence(date(2025, 3, 10), -3).is_empty());
    }
}
