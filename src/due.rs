use crate::page::Page;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::debug;

/// Labels due within this many whole days (rounded up) get the marker.
pub const DUE_SOON_DAYS: i64 = 3;

pub const DUE_DATE_CLASS: &str = "due_date";
pub const DUE_SOON_CLASS: &str = "due-date-close";

const MILLIS_PER_DAY: i64 = 1000 * 3600 * 24;

/// Parses a due-date label. Bare dates and zone-less timestamps are read as UTC.
pub fn parse_due_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|midnight| midnight.and_utc());
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(text) {
        return Some(stamp.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|stamp| stamp.and_utc())
}

/// Whole days from `now` until `due`, rounded towards positive infinity.
pub fn days_until(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (due - now).num_milliseconds();
    let days = millis.div_euclid(MILLIS_PER_DAY);
    if millis.rem_euclid(MILLIS_PER_DAY) == 0 {
        days
    } else {
        days + 1
    }
}

/// Overdue dates count as due soon; unparseable text never does.
pub fn is_due_soon(text: &str, now: DateTime<Utc>) -> bool {
    match parse_due_date(text) {
        Some(due) => days_until(due, now) <= DUE_SOON_DAYS,
        None => {
            debug!(text, "unparseable due date");
            false
        }
    }
}

/// Adds the due-soon marker to every `.due_date span` label that qualifies.
/// Returns how many labels were marked.
pub fn mark_due_soon(page: &mut Page, now: DateTime<Utc>) -> usize {
    let mut marked = 0;
    for label in page.select_within_class(DUE_DATE_CLASS, "span") {
        if is_due_soon(&page.inner_text(label), now) {
            page.add_class(label, DUE_SOON_CLASS);
            marked += 1;
        }
    }
    marked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 15, 10, 30, 0).unwrap()
    }

    #[test]
    fn days_until_rounds_up() {
        let now = now();
        assert_eq!(days_until(now, now), 0);
        assert_eq!(days_until(now + chrono::Duration::hours(1), now), 1);
        assert_eq!(days_until(now + chrono::Duration::days(3), now), 3);
        assert_eq!(days_until(now - chrono::Duration::hours(1), now), 0);
        assert_eq!(days_until(now - chrono::Duration::hours(25), now), -1);
    }

    #[test]
    fn three_days_out_is_due_soon_four_is_not() {
        let midnight = Utc.with_ymd_and_hms(2026, 10, 15, 0, 0, 0).unwrap();
        assert!(is_due_soon("2026-10-18", midnight));
        assert!(!is_due_soon("2026-10-19", midnight));

        assert!(is_due_soon("2026-10-18", now()));
        assert!(!is_due_soon("2026-10-19", now()));
    }

    #[test]
    fn overdue_is_due_soon() {
        assert!(is_due_soon("2026-01-01", now()));
    }

    #[test]
    fn unparseable_text_is_not_due_soon() {
        assert!(!is_due_soon("next tuesday", now()));
        assert!(!is_due_soon("", now()));
    }

    #[test]
    fn accepts_timestamps() {
        assert_eq!(
            parse_due_date("2026-10-16T08:00:00+02:00"),
            Some(Utc.with_ymd_and_hms(2026, 10, 16, 6, 0, 0).unwrap())
        );
        assert_eq!(
            parse_due_date(" 2026-10-16T08:00 "),
            Some(Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap())
        );
    }

    #[test]
    fn mark_due_soon_only_touches_due_date_spans() {
        let mut page = Page::new();
        let root = page.root();
        let soon_box = page.append(root, "div").class(DUE_DATE_CLASS).node();
        let soon = page.append(soon_box, "span").text("2026-10-17").node();
        let later_box = page.append(root, "div").class(DUE_DATE_CLASS).node();
        let later = page.append(later_box, "span").text("2026-12-01").node();
        let stray = page.append(root, "span").text("2026-10-16").node();

        assert_eq!(mark_due_soon(&mut page, now()), 1);
        assert!(page.has_class(soon, DUE_SOON_CLASS));
        assert!(!page.has_class(later, DUE_SOON_CLASS));
        assert!(!page.has_class(stray, DUE_SOON_CLASS));
    }
}
