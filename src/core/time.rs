use time::{format_description::well_known::Rfc3339, Date, OffsetDateTime, PrimitiveDateTime};

pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

pub(crate) fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

pub(crate) fn format_primitive(value: PrimitiveDateTime) -> String {
    value.assume_utc().format(&Rfc3339).unwrap_or_else(|_| value.assume_utc().to_string())
}

/// Stored timestamps are naive UTC, so the calendar day is just the date part.
pub(crate) fn is_same_utc_day(value: PrimitiveDateTime, day: Date) -> bool {
    value.date() == day
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn format_primitive_outputs_utc_z() {
        assert_eq!(format_primitive(datetime!(2025-01-02 10:20:30)), "2025-01-02T10:20:30Z");
    }

    #[test]
    fn same_day_ignores_time_of_day() {
        let day = date!(2025-03-04);
        assert!(is_same_utc_day(datetime!(2025-03-04 00:00:00), day));
        assert!(is_same_utc_day(datetime!(2025-03-04 23:59:59), day));
        assert!(!is_same_utc_day(datetime!(2025-03-05 00:00:00), day));
        assert!(!is_same_utc_day(datetime!(2025-03-03 23:59:59), day));
    }
}
