//! Best-effort US equities session check, used to resolve `auto` mode.
//!
//! Approximates the regular session (9:30-16:00 Eastern) as 13:30-20:00 UTC
//! and excludes weekends. Ignores exchange holidays and the one-hour EST
//! shift; `auto` mode only needs a coarse open/closed answer and callers can
//! always force a mode explicitly.

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};

const OPEN_MINUTE_UTC: u32 = 13 * 60 + 30;
const CLOSE_MINUTE_UTC: u32 = 20 * 60;

/// Whether the US regular trading session is plausibly open at `now`.
pub fn is_regular_session(now: DateTime<Utc>) -> bool {
    if matches!(now.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }
    let minute_of_day = now.hour() * 60 + now.minute();
    (OPEN_MINUTE_UTC..CLOSE_MINUTE_UTC).contains(&minute_of_day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_weekday_session_bounds() {
        // Wednesday 2025-06-04
        assert!(!is_regular_session(utc(2025, 6, 4, 13, 29)));
        assert!(is_regular_session(utc(2025, 6, 4, 13, 30)));
        assert!(is_regular_session(utc(2025, 6, 4, 16, 0)));
        assert!(is_regular_session(utc(2025, 6, 4, 19, 59)));
        assert!(!is_regular_session(utc(2025, 6, 4, 20, 0)));
    }

    #[test]
    fn test_weekend_closed() {
        // Saturday and Sunday mid-session minutes
        assert!(!is_regular_session(utc(2025, 6, 7, 15, 0)));
        assert!(!is_regular_session(utc(2025, 6, 8, 15, 0)));
    }
}
