use super::*;
use chrono::TimeZone;

fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}

#[test]
fn date_key_is_iso_date() {
    assert_eq!(date_key(at(2026, 3, 7, 23, 59, 59)), "2026-03-07");
}

#[test]
fn until_next_midnight_counts_remaining_seconds() {
    let remaining = until_next_midnight(at(2026, 3, 7, 23, 0, 0));
    assert_eq!(remaining, Duration::from_secs(3600));
}

#[test]
fn until_next_midnight_at_midnight_is_full_day() {
    let remaining = until_next_midnight(at(2026, 3, 8, 0, 0, 0));
    assert_eq!(remaining, Duration::from_secs(86_400));
}

#[test]
fn until_next_midnight_crosses_month_end() {
    let remaining = until_next_midnight(at(2026, 1, 31, 12, 0, 0));
    assert_eq!(remaining, Duration::from_secs(12 * 3600));
}

#[test]
fn manual_clock_advances_across_midnight() {
    let clock = ManualClock::new(at(2026, 3, 7, 23, 59, 0));
    assert_eq!(date_key(clock.now()), "2026-03-07");
    clock.advance(Duration::from_secs(120));
    assert_eq!(date_key(clock.now()), "2026-03-08");
}

#[test]
fn manual_clock_set_overrides_time() {
    let clock = ManualClock::new(at(2026, 3, 7, 8, 0, 0));
    clock.set(at(2026, 4, 1, 8, 0, 0));
    assert_eq!(date_key(clock.now()), "2026-04-01");
}
