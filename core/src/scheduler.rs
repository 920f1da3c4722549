//! Daily schedule — when the accrual sweep fires.
//!
//! The core never owns a timer. The runner asks for the next fire
//! instant, sleeps, and invokes `AccrualEngine::run_daily(now)` itself;
//! tests call `run_daily` directly with whatever instant they need.

use crate::config::AccrualConfig;
use crate::error::{DeskError, DeskResult};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime};

/// A fixed wall-clock fire time at a fixed UTC offset.
/// A fixed offset has no DST gaps or folds, so every local time maps to
/// exactly one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    fire_time: NaiveTime,
    offset: FixedOffset,
}

impl DailySchedule {
    pub fn new(fire_hour: u32, fire_minute: u32, utc_offset_minutes: i32) -> DeskResult<Self> {
        let fire_time = NaiveTime::from_hms_opt(fire_hour, fire_minute, 0).ok_or_else(|| {
            DeskError::InvalidInput {
                what: format!("invalid fire time {fire_hour:02}:{fire_minute:02}"),
            }
        })?;
        let offset = FixedOffset::east_opt(utc_offset_minutes * 60).ok_or_else(|| {
            DeskError::InvalidInput {
                what: format!("invalid UTC offset of {utc_offset_minutes} minutes"),
            }
        })?;
        Ok(Self { fire_time, offset })
    }

    pub fn from_config(config: &AccrualConfig) -> DeskResult<Self> {
        Self::new(
            config.fire_hour,
            config.fire_minute,
            config.utc_offset_minutes,
        )
    }

    /// The calendar date `now` falls on in the schedule's timezone.
    /// Accrual idempotency is anchored to this date.
    pub fn local_date(&self, now: DateTime<FixedOffset>) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }

    /// The first instant strictly after `now` at the configured local
    /// fire time.
    pub fn next_fire_after(&self, now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        let today = self.local_date(now);
        let today_fire = self.instant_on(today);
        if today_fire > now {
            today_fire
        } else {
            self.instant_on(today + Duration::days(1))
        }
    }

    fn instant_on(&self, date: NaiveDate) -> DateTime<FixedOffset> {
        let local = date.and_time(self.fire_time);
        DateTime::from_naive_utc_and_offset(local - self.offset, self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn midnight_pkt() -> DailySchedule {
        DailySchedule::new(0, 0, 5 * 60).unwrap()
    }

    fn at(rfc3339: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap()
    }

    #[test]
    fn fires_at_next_local_midnight() {
        let schedule = midnight_pkt();
        // 21:30 UTC on the 3rd is 02:30 on the 4th in +05:00, so the
        // next midnight is the 5th's.
        let next = schedule.next_fire_after(at("2024-06-03T21:30:00+00:00"));
        assert_eq!(next, at("2024-06-05T00:00:00+05:00"));
    }

    #[test]
    fn fire_instant_is_strictly_after_now() {
        let schedule = midnight_pkt();
        let exactly_midnight = at("2024-06-04T00:00:00+05:00");
        let next = schedule.next_fire_after(exactly_midnight);
        assert_eq!(next, at("2024-06-05T00:00:00+05:00"));
    }

    #[test]
    fn same_day_when_fire_time_still_ahead() {
        let schedule = DailySchedule::new(23, 45, 5 * 60).unwrap();
        let next = schedule.next_fire_after(at("2024-06-04T10:00:00+05:00"));
        assert_eq!(next, at("2024-06-04T23:45:00+05:00"));
    }

    #[test]
    fn rolls_over_month_boundaries() {
        let schedule = midnight_pkt();
        let next = schedule.next_fire_after(at("2024-01-31T12:00:00+05:00"));
        assert_eq!(next, at("2024-02-01T00:00:00+05:00"));
    }

    #[test]
    fn local_date_respects_the_anchor_offset() {
        let schedule = midnight_pkt();
        // 20:00 UTC is already the next day at +05:00.
        assert_eq!(
            schedule.local_date(at("2024-06-03T20:00:00+00:00")),
            NaiveDate::from_ymd_opt(2024, 6, 4).unwrap()
        );
        assert_eq!(
            schedule.local_date(at("2024-06-03T18:59:00+00:00")),
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
        );
    }

    #[test]
    fn rejects_nonsense_configuration() {
        assert!(DailySchedule::new(24, 0, 0).is_err());
        assert!(DailySchedule::new(0, 60, 0).is_err());
        assert!(DailySchedule::new(0, 0, 24 * 60 + 1).is_err());
    }
}
