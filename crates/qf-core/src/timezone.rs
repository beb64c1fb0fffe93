//! Timezone resolution and calendar-bound conversion
//!
//! Date filters accept calendar values in a caller-visible timezone and
//! compare against columns stored in UTC. `TimezoneContext` owns both
//! sides: resolving which timezone applies (explicit argument, then
//! package config, then application config, then UTC) and converting
//! local calendar boundaries into UTC instants.
//!
//! A context is resolved once per top-level filter-application call and
//! reused for every bound computed within it, so one call never mixes
//! timezones even if configuration changes concurrently.

use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc,
};
use chrono_tz::Tz;
use tracing::debug;

use crate::config::FilterConfig;
use crate::error::{FilterError, PeriodKind};
use crate::result::FilterResult;

/// Which edge of an interval a local time represents; decides how
/// ambiguous or nonexistent wall times are settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Start,
    End,
}

/// A resolved effective timezone, immutable once constructed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimezoneContext {
    tz: Tz,
}

impl TimezoneContext {
    /// Resolve the effective timezone.
    ///
    /// Precedence: `explicit` argument, then `config.timezone`, then
    /// `config.app_timezone`, then UTC. A name chrono-tz does not know
    /// fails with `UnresolvedTimezone` instead of silently defaulting.
    pub fn resolve(explicit: Option<&str>, config: &FilterConfig) -> FilterResult<Self> {
        let name = explicit
            .map(str::to_string)
            .or_else(|| config.timezone.clone())
            .or_else(|| config.app_timezone.clone())
            .unwrap_or_else(|| "UTC".to_string());

        let tz: Tz = name
            .parse()
            .map_err(|_| FilterError::UnresolvedTimezone { name: name.clone() })?;

        debug!(timezone = tz.name(), "resolved filter timezone");
        Ok(Self { tz })
    }

    /// Context fixed to UTC
    pub fn utc() -> Self {
        Self { tz: Tz::UTC }
    }

    /// IANA name of the resolved timezone
    pub fn name(&self) -> &'static str {
        self.tz.name()
    }

    /// The current year on the wall clock of this timezone
    pub fn current_year(&self) -> i32 {
        Utc::now().with_timezone(&self.tz).year()
    }

    /// Start of the given local calendar day, as a UTC instant
    pub fn day_start_utc(&self, date: NaiveDate) -> DateTime<Utc> {
        self.localize(start_of_day(date), Bound::Start)
    }

    /// End of the given local calendar day (23:59:59.999999), as a UTC
    /// instant
    pub fn day_end_utc(&self, date: NaiveDate) -> DateTime<Utc> {
        self.localize(end_of_day(date), Bound::End)
    }

    /// Inclusive UTC bounds of a local calendar month
    pub fn month_bounds_utc(
        &self,
        year: i32,
        month: u32,
    ) -> FilterResult<(DateTime<Utc>, DateTime<Utc>)> {
        if !(1..=12).contains(&month) {
            return Err(FilterError::InvalidPeriodValue {
                kind: PeriodKind::Month,
                value: month as i64,
            });
        }

        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(
            FilterError::InvalidPeriodValue {
                kind: PeriodKind::Year,
                value: year as i64,
            },
        )?;
        let next_first = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or(FilterError::InvalidPeriodValue {
            kind: PeriodKind::Year,
            value: year as i64,
        })?;
        let last = next_first.pred_opt().unwrap_or(first);

        Ok((self.day_start_utc(first), self.day_end_utc(last)))
    }

    /// Inclusive UTC bounds of a local calendar year
    pub fn year_bounds_utc(&self, year: i32) -> FilterResult<(DateTime<Utc>, DateTime<Utc>)> {
        if !(1000..=9999).contains(&year) {
            return Err(FilterError::InvalidPeriodValue {
                kind: PeriodKind::Year,
                value: year as i64,
            });
        }

        // In-range years always produce valid dates
        let jan1 = NaiveDate::from_ymd_opt(year, 1, 1).ok_or(FilterError::InvalidPeriodValue {
            kind: PeriodKind::Year,
            value: year as i64,
        })?;
        let dec31 =
            NaiveDate::from_ymd_opt(year, 12, 31).ok_or(FilterError::InvalidPeriodValue {
                kind: PeriodKind::Year,
                value: year as i64,
            })?;

        Ok((self.day_start_utc(jan1), self.day_end_utc(dec31)))
    }

    /// Interpret a local wall time as a UTC instant.
    ///
    /// Ambiguous times (DST fold) take the earlier instant for interval
    /// starts and the later for interval ends, keeping ranges inclusive.
    /// Nonexistent times (DST gap) probe in half-hour steps toward the
    /// nearest valid wall time.
    fn localize(&self, naive: NaiveDateTime, bound: Bound) -> DateTime<Utc> {
        match self.tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => dt.with_timezone(&Utc),
            LocalResult::Ambiguous(early, late) => match bound {
                Bound::Start => early.with_timezone(&Utc),
                Bound::End => late.with_timezone(&Utc),
            },
            LocalResult::None => {
                let step = match bound {
                    Bound::Start => Duration::minutes(30),
                    Bound::End => Duration::minutes(-30),
                };
                let mut probe = naive;
                for _ in 0..6 {
                    probe = probe + step;
                    match self.tz.from_local_datetime(&probe) {
                        LocalResult::Single(dt) => return dt.with_timezone(&Utc),
                        LocalResult::Ambiguous(early, late) => {
                            let dt = match bound {
                                Bound::Start => early,
                                Bound::End => late,
                            };
                            return dt.with_timezone(&Utc);
                        }
                        LocalResult::None => continue,
                    }
                }
                // Gap wider than three hours; treat the wall time as UTC
                Utc.from_utc_datetime(&naive)
            }
        }
    }
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0).expect("midnight is always valid")
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_micro_opt(23, 59, 59, 999_999)
        .expect("23:59:59.999999 is always valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_explicit_wins_over_config() {
        let config = FilterConfig::new()
            .with_timezone("Africa/Lagos")
            .with_app_timezone("Asia/Dubai");

        let ctx = TimezoneContext::resolve(Some("Europe/Berlin"), &config).unwrap();
        assert_eq!(ctx.name(), "Europe/Berlin");
    }

    #[test]
    fn test_config_precedence_chain() {
        let config = FilterConfig::new()
            .with_timezone("Africa/Lagos")
            .with_app_timezone("Asia/Dubai");
        let ctx = TimezoneContext::resolve(None, &config).unwrap();
        assert_eq!(ctx.name(), "Africa/Lagos");

        let config = FilterConfig::new().with_app_timezone("Asia/Dubai");
        let ctx = TimezoneContext::resolve(None, &config).unwrap();
        assert_eq!(ctx.name(), "Asia/Dubai");

        let ctx = TimezoneContext::resolve(None, &FilterConfig::default()).unwrap();
        assert_eq!(ctx.name(), "UTC");
    }

    #[test]
    fn test_unresolved_timezone_fails_fast() {
        let err = TimezoneContext::resolve(Some("Mars/Olympus"), &FilterConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            FilterError::UnresolvedTimezone {
                name: "Mars/Olympus".to_string()
            }
        );
    }

    #[test]
    fn test_day_bounds_lagos() {
        // Lagos is UTC+1 year-round
        let ctx = TimezoneContext::resolve(Some("Africa/Lagos"), &FilterConfig::default())
            .unwrap();
        assert_eq!(
            ctx.day_start_utc(date(2024, 5, 10)),
            utc("2024-05-09T23:00:00Z")
        );
        assert_eq!(
            ctx.day_end_utc(date(2024, 5, 10)),
            utc("2024-05-10T22:59:59.999999Z")
        );
    }

    #[test]
    fn test_month_bounds_cross_dst() {
        // New York enters DST on 2024-03-10; the month starts at -05:00
        // and ends at -04:00
        let ctx = TimezoneContext::resolve(Some("America/New_York"), &FilterConfig::default())
            .unwrap();
        let (start, end) = ctx.month_bounds_utc(2024, 3).unwrap();
        assert_eq!(start, utc("2024-03-01T05:00:00Z"));
        assert_eq!(end, utc("2024-04-01T03:59:59.999999Z"));
    }

    #[test]
    fn test_month_bounds_rejects_bad_month() {
        let ctx = TimezoneContext::utc();
        let err = ctx.month_bounds_utc(2024, 13).unwrap_err();
        assert_eq!(
            err,
            FilterError::InvalidPeriodValue {
                kind: PeriodKind::Month,
                value: 13,
            }
        );
        assert!(ctx.month_bounds_utc(2024, 0).is_err());
    }

    #[test]
    fn test_year_bounds_dubai() {
        // Dubai is UTC+4 year-round
        let ctx = TimezoneContext::resolve(Some("Asia/Dubai"), &FilterConfig::default())
            .unwrap();
        let (start, end) = ctx.year_bounds_utc(2023).unwrap();
        assert_eq!(start, utc("2022-12-31T20:00:00Z"));
        assert_eq!(end, utc("2023-12-31T19:59:59.999999Z"));
    }

    #[test]
    fn test_year_bounds_rejects_out_of_range() {
        let ctx = TimezoneContext::utc();
        assert!(ctx.year_bounds_utc(999).is_err());
        assert!(ctx.year_bounds_utc(10_000).is_err());
    }

    #[test]
    fn test_midnight_erased_by_dst_gap() {
        // Santiago's 2024 spring-forward jumps from 2024-09-08 00:00
        // straight to 01:00 (-04:00 to -03:00); the day start shifts
        // forward to the first valid wall time
        let ctx = TimezoneContext::resolve(Some("America/Santiago"), &FilterConfig::default())
            .unwrap();
        assert_eq!(
            ctx.day_start_utc(date(2024, 9, 8)),
            utc("2024-09-08T04:00:00Z")
        );
    }

    #[test]
    fn test_utc_bounds_are_identity() {
        let ctx = TimezoneContext::utc();
        assert_eq!(
            ctx.day_start_utc(date(2024, 1, 1)),
            utc("2024-01-01T00:00:00Z")
        );
        assert_eq!(
            ctx.day_end_utc(date(2024, 1, 1)),
            utc("2024-01-01T23:59:59.999999Z")
        );
    }
}
