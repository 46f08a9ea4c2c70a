/*!
This module defines the internal core time data types and the calendar
algorithms that operate on them.

This includes physical time (seconds since the Unix epoch) and civil time
(a proleptic Gregorian date with a clock time).

These routines are implemented on plain integers and assume their inputs are
valid (i.e., within the supported range of years `-9999..=9999`). Callers
are responsible for range checking. The public types in `crate::civil` wrap
these after validation.

# Naming

The types in this module are prefixed with the letter `I` to make it clear
that they are internal types. For example, `Date` versus `IDate`.
*/

/// The number of seconds in a civil day.
pub(crate) const SECONDS_PER_DAY: i64 = 86_400;

/// The number of nanoseconds in one second.
pub(crate) const NANOS_PER_SECOND: i32 = 1_000_000_000;

/// The smallest supported year.
pub(crate) const YEAR_MIN: i16 = -9999;

/// The largest supported year.
pub(crate) const YEAR_MAX: i16 = 9999;

/// A point in physical time, as a number of seconds (and a fractional
/// component) since the Unix epoch.
///
/// Unlike a sign-matched representation, the nanosecond component here is
/// always in `0..=999_999_999` and counts forward from `second`. So one
/// nanosecond before the epoch is `{ second: -1, nanosecond: 999_999_999 }`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub(crate) struct ITimestamp {
    pub(crate) second: i64,
    pub(crate) nanosecond: i32,
}

impl ITimestamp {
    /// The earliest instant whose UTC civil datetime is supported,
    /// `-9999-01-01T00:00:00Z`.
    pub(crate) const MIN: ITimestamp = ITimestamp {
        second: IDate::MIN.to_epoch_day().epoch_day as i64 * SECONDS_PER_DAY,
        nanosecond: 0,
    };

    /// The latest instant whose UTC civil datetime is supported,
    /// `9999-12-31T23:59:59.999999999Z`.
    pub(crate) const MAX: ITimestamp = ITimestamp {
        second: IDate::MAX.to_epoch_day().epoch_day as i64 * SECONDS_PER_DAY
            + (SECONDS_PER_DAY - 1),
        nanosecond: NANOS_PER_SECOND - 1,
    };

    /// Builds an instant from a total number of nanoseconds since the Unix
    /// epoch.
    ///
    /// This returns `None` when the instant is outside the supported range.
    pub(crate) fn from_nanosecond(nanos: i128) -> Option<ITimestamp> {
        let second = nanos.div_euclid(NANOS_PER_SECOND as i128);
        let nanosecond = nanos.rem_euclid(NANOS_PER_SECOND as i128) as i32;
        let second = i64::try_from(second).ok()?;
        let ts = ITimestamp { second, nanosecond };
        if ts < ITimestamp::MIN || ts > ITimestamp::MAX {
            return None;
        }
        Some(ts)
    }

    /// Returns the total number of nanoseconds since the Unix epoch.
    pub(crate) fn as_nanosecond(&self) -> i128 {
        (self.second as i128) * (NANOS_PER_SECOND as i128)
            + (self.nanosecond as i128)
    }

    /// Converts a Unix timestamp with an offset to a Gregorian datetime.
    ///
    /// The offset should correspond to the number of seconds required to
    /// add to this timestamp to get the local time.
    ///
    /// The datetime returned may be outside the supported range of years
    /// when this timestamp is near one of its boundaries. Callers should
    /// check the year.
    #[inline(always)]
    pub(crate) const fn to_datetime(&self, offset: IOffset) -> IDateTime {
        let second = self.second + offset.second as i64;
        let epoch_day = second.div_euclid(SECONDS_PER_DAY) as i32;
        let second_of_day = second.rem_euclid(SECONDS_PER_DAY) as i32;

        let date = IEpochDay { epoch_day }.to_date();
        let mut time = ITimeSecond { second: second_of_day }.to_time();
        time.subsec_nanosecond = self.nanosecond;
        IDateTime { date, time }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub(crate) struct IOffset {
    pub(crate) second: i32,
}

impl IOffset {
    pub(crate) const UTC: IOffset = IOffset { second: 0 };
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub(crate) struct IDateTime {
    pub(crate) date: IDate,
    pub(crate) time: ITime,
}

impl IDateTime {
    /// Converts a Gregorian datetime and its offset to a Unix timestamp.
    ///
    /// The offset should correspond to the number of seconds required to
    /// subtract from this datetime in order to get to UTC.
    #[inline(always)]
    pub(crate) const fn to_timestamp(&self, offset: IOffset) -> ITimestamp {
        let epoch_day = self.date.to_epoch_day().epoch_day;
        let second = (epoch_day as i64) * SECONDS_PER_DAY
            + (self.time.to_second().second as i64)
            - (offset.second as i64);
        ITimestamp { second, nanosecond: self.time.subsec_nanosecond }
    }
}

/// A number of days since the Unix epoch, `1970-01-01`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub(crate) struct IEpochDay {
    pub(crate) epoch_day: i32,
}

impl IEpochDay {
    /// Converts days since the Unix epoch to a Gregorian date.
    ///
    /// This is Neri-Schneider. There's no branching or divisions.
    ///
    /// Ref: <https://github.com/cassioneri/eaf/blob/684d3cc32d14eee371d0abe4f683d6d6a49ed5c1/algorithms/neri_schneider.hpp#L40C3-L40C34>
    #[inline(always)]
    #[allow(non_upper_case_globals, non_snake_case)] // to mimic source
    pub(crate) const fn to_date(&self) -> IDate {
        const s: u32 = 82;
        const K: u32 = 719468 + 146097 * s;
        const L: u32 = 400 * s;

        let N_U = self.epoch_day as u32;
        let N = N_U.wrapping_add(K);

        let N_1 = 4 * N + 3;
        let C = N_1 / 146097;
        let N_C = (N_1 % 146097) / 4;

        let N_2 = 4 * N_C + 3;
        let P_2 = 2939745 * (N_2 as u64);
        let Z = (P_2 / 4294967296) as u32;
        let N_Y = (P_2 % 4294967296) as u32 / 2939745 / 4;
        let Y = 100 * C + Z;

        let N_3 = 2141 * N_Y + 197913;
        let M = N_3 / 65536;
        let D = (N_3 % 65536) / 2141;

        let J = N_Y >= 306;
        let year = Y.wrapping_sub(L).wrapping_add(J as u32) as i16;
        let month = (if J { M - 12 } else { M }) as i8;
        let day = (D + 1) as i8;
        IDate { year, month, day }
    }

    /// Returns the weekday of this day, where `0` is Monday and `6` is
    /// Sunday.
    ///
    /// The Unix epoch fell on a Thursday.
    #[inline]
    pub(crate) const fn weekday_monday_zero(&self) -> i8 {
        (self.epoch_day as i64 + 3).rem_euclid(7) as i8
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub(crate) struct IDate {
    pub(crate) year: i16,
    pub(crate) month: i8,
    pub(crate) day: i8,
}

impl IDate {
    pub(crate) const MIN: IDate = IDate { year: YEAR_MIN, month: 1, day: 1 };
    pub(crate) const MAX: IDate = IDate { year: YEAR_MAX, month: 12, day: 31 };

    /// Converts a Gregorian date to days since the Unix epoch.
    ///
    /// This is Neri-Schneider. There's no branching or divisions.
    ///
    /// Ref: <https://github.com/cassioneri/eaf/blob/684d3cc32d14eee371d0abe4f683d6d6a49ed5c1/algorithms/neri_schneider.hpp#L83>
    #[inline(always)]
    #[allow(non_upper_case_globals, non_snake_case)] // to mimic source
    pub(crate) const fn to_epoch_day(&self) -> IEpochDay {
        const s: u32 = 82;
        const K: u32 = 719468 + 146097 * s;
        const L: u32 = 400 * s;

        let year = self.year as u32;
        let month = self.month as u32;
        let day = self.day as u32;

        let J = month <= 2;
        let Y = year.wrapping_add(L).wrapping_sub(J as u32);
        let M = if J { month + 12 } else { month };
        let D = day - 1;
        let C = Y / 100;

        let y_star = 1461 * Y / 4 - C + C / 4;
        let m_star = (979 * M - 2919) / 32;
        let N = y_star + m_star + D;

        let N_U = N.wrapping_sub(K);
        let epoch_day = N_U as i32;
        IEpochDay { epoch_day }
    }

    /// Returns the 1-based ordinal day of this date within its year.
    #[inline]
    pub(crate) const fn day_of_year(&self) -> i16 {
        let first = IDate { year: self.year, month: 1, day: 1 };
        let days =
            self.to_epoch_day().epoch_day - first.to_epoch_day().epoch_day;
        (days + 1) as i16
    }

    /// Returns the weekday of this date, where `0` is Monday.
    #[inline]
    pub(crate) const fn weekday_monday_zero(&self) -> i8 {
        self.to_epoch_day().weekday_monday_zero()
    }

    /// Returns the ISO 8601 week date for this date as a triple of ISO
    /// year, week number (`1..=53`) and weekday (`0` is Monday).
    ///
    /// The ISO year differs from the Gregorian year for up to three days
    /// at either end of the year.
    pub(crate) const fn to_iso_week_date(&self) -> (i16, i8, i8) {
        let day = self.to_epoch_day().epoch_day;
        let mut year = self.year;
        let mut start = iso_week_start(year);
        if day < start.epoch_day {
            year -= 1;
            start = iso_week_start(year);
        } else {
            let next = iso_week_start(year + 1);
            if day >= next.epoch_day {
                year += 1;
                start = next;
            }
        }
        let week = ((day - start.epoch_day) / 7 + 1) as i8;
        (year, week, self.weekday_monday_zero())
    }
}

/// Returns the first day (always a Monday) of ISO week 1 in the given ISO
/// year.
///
/// Week 1 is the week containing January 4 (equivalently, the year's first
/// Thursday).
const fn iso_week_start(year: i16) -> IEpochDay {
    let jan4 = IDate { year, month: 1, day: 4 }.to_epoch_day();
    IEpochDay { epoch_day: jan4.epoch_day - jan4.weekday_monday_zero() as i32 }
}

/// Represents a clock time.
///
/// This uses units of hours, minutes, seconds and fractional seconds (to
/// nanosecond precision).
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub(crate) struct ITime {
    pub(crate) hour: i8,
    pub(crate) minute: i8,
    pub(crate) second: i8,
    pub(crate) subsec_nanosecond: i32,
}

impl ITime {
    #[cfg(test)]
    pub(crate) const ZERO: ITime =
        ITime { hour: 0, minute: 0, second: 0, subsec_nanosecond: 0 };

    #[inline(always)]
    pub(crate) const fn to_second(&self) -> ITimeSecond {
        let mut second: i32 = 0;
        second += (self.hour as i32) * 3600;
        second += (self.minute as i32) * 60;
        second += self.second as i32;
        ITimeSecond { second }
    }
}

/// Represents a single point in the day, to second precision.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub(crate) struct ITimeSecond {
    pub(crate) second: i32,
}

impl ITimeSecond {
    #[inline(always)]
    pub(crate) const fn to_time(&self) -> ITime {
        let second = self.second;
        ITime {
            hour: (second / 3600) as i8,
            minute: ((second % 3600) / 60) as i8,
            second: (second % 60) as i8,
            subsec_nanosecond: 0,
        }
    }
}

/// Returns true if and only if the given year is a leap year.
///
/// A leap year is a year with 366 days. Typical years have 365 days.
#[inline]
pub(crate) const fn is_leap_year(year: i16) -> bool {
    // Years divisible by 25 are only leap when divisible by 16, which is
    // the same as checking divisibility by 400 for those years.
    let d = if year % 25 != 0 { 4 } else { 16 };
    (year % d) == 0
}

/// Return the number of days in the given month.
#[inline]
pub(crate) const fn days_in_month(year: i16, month: i8) -> i8 {
    // Outside of February, `month ^ (month >> 3)` is odd exactly for the
    // months with 31 days.
    if month == 2 {
        if is_leap_year(year) {
            29
        } else {
            28
        }
    } else {
        30 | (month ^ month >> 3)
    }
}

/// Return the number of days in the given year.
#[inline]
pub(crate) const fn days_in_year(year: i16) -> i16 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_epochday_date() {
        for year in YEAR_MIN..=YEAR_MAX {
            for month in 1..=12 {
                for day in 1..=days_in_month(year, month) {
                    let date = IDate { year, month, day };
                    assert_eq!(date, date.to_epoch_day().to_date());
                }
            }
        }
    }

    #[test]
    fn roundtrip_second_time() {
        for second in 0..=86_399 {
            let second = ITimeSecond { second };
            assert_eq!(second, second.to_time().to_second());
        }
    }

    #[test]
    fn timestamp_bounds() {
        let min = ITimestamp::MIN.to_datetime(IOffset::UTC);
        assert_eq!(min.date, IDate::MIN);
        assert_eq!(min.time, ITime::ZERO);

        let max = ITimestamp::MAX.to_datetime(IOffset::UTC);
        assert_eq!(max.date, IDate::MAX);
        assert_eq!(
            max.time,
            ITime {
                hour: 23,
                minute: 59,
                second: 59,
                subsec_nanosecond: 999_999_999
            },
        );
    }

    #[test]
    fn timestamp_before_epoch() {
        let ts = ITimestamp::from_nanosecond(-1).unwrap();
        assert_eq!(ts, ITimestamp { second: -1, nanosecond: 999_999_999 });
        let dt = ts.to_datetime(IOffset::UTC);
        assert_eq!(dt.date, IDate { year: 1969, month: 12, day: 31 });
        assert_eq!(dt.time.second, 59);
        assert_eq!(dt.to_timestamp(IOffset::UTC), ts);
        assert_eq!(ts.as_nanosecond(), -1);
    }

    #[test]
    fn timestamp_out_of_range() {
        let min = ITimestamp::MIN.as_nanosecond();
        let max = ITimestamp::MAX.as_nanosecond();
        assert!(ITimestamp::from_nanosecond(min).is_some());
        assert!(ITimestamp::from_nanosecond(max).is_some());
        assert!(ITimestamp::from_nanosecond(min - 1).is_none());
        assert!(ITimestamp::from_nanosecond(max + 1).is_none());
        assert!(ITimestamp::from_nanosecond(i128::MAX).is_none());
    }

    #[test]
    fn weekday() {
        // 1970-01-01 was a Thursday.
        assert_eq!(IEpochDay { epoch_day: 0 }.weekday_monday_zero(), 3);
        assert_eq!(IEpochDay { epoch_day: -1 }.weekday_monday_zero(), 2);
        let date = IDate { year: 2018, month: 3, day: 21 };
        assert_eq!(date.weekday_monday_zero(), 2);
    }

    #[test]
    fn day_of_year() {
        assert_eq!(IDate { year: 2000, month: 1, day: 1 }.day_of_year(), 1);
        let doy = |year, month, day| IDate { year, month, day }.day_of_year();
        assert_eq!(doy(2000, 12, 31), 366);
        assert_eq!(doy(2001, 12, 31), 365);
        assert_eq!(IDate { year: 2001, month: 3, day: 1 }.day_of_year(), 60);
    }

    #[test]
    fn iso_week_date_year_boundaries() {
        let iso = |year, month, day| {
            IDate { year, month, day }.to_iso_week_date()
        };
        // 2021-01-01 is a Friday, so it belongs to the last week of 2020.
        assert_eq!(iso(2021, 1, 1), (2020, 53, 4));
        assert_eq!(iso(2021, 1, 4), (2021, 1, 0));
        // 2018-12-31 is a Monday in week 1 of 2019.
        assert_eq!(iso(2018, 12, 31), (2019, 1, 0));
        assert_eq!(iso(2020, 12, 31), (2020, 53, 3));
        // 10,000 years is a whole number of 400 year cycles, so the
        // supported range starts on a Monday, just like 0001-01-01.
        assert_eq!(iso(-9999, 1, 1), (-9999, 1, 0));
        assert_eq!(iso(1, 1, 1), (1, 1, 0));
        assert_eq!(iso(9999, 12, 31), (9999, 52, 4));
    }

    #[test]
    fn leap_year() {
        assert!(!is_leap_year(1900));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(2001));
        assert!(!is_leap_year(2002));
        assert!(!is_leap_year(2003));
        assert!(is_leap_year(2004));
        assert!(is_leap_year(-4));
        assert!(!is_leap_year(-100));
        assert!(is_leap_year(-400));
    }

    #[test]
    fn number_of_days_in_month() {
        let leap = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
        let common = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
        for month in 1..=12 {
            let i = usize::try_from(month - 1).unwrap();
            assert_eq!(days_in_month(2024, month), leap[i]);
            assert_eq!(days_in_month(2025, month), common[i]);
        }
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_year(1900), 365);
        assert_eq!(days_in_year(2000), 366);
    }
}
