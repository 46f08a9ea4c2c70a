/*!
Support for POSIX `TZ` strings such as `EST5EDT,M3.2.0,M11.1.0`.

A POSIX time zone describes a standard offset and, optionally, a daylight
saving time offset along with the yearly rule for switching between them.
They appear on their own (e.g., in the `TZ` environment variable) and as the
footer of TZif v2+ data, where they describe all instants after the last
explicit transition.

The parser accepts the IANA v3+ extension, which permits transition times
with hours in the range `-167..=167`.

Unlike POSIX, a DST abbreviation without an explicit rule is rejected, since
the default rule is implementation defined.
*/

use alloc::boxed::Box;

use crate::{
    error::Error,
    tz::Offset,
    util::{
        escape::{Byte, Bytes},
        itime::{self, IDate, IOffset, ITimestamp, SECONDS_PER_DAY},
    },
};

macro_rules! err {
    ($($tt:tt)*) => {{
        PosixTimeZoneError { message: alloc::format!($($tt)*).into() }
    }}
}

/// An error that occurs when a POSIX `TZ` string is invalid.
#[derive(Clone, Debug)]
pub(crate) struct PosixTimeZoneError {
    message: Box<str>,
}

impl core::fmt::Display for PosixTimeZoneError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid POSIX time zone: {}", self.message)
    }
}

/// A parsed POSIX time zone.
///
/// All offsets are stored as seconds east of UTC. That is, the sign is
/// already flipped from the POSIX convention, where `EST5` means `-05:00`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct PosixTimeZone {
    std_abbrev: Box<str>,
    std_offset: i32,
    dst: Option<PosixDst>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct PosixDst {
    abbrev: Box<str>,
    offset: i32,
    rule: PosixRule,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct PosixRule {
    start: PosixDayTime,
    end: PosixDayTime,
}

/// A day of the year along with a time of day, in seconds, at which a
/// transition occurs. The time may be negative or exceed one day.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct PosixDayTime {
    day: PosixDay,
    time: i32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum PosixDay {
    /// `Jn`: one-based day of the year in `1..=365`, never counting
    /// February 29.
    JulianOne(i16),
    /// `n`: zero-based day of the year in `0..=365`, counting February 29.
    JulianZero(i16),
    /// `Mm.w.d`: weekday `d` (`0` is Sunday) of week `w` in month `m`.
    /// Week `5` means the last such weekday in the month.
    WeekdayOfMonth { month: i8, week: i8, weekday: i8 },
}

impl PosixTimeZone {
    /// Parses an entire POSIX `TZ` string.
    ///
    /// Transition times may use the IANA v3+ extended hour range.
    pub(crate) fn parse(
        bytes: &[u8],
    ) -> core::result::Result<PosixTimeZone, Error> {
        let parser = Parser::new(bytes);
        let tz = parser.parse_time_zone().map_err(Error::posix_tz)?;
        if !parser.is_done() {
            return Err(Error::posix_tz(err!(
                "found unparsed trailing input `{}` after a valid \
                 POSIX TZ string",
                Bytes(parser.remaining()),
            )));
        }
        Ok(tz)
    }

    /// Returns the offset in effect at the given number of seconds since
    /// the Unix epoch.
    pub(crate) fn to_offset(&self, second: i64) -> Offset {
        let Some(ref dst) = self.dst else {
            return Offset::from_seconds_unchecked(self.std_offset);
        };
        let ts = ITimestamp { second, nanosecond: 0 };
        let year = ts.to_datetime(IOffset::UTC).date.year;
        // DST starts with respect to standard time, and ends with respect
        // to DST.
        let start = dst.rule.start.to_epoch_second(year, self.std_offset);
        let end = dst.rule.end.to_epoch_second(year, dst.offset);
        let in_dst = if start <= end {
            start <= second && second < end
        } else {
            // Southern hemisphere: DST spans the new year.
            !(end <= second && second < start)
        };
        Offset::from_seconds_unchecked(if in_dst {
            dst.offset
        } else {
            self.std_offset
        })
    }
}

impl PosixDayTime {
    /// Returns the instant of this transition in the given year, where the
    /// rule's wall clock time is interpreted with the given offset.
    fn to_epoch_second(&self, year: i16, offset: i32) -> i64 {
        let day = self.day.to_epoch_day(year);
        i64::from(day) * SECONDS_PER_DAY + i64::from(self.time)
            - i64::from(offset)
    }
}

impl PosixDay {
    fn to_epoch_day(&self, year: i16) -> i32 {
        let jan1 = IDate { year, month: 1, day: 1 }.to_epoch_day().epoch_day;
        match *self {
            PosixDay::JulianOne(day) => {
                let mut ordinal = i32::from(day);
                // February 29 is never counted, so in leap years every day
                // from March 1 on is one further from January 1.
                if itime::is_leap_year(year) && ordinal >= 60 {
                    ordinal += 1;
                }
                jan1 + ordinal - 1
            }
            PosixDay::JulianZero(day) => {
                // Day 365 only exists in leap years. Otherwise, POSIX leaves
                // it unspecified, so use the last day of the year.
                let last = i32::from(itime::days_in_year(year)) - 1;
                jan1 + i32::from(day).min(last)
            }
            PosixDay::WeekdayOfMonth { month, week, weekday } => {
                let first = IDate { year, month, day: 1 }.to_epoch_day();
                // Convert the first's weekday to Sunday-zero numbering.
                let first_weekday = (first.weekday_monday_zero() + 1) % 7;
                let mut day = 1
                    + (weekday - first_weekday).rem_euclid(7)
                    + (week - 1) * 7;
                let days_in_month = itime::days_in_month(year, month);
                while day > days_in_month {
                    day -= 7;
                }
                first.epoch_day + i32::from(day) - 1
            }
        }
    }
}

/// A parser for POSIX time zones.
///
/// The position is in a `Cell` so that parsing routines can take `&self`.
#[derive(Debug)]
struct Parser<'s> {
    tz: &'s [u8],
    pos: core::cell::Cell<usize>,
}

type Result<T> = core::result::Result<T, PosixTimeZoneError>;

impl<'s> Parser<'s> {
    fn new(tz: &'s [u8]) -> Parser<'s> {
        Parser { tz, pos: core::cell::Cell::new(0) }
    }

    /// Parses `std offset [dst [offset] ,rule]`.
    ///
    /// Upon success, the parser is positioned immediately after the time
    /// zone, which is not necessarily the end of input.
    fn parse_time_zone(&self) -> Result<PosixTimeZone> {
        let std_abbrev = self
            .parse_abbreviation()
            .map_err(|e| err!("failed to parse standard abbreviation: {e}"))?;
        let std_offset = self
            .parse_offset()
            .map_err(|e| err!("failed to parse standard offset: {e}"))?;
        let mut dst = None;
        let has_dst = matches!(
            self.maybe_byte(),
            Some(b) if b.is_ascii_alphabetic() || b == b'<'
        );
        if has_dst {
            dst = Some(self.parse_dst(std_offset)?);
        }
        Ok(PosixTimeZone { std_abbrev, std_offset, dst })
    }

    /// Parses the DST abbreviation, its optional offset and its rule.
    fn parse_dst(&self, std_offset: i32) -> Result<PosixDst> {
        let abbrev = self
            .parse_abbreviation()
            .map_err(|e| err!("failed to parse DST abbreviation: {e}"))?;
        // Unless given, DST is one hour ahead of standard time.
        let mut offset = std_offset + 3600;
        if self.maybe_byte().map_or(false, |b| b != b',') {
            offset = self
                .parse_offset()
                .map_err(|e| err!("failed to parse DST offset: {e}"))?;
        }
        match self.maybe_byte() {
            None => {
                return Err(err!(
                    "DST abbreviation `{abbrev}` has no transition rule, \
                     and the default rule is implementation defined",
                ))
            }
            Some(b',') => {}
            Some(byte) => {
                return Err(err!(
                    "expected `,` before DST transition rule, \
                     but found `{}`",
                    Byte(byte),
                ))
            }
        }
        self.bump();
        let start = self
            .parse_day_time()
            .map_err(|e| err!("failed to parse start of DST rule: {e}"))?;
        if self.maybe_byte() != Some(b',') {
            return Err(err!(
                "expected `,` between the start and end of DST rule"
            ));
        }
        self.bump();
        let end = self
            .parse_day_time()
            .map_err(|e| err!("failed to parse end of DST rule: {e}"))?;
        Ok(PosixDst { abbrev, offset, rule: PosixRule { start, end } })
    }

    /// Parses a quoted (`<...>`) or unquoted abbreviation.
    ///
    /// Unquoted abbreviations are alphabetic. Quoted abbreviations may also
    /// contain digits, `+` and `-`. Either kind must have 3 to 30 bytes.
    fn parse_abbreviation(&self) -> Result<Box<str>> {
        const MAX_LEN: usize = 30;

        let quoted = self.maybe_byte() == Some(b'<');
        if quoted {
            self.bump();
        }
        let allowed = |b: u8| {
            b.is_ascii_alphabetic()
                || (quoted && (b.is_ascii_digit() || b == b'+' || b == b'-'))
        };
        let start = self.pos();
        while self.maybe_byte().map_or(false, allowed) {
            self.bump();
        }
        let raw = &self.tz[start..self.pos()];
        if quoted {
            if self.maybe_byte() != Some(b'>') {
                return Err(err!(
                    "quoted abbreviation `{}` is missing its closing `>`",
                    Bytes(raw),
                ));
            }
            self.bump();
        }
        if !(3 <= raw.len() && raw.len() <= MAX_LEN) {
            return Err(err!(
                "abbreviation `{}` has {} bytes, but it must have \
                 between 3 and {MAX_LEN} bytes",
                Bytes(raw),
                raw.len(),
            ));
        }
        // Only ASCII is permitted by the loop above.
        let abbrev = core::str::from_utf8(raw)
            .map_err(|_| err!("abbreviation is not valid UTF-8"))?;
        Ok(abbrev.into())
    }

    /// Parses `[+|-]hh[:mm[:ss]]` with hours in `0..=24`, returning seconds
    /// *east* of UTC.
    fn parse_offset(&self) -> Result<i32> {
        let sign = self.parse_optional_sign()?;
        let seconds = self.parse_hms(0, 24)?;
        // POSIX offsets are west of UTC, so flip the sign.
        Ok(-sign * seconds)
    }

    /// Parses a date followed by an optional `/time`. The time defaults to
    /// `02:00:00`.
    fn parse_day_time(&self) -> Result<PosixDayTime> {
        let day = self.parse_day()?;
        let mut time = 2 * 3600;
        if self.maybe_byte() == Some(b'/') {
            self.bump();
            // IANA v3+ permits signed hours in `-167..=167`.
            let sign = self.parse_optional_sign()?;
            time = sign * self.parse_hms(0, 167)?;
        }
        Ok(PosixDayTime { day, time })
    }

    /// Parses `Jn`, `n` or `Mm.w.d`.
    fn parse_day(&self) -> Result<PosixDay> {
        match self.maybe_byte() {
            Some(b'J') => {
                self.bump();
                let day = self.parse_number(1, 3, 1, 365, "Julian day")?;
                Ok(PosixDay::JulianOne(day as i16))
            }
            Some(b'0'..=b'9') => {
                let day = self.parse_number(1, 3, 0, 365, "Julian day")?;
                Ok(PosixDay::JulianZero(day as i16))
            }
            Some(b'M') => {
                self.bump();
                let month = self.parse_number(1, 2, 1, 12, "month")? as i8;
                self.expect_byte(b'.', "month")?;
                let week = self.parse_number(1, 1, 1, 5, "week")? as i8;
                self.expect_byte(b'.', "week")?;
                let weekday = self.parse_number(1, 1, 0, 6, "weekday")? as i8;
                Ok(PosixDay::WeekdayOfMonth { month, week, weekday })
            }
            Some(byte) => Err(err!(
                "expected `J`, a digit or `M` to start a DST rule date, \
                 but found `{}`",
                Byte(byte),
            )),
            None => Err(err!(
                "expected a DST rule date, but found the end of input"
            )),
        }
    }

    /// Parses `hh[:mm[:ss]]` into a number of seconds, where the hour must
    /// be in `min_hour..=max_hour`.
    fn parse_hms(&self, min_hour: i32, max_hour: i32) -> Result<i32> {
        let hour = self.parse_number(1, 3, min_hour, max_hour, "hour")?;
        let mut seconds = hour * 3600;
        if self.maybe_byte() == Some(b':') {
            self.bump();
            seconds += self.parse_number(2, 2, 0, 59, "minute")? * 60;
            if self.maybe_byte() == Some(b':') {
                self.bump();
                seconds += self.parse_number(2, 2, 0, 59, "second")?;
            }
        }
        Ok(seconds)
    }

    /// Parses a number with between `min_digits` and `max_digits` digits,
    /// and checks that it is in `min..=max`.
    fn parse_number(
        &self,
        min_digits: usize,
        max_digits: usize,
        min: i32,
        max: i32,
        what: &str,
    ) -> Result<i32> {
        let start = self.pos();
        let mut number: i32 = 0;
        while self.pos() - start < max_digits {
            let Some(digit @ b'0'..=b'9') = self.maybe_byte() else { break };
            number = number * 10 + i32::from(digit - b'0');
            self.bump();
        }
        let len = self.pos() - start;
        if len < min_digits {
            return Err(match self.maybe_byte() {
                Some(byte) => err!(
                    "expected {what} with at least {min_digits} digit(s), \
                     but found `{}`",
                    Byte(byte),
                ),
                None => err!(
                    "expected {what} with at least {min_digits} digit(s), \
                     but found the end of input",
                ),
            });
        }
        if !(min <= number && number <= max) {
            return Err(err!(
                "{what} `{number}` is not in the required range {min}..={max}",
            ));
        }
        Ok(number)
    }

    /// Parses an optional `+` or `-`, returning `1` or `-1`.
    fn parse_optional_sign(&self) -> Result<i32> {
        let sign = match self.maybe_byte() {
            Some(b'-') => -1,
            Some(b'+') => 1,
            _ => return Ok(1),
        };
        if !self.bump() {
            return Err(err!(
                "expected digit after sign, but got end of input"
            ));
        }
        Ok(sign)
    }

    fn expect_byte(&self, expected: u8, after: &str) -> Result<()> {
        if self.maybe_byte() != Some(expected) {
            return Err(err!(
                "expected `{}` after {after} in DST rule",
                Byte(expected),
            ));
        }
        self.bump();
        Ok(())
    }
}

/// Helper routines for moving through the `TZ` string.
impl<'s> Parser<'s> {
    /// Moves to the next byte, returning `false` if the end of the input
    /// has been reached.
    fn bump(&self) -> bool {
        if self.is_done() {
            return false;
        }
        self.pos.set(self.pos() + 1);
        !self.is_done()
    }

    fn is_done(&self) -> bool {
        self.pos() == self.tz.len()
    }

    fn maybe_byte(&self) -> Option<u8> {
        self.tz.get(self.pos()).copied()
    }

    fn pos(&self) -> usize {
        self.pos.get()
    }

    fn remaining(&self) -> &'s [u8] {
        &self.tz[self.pos()..]
    }
}

impl core::fmt::Display for PosixTimeZone {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write_abbreviation(&self.std_abbrev, f)?;
        write_posix_hms(-self.std_offset, f)?;
        let Some(ref dst) = self.dst else { return Ok(()) };
        write_abbreviation(&dst.abbrev, f)?;
        if dst.offset != self.std_offset + 3600 {
            write_posix_hms(-dst.offset, f)?;
        }
        write!(f, ",{},{}", dst.rule.start, dst.rule.end)
    }
}

impl core::fmt::Display for PosixDayTime {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self.day {
            PosixDay::JulianOne(day) => write!(f, "J{day}")?,
            PosixDay::JulianZero(day) => write!(f, "{day}")?,
            PosixDay::WeekdayOfMonth { month, week, weekday } => {
                write!(f, "M{month}.{week}.{weekday}")?
            }
        }
        if self.time != 2 * 3600 {
            f.write_str("/")?;
            write_posix_hms(self.time, f)?;
        }
        Ok(())
    }
}

fn write_abbreviation(
    abbrev: &str,
    f: &mut core::fmt::Formatter,
) -> core::fmt::Result {
    if abbrev.bytes().all(|b| b.is_ascii_alphabetic()) {
        f.write_str(abbrev)
    } else {
        write!(f, "<{abbrev}>")
    }
}

fn write_posix_hms(
    seconds: i32,
    f: &mut core::fmt::Formatter,
) -> core::fmt::Result {
    if seconds < 0 {
        f.write_str("-")?;
    }
    let seconds = seconds.unsigned_abs();
    let (h, m, s) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    write!(f, "{h}")?;
    if m != 0 || s != 0 {
        write!(f, ":{m:02}")?;
    }
    if s != 0 {
        write!(f, ":{s:02}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use crate::util::itime::{IDateTime, ITime};

    use super::*;

    fn posix(s: &str) -> PosixTimeZone {
        PosixTimeZone::parse(s.as_bytes()).unwrap()
    }

    fn second(y: i16, m: i8, d: i8, h: i8, mi: i8, s: i8) -> i64 {
        let dt = IDateTime {
            date: IDate { year: y, month: m, day: d },
            time: ITime {
                hour: h,
                minute: mi,
                second: s,
                subsec_nanosecond: 0,
            },
        };
        dt.to_timestamp(IOffset::UTC).second
    }

    #[test]
    fn parse_ok() {
        let tz = posix("EST5EDT,M3.2.0,M11.1.0");
        assert_eq!(tz.std_offset, -5 * 3600);
        let dst = tz.dst.as_ref().unwrap();
        assert_eq!(&*dst.abbrev, "EDT");
        assert_eq!(dst.offset, -4 * 3600);
        assert_eq!(
            dst.rule.start,
            PosixDayTime {
                day: PosixDay::WeekdayOfMonth {
                    month: 3,
                    week: 2,
                    weekday: 0,
                },
                time: 7200,
            },
        );

        let tz = posix("<+0330>-3:30");
        assert_eq!(&*tz.std_abbrev, "+0330");
        assert_eq!(tz.std_offset, 3 * 3600 + 30 * 60);
        assert!(tz.dst.is_none());

        let tz = posix("IST-1GMT0,M10.5.0,M3.5.0/1");
        assert_eq!(tz.std_offset, 3600);
        assert_eq!(tz.dst.as_ref().unwrap().offset, 0);

        let tz = posix("<-03>3<-02>,M3.5.0/-2,M10.5.0/-1");
        let rule = tz.dst.as_ref().unwrap().rule;
        assert_eq!(rule.start.time, -2 * 3600);
        assert_eq!(rule.end.time, -3600);

        let tz = posix("XXX3EDT4,J60/1:30:15,300/167");
        let rule = tz.dst.as_ref().unwrap().rule;
        assert_eq!(rule.start.day, PosixDay::JulianOne(60));
        assert_eq!(rule.start.time, 3600 + 30 * 60 + 15);
        assert_eq!(rule.end.day, PosixDay::JulianZero(300));
        assert_eq!(rule.end.time, 167 * 3600);
    }

    #[test]
    fn parse_err() {
        for tz in [
            "",
            "E",
            "EST",
            "EST5EDT",
            "EST5EDT,M3.2.0",
            "EST5EDT,M13.2.0,M11.1.0",
            "EST5EDT,M3.6.0,M11.1.0",
            "EST5EDT,M3.2.7,M11.1.0",
            "EST5EDT,J0,J365",
            "EST25",
            "EST5:60",
            "<EST5",
            "EST5EDT,M3.2.0,M11.1.0/168",
            "EST5 ",
        ] {
            let err = PosixTimeZone::parse(tz.as_bytes()).unwrap_err();
            assert!(err.is_time_zone(), "{tz:?}: {err}");
        }
    }

    #[test]
    fn error_message() {
        let err = PosixTimeZone::parse(b"EST5EDT").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid POSIX time zone: DST abbreviation `EDT` has no \
             transition rule, and the default rule is implementation defined",
        );
    }

    #[test]
    fn new_york_offsets() {
        let tz = posix("EST5EDT,M3.2.0,M11.1.0");
        let off = |s: i64| tz.to_offset(s).seconds() / 3600;
        // 2024-03-10 02:00 EST is 07:00 UTC.
        assert_eq!(off(second(2024, 3, 10, 6, 59, 59)), -5);
        assert_eq!(off(second(2024, 3, 10, 7, 0, 0)), -4);
        // 2024-11-03 02:00 EDT is 06:00 UTC.
        assert_eq!(off(second(2024, 11, 3, 5, 59, 59)), -4);
        assert_eq!(off(second(2024, 11, 3, 6, 0, 0)), -5);
        assert_eq!(off(second(2024, 7, 1, 0, 0, 0)), -4);
        assert_eq!(off(second(2024, 1, 1, 0, 0, 0)), -5);
    }

    #[test]
    fn southern_hemisphere_offsets() {
        let tz = posix("AEST-10AEDT,M10.1.0,M4.1.0/3");
        let off = |s: i64| tz.to_offset(s).seconds() / 3600;
        assert_eq!(off(second(2024, 1, 15, 0, 0, 0)), 11);
        assert_eq!(off(second(2024, 6, 15, 0, 0, 0)), 10);
        assert_eq!(off(second(2024, 12, 15, 0, 0, 0)), 11);
    }

    #[test]
    fn last_weekday_of_month() {
        // March 2024 has five Sundays; the last is March 31.
        let day = PosixDay::WeekdayOfMonth { month: 3, week: 5, weekday: 0 };
        let expected = IDate { year: 2024, month: 3, day: 31 }.to_epoch_day();
        assert_eq!(day.to_epoch_day(2024), expected.epoch_day);
        // October 2023 starts on a Sunday, so its last Saturday is the 28th.
        let day = PosixDay::WeekdayOfMonth { month: 10, week: 5, weekday: 6 };
        let expected = IDate { year: 2023, month: 10, day: 28 }.to_epoch_day();
        assert_eq!(day.to_epoch_day(2023), expected.epoch_day);
    }

    #[test]
    fn julian_days() {
        let mar1 = |year| {
            IDate { year, month: 3, day: 1 }.to_epoch_day().epoch_day
        };
        assert_eq!(PosixDay::JulianOne(60).to_epoch_day(2024), mar1(2024));
        assert_eq!(PosixDay::JulianOne(60).to_epoch_day(2023), mar1(2023));
        assert_eq!(PosixDay::JulianZero(59).to_epoch_day(2023), mar1(2023));
        assert_eq!(PosixDay::JulianZero(60).to_epoch_day(2024), mar1(2024));
    }

    #[test]
    fn display_roundtrip() {
        for tz in [
            "EST5EDT,M3.2.0,M11.1.0",
            "<+0330>-3:30",
            "IST-1GMT0,M10.5.0,M3.5.0/1",
            "<-03>3<-02>,M3.5.0/-2,M10.5.0/-1",
            "AEST-10AEDT,M10.1.0,M4.1.0/3",
        ] {
            assert_eq!(posix(tz).to_string(), tz);
        }
    }
}
