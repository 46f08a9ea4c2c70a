use core::str::FromStr;

use crate::{
    civil::{Date, DateTime, ISOWeekDate, Time, Weekday},
    error::{
        timestamp::Error as E,
        tz::{ambiguous::Error as AmbiguousError, offset::Error as OffsetError},
        Error, ErrorContext,
    },
    fmt::{
        parser::DateTimeParser,
        printer::{DateTimePrinter, Fraction},
    },
    tz::{AmbiguousOffset, Offset, TimeZone, TimeZoneDatabase},
    util::itime::{IOffset, ITimestamp, YEAR_MAX, YEAR_MIN},
};

/// A calendar-aware point in time.
///
/// A `Timestamp` is a civil datetime in the proleptic Gregorian calendar
/// (years `-9999` through `9999`, nanosecond precision) and, optionally, a
/// time zone along with the offset in effect at that datetime. Without a
/// time zone, a timestamp is *naive*: it describes a reading on a wall
/// clock, not a particular instant.
///
/// A `Timestamp` is immutable. Every constructor either returns a fully
/// valid value or an error.
///
/// # Construction
///
/// * From an ISO 8601-like string with [`Timestamp::parse`] (or `FromStr`).
/// * From a number of units since the Unix epoch with
/// [`Timestamp::from_epoch`] or [`Timestamp::from_epoch_f64`]. The result is
/// naive and reads as UTC.
/// * From an epoch value projected into a named time zone with
/// [`Timestamp::from_epoch_in`] or [`Timestamp::from_epoch_f64_in`].
/// * From civil components with [`Timestamp::new`], [`Timestamp::new_hms`]
/// or the [`Timestamp::builder`].
///
/// # Example
///
/// ```
/// use calstamp::{tz, Timestamp, Unit};
///
/// let ts: Timestamp = "2021-01-01T12".parse()?;
/// assert_eq!((ts.year(), ts.month(), ts.day()), (2021, 1, 1));
/// assert_eq!((ts.hour(), ts.minute(), ts.second()), (12, 0, 0));
///
/// let ts = Timestamp::from_epoch_f64(889088900.5, Unit::Second)?;
/// assert_eq!(ts.to_string(), "1998-03-05 09:08:20.500000");
///
/// let db = tz::db();
/// let ts =
///     Timestamp::from_epoch_in(5201314, Unit::Second, "US/Pacific", &db)?;
/// assert_eq!(ts.to_string(), "1970-03-01 20:48:34-08:00");
///
/// let ts = Timestamp::new(2018, 3, 21)?;
/// assert_eq!(ts.day_of_week(), 2);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Equality
///
/// Two timestamps are equal when their civil datetimes, time zones and
/// offsets are all equal. A naive timestamp is never equal to a zoned one,
/// and the same instant in two different time zones compares unequal. Use
/// [`Timestamp::as_nanosecond`] to compare instants.
#[derive(Clone, Eq, PartialEq)]
pub struct Timestamp {
    dt: DateTime,
    zone: Option<Zone>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct Zone {
    tz: TimeZone,
    offset: Offset,
}

impl Timestamp {
    /// Parses an ISO 8601-like timestamp.
    ///
    /// The accepted grammar is:
    ///
    /// ```text
    /// timestamp ::= date [sep time [offset]] [annotation]
    /// date      ::= YYYY-MM-DD | YYYYMMDD | ±YYYYYY-MM-DD | ±YYYYYYMMDD
    /// sep       ::= T | t | <space>
    /// time      ::= HH[:MM[:SS[(.|,)fraction]]] | HH[MM[SS[(.|,)fraction]]]
    /// offset    ::= Z | z | ±HH[:MM[:SS]] | ±HH[MM[SS]]
    /// annotation ::= [time-zone-name] | [±HH:MM]
    /// ```
    ///
    /// Missing time components default to zero. The fraction has between
    /// one and nine digits. A leap second, `60`, is clamped to `59`. An
    /// annotation may start with `!`, which is ignored.
    ///
    /// Named time zones in an annotation are resolved through the default
    /// database, [`tz::db()`](crate::tz::db). Use [`Timestamp::parse_with`]
    /// to choose the database. See [`Timestamp::parse_with`] for how an
    /// offset and an annotation combine.
    ///
    /// # Errors
    ///
    /// This returns a parse error when the input does not match the
    /// grammar, or when a component is out of range (in which case the
    /// error is a range error as well). An annotation that names an
    /// unknown time zone is a time zone error.
    ///
    /// # Example
    ///
    /// ```
    /// use calstamp::{tz::Offset, Timestamp};
    ///
    /// let ts = Timestamp::parse("2024-06-19T15:22:45.123-04:00")?;
    /// assert_eq!(ts.millisecond(), 123);
    /// assert_eq!(ts.offset(), Some(Offset::constant(-4)));
    ///
    /// let ts = Timestamp::parse("20240619T152245Z")?;
    /// assert_eq!(ts.to_string(), "2024-06-19 15:22:45+00:00");
    ///
    /// assert!(Timestamp::parse("2024-06-19T25").unwrap_err().is_range());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn parse(input: impl AsRef<[u8]>) -> Result<Timestamp, Error> {
        let parsed = DateTimeParser::new().parse_timestamp(input.as_ref())?;
        parsed.to_timestamp(|name| crate::tz::db().get(name))
    }

    /// Parses an ISO 8601-like timestamp, resolving named time zones through
    /// the given database.
    ///
    /// The grammar is documented on [`Timestamp::parse`]. An offset and an
    /// annotation combine as follows:
    ///
    /// * Neither: the timestamp is naive.
    /// * Only an offset: the timestamp is in that fixed offset, or UTC for
    /// `Z`.
    /// * Only an annotation: the datetime is local time in that zone. A
    /// datetime in a gap is an error. A datetime in a fold resolves to the
    /// earlier instant.
    /// * `Z` and an annotation: the UTC instant is projected into the zone.
    /// * A numeric offset and an annotation: the offset must be the one the
    /// zone has at that instant, otherwise this returns an error.
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::BTreeMap;
    ///
    /// use calstamp::{tz::{Offset, TimeZone}, Timestamp};
    ///
    /// let mut db = BTreeMap::new();
    /// db.insert(
    ///     "America/New_York".to_string(),
    ///     TimeZone::posix("EST5EDT,M3.2.0,M11.1.0")?,
    /// );
    ///
    /// let input = "2024-07-04T12:00Z[America/New_York]";
    /// let ts = Timestamp::parse_with(&db, input)?;
    /// assert_eq!(ts.hour(), 8);
    /// assert_eq!(ts.offset(), Some(Offset::constant(-4)));
    ///
    /// let input = "2024-07-04T12:00[Europe/Paris]";
    /// let result = Timestamp::parse_with(&db, input);
    /// assert!(result.unwrap_err().is_time_zone());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn parse_with(
        db: impl TimeZoneDatabase,
        input: impl AsRef<[u8]>,
    ) -> Result<Timestamp, Error> {
        let parsed = DateTimeParser::new().parse_timestamp(input.as_ref())?;
        parsed.to_timestamp(|name| db.get(name))
    }

    /// Creates a naive timestamp from a number of `unit`s since the Unix
    /// epoch. The civil fields read as UTC.
    ///
    /// # Errors
    ///
    /// This returns a range error when the result is before
    /// `-9999-01-01T00:00:00Z` or after `9999-12-31T23:59:59.999999999Z`.
    ///
    /// # Example
    ///
    /// ```
    /// use calstamp::{Timestamp, Unit};
    ///
    /// let ts = Timestamp::from_epoch(1_700_000_000_123i64, Unit::Millisecond)?;
    /// assert_eq!(ts.to_string(), "2023-11-14 22:13:20.123000");
    /// assert_eq!(ts.offset(), None);
    ///
    /// let ts = Timestamp::from_epoch(-1, Unit::Nanosecond)?;
    /// assert_eq!(ts.to_string(), "1969-12-31 23:59:59.999999999");
    ///
    /// assert!(Timestamp::from_epoch(i64::MAX, Unit::Second)
    ///     .unwrap_err()
    ///     .is_range());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_epoch(
        value: impl Into<i128>,
        unit: Unit,
    ) -> Result<Timestamp, Error> {
        let instant = epoch_to_instant(value.into(), unit)?;
        Timestamp::from_utc_instant(instant, unit)
    }

    /// Like [`Timestamp::from_epoch`], but for a floating point value.
    ///
    /// The fractional part is rounded to the nearest nanosecond.
    ///
    /// # Errors
    ///
    /// This returns a range error when `value` is NaN or infinite, or when
    /// the result is out of range.
    ///
    /// # Example
    ///
    /// ```
    /// use calstamp::{Timestamp, Unit};
    ///
    /// let ts = Timestamp::from_epoch_f64(1.5, Unit::Millisecond)?;
    /// assert_eq!(ts.subsec_nanosecond(), 1_500_000);
    ///
    /// assert!(Timestamp::from_epoch_f64(f64::NAN, Unit::Second)
    ///     .unwrap_err()
    ///     .is_range());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_epoch_f64(value: f64, unit: Unit) -> Result<Timestamp, Error> {
        let instant = epoch_f64_to_instant(value, unit)?;
        Timestamp::from_utc_instant(instant, unit)
    }

    /// Creates a timestamp from a number of `unit`s since the Unix epoch,
    /// projected into the named time zone.
    ///
    /// The epoch value fixes the instant. The time zone determines the
    /// civil fields reported by the accessors.
    ///
    /// # Errors
    ///
    /// This returns a time zone error when `tz_name` is not in `db`. This
    /// is checked first, so it is reported no matter the epoch value. It
    /// returns a range error when the instant, or its local datetime, is
    /// out of range.
    ///
    /// # Example
    ///
    /// ```
    /// use calstamp::{tz::{self, Offset}, Timestamp, Unit};
    ///
    /// let db = tz::db();
    /// let ts =
    ///     Timestamp::from_epoch_in(0, Unit::Second, "Asia/Kolkata", &db)?;
    /// assert_eq!(ts.to_string(), "1970-01-01 05:30:00+05:30");
    /// assert_eq!(ts.as_second(), 0);
    ///
    /// let err = Timestamp::from_epoch_in(0, Unit::Second, "Nowhere", &db)
    ///     .unwrap_err();
    /// assert!(err.is_time_zone());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_epoch_in(
        value: impl Into<i128>,
        unit: Unit,
        tz_name: &str,
        db: impl TimeZoneDatabase,
    ) -> Result<Timestamp, Error> {
        let tz = db.get(tz_name)?;
        let instant = epoch_to_instant(value.into(), unit)?;
        Timestamp::from_instant_in(instant, tz)
            .context(E::FailedEpochInTimeZone)
    }

    /// Like [`Timestamp::from_epoch_in`], but for a floating point value.
    pub fn from_epoch_f64_in(
        value: f64,
        unit: Unit,
        tz_name: &str,
        db: impl TimeZoneDatabase,
    ) -> Result<Timestamp, Error> {
        let tz = db.get(tz_name)?;
        let instant = epoch_f64_to_instant(value, unit)?;
        Timestamp::from_instant_in(instant, tz)
            .context(E::FailedEpochInTimeZone)
    }

    /// Creates a naive timestamp at midnight of the given date.
    ///
    /// # Errors
    ///
    /// This returns a range error when the components do not form a valid
    /// date. See [`Date::new`].
    ///
    /// # Example
    ///
    /// ```
    /// use calstamp::Timestamp;
    ///
    /// let ts = Timestamp::new(2024, 2, 29)?;
    /// assert!(ts.is_leap_year());
    /// assert!(Timestamp::new(2023, 2, 29).unwrap_err().is_range());
    /// assert!(Timestamp::new(2023, 1, 32).unwrap_err().is_range());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(year: i16, month: i8, day: i8) -> Result<Timestamp, Error> {
        let date = Date::new(year, month, day)?;
        Ok(Timestamp::naive(date.to_datetime(Time::MIN)))
    }

    /// Creates a naive timestamp from a date and a time of day.
    ///
    /// # Errors
    ///
    /// This returns a range error when any component is out of range.
    pub fn new_hms(
        year: i16,
        month: i8,
        day: i8,
        hour: i8,
        minute: i8,
        second: i8,
    ) -> Result<Timestamp, Error> {
        let dt = DateTime::new(year, month, day, hour, minute, second, 0)?;
        Ok(Timestamp::naive(dt))
    }

    /// Starts building a timestamp from civil components.
    ///
    /// Unset time components default to zero. See [`TimestampWith`].
    ///
    /// # Example
    ///
    /// ```
    /// use calstamp::{tz, Timestamp};
    ///
    /// let db = tz::db();
    /// let ts = Timestamp::builder(2024, 3, 10)
    ///     .hour(9)
    ///     .minute(30)
    ///     .microsecond(250_000)
    ///     .tz("America/New_York")
    ///     .db(&db)
    ///     .build()?;
    /// assert_eq!(ts.to_string(), "2024-03-10 09:30:00.250000-04:00");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn builder(year: i16, month: i8, day: i8) -> TimestampWith<'static> {
        TimestampWith::new(Source::Civil { year, month, day })
    }

    /// Starts building a timestamp from an integer number of units since
    /// the Unix epoch.
    ///
    /// The unit defaults to [`Unit::Nanosecond`]. Civil time components may
    /// not be set on this builder.
    ///
    /// # Example
    ///
    /// ```
    /// use calstamp::{tz, Timestamp, Unit};
    ///
    /// let db = tz::db();
    /// let ts = Timestamp::epoch_builder(1_513_393_355)
    ///     .unit(Unit::Second)
    ///     .tz("US/Pacific")
    ///     .db(&db)
    ///     .build()?;
    /// assert_eq!(ts.to_string(), "2017-12-15 19:02:35-08:00");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn epoch_builder(value: impl Into<i128>) -> TimestampWith<'static> {
        TimestampWith::new(Source::Epoch(value.into()))
    }

    #[inline]
    pub fn year(&self) -> i16 {
        self.dt.date().year()
    }

    #[inline]
    pub fn month(&self) -> i8 {
        self.dt.date().month()
    }

    #[inline]
    pub fn day(&self) -> i8 {
        self.dt.date().day()
    }

    #[inline]
    pub fn hour(&self) -> i8 {
        self.dt.time().hour()
    }

    #[inline]
    pub fn minute(&self) -> i8 {
        self.dt.time().minute()
    }

    #[inline]
    pub fn second(&self) -> i8 {
        self.dt.time().second()
    }

    /// Returns the whole milliseconds of the fractional second, in
    /// `0..=999`.
    #[inline]
    pub fn millisecond(&self) -> i16 {
        (self.subsec_nanosecond() / 1_000_000) as i16
    }

    /// Returns the whole microseconds of the fractional second, in
    /// `0..=999_999`.
    ///
    /// # Example
    ///
    /// ```
    /// use calstamp::Timestamp;
    ///
    /// let ts = Timestamp::parse("2021-01-01T00:00:00.123456789")?;
    /// assert_eq!(ts.millisecond(), 123);
    /// assert_eq!(ts.microsecond(), 123_456);
    /// assert_eq!(ts.nanosecond(), 789);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[inline]
    pub fn microsecond(&self) -> i32 {
        self.subsec_nanosecond() / 1_000
    }

    /// Returns the nanoseconds past the current microsecond, in `0..=999`.
    #[inline]
    pub fn nanosecond(&self) -> i16 {
        (self.subsec_nanosecond() % 1_000) as i16
    }

    /// Returns the fractional second as nanoseconds, in
    /// `0..=999_999_999`.
    #[inline]
    pub fn subsec_nanosecond(&self) -> i32 {
        self.dt.time().subsec_nanosecond()
    }

    /// Returns the civil datetime. For a zoned timestamp, this is local
    /// time in its time zone.
    #[inline]
    pub fn datetime(&self) -> DateTime {
        self.dt
    }

    #[inline]
    pub fn date(&self) -> Date {
        self.dt.date()
    }

    #[inline]
    pub fn time(&self) -> Time {
        self.dt.time()
    }

    /// Returns the time zone of this timestamp, or `None` when it is naive.
    #[inline]
    pub fn time_zone(&self) -> Option<&TimeZone> {
        self.zone.as_ref().map(|zone| &zone.tz)
    }

    /// Returns the offset from UTC of this timestamp, or `None` when it is
    /// naive.
    #[inline]
    pub fn offset(&self) -> Option<Offset> {
        self.zone.as_ref().map(|zone| zone.offset)
    }

    /// Returns the day of the week, with `0` for Monday through `6` for
    /// Sunday.
    ///
    /// This has no alias such as `dayofweek`. [`Timestamp::weekday`]
    /// returns the same day as a [`Weekday`](crate::civil::Weekday).
    ///
    /// # Example
    ///
    /// ```
    /// use calstamp::{civil::Weekday, Timestamp};
    ///
    /// let ts = Timestamp::new(2018, 3, 21)?;
    /// assert_eq!(ts.day_of_week(), 2);
    /// assert_eq!(ts.weekday(), Weekday::Wednesday);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[inline]
    pub fn day_of_week(&self) -> i8 {
        self.weekday().to_monday_zero_offset()
    }

    #[inline]
    pub fn weekday(&self) -> Weekday {
        self.dt.date().weekday()
    }

    /// Returns the ordinal day of the year, starting at `1`.
    #[inline]
    pub fn day_of_year(&self) -> i16 {
        self.dt.date().day_of_year()
    }

    /// Returns the ISO 8601 week number, in `1..=53`.
    ///
    /// Week `1` is the week (starting on Monday) that contains the year's
    /// first Thursday. So near the start or end of a year, the week may
    /// belong to the adjacent ISO year. Use [`Timestamp::iso_week_date`]
    /// to get that year too. There is no `weekofyear` or `week` alias.
    ///
    /// # Example
    ///
    /// ```
    /// use calstamp::Timestamp;
    ///
    /// // 2021-01-03 is a Sunday, in the last week of ISO year 2020.
    /// let ts = Timestamp::new(2021, 1, 3)?;
    /// assert_eq!(ts.week_of_year(), 53);
    /// assert_eq!(ts.iso_week_date().year(), 2020);
    ///
    /// // 2024-12-30 is a Monday, in the first week of ISO year 2025.
    /// let ts = Timestamp::new(2024, 12, 30)?;
    /// assert_eq!(ts.week_of_year(), 1);
    /// assert_eq!(ts.iso_week_date().year(), 2025);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[inline]
    pub fn week_of_year(&self) -> i8 {
        self.iso_week_date().week()
    }

    #[inline]
    pub fn iso_week_date(&self) -> ISOWeekDate {
        self.dt.date().iso_week_date()
    }

    /// Returns the quarter of the year, in `1..=4`.
    #[inline]
    pub fn quarter(&self) -> i8 {
        (self.month() - 1) / 3 + 1
    }

    /// Returns the number of days in this timestamp's month.
    #[inline]
    pub fn days_in_month(&self) -> i8 {
        self.dt.date().days_in_month()
    }

    #[inline]
    pub fn days_in_year(&self) -> i16 {
        self.dt.date().days_in_year()
    }

    /// Returns true on January 1.
    #[inline]
    pub fn is_year_start(&self) -> bool {
        self.month() == 1 && self.day() == 1
    }

    /// Returns true on December 31.
    #[inline]
    pub fn is_year_end(&self) -> bool {
        self.month() == 12 && self.day() == 31
    }

    /// Returns true on the first day of January, April, July or October.
    ///
    /// # Example
    ///
    /// ```
    /// use calstamp::Timestamp;
    ///
    /// assert!(Timestamp::new(2000, 4, 1)?.is_quarter_start());
    /// assert!(!Timestamp::new(2000, 2, 1)?.is_quarter_start());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[inline]
    pub fn is_quarter_start(&self) -> bool {
        self.is_month_start() && self.month() % 3 == 1
    }

    /// Returns true on the last day of March, June, September or December.
    #[inline]
    pub fn is_quarter_end(&self) -> bool {
        self.is_month_end() && self.month() % 3 == 0
    }

    #[inline]
    pub fn is_month_start(&self) -> bool {
        self.day() == 1
    }

    #[inline]
    pub fn is_month_end(&self) -> bool {
        self.day() == self.days_in_month()
    }

    /// Returns true when the year is a leap year in the Gregorian calendar.
    #[inline]
    pub fn is_leap_year(&self) -> bool {
        self.dt.date().in_leap_year()
    }

    /// Returns the number of seconds since the Unix epoch, rounded toward
    /// negative infinity.
    ///
    /// A naive timestamp is read as UTC.
    ///
    /// # Example
    ///
    /// ```
    /// use calstamp::Timestamp;
    ///
    /// let ts = Timestamp::parse("1970-01-01T00:00:00.5-01:00")?;
    /// assert_eq!(ts.as_second(), 3600);
    /// let ts = Timestamp::parse("1969-12-31T23:59:59.5")?;
    /// assert_eq!(ts.as_second(), -1);
    /// assert_eq!(ts.as_millisecond(), -500);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[inline]
    pub fn as_second(&self) -> i64 {
        self.to_instant().second
    }

    /// Returns the number of milliseconds since the Unix epoch, rounded
    /// toward negative infinity.
    #[inline]
    pub fn as_millisecond(&self) -> i64 {
        // At most ~3.2e14, which fits.
        self.as_nanosecond().div_euclid(1_000_000) as i64
    }

    /// Returns the number of microseconds since the Unix epoch, rounded
    /// toward negative infinity.
    #[inline]
    pub fn as_microsecond(&self) -> i64 {
        // At most ~3.2e17, which fits.
        self.as_nanosecond().div_euclid(1_000) as i64
    }

    #[inline]
    pub fn as_nanosecond(&self) -> i128 {
        self.to_instant().as_nanosecond()
    }
}

impl Timestamp {
    pub(crate) const fn naive(dt: DateTime) -> Timestamp {
        Timestamp { dt, zone: None }
    }

    /// Interprets `dt` as local time in `tz`.
    ///
    /// A datetime in a gap is an error. A datetime in a fold resolves to
    /// the earlier of its two instants.
    pub(crate) fn from_local_in(
        dt: DateTime,
        tz: TimeZone,
    ) -> Result<Timestamp, Error> {
        let idt = dt.to_idatetime();
        let offset = match tz.to_ambiguous_offset(idt) {
            AmbiguousOffset::Unambiguous { offset } => offset,
            AmbiguousOffset::Fold { before, after: _after } => {
                trace!(
                    "{dt} is ambiguous in time zone {tz}, \
                     choosing {before} over {_after}",
                    tz = tz.diagnostic_name(),
                );
                before
            }
            AmbiguousOffset::Gap { before, after } => {
                let err = Error::from(AmbiguousError::Gap {
                    datetime: dt,
                    before,
                    after,
                });
                return Err(err.context(AmbiguousError::InTimeZone { tz }));
            }
        };
        let instant = idt.to_timestamp(offset.to_ioffset());
        if !is_supported(instant) {
            let err = Error::slim_range("timestamp");
            return Err(
                err.context(OffsetError::ConvertDateTimeToTimestamp { offset })
            );
        }
        Ok(Timestamp { dt, zone: Some(Zone { tz, offset }) })
    }

    /// Projects an instant into `tz`.
    pub(crate) fn from_instant_in(
        instant: ITimestamp,
        tz: TimeZone,
    ) -> Result<Timestamp, Error> {
        if !is_supported(instant) {
            return Err(Error::slim_range("timestamp"));
        }
        let offset = tz.to_offset(instant.second);
        let idt = instant.to_datetime(offset.to_ioffset());
        let Some(dt) = DateTime::from_idatetime(idt) else {
            let err = Error::range("year", idt.date.year, YEAR_MIN, YEAR_MAX);
            return Err(
                err.context(OffsetError::ConvertTimestampToDateTime { offset })
            );
        };
        Ok(Timestamp { dt, zone: Some(Zone { tz, offset }) })
    }

    fn from_utc_instant(
        instant: ITimestamp,
        unit: Unit,
    ) -> Result<Timestamp, Error> {
        let idt = instant.to_datetime(IOffset::UTC);
        let dt = DateTime::from_idatetime(idt)
            .ok_or(E::EpochOutOfRange { unit })?;
        Ok(Timestamp::naive(dt))
    }

    fn to_instant(&self) -> ITimestamp {
        let offset = self.offset().unwrap_or(Offset::UTC);
        self.dt.to_idatetime().to_timestamp(offset.to_ioffset())
    }
}

fn is_supported(instant: ITimestamp) -> bool {
    ITimestamp::MIN <= instant && instant <= ITimestamp::MAX
}

fn epoch_to_instant(value: i128, unit: Unit) -> Result<ITimestamp, Error> {
    value
        .checked_mul(unit.nanoseconds())
        .and_then(ITimestamp::from_nanosecond)
        .ok_or_else(|| E::EpochOutOfRange { unit }.into())
}

fn epoch_f64_to_instant(value: f64, unit: Unit) -> Result<ITimestamp, Error> {
    #[cfg(not(feature = "std"))]
    use crate::util::libm::Float;

    if !value.is_finite() {
        return Err(E::EpochNotFinite { unit }.into());
    }
    let per_unit = unit.nanoseconds();
    let whole = value.trunc();
    let fraction = ((value - whole) * per_unit as f64).round();
    // Float to int casts saturate. A saturated value can never pass the
    // checked multiplication and range check below.
    (whole as i128)
        .checked_mul(per_unit)
        .and_then(|nanos| nanos.checked_add(fraction as i128))
        .and_then(ITimestamp::from_nanosecond)
        .ok_or_else(|| E::EpochOutOfRange { unit }.into())
}

impl core::fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        DateTimePrinter::new().print_timestamp(self, true, f)
    }
}

/// Prints `YYYY-MM-DD HH:MM:SS`, then `.ffffff` when the fractional second
/// is non-zero (nine digits with sub-microsecond precision) and the offset
/// when the timestamp has a time zone.
///
/// The alternate form, `{:#}`, also appends the time zone's IANA name in
/// brackets, when it has one.
///
/// # Example
///
/// ```
/// use calstamp::{tz, Timestamp, Unit};
///
/// let db = tz::db();
/// let ts = Timestamp::from_epoch_in(0, Unit::Second, "Europe/Paris", &db)?;
/// assert_eq!(ts.to_string(), "1970-01-01 01:00:00+01:00");
/// assert_eq!(format!("{ts:#}"), "1970-01-01 01:00:00+01:00[Europe/Paris]");
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
impl core::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        DateTimePrinter::new()
            .separator(b' ')
            .fraction(Fraction::Microsecond)
            .print_timestamp(self, f.alternate(), f)
    }
}

impl FromStr for Timestamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Timestamp, Error> {
        Timestamp::parse(s)
    }
}

/// A unit of time for numeric epoch values.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Unit {
    Second,
    Millisecond,
    Microsecond,
    Nanosecond,
}

impl Unit {
    fn nanoseconds(self) -> i128 {
        match self {
            Unit::Second => 1_000_000_000,
            Unit::Millisecond => 1_000_000,
            Unit::Microsecond => 1_000,
            Unit::Nanosecond => 1,
        }
    }

    /// A human readable plural description of this unit of time.
    pub(crate) fn plural(self) -> &'static str {
        match self {
            Unit::Second => "seconds",
            Unit::Millisecond => "milliseconds",
            Unit::Microsecond => "microseconds",
            Unit::Nanosecond => "nanoseconds",
        }
    }
}

/// A builder for a [`Timestamp`].
///
/// This is created by [`Timestamp::builder`], from civil components, or by
/// [`Timestamp::epoch_builder`], from an epoch value. Every option is a
/// named setter, and [`TimestampWith::build`] validates all of them at
/// once.
///
/// When a time zone is set, civil components are local time in that zone,
/// and an epoch value is projected into it. A time zone name is resolved
/// through the database given to [`TimestampWith::db`], or through
/// [`tz::db()`](crate::tz::db) when none is given.
///
/// # Example
///
/// ```
/// use calstamp::{tz::{Offset, TimeZone}, Timestamp};
///
/// let ts = Timestamp::builder(2021, 6, 30)
///     .hour(23)
///     .minute(59)
///     .second(59)
///     .time_zone(TimeZone::fixed(Offset::constant(2)))
///     .build()?;
/// assert!(ts.is_quarter_end());
/// assert_eq!(ts.as_second(), 1_625_090_399);
///
/// // A time zone name that the database doesn't know is an error.
/// let db = std::collections::BTreeMap::<String, TimeZone>::new();
/// let err = Timestamp::builder(2021, 6, 30)
///     .tz("Antarctica/Vostok")
///     .db(&db)
///     .build()
///     .unwrap_err();
/// assert!(err.is_time_zone());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone)]
pub struct TimestampWith<'a> {
    source: Source,
    unit: Option<Unit>,
    hour: Option<i8>,
    minute: Option<i8>,
    second: Option<i8>,
    microsecond: Option<i32>,
    nanosecond: Option<i16>,
    tz: Option<TimeZoneChoice<'a>>,
    db: Option<&'a dyn TimeZoneDatabase>,
}

#[derive(Clone, Copy, Debug)]
enum Source {
    Civil { year: i16, month: i8, day: i8 },
    Epoch(i128),
}

#[derive(Clone, Debug)]
enum TimeZoneChoice<'a> {
    Name(&'a str),
    Zone(TimeZone),
}

impl<'a> TimestampWith<'a> {
    fn new(source: Source) -> TimestampWith<'a> {
        TimestampWith {
            source,
            unit: None,
            hour: None,
            minute: None,
            second: None,
            microsecond: None,
            nanosecond: None,
            tz: None,
            db: None,
        }
    }

    /// Sets the unit of the epoch value. Only valid for builders created
    /// with [`Timestamp::epoch_builder`].
    pub fn unit(self, unit: Unit) -> TimestampWith<'a> {
        TimestampWith { unit: Some(unit), ..self }
    }

    pub fn hour(self, hour: i8) -> TimestampWith<'a> {
        TimestampWith { hour: Some(hour), ..self }
    }

    pub fn minute(self, minute: i8) -> TimestampWith<'a> {
        TimestampWith { minute: Some(minute), ..self }
    }

    pub fn second(self, second: i8) -> TimestampWith<'a> {
        TimestampWith { second: Some(second), ..self }
    }

    /// Sets the microseconds of the fractional second, in `0..=999_999`.
    pub fn microsecond(self, microsecond: i32) -> TimestampWith<'a> {
        TimestampWith { microsecond: Some(microsecond), ..self }
    }

    /// Sets the nanoseconds past the microsecond, in `0..=999`.
    ///
    /// ```
    /// use calstamp::Timestamp;
    ///
    /// let ts = Timestamp::builder(2021, 1, 1)
    ///     .microsecond(123_456)
    ///     .nanosecond(789)
    ///     .build()?;
    /// assert_eq!(ts.subsec_nanosecond(), 123_456_789);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn nanosecond(self, nanosecond: i16) -> TimestampWith<'a> {
        TimestampWith { nanosecond: Some(nanosecond), ..self }
    }

    /// Sets the time zone by its identifier, e.g., `America/New_York`.
    ///
    /// This replaces any time zone set with [`TimestampWith::time_zone`].
    pub fn tz(self, name: &'a str) -> TimestampWith<'a> {
        TimestampWith { tz: Some(TimeZoneChoice::Name(name)), ..self }
    }

    /// Sets the time zone directly. No database is consulted.
    ///
    /// This replaces any time zone set with [`TimestampWith::tz`].
    pub fn time_zone(self, tz: TimeZone) -> TimestampWith<'a> {
        TimestampWith { tz: Some(TimeZoneChoice::Zone(tz)), ..self }
    }

    /// Sets the database used to resolve a time zone name.
    pub fn db(self, db: &'a dyn TimeZoneDatabase) -> TimestampWith<'a> {
        TimestampWith { db: Some(db), ..self }
    }

    /// Builds the timestamp.
    ///
    /// # Errors
    ///
    /// This returns a time zone error when the time zone name is unknown.
    /// That is checked before anything else. It returns a range error when
    /// a component is out of range, when the local datetime falls in a gap
    /// of its time zone, or when the epoch value is out of range. Setting
    /// civil time components on an epoch builder, or a unit on a civil
    /// builder, is also an error.
    pub fn build(self) -> Result<Timestamp, Error> {
        self.build_impl().context(E::FailedBuild)
    }

    fn build_impl(self) -> Result<Timestamp, Error> {
        let tz = match self.tz {
            None => None,
            Some(TimeZoneChoice::Zone(ref tz)) => Some(tz.clone()),
            Some(TimeZoneChoice::Name(name)) => Some(match self.db {
                Some(db) => db.get(name)?,
                None => crate::tz::db().get(name)?,
            }),
        };
        match self.source {
            Source::Civil { year, month, day } => {
                if self.unit.is_some() {
                    return Err(E::MixedEpochAndComponents.into());
                }
                let dt = self.civil(year, month, day)?;
                match tz {
                    None => Ok(Timestamp::naive(dt)),
                    Some(tz) => Timestamp::from_local_in(dt, tz),
                }
            }
            Source::Epoch(value) => {
                if self.has_time_components() {
                    return Err(E::MixedEpochAndComponents.into());
                }
                let unit = self.unit.unwrap_or(Unit::Nanosecond);
                let instant = epoch_to_instant(value, unit)?;
                match tz {
                    None => Timestamp::from_utc_instant(instant, unit),
                    Some(tz) => Timestamp::from_instant_in(instant, tz),
                }
            }
        }
    }

    fn civil(&self, year: i16, month: i8, day: i8) -> Result<DateTime, Error> {
        let microsecond = self.microsecond.unwrap_or(0);
        if !(0 <= microsecond && microsecond <= 999_999) {
            return Err(Error::range("microsecond", microsecond, 0, 999_999));
        }
        let nanosecond = self.nanosecond.unwrap_or(0);
        if !(0 <= nanosecond && nanosecond <= 999) {
            return Err(Error::range("nanosecond", nanosecond, 0, 999));
        }
        let subsec = microsecond * 1_000 + i32::from(nanosecond);
        DateTime::new(
            year,
            month,
            day,
            self.hour.unwrap_or(0),
            self.minute.unwrap_or(0),
            self.second.unwrap_or(0),
            subsec,
        )
    }

    fn has_time_components(&self) -> bool {
        self.hour.is_some()
            || self.minute.is_some()
            || self.second.is_some()
            || self.microsecond.is_some()
            || self.nanosecond.is_some()
    }
}

impl<'a> core::fmt::Debug for TimestampWith<'a> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("TimestampWith")
            .field("source", &self.source)
            .field("unit", &self.unit)
            .field("hour", &self.hour)
            .field("minute", &self.minute)
            .field("second", &self.second)
            .field("microsecond", &self.microsecond)
            .field("nanosecond", &self.nanosecond)
            .field("tz", &self.tz)
            .field("db", &self.db.map(|_| ".."))
            .finish()
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for Timestamp {
    fn arbitrary(g: &mut quickcheck::Gen) -> Timestamp {
        let (min, max) = (
            ITimestamp::MIN.as_nanosecond(),
            ITimestamp::MAX.as_nanosecond(),
        );
        let nanos = i128::from(i64::arbitrary(g)) * 1_000_000
            + i128::from(u32::arbitrary(g) % 1_000_000);
        let nanos = nanos.rem_euclid(max - min + 1) + min;
        let instant = ITimestamp::from_nanosecond(nanos).unwrap();
        if bool::arbitrary(g) {
            return Timestamp::from_utc_instant(instant, Unit::Nanosecond)
                .unwrap();
        }
        // Offsets in whole minutes, within a day.
        let minutes =
            i32::from(i16::arbitrary(g)).rem_euclid(2 * 1_559) - 1_559;
        let offset = Offset::from_seconds(minutes * 60).unwrap();
        let tz = TimeZone::fixed(offset);
        Timestamp::from_instant_in(instant, tz).unwrap_or_else(|_| {
            Timestamp::from_utc_instant(instant, Unit::Nanosecond).unwrap()
        })
    }
}

#[cfg(test)]
mod tests {
    use alloc::{collections::BTreeMap, string::String, string::ToString};

    use quickcheck::quickcheck;

    use super::*;

    fn eastern() -> BTreeMap<String, TimeZone> {
        let mut db = BTreeMap::new();
        let tz = TimeZone::posix("EST5EDT,M3.2.0,M11.1.0").unwrap();
        db.insert("America/New_York".to_string(), tz);
        db
    }

    #[test]
    fn parse_partial_time() {
        let ts: Timestamp = "2021-01-01T12".parse().unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2021, 1, 1));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (12, 0, 0));
        assert_eq!(ts.subsec_nanosecond(), 0);
        assert_eq!(ts.time_zone(), None);
    }

    #[test]
    fn leap_years() {
        let leap = |y| Timestamp::new(y, 1, 1).unwrap().is_leap_year();
        assert!(leap(2000));
        assert!(!leap(1900));
        assert!(leap(2004));
        assert!(!leap(2001));
        assert!(leap(0));
        assert!(leap(-4));
    }

    #[test]
    fn days_in_month_table() {
        let table = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
        for year in [1900, 2000, 2023, 2024] {
            for (i, &days) in table.iter().enumerate() {
                let ts = Timestamp::new(year, (i + 1) as i8, 1).unwrap();
                let leap_feb = i == 1 && ts.is_leap_year();
                let want = if leap_feb { 29 } else { days };
                assert_eq!(ts.days_in_month(), want, "{year}-{}", i + 1);
            }
        }
    }

    #[test]
    fn calendar_queries() {
        let ts = Timestamp::new(2018, 3, 21).unwrap();
        assert_eq!(ts.day_of_week(), 2);
        assert_eq!(ts.day_of_year(), 80);
        assert_eq!(ts.week_of_year(), 12);
        assert_eq!(ts.quarter(), 1);

        let ts = Timestamp::new(2000, 1, 1).unwrap();
        assert!(ts.is_year_start());
        assert!(ts.is_quarter_start());
        assert!(ts.is_month_start());
        assert!(!ts.is_year_end());
        // Saturday, in the last ISO week of 1999.
        assert_eq!(ts.day_of_week(), 5);
        assert_eq!(ts.week_of_year(), 52);
        assert_eq!(ts.iso_week_date().year(), 1999);

        let ts = Timestamp::new(2000, 12, 31).unwrap();
        assert!(ts.is_year_end());
        assert!(ts.is_quarter_end());
        assert!(ts.is_month_end());
        assert_eq!(ts.day_of_year(), 366);
        assert_eq!(ts.days_in_year(), 366);
        assert_eq!(ts.quarter(), 4);

        assert!(!Timestamp::new(2000, 2, 1).unwrap().is_quarter_start());
        assert!(Timestamp::new(2000, 4, 1).unwrap().is_quarter_start());
        assert!(Timestamp::new(2000, 6, 30).unwrap().is_quarter_end());
        assert!(!Timestamp::new(2000, 5, 31).unwrap().is_quarter_end());
        assert!(Timestamp::new(2000, 2, 29).unwrap().is_month_end());
        assert!(!Timestamp::new(2000, 2, 28).unwrap().is_month_end());
    }

    #[test]
    fn extreme_iso_week() {
        let ts = Timestamp::new(-9999, 1, 1).unwrap();
        assert_eq!(ts.iso_week_date().year(), -9999);
        assert_eq!(ts.week_of_year(), 1);
        assert_eq!(ts.weekday(), Weekday::Monday);
        let ts = Timestamp::new(9999, 12, 31).unwrap();
        assert_eq!(ts.week_of_year(), 52);
    }

    #[test]
    fn out_of_range_components() {
        for year in [-9999, 0, 2021, 9999] {
            assert!(Timestamp::new(year, 13, 1).unwrap_err().is_range());
            assert!(Timestamp::new(year, 1, 32).unwrap_err().is_range());
        }
        assert!(Timestamp::new(10_000, 1, 1).unwrap_err().is_range());
        assert!(Timestamp::new_hms(2021, 1, 1, 24, 0, 0)
            .unwrap_err()
            .is_range());
        let err =
            Timestamp::builder(2021, 1, 1).microsecond(1_000_000).build();
        assert!(err.unwrap_err().is_range());
        let err = Timestamp::builder(2021, 1, 1).microsecond(-1).build();
        assert!(err.unwrap_err().is_range());
        let err = Timestamp::builder(2021, 1, 1).nanosecond(1_000).build();
        assert!(err.unwrap_err().is_range());
    }

    #[test]
    fn epoch_units() {
        let cases = [
            (Unit::Second, 1_500_000_000i128, "2017-07-14 02:40:00"),
            (
                Unit::Millisecond,
                1_500_000_000_001,
                "2017-07-14 02:40:00.001000",
            ),
            (
                Unit::Microsecond,
                1_500_000_000_000_001,
                "2017-07-14 02:40:00.000001",
            ),
            (
                Unit::Nanosecond,
                1_500_000_000_000_000_001,
                "2017-07-14 02:40:00.000000001",
            ),
        ];
        for (unit, value, want) in cases {
            let ts = Timestamp::from_epoch(value, unit).unwrap();
            assert_eq!(ts.to_string(), want, "{unit:?}");
        }
    }

    #[test]
    fn epoch_bounds() {
        let min = Timestamp::from_epoch(-377_705_116_800i64, Unit::Second);
        assert_eq!(min.unwrap().to_string(), "-009999-01-01 00:00:00");
        let err = Timestamp::from_epoch(-377_705_116_801i64, Unit::Second)
            .unwrap_err();
        assert!(err.is_range());
        let max = Timestamp::from_epoch(253_402_300_799i64, Unit::Second);
        assert_eq!(max.unwrap().to_string(), "9999-12-31 23:59:59");

        let err = Timestamp::from_epoch(253_402_300_800i64, Unit::Second)
            .unwrap_err();
        assert!(err.is_range());
        insta::assert_snapshot!(
            err,
            @"number of seconds since the Unix epoch is outside the supported range of `-9999-01-01T00:00:00Z` to `9999-12-31T23:59:59.999999999Z`",
        );
        assert!(Timestamp::from_epoch(i128::MAX, Unit::Millisecond)
            .unwrap_err()
            .is_range());
    }

    #[test]
    fn epoch_floats() {
        let ts = Timestamp::from_epoch_f64(889088900.5, Unit::Second).unwrap();
        assert_eq!(ts.to_string(), "1998-03-05 09:08:20.500000");
        let ts = Timestamp::from_epoch_f64(-0.5, Unit::Second).unwrap();
        assert_eq!(ts.to_string(), "1969-12-31 23:59:59.500000");
        let ts = Timestamp::from_epoch_f64(1.0000005, Unit::Microsecond)
            .unwrap();
        assert_eq!(ts.subsec_nanosecond(), 1_000);

        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = Timestamp::from_epoch_f64(value, Unit::Second)
                .unwrap_err();
            assert!(err.is_range());
        }
        let err = Timestamp::from_epoch_f64(1e300, Unit::Second).unwrap_err();
        assert!(err.is_range());
    }

    #[test]
    fn epoch_in_time_zone() {
        let db = eastern();
        let ts = Timestamp::from_epoch_in(
            1_719_792_000i64,
            Unit::Second,
            "America/New_York",
            &db,
        )
        .unwrap();
        assert_eq!(ts.to_string(), "2024-06-30 20:00:00-04:00");
        assert_eq!(ts.as_second(), 1_719_792_000);

        let ts = Timestamp::from_epoch_f64_in(
            1_704_067_200.25,
            Unit::Second,
            "America/New_York",
            &db,
        )
        .unwrap();
        assert_eq!(ts.to_string(), "2023-12-31 19:00:00.250000-05:00");
    }

    #[test]
    fn unknown_time_zone_wins() {
        let db = eastern();
        for value in [0i128, i128::MAX] {
            let err =
                Timestamp::from_epoch_in(value, Unit::Second, "Nowhere", &db)
                    .unwrap_err();
            assert!(err.is_time_zone());
        }
        let err = Timestamp::from_epoch_f64_in(
            f64::NAN,
            Unit::Second,
            "Nowhere",
            &db,
        )
        .unwrap_err();
        assert!(err.is_time_zone());
    }

    #[test]
    fn local_projection_out_of_range() {
        let db = eastern();
        // The instant is the earliest one supported, but its local
        // datetime is -10000-12-31T19:00.
        assert!(Timestamp::from_epoch(-377_705_116_800i64, Unit::Second)
            .is_ok());
        let err = Timestamp::from_epoch_in(
            -377_705_116_800i64,
            Unit::Second,
            "America/New_York",
            &db,
        )
        .unwrap_err();
        assert!(err.is_range());
    }

    #[test]
    fn builder_civil() {
        let db = eastern();
        let ts = Timestamp::builder(2024, 7, 4)
            .hour(12)
            .minute(34)
            .second(56)
            .microsecond(1_002)
            .nanosecond(3)
            .tz("America/New_York")
            .db(&db)
            .build()
            .unwrap();
        assert_eq!(ts.to_string(), "2024-07-04 12:34:56.001002003-04:00");
        assert_eq!(
            (ts.millisecond(), ts.microsecond(), ts.nanosecond()),
            (1, 1_002, 3),
        );
        assert_eq!(ts.subsec_nanosecond(), 1_002_003);
    }

    #[test]
    fn microsecond_is_whole_fraction() {
        let ts = Timestamp::parse("2021-01-01T00:00:00.123456").unwrap();
        assert_eq!(ts.microsecond(), 123_456);
        assert_eq!(ts.millisecond(), 123);
        assert_eq!(ts.nanosecond(), 0);

        let ts = Timestamp::builder(2021, 1, 1)
            .microsecond(123_456)
            .build()
            .unwrap();
        assert_eq!(ts.to_string(), "2021-01-01 00:00:00.123456");
        assert_eq!(ts.microsecond(), 123_456);

        let ts = Timestamp::builder(2021, 1, 1).microsecond(1_000).build();
        assert_eq!(ts.unwrap().millisecond(), 1);

        let ts = Timestamp::from_epoch(999_999, Unit::Microsecond).unwrap();
        assert_eq!(ts.microsecond(), 999_999);
    }

    #[test]
    fn builder_gap_and_fold() {
        let db = eastern();
        let err = Timestamp::builder(2024, 3, 10)
            .hour(2)
            .minute(30)
            .tz("America/New_York")
            .db(&db)
            .build()
            .unwrap_err();
        assert!(err.is_range());
        insta::assert_snapshot!(
            err,
            @"failed to build timestamp from components: failed to resolve local datetime in time zone EST5EDT,M3.2.0,M11.1.0: local datetime 2024-03-10T02:30:00 never occurs, since clocks jump from offset -05:00 to -04:00 over it",
        );

        let ts = Timestamp::builder(2024, 11, 3)
            .hour(1)
            .minute(30)
            .tz("America/New_York")
            .db(&db)
            .build()
            .unwrap();
        assert_eq!(ts.offset(), Some(Offset::constant(-4)));
        assert_eq!(ts.as_second(), 1_730_611_800);
    }

    #[test]
    fn builder_epoch() {
        let db = eastern();
        let ts = Timestamp::epoch_builder(0).build().unwrap();
        assert_eq!(ts.to_string(), "1970-01-01 00:00:00");
        let ts = Timestamp::epoch_builder(1_000)
            .unit(Unit::Millisecond)
            .tz("America/New_York")
            .db(&db)
            .build()
            .unwrap();
        assert_eq!(ts.to_string(), "1969-12-31 19:00:01-05:00");

        let err = Timestamp::epoch_builder(0).hour(1).build().unwrap_err();
        assert!(!err.is_range());
        let err = Timestamp::builder(2024, 1, 1)
            .unit(Unit::Second)
            .build()
            .unwrap_err();
        assert!(!err.is_range());
    }

    #[test]
    fn builder_unknown_zone_checked_first() {
        let db = eastern();
        let err = Timestamp::builder(2024, 13, 1)
            .tz("Nowhere")
            .db(&db)
            .build()
            .unwrap_err();
        assert!(err.is_time_zone());
        assert!(!err.is_range());
    }

    #[test]
    fn display_forms() {
        let ts = Timestamp::parse("-000044-03-15T12:00:00.000000001").unwrap();
        assert_eq!(ts.to_string(), "-000044-03-15 12:00:00.000000001");

        let ts = Timestamp::parse("2024-01-01T00:00+05:30:15").unwrap();
        assert_eq!(ts.to_string(), "2024-01-01 00:00:00+05:30:15");

        let db = eastern();
        let ts =
            Timestamp::parse_with(&db, "2024-01-01T00:00[America/New_York]")
                .unwrap();
        // A POSIX time zone has no IANA name to annotate.
        assert_eq!(alloc::format!("{ts:#}"), "2024-01-01 00:00:00-05:00");
        assert_eq!(alloc::format!("{ts:?}"), "2024-01-01T00:00:00-05:00");
    }

    #[test]
    fn equality() {
        let naive = Timestamp::parse("2024-01-01T00:00").unwrap();
        let utc = Timestamp::parse("2024-01-01T00:00Z").unwrap();
        assert_ne!(naive, utc);
        assert_eq!(naive.as_second(), utc.as_second());
        assert_eq!(utc, Timestamp::parse("2024-01-01T00:00+00:00").unwrap());
    }

    #[test]
    fn send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Timestamp>();
        assert_send_sync::<Unit>();
    }

    quickcheck! {
        fn prop_components_roundtrip(ts: Timestamp) -> bool {
            let got = Timestamp::builder(ts.year(), ts.month(), ts.day())
                .hour(ts.hour())
                .minute(ts.minute())
                .second(ts.second())
                .microsecond(ts.microsecond())
                .nanosecond(ts.nanosecond())
                .build()
                .unwrap();
            got.datetime() == ts.datetime()
        }

        fn prop_epoch_roundtrip(ts: Timestamp) -> bool {
            let nanos = ts.as_nanosecond();
            let got = Timestamp::from_epoch(nanos, Unit::Nanosecond).unwrap();
            got.as_nanosecond() == nanos
        }

        fn prop_display_parses(ts: Timestamp) -> bool {
            let got: Timestamp = ts.to_string().parse().unwrap();
            got == ts
        }

        fn prop_queries_consistent(ts: Timestamp) -> bool {
            let week = ts.week_of_year();
            (1..=53).contains(&week)
                && (1..=ts.days_in_year()).contains(&ts.day_of_year())
                && (0..=6).contains(&ts.day_of_week())
                && ts.is_month_end() == (ts.day() == ts.days_in_month())
                && ts.quarter() == (ts.month() + 2) / 3
        }
    }
}
