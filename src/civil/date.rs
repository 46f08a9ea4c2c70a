use crate::{
    civil::{DateTime, ISOWeekDate, Time, Weekday},
    error::Error,
    fmt::printer::DateTimePrinter,
    util::itime::{self, IDate, IEpochDay},
};

/// A representation of a civil date in the proleptic Gregorian calendar.
///
/// A `Date` value corresponds to a triple of year, month and day. Every
/// `Date` value is guaranteed to be a valid Gregorian calendar date. For
/// example, both `2023-02-29` and `2023-11-31` are invalid and cannot be
/// represented by a `Date`.
///
/// Years range from `-9999` to `9999`. Year `0` exists and corresponds to
/// `1 BCE`.
///
/// # Comparisons
///
/// When a date `d1` occurs before a date `d2`, then `d1 < d2`:
///
/// ```
/// use calstamp::civil::Date;
///
/// let d1 = Date::constant(2024, 3, 11);
/// let d2 = Date::constant(2025, 1, 31);
/// assert!(d1 < d2);
/// ```
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Date {
    year: i16,
    month: i8,
    day: i8,
}

impl Date {
    /// The minimum representable Gregorian date.
    pub const MIN: Date = Date::constant(-9999, 1, 1);

    /// The maximum representable Gregorian date.
    pub const MAX: Date = Date::constant(9999, 12, 31);

    /// Creates a new `Date` value from its component year, month and day
    /// values.
    ///
    /// # Errors
    ///
    /// This returns a range error when the given year, month and day do not
    /// form a valid date. Specifically:
    ///
    /// * `year` must be in the range `-9999..=9999`.
    /// * `month` must be in the range `1..=12`.
    /// * `day` must be at least `1` and at most the number of days in the
    /// given month. This accounts for leap years.
    ///
    /// # Example
    ///
    /// ```
    /// use calstamp::civil::Date;
    ///
    /// let d = Date::new(2024, 2, 29)?;
    /// assert_eq!(d.to_string(), "2024-02-29");
    ///
    /// assert!(Date::new(2023, 2, 29).unwrap_err().is_range());
    /// assert!(Date::new(2023, 13, 1).unwrap_err().is_range());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(year: i16, month: i8, day: i8) -> Result<Date, Error> {
        if !(itime::YEAR_MIN <= year && year <= itime::YEAR_MAX) {
            return Err(Error::range(
                "year",
                year,
                itime::YEAR_MIN,
                itime::YEAR_MAX,
            ));
        }
        if !(1 <= month && month <= 12) {
            return Err(Error::range("month", month, 1, 12));
        }
        let max_day = itime::days_in_month(year, month);
        if !(1 <= day && day <= max_day) {
            return Err(Error::range("day", day, 1, max_day));
        }
        Ok(Date { year, month, day })
    }

    /// Creates a new `Date` value in a `const` context.
    ///
    /// # Panics
    ///
    /// This panics when the given values do not form a valid date. See
    /// [`Date::new`] for the rules.
    ///
    /// # Example
    ///
    /// ```
    /// use calstamp::civil::Date;
    ///
    /// const LEAP: calstamp::civil::Date = Date::constant(2000, 2, 29);
    /// assert_eq!(LEAP.day(), 29);
    /// ```
    pub const fn constant(year: i16, month: i8, day: i8) -> Date {
        assert!(
            itime::YEAR_MIN <= year && year <= itime::YEAR_MAX,
            "invalid year",
        );
        assert!(1 <= month && month <= 12, "invalid month");
        assert!(
            1 <= day && day <= itime::days_in_month(year, month),
            "invalid day",
        );
        Date { year, month, day }
    }

    /// Returns the year for this date.
    #[inline]
    pub fn year(self) -> i16 {
        self.year
    }

    /// Returns the month for this date, in the range `1..=12`.
    #[inline]
    pub fn month(self) -> i8 {
        self.month
    }

    /// Returns the day for this date, starting at `1`.
    #[inline]
    pub fn day(self) -> i8 {
        self.day
    }

    /// Returns the weekday corresponding to this date.
    ///
    /// # Example
    ///
    /// ```
    /// use calstamp::civil::{Date, Weekday};
    ///
    /// // The Unix epoch was on a Thursday.
    /// let d = Date::constant(1970, 1, 1);
    /// assert_eq!(d.weekday(), Weekday::Thursday);
    /// ```
    #[inline]
    pub fn weekday(self) -> Weekday {
        Weekday::from_monday_zero_offset_unchecked(
            self.to_idate().weekday_monday_zero(),
        )
    }

    /// Returns the ordinal day of the year that this date resides in, where
    /// January 1 is day `1`.
    #[inline]
    pub fn day_of_year(self) -> i16 {
        self.to_idate().day_of_year()
    }

    /// Returns the number of days in the month of this date: `28` or `29`
    /// for February, and `30` or `31` otherwise.
    #[inline]
    pub fn days_in_month(self) -> i8 {
        itime::days_in_month(self.year, self.month)
    }

    /// Returns the number of days in the year of this date: `365` or `366`.
    #[inline]
    pub fn days_in_year(self) -> i16 {
        itime::days_in_year(self.year)
    }

    /// Returns true if and only if the year in this date is a leap year.
    ///
    /// A year is a leap year when it is divisible by `4`, unless it is also
    /// divisible by `100` but not by `400`.
    ///
    /// # Example
    ///
    /// ```
    /// use calstamp::civil::Date;
    ///
    /// assert!(Date::constant(2000, 1, 1).in_leap_year());
    /// assert!(!Date::constant(1900, 1, 1).in_leap_year());
    /// assert!(Date::constant(2004, 1, 1).in_leap_year());
    /// ```
    #[inline]
    pub fn in_leap_year(self) -> bool {
        itime::is_leap_year(self.year)
    }

    /// Returns the ISO 8601 week date for this date.
    ///
    /// Near the beginning and end of a year, the ISO year may differ from
    /// the Gregorian year of this date.
    ///
    /// # Example
    ///
    /// ```
    /// use calstamp::civil::{Date, Weekday};
    ///
    /// // January 1, 2021 was a Friday, so it is in the last ISO week of
    /// // 2020.
    /// let wd = Date::constant(2021, 1, 1).iso_week_date();
    /// assert_eq!(wd.year(), 2020);
    /// assert_eq!(wd.week(), 53);
    /// assert_eq!(wd.weekday(), Weekday::Friday);
    /// ```
    #[inline]
    pub fn iso_week_date(self) -> ISOWeekDate {
        let (year, week, weekday) = self.to_idate().to_iso_week_date();
        ISOWeekDate::new_unchecked(
            year,
            week,
            Weekday::from_monday_zero_offset_unchecked(weekday),
        )
    }

    /// Combines this date with the time given to produce a civil datetime.
    #[inline]
    pub const fn to_datetime(self, time: Time) -> DateTime {
        DateTime::from_parts(self, time)
    }

    /// Returns the date corresponding to the given number of days since
    /// `1970-01-01`, or `None` if it is outside the supported range.
    pub(crate) fn from_epoch_day(epoch_day: i32) -> Option<Date> {
        let min = IDate::MIN.to_epoch_day().epoch_day;
        let max = IDate::MAX.to_epoch_day().epoch_day;
        if !(min <= epoch_day && epoch_day <= max) {
            return None;
        }
        Some(Date::from_idate(IEpochDay { epoch_day }.to_date()))
    }

    #[inline]
    pub(crate) const fn to_idate(self) -> IDate {
        IDate { year: self.year, month: self.month, day: self.day }
    }

    /// Wraps an internal date, which must be in the supported range.
    #[inline]
    pub(crate) const fn from_idate(idate: IDate) -> Date {
        Date { year: idate.year, month: idate.month, day: idate.day }
    }
}

/// The default date is the Unix epoch, `1970-01-01`.
impl Default for Date {
    fn default() -> Date {
        Date::constant(1970, 1, 1)
    }
}

impl core::fmt::Debug for Date {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Display::fmt(self, f)
    }
}

/// Prints this date as `YYYY-MM-DD`, using a signed six digit year when the
/// year is negative.
impl core::fmt::Display for Date {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        DateTimePrinter::new().print_date(self, f)
    }
}
