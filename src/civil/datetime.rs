use crate::{
    civil::{Date, Time},
    error::Error,
    fmt::printer::DateTimePrinter,
    util::itime::IDateTime,
};

/// A representation of a civil datetime in the Gregorian calendar.
///
/// A `DateTime` value corresponds to a pair of a [`Date`] and a [`Time`].
/// It has no time zone attached, so on its own it does not identify a unique
/// instant in time.
///
/// # Example
///
/// ```
/// use calstamp::civil::DateTime;
///
/// let dt = DateTime::new(2024, 6, 19, 15, 22, 45, 0)?;
/// assert_eq!(dt.to_string(), "2024-06-19T15:22:45");
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Default, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct DateTime {
    date: Date,
    time: Time,
}

impl DateTime {
    /// Creates a new `DateTime` value from its components.
    ///
    /// # Errors
    ///
    /// This returns a range error under the same conditions as [`Date::new`]
    /// and [`Time::new`].
    pub fn new(
        year: i16,
        month: i8,
        day: i8,
        hour: i8,
        minute: i8,
        second: i8,
        subsec_nanosecond: i32,
    ) -> Result<DateTime, Error> {
        let date = Date::new(year, month, day)?;
        let time = Time::new(hour, minute, second, subsec_nanosecond)?;
        Ok(DateTime { date, time })
    }

    /// Creates a new `DateTime` in a `const` context.
    ///
    /// # Panics
    ///
    /// This panics when any component is out of range.
    pub const fn constant(
        year: i16,
        month: i8,
        day: i8,
        hour: i8,
        minute: i8,
        second: i8,
        subsec_nanosecond: i32,
    ) -> DateTime {
        let date = Date::constant(year, month, day);
        let time = Time::constant(hour, minute, second, subsec_nanosecond);
        DateTime { date, time }
    }

    /// Creates a `DateTime` from its date and time parts.
    #[inline]
    pub const fn from_parts(date: Date, time: Time) -> DateTime {
        DateTime { date, time }
    }

    #[inline]
    pub fn date(self) -> Date {
        self.date
    }

    #[inline]
    pub fn time(self) -> Time {
        self.time
    }

    #[inline]
    pub(crate) fn to_idatetime(self) -> IDateTime {
        IDateTime { date: self.date.to_idate(), time: self.time.to_itime() }
    }

    /// Wraps an internal datetime, returning `None` if its year is outside
    /// the supported range.
    #[inline]
    pub(crate) fn from_idatetime(idt: IDateTime) -> Option<DateTime> {
        let year = idt.date.year;
        if !(Date::MIN.year() <= year && year <= Date::MAX.year()) {
            return None;
        }
        Some(DateTime {
            date: Date::from_idate(idt.date),
            time: Time::from_itime(idt.time),
        })
    }
}

impl core::fmt::Debug for DateTime {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Display::fmt(self, f)
    }
}

/// Prints this datetime as `YYYY-MM-DDTHH:MM:SS[.fffffffff]`.
impl core::fmt::Display for DateTime {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        DateTimePrinter::new().print_datetime(self, f)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use crate::util::itime::{IDate, ITime};

    use super::*;

    #[test]
    fn roundtrip_components() {
        let dt = DateTime::new(2021, 1, 1, 12, 30, 15, 250).unwrap();
        assert_eq!(dt.date(), Date::constant(2021, 1, 1));
        assert_eq!(dt.time(), Time::constant(12, 30, 15, 250));
        assert_eq!(DateTime::from_idatetime(dt.to_idatetime()), Some(dt));
    }

    #[test]
    fn from_idatetime_rejects_unsupported_years() {
        let idt = IDateTime {
            date: IDate { year: 10000, month: 1, day: 1 },
            time: ITime::ZERO,
        };
        assert_eq!(DateTime::from_idatetime(idt), None);
    }

    #[test]
    fn display() {
        let dt = DateTime::constant(1998, 3, 5, 9, 8, 20, 500_000_000);
        assert_eq!(dt.to_string(), "1998-03-05T09:08:20.5");
        assert_eq!(DateTime::default().to_string(), "1970-01-01T00:00:00");
    }
}
