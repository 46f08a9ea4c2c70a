use crate::{
    error::Error, fmt::printer::DateTimePrinter, util::itime::ITime,
};

/// A representation of civil "wall clock" time.
///
/// A `Time` is made up of an hour (`0..=23`), minute (`0..=59`), second
/// (`0..=59`) and a fractional second with nanosecond precision. Leap seconds
/// are not representable; the parser clamps a second value of `60` to `59`.
///
/// # Example
///
/// ```
/// use calstamp::civil::Time;
///
/// let t = Time::new(15, 30, 0, 123_456_000)?;
/// assert_eq!(t.microsecond(), 456);
/// assert_eq!(t.to_string(), "15:30:00.123456");
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Time {
    hour: i8,
    minute: i8,
    second: i8,
    subsec_nanosecond: i32,
}

impl Time {
    /// The first moment of a day, `00:00:00`.
    pub const MIN: Time = Time::constant(0, 0, 0, 0);

    /// The last representable moment of a day, `23:59:59.999999999`.
    pub const MAX: Time = Time::constant(23, 59, 59, 999_999_999);

    /// Creates a new `Time` from its components.
    ///
    /// # Errors
    ///
    /// This returns a range error when `hour` is outside `0..=23`, `minute`
    /// or `second` are outside `0..=59`, or `subsec_nanosecond` is outside
    /// `0..=999_999_999`.
    pub fn new(
        hour: i8,
        minute: i8,
        second: i8,
        subsec_nanosecond: i32,
    ) -> Result<Time, Error> {
        if !(0 <= hour && hour <= 23) {
            return Err(Error::range("hour", hour, 0, 23));
        }
        if !(0 <= minute && minute <= 59) {
            return Err(Error::range("minute", minute, 0, 59));
        }
        if !(0 <= second && second <= 59) {
            return Err(Error::range("second", second, 0, 59));
        }
        if !(0 <= subsec_nanosecond && subsec_nanosecond <= 999_999_999) {
            return Err(Error::range(
                "subsec_nanosecond",
                subsec_nanosecond,
                0,
                999_999_999,
            ));
        }
        Ok(Time { hour, minute, second, subsec_nanosecond })
    }

    /// Creates a new `Time` in a `const` context.
    ///
    /// # Panics
    ///
    /// This panics when any component is out of range. See [`Time::new`].
    pub const fn constant(
        hour: i8,
        minute: i8,
        second: i8,
        subsec_nanosecond: i32,
    ) -> Time {
        assert!(0 <= hour && hour <= 23, "invalid hour");
        assert!(0 <= minute && minute <= 59, "invalid minute");
        assert!(0 <= second && second <= 59, "invalid second");
        assert!(
            0 <= subsec_nanosecond && subsec_nanosecond <= 999_999_999,
            "invalid fractional second",
        );
        Time { hour, minute, second, subsec_nanosecond }
    }

    #[inline]
    pub fn hour(self) -> i8 {
        self.hour
    }

    #[inline]
    pub fn minute(self) -> i8 {
        self.minute
    }

    #[inline]
    pub fn second(self) -> i8 {
        self.second
    }

    /// Returns the millisecond component, in `0..=999`.
    #[inline]
    pub fn millisecond(self) -> i16 {
        (self.subsec_nanosecond / 1_000_000) as i16
    }

    /// Returns the microsecond component *within* the current millisecond,
    /// in `0..=999`.
    #[inline]
    pub fn microsecond(self) -> i16 {
        ((self.subsec_nanosecond / 1_000) % 1_000) as i16
    }

    /// Returns the nanosecond component *within* the current microsecond,
    /// in `0..=999`.
    #[inline]
    pub fn nanosecond(self) -> i16 {
        (self.subsec_nanosecond % 1_000) as i16
    }

    /// Returns the entire fractional second as a number of nanoseconds, in
    /// `0..=999_999_999`.
    ///
    /// # Example
    ///
    /// ```
    /// use calstamp::civil::Time;
    ///
    /// let t = Time::constant(0, 0, 0, 1_002_003);
    /// assert_eq!(t.millisecond(), 1);
    /// assert_eq!(t.microsecond(), 2);
    /// assert_eq!(t.nanosecond(), 3);
    /// assert_eq!(t.subsec_nanosecond(), 1_002_003);
    /// ```
    #[inline]
    pub fn subsec_nanosecond(self) -> i32 {
        self.subsec_nanosecond
    }

    #[inline]
    pub(crate) const fn to_itime(self) -> ITime {
        ITime {
            hour: self.hour,
            minute: self.minute,
            second: self.second,
            subsec_nanosecond: self.subsec_nanosecond,
        }
    }

    /// Wraps an internal time, which must already be valid.
    #[inline]
    pub(crate) const fn from_itime(itime: ITime) -> Time {
        Time {
            hour: itime.hour,
            minute: itime.minute,
            second: itime.second,
            subsec_nanosecond: itime.subsec_nanosecond,
        }
    }
}

impl Default for Time {
    fn default() -> Time {
        Time::MIN
    }
}

impl core::fmt::Debug for Time {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Display::fmt(self, f)
    }
}

/// Prints this time as `HH:MM:SS`, followed by the shortest fractional
/// second that represents it exactly (if it is non-zero).
impl core::fmt::Display for Time {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        DateTimePrinter::new().print_time(self, f)
    }
}
