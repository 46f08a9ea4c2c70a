use crate::{error::Error, util::itime::IOffset};

/// An offset from UTC, with second precision.
///
/// Positive offsets are east of the prime meridian. For example, New York
/// observes `-05:00` during standard time and `-04:00` during daylight
/// saving time.
///
/// Offsets are limited to the range `-25:59:59..=+25:59:59`, which is the
/// range permitted by POSIX time zone strings and TZif data.
///
/// # Example
///
/// ```
/// use calstamp::tz::Offset;
///
/// let offset = Offset::from_seconds(-5 * 60 * 60)?;
/// assert_eq!(offset.to_string(), "-05:00");
/// assert_eq!(Offset::constant(9).to_string(), "+09:00");
/// assert_eq!(Offset::from_seconds(20_700)?.to_string(), "+05:45");
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Offset {
    seconds: i32,
}

impl Offset {
    /// The offset of UTC, `+00:00`.
    pub const UTC: Offset = Offset { seconds: 0 };

    /// The smallest possible offset, `-25:59:59`.
    pub const MIN: Offset = Offset { seconds: -93_599 };

    /// The largest possible offset, `+25:59:59`.
    pub const MAX: Offset = Offset { seconds: 93_599 };

    /// Creates an offset from a whole number of hours in a `const` context.
    ///
    /// # Panics
    ///
    /// This panics when `hours` is outside `-25..=25`.
    pub const fn constant(hours: i8) -> Offset {
        assert!(-25 <= hours && hours <= 25, "offset hours out of range");
        Offset { seconds: hours as i32 * 3600 }
    }

    /// Creates an offset from a number of seconds east of UTC.
    ///
    /// # Errors
    ///
    /// This returns a range error when `seconds` is outside
    /// `-93_599..=93_599`.
    pub fn from_seconds(seconds: i32) -> Result<Offset, Error> {
        if !(Offset::MIN.seconds <= seconds && seconds <= Offset::MAX.seconds)
        {
            return Err(Error::range(
                "offset-seconds",
                seconds,
                Offset::MIN.seconds,
                Offset::MAX.seconds,
            ));
        }
        Ok(Offset { seconds })
    }

    /// Creates an offset without checking its range.
    ///
    /// Callers must ensure `seconds` is in `-93_599..=93_599`. Offsets from
    /// POSIX time zones and TZif data are validated when parsed.
    #[inline]
    pub(crate) const fn from_seconds_unchecked(seconds: i32) -> Offset {
        debug_assert!(
            Offset::MIN.seconds <= seconds && seconds <= Offset::MAX.seconds
        );
        Offset { seconds }
    }

    /// Returns the number of seconds east of UTC for this offset.
    #[inline]
    pub fn seconds(self) -> i32 {
        self.seconds
    }

    /// Returns true if this offset is west of UTC.
    #[inline]
    pub fn is_negative(self) -> bool {
        self.seconds < 0
    }

    #[inline]
    pub(crate) const fn to_ioffset(self) -> IOffset {
        IOffset { second: self.seconds }
    }
}

impl Default for Offset {
    fn default() -> Offset {
        Offset::UTC
    }
}

impl core::fmt::Debug for Offset {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Display::fmt(self, f)
    }
}

/// Prints this offset as `±HH:MM`, or `±HH:MM:SS` when it has a non-zero
/// seconds component.
impl core::fmt::Display for Offset {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        crate::fmt::printer::DateTimePrinter::new().print_offset(self, f)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn bounds() {
        assert_eq!(Offset::from_seconds(93_599).unwrap(), Offset::MAX);
        assert_eq!(Offset::from_seconds(-93_599).unwrap(), Offset::MIN);
        assert!(Offset::from_seconds(93_600).unwrap_err().is_range());
        assert!(Offset::from_seconds(-93_600).unwrap_err().is_range());
    }

    #[test]
    fn display() {
        assert_eq!(Offset::UTC.to_string(), "+00:00");
        assert_eq!(Offset::constant(-8).to_string(), "-08:00");
        assert_eq!(Offset::from_seconds(-1).unwrap().to_string(), "-00:00:01");
        assert_eq!(Offset::MAX.to_string(), "+25:59:59");
        let offset = Offset::from_seconds(19_800).unwrap();
        assert_eq!(offset.to_string(), "+05:30");
    }
}
