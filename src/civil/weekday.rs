use crate::error::Error;

/// A representation for the day of the week.
///
/// The default representation follows ISO 8601. That is, the week starts
/// with Monday and numbering starts at `0` for [`Timestamp::day_of_week`].
/// Use the `to_*` and `from_*` routines to convert to and from other
/// numbering schemes.
///
/// [`Timestamp::day_of_week`]: crate::Timestamp::day_of_week
///
/// # Example
///
/// ```
/// use calstamp::civil::Weekday;
///
/// assert_eq!(Weekday::Wednesday.to_monday_zero_offset(), 2);
/// assert_eq!(Weekday::Wednesday.to_sunday_zero_offset(), 3);
/// assert_eq!(Weekday::from_monday_zero_offset(6)?, Weekday::Sunday);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[allow(missing_docs)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// Converts an offset from Monday (`0..=6`) to a weekday.
    ///
    /// # Errors
    ///
    /// This returns a range error when the offset is not in `0..=6`.
    pub fn from_monday_zero_offset(offset: i8) -> Result<Weekday, Error> {
        if !(0 <= offset && offset <= 6) {
            return Err(Error::range("weekday", offset, 0, 6));
        }
        Ok(Weekday::from_monday_zero_offset_unchecked(offset))
    }

    /// Converts an offset from Sunday (`0..=6`) to a weekday.
    ///
    /// This is the numbering used by POSIX time zone rules.
    ///
    /// # Errors
    ///
    /// This returns a range error when the offset is not in `0..=6`.
    pub fn from_sunday_zero_offset(offset: i8) -> Result<Weekday, Error> {
        if !(0 <= offset && offset <= 6) {
            return Err(Error::range("weekday", offset, 0, 6));
        }
        Ok(Weekday::from_monday_zero_offset_unchecked((offset + 6) % 7))
    }

    /// Returns this weekday as an offset from Monday, in `0..=6`.
    #[inline]
    pub fn to_monday_zero_offset(self) -> i8 {
        self as i8
    }

    /// Returns this weekday as a one-based offset from Monday, in `1..=7`.
    #[inline]
    pub fn to_monday_one_offset(self) -> i8 {
        self.to_monday_zero_offset() + 1
    }

    /// Returns this weekday as an offset from Sunday, in `0..=6`.
    #[inline]
    pub fn to_sunday_zero_offset(self) -> i8 {
        (self.to_monday_zero_offset() + 1) % 7
    }

    /// Returns the number of days from `self` forward to `other`, in
    /// `0..=6`.
    ///
    /// # Example
    ///
    /// ```
    /// use calstamp::civil::Weekday;
    ///
    /// assert_eq!(Weekday::Friday.days_until(Weekday::Monday), 3);
    /// assert_eq!(Weekday::Monday.days_until(Weekday::Monday), 0);
    /// ```
    #[inline]
    pub fn days_until(self, other: Weekday) -> i8 {
        (other.to_monday_zero_offset() - self.to_monday_zero_offset())
            .rem_euclid(7)
    }

    /// Converts an offset that is known to be in `0..=6`.
    pub(crate) fn from_monday_zero_offset_unchecked(offset: i8) -> Weekday {
        match offset {
            0 => Weekday::Monday,
            1 => Weekday::Tuesday,
            2 => Weekday::Wednesday,
            3 => Weekday::Thursday,
            4 => Weekday::Friday,
            5 => Weekday::Saturday,
            6 => Weekday::Sunday,
            _ => unreachable!("weekday offset {offset} is not in 0..=6"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_roundtrip() {
        for offset in 0..=6 {
            let wd = Weekday::from_monday_zero_offset(offset).unwrap();
            assert_eq!(wd.to_monday_zero_offset(), offset);
            let wd = Weekday::from_sunday_zero_offset(offset).unwrap();
            assert_eq!(wd.to_sunday_zero_offset(), offset);
        }
        assert_eq!(
            Weekday::from_sunday_zero_offset(0).unwrap(),
            Weekday::Sunday,
        );
        assert_eq!(Weekday::Sunday.to_monday_one_offset(), 7);
    }

    #[test]
    fn out_of_range() {
        assert!(Weekday::from_monday_zero_offset(7).unwrap_err().is_range());
        assert!(Weekday::from_sunday_zero_offset(-1).unwrap_err().is_range());
    }

    #[test]
    fn days_until() {
        assert_eq!(Weekday::Sunday.days_until(Weekday::Saturday), 6);
        assert_eq!(Weekday::Saturday.days_until(Weekday::Sunday), 1);
    }
}
