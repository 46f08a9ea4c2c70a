use crate::{
    civil::{Date, Weekday},
    error::{civil::Error as E, Error},
    util::itime::{self, IDate},
};

/// A date in the ISO 8601 week date calendar.
///
/// An ISO week date is made up of an ISO year, a week number in `1..=53` and
/// a weekday. Weeks start on Monday, and week `1` of an ISO year is the week
/// containing that year's first Thursday. As a result, up to three days at
/// the start or end of a Gregorian year belong to an adjacent ISO year.
///
/// `-9999-01-01` is a Monday and `9999-12-31` is a Friday, so every
/// supported date has an ISO year in `-9999..=9999`.
///
/// # Example
///
/// ```
/// use calstamp::civil::{Date, ISOWeekDate, Weekday};
///
/// let wd = ISOWeekDate::new(2020, 53, Weekday::Friday)?;
/// assert_eq!(wd.date()?, Date::constant(2021, 1, 1));
/// assert_eq!(Date::constant(2021, 1, 1).iso_week_date(), wd);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ISOWeekDate {
    year: i16,
    week: i8,
    weekday: Weekday,
}

impl ISOWeekDate {
    /// Creates a new ISO week date.
    ///
    /// # Errors
    ///
    /// This returns a range error when `year` is outside `-9999..=9999` or
    /// `week` is outside `1..=53`. It also returns an error when `week` is
    /// `53` but the given ISO year only has 52 weeks.
    pub fn new(
        year: i16,
        week: i8,
        weekday: Weekday,
    ) -> Result<ISOWeekDate, Error> {
        if !(itime::YEAR_MIN <= year && year <= itime::YEAR_MAX) {
            return Err(Error::range(
                "year",
                year,
                itime::YEAR_MIN,
                itime::YEAR_MAX,
            ));
        }
        if !(1 <= week && week <= 53) {
            return Err(Error::range("week", week, 1, 53));
        }
        if week == 53 && weeks_in_year(year) == 52 {
            return Err(Error::range("week", week, 1, 52)
                .context(E::InvalidISOWeekNumber { year }));
        }
        Ok(ISOWeekDate { year, week, weekday })
    }

    pub(crate) fn new_unchecked(
        year: i16,
        week: i8,
        weekday: Weekday,
    ) -> ISOWeekDate {
        ISOWeekDate { year, week, weekday }
    }

    /// Returns the ISO year. This may differ from the Gregorian year of
    /// the corresponding date.
    #[inline]
    pub fn year(self) -> i16 {
        self.year
    }

    /// Returns the ISO week number, in `1..=53`.
    #[inline]
    pub fn week(self) -> i8 {
        self.week
    }

    #[inline]
    pub fn weekday(self) -> Weekday {
        self.weekday
    }

    /// Converts this ISO week date to a Gregorian date.
    ///
    /// # Errors
    ///
    /// This returns a range error if the resulting date is beyond
    /// `9999-12-31` (which can happen for the last days of ISO year `9999`).
    pub fn date(self) -> Result<Date, Error> {
        let jan4 = IDate { year: self.year, month: 1, day: 4 }.to_epoch_day();
        let week1 = jan4.epoch_day - i32::from(jan4.weekday_monday_zero());
        let epoch_day = week1
            + (i32::from(self.week) - 1) * 7
            + i32::from(self.weekday.to_monday_zero_offset());
        Date::from_epoch_day(epoch_day)
            .ok_or_else(|| Error::slim_range("ISO week date"))
    }
}

/// Returns the number of ISO weeks (52 or 53) in the given ISO year.
///
/// A year has 53 weeks when it starts on a Thursday, or when it is a leap
/// year starting on a Wednesday.
fn weeks_in_year(year: i16) -> i8 {
    let jan1 = IDate { year, month: 1, day: 1 }.weekday_monday_zero();
    if jan1 == 3 || (jan1 == 2 && itime::is_leap_year(year)) {
        53
    } else {
        52
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weeks_in_year_matches_dec28() {
        // December 28 is always in the last ISO week of its year.
        for year in 1900..=2100 {
            let last = Date::constant(year, 12, 28).iso_week_date().week();
            assert_eq!(weeks_in_year(year), last, "year {year}");
        }
    }

    #[test]
    fn week_53() {
        assert!(ISOWeekDate::new(2020, 53, Weekday::Monday).is_ok());
        let err = ISOWeekDate::new(2021, 53, Weekday::Monday).unwrap_err();
        assert!(err.is_range());
        assert!(ISOWeekDate::new(2021, 54, Weekday::Monday).is_err());
        assert!(ISOWeekDate::new(2021, 0, Weekday::Monday).is_err());
    }

    #[test]
    fn roundtrip_with_date() {
        for day in [
            Date::constant(2018, 12, 31),
            Date::constant(2020, 12, 31),
            Date::constant(2021, 1, 3),
            Date::constant(2024, 2, 29),
            Date::constant(-9998, 6, 1),
            Date::constant(-9999, 1, 1),
            Date::constant(9999, 12, 31),
        ] {
            assert_eq!(day.iso_week_date().date().unwrap(), day);
        }
    }

    #[test]
    fn date_out_of_range() {
        // 9999-12-31 is a Friday in week 52, so the weekend after it is
        // not representable.
        let wd = ISOWeekDate::new(9999, 52, Weekday::Sunday).unwrap();
        assert!(wd.date().unwrap_err().is_range());
    }
}
