/*!
Facilities for dealing with inexact dates and times.

These types describe "wall clock" values in the proleptic Gregorian
calendar. On their own they carry no time zone, and thus do not identify a
precise instant. A [`Timestamp`](crate::Timestamp) pairs a civil
[`DateTime`] with an optional time zone.

All calendar math in this crate (weekdays, ordinal days, ISO 8601 weeks,
leap years) is computed from these types.
*/

pub use self::{
    date::Date, datetime::DateTime, iso_week_date::ISOWeekDate, time::Time,
    weekday::Weekday,
};

mod date;
mod datetime;
mod iso_week_date;
mod time;
mod weekday;
