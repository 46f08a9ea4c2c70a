use core::fmt::Write;

use crate::{
    civil::{Date, DateTime, Time},
    tz::Offset,
    Timestamp,
};

/// How the fractional second of a time is written.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Fraction {
    /// The fewest digits that represent the fraction exactly.
    Minimal,
    /// Six digits, or nine when there is sub-microsecond precision.
    Microsecond,
}

/// A printer for civil values, offsets and timestamps.
///
/// Every routine writes into a `core::fmt::Write` implementation, so the
/// `Display` impls in this crate hand it their `Formatter` directly and no
/// intermediate buffer is needed.
#[derive(Clone, Debug)]
pub(crate) struct DateTimePrinter {
    separator: u8,
    fraction: Fraction,
}

impl DateTimePrinter {
    pub(crate) const fn new() -> DateTimePrinter {
        DateTimePrinter { separator: b'T', fraction: Fraction::Minimal }
    }

    pub(crate) const fn separator(self, ascii_char: u8) -> DateTimePrinter {
        assert!(ascii_char.is_ascii(), "separator must be ASCII");
        DateTimePrinter { separator: ascii_char, ..self }
    }

    pub(crate) const fn fraction(self, fraction: Fraction) -> DateTimePrinter {
        DateTimePrinter { fraction, ..self }
    }

    /// Prints a timestamp as `YYYY-MM-DD HH:MM:SS[.ffffff][±HH:MM]`.
    ///
    /// When `annotate` is true and the timestamp's time zone has an IANA
    /// name, it is appended in brackets.
    pub(crate) fn print_timestamp<W: Write>(
        &self,
        ts: &Timestamp,
        annotate: bool,
        mut wtr: W,
    ) -> core::fmt::Result {
        self.print_datetime(&ts.datetime(), &mut wtr)?;
        let Some(offset) = ts.offset() else { return Ok(()) };
        self.print_offset(&offset, &mut wtr)?;
        if !annotate {
            return Ok(());
        }
        if let Some(name) = ts.time_zone().and_then(|tz| tz.iana_name()) {
            wtr.write_char('[')?;
            wtr.write_str(name)?;
            wtr.write_char(']')?;
        }
        Ok(())
    }

    pub(crate) fn print_datetime<W: Write>(
        &self,
        dt: &DateTime,
        mut wtr: W,
    ) -> core::fmt::Result {
        self.print_date(&dt.date(), &mut wtr)?;
        wtr.write_char(char::from(self.separator))?;
        self.print_time(&dt.time(), &mut wtr)
    }

    pub(crate) fn print_date<W: Write>(
        &self,
        date: &Date,
        mut wtr: W,
    ) -> core::fmt::Result {
        let year = date.year();
        if year >= 0 {
            write!(wtr, "{year:04}")?;
        } else {
            write!(wtr, "-{:06}", year.unsigned_abs())?;
        }
        write!(wtr, "-{:02}-{:02}", date.month(), date.day())
    }

    pub(crate) fn print_time<W: Write>(
        &self,
        time: &Time,
        mut wtr: W,
    ) -> core::fmt::Result {
        write!(
            wtr,
            "{:02}:{:02}:{:02}",
            time.hour(),
            time.minute(),
            time.second(),
        )?;
        let nanos = time.subsec_nanosecond();
        if nanos == 0 {
            return Ok(());
        }
        match self.fraction {
            Fraction::Minimal => {
                let mut digits = 9;
                let mut value = nanos;
                while value % 10 == 0 {
                    value /= 10;
                    digits -= 1;
                }
                write!(wtr, ".{value:0digits$}")
            }
            Fraction::Microsecond if nanos % 1_000 == 0 => {
                write!(wtr, ".{:06}", nanos / 1_000)
            }
            Fraction::Microsecond => write!(wtr, ".{nanos:09}"),
        }
    }

    pub(crate) fn print_offset<W: Write>(
        &self,
        offset: &Offset,
        mut wtr: W,
    ) -> core::fmt::Result {
        let sign = if offset.is_negative() { '-' } else { '+' };
        let seconds = offset.seconds().unsigned_abs();
        let (hours, minutes, seconds) =
            (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
        write!(wtr, "{sign}{hours:02}:{minutes:02}")?;
        if seconds != 0 {
            write!(wtr, ":{seconds:02}")?;
        }
        Ok(())
    }
}

impl Default for DateTimePrinter {
    fn default() -> DateTimePrinter {
        DateTimePrinter::new()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::*;

    fn time(printer: &DateTimePrinter, nanos: i32) -> String {
        let mut buf = String::new();
        printer.print_time(&Time::constant(1, 2, 3, nanos), &mut buf).unwrap();
        buf
    }

    #[test]
    fn fraction_minimal() {
        let p = DateTimePrinter::new();
        assert_eq!(time(&p, 0), "01:02:03");
        assert_eq!(time(&p, 500_000_000), "01:02:03.5");
        assert_eq!(time(&p, 120_000), "01:02:03.00012");
        assert_eq!(time(&p, 1), "01:02:03.000000001");
    }

    #[test]
    fn fraction_microsecond() {
        let p = DateTimePrinter::new().fraction(Fraction::Microsecond);
        assert_eq!(time(&p, 0), "01:02:03");
        assert_eq!(time(&p, 500_000_000), "01:02:03.500000");
        assert_eq!(time(&p, 123_456_000), "01:02:03.123456");
        assert_eq!(time(&p, 123_456_789), "01:02:03.123456789");
    }

    #[test]
    fn datetime_separator() {
        let p = DateTimePrinter::new().separator(b' ');
        let dt = DateTime::constant(-44, 3, 15, 12, 0, 0, 0);
        let mut buf = String::new();
        p.print_datetime(&dt, &mut buf).unwrap();
        assert_eq!(buf, "-000044-03-15 12:00:00");
    }
}
