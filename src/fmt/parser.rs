use crate::{
    civil::{Date, DateTime, Time},
    error::{
        fmt::Error as E, tz::offset::Error as OffsetError, Error,
        ErrorContext,
    },
    fmt::Parsed,
    tz::{Offset, TimeZone},
    util::{
        itime::{YEAR_MAX, YEAR_MIN},
        parse,
    },
    Timestamp,
};

/// The result of parsing an ISO 8601-like timestamp, before any time zone
/// annotation has been resolved.
#[derive(Debug)]
pub(crate) struct ParsedTimestamp<'i> {
    /// The original input, used for error messages.
    input: &'i [u8],
    datetime: DateTime,
    offset: Option<ParsedOffset>,
    annotation: Option<ParsedAnnotation<'i>>,
}

/// A parsed UTC offset, e.g., `Z` or `-05:00`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ParsedOffset {
    Zulu,
    Numeric(Offset),
}

/// The contents of a bracketed time zone annotation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ParsedAnnotation<'i> {
    /// A time zone identifier, e.g., `[America/New_York]`.
    Named(&'i str),
    /// A fixed offset, e.g., `[+05:30]`.
    Offset(Offset),
}

impl<'i> ParsedTimestamp<'i> {
    /// Builds a timestamp from what was parsed.
    ///
    /// `lookup` is called at most once, and only when the input carries a
    /// named time zone annotation.
    ///
    /// How the pieces combine:
    ///
    /// * No offset and no annotation: a naive timestamp.
    /// * An offset alone: a timestamp in that fixed offset (or UTC for `Z`).
    /// * An annotation alone: the civil datetime is local time in the
    /// annotated zone. Gaps are errors and folds pick the earlier instant.
    /// * `Z` and an annotation: the instant is projected into the zone.
    /// * A numeric offset and an annotation: the offset must match the
    /// zone's offset at that instant.
    pub(crate) fn to_timestamp(
        &self,
        lookup: impl FnOnce(&str) -> Result<TimeZone, Error>,
    ) -> Result<Timestamp, Error> {
        self.to_timestamp_impl(lookup)
            .with_context(|| E::unparseable_timestamp(self.input))
    }

    fn to_timestamp_impl(
        &self,
        lookup: impl FnOnce(&str) -> Result<TimeZone, Error>,
    ) -> Result<Timestamp, Error> {
        let tz = match self.annotation {
            None => None,
            Some(ParsedAnnotation::Offset(offset)) => {
                Some(TimeZone::fixed(offset))
            }
            Some(ParsedAnnotation::Named(name)) => {
                Some(lookup(name).context(E::FailedTzdbLookup)?)
            }
        };
        let dt = self.datetime;
        let Some(offset) = self.offset else {
            return match tz {
                None => Ok(Timestamp::naive(dt)),
                Some(tz) => Timestamp::from_local_in(dt, tz),
            };
        };
        let (given, tz) = match (offset, tz) {
            (ParsedOffset::Zulu, None) => {
                return Timestamp::from_local_in(dt, TimeZone::UTC);
            }
            (ParsedOffset::Numeric(offset), None) => {
                return Timestamp::from_local_in(dt, TimeZone::fixed(offset));
            }
            (ParsedOffset::Zulu, Some(tz)) => (Offset::UTC, tz),
            (ParsedOffset::Numeric(offset), Some(tz)) => (offset, tz),
        };
        let instant = dt.to_idatetime().to_timestamp(given.to_ioffset());
        if offset != ParsedOffset::Zulu {
            let actual = tz.to_offset(instant.second);
            if given != actual {
                return Err(Error::from(OffsetError::Mismatch {
                    given,
                    actual,
                })
                .context(E::OffsetConflict));
            }
        }
        Timestamp::from_instant_in(instant, tz)
    }
}

/// A parser for ISO 8601-like timestamps.
///
/// Both the extended format (`2024-03-10T02:30:00`) and the basic format
/// (`20240310T023000`) are accepted. The date and the time choose their
/// format independently.
#[derive(Debug)]
pub(crate) struct DateTimeParser {
    _priv: (),
}

impl DateTimeParser {
    pub(crate) const fn new() -> DateTimeParser {
        DateTimeParser { _priv: () }
    }

    /// Parses the entire input as a timestamp.
    pub(crate) fn parse_timestamp<'i>(
        &self,
        input: &'i [u8],
    ) -> Result<ParsedTimestamp<'i>, Error> {
        self.parse_timestamp_impl(input)
            .with_context(|| E::unparseable_timestamp(input))
    }

    // timestamp ::= date [time-separator time [offset]] [annotation]
    // time-separator ::= T | t | <space>
    fn parse_timestamp_impl<'i>(
        &self,
        input: &'i [u8],
    ) -> Result<ParsedTimestamp<'i>, Error> {
        if input.is_empty() {
            return Err(E::EmptyInput.into());
        }
        let original = input;

        let Parsed { value: date, input } = self.parse_date(input)?;
        let (time, offset, input) = match input.split_first() {
            Some((&(b'T' | b't' | b' '), rest)) => {
                let Parsed { value: time, input } = self.parse_time(rest)?;
                let Parsed { value: offset, input } =
                    self.parse_offset(input)?;
                (time, offset, input)
            }
            _ => (Time::MIN, None, input),
        };
        let Parsed { value: annotation, input } =
            self.parse_annotation(input)?;
        let value = ParsedTimestamp {
            input: original,
            datetime: DateTime::from_parts(date, time),
            offset,
            annotation,
        };
        Parsed { value, input }.into_full()
    }

    // date ::= year [-] month [-] day
    //
    // Either both separators are present or neither is.
    fn parse_date<'i>(
        &self,
        input: &'i [u8],
    ) -> Result<Parsed<'i, Date>, Error> {
        let Parsed { value: year, input } = self.parse_year(input)?;
        let (extended, input) = match input.split_first() {
            Some((&b'-', rest)) => (true, rest),
            _ => (false, input),
        };
        let Parsed { value: month, input } = self.parse_month(input)?;
        let Parsed { input, .. } =
            self.parse_date_separator(input, extended)?;
        let Parsed { value: day, input } = self.parse_day(input)?;
        let date = Date::new(year, month, day).context(E::InvalidDate)?;
        Ok(Parsed { value: date, input })
    }

    // year ::= [0-9]{4} | sign [0-9]{6}
    fn parse_year<'i>(
        &self,
        input: &'i [u8],
    ) -> Result<Parsed<'i, i16>, Error> {
        let (sign, input) = match input.split_first() {
            Some((&b'+', rest)) => (Some(1), rest),
            Some((&b'-', rest)) => (Some(-1), rest),
            _ => (None, input),
        };
        let (year, input) = match sign {
            None => {
                let (digits, input) =
                    parse::split(input, 4).ok_or(E::ExpectedFourDigitYear)?;
                (parse::i64(digits).context(E::ParseYear)?, input)
            }
            Some(sign) => {
                let (digits, input) =
                    parse::split(input, 6).ok_or(E::ExpectedSixDigitYear)?;
                let year = parse::i64(digits).context(E::ParseYear)?;
                if sign < 0 && year == 0 {
                    return Err(E::InvalidYearZero.into());
                }
                (sign * year, input)
            }
        };
        let (min, max) = (i64::from(YEAR_MIN), i64::from(YEAR_MAX));
        if !(min <= year && year <= max) {
            return Err(
                Error::range("year", year, min, max).context(E::InvalidDate)
            );
        }
        // OK because of the range check above.
        Ok(Parsed { value: year as i16, input })
    }

    // month ::= [0-9]{2}
    fn parse_month<'i>(
        &self,
        input: &'i [u8],
    ) -> Result<Parsed<'i, i8>, Error> {
        let (digits, input) =
            parse::split(input, 2).ok_or(E::ExpectedTwoDigitMonth)?;
        let month = parse::i64(digits).context(E::ParseMonth)?;
        // Two digits always fit.
        Ok(Parsed { value: month as i8, input })
    }

    // day ::= [0-9]{2}
    fn parse_day<'i>(&self, input: &'i [u8]) -> Result<Parsed<'i, i8>, Error> {
        let (digits, input) =
            parse::split(input, 2).ok_or(E::ExpectedTwoDigitDay)?;
        let day = parse::i64(digits).context(E::ParseDay)?;
        Ok(Parsed { value: day as i8, input })
    }

    /// Parses the separator between month and day. In basic format, this
    /// consumes nothing but rejects a stray `-`.
    fn parse_date_separator<'i>(
        &self,
        input: &'i [u8],
        extended: bool,
    ) -> Result<Parsed<'i, ()>, Error> {
        if !extended {
            if input.first() == Some(&b'-') {
                return Err(E::ExpectedNoSeparator.into());
            }
            return Ok(Parsed { value: (), input });
        }
        match input.split_first() {
            None => Err(E::ExpectedDateSeparatorFoundEndOfInput.into()),
            Some((&b'-', input)) => Ok(Parsed { value: (), input }),
            Some((&byte, _)) => {
                Err(E::ExpectedDateSeparatorFoundByte { byte }.into())
            }
        }
    }

    // time ::= hour [[:] minute [[:] second [fraction]]]
    // fraction ::= (. | ,) [0-9]{1,9}
    //
    // A leap second, `60`, is clamped to `59`.
    fn parse_time<'i>(
        &self,
        input: &'i [u8],
    ) -> Result<Parsed<'i, Time>, Error> {
        let (digits, input) =
            parse::split(input, 2).ok_or(E::ExpectedTwoDigitHour)?;
        let hour = parse::i64(digits).context(E::ParseHour)?;

        let extended = input.first() == Some(&b':');
        let (mut minute, mut second, mut subsec) = (0, 0, 0);
        let Parsed { value: has_minute, mut input } =
            self.parse_time_separator(input, extended);
        if has_minute {
            let (digits, rest) =
                parse::split(input, 2).ok_or(E::ExpectedTwoDigitMinute)?;
            minute = parse::i64(digits).context(E::ParseMinute)?;
            input = rest;

            let Parsed { value: has_second, input: rest } =
                self.parse_time_separator(input, extended);
            input = rest;
            if has_second {
                let (digits, rest) = parse::split(input, 2)
                    .ok_or(E::ExpectedTwoDigitSecond)?;
                second = parse::i64(digits).context(E::ParseSecond)?;
                if second == 60 {
                    second = 59;
                }
                input = rest;

                if let Some((&(b'.' | b','), rest)) = input.split_first() {
                    let (digits, rest) = parse::digits(rest);
                    if digits.is_empty() {
                        return Err(E::ExpectedFractionDigits.into());
                    }
                    subsec =
                        parse::fraction(digits).context(E::ParseFraction)?;
                    input = rest;
                }
            }
        }
        // Every component is at most two digits, so these casts are OK.
        let time =
            Time::new(hour as i8, minute as i8, second as i8, subsec)
                .context(E::InvalidTime)?;
        Ok(Parsed { value: time, input })
    }

    /// Reports whether another time component follows. In extended format,
    /// this consumes the `:` before it.
    fn parse_time_separator<'i>(
        &self,
        input: &'i [u8],
        extended: bool,
    ) -> Parsed<'i, bool> {
        if !extended {
            let value = input.first().map_or(false, |b| b.is_ascii_digit());
            return Parsed { value, input };
        }
        match input.split_first() {
            Some((&b':', rest)) => Parsed { value: true, input: rest },
            _ => Parsed { value: false, input },
        }
    }

    // offset ::= Z | z | sign hour [[:] minute [[:] second]]
    fn parse_offset<'i>(
        &self,
        input: &'i [u8],
    ) -> Result<Parsed<'i, Option<ParsedOffset>>, Error> {
        let (sign, rest) = match input.split_first() {
            Some((&(b'Z' | b'z'), rest)) => {
                let value = Some(ParsedOffset::Zulu);
                return Ok(Parsed { value, input: rest });
            }
            Some((&b'+', rest)) => (1, rest),
            Some((&b'-', rest)) => (-1, rest),
            _ => return Ok(Parsed { value: None, input }),
        };
        let Parsed { value: offset, input } =
            self.parse_numeric_offset(sign, rest)?;
        Ok(Parsed { value: Some(ParsedOffset::Numeric(offset)), input })
    }

    /// Parses the part of a numeric offset that follows its sign.
    fn parse_numeric_offset<'i>(
        &self,
        sign: i32,
        input: &'i [u8],
    ) -> Result<Parsed<'i, Offset>, Error> {
        let (digits, input) =
            parse::split(input, 2).ok_or(E::ExpectedTwoDigitOffsetHour)?;
        let hours =
            parse::i64(digits).context(E::ExpectedTwoDigitOffsetHour)?;

        let extended = input.first() == Some(&b':');
        let (mut minutes, mut seconds) = (0, 0);
        let Parsed { value: has_minute, mut input } =
            self.parse_time_separator(input, extended);
        if has_minute {
            let (digits, rest) = parse::split(input, 2)
                .ok_or(E::ExpectedTwoDigitOffsetMinute)?;
            minutes = parse::i64(digits)
                .context(E::ExpectedTwoDigitOffsetMinute)?;
            input = rest;

            let Parsed { value: has_second, input: rest } =
                self.parse_time_separator(input, extended);
            input = rest;
            if has_second {
                let (digits, rest) = parse::split(input, 2)
                    .ok_or(E::ExpectedTwoDigitOffsetSecond)?;
                seconds = parse::i64(digits)
                    .context(E::ExpectedTwoDigitOffsetSecond)?;
                input = rest;
            }
        }
        if minutes > 59 {
            let err = Error::range("offset minute", minutes, 0, 59);
            return Err(err.context(E::InvalidOffset));
        }
        if seconds > 59 {
            let err = Error::range("offset second", seconds, 0, 59);
            return Err(err.context(E::InvalidOffset));
        }
        // At most 99:59:59, which fits.
        let total = (hours * 3600 + minutes * 60 + seconds) as i32;
        let offset =
            Offset::from_seconds(sign * total).context(E::InvalidOffset)?;
        Ok(Parsed { value: offset, input })
    }

    // annotation ::= "[" ["!"] (time-zone-name | sign offset) "]"
    //
    // The critical flag, `!`, is accepted and ignored. Every annotation
    // is treated as critical.
    fn parse_annotation<'i>(
        &self,
        input: &'i [u8],
    ) -> Result<Parsed<'i, Option<ParsedAnnotation<'i>>>, Error> {
        let Some(rest) = input.strip_prefix(b"[") else {
            return Ok(Parsed { value: None, input });
        };
        let rest = rest.strip_prefix(b"!").unwrap_or(rest);
        let Some(end) = rest.iter().position(|&b| b == b']') else {
            return Err(E::ExpectedAnnotationClose.into());
        };
        let (name, input) = (&rest[..end], &rest[end + 1..]);
        let annotation = match name.split_first() {
            None => return Err(E::EmptyAnnotation.into()),
            Some((&b'+', offset)) => ParsedAnnotation::Offset(
                self.parse_numeric_offset(1, offset)?.into_full()?,
            ),
            Some((&b'-', offset)) => ParsedAnnotation::Offset(
                self.parse_numeric_offset(-1, offset)?.into_full()?,
            ),
            Some(_) => {
                let name = core::str::from_utf8(name)
                    .map_err(|_| E::InvalidAnnotationUtf8)?;
                ParsedAnnotation::Named(name)
            }
        };
        Ok(Parsed { value: Some(annotation), input })
    }
}

#[cfg(test)]
mod tests {
    use alloc::{collections::BTreeMap, string::String, string::ToString};

    use crate::tz::TimeZoneDatabase;

    use super::*;

    fn parse(input: &str) -> ParsedTimestamp<'_> {
        DateTimeParser::new().parse_timestamp(input.as_bytes()).unwrap()
    }

    fn parse_err(input: &str) -> Error {
        DateTimeParser::new().parse_timestamp(input.as_bytes()).unwrap_err()
    }

    fn eastern() -> BTreeMap<String, TimeZone> {
        let mut db = BTreeMap::new();
        let tz = TimeZone::posix("EST5EDT,M3.2.0,M11.1.0").unwrap();
        db.insert("America/New_York".to_string(), tz);
        db
    }

    fn resolve(input: &str) -> Result<Timestamp, Error> {
        let db = eastern();
        parse(input).to_timestamp(|name| TimeZoneDatabase::get(&db, name))
    }

    #[test]
    fn date_only() {
        let p = parse("2021-01-01");
        assert_eq!(p.datetime, DateTime::constant(2021, 1, 1, 0, 0, 0, 0));
        assert_eq!(p.offset, None);
        assert_eq!(p.annotation, None);

        let p = parse("20210101");
        assert_eq!(p.datetime, DateTime::constant(2021, 1, 1, 0, 0, 0, 0));
    }

    #[test]
    fn partial_times() {
        let cases = [
            ("2021-01-01T12", (12, 0, 0, 0)),
            ("2021-01-01t12:34", (12, 34, 0, 0)),
            ("2021-01-01 12:34:56", (12, 34, 56, 0)),
            ("2021-01-01T12:34:56.5", (12, 34, 56, 500_000_000)),
            ("2021-01-01T12:34:56,000001", (12, 34, 56, 1_000)),
            ("2021-01-01T123456.123456789", (12, 34, 56, 123_456_789)),
            ("20210101T1234", (12, 34, 0, 0)),
            ("2021-01-01T23:59:60", (23, 59, 59, 0)),
        ];
        for (input, (h, m, s, ns)) in cases {
            let want = DateTime::constant(2021, 1, 1, h, m, s, ns);
            assert_eq!(parse(input).datetime, want, "input: {input:?}");
        }
    }

    #[test]
    fn extended_years() {
        let p = parse("+002021-06-15");
        assert_eq!(p.datetime.date(), Date::constant(2021, 6, 15));
        let p = parse("-000044-03-15T12:00");
        assert_eq!(p.datetime.date(), Date::constant(-44, 3, 15));
        let p = parse("+000000-01-01");
        assert_eq!(p.datetime.date(), Date::constant(0, 1, 1));
    }

    #[test]
    fn offsets_and_annotations() {
        let p = parse("2021-01-01T12:00Z");
        assert_eq!(p.offset, Some(ParsedOffset::Zulu));

        let p = parse("2021-01-01T12:00-05:00");
        let want = ParsedOffset::Numeric(Offset::constant(-5));
        assert_eq!(p.offset, Some(want));

        let p = parse("2021-01-01T12:00+0530");
        let want = Offset::from_seconds(5 * 3600 + 30 * 60).unwrap();
        assert_eq!(p.offset, Some(ParsedOffset::Numeric(want)));

        let p = parse("2021-01-01T12:00[America/New_York]");
        assert_eq!(p.offset, None);
        let want = ParsedAnnotation::Named("America/New_York");
        assert_eq!(p.annotation, Some(want));

        let p = parse("2021-01-01T12:00-05:00[!America/New_York]");
        assert_eq!(p.annotation, Some(want));

        let p = parse("2021-01-01[+09:00]");
        let want = ParsedAnnotation::Offset(Offset::constant(9));
        assert_eq!(p.annotation, Some(want));
    }

    #[test]
    fn syntax_errors() {
        let inputs = [
            "",
            "2021",
            "21-01-01",
            "2021-1-1",
            "2021-0101",
            "202101-01",
            "2021-01-01T",
            "2021-01-01T1",
            "2021-01-01T12:3",
            "2021-01-01T12:30:00.",
            "2021-01-01T12:30:00.1234567890",
            "2021-01-01T12:30+5",
            "2021-01-01X12",
            "2021-01-01T12:30[",
            "2021-01-01T12:30[]",
            "2021-01-01T12:30[+05:00x]",
            "2021-01-01T12:30Z ",
            "-000000-01-01",
        ];
        for input in inputs {
            let err = parse_err(input);
            assert!(err.is_parse(), "input: {input:?}, error: {err}");
            assert!(!err.is_range(), "input: {input:?}, error: {err}");
        }
    }

    #[test]
    fn range_errors() {
        let inputs = [
            "2021-13-01",
            "2021-02-29",
            "2021-01-32",
            "2021-00-01",
            "+010000-01-01",
            "2021-01-01T24:00",
            "2021-01-01T12:60",
            "2021-01-01T12:00+05:60",
            "2021-01-01T12:00+26:00",
        ];
        for input in inputs {
            let err = parse_err(input);
            assert!(err.is_parse(), "input: {input:?}, error: {err}");
            assert!(err.is_range(), "input: {input:?}, error: {err}");
        }
    }

    #[test]
    fn error_messages() {
        insta::assert_snapshot!(
            parse_err("2021-13-01"),
            @r###"failed to parse "2021-13-01" as an ISO 8601 timestamp: parsed date is not valid: parameter 'month' with value 13 is not in the required range of 1..=12"###,
        );
        insta::assert_snapshot!(
            parse_err("2021-01-01X12"),
            @r###"failed to parse "2021-01-01X12" as an ISO 8601 timestamp: parsed datetime, but unparsed input "X12" remains (expected no unparsed input)"###,
        );
        insta::assert_snapshot!(
            parse_err("20210101-12"),
            @r###"failed to parse "20210101-12" as an ISO 8601 timestamp: parsed datetime, but unparsed input "-12" remains (expected no unparsed input)"###,
        );
        insta::assert_snapshot!(
            parse_err("2021-01-01T12:30:00."),
            @r###"failed to parse "2021-01-01T12:30:00." as an ISO 8601 timestamp: expected at least one digit after the decimal separator of the fractional second"###,
        );
    }

    #[test]
    fn resolve_naive_and_offsets() {
        let ts = resolve("2021-01-01T12:00").unwrap();
        assert_eq!(ts.offset(), None);
        assert!(ts.time_zone().is_none());

        let ts = resolve("2021-01-01T12:00Z").unwrap();
        assert_eq!(ts.offset(), Some(Offset::UTC));
        assert_eq!(ts.time_zone(), Some(&TimeZone::UTC));

        let ts = resolve("2021-01-01T12:00-03:00").unwrap();
        assert_eq!(ts.offset(), Some(Offset::constant(-3)));
        assert_eq!(ts.hour(), 12);
    }

    #[test]
    fn resolve_annotations() {
        // Local time in the zone.
        let ts = resolve("2024-07-01T12:00[America/New_York]").unwrap();
        assert_eq!(ts.offset(), Some(Offset::constant(-4)));
        assert_eq!(ts.hour(), 12);

        // An instant projected into the zone.
        let ts = resolve("2024-07-01T12:00Z[America/New_York]").unwrap();
        assert_eq!(ts.offset(), Some(Offset::constant(-4)));
        assert_eq!(ts.hour(), 8);

        // A matching offset.
        let ts = resolve("2024-01-01T12:00-05:00[America/New_York]").unwrap();
        assert_eq!(ts.offset(), Some(Offset::constant(-5)));
        assert_eq!(ts.hour(), 12);

        // A fixed offset annotation.
        let ts = resolve("2024-01-01T12:00[+09:00]").unwrap();
        assert_eq!(ts.offset(), Some(Offset::constant(9)));
    }

    #[test]
    fn resolve_errors() {
        let err = resolve("2024-01-01T12:00-04:00[America/New_York]")
            .unwrap_err();
        assert!(!err.is_range());
        assert!(!err.is_time_zone());
        insta::assert_snapshot!(
            err,
            @r###"failed to parse "2024-01-01T12:00-04:00[America/New_York]" as an ISO 8601 timestamp: parsed UTC offset conflicts with the time zone annotation: given offset `-04:00` does not match the time zone's offset `-05:00` at that datetime"###,
        );

        let err = resolve("2024-01-01T12:00[Mars/Olympus]").unwrap_err();
        assert!(err.is_time_zone());

        // Falls in the gap when clocks move forward.
        let err = resolve("2024-03-10T02:30[America/New_York]").unwrap_err();
        assert!(err.is_range());
    }

    #[test]
    fn resolve_fold_picks_earlier() {
        let ts = resolve("2024-11-03T01:30[America/New_York]").unwrap();
        assert_eq!(ts.offset(), Some(Offset::constant(-4)));
        let ts = resolve("2024-11-03T01:30-05:00[America/New_York]").unwrap();
        assert_eq!(ts.offset(), Some(Offset::constant(-5)));
    }
}
