use alloc::boxed::Box;

use crate::{error, util::escape};

#[derive(Clone, Debug)]
pub(crate) enum Error {
    EmptyAnnotation,
    EmptyInput,
    ExpectedAnnotationClose,
    ExpectedDateSeparatorFoundByte { byte: u8 },
    ExpectedDateSeparatorFoundEndOfInput,
    ExpectedFourDigitYear,
    ExpectedFractionDigits,
    ExpectedNoSeparator,
    ExpectedSixDigitYear,
    ExpectedTwoDigitDay,
    ExpectedTwoDigitHour,
    ExpectedTwoDigitMinute,
    ExpectedTwoDigitMonth,
    ExpectedTwoDigitOffsetHour,
    ExpectedTwoDigitOffsetMinute,
    ExpectedTwoDigitOffsetSecond,
    ExpectedTwoDigitSecond,
    FailedTzdbLookup,
    InvalidAnnotationUtf8,
    InvalidDate,
    InvalidOffset,
    InvalidTime,
    InvalidYearZero,
    OffsetConflict,
    ParseDay,
    ParseFraction,
    ParseHour,
    ParseMinute,
    ParseMonth,
    ParseSecond,
    ParseYear,
    TrailingInput { remaining: Box<[u8]> },
    UnparseableTimestamp { input: Box<[u8]> },
}

impl Error {
    pub(crate) fn trailing_input(remaining: &[u8]) -> Error {
        Error::TrailingInput { remaining: remaining.into() }
    }

    pub(crate) fn unparseable_timestamp(input: &[u8]) -> Error {
        Error::UnparseableTimestamp { input: input.into() }
    }
}

impl From<Error> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: Error) -> error::Error {
        error::ErrorKind::Fmt(err).into()
    }
}

impl error::IntoError for Error {
    fn into_error(self) -> error::Error {
        self.into()
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::Error::*;

        match *self {
            EmptyAnnotation => f.write_str(
                "expected a time zone name inside `[...]`, \
                 but found an empty annotation",
            ),
            EmptyInput => f.write_str(
                "expected a datetime, but found the end of input",
            ),
            ExpectedAnnotationClose => f.write_str(
                "expected a closing `]` after time zone annotation",
            ),
            ExpectedDateSeparatorFoundByte { byte } => write!(
                f,
                "expected `-` separator between date components, \
                 but found `{byte}` instead",
                byte = escape::Byte(byte),
            ),
            ExpectedDateSeparatorFoundEndOfInput => f.write_str(
                "expected `-` separator between date components, \
                 but found the end of input",
            ),
            ExpectedFourDigitYear => {
                f.write_str("expected four digit year (or leading sign)")
            }
            ExpectedFractionDigits => f.write_str(
                "expected at least one digit after the decimal separator \
                 of the fractional second",
            ),
            ExpectedNoSeparator => f.write_str(
                "expected no `-` separator since the date began in \
                 basic format (without separators)",
            ),
            ExpectedSixDigitYear => f.write_str(
                "expected six digit year because of a leading sign",
            ),
            ExpectedTwoDigitDay => f.write_str("expected two digit day"),
            ExpectedTwoDigitHour => f.write_str("expected two digit hour"),
            ExpectedTwoDigitMinute => {
                f.write_str("expected two digit minute")
            }
            ExpectedTwoDigitMonth => f.write_str("expected two digit month"),
            ExpectedTwoDigitOffsetHour => {
                f.write_str("expected two digit hour in UTC offset")
            }
            ExpectedTwoDigitOffsetMinute => {
                f.write_str("expected two digit minute in UTC offset")
            }
            ExpectedTwoDigitOffsetSecond => {
                f.write_str("expected two digit second in UTC offset")
            }
            ExpectedTwoDigitSecond => {
                f.write_str("expected two digit second")
            }
            FailedTzdbLookup => f.write_str(
                "failed to find time zone from annotation \
                 in time zone database",
            ),
            InvalidAnnotationUtf8 => {
                f.write_str("time zone annotation is not valid UTF-8")
            }
            InvalidDate => f.write_str("parsed date is not valid"),
            InvalidOffset => f.write_str("parsed UTC offset is not valid"),
            InvalidTime => f.write_str("parsed time is not valid"),
            InvalidYearZero => f.write_str(
                "year zero must be written without a sign or a \
                 positive sign, but not a negative sign",
            ),
            OffsetConflict => f.write_str(
                "parsed UTC offset conflicts with the time zone annotation",
            ),
            ParseDay => f.write_str("failed to parse day in date"),
            ParseFraction => {
                f.write_str("failed to parse fractional second in time")
            }
            ParseHour => f.write_str("failed to parse hour in time"),
            ParseMinute => f.write_str("failed to parse minute in time"),
            ParseMonth => f.write_str("failed to parse month in date"),
            ParseSecond => f.write_str("failed to parse second in time"),
            ParseYear => f.write_str("failed to parse year in date"),
            TrailingInput { ref remaining } => write!(
                f,
                "parsed datetime, but unparsed input {remaining:?} remains \
                 (expected no unparsed input)",
                remaining = escape::Bytes(remaining),
            ),
            UnparseableTimestamp { ref input } => write!(
                f,
                "failed to parse {input:?} as an ISO 8601 timestamp",
                input = escape::Bytes(input),
            ),
        }
    }
}
