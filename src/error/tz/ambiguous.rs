use crate::{
    civil::DateTime,
    error,
    tz::{Offset, TimeZone},
};

#[derive(Clone, Debug)]
pub(crate) enum Error {
    /// The local datetime is skipped when the zone moves its clocks forward.
    Gap { datetime: DateTime, before: Offset, after: Offset },
    InTimeZone { tz: TimeZone },
}

impl From<Error> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: Error) -> error::Error {
        error::ErrorKind::TzAmbiguous(err).into()
    }
}

impl error::IntoError for Error {
    fn into_error(self) -> error::Error {
        self.into()
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            Error::Gap { datetime, before, after } => write!(
                f,
                "local datetime {datetime} never occurs, since clocks \
                 jump from offset {before} to {after} over it",
            ),
            Error::InTimeZone { ref tz } => write!(
                f,
                "failed to resolve local datetime in time zone {tz}",
                tz = tz.diagnostic_name(),
            ),
        }
    }
}
