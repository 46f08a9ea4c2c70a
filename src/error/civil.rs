use crate::error;

#[derive(Clone, Debug)]
pub(crate) enum Error {
    InvalidISOWeekNumber { year: i16 },
}

impl From<Error> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: Error) -> error::Error {
        error::ErrorKind::Civil(err).into()
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
            InvalidISOWeekNumber { year } => write!(
                f,
                "ISO week number is invalid for ISO year {year}, \
                 which only has 52 weeks",
            ),
        }
    }
}
