use crate::{error, tz::Offset};

#[derive(Clone, Debug)]
pub(crate) enum Error {
    ConvertDateTimeToTimestamp { offset: Offset },
    ConvertTimestampToDateTime { offset: Offset },
    Mismatch { given: Offset, actual: Offset },
}

impl From<Error> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: Error) -> error::Error {
        error::ErrorKind::TzOffset(err).into()
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
            ConvertDateTimeToTimestamp { offset } => write!(
                f,
                "converting datetime with time zone offset `{offset}` \
                 to timestamp overflowed",
            ),
            ConvertTimestampToDateTime { offset } => write!(
                f,
                "converting timestamp with time zone offset `{offset}` \
                 to civil datetime overflowed",
            ),
            Mismatch { given, actual } => write!(
                f,
                "given offset `{given}` does not match the time zone's \
                 offset `{actual}` at that datetime",
            ),
        }
    }
}
