use crate::{error, Unit};

#[derive(Clone, Debug)]
pub(crate) enum Error {
    EpochNotFinite { unit: Unit },
    EpochOutOfRange { unit: Unit },
    FailedBuild,
    FailedEpochInTimeZone,
    MixedEpochAndComponents,
}

impl From<Error> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: Error) -> error::Error {
        error::ErrorKind::Timestamp(err).into()
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
            EpochNotFinite { unit } => write!(
                f,
                "floating point number of {unit} since the Unix epoch \
                 must be finite, but got NaN or infinity",
                unit = unit.plural(),
            ),
            EpochOutOfRange { unit } => write!(
                f,
                "number of {unit} since the Unix epoch is outside the \
                 supported range of `-9999-01-01T00:00:00Z` to \
                 `9999-12-31T23:59:59.999999999Z`",
                unit = unit.plural(),
            ),
            FailedBuild => {
                f.write_str("failed to build timestamp from components")
            }
            FailedEpochInTimeZone => f.write_str(
                "failed to project epoch timestamp into time zone",
            ),
            MixedEpochAndComponents => f.write_str(
                "an epoch value with a unit cannot be combined with \
                 civil time components",
            ),
        }
    }
}
