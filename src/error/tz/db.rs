use alloc::boxed::Box;

use crate::error;

#[derive(Clone, Debug)]
pub(crate) enum Error {
    FailedTimeZone { name: Box<str> },
    FailedTimeZoneNoDatabaseConfigured { name: Box<str> },
    #[cfg(feature = "tzdb-zoneinfo")]
    ZoneInfoNotFound,
}

impl Error {
    pub(crate) fn failed_time_zone(name: &str) -> Error {
        Error::FailedTimeZone { name: name.into() }
    }

    pub(crate) fn failed_time_zone_no_database_configured(
        name: &str,
    ) -> Error {
        Error::FailedTimeZoneNoDatabaseConfigured { name: name.into() }
    }
}

impl From<Error> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: Error) -> error::Error {
        error::ErrorKind::TzDb(err).into()
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
            FailedTimeZone { ref name } => write!(
                f,
                "failed to find time zone `{name}` in time zone database",
            ),
            FailedTimeZoneNoDatabaseConfigured { ref name } => write!(
                f,
                "failed to find time zone `{name}` since there is no \
                 time zone database configured",
            ),
            #[cfg(feature = "tzdb-zoneinfo")]
            ZoneInfoNotFound => f.write_str(
                "could not find a zoneinfo directory, searched `TZDIR`, \
                 `/usr/share/zoneinfo` and `/etc/zoneinfo`",
            ),
        }
    }
}
