use alloc::{collections::BTreeMap, string::String, vec::Vec};

use crate::{error::Error, tz::TimeZone};

#[cfg(feature = "tzdb-bundle")]
pub use self::bundled::BundledDb;
#[cfg(feature = "tzdb-zoneinfo")]
pub use self::zoneinfo::ZoneInfoDb;

#[cfg(feature = "tzdb-bundle")]
mod bundled;
#[cfg(feature = "tzdb-zoneinfo")]
mod zoneinfo;

/// A source of named time zones.
///
/// Anything that can turn an IANA time zone identifier into a [`TimeZone`]
/// can be a database. This crate provides [`BundledDb`] (with the
/// `tzdb-bundle` feature), [`ZoneInfoDb`] (with the `tzdb-zoneinfo`
/// feature) and [`DefaultDb`]. A `BTreeMap<String, TimeZone>` is also a
/// database, which is convenient for tests.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
///
/// use calstamp::{tz::{TimeZone, TimeZoneDatabase}, Timestamp, Unit};
///
/// let mut db = BTreeMap::new();
/// db.insert(
///     "Custom/Eastern".to_string(),
///     TimeZone::posix("EST5EDT,M3.2.0,M11.1.0")?,
/// );
/// // `BTreeMap` has its own `get`, so call the trait method explicitly.
/// assert!(TimeZoneDatabase::get(&db, "Custom/Eastern").is_ok());
/// assert!(TimeZoneDatabase::get(&db, "Custom/Western")
///     .unwrap_err()
///     .is_time_zone());
///
/// let ts = Timestamp::from_epoch_in(0, Unit::Second, "Custom/Eastern", &db)?;
/// assert_eq!(ts.to_string(), "1969-12-31 19:00:00-05:00");
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// [`BundledDb`]: crate::tz::BundledDb
/// [`ZoneInfoDb`]: crate::tz::ZoneInfoDb
pub trait TimeZoneDatabase {
    /// Returns the time zone for the given identifier, or `None` if this
    /// database does not know it.
    fn lookup(&self, name: &str) -> Option<TimeZone>;

    /// Returns the identifiers this database knows about, if it can
    /// enumerate them.
    ///
    /// The default implementation returns an empty list.
    fn available(&self) -> Vec<String> {
        Vec::new()
    }

    /// Returns the time zone for the given identifier.
    ///
    /// `UTC` is always found, even when this database does not contain it.
    ///
    /// # Errors
    ///
    /// This returns a time zone error when the identifier is not found.
    fn get(&self, name: &str) -> Result<TimeZone, Error> {
        if let Some(tz) = self.lookup(name) {
            return Ok(tz);
        }
        if name.eq_ignore_ascii_case("UTC") {
            return Ok(TimeZone::UTC);
        }
        Err(crate::error::tz::db::Error::failed_time_zone(name).into())
    }
}

impl<'a, D: TimeZoneDatabase + ?Sized> TimeZoneDatabase for &'a D {
    fn lookup(&self, name: &str) -> Option<TimeZone> {
        (**self).lookup(name)
    }

    fn available(&self) -> Vec<String> {
        (**self).available()
    }

    fn get(&self, name: &str) -> Result<TimeZone, Error> {
        (**self).get(name)
    }
}

impl TimeZoneDatabase for BTreeMap<String, TimeZone> {
    fn lookup(&self, name: &str) -> Option<TimeZone> {
        BTreeMap::get(self, name).cloned()
    }

    fn available(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }
}

/// Returns the default time zone database.
///
/// The default database consults, in order, the system zoneinfo directory
/// (see [`ZoneInfoDb::from_env`]) and then the copy of the IANA database
/// bundled into this crate. Either source is only present when its crate
/// feature is enabled.
///
/// The environment is read on the first call only. Later calls return the
/// same handle. Use [`DefaultDb::from_env`] to read it again, or pass any
/// other [`TimeZoneDatabase`] explicitly.
///
/// # Example
///
/// ```
/// use calstamp::tz::{self, TimeZoneDatabase};
///
/// let db = tz::db();
/// if !db.is_empty() {
///     assert!(db.get("America/New_York").is_ok());
/// }
/// assert!(db.get("Not/AZone").unwrap_err().is_time_zone());
/// ```
///
/// [`ZoneInfoDb::from_env`]: crate::tz::ZoneInfoDb::from_env
pub fn db() -> &'static DefaultDb {
    #[cfg(not(feature = "std"))]
    {
        static DB: DefaultDb = DefaultDb {
            #[cfg(feature = "tzdb-bundle")]
            bundled: Some(BundledDb::new()),
        };
        &DB
    }
    #[cfg(feature = "std")]
    {
        use std::sync::OnceLock;

        static DB: OnceLock<DefaultDb> = OnceLock::new();
        DB.get_or_init(DefaultDb::from_env)
    }
}

/// The database returned by [`db()`].
#[derive(Clone, Debug)]
pub struct DefaultDb {
    #[cfg(feature = "tzdb-zoneinfo")]
    zoneinfo: Option<ZoneInfoDb>,
    #[cfg(feature = "tzdb-bundle")]
    bundled: Option<BundledDb>,
}

impl DefaultDb {
    /// Looks in the environment for every available source of time zones.
    pub fn from_env() -> DefaultDb {
        #[cfg(feature = "tzdb-zoneinfo")]
        let zoneinfo = match ZoneInfoDb::from_env() {
            Ok(db) => Some(db),
            Err(_err) => {
                debug!("no zoneinfo database available: {_err}");
                None
            }
        };
        DefaultDb {
            #[cfg(feature = "tzdb-zoneinfo")]
            zoneinfo,
            #[cfg(feature = "tzdb-bundle")]
            bundled: Some(BundledDb::new()),
        }
    }

    /// Returns a database that contains no time zones.
    ///
    /// Lookups still find `UTC`.
    pub fn none() -> DefaultDb {
        DefaultDb {
            #[cfg(feature = "tzdb-zoneinfo")]
            zoneinfo: None,
            #[cfg(feature = "tzdb-bundle")]
            bundled: None,
        }
    }

    /// Returns true when this database has no source of time zones.
    pub fn is_empty(&self) -> bool {
        #[cfg(feature = "tzdb-zoneinfo")]
        {
            if self.zoneinfo.is_some() {
                return false;
            }
        }
        #[cfg(feature = "tzdb-bundle")]
        {
            if self.bundled.is_some() {
                return false;
            }
        }
        true
    }
}

impl TimeZoneDatabase for DefaultDb {
    fn lookup(&self, _name: &str) -> Option<TimeZone> {
        #[cfg(feature = "tzdb-zoneinfo")]
        {
            if let Some(tz) =
                self.zoneinfo.as_ref().and_then(|db| db.lookup(_name))
            {
                return Some(tz);
            }
        }
        #[cfg(feature = "tzdb-bundle")]
        {
            if let Some(tz) =
                self.bundled.as_ref().and_then(|db| db.lookup(_name))
            {
                return Some(tz);
            }
        }
        None
    }

    fn available(&self) -> Vec<String> {
        #[allow(unused_mut)]
        let mut names: Vec<String> = Vec::new();
        #[cfg(feature = "tzdb-zoneinfo")]
        {
            if let Some(ref db) = self.zoneinfo {
                names.extend(db.available());
            }
        }
        #[cfg(feature = "tzdb-bundle")]
        {
            if let Some(ref db) = self.bundled {
                names.extend(db.available());
            }
        }
        names.sort();
        names.dedup();
        names
    }

    fn get(&self, name: &str) -> Result<TimeZone, Error> {
        if let Some(tz) = self.lookup(name) {
            return Ok(tz);
        }
        if name.eq_ignore_ascii_case("UTC") {
            return Ok(TimeZone::UTC);
        }
        if self.is_empty() {
            use crate::error::tz::db::Error as E;

            let err = E::failed_time_zone_no_database_configured(name);
            return Err(err.into());
        }
        trace!("time zone `{name}` not found in any database");
        Err(crate::error::tz::db::Error::failed_time_zone(name).into())
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use crate::tz::Offset;

    use super::*;

    fn map() -> BTreeMap<String, TimeZone> {
        let mut db = BTreeMap::new();
        let tz = TimeZone::fixed(Offset::constant(3));
        db.insert("Fixed/Plus3".to_string(), tz);
        db
    }

    #[test]
    fn map_lookup() {
        let db = map();
        assert_eq!(
            db.lookup("Fixed/Plus3"),
            Some(TimeZone::fixed(Offset::constant(3))),
        );
        assert_eq!(db.lookup("fixed/plus3"), None);
        assert_eq!(db.available(), ["Fixed/Plus3"]);
        assert_eq!(TimeZoneDatabase::get(&db, "UTC").unwrap(), TimeZone::UTC);
    }

    #[test]
    fn map_missing_is_time_zone_error() {
        let db = map();
        let err = TimeZoneDatabase::get(&db, "Mars/Olympus").unwrap_err();
        assert!(err.is_time_zone());
        assert!(!err.is_range());
        assert!(!err.is_parse());
    }

    #[test]
    fn default_none() {
        let db = DefaultDb::none();
        assert!(db.is_empty());
        assert_eq!(db.get("UTC").unwrap(), TimeZone::UTC);
        let err = db.get("America/New_York").unwrap_err();
        assert!(err.is_time_zone());
        assert!(db.available().is_empty());
    }

    #[cfg(feature = "std")]
    #[test]
    fn default_is_built_once() {
        assert!(core::ptr::eq(db(), db()));
        let fresh = DefaultDb::from_env();
        assert_eq!(db().is_empty(), fresh.is_empty());
        assert_eq!(db().available(), fresh.available());
    }

    #[cfg(feature = "tzdb-bundle")]
    #[test]
    fn default_finds_bundled() {
        let db = DefaultDb::from_env();
        assert!(!db.is_empty());
        assert!(db.get("Europe/Paris").is_ok());
        assert!(db.get("Not/A_Zone").unwrap_err().is_time_zone());
    }
}
