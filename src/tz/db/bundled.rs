use alloc::{string::String, vec::Vec};

use crate::tz::{TimeZone, TimeZoneDatabase};

/// A time zone database embedded into the compiled library.
///
/// The data comes from the `jiff-tzdb` crate, a compressed copy of the IANA
/// Time Zone Database. Lookups are case insensitive and include the
/// backwards compatible links such as `US/Pacific`. The time zone returned
/// reports the canonical spelling of its identifier.
///
/// This is useful on platforms without a system zoneinfo directory, and
/// for getting identical results on every machine.
///
/// # Example
///
/// ```
/// use calstamp::tz::{BundledDb, TimeZoneDatabase};
///
/// let db = BundledDb::new();
/// let tz = db.get("america/new_york")?;
/// assert_eq!(tz.iana_name(), Some("America/New_York"));
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct BundledDb {
    _priv: (),
}

impl BundledDb {
    /// Returns a handle to the bundled database.
    pub const fn new() -> BundledDb {
        BundledDb { _priv: () }
    }
}

impl TimeZoneDatabase for BundledDb {
    fn lookup(&self, name: &str) -> Option<TimeZone> {
        let Some((canonical, data)) = jiff_tzdb::get(name) else {
            trace!("time zone `{name}` not found in bundled database");
            return None;
        };
        match TimeZone::tzif(canonical, data) {
            Ok(tz) => Some(tz),
            Err(_err) => {
                warn!(
                    "failed to parse bundled TZif data for `{name}`: {_err}"
                );
                None
            }
        }
    }

    fn available(&self) -> Vec<String> {
        jiff_tzdb::available().map(String::from).collect()
    }
}
