/*!
Time zones: fixed offsets, POSIX time zones and IANA time zones.

A [`TimeZone`] maps an instant to the [`Offset`] in effect at that instant.
It also answers the reverse question, used when a timestamp is built from
local civil components: which offsets could a local datetime have had?

Named time zones such as `America/New_York` are obtained from a
[`TimeZoneDatabase`]. Callers pass a database by reference, or use
[`db()`] for the default one, which is built on first use.

# Example

```
use calstamp::tz::{Offset, TimeZone};

let tz = TimeZone::posix("EST5EDT,M3.2.0,M11.1.0")?;
// 2024-07-01T00:00:00Z is during daylight saving time.
assert_eq!(tz.to_offset(1_719_792_000), Offset::constant(-4));
// 2024-01-01T00:00:00Z is not.
assert_eq!(tz.to_offset(1_704_067_200), Offset::constant(-5));

# Ok::<(), Box<dyn std::error::Error>>(())
```
*/

use alloc::sync::Arc;

use crate::{
    error::Error,
    util::itime::{IDateTime, IOffset, ITimestamp, SECONDS_PER_DAY},
};

use self::{posix::PosixTimeZone, tzif::Tzif};

#[cfg(feature = "tzdb-bundle")]
pub use self::db::BundledDb;
#[cfg(feature = "tzdb-zoneinfo")]
pub use self::db::ZoneInfoDb;
pub use self::{
    db::{db, DefaultDb, TimeZoneDatabase},
    offset::Offset,
};

mod db;
mod offset;
pub(crate) mod posix;
pub(crate) mod tzif;

/// A time zone.
///
/// A time zone is one of three things:
///
/// * A fixed offset from UTC, e.g., [`TimeZone::UTC`] or
/// `TimeZone::fixed(Offset::constant(-5))`.
/// * A POSIX time zone string, e.g., `EST5EDT,M3.2.0,M11.1.0`.
/// * IANA time zone data in the TZif binary format. This is what a
/// [`TimeZoneDatabase`] typically produces.
///
/// Cloning a `TimeZone` is cheap. The parsed data is shared behind an
/// `Arc`.
#[derive(Clone)]
pub struct TimeZone {
    kind: Option<Arc<TimeZoneKind>>,
}

#[derive(Debug, Eq, PartialEq)]
enum TimeZoneKind {
    Fixed(Offset),
    Posix(PosixTimeZone),
    Tzif(Tzif),
}

impl TimeZone {
    /// The UTC time zone. Its offset is always `+00:00`.
    pub const UTC: TimeZone = TimeZone { kind: None };

    /// Creates a time zone that always has the given offset.
    ///
    /// # Example
    ///
    /// ```
    /// use calstamp::tz::{Offset, TimeZone};
    ///
    /// let tz = TimeZone::fixed(Offset::constant(9));
    /// assert_eq!(tz.to_offset(0), Offset::constant(9));
    /// assert_eq!(TimeZone::fixed(Offset::UTC), TimeZone::UTC);
    /// ```
    pub fn fixed(offset: Offset) -> TimeZone {
        if offset == Offset::UTC {
            return TimeZone::UTC;
        }
        TimeZone { kind: Some(Arc::new(TimeZoneKind::Fixed(offset))) }
    }

    /// Creates a time zone from a POSIX `TZ` string.
    ///
    /// The IANA v3+ extension to transition times (hours in
    /// `-167..=167`) is supported. A daylight saving time abbreviation
    /// without a transition rule is rejected.
    ///
    /// # Errors
    ///
    /// This returns a time zone error when the string is not a valid POSIX
    /// time zone.
    ///
    /// # Example
    ///
    /// ```
    /// use calstamp::tz::TimeZone;
    ///
    /// assert!(TimeZone::posix("<+0530>-5:30").is_ok());
    /// assert!(TimeZone::posix("EST5EDT").unwrap_err().is_time_zone());
    /// ```
    pub fn posix(posix_tz_string: &str) -> Result<TimeZone, Error> {
        let posix = PosixTimeZone::parse(posix_tz_string.as_bytes())?;
        Ok(TimeZone { kind: Some(Arc::new(TimeZoneKind::Posix(posix))) })
    }

    /// Creates a time zone from TZif formatted data, as defined by RFC 8536.
    ///
    /// The name given is reported by [`TimeZone::iana_name`].
    ///
    /// # Errors
    ///
    /// This returns a time zone error when the data is not valid TZif.
    pub fn tzif(name: &str, data: &[u8]) -> Result<TimeZone, Error> {
        let tzif = Tzif::parse(name, data)?;
        Ok(TimeZone { kind: Some(Arc::new(TimeZoneKind::Tzif(tzif))) })
    }

    /// Returns the IANA identifier of this time zone, if it has one.
    ///
    /// This is `UTC` for [`TimeZone::UTC`] and the name given to
    /// [`TimeZone::tzif`] for TZif time zones. Other fixed offsets and
    /// POSIX time zones have no IANA identifier.
    pub fn iana_name(&self) -> Option<&str> {
        let Some(ref kind) = self.kind else { return Some("UTC") };
        match **kind {
            TimeZoneKind::Tzif(ref tzif) => Some(tzif.name()),
            _ => None,
        }
    }

    /// Returns the offset in effect at the given number of seconds since
    /// the Unix epoch.
    ///
    /// Seconds outside of `-9999-01-01T00:00:00Z..=9999-12-31T23:59:59Z`
    /// are clamped to that range first, so the offset reported for them
    /// is the one in effect at the nearest supported instant.
    pub fn to_offset(&self, epoch_second: i64) -> Offset {
        let Some(ref kind) = self.kind else { return Offset::UTC };
        let (min, max) = (ITimestamp::MIN.second, ITimestamp::MAX.second);
        let epoch_second = epoch_second.clamp(min, max);
        match **kind {
            TimeZoneKind::Fixed(offset) => offset,
            TimeZoneKind::Posix(ref posix) => posix.to_offset(epoch_second),
            TimeZoneKind::Tzif(ref tzif) => tzif.to_offset(epoch_second),
        }
    }

    /// Returns the possible offsets of a local datetime in this time zone.
    ///
    /// A local datetime has zero offsets when it falls in a gap (e.g., the
    /// hour skipped when daylight saving time begins) and two when it falls
    /// in a fold (e.g., the hour repeated when it ends).
    pub(crate) fn to_ambiguous_offset(
        &self,
        dt: IDateTime,
    ) -> AmbiguousOffset {
        let fixed = match self.kind {
            None => Some(Offset::UTC),
            Some(ref kind) => match **kind {
                TimeZoneKind::Fixed(offset) => Some(offset),
                _ => None,
            },
        };
        if let Some(offset) = fixed {
            return AmbiguousOffset::Unambiguous { offset };
        }

        // The datetime's seconds since the epoch, read as if it were UTC.
        // Every candidate instant is this minus some offset, and offsets
        // are smaller than a day. So the offsets a day on either side are
        // the ones before and after any transition that could matter.
        let local = dt.to_timestamp(IOffset::UTC).second;
        let is_valid = |offset: Offset| {
            self.to_offset(local - i64::from(offset.seconds())) == offset
        };
        let before = self.to_offset(local - SECONDS_PER_DAY);
        let after = self.to_offset(local + SECONDS_PER_DAY);
        if before == after {
            if is_valid(before) {
                return AmbiguousOffset::Unambiguous { offset: before };
            }
            // There are transitions within the window that cancel out.
            // Try the offset in effect at the naive candidate instant.
            let middle =
                self.to_offset(local - i64::from(before.seconds()));
            if is_valid(middle) {
                return AmbiguousOffset::Unambiguous { offset: middle };
            }
            return AmbiguousOffset::Gap { before, after: middle };
        }
        match (is_valid(before), is_valid(after)) {
            (true, true) => AmbiguousOffset::Fold { before, after },
            (true, false) => AmbiguousOffset::Unambiguous { offset: before },
            (false, true) => AmbiguousOffset::Unambiguous { offset: after },
            (false, false) => AmbiguousOffset::Gap { before, after },
        }
    }

    /// Returns a name suitable for error messages. It is never empty.
    pub(crate) fn diagnostic_name(&self) -> DiagnosticName<'_> {
        DiagnosticName(self)
    }
}

impl core::fmt::Debug for TimeZone {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        // The full TZif data is too noisy to be useful here.
        f.debug_tuple("TimeZone")
            .field(&format_args!("{}", self.diagnostic_name()))
            .finish()
    }
}

impl Eq for TimeZone {}

/// Two time zones are equal when they are built from the same data. A fixed
/// offset and a POSIX time zone are never equal, even if they always
/// produce the same offset.
impl PartialEq for TimeZone {
    fn eq(&self, rhs: &TimeZone) -> bool {
        match (&self.kind, &rhs.kind) {
            (None, None) => true,
            (Some(k1), Some(k2)) => Arc::ptr_eq(k1, k2) || k1 == k2,
            _ => false,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct DiagnosticName<'a>(&'a TimeZone);

impl<'a> core::fmt::Display for DiagnosticName<'a> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let Some(ref kind) = self.0.kind else { return f.write_str("UTC") };
        match **kind {
            TimeZoneKind::Fixed(offset) => write!(f, "{offset}"),
            TimeZoneKind::Posix(ref posix) => write!(f, "{posix}"),
            TimeZoneKind::Tzif(ref tzif) => f.write_str(tzif.name()),
        }
    }
}

/// The possible offsets of a local datetime in a particular time zone.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum AmbiguousOffset {
    /// Exactly one offset applies. This is the overwhelmingly common case.
    Unambiguous { offset: Offset },
    /// The local datetime was skipped, e.g., when clocks move forward.
    Gap { before: Offset, after: Offset },
    /// The local datetime occurred twice, e.g., when clocks move back.
    /// `before` is the offset of the earlier instant.
    Fold { before: Offset, after: Offset },
}
