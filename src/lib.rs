/*!
An immutable, calendar-aware timestamp.

A [`Timestamp`] is a civil datetime in the proleptic Gregorian calendar,
with nanosecond precision, that is either *naive* (no time zone) or attached
to a [`TimeZone`](tz::TimeZone). It can be built in four ways:

* By parsing an ISO 8601-like string, e.g., `2021-01-01T12`.
* From a number of seconds, milliseconds, microseconds or nanoseconds since
the Unix epoch.
* From an epoch value projected into a named time zone.
* From explicit calendar components, optionally as local time in a time
zone.

Once built, it answers calendar questions: the day of the week, the ISO
week, whether it starts or ends a month, quarter or year, and so on.

# Example

```
use calstamp::{tz, Timestamp, Unit};

let ts: Timestamp = "2018-03-21T08:15".parse()?;
assert_eq!(ts.day_of_week(), 2);
assert_eq!(ts.day_of_year(), 80);
assert_eq!(ts.week_of_year(), 12);
assert!(!ts.is_quarter_start());

let db = tz::db();
let ts = Timestamp::from_epoch_in(0, Unit::Second, "America/New_York", &db)?;
assert_eq!(ts.to_string(), "1969-12-31 19:00:00-05:00");
assert!(ts.is_year_end());

let err = Timestamp::new(2021, 2, 29).unwrap_err();
assert!(err.is_range());

# Ok::<(), Box<dyn std::error::Error>>(())
```

# Time zones

Named time zones come from a [`TimeZoneDatabase`](tz::TimeZoneDatabase),
which is always passed explicitly. [`tz::db()`] returns the default one,
which reads the system zoneinfo directory and falls back to a copy of the
IANA database compiled into this crate.

# Crate features

* **std** (enabled by default) - Implements `std::error::Error` for
[`Error`] and uses the standard library's floating point routines. When
disabled, this crate is `no_std` but still requires `alloc`.
* **tzdb-bundle** (enabled by default) - Embeds the IANA Time Zone
Database via the `jiff-tzdb` crate and provides
[`BundledDb`](tz::BundledDb).
* **tzdb-zoneinfo** (enabled by default) - Provides
[`ZoneInfoDb`](tz::ZoneInfoDb), which reads `$TZDIR`,
`/usr/share/zoneinfo` or `/etc/zoneinfo`. Implies **std**.
* **logging** - Emits diagnostics through the `log` crate.
* **serde** - Implements `Serialize` and `Deserialize` for [`Timestamp`].
*/

#![no_std]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
// We generally want all types to impl Debug.
#![warn(missing_debug_implementations)]

#[cfg(any(test, feature = "std"))]
extern crate std;

// Errors and time zone data are heap allocated.
extern crate alloc;

pub use crate::{
    error::Error,
    timestamp::{Timestamp, TimestampWith, Unit},
};

#[macro_use]
mod logging;

pub mod civil;
mod error;
mod fmt;
mod timestamp;
pub mod tz;
mod util;
