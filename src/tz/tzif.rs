/*!
This module provides support for TZif binary files from the [Time Zone
Database].

These binary files are the ones commonly found in Unix distributions in the
`/usr/share/zoneinfo` directory. The format is described by RFC 8536.

Only what is needed to map an instant to its offset is kept: the transition
times, the offset that each transition switches to and the POSIX time zone
in the footer. Abbreviations, leap second records and indicators are
validated for size and then skipped.

[Time Zone Database]: https://www.iana.org/time-zones
*/

use alloc::{boxed::Box, vec::Vec};

use crate::{
    error::Error,
    tz::{posix::PosixTimeZone, Offset},
    util::itime::{ITimestamp, SECONDS_PER_DAY},
};

macro_rules! err {
    ($($tt:tt)*) => {{
        TzifError { message: alloc::format!($($tt)*).into() }
    }}
}

/// Transitions outside of this range can never influence an instant that a
/// `Timestamp` can represent, so they are clamped into it.
const TRANSITION_MIN: i64 = ITimestamp::MIN.second - 2 * SECONDS_PER_DAY;
const TRANSITION_MAX: i64 = ITimestamp::MAX.second + 2 * SECONDS_PER_DAY;

/// An error that occurs when TZif data is invalid.
#[derive(Clone, Debug)]
pub(crate) struct TzifError {
    message: Box<str>,
}

impl core::fmt::Display for TzifError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid TZif data: {}", self.message)
    }
}

/// A time zone parsed from TZif data.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Tzif {
    name: Box<str>,
    /// Transition times in seconds since the Unix epoch, in ascending order.
    transitions: Vec<i64>,
    /// For each transition, the index into `offsets` that it switches to.
    transition_types: Vec<u8>,
    /// The offset, in seconds, of each local time type. There is always at
    /// least one.
    offsets: Vec<i32>,
    /// Describes offsets after the last transition.
    footer: Option<PosixTimeZone>,
}

impl Tzif {
    /// Parses the given data as a TZif formatted file.
    ///
    /// The name is attached to the value returned, but is otherwise not
    /// significant.
    ///
    /// Arbitrary data may be given to this routine. It never panics and
    /// it never allocates more than a small constant factor of the size
    /// of the data.
    pub(crate) fn parse(name: &str, bytes: &[u8]) -> Result<Tzif, Error> {
        let mut cursor = Cursor { bytes };
        let header32 = Header::parse(&mut cursor, 4).map_err(Error::tzif)?;
        let tzif = if header32.version == 0 {
            Tzif::parse_block(name, &header32, &mut cursor)
        } else {
            // Skip the V1 data block. The V2+ block that follows has 64-bit
            // transition times and a footer.
            cursor
                .take(header32.data_block_len(), "version 1 data block")
                .and_then(|_| Header::parse(&mut cursor, 8))
                .and_then(|header64| {
                    let mut tzif =
                        Tzif::parse_block(name, &header64, &mut cursor)?;
                    tzif.footer = parse_footer(&mut cursor)?;
                    Ok(tzif)
                })
        };
        tzif.map_err(Error::tzif)
    }

    fn parse_block(
        name: &str,
        header: &Header,
        cursor: &mut Cursor<'_>,
    ) -> Result<Tzif, TzifError> {
        let times = cursor.take(
            header.timecnt * header.time_size,
            "transition times",
        )?;
        let mut transitions = Vec::with_capacity(header.timecnt);
        for chunk in times.chunks_exact(header.time_size) {
            let mut time = if header.time_size == 4 {
                i64::from(be_i32(chunk))
            } else {
                be_i64(chunk)
            };
            if !(TRANSITION_MIN <= time && time <= TRANSITION_MAX) {
                let clamped = time.clamp(TRANSITION_MIN, TRANSITION_MAX);
                warn!(
                    "TZif data for `{name}` has transition `{time}` outside \
                     of the supported range, clamping to `{clamped}`",
                );
                time = clamped;
            }
            if transitions.last().map_or(false, |&prev| prev > time) {
                return Err(err!(
                    "transition times are not in ascending order"
                ));
            }
            transitions.push(time);
        }

        let transition_types =
            cursor.take(header.timecnt, "transition types")?.to_vec();
        let invalid = transition_types
            .iter()
            .find(|&&i| usize::from(i) >= header.typecnt);
        if let Some(&index) = invalid {
            return Err(err!(
                "transition refers to local time type {index}, but only \
                 {} local time types exist",
                header.typecnt,
            ));
        }

        let types = cursor.take(header.typecnt * 6, "local time types")?;
        let mut offsets = Vec::with_capacity(header.typecnt);
        let mut designation_starts = Vec::with_capacity(header.typecnt);
        for chunk in types.chunks_exact(6) {
            let offset = be_i32(&chunk[..4]);
            if !(Offset::MIN.seconds() <= offset
                && offset <= Offset::MAX.seconds())
            {
                return Err(err!(
                    "local time type has offset `{offset}` seconds, which \
                     is outside the range {}..={}",
                    Offset::MIN.seconds(),
                    Offset::MAX.seconds(),
                ));
            }
            if chunk[4] > 1 {
                return Err(err!("DST indicator must be 0 or 1"));
            }
            offsets.push(offset);
            designation_starts.push(usize::from(chunk[5]));
        }

        let designations =
            cursor.take(header.charcnt, "time zone designations")?;
        for start in designation_starts {
            let terminated = designations
                .get(start..)
                .map_or(false, |rest| rest.contains(&0));
            if !terminated {
                return Err(err!(
                    "time zone designation at index {start} is not a \
                     valid NUL terminated string",
                ));
            }
        }

        // Leap second records and the two indicator arrays are not used.
        let leap_len = header.leapcnt * (header.time_size + 4);
        cursor.take(leap_len, "leap second records")?;
        cursor.take(header.isstdcnt, "standard/wall indicators")?;
        cursor.take(header.isutcnt, "UT/local indicators")?;

        Ok(Tzif {
            name: name.into(),
            transitions,
            transition_types,
            offsets,
            footer: None,
        })
    }

    /// Returns the name given when this data was parsed.
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Returns the offset in effect at the given number of seconds since
    /// the Unix epoch.
    pub(crate) fn to_offset(&self, second: i64) -> Offset {
        // The number of transitions at or before `second`.
        let count = self.transitions.partition_point(|&t| t <= second);
        if let Some(ref footer) = self.footer {
            if count == self.transitions.len() {
                return footer.to_offset(second);
            }
        }
        // Before the first transition, the first local time type applies.
        let seconds = match count.checked_sub(1) {
            None => self.offsets[0],
            Some(i) => self.offsets[usize::from(self.transition_types[i])],
        };
        Offset::from_seconds_unchecked(seconds)
    }
}

/// Parses the footer of V2+ data: a POSIX time zone between two newlines.
/// An empty footer is permitted.
fn parse_footer(
    cursor: &mut Cursor<'_>,
) -> Result<Option<PosixTimeZone>, TzifError> {
    if cursor.take(1, "footer")? != b"\n" {
        return Err(err!("expected footer to begin with a newline"));
    }
    // Only scan a bounded prefix for the terminator.
    let scan = &cursor.bytes[..cursor.bytes.len().min(1024)];
    let Some(end) = scan.iter().position(|&b| b == b'\n') else {
        return Err(err!("could not find newline terminating the footer"));
    };
    let tz = cursor.take(end, "footer")?;
    cursor.take(1, "footer")?;
    if tz.is_empty() {
        return Ok(None);
    }
    PosixTimeZone::parse(tz)
        .map(Some)
        .map_err(|e| err!("failed to parse footer: {e}"))
}

/// The header of a TZif data block. All counts are validated so that the
/// lengths derived from them cannot overflow.
#[derive(Debug)]
struct Header {
    /// Either 4 (version 1 block) or 8 (version 2+ block).
    time_size: usize,
    /// `0` for version 1, otherwise an ASCII digit.
    version: u8,
    isutcnt: usize,
    isstdcnt: usize,
    leapcnt: usize,
    timecnt: usize,
    typecnt: usize,
    charcnt: usize,
}

impl Header {
    fn parse(
        cursor: &mut Cursor<'_>,
        time_size: usize,
    ) -> Result<Header, TzifError> {
        let bytes = cursor.take(44, "header")?;
        if &bytes[..4] != b"TZif" {
            return Err(err!("header does not begin with `TZif` magic"));
        }
        let version = bytes[4];
        // 16 bit counts are more than enough for real data, and they keep
        // every length computation below far from overflowing.
        let count = |at: usize| -> Result<usize, TzifError> {
            let n = be_u32(&bytes[at..at + 4]);
            if n > u32::from(u16::MAX) {
                return Err(err!("header count `{n}` is too big"));
            }
            Ok(n as usize)
        };
        let header = Header {
            time_size,
            version,
            isutcnt: count(20)?,
            isstdcnt: count(24)?,
            leapcnt: count(28)?,
            timecnt: count(32)?,
            typecnt: count(36)?,
            charcnt: count(40)?,
        };
        if header.isutcnt != 0 && header.isutcnt != header.typecnt {
            return Err(err!(
                "number of UT/local indicators must be zero or equal to \
                 the number of local time types",
            ));
        }
        if header.isstdcnt != 0 && header.isstdcnt != header.typecnt {
            return Err(err!(
                "number of standard/wall indicators must be zero or equal \
                 to the number of local time types",
            ));
        }
        if header.typecnt == 0 {
            return Err(err!("there must be at least one local time type"));
        }
        if header.charcnt == 0 {
            return Err(err!(
                "there must be at least one time zone designation byte"
            ));
        }
        Ok(header)
    }

    fn data_block_len(&self) -> usize {
        self.timecnt * self.time_size
            + self.timecnt
            + self.typecnt * 6
            + self.charcnt
            + self.leapcnt * (self.time_size + 4)
            + self.isstdcnt
            + self.isutcnt
    }
}

struct Cursor<'b> {
    bytes: &'b [u8],
}

impl<'b> Cursor<'b> {
    fn take(&mut self, len: usize, what: &str) -> Result<&'b [u8], TzifError> {
        if self.bytes.len() < len {
            return Err(err!(
                "expected {len} bytes for {what}, but only {} remain",
                self.bytes.len(),
            ));
        }
        let (taken, rest) = self.bytes.split_at(len);
        self.bytes = rest;
        Ok(taken)
    }
}

fn be_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0; 4];
    buf.copy_from_slice(&bytes[..4]);
    u32::from_be_bytes(buf)
}

fn be_i32(bytes: &[u8]) -> i32 {
    be_u32(bytes) as i32
}

fn be_i64(bytes: &[u8]) -> i64 {
    let mut buf = [0; 8];
    buf.copy_from_slice(&bytes[..8]);
    i64::from_be_bytes(buf)
}

/// Builds version 2 TZif data from its parts.
///
/// Each local time type is an offset and a DST flag. Every type uses the
/// designation `"ZZZ"`.
#[cfg(test)]
pub(crate) fn build(
    transitions: &[(i64, u8)],
    types: &[(i32, bool)],
    footer: &str,
) -> Vec<u8> {
    fn header(out: &mut Vec<u8>, version: u8, counts: [u32; 6]) {
        out.extend_from_slice(b"TZif");
        out.push(version);
        out.extend_from_slice(&[0; 15]);
        for count in counts {
            out.extend_from_slice(&count.to_be_bytes());
        }
    }

    let mut out = Vec::new();
    // A minimal V1 block: one type, one designation, no transitions.
    header(&mut out, b'2', [0, 0, 0, 0, 1, 4]);
    out.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
    out.extend_from_slice(b"ZZZ\0");

    let timecnt = transitions.len() as u32;
    let typecnt = types.len() as u32;
    header(&mut out, b'2', [0, 0, 0, timecnt, typecnt, 4]);
    for &(time, _) in transitions {
        out.extend_from_slice(&time.to_be_bytes());
    }
    for &(_, index) in transitions {
        out.push(index);
    }
    for &(offset, is_dst) in types {
        out.extend_from_slice(&offset.to_be_bytes());
        out.push(u8::from(is_dst));
        out.push(0);
    }
    out.extend_from_slice(b"ZZZ\0");
    out.push(b'\n');
    out.extend_from_slice(footer.as_bytes());
    out.push(b'\n');
    out
}

#[cfg(test)]
mod tests {
    use alloc::{vec, vec::Vec};

    use super::*;

    const HOUR: i32 = 3600;

    #[test]
    fn transitions_then_footer() {
        // 2000-01-01T00:00:00Z and 2010-01-01T00:00:00Z
        let data = build(
            &[(946_684_800, 1), (1_262_304_000, 0)],
            &[(0, false), (HOUR, true)],
            "<+02>-2",
        );
        let tzif = Tzif::parse("Test/Zone", &data).unwrap();
        assert_eq!(tzif.name(), "Test/Zone");
        let off = |s: i64| tzif.to_offset(s).seconds();
        assert_eq!(off(0), 0);
        assert_eq!(off(946_684_799), 0);
        assert_eq!(off(946_684_800), HOUR);
        // The last transition is covered by the footer.
        assert_eq!(off(1_262_304_000), 2 * HOUR);
        assert_eq!(off(2_000_000_000), 2 * HOUR);
    }

    #[test]
    fn no_transitions() {
        let data = build(&[], &[(5 * HOUR, false)], "");
        let tzif = Tzif::parse("Fixed", &data).unwrap();
        assert_eq!(tzif.to_offset(0).seconds(), 5 * HOUR);

        let data = build(&[], &[(0, false)], "EST5EDT,M3.2.0,M11.1.0");
        let tzif = Tzif::parse("Posix", &data).unwrap();
        // 2024-07-01T00:00:00Z
        assert_eq!(tzif.to_offset(1_719_792_000).seconds(), -4 * HOUR);
    }

    #[test]
    fn version1() {
        let mut data = build(&[], &[(0, false)], "");
        // Marking the data as version 1 means only the first block is read.
        data[4] = 0;
        let tzif = Tzif::parse("V1", &data).unwrap();
        assert_eq!(tzif.to_offset(0), Offset::UTC);
    }

    #[test]
    fn out_of_range_transition_is_clamped() {
        let data = build(&[(i64::MIN, 1)], &[(0, false), (HOUR, false)], "");
        let tzif = Tzif::parse("Clamped", &data).unwrap();
        assert_eq!(tzif.transitions[0], TRANSITION_MIN);
        assert_eq!(tzif.to_offset(0).seconds(), HOUR);
    }

    #[test]
    fn invalid() {
        let valid = build(&[(0, 1)], &[(0, false), (HOUR, false)], "");

        let cases: Vec<(&str, Vec<u8>)> = vec![
            ("empty", vec![]),
            ("magic", {
                let mut d = valid.clone();
                d[0] = b'X';
                d
            }),
            ("truncated", valid[..valid.len() - 3].to_vec()),
            ("type index", build(&[(0, 2)], &[(0, false)], "")),
            ("offset", build(&[], &[(100_000, false)], "")),
            ("order", build(&[(10, 0), (5, 0)], &[(0, false)], "")),
            ("footer", build(&[], &[(0, false)], "EST5EDT")),
        ];
        for (label, data) in cases {
            let err = Tzif::parse("Bad", &data).unwrap_err();
            assert!(err.is_time_zone(), "{label}: {err}");
        }
    }

    #[cfg(feature = "tzdb-bundle")]
    #[test]
    fn bundled_new_york() {
        let (name, data) = jiff_tzdb::get("America/New_York").unwrap();
        let tzif = Tzif::parse(name, data).unwrap();
        let off = |s: i64| tzif.to_offset(s).seconds() / HOUR;
        // 1970-03-01T00:00:00Z
        assert_eq!(off(5_097_600), -5);
        // 2024-07-01T00:00:00Z, after the last explicit transition.
        assert_eq!(off(1_719_792_000), -4);
        // 1883-11-18T17:00:00Z is local mean time before standardization.
        assert_eq!(tzif.to_offset(-2_717_650_800 - 1).seconds(), -17_762);
    }
}
