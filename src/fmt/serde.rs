/*!
`Serialize` and `Deserialize` for [`Timestamp`].

A timestamp is serialized as its alternate `Display` string, e.g.,
`2024-07-01 12:00:00-04:00[America/New_York]`, and deserialized with
[`Timestamp::parse`]. Named time zones are therefore resolved through the
default database when deserializing. A POSIX time zone has no name, so it
comes back as a fixed offset.

# Example

```
use calstamp::Timestamp;

#[derive(Debug, serde::Deserialize, serde::Serialize)]
struct Record {
    at: Timestamp,
}

let record = Record { at: Timestamp::new_hms(2024, 7, 1, 12, 30, 0)? };
let json = serde_json::to_string(&record)?;
assert_eq!(json, r#"{"at":"2024-07-01 12:30:00"}"#);
let got: Record = serde_json::from_str(&json)?;
assert_eq!(got.at, record.at);

# Ok::<(), Box<dyn std::error::Error>>(())
```
*/

use crate::Timestamp;

impl serde::Serialize for Timestamp {
    #[inline]
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!("{self:#}"))
    }
}

impl<'de> serde::Deserialize<'de> for Timestamp {
    #[inline]
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Timestamp, D::Error> {
        use serde::de;

        struct TimestampVisitor;

        impl<'de> de::Visitor<'de> for TimestampVisitor {
            type Value = Timestamp;

            fn expecting(
                &self,
                f: &mut core::fmt::Formatter,
            ) -> core::fmt::Result {
                f.write_str("an ISO 8601 timestamp string")
            }

            #[inline]
            fn visit_bytes<E: de::Error>(
                self,
                value: &[u8],
            ) -> Result<Timestamp, E> {
                Timestamp::parse(value).map_err(de::Error::custom)
            }

            #[inline]
            fn visit_str<E: de::Error>(
                self,
                value: &str,
            ) -> Result<Timestamp, E> {
                self.visit_bytes(value.as_bytes())
            }
        }

        deserializer.deserialize_str(TimestampVisitor)
    }
}
