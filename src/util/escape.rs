/*!
Provides convenience routines for escaping raw bytes in error messages.

Parsers in this crate work on `&[u8]`, and the input they reject is not
guaranteed to be valid UTF-8 (for example, TZif data). These wrappers make it
possible to quote such input without a lossy conversion or an allocation.
*/

/// Displays a single byte as ASCII when it is printable, and as a `\xNN`
/// escape otherwise.
#[derive(Clone, Copy)]
pub(crate) struct Byte(pub(crate) u8);

impl core::fmt::Display for Byte {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self.0 {
            b'\0' => f.write_str("\\0"),
            b'\t' => f.write_str("\\t"),
            b'\n' => f.write_str("\\n"),
            b'\r' => f.write_str("\\r"),
            b'\\' => f.write_str("\\\\"),
            b @ 0x20..=0x7E => write!(f, "{}", char::from(b)),
            b => write!(f, "\\x{b:02X}"),
        }
    }
}

impl core::fmt::Debug for Byte {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "\"{self}\"")
    }
}

/// Displays a byte slice, writing valid UTF-8 sequences as-is (with control
/// characters escaped) and every invalid byte as a `\xNN` escape.
#[derive(Clone, Copy)]
pub(crate) struct Bytes<'a>(pub(crate) &'a [u8]);

impl<'a> core::fmt::Display for Bytes<'a> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut rest = self.0;
        while !rest.is_empty() {
            let (valid, invalid) = match core::str::from_utf8(rest) {
                Ok(s) => (s, &[][..]),
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    let len = err.error_len().unwrap_or(after.len());
                    let valid = core::str::from_utf8(valid)
                        .map_err(|_| core::fmt::Error)?;
                    (valid, &after[..len])
                }
            };
            for ch in valid.chars() {
                if ch.is_control() {
                    for esc in ch.escape_debug() {
                        write!(f, "{esc}")?;
                    }
                } else {
                    write!(f, "{ch}")?;
                }
            }
            for &b in invalid {
                write!(f, "\\x{b:02X}")?;
            }
            rest = &rest[valid.len() + invalid.len()..];
        }
        Ok(())
    }
}

impl<'a> core::fmt::Debug for Bytes<'a> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "\"{self}\"")
    }
}
