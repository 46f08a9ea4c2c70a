/*!
Parsing and printing of ISO 8601-like datetime strings.

The accepted grammar is documented on
[`Timestamp::parse`](crate::Timestamp::parse). Printing is driven by the
`Display` impls of the crate's public types. With the `serde` feature
enabled, this module also provides the `Serialize` and `Deserialize` impls
for [`Timestamp`](crate::Timestamp).
*/

pub(crate) mod parser;
pub(crate) mod printer;
#[cfg(feature = "serde")]
mod serde;

/// The result of parsing a value out of a slice of bytes.
///
/// This contains the parsed value and the offset into the slice where
/// parsing stopped.
#[derive(Debug)]
pub(crate) struct Parsed<'i, V> {
    /// The value parsed.
    pub(crate) value: V,
    /// The remaining unparsed input.
    pub(crate) input: &'i [u8],
}

impl<'i, V> Parsed<'i, V> {
    /// Ensures that the parsed value represents the entire input. This occurs
    /// precisely when the `input` on this parsed value is empty.
    ///
    /// This is useful when one expects a parsed value to consume the entire
    /// input, and to consider it an error if it doesn't.
    pub(crate) fn into_full(self) -> Result<V, crate::Error> {
        if self.input.is_empty() {
            return Ok(self.value);
        }
        Err(crate::error::fmt::Error::trailing_input(self.input).into())
    }
}
