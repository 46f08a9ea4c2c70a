use alloc::{boxed::Box, sync::Arc};

pub(crate) mod civil;
pub(crate) mod fmt;
pub(crate) mod timestamp;
pub(crate) mod tz;

/// An error that can occur in this crate.
///
/// Every fallible operation in this crate returns this one error type. It
/// is one word in size, cheap to clone and carries a chain of causes. The
/// `Display` impl renders the whole chain, from the highest level context
/// down to the root cause, separated by `: `.
///
/// # Introspection
///
/// Three categories of failure are distinguished through predicates:
///
/// * [`Error::is_parse`] when a string did not match the accepted grammar.
/// * [`Error::is_range`] when a value fell outside its valid domain. For
/// example, month `13`, day `32` or an epoch value that lands outside of the
/// supported years `-9999..=9999`.
/// * [`Error::is_time_zone`] when a time zone identifier could not be found
/// in a time zone database, or its data could not be read.
///
/// The categories are not mutually exclusive. Parsing `2021-13-01` fails
/// because the month is out of range, so the error returned reports `true`
/// for both `is_parse` and `is_range`.
///
/// # Example
///
/// ```
/// use calstamp::Timestamp;
///
/// let err = Timestamp::new(2021, 13, 1).unwrap_err();
/// assert!(err.is_range());
/// assert!(!err.is_parse());
///
/// let err = "2021-13-01".parse::<Timestamp>().unwrap_err();
/// assert!(err.is_range());
/// assert!(err.is_parse());
/// ```
#[derive(Clone)]
pub struct Error {
    /// The internal representation of an error.
    ///
    /// This is in an `Arc` to make an `Error` cloneable even when it embeds
    /// a `std::io::Error`. It also keeps `Error` one word in size.
    inner: Option<Arc<ErrorInner>>,
}

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

impl Error {
    /// Creates a new error value from `core::fmt::Arguments`.
    ///
    /// This is mostly useful for implementations of
    /// [`TimeZoneDatabase`](crate::tz::TimeZoneDatabase) outside of this
    /// crate that want to report a failure with this crate's error type.
    ///
    /// # Example
    ///
    /// ```
    /// use calstamp::Error;
    ///
    /// let err = Error::from_args(format_args!("something failed"));
    /// assert_eq!(err.to_string(), "something failed");
    /// ```
    pub fn from_args<'a>(message: core::fmt::Arguments<'a>) -> Error {
        Error::from(ErrorKind::Adhoc(AdhocError::from_args(message)))
    }

    /// Returns true when the root cause of this error is a value being
    /// outside of its allowed range.
    ///
    /// # Example
    ///
    /// ```
    /// use calstamp::{Timestamp, Unit};
    ///
    /// assert!(Timestamp::new(2025, 2, 29).unwrap_err().is_range());
    /// assert!(Timestamp::new(2025, 1, 32).unwrap_err().is_range());
    /// assert!(Timestamp::from_epoch(i64::MAX, Unit::Second)
    ///     .unwrap_err()
    ///     .is_range());
    /// ```
    pub fn is_range(&self) -> bool {
        use self::{timestamp::Error as TimestampError, ErrorKind::*};

        matches!(
            *self.root().kind(),
            Range(_)
                | SlimRange(_)
                | TzAmbiguous(_)
                | Timestamp(
                    TimestampError::EpochNotFinite { .. }
                        | TimestampError::EpochOutOfRange { .. }
                )
        )
    }

    /// Returns true when this error was produced while parsing a string.
    ///
    /// Unlike [`Error::is_range`], this looks at every error in the causal
    /// chain, not just the root. This way, a syntactically valid string
    /// with an invalid value in it (such as `2021-02-30`) is still reported
    /// as a parse error.
    ///
    /// # Example
    ///
    /// ```
    /// use calstamp::Timestamp;
    ///
    /// assert!("2021-01-01X12".parse::<Timestamp>().unwrap_err().is_parse());
    /// assert!("2021-1-1".parse::<Timestamp>().unwrap_err().is_parse());
    /// assert!("2021-02-30".parse::<Timestamp>().unwrap_err().is_parse());
    /// ```
    pub fn is_parse(&self) -> bool {
        self.chain().any(|err| {
            matches!(*err.kind(), ErrorKind::Fmt(_) | ErrorKind::ParseInt(_))
        })
    }

    /// Returns true when this error was caused by a time zone that could
    /// not be found, or whose data could not be understood.
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::BTreeMap;
    ///
    /// use calstamp::{tz::TimeZone, Timestamp, Unit};
    ///
    /// // An empty database knows no time zones.
    /// let db: BTreeMap<String, TimeZone> = BTreeMap::new();
    /// let err =
    ///     Timestamp::from_epoch_in(0, Unit::Second, "Mars/Olympus", &db)
    ///         .unwrap_err();
    /// assert!(err.is_time_zone());
    /// ```
    pub fn is_time_zone(&self) -> bool {
        self.chain().any(|err| {
            matches!(
                *err.kind(),
                ErrorKind::TzDb(_) | ErrorKind::PosixTz(_) | ErrorKind::Tzif(_)
            )
        })
    }
}

impl Error {
    /// Creates a new error indicating that a `given` value is out of the
    /// specified `min..=max` range. The given `what` label is used in the
    /// error message as a human readable description of what exactly is out
    /// of range. (e.g., "month")
    #[inline(never)]
    #[cold]
    pub(crate) fn range(
        what: &'static str,
        given: impl Into<i128>,
        min: impl Into<i128>,
        max: impl Into<i128>,
    ) -> Error {
        Error::from(ErrorKind::Range(RangeError::new(what, given, min, max)))
    }

    /// Creates a new error indicating that a value is out of range, without
    /// recording the value or its bounds.
    #[inline(never)]
    #[cold]
    pub(crate) fn slim_range(what: &'static str) -> Error {
        Error::from(ErrorKind::SlimRange(SlimRangeError { what }))
    }

    /// Creates a new error from an integer parse failure.
    pub(crate) fn parse_int(err: crate::util::parse::ParseIntError) -> Error {
        Error::from(ErrorKind::ParseInt(err))
    }

    /// Creates a new error from the TZif parser's error type.
    pub(crate) fn tzif(err: crate::tz::tzif::TzifError) -> Error {
        Error::from(ErrorKind::Tzif(err))
    }

    /// Creates a new error from the POSIX time zone parser's error type.
    pub(crate) fn posix_tz(
        err: crate::tz::posix::PosixTimeZoneError,
    ) -> Error {
        Error::from(ErrorKind::PosixTz(err))
    }

    /// A convenience constructor for building an I/O error.
    ///
    /// Callers should generally attach a file path to this error with
    /// [`Error::path`].
    #[cfg(feature = "std")]
    #[inline(never)]
    #[cold]
    pub(crate) fn io(err: std::io::Error) -> Error {
        Error::from(ErrorKind::IO(IOError { err }))
    }

    /// Contextualizes this error by associating the given file path with it.
    #[cfg(feature = "std")]
    #[inline(never)]
    #[cold]
    pub(crate) fn path(self, path: impl Into<std::path::PathBuf>) -> Error {
        let err = Error::from(ErrorKind::FilePath(FilePathError {
            path: path.into(),
        }));
        self.context(err)
    }

    pub(crate) fn context(self, consequent: impl IntoError) -> Error {
        self.context_impl(consequent.into_error())
    }

    #[inline(never)]
    #[cold]
    fn context_impl(self, consequent: Error) -> Error {
        let mut err = consequent;
        let inner = err
            .inner
            .get_or_insert_with(|| Arc::new(ErrorInner::unknown()));
        // A consequent is always freshly built, so it has exactly one
        // reference. If that ever stops being true, keep the cause: it is
        // the root that the predicates on `Error` inspect.
        let Some(inner) = Arc::get_mut(inner) else { return self };
        assert!(inner.cause.is_none(), "cause of consequence must be `None`");
        inner.cause = Some(self);
        err
    }

    /// Returns the root error in this chain.
    fn root(&self) -> &Error {
        let mut err = self;
        while let Some(cause) =
            err.inner.as_ref().and_then(|inner| inner.cause.as_ref())
        {
            err = cause;
        }
        err
    }

    /// Returns a chain of error values.
    ///
    /// This starts with the most recent error added to the chain. That is,
    /// the highest level context. The last error in the chain is always the
    /// "root" cause.
    ///
    /// The iterator returned always yields at least one error.
    fn chain(&self) -> impl Iterator<Item = &Error> {
        let mut err = self;
        core::iter::once(err).chain(core::iter::from_fn(move || {
            err = err.inner.as_ref().and_then(|inner| inner.cause.as_ref())?;
            Some(err)
        }))
    }

    /// Returns the kind of this error.
    fn kind(&self) -> &ErrorKind {
        self.inner
            .as_ref()
            .map(|inner| &inner.kind)
            .unwrap_or(&ErrorKind::Unknown)
    }
}

impl ErrorInner {
    fn unknown() -> ErrorInner {
        ErrorInner { kind: ErrorKind::Unknown, cause: None }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut it = self.chain().peekable();
        while let Some(err) = it.next() {
            core::fmt::Display::fmt(err.kind(), f)?;
            if it.peek().is_some() {
                f.write_str(": ")?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if !f.alternate() {
            return core::fmt::Display::fmt(self, f);
        }
        let Some(ref inner) = self.inner else {
            return f.debug_struct("Error").field("kind", &"None").finish();
        };
        f.debug_struct("Error")
            .field("kind", &inner.kind)
            .field("cause", &inner.cause)
            .finish()
    }
}

/// The underlying kind of a [`Error`].
#[derive(Debug)]
enum ErrorKind {
    Adhoc(AdhocError),
    Civil(self::civil::Error),
    #[allow(dead_code)] // not used in some feature configs
    FilePath(FilePathError),
    Fmt(self::fmt::Error),
    #[allow(dead_code)] // not used in some feature configs
    IO(IOError),
    ParseInt(crate::util::parse::ParseIntError),
    PosixTz(crate::tz::posix::PosixTimeZoneError),
    Range(RangeError),
    SlimRange(SlimRangeError),
    Timestamp(self::timestamp::Error),
    TzAmbiguous(self::tz::ambiguous::Error),
    TzDb(self::tz::db::Error),
    TzOffset(self::tz::offset::Error),
    Tzif(crate::tz::tzif::TzifError),
    Unknown,
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::ErrorKind::*;

        match *self {
            Adhoc(ref msg) => msg.fmt(f),
            Civil(ref err) => err.fmt(f),
            FilePath(ref err) => err.fmt(f),
            Fmt(ref err) => err.fmt(f),
            IO(ref err) => err.fmt(f),
            ParseInt(ref err) => err.fmt(f),
            PosixTz(ref err) => err.fmt(f),
            Range(ref err) => err.fmt(f),
            SlimRange(ref err) => err.fmt(f),
            Timestamp(ref err) => err.fmt(f),
            TzAmbiguous(ref err) => err.fmt(f),
            TzDb(ref err) => err.fmt(f),
            TzOffset(ref err) => err.fmt(f),
            Tzif(ref err) => err.fmt(f),
            Unknown => f.write_str("unknown calstamp error"),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error { inner: Some(Arc::new(ErrorInner { kind, cause: None })) }
    }
}

/// A generic error message.
///
/// This backs the public `Error::from_args` constructor.
struct AdhocError {
    message: Box<str>,
}

impl AdhocError {
    fn from_args<'a>(message: core::fmt::Arguments<'a>) -> AdhocError {
        use alloc::string::ToString;

        AdhocError { message: message.to_string().into_boxed_str() }
    }
}

impl core::fmt::Display for AdhocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.message, f)
    }
}

impl core::fmt::Debug for AdhocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.message, f)
    }
}

/// An error that occurs when an input value is out of bounds.
///
/// The error message produced by this type will include a name describing
/// which input was out of bounds, the value given and its minimum and maximum
/// allowed values.
#[derive(Debug)]
struct RangeError {
    what: &'static str,
    given: i128,
    min: i128,
    max: i128,
}

impl RangeError {
    fn new(
        what: &'static str,
        given: impl Into<i128>,
        min: impl Into<i128>,
        max: impl Into<i128>,
    ) -> RangeError {
        RangeError {
            what,
            given: given.into(),
            min: min.into(),
            max: max.into(),
        }
    }
}

impl core::fmt::Display for RangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let RangeError { what, given, min, max } = *self;
        write!(
            f,
            "parameter '{what}' with value {given} \
             is not in the required range of {min}..={max}",
        )
    }
}

/// A slim error that occurs when an input value is out of bounds.
///
/// Unlike `RangeError`, this only includes a static description of the
/// value that is out of bounds.
#[derive(Clone, Debug)]
struct SlimRangeError {
    what: &'static str,
}

impl core::fmt::Display for SlimRangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let SlimRangeError { what } = *self;
        write!(f, "parameter '{what}' is not in the required range")
    }
}

/// A `std::io::Error`.
///
/// When `std` is not enabled, a value of this type can never be
/// constructed.
struct IOError {
    #[cfg(feature = "std")]
    err: std::io::Error,
}

impl core::fmt::Display for IOError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        #[cfg(feature = "std")]
        {
            write!(f, "{}", self.err)
        }
        #[cfg(not(feature = "std"))]
        {
            write!(f, "<BUG: SHOULD NOT EXIST>")
        }
    }
}

impl core::fmt::Debug for IOError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        #[cfg(feature = "std")]
        {
            f.debug_struct("IOError").field("err", &self.err).finish()
        }
        #[cfg(not(feature = "std"))]
        {
            write!(f, "<BUG: SHOULD NOT EXIST>")
        }
    }
}

struct FilePathError {
    #[cfg(feature = "std")]
    path: std::path::PathBuf,
}

impl core::fmt::Display for FilePathError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        #[cfg(feature = "std")]
        {
            write!(f, "{}", self.path.display())
        }
        #[cfg(not(feature = "std"))]
        {
            write!(f, "<BUG: SHOULD NOT EXIST>")
        }
    }
}

impl core::fmt::Debug for FilePathError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        #[cfg(feature = "std")]
        {
            f.debug_struct("FilePathError").field("path", &self.path).finish()
        }
        #[cfg(not(feature = "std"))]
        {
            write!(f, "<BUG: SHOULD NOT EXIST>")
        }
    }
}

/// A simple trait to encapsulate automatic conversion to `Error`.
///
/// This lets `Error::context` accept the structured per-module error enums
/// without making their `From` impls part of the public API.
pub(crate) trait IntoError {
    fn into_error(self) -> Error;
}

impl IntoError for Error {
    #[inline(always)]
    fn into_error(self) -> Error {
        self
    }
}

/// A trait for contextualizing error values.
///
/// This makes it easy to contextualize either `Error` or `Result<T, Error>`
/// without calling `map_err` everywhere.
pub(crate) trait ErrorContext<T, E> {
    /// Contextualize the given consequent error with this (`self`) error as
    /// the cause.
    ///
    /// This is equivalent to saying that "consequent is caused by self."
    fn context(self, consequent: impl IntoError) -> Result<T, Error>;

    /// Like `context`, but hides error construction within a closure.
    ///
    /// This avoids paying for building the consequent in the happy path.
    fn with_context<C: IntoError>(
        self,
        consequent: impl FnOnce() -> C,
    ) -> Result<T, Error>;
}

impl<T, E> ErrorContext<T, E> for Result<T, E>
where
    E: IntoError,
{
    fn context(self, consequent: impl IntoError) -> Result<T, Error> {
        self.map_err(|err| {
            err.into_error().context_impl(consequent.into_error())
        })
    }

    fn with_context<C: IntoError>(
        self,
        consequent: impl FnOnce() -> C,
    ) -> Result<T, Error> {
        self.map_err(|err| {
            err.into_error().context_impl(consequent().into_error())
        })
    }
}
