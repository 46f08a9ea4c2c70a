// Not every macro is used in every feature configuration.
#![allow(unused_macros)]

/// Dispatches to the given `log` crate macro, but only when the `logging`
/// feature is enabled. Otherwise the whole invocation disappears, arguments
/// included.
macro_rules! log {
    ($level:ident, $($tt:tt)*) => {{
        #[cfg(feature = "logging")]
        {
            log::$level!($($tt)*);
        }
    }}
}

macro_rules! error {
    ($($tt:tt)*) => { log!(error, $($tt)*) }
}

macro_rules! warn {
    ($($tt:tt)*) => { log!(warn, $($tt)*) }
}

macro_rules! info {
    ($($tt:tt)*) => { log!(info, $($tt)*) }
}

macro_rules! debug {
    ($($tt:tt)*) => { log!(debug, $($tt)*) }
}

macro_rules! trace {
    ($($tt:tt)*) => { log!(trace, $($tt)*) }
}
