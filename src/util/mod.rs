pub(crate) mod escape;
pub(crate) mod itime;
#[cfg(not(feature = "std"))]
pub(crate) mod libm;
pub(crate) mod parse;
