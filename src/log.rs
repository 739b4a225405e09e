//! Logging shims forwarding to `defmt` when the feature is enabled.

#[cfg(feature = "defmt")]
macro_rules! trace {
    ($($arg:tt)*) => {{ defmt::trace!($($arg)*); }};
}

#[cfg(not(feature = "defmt"))]
macro_rules! trace {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{ $( let _ = &$arg; )* }};
}

#[cfg(feature = "defmt")]
macro_rules! debug {
    ($($arg:tt)*) => {{ defmt::debug!($($arg)*); }};
}

#[cfg(not(feature = "defmt"))]
macro_rules! debug {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{ $( let _ = &$arg; )* }};
}

#[cfg(feature = "defmt")]
macro_rules! warn_ {
    ($($arg:tt)*) => {{ defmt::warn!($($arg)*); }};
}

#[cfg(not(feature = "defmt"))]
macro_rules! warn_ {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{ $( let _ = &$arg; )* }};
}

pub(crate) use {debug, trace, warn_ as warn};
