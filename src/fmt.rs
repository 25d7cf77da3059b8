//! This file ensures that defmt and log are optional, providing stubs if neither is available

#![macro_use]
#![allow(unused_macros)]

#[cfg(feature = "defmt")]
pub use defmt::bitflags;

#[cfg(not(feature = "defmt"))]
pub use bitflags::bitflags;

macro_rules! debug {
    ($($args:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::debug!($($args)*);
        #[cfg(feature = "log")]
        ::log::debug!($($args)*);
    }};
}

macro_rules! info {
    ($($args:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::info!($($args)*);
        #[cfg(feature = "log")]
        ::log::info!($($args)*);
    }};
}

macro_rules! warn {
    ($($args:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::warn!($($args)*);
        #[cfg(feature = "log")]
        ::log::warn!($($args)*);
    }};
}
