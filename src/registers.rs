//! These are low-level definitions for MAX17043 and similar chips

use crate::fmt::bitflags;

/// Default 7-bit bus address. Datasheets quote it in the 8-bit form, 0x6C
pub const DEFAULT_ADDRESS: u8 = 0x36;

/// This is a list of registers supported by the gauge. All of them are 16 bit wide,
/// most significant byte first
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    Vcell = 0x02,
    Soc = 0x04,
    Mode = 0x06,
    Version = 0x08,
    Hibrt = 0x0A,
    Config = 0x0C,
    Valrt = 0x14,
    Crate = 0x16,
    VresetId = 0x18,
    Status = 0x1A,
    Cmd = 0xFE,
}

impl Register {
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

/// Magic values for the write-only registers
pub mod commands {
    /// Written to MODE, restarts the fuel-gauge calculations
    pub const QUICK_START: u16 = 0x4000;

    /// Written to CMD, makes the chip behave as if power was removed
    pub const POWER_ON_RESET: u16 = 0x5400;
}

bitflags! {
    /// Contents of the CONFIG register. The upper byte (RCOMP) is not represented here
    pub struct ConfigFlags: u16 {
        const SLEEP = 1 << 7;
        const ALSC = 1 << 6;
        const ALRT = 1 << 5;
        const ATHD_MASK = 0x1F;
    }
}

impl ConfigFlags {
    /// Empty alert threshold, in percent. The register stores it as (32 - threshold)
    pub fn alert_threshold(&self) -> u8 {
        32 - (self.bits() & Self::ATHD_MASK.bits()) as u8
    }
}

impl From<u16> for ConfigFlags {
    fn from(value: u16) -> Self {
        ConfigFlags::from_bits_truncate(value)
    }
}
