//! Conversions from raw register contents to engineering units

/// SOC register value meaning 100%. The high byte holds whole percents, the low
/// byte 1/256ths of a percent
const FULL_CHARGE: u16 = 100 * 256;

/// Converts the SOC register to per mille (0..=1000).
///
/// The gauge may report slightly more than 100% right after charging,
/// so the value is clamped first. Division truncates.
///
/// ```rust
/// # use max1704x::decode::to_per_mille;
/// assert_eq!(to_per_mille(0x0000), 0);
/// assert_eq!(to_per_mille(0x3280), 505);
/// assert_eq!(to_per_mille(0x6400), 1000);
/// assert_eq!(to_per_mille(0xFFFF), 1000);
/// ```
#[inline]
pub fn to_per_mille(raw: u16) -> u16 {
    let value = raw.min(FULL_CHARGE) as u32;

    (value * 10 / 256) as u16
}

/// Converts the VCELL register to millivolts.
///
/// One LSB is 78.125μV. The result is truncated, not rounded to the nearest millivolt.
///
/// ```rust
/// # use max1704x::decode::to_milli_volt;
/// assert_eq!(to_milli_volt(0), 0);
/// assert_eq!(to_milli_volt(0xD000), 4160);
/// assert_eq!(to_milli_volt(0xFFFF), 5119);
/// ```
#[inline]
pub fn to_milli_volt(raw: u16) -> u32 {
    (raw as u64 * 78_125 / 1_000_000) as u32
}
