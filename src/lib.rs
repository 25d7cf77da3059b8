#![cfg_attr(not(test), no_std)]

//! A small async driver for Maxim MAX1704x fuel gauges (written for MAX17043)
//!
//! The gauge is reached either over a plain I2C bus ([`FuelGauge`]) or through a
//! register-addressed helper bus ([`BatteryGauge`]). Both expose the same API:
//!
//! ```rust,ignore
//! let gauge: FuelGauge<NoopRawMutex, _, _> = Gauge::new(
//!     TransferInterface::new(i2c, registers::DEFAULT_ADDRESS),
//!     delay,
//!     Config::default(),
//! );
//!
//! let charge = gauge.per_mille().await?;
//! let voltage = gauge.milli_volt().await?;
//! ```

pub(crate) mod fmt;

pub mod accessor;
pub mod alert;
pub mod decode;
pub mod interface;
pub mod registers;

#[cfg(test)]
pub(crate) mod mock;

use embassy_futures::select::{select, Either};
use embassy_sync::{blocking_mutex::raw::RawMutex, mutex::Mutex};
use embedded_hal_async::delay;

use accessor::RegisterAccessor;
use interface::{Interface, RegisterInterface, TransferInterface};
use registers::{commands, ConfigFlags, Register};

/// Chip error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The bus transaction failed; nothing was decoded
    Bus(E),
    /// Another request is still in flight on this device
    Busy,
    /// The bus did not complete the transaction in time
    Timeout,
    /// The chip or the driver cannot do that
    Unsupported,
}

/// Driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// 7-bit bus address
    pub address: u8,

    /// Upper bound for a single register transaction
    pub timeout_ms: u32,
}

impl Config {
    pub const fn with_address(self, address: u8) -> Self {
        Self { address, ..self }
    }

    pub const fn with_timeout_ms(self, timeout_ms: u32) -> Self {
        Self { timeout_ms, ..self }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: registers::DEFAULT_ADDRESS,
            timeout_ms: 100,
        }
    }
}

/// Gauge on a plain I2C bus
pub type FuelGauge<M, I, D> = Gauge<M, TransferInterface<I>, D>;

/// Gauge behind a register-addressed helper bus
pub type BatteryGauge<M, B, D> = Gauge<M, RegisterInterface<B>, D>;

struct Inner<IF, D> {
    accessor: RegisterAccessor<IF>,
    delay: D,
}

/// Chip handle.
///
/// Requests borrow the handle immutably so it can be shared between tasks, but only
/// one of them may talk to the chip at a time: a request made while another one is
/// in flight fails with [`Error::Busy`]. Dropping a request future cancels it.
pub struct Gauge<M: RawMutex, IF, D> {
    inner: Mutex<M, Inner<IF, D>>,
    timeout_ms: u32,
}

impl<M, IF, D> Gauge<M, IF, D>
where
    M: RawMutex,
    IF: Interface,
    D: delay::DelayNs,
{
    /// Per-mille change notifications need the ALSC alert, which is not wired up
    pub const SUPPORTS_CHANGE_NOTIFICATION: bool = false;

    /// Creates the driver instance. The interface carries the bus address,
    /// `config.address` is only used by [`Gauge::new_i2c`] and [`Gauge::new_register_bus`]
    pub fn new(interface: IF, delay: D, config: Config) -> Self {
        Self {
            inner: Mutex::new(Inner {
                accessor: RegisterAccessor::new(interface),
                delay,
            }),
            timeout_ms: config.timeout_ms,
        }
    }

    /// Returns true while a request is in flight
    pub fn is_busy(&self) -> bool {
        self.inner.try_lock().is_err()
    }

    /// Reads any register, raw
    pub async fn read_register(&self, register: Register) -> Result<u16, Error<IF::Error>> {
        let mut inner = self.inner.try_lock().map_err(|_| {
            warn!("read {:02x} rejected, busy", register.addr());
            Error::Busy
        })?;
        let Inner { accessor, delay } = &mut *inner;

        match select(accessor.read(register), delay.delay_ms(self.timeout_ms)).await {
            Either::First(result) => result.map_err(|e| {
                warn!("read {:02x} failed", register.addr());
                Error::Bus(e)
            }),
            Either::Second(()) => {
                warn!("read {:02x} timed out", register.addr());
                Err(Error::Timeout)
            }
        }
    }

    /// Writes any register, raw
    pub async fn write_register(
        &self,
        register: Register,
        value: u16,
    ) -> Result<(), Error<IF::Error>> {
        let mut inner = self.inner.try_lock().map_err(|_| {
            warn!("write {:02x} rejected, busy", register.addr());
            Error::Busy
        })?;
        let Inner { accessor, delay } = &mut *inner;

        match select(
            accessor.write(register, value),
            delay.delay_ms(self.timeout_ms),
        )
        .await
        {
            Either::First(result) => result.map_err(|e| {
                warn!("write {:02x} failed", register.addr());
                Error::Bus(e)
            }),
            Either::Second(()) => {
                warn!("write {:02x} timed out", register.addr());
                Err(Error::Timeout)
            }
        }
    }

    /// Reads the state of charge in per mille
    pub async fn per_mille(&self) -> Result<u16, Error<IF::Error>> {
        let raw = self.read_register(Register::Soc).await?;
        Ok(decode::to_per_mille(raw))
    }

    /// Reads the cell voltage in millivolts
    pub async fn milli_volt(&self) -> Result<u16, Error<IF::Error>> {
        let raw = self.read_register(Register::Vcell).await?;

        // Full scale is 5119mV
        Ok(decode::to_milli_volt(raw) as u16)
    }

    /// Subscribes to per-mille changes. Not supported, see [`Self::SUPPORTS_CHANGE_NOTIFICATION`]
    pub fn set_per_mille_change_callback(
        &self,
        _callback: fn(u16),
    ) -> Result<(), Error<IF::Error>> {
        Err(Error::Unsupported)
    }

    /// Cancels a subscription made by [`Self::set_per_mille_change_callback`]
    pub fn cancel_callback(&self, _callback: fn(u16)) -> Result<(), Error<IF::Error>> {
        Err(Error::Unsupported)
    }

    /// Gets the production version
    pub async fn version(&self) -> Result<u16, Error<IF::Error>> {
        self.read_register(Register::Version).await
    }

    /// Reads the lower half of the CONFIG register
    pub async fn config(&self) -> Result<ConfigFlags, Error<IF::Error>> {
        let raw = self.read_register(Register::Config).await?;
        Ok(ConfigFlags::from(raw))
    }

    /// Restarts fuel-gauge calculations, as if the battery was just inserted
    pub async fn quick_start(&self) -> Result<(), Error<IF::Error>> {
        info!("quick start");
        self.write_register(Register::Mode, commands::QUICK_START)
            .await
    }

    /// Power-on reset. Some chip revisions reset before acknowledging the write,
    /// in which case this reports a bus error
    pub async fn reset(&self) -> Result<(), Error<IF::Error>> {
        info!("performing power-on reset...");
        self.write_register(Register::Cmd, commands::POWER_ON_RESET)
            .await
    }

    /// Consumes the driver and returns the interface and delay
    pub fn release(self) -> (IF, D) {
        let Inner { accessor, delay } = self.inner.into_inner();
        (accessor.release(), delay)
    }
}

impl<M, I, D> Gauge<M, TransferInterface<I>, D>
where
    M: RawMutex,
    I: embedded_hal_async::i2c::I2c,
    D: delay::DelayNs,
{
    /// Creates the driver on a plain I2C bus
    pub fn new_i2c(i2c: I, delay: D, config: Config) -> Self {
        Self::new(TransferInterface::new(i2c, config.address), delay, config)
    }
}

impl<M, B, D> Gauge<M, RegisterInterface<B>, D>
where
    M: RawMutex,
    B: interface::RegisterBus,
    D: delay::DelayNs,
{
    /// Creates the driver behind a register-addressed bus
    pub fn new_register_bus(bus: B, delay: D, config: Config) -> Self {
        Self::new(RegisterInterface::new(bus, config.address), delay, config)
    }
}
