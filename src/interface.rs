//! The gauge is wired up in two different ways in practice: either to a plain I2C
//! peripheral that does raw write-then-read transfers, or to a helper bus which
//! takes the register byte separately and only moves the payload. Both are
//! hidden behind [`Interface`] so that the rest of the driver doesn't care.

use embedded_hal_async::i2c;

use crate::registers::Register;

/// Transmit buffer: register address plus up to two data bytes
pub const TX_LEN: usize = 3;

/// Receive buffer: one 16-bit register
pub const RX_LEN: usize = 2;

/// Bus capability required by the register accessor.
///
/// The buffers belong to the caller and are reused between transactions,
/// an implementation decides how the frame is laid out in them.
#[allow(async_fn_in_trait)]
pub trait Interface {
    type Error;

    /// Reads `register` into `rx`, most significant byte first
    async fn read(
        &mut self,
        register: Register,
        tx: &mut [u8; TX_LEN],
        rx: &mut [u8; RX_LEN],
    ) -> Result<(), Self::Error>;

    /// Writes the big-endian `value` (already placed in `payload`) into `register`
    async fn write(
        &mut self,
        register: Register,
        payload: [u8; RX_LEN],
        tx: &mut [u8; TX_LEN],
    ) -> Result<(), Self::Error>;
}

/// A bus that addresses registers on its own, e.g. a vendor HAL "register read/write" helper
#[allow(async_fn_in_trait)]
pub trait RegisterBus {
    type Error;

    async fn read(&mut self, address: u8, register: u8, buffer: &mut [u8])
        -> Result<(), Self::Error>;

    async fn write(&mut self, address: u8, register: u8, buffer: &[u8])
        -> Result<(), Self::Error>;
}

/// Raw transfer over an `embedded-hal-async` I2C bus. The register address is the
/// first transmitted byte
pub struct TransferInterface<I> {
    i2c: I,
    addr: u8,
}

impl<I> TransferInterface<I> {
    pub fn new(i2c: I, addr: u8) -> Self {
        Self { i2c, addr }
    }

    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I, E> Interface for TransferInterface<I>
where
    I: i2c::I2c<Error = E>,
{
    type Error = E;

    async fn read(
        &mut self,
        register: Register,
        tx: &mut [u8; TX_LEN],
        rx: &mut [u8; RX_LEN],
    ) -> Result<(), E> {
        tx[0] = register.addr();

        self.i2c.write_read(self.addr, &tx[..1], rx).await
    }

    async fn write(
        &mut self,
        register: Register,
        payload: [u8; RX_LEN],
        tx: &mut [u8; TX_LEN],
    ) -> Result<(), E> {
        tx[0] = register.addr();
        tx[1..].copy_from_slice(&payload);

        self.i2c.write(self.addr, &tx[..]).await
    }
}

/// Register-addressed transfer. Only the payload goes through the transmit buffer
pub struct RegisterInterface<B> {
    bus: B,
    addr: u8,
}

impl<B> RegisterInterface<B> {
    pub fn new(bus: B, addr: u8) -> Self {
        Self { bus, addr }
    }

    pub fn release(self) -> B {
        self.bus
    }
}

impl<B, E> Interface for RegisterInterface<B>
where
    B: RegisterBus<Error = E>,
{
    type Error = E;

    async fn read(
        &mut self,
        register: Register,
        _tx: &mut [u8; TX_LEN],
        rx: &mut [u8; RX_LEN],
    ) -> Result<(), E> {
        self.bus.read(self.addr, register.addr(), rx).await
    }

    async fn write(
        &mut self,
        register: Register,
        payload: [u8; RX_LEN],
        tx: &mut [u8; TX_LEN],
    ) -> Result<(), E> {
        tx[..RX_LEN].copy_from_slice(&payload);

        self.bus
            .write(self.addr, register.addr(), &tx[..RX_LEN])
            .await
    }
}
