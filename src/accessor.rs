//! Single register transactions on top of an [`Interface`]

use byteorder::{BigEndian, ByteOrder};

use crate::interface::{Interface, RX_LEN, TX_LEN};
use crate::registers::Register;

/// Owns the bus interface and the transient buffers. Every call performs exactly
/// one bus transaction; `&mut self` guarantees there is never a second one in flight.
pub struct RegisterAccessor<IF> {
    interface: IF,
    tx: [u8; TX_LEN],
    rx: [u8; RX_LEN],
}

impl<IF> RegisterAccessor<IF>
where
    IF: Interface,
{
    pub fn new(interface: IF) -> Self {
        Self {
            interface,
            tx: [0; TX_LEN],
            rx: [0; RX_LEN],
        }
    }

    /// Reads a 16-bit register. On bus failure the receive buffer is not decoded
    pub async fn read(&mut self, register: Register) -> Result<u16, IF::Error> {
        self.interface
            .read(register, &mut self.tx, &mut self.rx)
            .await?;

        let value = BigEndian::read_u16(&self.rx);
        debug!("read {:02x} -> {:04x}", register.addr(), value);

        Ok(value)
    }

    /// Writes a 16-bit register
    pub async fn write(&mut self, register: Register, value: u16) -> Result<(), IF::Error> {
        let mut payload = [0; RX_LEN];
        BigEndian::write_u16(&mut payload, value);

        debug!("write {:02x} <- {:04x}", register.addr(), value);

        self.interface.write(register, payload, &mut self.tx).await
    }

    pub fn release(self) -> IF {
        self.interface
    }
}
