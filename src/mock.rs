//! In-memory stand-ins for the bus, delay and alert pin, used by the unit tests

use core::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

use embassy_sync::{blocking_mutex::raw::NoopRawMutex, signal::Signal};
use embedded_hal::digital;
use embedded_hal_async::{delay::DelayNs, digital::Wait, i2c};

use crate::interface::RegisterBus;
use crate::registers::{Register, DEFAULT_ADDRESS};

pub type Gate = Signal<NoopRawMutex, ()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Delay(u32),
    FallingEdge,
}

pub type Journal = Rc<RefCell<Vec<Event>>>;

/// Register file shared by both bus mocks
pub struct Chip<'a> {
    registers: [u16; 256],
    addr: u8,
    fail: bool,
    stall: bool,
    gate: Option<&'a Gate>,
}

impl<'a> Chip<'a> {
    fn new() -> Self {
        Self {
            registers: [0; 256],
            addr: DEFAULT_ADDRESS,
            fail: false,
            stall: false,
            gate: None,
        }
    }

    /// Everything that happens before the chip answers
    async fn begin(&mut self, address: u8) -> Result<(), i2c::ErrorKind> {
        if let Some(gate) = self.gate.take() {
            gate.wait().await;
        }

        if self.stall {
            core::future::pending::<()>().await;
        }

        if address != self.addr {
            return Err(i2c::ErrorKind::NoAcknowledge(
                i2c::NoAcknowledgeSource::Address,
            ));
        }

        if core::mem::take(&mut self.fail) {
            return Err(i2c::ErrorKind::Bus);
        }

        Ok(())
    }

    fn load(&self, register: u8, buffer: &mut [u8]) {
        let bytes = self.registers[register as usize].to_be_bytes();
        buffer.copy_from_slice(&bytes[..buffer.len()]);
    }

    fn store(&mut self, register: u8, data: &[u8]) {
        if let [hi, lo] = data {
            self.registers[register as usize] = u16::from_be_bytes([*hi, *lo]);
        }
    }
}

/// Knobs shared by both bus mocks
pub trait ChipControls<'a> {
    fn chip(&self) -> &Chip<'a>;
    fn chip_mut(&mut self) -> &mut Chip<'a>;

    fn set_register(&mut self, register: Register, value: u16) {
        self.chip_mut().registers[register.addr() as usize] = value;
    }

    fn register(&self, register: Register) -> u16 {
        self.chip().registers[register.addr() as usize]
    }

    /// The next transaction fails with a bus error
    fn fail_next(&mut self) {
        self.chip_mut().fail = true;
    }

    /// Transactions never complete
    fn stall(&mut self) {
        self.chip_mut().stall = true;
    }

    /// The next transaction waits until `gate` is signalled
    fn hold_until(&mut self, gate: &'a Gate) {
        self.chip_mut().gate = Some(gate);
    }
}

/// A plain I2C bus with a gauge attached
pub struct MockI2c<'a> {
    chip: Chip<'a>,
    pointer: u8,
}

impl<'a> MockI2c<'a> {
    pub fn new() -> Self {
        Self {
            chip: Chip::new(),
            pointer: 0,
        }
    }
}

impl<'a> ChipControls<'a> for MockI2c<'a> {
    fn chip(&self) -> &Chip<'a> {
        &self.chip
    }

    fn chip_mut(&mut self) -> &mut Chip<'a> {
        &mut self.chip
    }
}

impl i2c::ErrorType for MockI2c<'_> {
    type Error = i2c::ErrorKind;
}

impl i2c::I2c for MockI2c<'_> {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [i2c::Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.chip.begin(address).await?;

        for operation in operations.iter_mut() {
            match operation {
                i2c::Operation::Write(bytes) => {
                    if let Some((register, data)) = bytes.split_first() {
                        self.pointer = *register;
                        self.chip.store(*register, data);
                    }
                }
                i2c::Operation::Read(buffer) => self.chip.load(self.pointer, buffer),
            }
        }

        Ok(())
    }
}

/// A register-addressed helper bus with a gauge attached
pub struct MockBus<'a> {
    chip: Chip<'a>,
    last_payload: [u8; 2],
}

impl<'a> MockBus<'a> {
    pub fn new() -> Self {
        Self {
            chip: Chip::new(),
            last_payload: [0; 2],
        }
    }

    pub fn last_payload(&self) -> [u8; 2] {
        self.last_payload
    }
}

impl<'a> ChipControls<'a> for MockBus<'a> {
    fn chip(&self) -> &Chip<'a> {
        &self.chip
    }

    fn chip_mut(&mut self) -> &mut Chip<'a> {
        &mut self.chip
    }
}

impl RegisterBus for MockBus<'_> {
    type Error = i2c::ErrorKind;

    async fn read(
        &mut self,
        address: u8,
        register: u8,
        buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.chip.begin(address).await?;
        self.chip.load(register, buffer);
        Ok(())
    }

    async fn write(&mut self, address: u8, register: u8, buffer: &[u8]) -> Result<(), Self::Error> {
        self.chip.begin(address).await?;
        self.last_payload.copy_from_slice(buffer);
        self.chip.store(register, buffer);
        Ok(())
    }
}

/// Delay that writes itself down and then either completes immediately or never
#[derive(Default)]
pub struct MockDelay {
    journal: Journal,
    endless: bool,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn endless() -> Self {
        Self {
            endless: true,
            ..Self::default()
        }
    }

    pub fn with_journal(journal: Journal) -> Self {
        Self {
            journal,
            endless: false,
        }
    }

    async fn elapse(&mut self, ms: u32) {
        self.journal.borrow_mut().push(Event::Delay(ms));

        if self.endless {
            core::future::pending::<()>().await;
        }
    }

    pub fn journal(&self) -> Vec<Event> {
        self.journal.borrow().clone()
    }
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.elapse(ns / 1_000_000).await
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.elapse(ms).await
    }
}

/// Alert line that produces a fixed number of falling edges, then breaks
pub struct MockPin {
    edges: u32,
    journal: Journal,
}

impl MockPin {
    pub fn new(edges: u32, journal: Journal) -> Self {
        Self { edges, journal }
    }
}

impl digital::ErrorType for MockPin {
    type Error = digital::ErrorKind;
}

impl MockPin {
    fn edge(&mut self) -> Result<(), digital::ErrorKind> {
        if self.edges == 0 {
            return Err(digital::ErrorKind::Other);
        }

        self.edges -= 1;
        self.journal.borrow_mut().push(Event::FallingEdge);
        Ok(())
    }
}

impl Wait for MockPin {
    async fn wait_for_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn wait_for_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn wait_for_rising_edge(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn wait_for_falling_edge(&mut self) -> Result<(), Self::Error> {
        self.edge()
    }

    async fn wait_for_any_edge(&mut self) -> Result<(), Self::Error> {
        self.edge()
    }
}
