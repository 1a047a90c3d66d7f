//! Lookup flash channel
//!
//! A read is the opcode byte and a 24-bit address shifted out MSB first,
//! then one data byte shifted in. The exposure table lives in the low
//! 20 bits of the address space.

use crate::config::{BusConfig, FlashConfig};

use super::{BusMaster, SerialLines};

/// Bits of the address field on the wire
pub const ADDRESS_BITS: u8 = 24;
/// Bits used by the exposure table
pub const LOOKUP_ADDRESS_MASK: u32 = 0xF_FFFF;
/// Opcode plus address
pub const COMMAND_BITS: u8 = 8 + ADDRESS_BITS;
pub const DATA_BITS: u8 = 8;

/// Flash master
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlashChannel {
    bus: BusMaster,
    opcode: u8,
    address: u32,
    value: u8,
    ready: bool,
}

impl FlashChannel {
    pub fn new(bus: &BusConfig, flash: &FlashConfig) -> Self {
        Self {
            bus: BusMaster::new(bus.mode, bus.half_period_ticks, COMMAND_BITS, DATA_BITS),
            opcode: flash.read_opcode,
            address: 0,
            value: 0,
            ready: false,
        }
    }

    /// Force the reset state
    pub fn reset(&mut self) {
        self.bus.reset();
        self.address = 0;
        self.value = 0;
        self.ready = false;
    }

    /// Begin reading the byte at `address`; false if a read is running
    pub fn start(&mut self, address: u32) -> bool {
        let address = address & LOOKUP_ADDRESS_MASK;
        let command = (self.opcode as u32) << ADDRESS_BITS | address;
        if !self.bus.start(command) {
            return false;
        }
        self.address = address;
        trace!("flash read {:#x}", address);
        true
    }

    /// Advance one tick; returns the byte on the tick it becomes ready
    pub fn tick(&mut self, miso: bool) -> Option<u8> {
        self.ready = false;
        let word = self.bus.tick(miso)?;

        self.value = word as u8;
        self.ready = true;
        debug!("flash {:#x} -> {:#x}", self.address, self.value);
        Some(self.value)
    }

    /// High for exactly the tick the data byte completed
    pub fn ready(&self) -> bool {
        self.ready
    }

    /// Last byte read
    pub fn value(&self) -> u8 {
        self.value
    }

    /// Address of the current (or last) read
    pub fn address(&self) -> u32 {
        self.address
    }

    pub fn lines(&self) -> SerialLines {
        self.bus.lines()
    }

    pub fn is_busy(&self) -> bool {
        self.bus.is_busy()
    }

    pub fn abort(&mut self) {
        self.bus.abort();
    }
}
