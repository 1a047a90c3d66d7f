//! Light sensor channel
//!
//! Receive-only. The sensor answers a select with a 15-bit frame: three
//! leading zeros, the 8-bit light value MSB first, four trailing bits.

use crate::config::BusConfig;

use super::{BusMaster, SerialLines};

/// Zero bits ahead of the payload
pub const LEADING_BITS: u8 = 3;
/// Payload width
pub const PAYLOAD_BITS: u8 = 8;
/// Bits clocked out after the payload
pub const TRAILING_BITS: u8 = 4;
/// Shift events per sensor frame
pub const FRAME_BITS: u8 = LEADING_BITS + PAYLOAD_BITS + TRAILING_BITS;

/// Extract the payload byte from a received frame
pub fn frame_payload(frame: u32) -> u8 {
    (frame >> TRAILING_BITS) as u8
}

/// Sensor master
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorChannel {
    bus: BusMaster,
    value: u8,
    ready: bool,
}

impl SensorChannel {
    pub fn new(config: &BusConfig) -> Self {
        Self {
            bus: BusMaster::new(config.mode, config.half_period_ticks, 0, FRAME_BITS),
            value: 0,
            ready: false,
        }
    }

    /// Force the reset state
    pub fn reset(&mut self) {
        self.bus.reset();
        self.value = 0;
        self.ready = false;
    }

    /// Begin a conversion; false if one is already running
    pub fn start(&mut self) -> bool {
        self.bus.start(0)
    }

    /// Advance one tick; returns the byte on the tick it becomes ready
    pub fn tick(&mut self, miso: bool) -> Option<u8> {
        self.ready = false;
        let frame = self.bus.tick(miso)?;

        self.value = frame_payload(frame);
        self.ready = true;
        debug!("sensor frame {:#x} -> {:#x}", frame, self.value);
        Some(self.value)
    }

    /// High for exactly the tick the last bit was shifted in
    pub fn ready(&self) -> bool {
        self.ready
    }

    /// Last received byte
    pub fn value(&self) -> u8 {
        self.value
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
