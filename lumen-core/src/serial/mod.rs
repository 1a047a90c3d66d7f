//! Bit-level serial masters
//!
//! Both peripherals hang off their own select/clock/data bundle. A
//! [`BusMaster`] generates the select and clock waveforms for one
//! transaction and routes every clock transition to the shift registers as
//! it happens, so a tick costs the same whatever the frame length:
//!
//! ```text
//! select  ‾‾‾‾\________________________________/‾‾‾‾
//! clock   ‾‾‾‾‾‾‾\_/‾\_/‾\_/ ... ‾\_/‾\_/‾‾‾‾‾‾‾‾‾‾   (mode 3)
//!                 ^ present   ^ capture
//! ```
//!
//! - [`sensor`] - receive-only light sensor frame
//! - [`flash`] - command + address out, data byte back

pub mod bus;
pub mod flash;
pub mod sensor;
pub mod shift;

pub use bus::BusMaster;
pub use flash::FlashChannel;
pub use sensor::SensorChannel;
pub use shift::{ShiftIn, ShiftOut};

use lumen_hal::spi::Mode;

/// Levels driven on one peripheral bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SerialLines {
    /// Chip select, active-low
    pub select: bool,
    pub clock: bool,
    /// Master out, slave in
    pub mosi: bool,
}

impl SerialLines {
    /// Bundle levels between transactions
    pub fn idle(mode: Mode) -> Self {
        Self {
            select: true,
            clock: mode.idle_level(),
            mosi: false,
        }
    }

    /// Whether the peripheral is currently selected
    pub fn selected(&self) -> bool {
        !self.select
    }
}

/// Line transitions delivered to a shift register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineEvent {
    /// Select went low; framing restarts from bit 0
    SelectAsserted,
    /// Clock moved to its capture edge; the data line is valid
    Capture,
    /// Select went high
    SelectReleased,
}
