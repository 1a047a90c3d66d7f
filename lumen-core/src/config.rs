//! Configuration types
//!
//! Every tunable of the controller, expressed in ticks. The defaults
//! reproduce the reference board. With the `serde` feature a configuration
//! can be stored as postcard binary data and loaded back.

use lumen_hal::spi::Mode;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Upper bound on the postcard encoding of [`ControllerConfig`]
pub const CONFIG_MAX_SIZE: usize = 32;

/// Errors from validating or decoding a configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Press thresholds are not strictly ascending
    ThresholdOrder,
    /// A period or threshold that must be non-zero is zero
    ZeroPeriod,
    /// Encoder origin or detent code does not fit its field
    OriginOutOfRange,
    /// Stored bytes could not be encoded or decoded
    Encoding,
}

/// Quadrature decoder configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EncoderConfig {
    /// Position after reset and after every menu transition (4-bit)
    pub origin: u8,
    /// Line code `(A << 1) | B` at which the knob rests between detents
    pub detent: u8,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            origin: 0x8,
            detent: 0b00,
        }
    }
}

/// Press classifier thresholds, in ticks held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ButtonConfig {
    /// Shortest hold that counts as a press at all
    pub short_ticks: u16,
    /// Hold at which a press becomes medium; anything longer is long
    pub medium_ticks: u16,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            short_ticks: 0x64,
            medium_ticks: 0x190,
        }
    }
}

/// Display multiplexer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    /// Ticks each digit slot stays lit before the next one
    pub ticks_per_digit: u16,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { ticks_per_digit: 4 }
    }
}

/// Serial bus timing shared by both peripheral masters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BusConfig {
    /// Clock polarity and phase
    pub mode: Mode,
    /// Ticks per clock half-period
    pub half_period_ticks: u16,
    /// Ticks between the starts of two sensor samples
    pub sample_interval_ticks: u32,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Mode3,
            half_period_ticks: 1,
            sample_interval_ticks: 256,
        }
    }
}

/// Lookup flash configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlashConfig {
    /// Command byte sent ahead of the address
    pub read_opcode: u8,
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self { read_opcode: 0x03 }
    }
}

/// Complete controller configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControllerConfig {
    pub encoder: EncoderConfig,
    pub button: ButtonConfig,
    pub display: DisplayConfig,
    pub bus: BusConfig,
    pub flash: FlashConfig,
}

impl ControllerConfig {
    /// Check the configuration for values the controller cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.encoder.origin > 0x0F || self.encoder.detent > 0b11 {
            return Err(ConfigError::OriginOutOfRange);
        }

        let b = &self.button;
        if b.short_ticks == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        if b.short_ticks >= b.medium_ticks {
            return Err(ConfigError::ThresholdOrder);
        }

        if self.display.ticks_per_digit == 0
            || self.bus.half_period_ticks == 0
            || self.bus.sample_interval_ticks == 0
        {
            return Err(ConfigError::ZeroPeriod);
        }

        Ok(())
    }
}

#[cfg(feature = "serde")]
impl ControllerConfig {
    /// Encode into `buf` as postcard bytes, returning the used prefix
    pub fn to_slice<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::Encoding)
    }

    /// Decode postcard bytes and validate the result
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Encoding)?;
        config.validate()?;
        Ok(config)
    }
}
