//! Serial clock abstractions
//!
//! The peripherals are clocked bit by bit, so instead of a byte-level bus
//! trait this module only describes the clock discipline: which level the
//! clock idles at and on which transition data is captured.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// SPI clock polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Polarity {
    /// Clock idles low (CPOL=0)
    IdleLow,
    /// Clock idles high (CPOL=1)
    IdleHigh,
}

/// SPI clock phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Phase {
    /// Data captured on first clock transition (CPHA=0)
    CaptureOnFirstTransition,
    /// Data captured on second clock transition (CPHA=1)
    CaptureOnSecondTransition,
}

/// SPI mode (combined polarity and phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mode {
    /// Mode 0: CPOL=0, CPHA=0
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    #[default]
    Mode3,
}

/// Direction of a clock line transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockEdge {
    /// Low to high
    Rising,
    /// High to low
    Falling,
}

impl From<Mode> for (Polarity, Phase) {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Mode0 => (Polarity::IdleLow, Phase::CaptureOnFirstTransition),
            Mode::Mode1 => (Polarity::IdleLow, Phase::CaptureOnSecondTransition),
            Mode::Mode2 => (Polarity::IdleHigh, Phase::CaptureOnFirstTransition),
            Mode::Mode3 => (Polarity::IdleHigh, Phase::CaptureOnSecondTransition),
        }
    }
}

impl Mode {
    /// Clock polarity of this mode
    pub fn polarity(self) -> Polarity {
        <(Polarity, Phase)>::from(self).0
    }

    /// Clock phase of this mode
    pub fn phase(self) -> Phase {
        <(Polarity, Phase)>::from(self).1
    }

    /// Level of the clock line between transactions
    pub fn idle_level(self) -> bool {
        self.polarity() == Polarity::IdleHigh
    }

    /// The clock transition on which both sides sample the data line
    ///
    /// The other transition is the one on which data is presented.
    pub fn capture_edge(self) -> ClockEdge {
        match self {
            Mode::Mode0 | Mode::Mode3 => ClockEdge::Rising,
            Mode::Mode1 | Mode::Mode2 => ClockEdge::Falling,
        }
    }

    /// Whether the first bit must already be on the line when select asserts
    pub fn presents_on_select(self) -> bool {
        self.phase() == Phase::CaptureOnFirstTransition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode3_idles_high_and_captures_rising() {
        assert!(Mode::Mode3.idle_level());
        assert_eq!(Mode::Mode3.capture_edge(), ClockEdge::Rising);
        assert!(!Mode::Mode3.presents_on_select());
    }

    #[test]
    fn test_first_transition_is_capture_edge() {
        // Leaving the idle level is the first transition
        for mode in [Mode::Mode0, Mode::Mode1, Mode::Mode2, Mode::Mode3] {
            let first = if mode.idle_level() {
                ClockEdge::Falling
            } else {
                ClockEdge::Rising
            };
            assert_eq!(mode.capture_edge() == first, mode.presents_on_select());
        }
    }

    #[test]
    fn test_default_mode() {
        assert_eq!(Mode::default(), Mode::Mode3);
    }
}
