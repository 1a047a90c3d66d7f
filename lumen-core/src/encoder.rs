//! Quadrature decoder
//!
//! Decodes the two knob lines into detent steps and a 4-bit wrapping
//! position. Each tick the previous line code is compared with the current
//! one through the transition table:
//!
//! ```text
//! CW:  00 -> 10 -> 11 -> 01 -> 00     (code = A << 1 | B)
//! CCW: 00 -> 01 -> 11 -> 10 -> 00
//! ```
//!
//! A valid transition is a quarter step. Four quarter steps in one direction
//! make one detent and move the position by one. Anything else (repeats,
//! double jumps, bounce that reverses) is absorbed without an error.

use crate::config::EncoderConfig;

/// Quarter-step contribution indexed by `prev << 2 | curr`
const TRANSITIONS: [i8; 16] = [
    // prev 00
    0, -1, 1, 0,
    // prev 01
    1, 0, 0, -1,
    // prev 10
    -1, 0, 0, 1,
    // prev 11
    0, 1, -1, 0,
];

/// Quarter steps in one detent
const QUARTERS_PER_DETENT: i8 = 4;

/// Rotation direction of a decoded step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    Clockwise,
    CounterClockwise,
}

impl Step {
    /// Signed delta (+1 clockwise, -1 counter-clockwise)
    pub fn delta(self) -> i8 {
        match self {
            Step::Clockwise => 1,
            Step::CounterClockwise => -1,
        }
    }
}

/// Unsigned 4-bit counter with explicit wrap-around
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Nibble(u8);

impl Nibble {
    pub const MAX: u8 = 0x0F;

    /// Build from the low four bits of `value`
    pub const fn new(value: u8) -> Self {
        Self(value & Self::MAX)
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// Add a signed delta modulo 16
    pub fn wrapping_add_signed(self, delta: i8) -> Self {
        Self::new(self.0.wrapping_add_signed(delta))
    }
}

/// Quadrature decoder state
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QuadratureDecoder {
    config: EncoderConfig,
    /// Line code sampled on the previous tick
    prev: u8,
    /// Quarter steps accumulated since the last detent
    quarters: i8,
    position: Nibble,
}

impl QuadratureDecoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self {
            config,
            prev: config.detent,
            quarters: 0,
            position: Nibble::new(config.origin),
        }
    }

    /// Force the reset state
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }

    /// Sample both lines and return a step if a detent completed
    pub fn update(&mut self, a: bool, b: bool) -> Option<Step> {
        let curr = ((a as u8) << 1) | b as u8;
        let quarter = TRANSITIONS[((self.prev << 2) | curr) as usize];
        self.prev = curr;

        self.quarters += quarter;

        let step = if self.quarters >= QUARTERS_PER_DETENT {
            Some(Step::Clockwise)
        } else if self.quarters <= -QUARTERS_PER_DETENT {
            Some(Step::CounterClockwise)
        } else {
            None
        };

        // Back at rest with an incomplete cycle means bounce or a missed edge
        if step.is_some() || curr == self.config.detent {
            self.quarters = 0;
        }

        if let Some(step) = step {
            self.position = self.position.wrapping_add_signed(step.delta());
            trace!("encoder step {:?} -> {}", step, self.position.get());
        }

        step
    }

    /// Return the position to the configured origin
    pub fn recenter(&mut self) {
        self.position = Nibble::new(self.config.origin);
        self.quarters = 0;
    }

    pub fn position(&self) -> Nibble {
        self.position
    }

    /// Line code from the last sample
    pub fn lines(&self) -> u8 {
        self.prev
    }
}
