//! Press-duration classifier
//!
//! The knob button is active-low. While it is held a counter advances once
//! per tick (saturating); on release the count is mapped to a [`PressTier`]
//! and the counter clears. Exactly one tier is reported per release, and
//! holds shorter than the short threshold are dropped as bounce.

use crate::config::ButtonConfig;

/// Press classification, ordered by hold duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PressTier {
    /// Held for less than the short threshold
    None,
    Short,
    Medium,
    Long,
}

impl ButtonConfig {
    /// Tier for a hold of `held` ticks
    ///
    /// Non-decreasing in `held`. Anything past the medium threshold is long.
    pub fn classify(&self, held: u16) -> PressTier {
        if held > self.medium_ticks {
            PressTier::Long
        } else if held >= self.medium_ticks {
            PressTier::Medium
        } else if held >= self.short_ticks {
            PressTier::Short
        } else {
            PressTier::None
        }
    }
}

/// Button state tracker
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PressClassifier {
    config: ButtonConfig,
    /// Pressed on the previous tick
    pressed: bool,
    hold_ticks: u16,
}

impl PressClassifier {
    pub fn new(config: ButtonConfig) -> Self {
        Self {
            config,
            pressed: false,
            hold_ticks: 0,
        }
    }

    /// Force the reset state
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }

    /// Sample the raw line (low = pressed)
    ///
    /// Returns a tier on the release edge of a qualifying press.
    pub fn update(&mut self, line_high: bool) -> Option<PressTier> {
        let pressed = !line_high;

        if pressed {
            self.pressed = true;
            self.hold_ticks = self.hold_ticks.saturating_add(1);
            return None;
        }

        if !self.pressed {
            return None;
        }

        let held = self.hold_ticks;
        self.pressed = false;
        self.hold_ticks = 0;

        match self.config.classify(held) {
            PressTier::None => {
                trace!("button bounce ignored ({} ticks)", held);
                None
            }
            tier => {
                debug!("button {:?} press ({} ticks)", tier, held);
                Some(tier)
            }
        }
    }

    /// Ticks the button has been held so far
    pub fn hold_ticks(&self) -> u16 {
        self.hold_ticks
    }

    /// Tier the current hold would produce if released now
    pub fn pending_tier(&self) -> PressTier {
        self.config.classify(self.hold_ticks)
    }
}
