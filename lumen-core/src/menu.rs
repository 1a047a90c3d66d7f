//! Menu state machine
//!
//! The knob adjusts, the button advances. Rotation only ever changes the
//! selection inside the current state; only a completed press moves between
//! states:
//!
//! ```text
//! Main (ISO) --press--> SubSelect (shutter) --press--> FilterSelect (aperture)
//!                                                          |
//!                                  ExposureMeter <--press--+
//! ```
//!
//! Long presses and any press in `ExposureMeter` leave the state unchanged.

use crate::button::PressTier;
use crate::encoder::{Nibble, Step};

/// ISO speeds selectable in `Main`, indexed by selection
pub const ISO_SPEEDS: [u16; 16] = [
    50, 64, 80, 100, 125, 160, 200, 250, 320, 400, 500, 640, 800, 1000, 1250, 1600,
];

/// Shutter denominators selectable in `SubSelect` (1/n s)
pub const SHUTTER_SPEEDS: [u16; 16] = [
    2, 4, 8, 15, 30, 60, 90, 125, 180, 250, 350, 500, 750, 1000, 1500, 2000,
];

/// Apertures selectable in `FilterSelect`, in tenths of an f-stop
pub const APERTURES_X10: [u16; 16] = [
    14, 18, 20, 28, 35, 40, 45, 56, 63, 80, 90, 110, 130, 160, 190, 220,
];

/// Menu states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuState {
    /// Reset state, ISO selection
    Main,
    /// Shutter speed selection
    SubSelect,
    /// Aperture selection
    FilterSelect,
    /// Shows the looked-up exposure value
    ExposureMeter,
}

impl MenuState {
    /// State register encoding
    pub fn code(self) -> u8 {
        match self {
            MenuState::Main => 0b001,
            MenuState::SubSelect => 0b010,
            MenuState::FilterSelect => 0b011,
            MenuState::ExposureMeter => 0b100,
        }
    }

    /// Whether knob steps adjust a setting in this state
    pub fn is_selectable(self) -> bool {
        !matches!(self, MenuState::ExposureMeter)
    }

    /// Next state for a classified press
    pub fn transition(self, tier: PressTier) -> Self {
        use MenuState::*;
        use PressTier::*;

        match (self, tier) {
            (Main, Short | Medium) => SubSelect,
            (SubSelect, Short | Medium) => FilterSelect,
            (FilterSelect, Short | Medium) => ExposureMeter,

            // Long presses and ExposureMeter are not mapped yet
            _ => self,
        }
    }
}

/// Selections latched when leaving each selectable state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    pub iso: Nibble,
    pub shutter: Nibble,
    pub aperture: Nibble,
}

impl Settings {
    fn new(origin: Nibble) -> Self {
        Self {
            iso: origin,
            shutter: origin,
            aperture: origin,
        }
    }

    /// 20-bit flash address of the exposure entry for these settings
    ///
    /// `iso:4 | shutter:4 | aperture:4 | light:8`
    pub fn lookup_address(&self, light: u8) -> u32 {
        (self.iso.get() as u32) << 16
            | (self.shutter.get() as u32) << 12
            | (self.aperture.get() as u32) << 8
            | light as u32
    }
}

/// A completed state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    pub from: MenuState,
    pub to: MenuState,
}

/// What the display should show for the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Readout {
    /// Integer value, with an optional decimal point `n` digits from the right
    Number { value: u16, decimals: u8 },
    /// Nothing to show yet
    Pending,
}

/// Menu state machine
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Menu {
    origin: Nibble,
    current: MenuState,
    selection: Nibble,
    settings: Settings,
}

impl Menu {
    pub fn new(origin: u8) -> Self {
        let origin = Nibble::new(origin);
        Self {
            origin,
            current: MenuState::Main,
            selection: origin,
            settings: Settings::new(origin),
        }
    }

    /// Force the reset state
    pub fn reset(&mut self) {
        *self = Self::new(self.origin.get());
    }

    /// Apply a knob step to the selection
    pub fn on_step(&mut self, step: Step) {
        if self.current.is_selectable() {
            self.selection = self.selection.wrapping_add_signed(step.delta());
        }
    }

    /// Apply a classified press
    ///
    /// Leaving a selectable state commits its selection and the next state
    /// starts from the origin.
    pub fn on_press(&mut self, tier: PressTier) -> Option<Transition> {
        let from = self.current;
        let to = from.transition(tier);
        if to == from {
            trace!("press {:?} ignored in {:?}", tier, from);
            return None;
        }

        match from {
            MenuState::Main => self.settings.iso = self.selection,
            MenuState::SubSelect => self.settings.shutter = self.selection,
            MenuState::FilterSelect => self.settings.aperture = self.selection,
            MenuState::ExposureMeter => {}
        }

        self.current = to;
        self.selection = self.origin;
        info!("menu {:?} -> {:?}", from, to);
        Some(Transition { from, to })
    }

    pub fn current(&self) -> MenuState {
        self.current
    }

    pub fn selection(&self) -> Nibble {
        self.selection
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Value to display, given the latest flash lookup (if any)
    pub fn readout(&self, lookup: Option<u8>) -> Readout {
        let index = self.selection.get() as usize;
        match self.current {
            MenuState::Main => Readout::Number {
                value: ISO_SPEEDS[index],
                decimals: 0,
            },
            MenuState::SubSelect => Readout::Number {
                value: SHUTTER_SPEEDS[index],
                decimals: 0,
            },
            MenuState::FilterSelect => Readout::Number {
                value: APERTURES_X10[index],
                decimals: 1,
            },
            MenuState::ExposureMeter => match lookup {
                Some(byte) => Readout::Number {
                    value: byte as u16,
                    decimals: 0,
                },
                None => Readout::Pending,
            },
        }
    }
}
