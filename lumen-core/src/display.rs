//! Seven-segment display multiplexer
//!
//! Four common-anode digits share one segment port. Each slot is lit in
//! turn by pulling its select line low; the segment byte is active-low with
//! the decimal point on bit 7:
//!
//! ```text
//!     a            bit: 7  6 5 4 3 2 1 0
//!   f   b              dp g f e d c b a
//!     g
//!   e   c          slot 3  2  1  0      (slot 0 rightmost)
//!     d  .         sel  77 7B 7D 7E
//! ```
//!
//! Cycling is free-running and does not depend on the menu.

use crate::config::DisplayConfig;
use crate::menu::Readout;

/// Number of digit slots
pub const DIGITS: usize = 4;

/// Active-low select code per slot
pub const SELECT_CODES: [u8; DIGITS] = [0x7E, 0x7D, 0x7B, 0x77];

/// Segment patterns for 0-9
const DIGIT_PATTERNS: [u8; 10] = [0xC0, 0xF9, 0xA4, 0xB0, 0x99, 0x92, 0x82, 0xF8, 0x80, 0x90];

/// Decimal point segment (active-low)
const POINT: u8 = 0x80;

/// One digit's segment pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Glyph(u8);

impl Glyph {
    pub const BLANK: Glyph = Glyph(0xFF);
    pub const DASH: Glyph = Glyph(0xBF);

    /// Pattern for a decimal digit; `None` above 9
    pub fn digit(value: u8) -> Option<Glyph> {
        DIGIT_PATTERNS.get(value as usize).copied().map(Glyph)
    }

    /// Same glyph with the decimal point lit
    pub fn with_point(self) -> Glyph {
        Glyph(self.0 & !POINT)
    }

    pub fn segments(self) -> u8 {
        self.0
    }
}

/// Glyphs for a readout, slot 0 first
///
/// Leading zeros are blanked; a value that does not fit shows dashes.
pub fn render(readout: Readout) -> [Glyph; DIGITS] {
    let (value, decimals) = match readout {
        Readout::Number { value, decimals } if value <= 9999 => (value, decimals as usize),
        _ => return [Glyph::DASH; DIGITS],
    };

    let mut glyphs = [Glyph::BLANK; DIGITS];
    let mut rest = value;
    for (slot, glyph) in glyphs.iter_mut().enumerate() {
        if rest == 0 && slot > decimals {
            break;
        }
        // rest % 10 < 10, so the lookup cannot miss
        *glyph = Glyph::digit((rest % 10) as u8).unwrap_or(Glyph::DASH);
        rest /= 10;
    }

    if decimals > 0 && decimals < DIGITS {
        glyphs[decimals] = glyphs[decimals].with_point();
    }
    glyphs
}

/// What the display port carries on one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayFrame {
    pub slot: u8,
    /// Digit-select byte
    pub select: u8,
    /// Segment byte
    pub segments: u8,
}

/// Slot sequencer
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayMux {
    ticks_per_digit: u16,
    slot: u8,
    timer: u16,
}

impl DisplayMux {
    pub fn new(config: &DisplayConfig) -> Self {
        Self {
            ticks_per_digit: config.ticks_per_digit.max(1),
            slot: 0,
            timer: 0,
        }
    }

    /// Force the reset state
    pub fn reset(&mut self) {
        self.slot = 0;
        self.timer = 0;
    }

    /// Advance one tick and return the frame to drive
    pub fn tick(&mut self, glyphs: &[Glyph; DIGITS]) -> DisplayFrame {
        self.timer += 1;
        if self.timer >= self.ticks_per_digit {
            self.timer = 0;
            self.slot = (self.slot + 1) % DIGITS as u8;
        }
        self.frame(glyphs)
    }

    /// Frame for the current slot without advancing
    pub fn frame(&self, glyphs: &[Glyph; DIGITS]) -> DisplayFrame {
        let slot = self.slot as usize;
        DisplayFrame {
            slot: self.slot,
            select: SELECT_CODES[slot],
            segments: glyphs[slot].segments(),
        }
    }

    pub fn slot(&self) -> u8 {
        self.slot
    }
}
