//! Shift registers
//!
//! [`ShiftIn`] is passive: it only reacts to line events handed to it and
//! never decides when a transaction starts or ends.

use super::LineEvent;

/// MSB-first receive register
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ShiftIn {
    /// Bits in one received word
    width: u8,
    /// Captures to let pass before receiving (our own transmit phase)
    skip: u8,
    register: u32,
    count: u8,
    skipped: u8,
}

impl ShiftIn {
    pub fn new(width: u8, skip: u8) -> Self {
        debug_assert!(width <= 32);
        Self {
            width,
            skip,
            register: 0,
            count: 0,
            skipped: 0,
        }
    }

    /// Handle a line event; returns the word when the last bit lands
    pub fn on_event(&mut self, event: LineEvent, data: bool) -> Option<u32> {
        match event {
            LineEvent::SelectAsserted => {
                self.clear();
                None
            }
            LineEvent::Capture if self.skipped < self.skip => {
                self.skipped += 1;
                None
            }
            LineEvent::Capture if self.width == 0 => None,
            LineEvent::Capture => {
                self.register = (self.register << 1) | data as u32;
                self.count += 1;
                if self.count < self.width {
                    return None;
                }
                let word = self.register;
                self.register = 0;
                self.count = 0;
                Some(word)
            }
            // A short frame is left as is until the next select
            LineEvent::SelectReleased => None,
        }
    }

    fn clear(&mut self) {
        self.register = 0;
        self.count = 0;
        self.skipped = 0;
    }

    /// Bits received so far in the current word
    pub fn bit_count(&self) -> u8 {
        self.count
    }

    pub fn width(&self) -> u8 {
        self.width
    }
}

/// MSB-first transmit register
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ShiftOut {
    word: u32,
    remaining: u8,
}

impl ShiftOut {
    /// Queue the low `width` bits of `word`
    pub fn load(&mut self, word: u32, width: u8) {
        debug_assert!(width <= 32);
        self.word = word;
        self.remaining = width;
    }

    /// Next bit to present; low once the word is exhausted
    pub fn next_bit(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        (self.word >> self.remaining) & 1 != 0
    }

    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(reg: &mut ShiftIn, bits: &[u8]) -> Option<u32> {
        let mut out = None;
        for &bit in bits {
            if let Some(word) = reg.on_event(LineEvent::Capture, bit != 0) {
                out = Some(word);
            }
        }
        out
    }

    #[test]
    fn test_msb_first() {
        let mut reg = ShiftIn::new(8, 0);
        reg.on_event(LineEvent::SelectAsserted, false);
        assert_eq!(feed(&mut reg, &[1, 0, 1, 0, 1, 0, 1, 1]), Some(0xAB));
        assert_eq!(reg.bit_count(), 0);
    }

    #[test]
    fn test_skips_transmit_phase() {
        let mut reg = ShiftIn::new(4, 3);
        reg.on_event(LineEvent::SelectAsserted, false);
        // Whatever is on the line during the skipped captures is ignored
        assert_eq!(feed(&mut reg, &[1, 1, 1, 0, 1, 1, 0]), Some(0b0110));
    }

    #[test]
    fn test_select_restarts_framing() {
        let mut reg = ShiftIn::new(8, 0);
        reg.on_event(LineEvent::SelectAsserted, false);
        feed(&mut reg, &[1, 1, 1]);
        reg.on_event(LineEvent::SelectReleased, false);
        assert_eq!(reg.bit_count(), 3);

        reg.on_event(LineEvent::SelectAsserted, false);
        assert_eq!(reg.bit_count(), 0);
        assert_eq!(feed(&mut reg, &[0, 1, 1, 0, 1, 1, 1, 0]), Some(0x6E));
    }

    #[test]
    fn test_shift_out_order() {
        let mut out = ShiftOut::default();
        out.load(0b1011, 4);
        let bits: Vec<bool> = (0..6).map(|_| out.next_bit()).collect();
        assert_eq!(bits, [true, false, true, true, false, false]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_shift_out_full_width() {
        let mut out = ShiftOut::default();
        out.load(0x8000_0001, 32);
        assert!(out.next_bit());
        for _ in 0..30 {
            assert!(!out.next_bit());
        }
        assert!(out.next_bit());
    }
}
