//! Select/clock waveform generator
//!
//! One transaction is `tx_bits` presented on MOSI followed by `rx_bits`
//! captured from MISO. The receive register skips the transmit captures,
//! so no response bit can be sampled before the last command bit has been
//! presented.

use lumen_hal::spi::{ClockEdge, Mode};

use super::shift::{ShiftIn, ShiftOut};
use super::{LineEvent, SerialLines};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Phase {
    Idle,
    /// Select asserted, toggling the clock
    Clocking { edges: u16, timer: u16 },
    /// Clock back at idle, holding select for one more half-period
    Closing { timer: u16 },
}

/// Transaction sequencer for one peripheral bundle
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusMaster {
    mode: Mode,
    half_period: u16,
    phase: Phase,
    lines: SerialLines,
    tx_bits: u8,
    total_edges: u16,
    shift_in: ShiftIn,
    shift_out: ShiftOut,
}

impl BusMaster {
    pub fn new(mode: Mode, half_period: u16, tx_bits: u8, rx_bits: u8) -> Self {
        Self {
            mode,
            half_period: half_period.max(1),
            phase: Phase::Idle,
            lines: SerialLines::idle(mode),
            tx_bits,
            total_edges: 2 * (tx_bits as u16 + rx_bits as u16),
            shift_in: ShiftIn::new(rx_bits, tx_bits),
            shift_out: ShiftOut::default(),
        }
    }

    /// Force the reset state
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.lines = SerialLines::idle(self.mode);
        self.shift_in.on_event(LineEvent::SelectAsserted, false);
        self.shift_out = ShiftOut::default();
    }

    /// Assert select and queue `command` for transmission
    ///
    /// Ignored while a transaction is in flight.
    pub fn start(&mut self, command: u32) -> bool {
        if self.is_busy() {
            return false;
        }

        self.lines.select = false;
        self.lines.clock = self.mode.idle_level();
        self.shift_in.on_event(LineEvent::SelectAsserted, false);
        self.shift_out.load(command, self.tx_bits);
        self.lines.mosi = if self.mode.presents_on_select() {
            self.shift_out.next_bit()
        } else {
            false
        };
        self.phase = Phase::Clocking {
            edges: 0,
            timer: self.half_period,
        };
        true
    }

    /// Release select mid-frame
    ///
    /// Whatever was shifted in so far is discarded by the next `start`.
    pub fn abort(&mut self) {
        if self.is_busy() {
            warn!("serial transaction aborted after {} bits", self.shift_in.bit_count());
            self.phase = Phase::Idle;
            self.lines = SerialLines::idle(self.mode);
            self.shift_in.on_event(LineEvent::SelectReleased, false);
        }
    }

    /// Advance one tick with the sampled MISO level
    ///
    /// Returns the received word on the tick its last bit is captured.
    pub fn tick(&mut self, miso: bool) -> Option<u32> {
        match self.phase {
            Phase::Idle => None,
            Phase::Clocking { edges, timer } if timer > 1 => {
                self.phase = Phase::Clocking {
                    edges,
                    timer: timer - 1,
                };
                None
            }
            Phase::Clocking { edges, .. } => {
                let word = self.on_edge(miso);
                let edges = edges + 1;
                self.phase = if edges >= self.total_edges {
                    Phase::Closing {
                        timer: self.half_period,
                    }
                } else {
                    Phase::Clocking {
                        edges,
                        timer: self.half_period,
                    }
                };
                word
            }
            Phase::Closing { timer } if timer > 1 => {
                self.phase = Phase::Closing { timer: timer - 1 };
                None
            }
            Phase::Closing { .. } => {
                self.lines = SerialLines::idle(self.mode);
                self.shift_in.on_event(LineEvent::SelectReleased, false);
                self.phase = Phase::Idle;
                None
            }
        }
    }

    /// Toggle the clock and dispatch the transition
    fn on_edge(&mut self, miso: bool) -> Option<u32> {
        self.lines.clock = !self.lines.clock;
        let edge = if self.lines.clock {
            ClockEdge::Rising
        } else {
            ClockEdge::Falling
        };

        if edge == self.mode.capture_edge() {
            self.shift_in.on_event(LineEvent::Capture, miso)
        } else {
            self.lines.mosi = self.shift_out.next_bit();
            None
        }
    }

    pub fn lines(&self) -> SerialLines {
        self.lines
    }

    pub fn is_busy(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Bits received so far in the current frame
    pub fn bit_count(&self) -> u8 {
        self.shift_in.bit_count()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }
}
