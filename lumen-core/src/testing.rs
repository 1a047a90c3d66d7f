//! Peripheral models and a tick harness for host tests

use std::collections::HashMap;

use lumen_hal::spi::{ClockEdge, Mode};

use crate::config::ControllerConfig;
use crate::controller::{Controller, Event, Events, Inputs};
use crate::serial::flash::COMMAND_BITS;
use crate::serial::sensor::{FRAME_BITS, TRAILING_BITS};
use crate::serial::SerialLines;

/// What a slave saw on its bundle since the last observation
enum Wire {
    /// Sample MOSI, `index` counting from the first capture after select
    Capture { index: u8, bit: bool },
    /// Put bit `index` of the response on MISO
    Present { index: u8 },
}

/// Slave side of one bundle: follows select and clock and counts edges
struct Link {
    mode: Mode,
    prev: SerialLines,
    captured: u8,
    presented: u8,
    miso: bool,
}

impl Link {
    fn new(mode: Mode) -> Self {
        Self {
            mode,
            prev: SerialLines::idle(mode),
            captured: 0,
            presented: 0,
            miso: false,
        }
    }

    fn observe(&mut self, lines: SerialLines) -> Option<Wire> {
        let prev = core::mem::replace(&mut self.prev, lines);
        if !lines.selected() {
            return None;
        }

        if !prev.selected() {
            self.captured = 0;
            self.presented = 0;
            if !self.mode.presents_on_select() {
                return None;
            }
            return Some(self.next_present());
        }

        if lines.clock == prev.clock {
            return None;
        }
        let edge = if lines.clock {
            ClockEdge::Rising
        } else {
            ClockEdge::Falling
        };
        if edge == self.mode.capture_edge() {
            let index = self.captured;
            self.captured += 1;
            Some(Wire::Capture {
                index,
                bit: lines.mosi,
            })
        } else {
            Some(self.next_present())
        }
    }

    fn next_present(&mut self) -> Wire {
        let index = self.presented;
        self.presented += 1;
        Wire::Present { index }
    }
}

/// Light sensor answering every select with a fixed level
pub struct SensorDevice {
    link: Link,
    level: u8,
}

impl SensorDevice {
    pub fn new(mode: Mode) -> Self {
        Self {
            link: Link::new(mode),
            level: 0,
        }
    }

    pub fn set_level(&mut self, level: u8) {
        self.level = level;
    }

    /// Follow the bundle and return the MISO level to feed back
    pub fn observe(&mut self, lines: SerialLines) -> bool {
        if let Some(Wire::Present { index }) = self.link.observe(lines) {
            let frame = (self.level as u32) << TRAILING_BITS;
            self.link.miso = index < FRAME_BITS && (frame >> (FRAME_BITS - 1 - index)) & 1 != 0;
        }
        self.link.miso
    }
}

/// Read-only flash with sparse contents (erased bytes read 0xFF)
pub struct FlashDevice {
    link: Link,
    memory: HashMap<u32, u8>,
    command: u32,
    last_command: Option<(u8, u32)>,
}

impl FlashDevice {
    pub fn new(mode: Mode) -> Self {
        Self {
            link: Link::new(mode),
            memory: HashMap::new(),
            command: 0,
            last_command: None,
        }
    }

    pub fn store(&mut self, address: u32, byte: u8) {
        self.memory.insert(address, byte);
    }

    /// Opcode and address of the last complete command
    pub fn last_command(&self) -> Option<(u8, u32)> {
        self.last_command
    }

    /// Follow the bundle and return the MISO level to feed back
    pub fn observe(&mut self, lines: SerialLines) -> bool {
        match self.link.observe(lines) {
            Some(Wire::Capture { index, bit }) if index < COMMAND_BITS => {
                if index == 0 {
                    self.command = 0;
                }
                self.command = (self.command << 1) | bit as u32;
                if index == COMMAND_BITS - 1 {
                    self.last_command = Some(((self.command >> 24) as u8, self.command & 0xFF_FFFF));
                }
            }
            Some(Wire::Present { index }) => {
                self.link.miso = match (index.checked_sub(COMMAND_BITS), self.last_command) {
                    (Some(n), Some((_, address))) if n < 8 => {
                        let byte = self.memory.get(&address).copied().unwrap_or(0xFF);
                        (byte >> (7 - n)) & 1 != 0
                    }
                    _ => false,
                };
            }
            _ => {}
        }
        self.link.miso
    }
}

/// Ticks each knob code is held while turning
const KNOB_HOLD_TICKS: u32 = 10;
/// Upper bound for `run_until`
const RUN_LIMIT: u32 = 4096;

const CW: [(bool, bool); 4] = [(true, false), (true, true), (false, true), (false, false)];
const CCW: [(bool, bool); 4] = [(false, true), (true, true), (true, false), (false, false)];

/// A controller wired to a sensor and a flash
pub struct Bench {
    pub ctrl: Controller,
    pub inputs: Inputs,
    pub sensor: SensorDevice,
    pub flash: FlashDevice,
}

impl Bench {
    pub fn new() -> Self {
        Self::with_config(ControllerConfig::default())
    }

    pub fn with_config(config: ControllerConfig) -> Self {
        Self {
            ctrl: Controller::new(config).unwrap(),
            inputs: Inputs::default(),
            sensor: SensorDevice::new(config.bus.mode),
            flash: FlashDevice::new(config.bus.mode),
        }
    }

    /// One tick, then let the devices react to the new line levels
    pub fn step(&mut self) -> Events {
        let events = self.ctrl.tick(&self.inputs);
        let outputs = *self.ctrl.outputs();
        self.inputs.sensor_miso = self.sensor.observe(outputs.sensor);
        self.inputs.flash_miso = self.flash.observe(outputs.flash);
        events
    }

    pub fn run(&mut self, ticks: u32) -> Vec<Event> {
        let mut all = Vec::new();
        for _ in 0..ticks {
            all.extend(self.step());
        }
        all
    }

    /// Step until an event matches
    pub fn run_until(&mut self, pred: impl Fn(&Event) -> bool) -> Option<Event> {
        for _ in 0..RUN_LIMIT {
            if let Some(event) = self.step().into_iter().find(|e| pred(e)) {
                return Some(event);
            }
        }
        None
    }

    /// Hold reset low for `ticks`, then release it without stepping
    pub fn reset(&mut self, ticks: u32) {
        self.inputs.rst_n = false;
        self.run(ticks);
        self.inputs.rst_n = true;
    }

    fn turn(&mut self, codes: [(bool, bool); 4], detents: u32) {
        for _ in 0..detents {
            for (a, b) in codes {
                self.inputs.enc_a = a;
                self.inputs.enc_b = b;
                self.run(KNOB_HOLD_TICKS);
            }
        }
    }

    pub fn turn_cw(&mut self, detents: u32) {
        self.turn(CW, detents);
    }

    pub fn turn_ccw(&mut self, detents: u32) {
        self.turn(CCW, detents);
    }

    /// Hold the button for `hold` counted ticks, release, and return the
    /// events of the release tick
    pub fn press_until(&mut self, hold: u16) -> Vec<Event> {
        self.inputs.button = false;
        for _ in 0..RUN_LIMIT {
            if self.ctrl.hold_ticks() >= hold {
                break;
            }
            self.step();
        }
        self.inputs.button = true;
        self.step().into_iter().collect()
    }
}
