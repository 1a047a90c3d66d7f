//! Tick-driven controller
//!
//! Owns every component and advances them once per clock pulse in a fixed
//! feed-forward order:
//!
//! ```text
//! inputs -> encoder, button -> menu -> flash, sensor -> display -> outputs
//! ```
//!
//! Components only see each other through values passed here: the menu
//! reads decoder events, the flash address is built from the menu settings
//! and the last sensor byte, the display reads the menu readout. Reset is
//! synchronous and level-driven; while `rst_n` is low every component is
//! forced back to its initial state on every tick.

use heapless::Vec;

use crate::button::{PressClassifier, PressTier};
use crate::config::{ConfigError, ControllerConfig};
use crate::display::{render, DisplayMux};
use crate::encoder::{Nibble, QuadratureDecoder, Step};
use crate::menu::{Menu, MenuState, Transition};
use crate::serial::{FlashChannel, SensorChannel, SerialLines};

/// Upper bound on events reported by one tick
pub const MAX_EVENTS_PER_TICK: usize = 6;

/// Signals sampled at the start of a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Inputs {
    /// Knob line A
    pub enc_a: bool,
    /// Knob line B
    pub enc_b: bool,
    /// Knob button, low while pressed
    pub button: bool,
    /// Low freezes the controller
    pub enable: bool,
    /// Low holds the controller in reset
    pub rst_n: bool,
    pub sensor_miso: bool,
    pub flash_miso: bool,
}

impl Default for Inputs {
    /// Knob at rest, button released, running
    fn default() -> Self {
        Self {
            enc_a: false,
            enc_b: false,
            button: true,
            enable: true,
            rst_n: true,
            sensor_miso: false,
            flash_miso: false,
        }
    }
}

/// Signals driven at the end of a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Outputs {
    pub digit_select: u8,
    pub segments: u8,
    pub sensor: SerialLines,
    pub flash: SerialLines,
}

/// Something that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Knob moved one detent
    Step(Step),
    /// Button released after a qualifying hold
    Press(PressTier),
    /// Menu changed state
    Menu(Transition),
    /// Light sensor byte received
    SensorReady(u8),
    /// Lookup byte received
    FlashReady(u8),
}

/// Events reported by one tick, in the order they occurred
pub type Events = Vec<Event, MAX_EVENTS_PER_TICK>;

/// The exposure meter controller
#[derive(Debug, Clone)]
pub struct Controller {
    config: ControllerConfig,
    encoder: QuadratureDecoder,
    button: PressClassifier,
    menu: Menu,
    sensor: SensorChannel,
    flash: FlashChannel,
    display: DisplayMux,
    /// Ticks until the next sensor sample
    sample_timer: u32,
    /// Last sensor byte
    light: u8,
    /// Last lookup byte for the current settings
    lookup: Option<u8>,
    /// A sensor byte arrived and its lookup has not started yet
    pending_lookup: bool,
    in_reset: bool,
    outputs: Outputs,
}

impl Controller {
    /// Build a controller in its reset state
    pub fn new(config: ControllerConfig) -> Result<Self, ConfigError> {
        if let Err(e) = config.validate() {
            warn!("config rejected: {:?}", e);
            return Err(e);
        }

        let mut ctrl = Self {
            config,
            encoder: QuadratureDecoder::new(config.encoder),
            button: PressClassifier::new(config.button),
            menu: Menu::new(config.encoder.origin),
            sensor: SensorChannel::new(&config.bus),
            flash: FlashChannel::new(&config.bus, &config.flash),
            display: DisplayMux::new(&config.display),
            sample_timer: 0,
            light: 0,
            lookup: None,
            pending_lookup: false,
            in_reset: false,
            outputs: Outputs {
                digit_select: 0,
                segments: 0,
                sensor: SerialLines::idle(config.bus.mode),
                flash: SerialLines::idle(config.bus.mode),
            },
        };
        ctrl.apply_reset();
        Ok(ctrl)
    }

    /// Advance one clock pulse
    pub fn tick(&mut self, inputs: &Inputs) -> Events {
        let mut events = Events::new();

        if !inputs.rst_n {
            if !self.in_reset {
                info!("reset asserted");
                self.in_reset = true;
            }
            self.apply_reset();
            return events;
        }
        if self.in_reset {
            info!("reset released");
            self.in_reset = false;
        }

        if !inputs.enable {
            return events;
        }

        // Decoders
        let step = self.encoder.update(inputs.enc_a, inputs.enc_b);
        let press = self.button.update(inputs.button);

        // Menu
        let mut aborted = false;
        if let Some(step) = step {
            self.menu.on_step(step);
            push(&mut events, Event::Step(step));
        }
        if let Some(tier) = press {
            push(&mut events, Event::Press(tier));
            if let Some(transition) = self.menu.on_press(tier) {
                self.on_transition();
                aborted = true;
                push(&mut events, Event::Menu(transition));
            }
        }

        // Peripherals: a read started this tick first clocks on the next one
        if let Some(byte) = self.flash.tick(inputs.flash_miso) {
            self.lookup = Some(byte);
            push(&mut events, Event::FlashReady(byte));
        }

        if let Some(light) = self.sensor.tick(inputs.sensor_miso) {
            self.light = light;
            push(&mut events, Event::SensorReady(light));
            self.pending_lookup = true;
        }

        // Select must be seen high for a tick between an abort and a restart
        if self.pending_lookup && !aborted {
            if self.flash.start(self.lookup_address()) {
                self.pending_lookup = false;
            } else {
                trace!("flash busy, lookup deferred");
            }
        }

        if self.sample_timer == 0 {
            self.sample_timer = self.config.bus.sample_interval_ticks;
            if !self.sensor.start() {
                trace!("sensor busy, sample skipped");
            }
        }
        self.sample_timer -= 1;

        // Display
        let glyphs = render(self.menu.readout(self.lookup));
        let frame = self.display.tick(&glyphs);

        self.outputs = Outputs {
            digit_select: frame.select,
            segments: frame.segments,
            sensor: self.sensor.lines(),
            flash: self.flash.lines(),
        };

        events
    }

    /// Force every component to its initial state
    fn apply_reset(&mut self) {
        self.encoder.reset();
        self.button.reset();
        self.menu.reset();
        self.sensor.reset();
        self.flash.reset();
        self.display.reset();
        self.sample_timer = 0;
        self.light = 0;
        self.lookup = None;
        self.pending_lookup = false;

        let glyphs = render(self.menu.readout(self.lookup));
        let frame = self.display.frame(&glyphs);
        self.outputs = Outputs {
            digit_select: frame.select,
            segments: frame.segments,
            sensor: self.sensor.lines(),
            flash: self.flash.lines(),
        };
    }

    /// A new menu state starts from the origin, and any lookup in flight
    /// was addressed with the old settings
    fn on_transition(&mut self) {
        self.encoder.recenter();
        self.flash.abort();
        self.lookup = None;
    }

    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    pub fn state(&self) -> MenuState {
        self.menu.current()
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    /// Knob position register
    pub fn position(&self) -> Nibble {
        self.encoder.position()
    }

    /// Ticks the button has been held
    pub fn hold_ticks(&self) -> u16 {
        self.button.hold_ticks()
    }

    /// Flash address for the current settings and light level
    pub fn lookup_address(&self) -> u32 {
        self.menu.settings().lookup_address(self.light)
    }

    /// Last looked-up exposure byte, if still valid
    pub fn lookup(&self) -> Option<u8> {
        self.lookup
    }

    /// Last sensor byte
    pub fn light(&self) -> u8 {
        self.light
    }

    pub fn sensor(&self) -> &SensorChannel {
        &self.sensor
    }

    pub fn flash(&self) -> &FlashChannel {
        &self.flash
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }
}

fn push(events: &mut Events, event: Event) {
    // At most one of each kind per tick
    let pushed = events.push(event).is_ok();
    debug_assert!(pushed, "event list full, dropped {:?}", event);
}
