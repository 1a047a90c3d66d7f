//! Pin glue
//!
//! Samples a set of [`InputPin`]s into [`Inputs`] and drives [`Outputs`] onto
//! [`OutputPin`]s. Which physical pin backs which signal is up to the board,
//! and each signal may use its own pin type.

use lumen_hal::{InputPin, OutputPin};

use crate::controller::{Inputs, Outputs};
use crate::serial::SerialLines;

/// Input signals, one pin each
pub struct InputPins<A, B, Btn, En, Rst, SMiso, FMiso> {
    pub enc_a: A,
    pub enc_b: B,
    /// Active-low
    pub button: Btn,
    pub enable: En,
    /// Active-low
    pub rst_n: Rst,
    pub sensor_miso: SMiso,
    pub flash_miso: FMiso,
}

impl<A, B, Btn, En, Rst, SMiso, FMiso> InputPins<A, B, Btn, En, Rst, SMiso, FMiso>
where
    A: InputPin,
    B: InputPin,
    Btn: InputPin,
    En: InputPin,
    Rst: InputPin,
    SMiso: InputPin,
    FMiso: InputPin,
{
    /// Sample every input once
    pub fn sample(&self) -> Inputs {
        Inputs {
            enc_a: self.enc_a.is_high(),
            enc_b: self.enc_b.is_high(),
            button: self.button.is_high(),
            enable: self.enable.is_high(),
            rst_n: self.rst_n.is_high(),
            sensor_miso: self.sensor_miso.is_high(),
            flash_miso: self.flash_miso.is_high(),
        }
    }
}

/// Eight pins carrying one byte, bit 0 first
pub struct BytePins<O> {
    pub pins: [O; 8],
}

impl<O: OutputPin> BytePins<O> {
    pub fn drive(&mut self, value: u8) {
        for (bit, pin) in self.pins.iter_mut().enumerate() {
            pin.set_state(value & (1 << bit) != 0);
        }
    }
}

/// Anything that can carry one peripheral bundle
pub trait SerialOutput {
    fn drive(&mut self, lines: SerialLines);
}

/// One peripheral bundle
pub struct SerialPins<Sel, Clk, Mosi> {
    pub select: Sel,
    pub clock: Clk,
    pub mosi: Mosi,
}

impl<Sel: OutputPin, Clk: OutputPin, Mosi: OutputPin> SerialOutput for SerialPins<Sel, Clk, Mosi> {
    fn drive(&mut self, lines: SerialLines) {
        self.select.set_state(lines.select);
        self.clock.set_state(lines.clock);
        self.mosi.set_state(lines.mosi);
    }
}

/// All output signals
pub struct OutputPins<Dig, Seg, Sensor, Flash> {
    pub digit_select: BytePins<Dig>,
    pub segments: BytePins<Seg>,
    pub sensor: Sensor,
    pub flash: Flash,
}

impl<Dig, Seg, Sensor, Flash> OutputPins<Dig, Seg, Sensor, Flash>
where
    Dig: OutputPin,
    Seg: OutputPin,
    Sensor: SerialOutput,
    Flash: SerialOutput,
{
    /// Drive one tick's outputs
    pub fn drive(&mut self, outputs: &Outputs) {
        self.digit_select.drive(outputs.digit_select);
        self.segments.drive(outputs.segments);
        self.sensor.drive(outputs.sensor);
        self.flash.drive(outputs.flash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControllerConfig;
    use crate::controller::Controller;

    #[derive(Default)]
    struct Pin(bool);

    impl OutputPin for Pin {
        fn set_high(&mut self) {
            self.0 = true;
        }

        fn set_low(&mut self) {
            self.0 = false;
        }

        fn is_set_high(&self) -> bool {
            self.0
        }
    }

    /// A second pin type, as a board would mix port and expander pins
    #[derive(Default)]
    struct Latch {
        level: bool,
    }

    impl OutputPin for Latch {
        fn set_high(&mut self) {
            self.level = true;
        }

        fn set_low(&mut self) {
            self.level = false;
        }

        fn is_set_high(&self) -> bool {
            self.level
        }
    }

    impl InputPin for Latch {
        fn is_high(&self) -> bool {
            self.level
        }
    }

    fn byte_pins() -> BytePins<Pin> {
        BytePins {
            pins: Default::default(),
        }
    }

    fn read_byte(pins: &BytePins<Pin>) -> u8 {
        pins.pins
            .iter()
            .enumerate()
            .fold(0, |acc, (bit, pin)| acc | ((pin.0 as u8) << bit))
    }

    #[test]
    fn test_sample_inputs() {
        let pins = InputPins {
            enc_a: true,
            enc_b: false,
            button: Latch { level: true },
            enable: true,
            rst_n: Latch { level: false },
            sensor_miso: false,
            flash_miso: Latch { level: true },
        };
        let inputs = pins.sample();
        assert!(inputs.enc_a && !inputs.enc_b);
        assert!(inputs.button && inputs.enable);
        assert!(!inputs.rst_n);
        assert!(inputs.flash_miso && !inputs.sensor_miso);
    }

    #[test]
    fn test_drive_outputs_from_controller() {
        let mut ctrl = Controller::new(ControllerConfig::default()).unwrap();
        ctrl.tick(&Inputs {
            rst_n: false,
            ..Inputs::default()
        });

        let mut pins = OutputPins {
            digit_select: byte_pins(),
            segments: byte_pins(),
            sensor: SerialPins {
                select: Pin(false),
                clock: Latch::default(),
                mosi: Pin(true),
            },
            flash: SerialPins {
                select: Latch::default(),
                clock: Pin(false),
                mosi: Latch { level: true },
            },
        };
        pins.drive(ctrl.outputs());

        assert_eq!(read_byte(&pins.digit_select), 0x7E);
        assert_eq!(read_byte(&pins.segments), 0xC0);
        assert!(pins.sensor.select.is_set_high());
        assert!(pins.flash.clock.is_set_high());
        assert!(pins.flash.mosi.is_set_low());
    }
}
