//! GPIO pin abstractions
//!
//! Provides traits for digital input and output lines. The controller samples
//! every input once per tick and drives every output once per tick.

/// Digital output pin
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently set low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

/// A constant level, for inputs that are tied off on a given board
impl InputPin for bool {
    fn is_high(&self) -> bool {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Latch(bool);

    impl OutputPin for Latch {
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

    #[test]
    fn test_set_state_drives_level() {
        let mut pin = Latch(false);
        pin.set_state(true);
        assert!(pin.is_set_high());
        pin.set_state(false);
        assert!(pin.is_set_low());
    }

    #[test]
    fn test_tied_input() {
        assert!(true.is_high());
        assert!(false.is_low());
    }
}
