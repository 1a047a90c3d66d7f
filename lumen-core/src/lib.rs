//! Board-agnostic core logic for the Lumen exposure meter
//!
//! This crate contains all controller logic that does not depend on
//! specific hardware implementations:
//!
//! - Quadrature decoding of the rotary knob
//! - Press-duration classification of the knob button
//! - Menu state machine (ISO, shutter, aperture, meter)
//! - Bit-level serial masters for the light sensor and the lookup flash
//! - Seven-segment display multiplexing
//! - Configuration type definitions
//!
//! Everything advances in lock-step through [`Controller::tick`], once per
//! clock pulse.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// Must come first so the logging macros are visible to every other module
#[macro_use]
mod fmt;

pub mod button;
pub mod config;
pub mod controller;
pub mod display;
pub mod encoder;
pub mod io;
pub mod menu;
pub mod serial;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, ControllerConfig};
pub use controller::{Controller, Event, Inputs, Outputs};
