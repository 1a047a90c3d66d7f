//! Lumen Hardware Abstraction Layer
//!
//! This crate defines the signal-level traits the controller core is written
//! against. A board crate (or a simulator) implements them for its pins; the
//! core never touches registers directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  lumen-core (tick-driven controller)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  lumen-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  board pins   │       │   simulator   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`spi::Mode`] - Serial clock polarity/phase used by the bit-level masters

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod spi;

// Re-export key traits at crate root for convenience
pub use gpio::{InputPin, OutputPin};
pub use spi::{ClockEdge, Mode, Phase, Polarity};
