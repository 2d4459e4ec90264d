//! HTS221 Sensor Driver for Embedded Rust
//!
//! This crate provides a platform-agnostic driver for the ST HTS221 capacitive
//! humidity and temperature sensor, built on top of the [`embedded-hal`] traits.
//!
//! # Features
//! - Blocking synchronous API using `embedded-hal` traits
//! - Designed for `no_std` environments
//! - Factory calibration is read once at [`Hts221::init`] and applied to every reading
//! - Continuous (1 Hz) or low-power one-shot acquisition
//! - Optional logging support via `defmt`
//!
//! # Dependencies
//! This driver depends on the following `embedded-hal` traits:
//! - [`I2c`] for register access
//! - [`DelayNs`] for pacing the one-shot status polls
//!
//! # Optional Features
//! - `defmt`: Implements `defmt::Format` and emits driver log messages
//!
//! # Example
//!
//! ```ignore
//! let mut hts = Hts221::new(i2c, delay);
//! hts.init()?;
//! hts.set_oneshot_mode(true)?;
//! let humidity = hts.humidity()?;
//! let temperature = hts.temperature(TemperatureUnit::Celsius)?;
//! ```
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal
//! [`I2c`]: embedded_hal::i2c::I2c
//! [`DelayNs`]: embedded_hal::delay::DelayNs

#![cfg_attr(not(test), no_std)]

pub mod calibration;
pub mod error;
pub mod hts221;
pub mod register;

pub use calibration::{Anchor, Calibration};
pub use error::Hts221Error;
pub use hts221::{Hts221, Reading, TemperatureUnit};
