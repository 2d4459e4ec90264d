use embedded_hal::{delay::DelayNs, i2c::I2c};

use crate::calibration::{self, Calibration, DISPLAY_DIGITS};
use crate::error::Hts221Error;
use crate::register::{self, RegisterBus};

/// Default number of status reads before a one-shot conversion is given up on.
pub const DEFAULT_MAX_POLLS: u16 = 250;

/// Time to wait (in milliseconds) between two status reads.
const POLL_INTERVAL_MS: u32 = 1;

/// AV_CONF: 32 temperature samples, 256 humidity samples.
const AV_CONF_DEFAULT: u8 = 0x26;

/// CTRL_REG1: powered on, block data update, 1 Hz output data rate.
const CTRL_REG1_DEFAULT: u8 = 0x85;

const CTRL1_PD: u8 = 0x80;
const CTRL1_ODR_1HZ: u8 = 0x01;
const CTRL2_ONE_SHOT: u8 = 0x01;

/// STATUS bit raised once a new temperature sample is available.
const STATUS_T_DA: u8 = 0x01;
/// STATUS bit raised once a new humidity sample is available.
const STATUS_H_DA: u8 = 0x02;

/// Driver for the HTS221 humidity and temperature sensor.
pub struct Hts221<I2C, D> {
    bus: RegisterBus<I2C>,
    delay: D,
    calibration: Option<Calibration>,
    oneshot: bool,
    max_polls: u16,
}

/// Unit for temperature readings.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

/// Reading returned by the HTS221 sensor.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    /// Temperature in degrees Celsius.
    pub temperature: f32,
    /// Relative humidity in percent.
    pub relative_humidity: f32,
}

impl<I2C, DELAY> Hts221<I2C, DELAY>
where
    I2C: I2c,
    DELAY: DelayNs,
{
    /// Creates a new instance of the HTS221 driver.
    ///
    /// No bus traffic happens until [`init`](Self::init) is called.
    ///
    /// # Arguments
    ///
    /// * `i2c` - The I2C bus the sensor is attached to.
    /// * `delay` - A delay provider implementing the `DelayNs` trait, used while
    ///   waiting for one-shot conversions.
    pub fn new(i2c: I2C, delay: DELAY) -> Self {
        Hts221 {
            bus: RegisterBus::new(i2c),
            delay,
            calibration: None,
            oneshot: false,
            max_polls: DEFAULT_MAX_POLLS,
        }
    }

    /// Loads the factory calibration and configures the sensor.
    ///
    /// Averaging is fixed to 32 temperature and 256 humidity samples, the
    /// sensor is powered on with block data update at 1 Hz, and continuous
    /// mode is selected. Calling it again re-reads the calibration.
    ///
    /// # Errors
    ///
    /// * `Hts221Error::I2c` on a bus failure. A calibration loaded by an
    ///   earlier call stays in place.
    /// * `Hts221Error::InvalidCalibration` if the factory anchors are unusable.
    pub fn init(&mut self) -> Result<(), Hts221Error<I2C::Error>> {
        let calibration = Calibration::read(&mut self.bus)?;
        #[cfg(feature = "defmt")]
        defmt::debug!("hts221: calibration {}", calibration);

        self.bus.write(register::AV_CONF, AV_CONF_DEFAULT)?;
        self.bus.write(register::CTRL_REG1, CTRL_REG1_DEFAULT)?;
        self.set_oneshot_mode(false)?;

        self.calibration = Some(calibration);
        Ok(())
    }

    /// Switches between one-shot and continuous acquisition.
    ///
    /// In one-shot mode every measurement triggers a single conversion and
    /// waits for it, which keeps the sensor idle in between.
    pub fn set_oneshot_mode(&mut self, enabled: bool) -> Result<(), Hts221Error<I2C::Error>> {
        let odr = if enabled { 0 } else { CTRL1_ODR_1HZ };
        self.bus.write_masked(register::CTRL_REG1, odr, 0xFC)?;
        self.oneshot = enabled;
        #[cfg(feature = "defmt")]
        defmt::debug!("hts221: oneshot mode {}", enabled);
        Ok(())
    }

    /// Powers the sensor up or down. Calibration is kept.
    pub fn set_power(&mut self, on: bool) -> Result<(), Hts221Error<I2C::Error>> {
        let pd = if on { CTRL1_PD } else { 0 };
        self.bus.write_masked(register::CTRL_REG1, pd, !CTRL1_PD)?;
        #[cfg(feature = "defmt")]
        defmt::debug!("hts221: power {}", on);
        Ok(())
    }

    /// Sets how many status reads a one-shot conversion may take. Reads are
    /// one millisecond apart, so the budget is about `max_polls - 1` ms.
    pub fn set_max_polls(&mut self, max_polls: u16) {
        self.max_polls = max_polls;
    }

    pub fn is_oneshot(&self) -> bool {
        self.oneshot
    }

    /// The calibration loaded by the last successful [`init`](Self::init).
    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    /// Reads the identification register (0xBC on a genuine HTS221).
    pub fn who_am_i(&mut self) -> Result<u8, Hts221Error<I2C::Error>> {
        Ok(self.bus.read_u8(register::WHO_AM_I)?)
    }

    /// Reads the relative humidity in percent, rounded to one decimal.
    ///
    /// # Errors
    ///
    /// * `Hts221Error::NotInitialized` before [`init`](Self::init).
    /// * `Hts221Error::ConversionTimeout` if a one-shot conversion never finishes.
    /// * `Hts221Error::I2c` on a bus failure.
    pub fn humidity(&mut self) -> Result<f32, Hts221Error<I2C::Error>> {
        let calibration = self.calibration.ok_or(Hts221Error::NotInitialized)?;

        self.wait_for_conversion(STATUS_H_DA)?;
        let raw = self.bus.read_i16(register::HUMIDITY_OUT)?;

        let humidity = calibration.humidity(raw);
        Ok(calibration::round_digits(humidity, DISPLAY_DIGITS))
    }

    /// Reads the temperature in the requested unit, rounded to one decimal.
    ///
    /// # Errors
    ///
    /// Same as [`humidity`](Self::humidity).
    pub fn temperature(&mut self, unit: TemperatureUnit) -> Result<f32, Hts221Error<I2C::Error>> {
        let calibration = self.calibration.ok_or(Hts221Error::NotInitialized)?;

        self.wait_for_conversion(STATUS_T_DA)?;
        let raw = self.bus.read_i16(register::TEMP_OUT)?;

        let mut temperature = calibration.temperature(raw);
        if unit == TemperatureUnit::Fahrenheit {
            temperature = calibration::celsius_to_fahrenheit(temperature);
        }

        Ok(calibration::round_digits(temperature, DISPLAY_DIGITS))
    }

    /// Reads humidity, then temperature in degrees Celsius.
    ///
    /// In one-shot mode each value gets its own conversion.
    pub fn read(&mut self) -> Result<Reading, Hts221Error<I2C::Error>> {
        let relative_humidity = self.humidity()?;
        let temperature = self.temperature(TemperatureUnit::Celsius)?;

        Ok(Reading {
            temperature,
            relative_humidity,
        })
    }

    /// Releases the I2C bus and the delay provider.
    pub fn release(self) -> (I2C, DELAY) {
        (self.bus.release(), self.delay)
    }

    /// Runs one conversion and waits for `ready` in STATUS. Does nothing in
    /// continuous mode.
    ///
    /// The output register read before polling clears a stale ready flag.
    fn wait_for_conversion(&mut self, ready: u8) -> Result<(), Hts221Error<I2C::Error>> {
        if !self.oneshot {
            return Ok(());
        }

        let ctrl2 = self.bus.read_u8(register::CTRL_REG2)?;
        self.bus.write(register::CTRL_REG2, ctrl2 | CTRL2_ONE_SHOT)?;

        // 0x29 for humidity, 0x2B for temperature
        self.bus.read_u8(0x2D - ready * 2)?;

        for attempt in 0..self.max_polls {
            if attempt > 0 {
                self.delay.delay_ms(POLL_INTERVAL_MS);
            }
            if self.bus.read_u8(register::STATUS)? & ready != 0 {
                return Ok(());
            }
        }

        #[cfg(feature = "defmt")]
        defmt::warn!("hts221: conversion timeout, {} polls", self.max_polls);
        Err(Hts221Error::ConversionTimeout)
    }
}
