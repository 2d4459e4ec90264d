use embedded_hal::i2c::I2c;
#[cfg_attr(test, allow(unused_imports))]
use micromath::F32Ext;

use crate::error::Hts221Error;
use crate::register::{self, RegisterBus};

/// Number of decimal digits kept in reported measurements.
pub const DISPLAY_DIGITS: u8 = 1;

/// Most decimal digits [`round_digits`] keeps; an `f32` carries about seven
/// significant digits.
pub const MAX_DIGITS: u8 = 6;

/// A factory calibration point: a raw ADC count and the physical value it stands for.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Anchor {
    /// Raw ADC count.
    pub raw: i16,
    /// Physical value at `raw`.
    pub value: f32,
}

/// Two-point linear calibration for both channels, derived once from the
/// device's factory trim.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Calibration {
    /// Lower temperature anchor, degrees Celsius.
    pub t0: Anchor,
    /// Upper temperature anchor, degrees Celsius.
    pub t1: Anchor,
    /// Lower humidity anchor, percent relative humidity.
    pub h0: Anchor,
    /// Upper humidity anchor, percent relative humidity.
    pub h1: Anchor,
    kt: f32,
    kh: f32,
}

impl Calibration {
    /// Builds the conversion from two temperature and two humidity anchors.
    ///
    /// Returns `None` if either pair shares the same raw count, since no
    /// slope can be derived from it.
    pub fn new(t0: Anchor, t1: Anchor, h0: Anchor, h1: Anchor) -> Option<Self> {
        if t0.raw == t1.raw || h0.raw == h1.raw {
            return None;
        }

        Some(Calibration {
            t0,
            t1,
            h0,
            h1,
            kt: slope(t0, t1),
            kh: slope(h0, h1),
        })
    }

    /// Reads the calibration block from the device.
    pub fn read<I2C: I2c>(bus: &mut RegisterBus<I2C>) -> Result<Self, Hts221Error<I2C::Error>> {
        let t0_out = bus.read_i16(register::T0_OUT)?;
        let t1_out = bus.read_i16(register::T1_OUT)?;
        let msb = bus.read_u8(register::T1_T0_MSB)?;
        let t0_x8 = bus.read_u8(register::T0_DEGC_X8)?;
        let t1_x8 = bus.read_u8(register::T1_DEGC_X8)?;
        let (t0_degc, t1_degc) = decode_reference_temperatures(t0_x8, t1_x8, msb);

        let h0_out = bus.read_i16(register::H0_T0_OUT)?;
        let h1_out = bus.read_i16(register::H1_T0_OUT)?;
        let h0_rh = f32::from(bus.read_u8(register::H0_RH_X2)?) / 2.0;
        let h1_rh = f32::from(bus.read_u8(register::H1_RH_X2)?) / 2.0;

        let t0 = Anchor {
            raw: t0_out,
            value: t0_degc,
        };
        let t1 = Anchor {
            raw: t1_out,
            value: t1_degc,
        };
        let h0 = Anchor {
            raw: h0_out,
            value: h0_rh,
        };
        let h1 = Anchor {
            raw: h1_out,
            value: h1_rh,
        };

        Calibration::new(t0, t1, h0, h1).ok_or(Hts221Error::InvalidCalibration)
    }

    /// Temperature slope in degrees Celsius per count.
    pub fn kt(&self) -> f32 {
        self.kt
    }

    /// Humidity slope in percent relative humidity per count.
    pub fn kh(&self) -> f32 {
        self.kh
    }

    /// Converts a raw temperature count to degrees Celsius, unrounded.
    pub fn temperature(&self, raw: i16) -> f32 {
        self.t0.value + (f32::from(raw) - f32::from(self.t0.raw)) * self.kt
    }

    /// Converts a raw humidity count to percent relative humidity, unrounded.
    pub fn humidity(&self, raw: i16) -> f32 {
        self.h0.value + (f32::from(raw) - f32::from(self.h0.raw)) * self.kh
    }
}

fn slope(a: Anchor, b: Anchor) -> f32 {
    (b.value - a.value) / (f32::from(b.raw) - f32::from(a.raw))
}

/// Decodes the two reference temperatures.
///
/// `t0_x8` and `t1_x8` hold the low eight bits of each value in 1/8 degree
/// steps. Their two high bits share `msb`: bits 1:0 for T0, bits 3:2 for T1.
/// Each high bit pair is worth 32 degrees.
pub fn decode_reference_temperatures(t0_x8: u8, t1_x8: u8, msb: u8) -> (f32, f32) {
    let t = msb % 16;
    let t0 = f32::from(t0_x8) / 8.0 + f32::from(t % 4) * 32.0;
    let t1 = f32::from(t1_x8) / 8.0 + f32::from(t / 4) * 32.0;
    (t0, t1)
}

/// Rounds `x` to `digits` decimal places, halves away from zero.
///
/// `digits` is capped at [`MAX_DIGITS`].
pub fn round_digits(x: f32, digits: u8) -> f32 {
    let scale = 10.0f32.powi(i32::from(digits.min(MAX_DIGITS)));
    let scaled = x * scale;

    // Every f32 from 2^23 up is already whole
    if scaled.abs() >= 8_388_608.0 {
        return x;
    }

    scaled.round() / scale
}

/// Converts degrees Celsius to degrees Fahrenheit.
pub fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    32.0 + celsius * 9.0 / 5.0
}
