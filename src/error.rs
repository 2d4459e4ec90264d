/// Possible errors from the HTS221 driver.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq)]
pub enum Hts221Error<E> {
    /// Error from the I2C bus.
    I2c(E),
    /// The sensor did not report a finished one-shot conversion in time.
    ConversionTimeout,
    /// A measurement was requested before [`init`](crate::Hts221::init) succeeded.
    NotInitialized,
    /// The factory calibration anchors share the same raw count, so no slope
    /// can be derived from them.
    InvalidCalibration,
}

impl<E> From<E> for Hts221Error<E> {
    fn from(value: E) -> Self {
        Self::I2c(value)
    }
}
