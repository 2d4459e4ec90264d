use embedded_hal::i2c::I2c;

/// Fixed 7-bit I2C address of the HTS221.
pub const DEVICE_ADDRESS: u8 = 0x5F;

/// Setting this bit in a register address makes the device advance to the
/// next register for every further byte of the same read.
pub const AUTO_INCREMENT: u8 = 0x80;

pub const WHO_AM_I: u8 = 0x0F;
pub const AV_CONF: u8 = 0x10;
pub const CTRL_REG1: u8 = 0x20;
pub const CTRL_REG2: u8 = 0x21;
pub const STATUS: u8 = 0x27;
pub const HUMIDITY_OUT: u8 = 0x28;
pub const TEMP_OUT: u8 = 0x2A;

// Factory calibration block
pub const H0_RH_X2: u8 = 0x30;
pub const H1_RH_X2: u8 = 0x31;
pub const T0_DEGC_X8: u8 = 0x32;
pub const T1_DEGC_X8: u8 = 0x33;
pub const T1_T0_MSB: u8 = 0x35;
pub const H0_T0_OUT: u8 = 0x36;
pub const H1_T0_OUT: u8 = 0x3A;
pub const T0_OUT: u8 = 0x3C;
pub const T1_OUT: u8 = 0x3E;

/// Typed register access to a single HTS221 on an I2C bus.
///
/// Every method is one blocking bus transfer (two for [`write_masked`]) and
/// reports the transport error as is.
///
/// [`write_masked`]: RegisterBus::write_masked
pub struct RegisterBus<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> RegisterBus<I2C> {
    pub fn new(i2c: I2C) -> Self {
        RegisterBus { i2c }
    }

    /// Writes `value` into `reg`.
    pub fn write(&mut self, reg: u8, value: u8) -> Result<(), I2C::Error> {
        self.i2c.write(DEVICE_ADDRESS, &[reg, value])
    }

    pub fn read_u8(&mut self, reg: u8) -> Result<u8, I2C::Error> {
        let mut buf = [0; 1];
        self.i2c.write_read(DEVICE_ADDRESS, &[reg], &mut buf)?;
        Ok(buf[0])
    }

    pub fn read_i8(&mut self, reg: u8) -> Result<i8, I2C::Error> {
        Ok(self.read_u8(reg)? as i8)
    }

    /// Reads the little-endian register pair starting at `reg`.
    pub fn read_u16(&mut self, reg: u8) -> Result<u16, I2C::Error> {
        let mut buf = [0; 2];
        self.i2c.write_read(DEVICE_ADDRESS, &[reg | AUTO_INCREMENT], &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Reads the little-endian register pair starting at `reg` as a signed value.
    pub fn read_i16(&mut self, reg: u8) -> Result<i16, I2C::Error> {
        Ok(self.read_u16(reg)? as i16)
    }

    /// Read-modify-write of `reg`: keeps the bits set in `mask` and ORs in `value`.
    ///
    /// `value` must not have any bit in common with `mask`, otherwise the
    /// preserved bits get overwritten.
    pub fn write_masked(&mut self, reg: u8, value: u8, mask: u8) -> Result<(), I2C::Error> {
        debug_assert_eq!(value & mask, 0, "value overlaps preserved bits");
        let prior = self.read_u8(reg)?;
        self.write(reg, (prior & mask) | value)
    }

    /// Gives back the underlying bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTx};

    #[test]
    fn test_write() {
        let mut i2c = I2cMock::new(&[I2cTx::write(DEVICE_ADDRESS, vec![AV_CONF, 0x26])]);

        let mut bus = RegisterBus::new(i2c.clone());
        bus.write(AV_CONF, 0x26).unwrap();

        i2c.done();
    }

    #[test]
    fn test_read_single_byte() {
        let mut i2c = I2cMock::new(&[
            I2cTx::write_read(DEVICE_ADDRESS, vec![WHO_AM_I], vec![0xBC]),
            I2cTx::write_read(DEVICE_ADDRESS, vec![WHO_AM_I], vec![0xBC]),
        ]);

        let mut bus = RegisterBus::new(i2c.clone());
        assert_eq!(bus.read_u8(WHO_AM_I).unwrap(), 0xBC);
        // 0xBC = 188 unsigned, -68 signed
        assert_eq!(bus.read_i8(WHO_AM_I).unwrap(), -68);

        i2c.done();
    }

    #[test]
    fn test_read_two_bytes_sets_auto_increment() {
        let mut i2c = I2cMock::new(&[
            // Low byte first
            I2cTx::write_read(DEVICE_ADDRESS, vec![0xBC], vec![0x34, 0x12]),
            I2cTx::write_read(DEVICE_ADDRESS, vec![0xBC], vec![0xFE, 0xFF]),
        ]);

        let mut bus = RegisterBus::new(i2c.clone());
        assert_eq!(bus.read_u16(T0_OUT).unwrap(), 0x1234);
        assert_eq!(bus.read_i16(T0_OUT).unwrap(), -2);

        i2c.done();
    }

    #[test]
    fn test_write_masked_preserves_masked_bits() {
        // prior 0b1000_0110, mask keeps bits 7..2, value sets bit 0
        let mut i2c = I2cMock::new(&[
            I2cTx::write_read(DEVICE_ADDRESS, vec![CTRL_REG1], vec![0b1000_0110]),
            I2cTx::write(DEVICE_ADDRESS, vec![CTRL_REG1, 0b1000_0101]),
        ]);

        let mut bus = RegisterBus::new(i2c.clone());
        bus.write_masked(CTRL_REG1, 0x01, 0xFC).unwrap();

        i2c.done();
    }

    #[test]
    fn test_write_masked_result_matches_formula() {
        let prior: u8 = 0b0101_1010;
        let mask: u8 = 0x7F;
        let value: u8 = 0x80;
        let expected = (prior & mask) | value;

        let mut i2c = I2cMock::new(&[
            I2cTx::write_read(DEVICE_ADDRESS, vec![CTRL_REG1], vec![prior]),
            I2cTx::write(DEVICE_ADDRESS, vec![CTRL_REG1, expected]),
        ]);

        let mut bus = RegisterBus::new(i2c.clone());
        bus.write_masked(CTRL_REG1, value, mask).unwrap();
        assert_eq!(expected, 0b1101_1010);

        i2c.done();
    }

    #[test]
    fn test_write_masked_stops_on_read_error() {
        let failed_read = I2cTx::write_read(DEVICE_ADDRESS, vec![CTRL_REG1], vec![0x00])
            .with_error(ErrorKind::Other);
        let mut i2c = I2cMock::new(&[failed_read]);

        let mut bus = RegisterBus::new(i2c.clone());
        assert_eq!(
            bus.write_masked(CTRL_REG1, 0x80, 0x7F).unwrap_err(),
            ErrorKind::Other
        );

        i2c.done();
    }

    #[test]
    fn test_release() {
        let i2c = I2cMock::new(&[]);
        let bus = RegisterBus::new(i2c);
        let mut i2c = bus.release();
        i2c.done();
    }
}
