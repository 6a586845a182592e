use crate::error::{Result, SCDError};
use crate::mode::{Periodic, Scd4xMeasure};
use crate::SCD4x;
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::i2c;

/// Configuration state, the sensor powers up here and returns here
/// after a running measurement is stopped
#[derive(Default, Copy, Clone, Debug)]
pub struct Idle {}

impl Idle {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self {}
    }
}

const GET_SERIAL_NUMBER: [u8; 2] = [0x36, 0x82];
const PERFORM_SELF_TEST: [u8; 2] = [0x36, 0x39];
const PERSIST_SETTINGS: [u8; 2] = [0x36, 0x15];
const PERFORM_FACTORY_RESET: [u8; 2] = [0x36, 0x32];
const REINIT: [u8; 2] = [0x36, 0x46];

// Command execution times from the datasheet
const SERIAL_NUMBER_DELAY_MS: u16 = 1;
const SELF_TEST_DELAY_MS: u16 = 10_000;
const PERSIST_SETTINGS_DELAY_MS: u16 = 800;
const FACTORY_RESET_DELAY_MS: u16 = 800;
const REINIT_DELAY_MS: u16 = 20;

#[allow(dead_code)]
impl<I2C, D> SCD4x<Idle, I2C, D>
where
    I2C: i2c::WriteRead + i2c::Write,
    D: DelayMs<u16>,
{
    /// Check that the sensor answers on its address with an empty write
    pub fn probe(&mut self) -> Result<()> {
        self.i2c_write(&[])
    }

    /// Read the unique 48-bit serial number, three big-endian words
    pub fn serial_number(&mut self) -> Result<u64> {
        self.command(GET_SERIAL_NUMBER, SERIAL_NUMBER_DELAY_MS)?;

        let mut buffer = [0; 9];
        self.i2c_read(&[], &mut buffer)?;

        let word0 = Self::merge_bytes(buffer[0], buffer[1]) as u64;
        let word1 = Self::merge_bytes(buffer[3], buffer[4]) as u64;
        let word2 = Self::merge_bytes(buffer[6], buffer[7]) as u64;
        Ok(word0 << 32 | word1 << 16 | word2)
    }

    /// End-of-line functionality test, blocks for 10 seconds. A non-zero
    /// status word means the sensor detected a malfunction
    pub fn perform_self_test(&mut self) -> Result<()> {
        self.command(PERFORM_SELF_TEST, SELF_TEST_DELAY_MS)?;

        let mut buffer = [0; 3];
        self.i2c_read(&[], &mut buffer)?;

        let status = Self::merge_bytes(buffer[0], buffer[1]);
        if status != 0 {
            return Err(SCDError::SelfTestFailedError { status });
        }
        Ok(())
    }

    /// Store the current volatile settings in EEPROM. The EEPROM is only
    /// guaranteed for 2000 write cycles, send this sparingly
    pub fn persist_settings(&mut self) -> Result<()> {
        self.command(PERSIST_SETTINGS, PERSIST_SETTINGS_DELAY_MS)
    }

    /// Reset all EEPROM settings and erase the calibration history
    pub fn factory_reset(&mut self) -> Result<()> {
        self.command(PERFORM_FACTORY_RESET, FACTORY_RESET_DELAY_MS)
    }

    /// Reinitialize the sensor by reloading settings from EEPROM. If this
    /// doesn't take, power-cycle the sensor instead
    pub fn reinit(&mut self) -> Result<()> {
        self.command(REINIT, REINIT_DELAY_MS)
    }

    /// Enter periodic measurement mode. The first reading is available
    /// after the 5 second signal update interval
    pub fn start_measurement(self) -> Result<SCD4x<Periodic, I2C, D>> {
        let mut sensor = self.with_mode(Periodic::new());
        sensor.measure()?;
        Ok(sensor)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::SENSOR_ADDRESS;
    use embedded_hal_mock::delay::MockNoop;
    use embedded_hal_mock::i2c::{Mock as I2cMock, Transaction};

    fn sensor(expectations: &[Transaction]) -> (SCD4x<Idle, I2cMock, MockNoop>, I2cMock) {
        let i2c = I2cMock::new(expectations);
        (SCD4x::new(i2c.clone(), MockNoop::new()), i2c)
    }

    #[test]
    fn probe_is_an_empty_write() {
        let expectations = [Transaction::write(SENSOR_ADDRESS, vec![])];
        let (mut scd, mut i2c) = sensor(&expectations);

        scd.probe().unwrap();
        i2c.done();
    }

    #[test]
    fn probe_reports_missing_sensor() {
        let expectations = [Transaction::write(SENSOR_ADDRESS, vec![])
            .with_error(embedded_hal_mock::MockError::Io(std::io::ErrorKind::Other))];
        let (mut scd, mut i2c) = sensor(&expectations);

        assert_eq!(scd.probe(), Err(SCDError::WriteI2CError));
        i2c.done();
    }

    #[test]
    fn reads_serial_number() {
        // Datasheet example serial: 0xf896_9f07_3bbe
        let expectations = [
            Transaction::write(SENSOR_ADDRESS, vec![0x36, 0x82]),
            Transaction::write_read(
                SENSOR_ADDRESS,
                vec![],
                vec![0xf8, 0x96, 0x31, 0x9f, 0x07, 0xc2, 0x3b, 0xbe, 0x89],
            ),
        ];
        let (mut scd, mut i2c) = sensor(&expectations);

        assert_eq!(scd.serial_number().unwrap(), 0xf896_9f07_3bbe);
        i2c.done();
    }

    #[test]
    fn self_test_passes_on_zero_status() {
        let expectations = [
            Transaction::write(SENSOR_ADDRESS, vec![0x36, 0x39]),
            Transaction::write_read(SENSOR_ADDRESS, vec![], vec![0x00, 0x00, 0x81]),
        ];
        let (mut scd, mut i2c) = sensor(&expectations);

        scd.perform_self_test().unwrap();
        i2c.done();
    }

    #[test]
    fn self_test_reports_malfunction() {
        let expectations = [
            Transaction::write(SENSOR_ADDRESS, vec![0x36, 0x39]),
            Transaction::write_read(SENSOR_ADDRESS, vec![], vec![0x00, 0x03, 0xd9]),
        ];
        let (mut scd, mut i2c) = sensor(&expectations);

        assert_eq!(
            scd.perform_self_test(),
            Err(SCDError::SelfTestFailedError { status: 0x0003 })
        );
        i2c.done();
    }

    #[test]
    fn eeprom_commands_are_write_only() {
        let expectations = [
            Transaction::write(SENSOR_ADDRESS, vec![0x36, 0x15]),
            Transaction::write(SENSOR_ADDRESS, vec![0x36, 0x32]),
            Transaction::write(SENSOR_ADDRESS, vec![0x36, 0x46]),
        ];
        let (mut scd, mut i2c) = sensor(&expectations);

        scd.persist_settings().unwrap();
        scd.factory_reset().unwrap();
        scd.reinit().unwrap();
        i2c.done();
    }

    #[test]
    fn start_measurement_enters_periodic_mode() {
        let expectations = [Transaction::write(SENSOR_ADDRESS, vec![0x21, 0xb1])];
        let (scd, mut i2c) = sensor(&expectations);

        let _measuring: SCD4x<Periodic, _, _> = scd.start_measurement().unwrap();
        i2c.done();
    }
}
