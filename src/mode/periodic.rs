use crate::error::Result;
use crate::mode::{Idle, Scd4xMeasure, Scd4xReader};
use crate::{Reading, SCD4x};
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::i2c;

/// Periodic measurement with a 5 second signal update interval, reading
/// returns the last measurement the sensor completed
#[derive(Default, Copy, Clone, Debug)]
pub struct Periodic {}

impl Periodic {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self {}
    }
}

const START_PERIODIC_MEASUREMENT: [u8; 2] = [0x21, 0xb1];
const READ_MEASUREMENT: [u8; 2] = [0xec, 0x05];
const GET_DATA_READY_STATUS: [u8; 2] = [0xe4, 0xb8];
const STOP_PERIODIC_MEASUREMENT: [u8; 2] = [0x3f, 0x86];

const READ_MEASUREMENT_DELAY_MS: u16 = 1;
const DATA_READY_DELAY_MS: u16 = 1;
// The sensor ignores further commands for 500 ms after a stop
const STOP_MEASUREMENT_DELAY_MS: u16 = 500;

// The low 11 bits of the status word flag a pending measurement
const DATA_READY_MASK: u16 = 0x07ff;

#[allow(dead_code)]
impl<I2C, D> SCD4x<Periodic, I2C, D>
where
    I2C: i2c::WriteRead + i2c::Write,
    D: DelayMs<u16>,
{
    /// Whether a measurement is waiting in the sensor's buffer. The buffer
    /// is emptied on read-out, polling this avoids a NACK on `read`
    pub fn data_ready(&mut self) -> Result<bool> {
        self.command(GET_DATA_READY_STATUS, DATA_READY_DELAY_MS)?;

        let mut buffer = [0; 3];
        self.i2c_read(&[], &mut buffer)?;

        Ok(Self::merge_bytes(buffer[0], buffer[1]) & DATA_READY_MASK != 0)
    }

    /// Stop periodic measurement and return the sensor to idle mode
    pub fn stop_measurement(mut self) -> Result<SCD4x<Idle, I2C, D>> {
        self.command(STOP_PERIODIC_MEASUREMENT, STOP_MEASUREMENT_DELAY_MS)?;
        Ok(self.with_mode(Idle::new()))
    }
}

impl<I2C, D> Scd4xReader for SCD4x<Periodic, I2C, D>
where
    I2C: i2c::WriteRead + i2c::Write,
    D: DelayMs<u16>,
{
    /// Read out the last measurement, if none is available yet the decoded
    /// frame fails range validation and an error is returned
    fn read(&mut self) -> Result<Reading> {
        self.command(READ_MEASUREMENT, READ_MEASUREMENT_DELAY_MS)?;

        let mut buffer = [0; 9];
        self.i2c_read(&[], &mut buffer)?;
        self.process_data(buffer)
    }
}

impl<I2C, D> Scd4xMeasure for SCD4x<Periodic, I2C, D>
where
    I2C: i2c::WriteRead + i2c::Write,
    D: DelayMs<u16>,
{
    /// Commence measuring
    #[allow(dead_code)]
    fn measure(&mut self) -> Result<()> {
        self.i2c_write(&START_PERIODIC_MEASUREMENT)
    }
}
