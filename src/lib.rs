pub mod error;
pub mod mode;

use crate::mode::Idle;
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::i2c;
use error::{Result, SCDError};

pub mod prelude {
    pub use super::{
        mode::Idle, mode::Periodic, mode::Scd4xMeasure, mode::Scd4xReader, Reading,
        TemperatureUnit, SCD4x, SENSOR_ADDRESS,
    };
}

/// The sensor's fixed 7-bit I2C address
pub const SENSOR_ADDRESS: u8 = 0x62;

// 2**16
const CONVERSION_DENOM: f32 = 65536f32;

// Constants used to convert raw temperature ticks
const CELSIUS_PAIR: (f32, f32) = (45f32, 175f32);
const FAHRENHEIT_PAIR: (f32, f32) = (49f32, 315f32);

// The sensor's specified output ranges, a decoded reading outside
// these is reported as an error
const CO2_RANGE_PPM: (f32, f32) = (0f32, 40_000f32);
const TEMPERATURE_RANGE_CELSIUS: (f32, f32) = (-10f32, 60f32);
const HUMIDITY_RANGE_RH: (f32, f32) = (0f32, 100f32);

/// The CO2, temperature and humidity sensor
#[derive(Copy, Clone, Debug)]
pub struct SCD4x<Mode, I2C, D> {
    mode: Mode,
    i2c: I2C,
    delay: D,
    address: u8,
    unit: TemperatureUnit,
}

/// Represents the reading gotten from the sensor
#[derive(Default, Clone, Copy, Debug)]
pub struct Reading {
    /// CO2 concentration in parts per million
    pub co2: f32,
    pub temperature: f32,
    pub humidity: f32,
}

/// Influences what the reading temperature numbers are
#[allow(dead_code)]
#[derive(Default, Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

fn merge_bytes(a: u8, b: u8) -> u16 {
    ((a as u16) << 8) | b as u16
}

fn in_range(value: f32, min: f32, max: f32) -> bool {
    !(value <= min) && value <= max
}

fn validate_reading(co2: f32, celsius: f32, humidity: f32) -> Result<()> {
    let (co2_min, co2_max) = CO2_RANGE_PPM;
    let (temp_min, temp_max) = TEMPERATURE_RANGE_CELSIUS;
    let (hum_min, hum_max) = HUMIDITY_RANGE_RH;

    if in_range(co2, co2_min, co2_max)
        && in_range(celsius, temp_min, temp_max)
        && in_range(humidity, hum_min, hum_max)
    {
        return Ok(());
    }

    // An all-zero frame also lands here, the sensor sends one when the
    // measurement buffer is empty
    Err(SCDError::MeasurementOutOfRangeError {
        co2,
        temperature: celsius,
        humidity,
    })
}

impl<Mode, I2C, D> SCD4x<Mode, I2C, D> {
    /// Merges two bytes so the result is both, ex merge_bytes(0x21, 0xb1) = 0x21b1
    fn merge_bytes(a: u8, b: u8) -> u16 {
        merge_bytes(a, b)
    }

    /// Verifies the decoded values against the sensor's specified ranges
    fn validate_reading(co2: f32, celsius: f32, humidity: f32) -> Result<()> {
        validate_reading(co2, celsius, humidity)
    }
}

#[allow(dead_code)]
impl<I2C, D> SCD4x<Idle, I2C, D>
where
    I2C: i2c::WriteRead + i2c::Write,
    D: DelayMs<u16>,
{
    /// Create a new sensor, the sensor powers up in idle mode
    /// I2C clock frequency must be between 0 and 100 kHz
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self {
            mode: Idle::new(),
            i2c,
            delay,
            address: SENSOR_ADDRESS,
            unit: TemperatureUnit::default(),
        }
    }
}

#[allow(dead_code)]
impl<Mode, I2C, D> SCD4x<Mode, I2C, D>
where
    I2C: i2c::WriteRead + i2c::Write,
    D: DelayMs<u16>,
{
    /// Changes the SCD4x mode
    pub fn with_mode<NewMode>(self, mode: NewMode) -> SCD4x<NewMode, I2C, D> {
        SCD4x {
            mode,
            i2c: self.i2c,
            delay: self.delay,
            address: self.address,
            unit: self.unit,
        }
    }

    /// Change the sensor's temperature unit
    pub fn set_unit(&mut self, unit: TemperatureUnit) {
        self.unit = unit;
    }

    /// Change the sensor's temperature unit
    pub fn with_unit(mut self, unit: TemperatureUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Change the sensor's I2C address, only useful behind an address
    /// translator since the chip itself always answers on 0x62
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    fn i2c_write(&mut self, bytes: &[u8]) -> Result<()> {
        match self.i2c.write(self.address, bytes) {
            Ok(res) => Ok(res),
            Err(_) => Err(SCDError::WriteI2CError),
        }
    }

    fn i2c_read(&mut self, bytes: &[u8], buffer: &mut [u8]) -> Result<()> {
        match self.i2c.write_read(self.address, bytes, buffer) {
            Ok(res) => Ok(res),
            Err(_) => Err(SCDError::WriteReadI2CError),
        }
    }

    /// Write a 2-byte command and wait out its datasheet execution time
    fn command(&mut self, command: [u8; 2], delay_ms: u16) -> Result<()> {
        self.i2c_write(&command)?;
        self.delay.delay_ms(delay_ms);
        Ok(())
    }

    fn process_data(&self, buffer: [u8; 9]) -> Result<Reading> {
        // 2 bytes CO2, 1 byte CRC, 2 bytes T, 1 byte CRC,
        // 2 bytes RH, 1 byte CRC. The CRC bytes are not verified.
        let co2 = Self::merge_bytes(buffer[0], buffer[1]) as f32;

        let raw_temp = Self::merge_bytes(buffer[3], buffer[4]) as f32;
        let celsius = CELSIUS_PAIR.1 * (raw_temp / CONVERSION_DENOM) - CELSIUS_PAIR.0;

        let raw_humidity = Self::merge_bytes(buffer[6], buffer[7]) as f32;
        let humidity = 100f32 * raw_humidity / CONVERSION_DENOM;

        // Always validate against the datasheet ranges in Celsius
        Self::validate_reading(co2, celsius, humidity)?;

        let temperature = match self.unit {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => {
                let (sub, mul) = FAHRENHEIT_PAIR;
                mul * (raw_temp / CONVERSION_DENOM) - sub
            }
        };

        Ok(Reading {
            co2,
            temperature,
            humidity,
        })
    }
}
