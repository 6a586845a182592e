use thiserror::Error;

pub type Result<T> = core::result::Result<T, SCDError>;
#[derive(Error, Copy, Clone, Debug, PartialEq)]
pub enum SCDError {
    #[error("Write Read I2C Error")]
    WriteReadI2CError,
    #[error("Write I2C Error")]
    WriteI2CError,
    #[error("Reading out of sensor range: {co2} ppm CO2, {temperature} C, {humidity} %RH")]
    MeasurementOutOfRangeError {
        co2: f32,
        temperature: f32,
        humidity: f32,
    },
    #[error("Self test reported a malfunction, status word {status:#06x}")]
    SelfTestFailedError { status: u16 },
}
