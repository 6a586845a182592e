use crate::error::Result;
use crate::Reading;

mod idle;
pub use idle::Idle;
mod periodic;
pub use periodic::Periodic;

pub trait Scd4xReader {
    /// Read the sensor readings
    fn read(&mut self) -> Result<Reading>;
}

pub trait Scd4xMeasure {
    /// Commence measuring
    fn measure(&mut self) -> Result<()>;
}
