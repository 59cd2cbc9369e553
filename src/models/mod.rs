pub mod reading;

pub use reading::{Grade, PollutantReading};
