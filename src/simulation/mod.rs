pub mod agent;
pub mod config;
pub mod environment;
pub mod error;
pub mod inference;
pub mod params;
pub mod perception;
pub mod planning;

pub use config::{Granularity, Parameters};
pub use planning::{ActionPlanner, MotorCommand};
