mod controller;
mod error;
pub mod memory;
mod strategy;
mod validator;

pub use controller::ServiceController;
pub use error::{ControllerError, StrategyError, ValidationError};
