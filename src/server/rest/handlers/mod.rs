pub mod cycles;
pub mod service;
