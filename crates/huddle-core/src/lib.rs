pub mod config;
pub mod constants;
pub mod error;
pub mod slots;
pub mod week;
