pub mod access;
pub mod aggregate;
pub mod error;
pub mod roster;
pub mod schedule;
