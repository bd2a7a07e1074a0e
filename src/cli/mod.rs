//! Command-line entry: argument parsing, logging and tracing setup, dispatch.

pub mod actions;
pub mod telemetry;

pub mod commands;
pub mod dispatch;

mod start;
pub use self::start::start;
