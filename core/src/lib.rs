pub mod action;
pub mod config;
pub mod exit_code;
pub mod serdable;
pub mod style;
pub mod testing;

pub use crate::config::RunConfig;
