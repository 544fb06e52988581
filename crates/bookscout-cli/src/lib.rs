//! bookscout CLI: configuration, console output, and the interactive driver.

pub mod commands;
pub mod config;
pub mod interactive;
pub mod output;
