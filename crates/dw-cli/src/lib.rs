//! CLI and daemon for the domain warden.

pub mod alarm_slot;
pub mod cli;
pub mod commands;
pub mod config;

pub use alarm_slot::AlarmSlot;
pub use cli::{Cli, Commands, OptionsAction};
pub use config::Config;
