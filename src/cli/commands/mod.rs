//! Command implementations for the tramite CLI

mod certificate;
mod config;
mod json_emit;
mod phases;
mod simulate;

pub use certificate::execute_certificate_command;
pub use config::execute_config_command;
pub use phases::execute_phases_command;
pub use simulate::execute_simulate_command;
