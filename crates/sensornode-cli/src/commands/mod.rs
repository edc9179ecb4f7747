//! Command implementations for the CLI.

mod config;
mod recent;
mod status;
mod write;

pub use config::cmd_config;
pub use recent::cmd_recent;
pub use status::cmd_status;
pub use write::{cmd_exec, cmd_init, cmd_write};
