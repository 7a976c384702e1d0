//! Port traits connecting the domain to the outside world.

pub mod config_port;
pub mod data_port;
