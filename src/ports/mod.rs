//! Port traits at the boundaries of the screening core.

pub mod config_port;
pub mod data_port;
pub mod report_port;
