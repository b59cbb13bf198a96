//! trendscan: momentum and trend screening for equity universes.
//!
//! Hexagonal architecture: indicator maths, classification and the batch
//! driver live in [`domain`], port traits in [`ports`], data sources and
//! report renderers in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod logging;
pub mod ports;
