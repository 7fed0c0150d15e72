//! Application layer: commands in, events out, ports at the edges.
//!
//! The detection core ([`crate::detector`], [`crate::engine`]) never calls a
//! platform API directly.  Sensors, clocks, and the alert flow are reached
//! through the **port traits** in [`ports`]; [`service`] ties them together
//! for the long-running monitor.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
