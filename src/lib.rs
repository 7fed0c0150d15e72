//! FallWatch detection library.
//!
//! Exposes the fall-detection core (sensitivity mapping, the detector state
//! machine, and the engine that bridges a live sensor feed to it) together
//! with the port traits and host adapters used to drive it.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod detector;
pub mod engine;
pub mod error;
pub mod sensitivity;
pub mod sensors;

pub use error::{Error, Result};
