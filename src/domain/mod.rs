//! Domain layer - Core port definitions
//!
//! This module defines the traits every volume variant implements to cross
//! the wire and platform boundaries.

pub mod ports;

pub use ports::*;
