//! Utility modules.

pub mod math;
