//! # Controller Module
//!
//! Thumbstick input acquisition and shaping.
//!
//! This module handles:
//! - The device provider boundary and its evdev implementation
//! - Deadzone and threshold shaping of stick values
//! - The polling state machine that feeds the signal sink

pub mod provider;
pub mod evdev_provider;
pub mod shaper;
pub mod acquisition;
