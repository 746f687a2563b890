//! # Locomotion Bridge Library
//!
//! Forward a VR controller thumbstick to OSC locomotion inputs.
//!
//! This library provides the core functionality for polling a controller's
//! stick, shaping it with a deadzone and activation threshold, and sending the
//! result as OSC messages to a receiver such as a social VR client.

pub mod config;
pub mod error;
pub mod osc;
pub mod controller;
pub mod sink;
