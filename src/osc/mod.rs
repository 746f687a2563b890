//! # OSC Protocol Module
//!
//! Implementation of the subset of Open Sound Control 1.0 the bridge speaks.
//!
//! This module handles:
//! - Address validation
//! - Single-float message encoding (padded address, `,f` type tag, big-endian f32)
//! - Decoding the same message shape for loopback checks

pub mod protocol;
pub mod encoder;
pub mod decoder;
