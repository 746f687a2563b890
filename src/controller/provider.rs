//! Trait abstraction for the controller tracking backend

use std::fmt;
use std::time::Instant;
use thiserror::Error;

/// Which hand a controller is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerRole {
    LeftHand,
    RightHand,
}

impl fmt::Display for ControllerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerRole::LeftHand => write!(f, "left"),
            ControllerRole::RightHand => write!(f, "right"),
        }
    }
}

/// Opaque identifier of a tracked controller, valid until it disconnects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControllerHandle(pub u32);

impl fmt::Display for ControllerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One thumbstick reading, each axis nominally in [-1.0, 1.0].
///
/// `y` is positive when the stick is pushed forward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    pub x: f32,
    pub y: f32,
    pub timestamp: Instant,
}

impl RawSample {
    /// Sample taken now.
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            timestamp: Instant::now(),
        }
    }
}

/// Why a state read did not produce a sample.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    /// The device is enumerated but withholds its state, e.g. an overlay has input focus.
    #[error("controller state unavailable")]
    Unavailable,

    /// The backend reported an error.
    #[error("{0}")]
    Failed(String),
}

/// Source of controller state.
///
/// Concrete providers are constructed already initialized; a constructor
/// error is fatal for the process.
#[cfg_attr(test, mockall::automock)]
pub trait DeviceProvider {
    /// Look up the controller currently bound to `role`.
    fn find_controller_by_role(&mut self, role: ControllerRole) -> Option<ControllerHandle>;

    /// Whether `handle` still refers to a connected device.
    fn is_connected(&mut self, handle: ControllerHandle) -> bool;

    /// Read the current thumbstick position.
    fn read_state(&mut self, handle: ControllerHandle) -> Result<RawSample, ReadError>;
}
