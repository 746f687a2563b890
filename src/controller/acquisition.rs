//! # Acquisition Loop Module
//!
//! Polls the controller, shapes each sample and forwards it to the sink.
//!
//! ## States
//!
//! | State | Action each iteration | Leaves to |
//! |-------|----------------------|-----------|
//! | Discovering | look up the controller for the role, back off 10 s when absent | Sampling |
//! | Sampling | read state, shape, send both axes | DeviceBusy, Disconnected |
//! | DeviceBusy | retry the read every 500 ms | Sampling, Disconnected |
//! | Disconnected | nothing, the loop has ended | - |
//!
//! Entering DeviceBusy sends one zero pair so the receiver stops moving.
//! Log lines are written on transitions, not on every iteration, except the
//! discovery retry notice which is written once per backoff.
//!
//! ## Usage
//!
//! ```no_run
//! use locomotion_bridge::controller::acquisition::AcquisitionLoop;
//! use locomotion_bridge::controller::evdev_provider::EvdevProvider;
//! use locomotion_bridge::controller::provider::ControllerRole;
//! use locomotion_bridge::controller::shaper::Shaper;
//! use locomotion_bridge::sink::OscUdpSink;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let provider = EvdevProvider::open("")?;
//!     let sink = OscUdpSink::connect("127.0.0.1:9000").await?;
//!     let mut acquisition =
//!         AcquisitionLoop::new(provider, sink, Shaper::new(0.75), ControllerRole::LeftHand);
//!     acquisition.run().await;
//!     acquisition.stop_movement().await;
//!     Ok(())
//! }
//! ```

use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::provider::{ControllerHandle, ControllerRole, DeviceProvider, RawSample, ReadError};
use super::shaper::{OutputSignal, Shaper};
use crate::osc::protocol::{ADDRESS_HORIZONTAL, ADDRESS_VERTICAL};
use crate::sink::SignalSink;

/// Wait between discovery attempts
pub const DISCOVERY_BACKOFF: Duration = Duration::from_secs(10);

/// Extra wait after a failed state read
pub const BUSY_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Pacing delay after every iteration
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Mode of the acquisition loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionState {
    Discovering,
    Sampling,
    DeviceBusy,
    Disconnected,
}

/// Delays used by the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopTiming {
    pub discovery_backoff: Duration,
    pub busy_retry: Duration,
    pub poll_interval: Duration,
}

impl Default for LoopTiming {
    fn default() -> Self {
        Self {
            discovery_backoff: DISCOVERY_BACKOFF,
            busy_retry: BUSY_RETRY_DELAY,
            poll_interval: POLL_INTERVAL,
        }
    }
}

/// A change of [`AcquisitionState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: AcquisitionState,
    pub to: AcquisitionState,
}

/// Result of one loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iteration {
    /// State change made by this iteration, if any
    pub transition: Option<Transition>,
    /// How long to wait before the next iteration
    pub pause: Duration,
}

/// One-time notices for full forward and backward deflection
#[derive(Debug, Default)]
struct TiltNotices {
    forward: bool,
    backward: bool,
}

/// Polling state machine between a [`DeviceProvider`] and a [`SignalSink`]
///
/// Owns all of its state; nothing is shared with other tasks.
pub struct AcquisitionLoop<P, S> {
    provider: P,
    sink: S,
    shaper: Shaper,
    role: ControllerRole,
    timing: LoopTiming,
    state: AcquisitionState,
    handle: Option<ControllerHandle>,
    tilt: TiltNotices,
    last_sample_at: Option<Instant>,
    send_error_logged: bool,
}

impl<P: DeviceProvider, S: SignalSink> AcquisitionLoop<P, S> {
    /// Creates a loop in the Discovering state with default timing.
    pub fn new(provider: P, sink: S, shaper: Shaper, role: ControllerRole) -> Self {
        Self {
            provider,
            sink,
            shaper,
            role,
            timing: LoopTiming::default(),
            state: AcquisitionState::Discovering,
            handle: None,
            tilt: TiltNotices::default(),
            last_sample_at: None,
            send_error_logged: false,
        }
    }

    /// Replaces the loop delays.
    #[must_use]
    pub fn with_timing(mut self, timing: LoopTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn state(&self) -> AcquisitionState {
        self.state
    }

    /// Controller bound by discovery, if any.
    pub fn handle(&self) -> Option<ControllerHandle> {
        self.handle
    }

    pub fn timing(&self) -> LoopTiming {
        self.timing
    }

    /// Runs until the controller disconnects.
    ///
    /// Discovery retries forever, so this only returns after the bound
    /// controller is reported disconnected.
    pub async fn run(&mut self) {
        info!(
            "Acquisition loop started for {} hand controller (threshold {}, {:?})",
            self.role,
            self.shaper.threshold(),
            self.shaper.policy()
        );

        loop {
            let iteration = self.poll_once().await;
            if self.state == AcquisitionState::Disconnected {
                return;
            }
            tokio::time::sleep(iteration.pause).await;
        }
    }

    /// Performs a single iteration without waiting.
    pub async fn poll_once(&mut self) -> Iteration {
        match self.state {
            AcquisitionState::Discovering => self.discover(),
            AcquisitionState::Sampling | AcquisitionState::DeviceBusy => self.sample().await,
            AcquisitionState::Disconnected => Iteration {
                transition: None,
                pause: Duration::ZERO,
            },
        }
    }

    /// Sends a zero pair so the receiver stops moving.
    pub async fn stop_movement(&mut self) {
        self.emit(OutputSignal::ZERO).await;
    }

    fn discover(&mut self) -> Iteration {
        match self.provider.find_controller_by_role(self.role) {
            Some(handle) => {
                info!("{} hand controller found at index {}", self.role, handle);
                self.handle = Some(handle);
                Iteration {
                    transition: Some(self.enter(AcquisitionState::Sampling)),
                    pause: self.timing.poll_interval,
                }
            }
            None => {
                info!(
                    "Waiting for {} hand controller... (trying again in {}s)",
                    self.role,
                    self.timing.discovery_backoff.as_secs()
                );
                Iteration {
                    transition: None,
                    pause: self.timing.discovery_backoff,
                }
            }
        }
    }

    async fn sample(&mut self) -> Iteration {
        let Some(handle) = self.handle else {
            return Iteration {
                transition: Some(self.enter(AcquisitionState::Discovering)),
                pause: self.timing.poll_interval,
            };
        };

        if !self.provider.is_connected(handle) {
            warn!("{} hand controller {} is not connected", self.role, handle);
            return Iteration {
                transition: Some(self.enter(AcquisitionState::Disconnected)),
                pause: Duration::ZERO,
            };
        }

        match self.provider.read_state(handle) {
            Ok(sample) => {
                let transition = if self.state == AcquisitionState::DeviceBusy {
                    match self.last_sample_at {
                        Some(last) => info!(
                            "Overlay closed, controller state retrieved after {:.1}s",
                            sample.timestamp.saturating_duration_since(last).as_secs_f32()
                        ),
                        None => info!("Overlay closed, controller state retrieved"),
                    }
                    Some(self.enter(AcquisitionState::Sampling))
                } else {
                    None
                };
                self.last_sample_at = Some(sample.timestamp);

                let output = self.shaper.shape(&sample);
                self.emit(output).await;
                self.note_tilt(&sample);

                Iteration {
                    transition,
                    pause: self.timing.poll_interval,
                }
            }
            Err(e) => {
                let transition = if self.state == AcquisitionState::DeviceBusy {
                    debug!("Controller state still unavailable: {}", e);
                    None
                } else {
                    self.emit(OutputSignal::ZERO).await;
                    match &e {
                        ReadError::Unavailable => warn!(
                            "Failed to get controller state, likely because an overlay menu is open"
                        ),
                        ReadError::Failed(msg) => warn!("Error getting controller state: {}", msg),
                    }
                    Some(self.enter(AcquisitionState::DeviceBusy))
                };

                Iteration {
                    transition,
                    pause: self.timing.busy_retry + self.timing.poll_interval,
                }
            }
        }
    }

    fn enter(&mut self, to: AcquisitionState) -> Transition {
        let from = self.state;
        self.state = to;
        debug!("Acquisition state {:?} -> {:?}", from, to);
        Transition { from, to }
    }

    async fn emit(&mut self, output: OutputSignal) {
        for (address, value) in [
            (ADDRESS_VERTICAL, output.vertical),
            (ADDRESS_HORIZONTAL, output.horizontal),
        ] {
            if let Err(e) = self.sink.send(address, value).await {
                if self.send_error_logged {
                    debug!("Failed to send {}: {}", address, e);
                } else {
                    warn!("Failed to send {}: {}", address, e);
                    self.send_error_logged = true;
                }
            }
        }
    }

    /// Deflection strictly past the threshold counts as a tilt.
    fn note_tilt(&mut self, sample: &RawSample) {
        let threshold = self.shaper.threshold();
        if sample.y > threshold && !self.tilt.forward {
            info!("Forward tilt detected, working as intended.");
            self.tilt.forward = true;
        } else if sample.y < -threshold && !self.tilt.backward {
            info!("Backward tilt detected, working as intended.");
            self.tilt.backward = true;
        }
    }
}
