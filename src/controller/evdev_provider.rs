//! # evdev Controller Provider
//!
//! Finds a thumbstick controller among the Linux input devices and reads its
//! stick position through the evdev interface.
//!
//! ## Controller Detection
//!
//! A device qualifies when it:
//! - exposes both `ABS_X` and `ABS_Y` absolute axes, and
//! - has a name matching the requested role (`left` / `(L)` for the left
//!   hand, `right` / `(R)` for the right hand), or contains the configured
//!   device name when one is set.
//!
//! Candidates are checked in `/dev/input/event*` order so the choice is
//! deterministic when several controllers are plugged in.
//!
//! ## Axis Normalization
//!
//! Raw axis values are mapped from the range the kernel reports for the axis
//! onto [-1.0, 1.0]. evdev reports Y growing downwards, so Y is inverted to
//! make a forward push positive.

use evdev::{AbsoluteAxisType, Device};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::provider::{ControllerHandle, ControllerRole, DeviceProvider, RawSample, ReadError};
use crate::error::{BridgeError, Result};

/// Directory scanned for event devices
const INPUT_DIR: &str = "/dev/input";

/// Linux `EBUSY`
const EBUSY: i32 = 16;

/// The controller bound by the last successful discovery
struct BoundDevice {
    handle: ControllerHandle,
    path: PathBuf,
    device: Device,
}

/// Controller provider backed by evdev
pub struct EvdevProvider {
    input_dir: PathBuf,
    device_name: Option<String>,
    bound: Option<BoundDevice>,
}

impl std::fmt::Debug for EvdevProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvdevProvider")
            .field("input_dir", &self.input_dir)
            .field("device_name", &self.device_name)
            .field("bound", &self.bound.as_ref().map(|b| &b.path))
            .finish()
    }
}

impl EvdevProvider {
    /// Initialize the provider on `/dev/input`
    ///
    /// # Arguments
    ///
    /// * `device_name` - Name filter; empty means match by role
    ///
    /// # Errors
    ///
    /// Returns `Provider` error if the input directory is missing or unreadable.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use locomotion_bridge::controller::evdev_provider::EvdevProvider;
    ///
    /// let provider = EvdevProvider::open("")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(device_name: &str) -> Result<Self> {
        Self::open_in(INPUT_DIR, device_name)
    }

    /// Initialize the provider on a custom input directory
    pub fn open_in<P: AsRef<Path>>(input_dir: P, device_name: &str) -> Result<Self> {
        let input_dir = input_dir.as_ref();

        if !input_dir.is_dir() {
            return Err(BridgeError::Provider(format!(
                "{} directory not found",
                input_dir.display()
            )));
        }

        std::fs::read_dir(input_dir).map_err(|e| {
            BridgeError::Provider(format!("Failed to read {}: {}", input_dir.display(), e))
        })?;

        let device_name = Some(device_name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        info!("evdev provider ready on {}", input_dir.display());

        Ok(Self {
            input_dir: input_dir.to_path_buf(),
            device_name,
            bound: None,
        })
    }

    /// Sorted `event*` device nodes in the input directory
    fn event_nodes(&self) -> Vec<PathBuf> {
        let entries = match std::fs::read_dir(&self.input_dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Failed to read {}: {}", self.input_dir.display(), e);
                return Vec::new();
            }
        };

        let mut nodes: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| handle_from_path(path).is_some())
            .collect();
        nodes.sort();
        nodes
    }
}

impl DeviceProvider for EvdevProvider {
    fn find_controller_by_role(&mut self, role: ControllerRole) -> Option<ControllerHandle> {
        for path in self.event_nodes() {
            let device = match Device::open(&path) {
                Ok(device) => device,
                Err(e) => {
                    // Permission denied or other errors - skip device
                    debug!("Could not open {}: {}", path.display(), e);
                    continue;
                }
            };

            let name = device.name().unwrap_or_default().to_string();
            let has_stick = device.supported_absolute_axes().map_or(false, |axes| {
                axes.contains(AbsoluteAxisType::ABS_X) && axes.contains(AbsoluteAxisType::ABS_Y)
            });

            debug!("Found input device: {} ({:?}, stick: {})", path.display(), name, has_stick);

            if !has_stick || !name_matches(&name, self.device_name.as_deref(), role) {
                continue;
            }

            let handle = handle_from_path(&path)?;
            info!("Found {} hand controller {:?} at {}", role, name, path.display());
            self.bound = Some(BoundDevice {
                handle,
                path,
                device,
            });
            return Some(handle);
        }

        None
    }

    fn is_connected(&mut self, handle: ControllerHandle) -> bool {
        match &self.bound {
            Some(bound) if bound.handle == handle => bound.path.exists(),
            _ => false,
        }
    }

    fn read_state(&mut self, handle: ControllerHandle) -> std::result::Result<RawSample, ReadError> {
        let bound = match &self.bound {
            Some(bound) if bound.handle == handle => bound,
            _ => return Err(ReadError::Failed(format!("controller {} is not bound", handle))),
        };

        let state = bound.device.get_abs_state().map_err(classify_io_error)?;
        let x = &state[AbsoluteAxisType::ABS_X.0 as usize];
        let y = &state[AbsoluteAxisType::ABS_Y.0 as usize];

        if x.maximum <= x.minimum || y.maximum <= y.minimum {
            return Err(ReadError::Unavailable);
        }

        Ok(RawSample::new(
            normalize_axis(x.value, x.minimum, x.maximum),
            -normalize_axis(y.value, y.minimum, y.maximum),
        ))
    }
}

/// Map a raw axis value from `[min, max]` onto `[-1.0, 1.0]`
///
/// Returns `0.0` for a degenerate range.
#[must_use]
pub fn normalize_axis(value: i32, min: i32, max: i32) -> f32 {
    if max <= min {
        return 0.0;
    }
    let center = (min as f32 + max as f32) / 2.0;
    let half_range = (max as f32 - min as f32) / 2.0;
    ((value as f32 - center) / half_range).clamp(-1.0, 1.0)
}

/// Whether a device name is acceptable for `role`
///
/// A non-empty `filter` replaces the role check with a case-insensitive
/// substring match.
#[must_use]
pub fn name_matches(name: &str, filter: Option<&str>, role: ControllerRole) -> bool {
    let name = name.to_lowercase();

    if let Some(filter) = filter {
        return name.contains(&filter.to_lowercase());
    }

    let hints: &[&str] = match role {
        ControllerRole::LeftHand => &["left", "(l)"],
        ControllerRole::RightHand => &["right", "(r)"],
    };
    hints.iter().any(|hint| name.contains(hint))
}

/// Handle derived from the `eventN` node number
fn handle_from_path(path: &Path) -> Option<ControllerHandle> {
    path.file_name()?
        .to_str()?
        .strip_prefix("event")?
        .parse()
        .ok()
        .map(ControllerHandle)
}

fn classify_io_error(e: io::Error) -> ReadError {
    if e.kind() == io::ErrorKind::WouldBlock || e.raw_os_error() == Some(EBUSY) {
        ReadError::Unavailable
    } else {
        ReadError::Failed(e.to_string())
    }
}
