//! Trait abstraction for signal sink operations to enable testing

use async_trait::async_trait;

use crate::error::Result;

/// Receiver of addressed locomotion values
///
/// Sends are fire-and-forget: an `Ok` only means the value was handed to the
/// transport, never that the peer received it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SignalSink: Send {
    /// Send one float value to `address`
    async fn send(&mut self, address: &str, value: f32) -> Result<()>;
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use crate::error::BridgeError;
    use std::sync::{Arc, Mutex};

    /// Recording sink for testing
    #[derive(Clone)]
    pub struct RecordingSink {
        pub sent: Arc<Mutex<Vec<(String, f32)>>>,
        pub send_error: Arc<Mutex<Option<String>>>,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self {
                sent: Arc::new(Mutex::new(Vec::new())),
                send_error: Arc::new(Mutex::new(None)),
            }
        }

        pub fn get_sent(&self) -> Vec<(String, f32)> {
            self.sent.lock().unwrap().clone()
        }

        /// Values sent to one address, in order
        pub fn values_for(&self, address: &str) -> Vec<f32> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .filter(|(a, _)| a == address)
                .map(|(_, v)| *v)
                .collect()
        }

        pub fn clear(&self) {
            self.sent.lock().unwrap().clear();
        }

        pub fn set_send_error(&self, error: &str) {
            *self.send_error.lock().unwrap() = Some(error.to_string());
        }
    }

    #[async_trait]
    impl SignalSink for RecordingSink {
        async fn send(&mut self, address: &str, value: f32) -> Result<()> {
            let send_error = self.send_error.lock().unwrap().clone();
            if let Some(error) = send_error {
                return Err(BridgeError::Sink(error));
            }
            self.sent.lock().unwrap().push((address.to_string(), value));
            Ok(())
        }
    }
}
