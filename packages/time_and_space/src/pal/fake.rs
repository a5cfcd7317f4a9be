//! Fake platform implementation for testing.

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::pal::abstractions::Platform;

/// Internal state for the fake platform that can be shared between clones.
#[derive(Debug)]
struct FakePlatformState {
    now: Duration,
    memory_bytes: u64,
    memory_probe_fails: bool,
    system_memory_percent: Option<f64>,
}

/// Fake implementation of the platform abstraction for testing.
///
/// This implementation allows tests to control the clock and memory values instead of relying
/// on the operating system. Multiple clones of the same `FakePlatform` share the same
/// underlying state, allowing tests to modify values after platform creation to simulate time
/// progression and memory growth during measurement.
#[derive(Clone, Debug)]
pub(crate) struct FakePlatform {
    state: Arc<Mutex<FakePlatformState>>,
}

impl FakePlatform {
    /// Creates a new fake platform at time zero with zero memory usage.
    pub(crate) fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakePlatformState {
                now: Duration::ZERO,
                memory_bytes: 0,
                memory_probe_fails: false,
                system_memory_percent: None,
            })),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut FakePlatformState) -> R) -> R {
        f(&mut self
            .state
            .lock()
            .expect("FakePlatform state lock should not be poisoned"))
    }

    /// Sets the current clock reading.
    pub(crate) fn set_now(&self, now: Duration) {
        self.with_state(|state| state.now = now);
    }

    /// Moves the clock forward.
    pub(crate) fn advance(&self, by: Duration) {
        self.with_state(|state| {
            state.now = state.now.checked_add(by).expect("fake clock overflow");
        });
    }

    /// Sets the memory usage reported by the memory probe.
    pub(crate) fn set_memory_bytes(&self, bytes: u64) {
        self.with_state(|state| state.memory_bytes = bytes);
    }

    /// Sets the memory usage reported by the memory probe, in gigabytes.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "test values are small, positive and whole numbers of bytes"
    )]
    pub(crate) fn set_memory_gigabytes(&self, gigabytes: f64) {
        self.set_memory_bytes((gigabytes * crate::BYTES_PER_GIGABYTE) as u64);
    }

    /// Sets the system memory usage reported by the system memory probe.
    ///
    /// Until this is called, the system memory probe reports that it is unsupported.
    pub(crate) fn set_system_memory_percent(&self, percent: f64) {
        self.with_state(|state| state.system_memory_percent = Some(percent));
    }

    /// Makes every subsequent memory probe fail (or succeed again).
    pub(crate) fn set_memory_probe_fails(&self, fails: bool) {
        self.with_state(|state| state.memory_probe_fails = fails);
    }
}

impl Platform for FakePlatform {
    fn now(&self) -> Duration {
        self.with_state(|state| state.now)
    }

    fn memory_usage_bytes(&self) -> io::Result<u64> {
        self.with_state(|state| {
            if state.memory_probe_fails {
                Err(io::Error::other("fake memory probe failure"))
            } else {
                Ok(state.memory_bytes)
            }
        })
    }

    fn system_memory_percent(&self) -> io::Result<f64> {
        self.with_state(|state| {
            state.system_memory_percent.ok_or_else(|| {
                io::Error::new(io::ErrorKind::Unsupported, "fake system memory not set")
            })
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn initializes_with_zero_values() {
        let platform = FakePlatform::new();
        assert_eq!(platform.now(), Duration::ZERO);
        assert_eq!(platform.memory_usage_bytes().unwrap(), 0);
    }

    #[test]
    fn advances_clock() {
        let platform = FakePlatform::new();
        platform.set_now(Duration::from_millis(100));
        platform.advance(Duration::from_millis(50));

        assert_eq!(platform.now(), Duration::from_millis(150));
    }

    #[test]
    fn memory_probe_can_fail() {
        let platform = FakePlatform::new();
        platform.set_memory_probe_fails(true);
        assert!(platform.memory_usage_bytes().is_err());

        platform.set_memory_probe_fails(false);
        assert!(platform.memory_usage_bytes().is_ok());
    }

    #[test]
    fn system_memory_is_unsupported_until_set() {
        let platform = FakePlatform::new();
        let error = platform.system_memory_percent().unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::Unsupported);

        platform.set_system_memory_percent(42.5);
        assert_eq!(platform.system_memory_percent().unwrap(), 42.5);
    }

    #[test]
    fn shared_state_between_clones() {
        let platform1 = FakePlatform::new();
        let platform2 = platform1.clone();

        platform1.set_now(Duration::from_millis(100));
        assert_eq!(platform2.now(), Duration::from_millis(100));

        platform2.set_memory_bytes(2048);
        assert_eq!(platform1.memory_usage_bytes().unwrap(), 2048);
    }
}
