//! Platform abstraction trait definitions.

use std::fmt::Debug;
use std::io;
use std::time::Duration;

/// Provides the clock and memory probes that measurements are built from.
///
/// This trait abstracts the underlying operating system mechanisms, allowing for both real
/// implementations and fake or mock implementations (for testing).
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Platform: Debug + Send + Sync + 'static {
    /// Gets the current reading of a monotonic clock.
    ///
    /// The origin of the clock is arbitrary but fixed for the lifetime of the process, so only
    /// differences between two readings are meaningful.
    fn now(&self) -> Duration;

    /// Gets the resident memory usage of the current process, in bytes.
    fn memory_usage_bytes(&self) -> io::Result<u64>;

    /// Gets the share of system-wide physical memory that is in use, in percent (0 to 100).
    fn system_memory_percent(&self) -> io::Result<f64>;
}
