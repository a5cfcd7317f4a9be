//! Wall-clock time and resident memory profiling for multi-step pipelines.
//!
//! This package measures how long explicitly marked code regions take and how much resident
//! memory they consume, aggregates those measurements by component name and renders them as a
//! summary table, as log checkpoints or as a persisted JSON record.
//!
//! The core functionality includes:
//! - [`Session`] - Thread-safe collection of named measurements with derived statistics
//! - [`ScopedTimer`] - Precise timer that samples elapsed time and memory for one region
//! - [`AccumulatingTimer`] - Low-overhead timer that sums many short regions into one measurement
//! - [`profile_operation`] - Scope guard that times a region and records it into an optional session
//! - [`Summary`] - Snapshot of aggregated statistics, displayed as a fixed-width table
//!
//! # Simple usage
//!
//! ```
//! use std::time::Duration;
//!
//! use time_and_space::{Observation, Session};
//!
//! let session = Session::new();
//!
//! session.record(
//!     "Load Data",
//!     Observation::new(Duration::from_millis(2500))
//!         .count(50)
//!         .memory_delta(0.30)
//!         .peak_memory(4.20),
//! );
//! session.record("Train Model", Duration::from_secs(15));
//!
//! session.print_summary("My Pipeline");
//! ```
//!
//! # Profiling scopes
//!
//! The operation helper records into the session when the guard is dropped, whether the scope
//! exits normally, returns early with `?` or unwinds from a panic. Passing `None` instead of a
//! session turns profiling off without any branching at the call site.
//!
//! ```
//! use time_and_space::{Session, profile_operation};
//!
//! # fn main() -> Result<(), time_and_space::Error> {
//! let session = Session::new();
//!
//! {
//!     let _span = profile_operation("Build Features", Some(&session), 1000)?;
//!     let features: Vec<u64> = (0..1000).collect();
//!     std::hint::black_box(features);
//! }
//!
//! {
//!     // Profiling disabled - nothing is recorded.
//!     let _span = profile_operation("Build Features", None, 1000)?;
//! }
//!
//! assert_eq!(session.measurements("Build Features").len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! # Hot loops
//!
//! The precise timer samples process memory on entry and exit, which costs far more than a
//! clock read. For regions executed many times, use an [`AccumulatingTimer`] and flush its
//! totals into the session once the loop is done.
//!
//! ```
//! use time_and_space::{AccumulatingTimer, Session};
//!
//! let session = Session::new();
//! let mut timer = AccumulatingTimer::new("Signal Generation");
//!
//! for bar in 0..100_u64 {
//!     let _span = timer.enter();
//!     std::hint::black_box(bar * 2);
//! }
//!
//! let (_total, count) = timer.flush(Some(&session));
//! assert_eq!(count, 100);
//! assert_eq!(timer.count(), 0);
//! ```
//!
//! # Units
//!
//! Elapsed time is reported in seconds. Memory figures are reported in gigabytes, converted
//! from the bytes reported by the operating system using a factor of 1024³.

mod accumulating_timer;
mod checkpoint;
mod error;
mod measurement;
mod operation;
mod pal;
mod persist;
mod scoped_timer;
mod session;
mod summary;

pub use accumulating_timer::{AccumulatingSpan, AccumulatingTimer};
pub use checkpoint::Checkpoint;
pub use error::Error;
pub(crate) use error::Result;
pub use measurement::{Measurement, Observation};
pub use operation::{OperationSpan, profile_operation};
pub use scoped_timer::{ScopedTimer, TimerReading};
pub use session::Session;
pub use summary::{ComponentSummary, Summary};

/// Number of bytes in one gigabyte, as the memory figures of this package count them.
pub const BYTES_PER_GIGABYTE: f64 = 1024.0 * 1024.0 * 1024.0;

/// Rendered in place of values that are not computable or were never supplied.
pub(crate) const NOT_AVAILABLE: &str = "n/a";

pub(crate) const ERR_POISONED_LOCK: &str = "encountered poisoned lock - program validity cannot be guaranteed";
