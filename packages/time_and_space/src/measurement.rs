//! Individual observations of a component, before and after they enter a session.

use std::time::Duration;

use crate::TimerReading;

/// The values a caller supplies when recording a measurement into a [`Session`](crate::Session).
///
/// An observation is built from the elapsed time and optionally enriched with the number of
/// items processed and memory figures. Any `Duration` converts into an observation of one item
/// without memory figures, as does a [`TimerReading`] (which carries its memory figures along).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use time_and_space::{Observation, Session};
///
/// let session = Session::new();
///
/// session.record(
///     "Load Data",
///     Observation::new(Duration::from_millis(2500))
///         .count(50)
///         .memory_delta(0.30)
///         .peak_memory(4.20),
/// );
///
/// // Shorthand for one item and no memory figures.
/// session.record("Validate", Duration::from_millis(20));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Observation {
    elapsed: Duration,
    count: u64,
    memory_delta: Option<f64>,
    peak_memory: Option<f64>,
}

impl Observation {
    /// Creates an observation of one item that took `elapsed` to process.
    #[must_use]
    pub fn new(elapsed: Duration) -> Self {
        Self {
            elapsed,
            count: 1,
            memory_delta: None,
            peak_memory: None,
        }
    }

    /// Sets the number of logical items processed in the observed region.
    #[must_use]
    pub fn count(mut self, count: u64) -> Self {
        self.count = count;
        self
    }

    /// Sets the change in process memory over the observed region, in gigabytes.
    ///
    /// The value may be negative if the region released memory.
    #[must_use]
    pub fn memory_delta(mut self, gigabytes: f64) -> Self {
        self.memory_delta = Some(gigabytes);
        self
    }

    /// Sets the highest process memory usage seen during the observed region, in gigabytes.
    #[must_use]
    pub fn peak_memory(mut self, gigabytes: f64) -> Self {
        self.peak_memory = Some(gigabytes);
        self
    }
}

impl From<Duration> for Observation {
    fn from(elapsed: Duration) -> Self {
        Self::new(elapsed)
    }
}

impl From<TimerReading> for Observation {
    fn from(reading: TimerReading) -> Self {
        Self {
            elapsed: reading.elapsed(),
            count: 1,
            memory_delta: reading.memory_delta(),
            peak_memory: reading.peak_memory(),
        }
    }
}

/// One observation as stored in a session, stamped with the time it was recorded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    elapsed: Duration,
    count: u64,
    memory_delta: Option<f64>,
    peak_memory: Option<f64>,
    timestamp: Duration,
}

impl Measurement {
    pub(crate) fn new(observation: Observation, timestamp: Duration) -> Self {
        let Observation {
            elapsed,
            count,
            memory_delta,
            peak_memory,
        } = observation;

        Self {
            elapsed,
            count,
            memory_delta,
            peak_memory,
            timestamp,
        }
    }

    /// Time spent in the measured region.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of logical items processed in the measured region.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Change in process memory over the measured region, in gigabytes, if supplied.
    #[must_use]
    pub fn memory_delta(&self) -> Option<f64> {
        self.memory_delta
    }

    /// Highest process memory usage during the measured region, in gigabytes, if supplied.
    #[must_use]
    pub fn peak_memory(&self) -> Option<f64> {
        self.peak_memory
    }

    /// When the measurement was recorded, as an offset from the creation of its session.
    #[must_use]
    pub fn timestamp(&self) -> Duration {
        self.timestamp
    }
}
