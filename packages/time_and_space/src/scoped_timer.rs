//! Precise measurement of a single code region.

use std::time::Duration;

use crate::Result;
use crate::pal::{Platform, PlatformFacade};

/// Measures the elapsed time and memory footprint of one code region.
///
/// The timer samples the clock and the resident memory of the process when started and again
/// when finished. Intermediate memory samples can be taken with [`sample()`](Self::sample) to
/// catch a peak that the region does not hold on to until the end.
///
/// Each timer measures exactly one region: [`finish()`](Self::finish) consumes it, so the
/// reading can only be observed once the region is over.
///
/// Sampling memory costs a system call on every start, sample and finish. For regions that
/// execute many times in a loop, prefer an [`AccumulatingTimer`](crate::AccumulatingTimer).
///
/// # Examples
///
/// ```
/// use time_and_space::ScopedTimer;
///
/// # fn main() -> Result<(), time_and_space::Error> {
/// let timer = ScopedTimer::start()?;
/// let data: Vec<u64> = (0..10_000).collect();
/// std::hint::black_box(&data);
/// let reading = timer.finish()?;
///
/// println!(
///     "took {:?}, memory changed by {:.3}G",
///     reading.elapsed(),
///     reading.memory_delta().unwrap_or_default()
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
#[must_use = "Measurements are taken between start and finish"]
pub struct ScopedTimer {
    platform: PlatformFacade,
    start_time: Duration,
    memory: Option<MemoryWindow>,
}

/// Memory samples taken so far, in gigabytes.
#[derive(Clone, Copy, Debug)]
struct MemoryWindow {
    start: f64,
    intermediate_peak: Option<f64>,

    // System-wide usage in percent, absent where the platform cannot report it.
    system_start: Option<f64>,
}

impl ScopedTimer {
    /// Starts measuring elapsed time and memory usage.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MemoryProbe`](crate::Error::MemoryProbe) if the memory usage of the
    /// process cannot be sampled.
    pub fn start() -> Result<Self> {
        Self::start_on(PlatformFacade::real())
    }

    /// Starts measuring elapsed time only.
    ///
    /// The reading of such a timer has no memory figures and finishing it cannot fail.
    pub fn start_without_memory() -> Self {
        Self::start_on_without_memory(PlatformFacade::real())
    }

    pub(crate) fn start_on(platform: PlatformFacade) -> Result<Self> {
        let start_time = platform.now();
        let start_memory = platform.memory_gigabytes()?;
        let system_start = platform.system_memory_percent().ok();

        Ok(Self {
            platform,
            start_time,
            memory: Some(MemoryWindow {
                start: start_memory,
                intermediate_peak: None,
                system_start,
            }),
        })
    }

    pub(crate) fn start_on_without_memory(platform: PlatformFacade) -> Self {
        let start_time = platform.now();

        Self {
            platform,
            start_time,
            memory: None,
        }
    }

    /// Takes an intermediate memory sample that counts towards the peak of the region.
    ///
    /// Does nothing if the timer does not track memory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MemoryProbe`](crate::Error::MemoryProbe) if the memory usage of the
    /// process cannot be sampled.
    pub fn sample(&mut self) -> Result<()> {
        let Some(window) = self.memory.as_mut() else {
            return Ok(());
        };

        let current = self.platform.memory_gigabytes()?;
        window.intermediate_peak = Some(
            window
                .intermediate_peak
                .map_or(current, |peak| peak.max(current)),
        );

        Ok(())
    }

    /// Time elapsed since the timer was started.
    #[must_use]
    pub fn elapsed_so_far(&self) -> Duration {
        self.platform.now().saturating_sub(self.start_time)
    }

    /// Whether the timer samples memory usage.
    #[must_use]
    pub fn tracks_memory(&self) -> bool {
        self.memory.is_some()
    }

    /// Ends the measured region and returns the measurement.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MemoryProbe`](crate::Error::MemoryProbe) if the memory usage of the
    /// process cannot be sampled. The measurement is lost in that case.
    pub fn finish(self) -> Result<TimerReading> {
        let elapsed = self.elapsed_so_far();

        let Some(window) = self.memory else {
            return Ok(TimerReading {
                elapsed,
                memory_delta: None,
                peak_memory: None,
                system_memory_before: None,
                system_memory_after: None,
            });
        };

        let end_memory = self.platform.memory_gigabytes()?;
        let system_end = self.platform.system_memory_percent().ok();
        let peak_memory = window
            .intermediate_peak
            .map_or(end_memory, |peak| peak.max(end_memory));

        Ok(TimerReading {
            elapsed,
            memory_delta: Some(end_memory - window.start),
            peak_memory: Some(peak_memory),
            system_memory_before: window.system_start,
            system_memory_after: system_end,
        })
    }
}

/// The result of a finished [`ScopedTimer`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimerReading {
    elapsed: Duration,
    memory_delta: Option<f64>,
    peak_memory: Option<f64>,
    system_memory_before: Option<f64>,
    system_memory_after: Option<f64>,
}

impl TimerReading {
    /// Time spent in the measured region.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Memory usage at the end of the region minus memory usage at its start, in gigabytes.
    ///
    /// Negative if the region released memory. `None` if the timer did not track memory.
    #[must_use]
    pub fn memory_delta(&self) -> Option<f64> {
        self.memory_delta
    }

    /// Highest memory usage sampled during the region, in gigabytes.
    ///
    /// Without intermediate samples this is the memory usage at the end of the region.
    /// `None` if the timer did not track memory.
    #[must_use]
    pub fn peak_memory(&self) -> Option<f64> {
        self.peak_memory
    }

    /// Share of system-wide physical memory in use when the region started, in percent.
    ///
    /// `None` if the timer did not track memory or the platform cannot report system memory.
    #[must_use]
    pub fn system_memory_before(&self) -> Option<f64> {
        self.system_memory_before
    }

    /// Share of system-wide physical memory in use when the region ended, in percent.
    ///
    /// `None` if the timer did not track memory or the platform cannot report system memory.
    #[must_use]
    pub fn system_memory_after(&self) -> Option<f64> {
        self.system_memory_after
    }
}
