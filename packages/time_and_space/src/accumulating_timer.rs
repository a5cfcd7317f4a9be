//! Low-overhead timing of code regions that execute many times.

use std::time::Duration;

use crate::pal::{Platform, PlatformFacade};
use crate::{Observation, Session};

/// Sums the elapsed time of many executions of the same code region.
///
/// Each [`enter()`](Self::enter) opens a span that adds its elapsed time to a running total and
/// increments a running count when dropped. Only the clock is read, never memory, which keeps
/// the cost of a span to a couple of clock reads.
///
/// The totals reach a session only when [`flush()`](Self::flush) is called, as one measurement
/// covering every span since the previous flush. Flushing resets the totals to zero, so the
/// same timer can be reused across consecutive windows without double counting.
///
/// # Examples
///
/// ```
/// use time_and_space::{AccumulatingTimer, Session};
///
/// let session = Session::new();
/// let mut timer = AccumulatingTimer::new("Signal Generation");
///
/// let mut signals = 0_u64;
/// for bar in 0..1000_u64 {
///     let _span = timer.enter();
///     if bar % 7 == 0 {
///         signals += 1;
///     }
/// }
///
/// // Record the number of signals rather than the number of bars iterated.
/// let (_total, count) = timer.flush_with_count(Some(&session), signals);
/// assert_eq!(count, 143);
/// ```
#[derive(Debug)]
pub struct AccumulatingTimer {
    name: String,
    platform: PlatformFacade,
    total: Duration,
    count: u64,
}

impl AccumulatingTimer {
    /// Creates a timer whose flushed totals are recorded under `name`.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_platform(name, PlatformFacade::real())
    }

    pub(crate) fn with_platform(name: impl Into<String>, platform: PlatformFacade) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "accumulating timer name must not be empty");

        Self {
            name,
            platform,
            total: Duration::ZERO,
            count: 0,
        }
    }

    /// Opens a span that adds its elapsed time to this timer when dropped.
    pub fn enter(&mut self) -> AccumulatingSpan<'_> {
        let start_time = self.platform.now();

        AccumulatingSpan {
            timer: self,
            start_time,
        }
    }

    /// Runs `f` inside a span of this timer and returns its result.
    pub fn time<R>(&mut self, f: impl FnOnce() -> R) -> R {
        let _span = self.enter();
        f()
    }

    /// The name that flushed totals are recorded under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total elapsed time of all spans since the last flush or reset.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Number of spans since the last flush or reset.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Records the accumulated totals into `session` as one measurement and resets them.
    ///
    /// The measurement carries no memory figures. With no session, nothing is recorded but the
    /// totals are still returned and reset.
    ///
    /// Returns the flushed total elapsed time and count.
    pub fn flush(&mut self, session: Option<&Session>) -> (Duration, u64) {
        let count = self.count;
        self.flush_with_count(session, count)
    }

    /// Like [`flush()`](Self::flush) but records `count` instead of the number of spans.
    ///
    /// This is for loops where the number of logical items differs from the number of times
    /// the region was entered.
    pub fn flush_with_count(&mut self, session: Option<&Session>, count: u64) -> (Duration, u64) {
        let total = self.total;
        self.reset();

        if let Some(session) = session {
            session.record(self.name.as_str(), Observation::new(total).count(count));
        }

        (total, count)
    }

    /// Discards the accumulated totals without recording them.
    pub fn reset(&mut self) {
        self.total = Duration::ZERO;
        self.count = 0;
    }
}

/// A region being timed by an [`AccumulatingTimer`].
///
/// The elapsed time is added to the timer when the span is dropped.
#[derive(Debug)]
#[must_use = "Measurements are taken between creation and drop"]
pub struct AccumulatingSpan<'a> {
    timer: &'a mut AccumulatingTimer,
    start_time: Duration,
}

impl Drop for AccumulatingSpan<'_> {
    fn drop(&mut self) {
        let elapsed = self.timer.platform.now().saturating_sub(self.start_time);

        self.timer.total = self.timer.total.checked_add(elapsed).expect(
            "accumulated time overflows Duration - this indicates an unrealistic scenario",
        );

        self.timer.count = self
            .timer
            .count
            .checked_add(1)
            .expect("span count overflows u64 - this indicates an unrealistic scenario");
    }
}
