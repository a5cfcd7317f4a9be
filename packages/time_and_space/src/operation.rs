//! Scope guard that profiles one operation into an optional session.

use std::time::Duration;

use crate::pal::PlatformFacade;
use crate::{Observation, Result, ScopedTimer, Session, TimerReading};

/// Starts profiling the operation `name`, which processes `count` items.
///
/// With a session, the returned span samples elapsed time and memory usage and records one
/// measurement into the session when it is dropped or [finished](OperationSpan::finish). The
/// measurement is recorded however the scope ends: normally, through an early return or by
/// unwinding from a panic.
///
/// With `None`, only the clock is read and nothing is recorded anywhere. This lets callers keep
/// a single code path whether profiling is enabled or not.
///
/// # Errors
///
/// Returns [`Error::MemoryProbe`](crate::Error::MemoryProbe) if a session is given and the
/// memory usage of the process cannot be sampled.
///
/// # Examples
///
/// ```
/// use time_and_space::{Session, profile_operation};
///
/// fn load(session: Option<&Session>) -> Result<Vec<u8>, time_and_space::Error> {
///     let _span = profile_operation("Load", session, 1)?;
///     Ok(vec![0; 1024])
/// }
///
/// # fn main() -> Result<(), time_and_space::Error> {
/// let session = Session::new();
/// load(Some(&session))?;
/// load(None)?;
///
/// assert_eq!(session.measurements("Load").len(), 1);
/// # Ok(())
/// # }
/// ```
pub fn profile_operation<'a>(
    name: &'a str,
    session: Option<&'a Session>,
    count: u64,
) -> Result<OperationSpan<'a>> {
    let timer = match session {
        Some(session) => ScopedTimer::start_on(session.platform().clone())?,
        None => ScopedTimer::start_on_without_memory(PlatformFacade::real()),
    };

    Ok(OperationSpan {
        name,
        session,
        count,
        timer: Some(timer),
    })
}

/// An operation being profiled, created by [`profile_operation()`].
///
/// Records into the session (if any) when dropped.
#[derive(Debug)]
#[must_use = "Measurements are taken between creation and drop"]
pub struct OperationSpan<'a> {
    name: &'a str,
    session: Option<&'a Session>,
    count: u64,

    // Only `None` after the span has been finished.
    timer: Option<ScopedTimer>,
}

impl OperationSpan<'_> {
    /// Time elapsed since the span was created.
    #[must_use]
    pub fn elapsed_so_far(&self) -> Duration {
        self.timer
            .as_ref()
            .map_or(Duration::ZERO, ScopedTimer::elapsed_so_far)
    }

    /// Takes an intermediate memory sample that counts towards the peak of the operation.
    ///
    /// Does nothing if profiling without a session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MemoryProbe`](crate::Error::MemoryProbe) if the memory usage of the
    /// process cannot be sampled.
    pub fn sample(&mut self) -> Result<()> {
        match self.timer.as_mut() {
            Some(timer) => timer.sample(),
            None => Ok(()),
        }
    }

    /// Ends the operation, records it into the session (if any) and returns the reading.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MemoryProbe`](crate::Error::MemoryProbe) if the memory usage of the
    /// process cannot be sampled. Nothing is recorded in that case.
    pub fn finish(mut self) -> Result<TimerReading> {
        let timer = self
            .timer
            .take()
            .expect("timer is only taken by finish(), which consumes the span");

        self.complete(timer)
    }

    fn complete(&self, timer: ScopedTimer) -> Result<TimerReading> {
        let reading = timer.finish()?;

        if let Some(session) = self.session {
            session.record(self.name, Observation::from(reading).count(self.count));
        }

        Ok(reading)
    }
}

impl Drop for OperationSpan<'_> {
    fn drop(&mut self) {
        let Some(timer) = self.timer.take() else {
            return;
        };

        if let Err(error) = self.complete(timer) {
            tracing::warn!(
                operation = self.name,
                %error,
                "operation measurement discarded"
            );
        }
    }
}
