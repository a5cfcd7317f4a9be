use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::pal::{Platform, PlatformFacade};
use crate::persist::SessionRecord;
use crate::{
    Checkpoint, ComponentSummary, ERR_POISONED_LOCK, Measurement, Observation, Result, Summary,
};

/// Collects named measurements of the components of a pipeline run.
///
/// Measurements recorded under the same name are aggregated into one component. Components
/// are reported in the order in which their names were first recorded.
///
/// The session is thread-safe: any number of threads may record into it concurrently. Reading
/// operations ([`summary()`](Self::summary), [`log_checkpoint()`](Self::log_checkpoint),
/// [`flush_to_file()`](Self::flush_to_file)) work on a snapshot and never modify the session.
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
///     "Data Loading",
///     Observation::new(Duration::from_millis(2500)).count(10),
/// );
/// session.record(
///     "Computation",
///     Observation::new(Duration::from_secs(15))
///         .count(500)
///         .memory_delta(2.1),
/// );
///
/// session.log_checkpoint("After Computation");
/// session.print_summary("Pipeline Results");
/// ```
#[derive(Debug)]
pub struct Session {
    components: Mutex<Components>,
    platform: PlatformFacade,
    started_at: Duration,
    created_at: SystemTime,
}

/// Measurements grouped by component name, in first-recorded order.
///
/// The order and the storage live behind the same lock, so a name never becomes visible
/// without its first measurement.
#[derive(Debug, Default)]
struct Components {
    entries: Vec<(String, Vec<Measurement>)>,
    index_by_name: HashMap<String, usize>,
}

impl Components {
    fn push(&mut self, name: String, measurement: Measurement) {
        let next_index = self.entries.len();
        let entries = &mut self.entries;

        let index = *self.index_by_name.entry(name).or_insert_with_key(|name| {
            entries.push((name.clone(), Vec::new()));
            next_index
        });

        entries
            .get_mut(index)
            .expect("index entries always point at existing components")
            .1
            .push(measurement);
    }

    /// Session time at which the most recent measurement was recorded.
    fn last_recorded_at(&self) -> Duration {
        self.entries
            .iter()
            .flat_map(|(_, measurements)| measurements.iter().map(Measurement::timestamp))
            .max()
            .unwrap_or(Duration::ZERO)
    }

    fn summaries(&self) -> Vec<ComponentSummary> {
        self.entries
            .iter()
            .map(|(name, measurements)| ComponentSummary::from_measurements(name, measurements))
            .collect()
    }
}

impl Session {
    /// Creates a new profiling session.
    ///
    /// The time of creation is the reference point for measurement timestamps and checkpoints.
    #[expect(
        clippy::new_without_default,
        reason = "to avoid ambiguity with the notion of a 'default session' that is not actually a default session"
    )]
    #[must_use]
    pub fn new() -> Self {
        Self::with_platform(PlatformFacade::real())
    }

    /// Creates a new session on a specific platform.
    ///
    /// This is used by unit tests to inject a fake platform that does not rely on the
    /// operating system.
    pub(crate) fn with_platform(platform: PlatformFacade) -> Self {
        Self {
            components: Mutex::new(Components::default()),
            started_at: platform.now(),
            platform,
            created_at: SystemTime::now(),
        }
    }

    pub(crate) fn platform(&self) -> &PlatformFacade {
        &self.platform
    }

    /// Records a measurement of the component `name`.
    ///
    /// Accepts either a plain `Duration` (one item, no memory figures) or an [`Observation`]
    /// carrying the item count and memory figures.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use time_and_space::{Observation, Session};
    ///
    /// let session = Session::new();
    /// session.record("Parse", Duration::from_millis(120));
    /// session.record("Parse", Observation::new(Duration::from_millis(80)).count(4));
    ///
    /// assert_eq!(session.measurements("Parse").len(), 2);
    /// assert_eq!(session.summary().component("Parse").unwrap().total_count(), 5);
    /// ```
    pub fn record(&self, name: impl Into<String>, observation: impl Into<Observation>) {
        let name = name.into();
        let observation = observation.into();

        let mut components = self.components.lock().expect(ERR_POISONED_LOCK);

        // The timestamp is taken inside the lock to keep it in step with list order.
        let timestamp = self.elapsed_since_start();
        components.push(name, Measurement::new(observation, timestamp));
    }

    /// Creates a snapshot of the aggregated statistics of all components.
    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary::new(self.components.lock().expect(ERR_POISONED_LOCK).summaries())
    }

    /// Prints the summary table to stdout under the given title.
    ///
    /// An empty session still prints the banner, the column headers and a zero `TOTAL` row.
    #[cfg_attr(test, mutants::skip)] // Too difficult to test stdout output reliably.
    pub fn print_summary(&self, title: &str) {
        println!("{}", self.summary().titled(title));
    }

    /// Logs a condensed snapshot of the session and returns it.
    ///
    /// Each line of the checkpoint is emitted as an `INFO` level `tracing` event. Useful for
    /// long-running pipelines that want incremental visibility without waiting for the full
    /// summary table.
    ///
    /// The checkpoint is derived from recorded measurements only: its time since session start
    /// is the timestamp of the most recent measurement. Taking a checkpoint does not modify the
    /// session, and checkpoints taken with no `record()` in between are identical.
    pub fn log_checkpoint(&self, label: &str) -> Checkpoint {
        let checkpoint = {
            let components = self.components.lock().expect(ERR_POISONED_LOCK);
            Checkpoint::new(label, components.last_recorded_at(), components.summaries())
        };

        for line in checkpoint.to_string().lines() {
            tracing::info!("{line}");
        }

        checkpoint
    }

    /// Writes the aggregated statistics and all raw measurements to `path` as JSON.
    ///
    /// Any existing file at `path` is replaced and missing parent directories are created.
    /// The file is replaced atomically: it either keeps its previous contents or holds the
    /// complete new record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialize`](crate::Error::Serialize) if the record cannot be serialized
    /// and [`Error::Persist`](crate::Error::Persist) if it cannot be written to `path`.
    pub fn flush_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let record = {
            let components = self.components.lock().expect(ERR_POISONED_LOCK);

            SessionRecord::new(
                self.created_at_unix_secs(),
                components.entries.iter().map(|(name, measurements)| {
                    (
                        ComponentSummary::from_measurements(name, measurements),
                        measurements.as_slice(),
                    )
                }),
            )
        };

        record.write_to(path.as_ref())?;

        tracing::debug!(path = %path.as_ref().display(), "profiling record written");

        Ok(())
    }

    /// Time elapsed since the session was created.
    #[must_use]
    pub fn elapsed_since_start(&self) -> Duration {
        self.platform.now().saturating_sub(self.started_at)
    }

    /// Whether nothing has been recorded in this session.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components
            .lock()
            .expect(ERR_POISONED_LOCK)
            .entries
            .is_empty()
    }

    /// Names of all recorded components, in first-recorded order.
    #[must_use]
    pub fn component_names(&self) -> Vec<String> {
        self.components
            .lock()
            .expect(ERR_POISONED_LOCK)
            .entries
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// All measurements recorded under `name`, in the order they were recorded.
    ///
    /// Returns an empty list for names that were never recorded.
    #[must_use]
    pub fn measurements(&self, name: &str) -> Vec<Measurement> {
        let components = self.components.lock().expect(ERR_POISONED_LOCK);

        components
            .index_by_name
            .get(name)
            .and_then(|&index| components.entries.get(index))
            .map_or_else(Vec::new, |(_, measurements)| measurements.clone())
    }

    fn created_at_unix_secs(&self) -> f64 {
        self.created_at
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64()
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Delegate to the summary table for consistency.
        write!(f, "{}", self.summary())
    }
}
