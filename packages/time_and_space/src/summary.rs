//! Aggregated statistics and the summary table.

use std::fmt;
use std::time::Duration;

use crate::{Measurement, NOT_AVAILABLE};

const DEFAULT_TITLE: &str = "PROFILING RESULTS";
const TABLE_WIDTH: usize = 120;

/// Aggregated statistics of one component, derived from all its measurements.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentSummary {
    name: String,
    total_elapsed: Duration,
    total_count: u64,
    memory_delta: Option<f64>,
    peak_memory: Option<f64>,
}

impl ComponentSummary {
    pub(crate) fn from_measurements(name: &str, measurements: &[Measurement]) -> Self {
        let total_elapsed = measurements.iter().fold(Duration::ZERO, |total, m| {
            total.checked_add(m.elapsed()).expect(
                "elapsed time aggregation overflows Duration - this indicates an unrealistic scenario",
            )
        });

        let total_count = measurements.iter().fold(0_u64, |total, m| {
            total.checked_add(m.count()).expect(
                "count aggregation overflows u64 - this indicates an unrealistic scenario",
            )
        });

        // Deltas of repeated calls are not cumulative growth, so only the latest one is kept.
        let memory_delta = if measurements.iter().any(|m| m.memory_delta().is_some()) {
            Some(
                measurements
                    .last()
                    .and_then(Measurement::memory_delta)
                    .unwrap_or_default(),
            )
        } else {
            None
        };

        let peak_memory = measurements
            .iter()
            .filter_map(Measurement::peak_memory)
            .reduce(f64::max);

        Self {
            name: name.to_owned(),
            total_elapsed,
            total_count,
            memory_delta,
            peak_memory,
        }
    }

    /// Name of the component.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sum of the elapsed time of all measurements.
    #[must_use]
    pub fn total_elapsed(&self) -> Duration {
        self.total_elapsed
    }

    /// Sum of the item counts of all measurements.
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Items processed per second.
    ///
    /// `None` if no time has elapsed, in which case the rate is not computable.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "item counts beyond 2^52 are not a realistic concern for a rate"
    )]
    pub fn throughput(&self) -> Option<f64> {
        let seconds = self.total_elapsed.as_secs_f64();

        (seconds > 0.0).then(|| self.total_count as f64 / seconds)
    }

    /// Mean time per item, in milliseconds.
    ///
    /// `None` if no items were processed, in which case the cost is not computable.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "item counts beyond 2^52 are not a realistic concern for a mean"
    )]
    pub fn per_item_ms(&self) -> Option<f64> {
        (self.total_count > 0)
            .then(|| self.total_elapsed.as_secs_f64() * 1000.0 / self.total_count as f64)
    }

    /// Memory delta of the most recent measurement, in gigabytes.
    ///
    /// `None` if no measurement of this component ever supplied a memory delta. If some did
    /// but the most recent one did not, the delta is zero.
    #[must_use]
    pub fn memory_delta(&self) -> Option<f64> {
        self.memory_delta
    }

    /// Highest peak memory of any measurement, in gigabytes.
    ///
    /// `None` if no measurement of this component ever supplied a peak.
    #[must_use]
    pub fn peak_memory(&self) -> Option<f64> {
        self.peak_memory
    }
}

/// Snapshot of the aggregated statistics of all components of a session.
///
/// Components are listed in the order in which they were first recorded. The `Display`
/// implementation renders the fixed-width summary table.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use time_and_space::Session;
///
/// let session = Session::new();
/// session.record("Load Data", Duration::from_millis(2500));
/// session.record("Load Data", Duration::from_millis(500));
///
/// let summary = session.summary();
/// let load = summary.component("Load Data").unwrap();
/// assert_eq!(load.total_elapsed(), Duration::from_secs(3));
/// assert_eq!(load.total_count(), 2);
///
/// println!("{}", summary.titled("Nightly Run"));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    title: String,
    components: Vec<ComponentSummary>,
}

impl Summary {
    pub(crate) fn new(components: Vec<ComponentSummary>) -> Self {
        Self {
            title: DEFAULT_TITLE.to_owned(),
            components,
        }
    }

    /// Replaces the title shown in the banner of the summary table.
    #[must_use]
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// The title shown in the banner of the summary table.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Statistics of all components, in first-recorded order.
    #[must_use]
    pub fn components(&self) -> &[ComponentSummary] {
        &self.components
    }

    /// Statistics of the component with the given name, if it was recorded.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&ComponentSummary> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Sum of the elapsed time of all components.
    #[must_use]
    pub fn total_elapsed(&self) -> Duration {
        self.components.iter().fold(Duration::ZERO, |total, c| {
            total.checked_add(c.total_elapsed).expect(
                "elapsed time aggregation overflows Duration - this indicates an unrealistic scenario",
            )
        })
    }

    /// Whether no component was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

fn write_rule(f: &mut fmt::Formatter<'_>, c: char) -> fmt::Result {
    writeln!(f, "{}", c.to_string().repeat(TABLE_WIDTH))
}

fn write_gigabytes(f: &mut fmt::Formatter<'_>, value: Option<f64>) -> fmt::Result {
    match value {
        Some(gigabytes) => write!(f, "{gigabytes:>9.2}G"),
        None => write!(f, "{NOT_AVAILABLE:>10}"),
    }
}

impl fmt::Display for ComponentSummary {
    /// Renders the component as one row of the summary table.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let throughput = self
            .throughput()
            .map_or_else(|| NOT_AVAILABLE.to_owned(), |rate| format!("{rate:.1} items/s"));

        write!(
            f,
            "{:<40} {:>9.2}s {:>10} {throughput:>15} ",
            self.name,
            self.total_elapsed.as_secs_f64(),
            self.total_count,
        )?;

        match self.per_item_ms() {
            Some(ms) => write!(f, "{ms:>9.1}ms")?,
            None => write!(f, "{NOT_AVAILABLE:>11}")?,
        }

        write!(f, " ")?;
        write_gigabytes(f, self.memory_delta)?;
        write!(f, " ")?;
        write_gigabytes(f, self.peak_memory)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_rule(f, '=')?;
        writeln!(f, "{:^width$}", self.title, width = TABLE_WIDTH)?;
        write_rule(f, '=')?;
        writeln!(
            f,
            "{:<40} {:>10} {:>10} {:>15} {:>10} {:>10} {:>10}",
            "Component", "Time", "Count", "Throughput", "Per-Item", "Mem Δ", "Peak"
        )?;
        write_rule(f, '-')?;

        for component in &self.components {
            writeln!(f, "{component}")?;
        }

        write_rule(f, '=')?;
        writeln!(
            f,
            "{:^40} {:>9.2}s",
            "TOTAL",
            self.total_elapsed().as_secs_f64()
        )?;
        write_rule(f, '=')
    }
}
