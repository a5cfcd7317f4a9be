//! Condensed mid-run snapshots of a session.

use std::fmt;
use std::time::Duration;

use crate::{ComponentSummary, NOT_AVAILABLE};

/// A read-only snapshot of a session taken by [`Session::log_checkpoint()`](crate::Session::log_checkpoint).
///
/// The `Display` implementation renders the same lines that are logged: a header with the
/// checkpoint label, the session time of the latest measurement and the total recorded time,
/// followed by one line per component.
#[derive(Clone, Debug, PartialEq)]
pub struct Checkpoint {
    label: String,
    since_session_start: Duration,
    components: Vec<ComponentSummary>,
}

impl Checkpoint {
    pub(crate) fn new(
        label: impl Into<String>,
        since_session_start: Duration,
        components: Vec<ComponentSummary>,
    ) -> Self {
        Self {
            label: label.into(),
            since_session_start,
            components,
        }
    }

    /// The label the checkpoint was taken with.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Time between the creation of the session and its most recent measurement.
    ///
    /// Zero if nothing has been recorded yet.
    #[must_use]
    pub fn since_session_start(&self) -> Duration {
        self.since_session_start
    }

    /// Statistics of all components at the time of the checkpoint.
    #[must_use]
    pub fn components(&self) -> &[ComponentSummary] {
        &self.components
    }

    /// Sum of the elapsed time recorded by all components.
    #[must_use]
    pub fn total_recorded(&self) -> Duration {
        self.components.iter().fold(Duration::ZERO, |total, c| {
            total.checked_add(c.total_elapsed()).expect(
                "elapsed time aggregation overflows Duration - this indicates an unrealistic scenario",
            )
        })
    }
}

/// Formats a rate in the largest unit that keeps it at or above one.
fn format_rate(throughput: Option<f64>) -> String {
    match throughput {
        None => NOT_AVAILABLE.to_owned(),
        Some(rate) if rate >= 1.0 => format!("{rate:.1}/s"),
        Some(rate) if rate >= 0.01 => format!("{:.1}/min", rate * 60.0),
        Some(rate) => format!("{:.1}/hr", rate * 3600.0),
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let since_start = self.since_session_start.as_secs_f64();

        if self.components.is_empty() {
            return writeln!(
                f,
                "[CHECKPOINT: {}] No profiling data yet ({since_start:.2}s since session start)",
                self.label
            );
        }

        writeln!(
            f,
            "[CHECKPOINT: {}] {since_start:.2}s since session start, {:.2}s recorded",
            self.label,
            self.total_recorded().as_secs_f64()
        )?;

        for component in &self.components {
            write!(
                f,
                "  {}: {:.2}s, {} items ({})",
                component.name(),
                component.total_elapsed().as_secs_f64(),
                component.total_count(),
                format_rate(component.throughput())
            )?;

            if let Some(peak) = component.peak_memory() {
                write!(f, ", peak={peak:.2}GB")?;
            }

            if let Some(delta) = component.memory_delta() {
                let sign = if delta >= 0.0 { "+" } else { "" };
                write!(f, ", Δ={sign}{delta:.2}GB")?;
            }

            writeln!(f)?;
        }

        Ok(())
    }
}
