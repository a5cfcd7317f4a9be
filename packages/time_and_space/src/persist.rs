//! Machine-readable record of a session, written as JSON.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tempfile::NamedTempFile;

use crate::{ComponentSummary, Error, Measurement, Result};

/// The persisted form of a session.
#[derive(Debug, serde::Serialize)]
pub(crate) struct SessionRecord {
    created_at_unix_secs: f64,
    total_elapsed_secs: f64,
    components: ComponentRecords,
}

/// Serialized as a map keyed by component name, in first-recorded order.
#[derive(Debug)]
struct ComponentRecords(Vec<ComponentRecord>);

#[derive(Debug, serde::Serialize)]
struct ComponentRecord {
    #[serde(skip)]
    name: String,
    total_elapsed_secs: f64,
    total_count: u64,
    throughput_per_sec: Option<f64>,
    per_item_ms: Option<f64>,
    memory_delta_gb: Option<f64>,
    peak_memory_gb: Option<f64>,
    measurements: Vec<MeasurementRecord>,
}

#[derive(Debug, serde::Serialize)]
struct MeasurementRecord {
    elapsed_secs: f64,
    count: u64,
    memory_delta_gb: Option<f64>,
    peak_memory_gb: Option<f64>,
    timestamp_secs: f64,
}

impl SessionRecord {
    pub(crate) fn new<'a>(
        created_at_unix_secs: f64,
        components: impl IntoIterator<Item = (ComponentSummary, &'a [Measurement])>,
    ) -> Self {
        let components: Vec<ComponentRecord> = components
            .into_iter()
            .map(|(summary, measurements)| ComponentRecord::new(&summary, measurements))
            .collect();

        let total_elapsed_secs = components.iter().map(|c| c.total_elapsed_secs).sum();

        Self {
            created_at_unix_secs,
            total_elapsed_secs,
            components: ComponentRecords(components),
        }
    }

    /// Writes the record to `path`, replacing any existing file.
    ///
    /// The record is serialized in full before anything touches the file system and is then
    /// moved into place with a rename, so `path` either keeps its previous contents or holds
    /// the complete new record.
    pub(crate) fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self).map_err(|source| Error::Serialize { source })?;

        let persist_error = |source: io::Error| Error::Persist {
            path: path.to_path_buf(),
            source,
        };

        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        fs::create_dir_all(directory).map_err(persist_error)?;

        let mut file = NamedTempFile::new_in(directory).map_err(persist_error)?;
        file.write_all(&json).map_err(persist_error)?;
        file.as_file().sync_all().map_err(persist_error)?;
        file.persist(path).map_err(|e| persist_error(e.error))?;

        Ok(())
    }
}

impl ComponentRecord {
    fn new(summary: &ComponentSummary, measurements: &[Measurement]) -> Self {
        Self {
            name: summary.name().to_owned(),
            total_elapsed_secs: summary.total_elapsed().as_secs_f64(),
            total_count: summary.total_count(),
            throughput_per_sec: summary.throughput(),
            per_item_ms: summary.per_item_ms(),
            memory_delta_gb: summary.memory_delta(),
            peak_memory_gb: summary.peak_memory(),
            measurements: measurements.iter().map(MeasurementRecord::from).collect(),
        }
    }
}

impl From<&Measurement> for MeasurementRecord {
    fn from(measurement: &Measurement) -> Self {
        Self {
            elapsed_secs: measurement.elapsed().as_secs_f64(),
            count: measurement.count(),
            memory_delta_gb: measurement.memory_delta(),
            peak_memory_gb: measurement.peak_memory(),
            timestamp_secs: measurement.timestamp().as_secs_f64(),
        }
    }
}

impl Serialize for ComponentRecords {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;

        for component in &self.0 {
            map.serialize_entry(&component.name, component)?;
        }

        map.end()
    }
}
