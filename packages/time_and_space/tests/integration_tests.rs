//! Integration tests for `time_and_space` against the real platform.
//!
//! These tests sleep and allocate for real and read the real process memory usage, so they
//! only assert lower bounds on elapsed time and the presence of memory figures.

use std::hint::black_box;
use std::thread;
use std::time::Duration;

use time_and_space::{AccumulatingTimer, Observation, ScopedTimer, Session, profile_operation};

fn example_pipeline() -> Session {
    let session = Session::new();

    session.record(
        "Load Data",
        Observation::new(Duration::from_millis(2500))
            .count(50)
            .memory_delta(0.30)
            .peak_memory(4.20),
    );
    session.record(
        "Train Model",
        Observation::new(Duration::from_secs(15))
            .memory_delta(1.20)
            .peak_memory(5.40),
    );

    session
}

#[test]
fn summary_table_renders_example_pipeline() {
    let table = example_pipeline().summary().titled("My Pipeline").to_string();
    let lines: Vec<&str> = table.lines().collect();

    assert_eq!(lines.len(), 10, "unexpected table:\n{table}");
    assert!(lines.iter().all(|line| line.chars().count() <= 120));
    assert_eq!(lines.get(1).unwrap().trim(), "My Pipeline");

    let load = lines.iter().find(|line| line.starts_with("Load Data")).unwrap();
    assert!(load.contains("2.50s"), "{load}");
    assert!(load.contains(" 50 "), "{load}");
    assert!(load.contains("20.0 items/s"), "{load}");
    assert!(load.contains("50.0ms"), "{load}");
    assert!(load.contains("0.30G"), "{load}");
    assert!(load.contains("4.20G"), "{load}");

    let train = lines.iter().find(|line| line.starts_with("Train Model")).unwrap();
    assert!(train.contains("15.00s"), "{train}");
    assert!(train.contains("0.1 items/s"), "{train}");
    assert!(train.contains("15000.0ms"), "{train}");

    let total = lines.iter().find(|line| line.contains("TOTAL")).unwrap();
    assert!(total.contains("17.50s"), "{total}");
}

#[test]
fn zero_elapsed_throughput_is_not_computable() {
    let session = Session::new();
    session.record("X", Observation::new(Duration::ZERO).count(10));

    let summary = session.summary();
    let x = summary.component("X").unwrap();
    assert_eq!(x.throughput(), None);

    let table = summary.to_string();
    let row = table.lines().find(|line| line.starts_with('X')).unwrap();
    assert!(row.contains("n/a"), "{row}");
    assert!(!row.contains("items/s"), "{row}");
}

#[test]
fn flush_to_file_round_trips_summary() {
    let session = example_pipeline();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("runs").join("profile.json");

    session.flush_to_file(&path).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

    for component in session.summary().components() {
        let record = &value["components"][component.name()];

        assert_eq!(
            record["total_elapsed_secs"].as_f64().unwrap(),
            component.total_elapsed().as_secs_f64()
        );
        assert_eq!(record["total_count"].as_u64().unwrap(), component.total_count());
        assert_eq!(record["memory_delta_gb"].as_f64(), component.memory_delta());
        assert_eq!(record["peak_memory_gb"].as_f64(), component.peak_memory());
    }

    assert_eq!(value["total_elapsed_secs"].as_f64().unwrap(), 17.5);
}

#[test]
fn flush_to_file_keeps_session_intact() {
    let session = example_pipeline();
    let before = session.summary();
    let dir = tempfile::tempdir().unwrap();

    session.flush_to_file(dir.path().join("first.json")).unwrap();
    session.flush_to_file(dir.path().join("second.json")).unwrap();

    assert_eq!(session.summary(), before);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("first.json")).unwrap(),
        std::fs::read_to_string(dir.path().join("second.json")).unwrap()
    );
}

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot use the real operating system APIs.
fn checkpoints_without_new_records_are_identical() {
    let session = Session::new();
    session.record("op", Observation::new(Duration::from_secs(2)).count(10));

    let first = session.log_checkpoint("cp").to_string();
    thread::sleep(Duration::from_millis(30));
    let second = session.log_checkpoint("cp").to_string();

    assert_eq!(first, second);
}

#[test]
fn empty_session_summary_still_has_total_row() {
    let table = Session::new().summary().titled("Nothing Yet").to_string();
    let lines: Vec<&str> = table.lines().collect();

    assert_eq!(lines.len(), 8, "unexpected table:\n{table}");
    assert_eq!(lines.get(1).unwrap().trim(), "Nothing Yet");
    assert!(lines.iter().any(|line| line.starts_with("Component")));

    let total = lines.iter().find(|line| line.contains("TOTAL")).unwrap();
    assert!(total.contains("0.00s"), "{total}");
}

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot use the real operating system APIs.
fn scoped_timer_measures_sleep_and_memory() {
    let timer = ScopedTimer::start().unwrap();
    thread::sleep(Duration::from_millis(20));
    let reading = timer.finish().unwrap();

    assert!(reading.elapsed() >= Duration::from_millis(20));
    assert!(reading.memory_delta().is_some());
    assert!(reading.peak_memory().unwrap() > 0.0);

    if cfg!(target_os = "linux") {
        let before = reading.system_memory_before().unwrap();
        let after = reading.system_memory_after().unwrap();
        assert!((0.0..=100.0).contains(&before), "{before}");
        assert!((0.0..=100.0).contains(&after), "{after}");
    }
}

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot use the real operating system APIs.
fn accumulating_timer_sums_sleeps() {
    let session = Session::new();
    let mut timer = AccumulatingTimer::new("sleepy");

    for _ in 0..5 {
        let _span = timer.enter();
        thread::sleep(Duration::from_millis(5));
    }

    let (total, count) = timer.flush(Some(&session));
    assert!(total >= Duration::from_millis(25));
    assert_eq!(count, 5);

    let measurements = session.measurements("sleepy");
    assert_eq!(measurements.len(), 1);
    assert_eq!(measurements.first().unwrap().elapsed(), total);
    assert_eq!(measurements.first().unwrap().count(), 5);
}

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot use the real operating system APIs.
fn operation_helper_records_real_measurement() {
    let session = Session::new();

    {
        let _span = profile_operation("Allocate", Some(&session), 1_000_000).unwrap();
        let data: Vec<u64> = (0..1_000_000).collect();
        black_box(&data);
        thread::sleep(Duration::from_millis(5));
    }

    let summary = session.summary();
    let component = summary.component("Allocate").unwrap();

    assert!(component.total_elapsed() >= Duration::from_millis(5));
    assert_eq!(component.total_count(), 1_000_000);
    assert!(component.memory_delta().is_some());
    assert!(component.peak_memory().unwrap() > 0.0);
}

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot use the real operating system APIs.
fn operation_helper_without_session_measures_time_only() {
    let span = profile_operation("Disabled", None, 1).unwrap();
    thread::sleep(Duration::from_millis(2));
    let reading = span.finish().unwrap();

    assert!(reading.elapsed() >= Duration::from_millis(2));
    assert_eq!(reading.peak_memory(), None);
}
