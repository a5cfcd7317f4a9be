//! A small simulated pipeline that exercises every way of measuring a step.
//!
//! Checkpoints are emitted through `tracing`, so a subscriber is installed to see them.
//!
//! Run with: `cargo run --example pipeline`.
#![expect(
    clippy::arithmetic_side_effects,
    clippy::cast_precision_loss,
    reason = "this is example code that does not need production-level safety"
)]

use std::env;
use std::hint::black_box;
use std::thread;
use std::time::Duration;

use time_and_space::{AccumulatingTimer, Error, Session, profile_operation};

fn load_data(session: Option<&Session>, rows: u64) -> Result<Vec<f64>, Error> {
    let _span = profile_operation("Load Data", session, rows)?;

    let data = (0..rows).map(|row| (row as f64).sin()).collect();
    thread::sleep(Duration::from_millis(30));

    Ok(data)
}

fn build_features(session: Option<&Session>, data: &[f64]) -> Result<Vec<[f64; 4]>, Error> {
    let mut span = profile_operation("Build Features", session, data.len() as u64)?;

    let features: Vec<[f64; 4]> = data
        .windows(4)
        .filter_map(|window| window.try_into().ok())
        .collect();

    // Catch the peak while both the input and the features are alive.
    span.sample()?;
    thread::sleep(Duration::from_millis(20));

    Ok(features)
}

fn generate_signals(session: Option<&Session>, features: &[[f64; 4]]) -> u64 {
    let mut timer = AccumulatingTimer::new("Signal Generation");
    let mut signals = 0_u64;

    for feature in features {
        let _span = timer.enter();
        if feature.iter().sum::<f64>() > 3.5 {
            signals += 1;
        }
    }

    // Record signals produced rather than features scanned.
    timer.flush_with_count(session, signals);

    signals
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt().init();

    let session = Session::new();
    session.log_checkpoint("Start");

    let data = load_data(Some(&session), 200_000)?;
    session.log_checkpoint("After Load");

    let features = build_features(Some(&session), &data)?;
    let signals = generate_signals(Some(&session), &features);
    session.log_checkpoint("After Signals");

    // Profiling disabled for this step - nothing is recorded.
    black_box(load_data(None, 1_000)?);

    session.print_summary("Example Pipeline");
    println!("{signals} signals generated");

    if let Some(path) = env::args().nth(1) {
        session.flush_to_file(&path)?;
        println!("Profiling record written to {path}");
    }

    Ok(())
}
