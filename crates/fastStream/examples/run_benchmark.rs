//! fastStream Benchmark Examples
//!
//! This example demonstrates features specific to `fastStream`:
//! - Parallel execution using `rayon`
//! - Serial reference comparison
//! - Device queries
//! - `ndarray` readback
//! - Mapping errors to process exit codes
//!
//! Set `RUST_LOG=fastStream=debug,stream=debug` to see per-kernel summaries.

use fastStream::prelude::*;
use ndarray::Array1;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("{}", "=".repeat(80));
    println!("fastStream Benchmark Examples");
    println!("{}", "=".repeat(80));
    println!();

    let outcome = example_1_devices()
        .and_then(|_| example_2_parallel_run())
        .and_then(|_| example_3_serial_reference())
        .and_then(|_| example_4_ndarray_readback());

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

/// Example 1: Device Queries
/// Lists the devices each backend can run on
fn example_1_devices() -> Result<(), StreamError> {
    println!("Example 1: Device Queries");
    println!("{}", "-".repeat(80));

    for backend in [Serial, CPU, GPU] {
        match device_query(backend) {
            Ok(query) => {
                for (i, name) in query.list_devices().iter().enumerate() {
                    println!(
                        "{backend:>6} [{i}] {name} | {} | {}",
                        query.device_name(i),
                        query.device_driver(i)
                    );
                }
            }
            Err(err) => println!("{backend:>6} {err}"),
        }
    }

    println!();
    Ok(())
}

/// Example 2: Parallel Execution
/// Runs every kernel on the default rayon backend
fn example_2_parallel_run() -> Result<(), StreamError> {
    println!("Example 2: Parallel Execution");
    println!("{}", "-".repeat(80));

    let mut bench = Stream::<f64>::new()
        .array_size(1 << 22)
        .repetitions(20)
        .kernels(KernelSelection::All)
        .build()?;

    let result = bench.run()?;
    println!("{result}");
    Ok(())
}

/// Example 3: Serial Reference
/// Same run on the single-threaded reference backend, interleaved schedule
fn example_3_serial_reference() -> Result<(), StreamError> {
    println!("Example 3: Serial Reference");
    println!("{}", "-".repeat(80));

    let mut bench = Stream::<f32>::new()
        .array_size(1 << 22)
        .repetitions(20)
        .backend(Serial)
        .schedule(Schedule::Interleaved)
        .unit(BandwidthUnit::GibiBytes)
        .build()?;

    let result = bench.run()?;
    println!("{result}");
    Ok(())
}

/// Example 4: ndarray Integration
/// Drives an engine directly and reads its arrays into ndarray vectors
fn example_4_ndarray_readback() -> Result<(), StreamError> {
    println!("Example 4: ndarray Readback");
    println!("{}", "-".repeat(80));

    let bench = Stream::<f64>::new().array_size(1024).build()?;
    let mut engine = bench.engine()?;
    engine.init_arrays(0.1, 0.2, 0.0)?;
    engine.triad()?;

    let mut a = Array1::<f64>::zeros(1024);
    let mut b = vec![0.0; 1024];
    let mut c = Array1::<f64>::zeros(1024);
    read_arrays_into(&*engine, &mut a, &mut b, &mut c)?;
    println!("a[0] = {}, b[0] = {}, c[0] = {}", a[0], b[0], c[0]);
    println!("dot = {}", engine.dot()?);

    println!();
    Ok(())
}
