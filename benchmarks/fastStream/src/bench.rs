//! Memory bandwidth benchmarks using Criterion.
//!
//! Benchmarks cover:
//! - Every kernel across array sizes from cache-resident to DRAM-bound
//! - Single vs. double precision triad
//! - Complete benchmark runs including verification
//!
//! Throughput is reported in bytes using each kernel's traffic model, so
//! Criterion's throughput column is directly comparable to the harness output.
//!
//! For the serial reference, use `FASTSTREAM_BACKEND=serial cargo bench`.
//! For the rayon backend, use `FASTSTREAM_BACKEND=cpu cargo bench` (default).
//! For the GPU backend, use `FASTSTREAM_BACKEND=gpu cargo bench --features gpu`.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use fastStream::prelude::*;
use std::env;
use std::hint::black_box;

// ============================================================================
// Helper Functions
// ============================================================================

fn get_config() -> (Backend, &'static str) {
    match env::var("FASTSTREAM_BACKEND").ok().as_deref() {
        Some("serial") => (Serial, "serial"),
        Some("gpu") => (GPU, "gpu"),
        Some("cpu") | Some("parallel") | _ => (CPU, "cpu"),
    }
}

/// Initialized engine for `n` elements, or `None` when the backend cannot
/// provide one for `T`.
fn engine<T: StreamFloat>(backend: Backend, n: usize) -> Option<Box<dyn StreamEngine<T>>> {
    let bench = Stream::<T>::new()
        .array_size(n)
        .backend(backend)
        .build()
        .ok()?;
    match bench.engine() {
        Ok(mut engine) => {
            let init = InitValues::<T>::default();
            engine.init_arrays(init.a, init.b, init.c).ok()?;
            Some(engine)
        }
        Err(err) => {
            eprintln!("skipping {backend} ({}): {err}", T::PRECISION);
            None
        }
    }
}

// ============================================================================
// Benchmark Functions
// ============================================================================

fn bench_kernels(c: &mut Criterion) {
    let (backend, mode_name) = get_config();
    let mut group = c.benchmark_group(format!("kernels_{}", mode_name));
    group.sample_size(50);

    for size in [1 << 16, 1 << 20, 1 << 23] {
        let Some(mut engine) = engine::<f32>(backend, size) else {
            continue;
        };

        for kernel in Kernel::ALL {
            group.throughput(Throughput::Bytes(kernel.bytes_moved::<f32>(size) as u64));
            group.bench_with_input(BenchmarkId::new(kernel.name(), size), &size, |b, _| {
                b.iter(|| black_box(engine.execute(black_box(kernel)).unwrap()))
            });
        }
    }
    group.finish();
}

fn bench_precision(c: &mut Criterion) {
    let (backend, mode_name) = get_config();
    let mut group = c.benchmark_group(format!("triad_precision_{}", mode_name));
    group.sample_size(50);
    let size = 1 << 22;

    if let Some(mut engine) = engine::<f32>(backend, size) {
        group.throughput(Throughput::Bytes(Kernel::Triad.bytes_moved::<f32>(size) as u64));
        group.bench_function("float", |b| b.iter(|| engine.triad().unwrap()));
    }
    if let Some(mut engine) = engine::<f64>(backend, size) {
        group.throughput(Throughput::Bytes(Kernel::Triad.bytes_moved::<f64>(size) as u64));
        group.bench_function("double", |b| b.iter(|| engine.triad().unwrap()));
    }
    group.finish();
}

fn bench_full_run(c: &mut Criterion) {
    let (backend, mode_name) = get_config();
    let mut group = c.benchmark_group(format!("full_run_{}", mode_name));
    group.sample_size(10);

    let repetitions = 5;
    for size in [1 << 18, 1 << 21] {
        let kernels = KernelSelection::All.kernels();
        let bytes: usize = kernels
            .iter()
            .map(|k| k.bytes_moved::<f32>(size) * repetitions)
            .sum();
        group.throughput(Throughput::Bytes(bytes as u64));

        let Ok(mut bench) = Stream::<f32>::new()
            .array_size(size)
            .repetitions(repetitions)
            .kernels(KernelSelection::All)
            .backend(backend)
            .build()
        else {
            continue;
        };

        group.bench_with_input(BenchmarkId::new("all_kernels", size), &size, |b, _| {
            b.iter(|| black_box(bench.run().unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_kernels, bench_precision, bench_full_run);

criterion_main!(benches);
