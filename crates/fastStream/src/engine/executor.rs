//! Parallel host backend for the stream kernels.
//!
//! ## Purpose
//!
//! This module provides [`ParallelStream`], a Kernel Engine that distributes
//! every kernel across CPU cores with `rayon`. It is the default backend of
//! the `fastStream` builder.
//!
//! ## Design notes
//!
//! * **Index-driven**: Kernels zip the index range with the mutable output
//!   array, so each worker writes only its own elements and reads the inputs
//!   by index.
//! * **Thread pool**: An explicit worker count builds a dedicated pool;
//!   otherwise kernels run on rayon's global pool.
//! * **Parallel first touch**: `init_arrays` fills the arrays in parallel so
//!   pages are placed near the threads that later stream them.
//! * **Wide reduction**: `dot` widens every product to `f64` before rayon's
//!   tree-shaped sum.
//!
//! ## Invariants
//!
//! * The five array kernels produce results bit-identical to the serial
//!   backend (same expressions, no contraction).
//! * Every kernel returns only after all workers have finished.
//!
//! ## Non-goals
//!
//! * This module does not pin threads or tune NUMA placement.

// External dependencies
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

// Export dependencies from stream crate
use stream::internals::algorithms::kernels::{EngineRequest, StreamEngine};
use stream::internals::primitives::backend::Backend;
use stream::internals::primitives::buffer::ArrayStore;
use stream::internals::primitives::element::StreamFloat;
use stream::internals::primitives::errors::StreamError;
use stream::internals::primitives::range::IndexRange;

/// Minimum number of elements handed to one rayon task.
const MIN_LEN: usize = 4096;

// ============================================================================
// Parallel Engine
// ============================================================================

/// Multi-threaded Kernel Engine backed by rayon.
#[derive(Debug)]
pub struct ParallelStream<T> {
    store: ArrayStore<T>,
    range: IndexRange,
    scalar: T,
    pool: Option<ThreadPool>,
}

impl<T: StreamFloat> ParallelStream<T> {
    /// Allocate the array store and, if `threads` is given, a dedicated pool.
    ///
    /// The device index is ignored: the host is the only device.
    pub fn new(
        array_size: usize,
        device: usize,
        scalar: T,
        threads: Option<usize>,
    ) -> Result<Self, StreamError> {
        if device != 0 {
            debug!(device, "cpu backend ignores the device index");
        }

        let pool = match threads {
            Some(n) => Some(ThreadPoolBuilder::new().num_threads(n).build().map_err(
                |err| StreamError::DeviceUnavailable(format!("rayon thread pool: {err}")),
            )?),
            None => None,
        };

        let store = ArrayStore::allocate(array_size)?;
        Ok(Self {
            range: IndexRange::new(store.len()),
            store,
            scalar,
            pool,
        })
    }

    /// Construct from a factory request.
    pub fn from_request(request: &EngineRequest<T>) -> Result<Self, StreamError> {
        Self::new(
            request.array_size,
            request.device,
            request.scalar,
            request.threads,
        )
    }

    /// Number of worker threads kernels run on.
    pub fn num_threads(&self) -> usize {
        self.pool
            .as_ref()
            .map_or_else(rayon::current_num_threads, ThreadPool::current_num_threads)
    }
}

/// Run `op` inside `pool`, or on the global pool when there is none.
fn install<R, F>(pool: Option<&ThreadPool>, op: F) -> R
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    match pool {
        Some(pool) => pool.install(op),
        None => op(),
    }
}

impl<T: StreamFloat> StreamEngine<T> for ParallelStream<T> {
    fn backend(&self) -> Backend {
        Backend::CPU
    }

    fn implementation(&self) -> String {
        format!("Rayon ({} threads)", self.num_threads())
    }

    fn array_size(&self) -> usize {
        self.store.len()
    }

    fn init_arrays(&mut self, init_a: T, init_b: T, init_c: T) -> Result<(), StreamError> {
        let (a, b, c) = self.store.split_mut();
        install(self.pool.as_ref(), || {
            a.par_iter_mut()
                .with_min_len(MIN_LEN)
                .for_each(|x| *x = init_a);
            b.par_iter_mut()
                .with_min_len(MIN_LEN)
                .for_each(|x| *x = init_b);
            c.par_iter_mut()
                .with_min_len(MIN_LEN)
                .for_each(|x| *x = init_c);
        });
        Ok(())
    }

    fn read_arrays(&self, a: &mut [T], b: &mut [T], c: &mut [T]) -> Result<(), StreamError> {
        self.store.read_into(a, b, c)
    }

    fn copy(&mut self) -> Result<(), StreamError> {
        let range = self.range;
        let (a, _, c) = self.store.split_mut();
        let a = &*a;
        install(self.pool.as_ref(), || {
            range
                .iter()
                .into_par_iter()
                .zip(c.par_iter_mut())
                .with_min_len(MIN_LEN)
                .for_each(|(i, c_i)| *c_i = a[i]);
        });
        Ok(())
    }

    fn mul(&mut self) -> Result<(), StreamError> {
        let (range, scalar) = (self.range, self.scalar);
        let (_, b, c) = self.store.split_mut();
        let c = &*c;
        install(self.pool.as_ref(), || {
            range
                .iter()
                .into_par_iter()
                .zip(b.par_iter_mut())
                .with_min_len(MIN_LEN)
                .for_each(|(i, b_i)| *b_i = scalar * c[i]);
        });
        Ok(())
    }

    fn add(&mut self) -> Result<(), StreamError> {
        let range = self.range;
        let (a, b, c) = self.store.split_mut();
        let (a, b) = (&*a, &*b);
        install(self.pool.as_ref(), || {
            range
                .iter()
                .into_par_iter()
                .zip(c.par_iter_mut())
                .with_min_len(MIN_LEN)
                .for_each(|(i, c_i)| *c_i = a[i] + b[i]);
        });
        Ok(())
    }

    fn triad(&mut self) -> Result<(), StreamError> {
        let (range, scalar) = (self.range, self.scalar);
        let (a, b, c) = self.store.split_mut();
        let (b, c) = (&*b, &*c);
        install(self.pool.as_ref(), || {
            range
                .iter()
                .into_par_iter()
                .zip(a.par_iter_mut())
                .with_min_len(MIN_LEN)
                .for_each(|(i, a_i)| *a_i = b[i] + scalar * c[i]);
        });
        Ok(())
    }

    fn nstream(&mut self) -> Result<(), StreamError> {
        let (range, scalar) = (self.range, self.scalar);
        let (a, b, c) = self.store.split_mut();
        let (b, c) = (&*b, &*c);
        install(self.pool.as_ref(), || {
            range
                .iter()
                .into_par_iter()
                .zip(a.par_iter_mut())
                .with_min_len(MIN_LEN)
                .for_each(|(i, a_i)| *a_i = *a_i + b[i] + scalar * c[i]);
        });
        Ok(())
    }

    fn dot(&mut self) -> Result<T, StreamError> {
        let range = self.range;
        let (a, b) = (self.store.a(), self.store.b());
        let sum: f64 = install(self.pool.as_ref(), || {
            range
                .iter()
                .into_par_iter()
                .with_min_len(MIN_LEN)
                .map(|i| (a[i] * b[i]).widen())
                .sum()
        });
        Ok(T::narrow(sum))
    }
}
