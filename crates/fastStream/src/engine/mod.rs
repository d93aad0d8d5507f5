//! Layer 4: Engine
//!
//! This layer provides the accelerated Kernel Engines and the factory that
//! selects one by backend identifier.

// Internal dependencies
#[cfg(feature = "cpu")]
use self::executor::ParallelStream;
#[cfg(feature = "gpu")]
use self::gpu::{GpuDevices, GpuStream};

// Export dependencies from stream crate
use stream::internals::algorithms::kernels::{DeviceQuery, EngineRequest, StreamEngine};
use stream::internals::algorithms::sequential::{HostDevices, SerialStream};
use stream::internals::primitives::backend::Backend;
use stream::internals::primitives::element::StreamFloat;
use stream::internals::primitives::errors::StreamError;

// Parallel execution engine using CPU threads
#[cfg(feature = "cpu")]
pub mod executor;

// GPU-accelerated execution engine using wgpu
#[cfg(feature = "gpu")]
pub mod gpu;

/// Construct the Kernel Engine named by `request.backend`.
pub fn create_engine<T: StreamFloat>(
    request: &EngineRequest<T>,
) -> Result<Box<dyn StreamEngine<T>>, StreamError> {
    match request.backend {
        Backend::Serial => Ok(Box::new(SerialStream::from_request(request)?)),
        Backend::CPU => parallel_engine(request),
        Backend::GPU => gpu_engine(request),
    }
}

/// Device queries for `backend`.
pub fn device_query(backend: Backend) -> Result<Box<dyn DeviceQuery>, StreamError> {
    match backend {
        Backend::Serial | Backend::CPU => Ok(Box::new(HostDevices)),
        Backend::GPU => gpu_devices(),
    }
}

#[cfg(feature = "cpu")]
fn parallel_engine<T: StreamFloat>(
    request: &EngineRequest<T>,
) -> Result<Box<dyn StreamEngine<T>>, StreamError> {
    Ok(Box::new(ParallelStream::from_request(request)?))
}

#[cfg(not(feature = "cpu"))]
fn parallel_engine<T: StreamFloat>(
    _request: &EngineRequest<T>,
) -> Result<Box<dyn StreamEngine<T>>, StreamError> {
    Err(feature_disabled("cpu"))
}

#[cfg(feature = "gpu")]
fn gpu_engine<T: StreamFloat>(
    request: &EngineRequest<T>,
) -> Result<Box<dyn StreamEngine<T>>, StreamError> {
    Ok(Box::new(GpuStream::from_request(request)?))
}

#[cfg(not(feature = "gpu"))]
fn gpu_engine<T: StreamFloat>(
    _request: &EngineRequest<T>,
) -> Result<Box<dyn StreamEngine<T>>, StreamError> {
    Err(feature_disabled("gpu"))
}

#[cfg(feature = "gpu")]
fn gpu_devices() -> Result<Box<dyn DeviceQuery>, StreamError> {
    Ok(Box::new(GpuDevices::new()))
}

#[cfg(not(feature = "gpu"))]
fn gpu_devices() -> Result<Box<dyn DeviceQuery>, StreamError> {
    Err(feature_disabled("gpu"))
}

#[cfg(any(not(feature = "cpu"), not(feature = "gpu")))]
fn feature_disabled(feature: &str) -> StreamError {
    StreamError::DeviceUnavailable(format!(
        "backend requires the '{feature}' feature of fastStream"
    ))
}
