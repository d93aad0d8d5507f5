//! GPU backend for the stream kernels.
//!
//! ## Purpose
//!
//! This module provides [`GpuStream`], a Kernel Engine that keeps the three
//! arrays in device memory and runs every kernel as a `wgpu` compute
//! dispatch, and [`GpuDevices`], which answers device queries by enumerating
//! `wgpu` adapters.
//!
//! ## Design notes
//!
//! * **One shader module**: All kernels live in one WGSL module sharing a
//!   single bind group (params, `a`, `b`, `c`, dot partials).
//! * **Grid-stride loops**: Dispatches are capped at the per-dimension
//!   workgroup limit; each invocation strides over the array.
//! * **Two-stage dot**: Each workgroup tree-reduces its products in
//!   workgroup memory and writes one partial; the host sums the partials in
//!   `f64`.
//! * **Synchronous**: Every kernel submits and waits for the queue before
//!   returning.
//!
//! ## Invariants
//!
//! * Only `f32` elements are supported.
//! * Every buffer fits the device's storage binding limit.
//!
//! ## Non-goals
//!
//! * Unified or host-mapped array storage.
//! * Multi-device runs.

// External dependencies
use bytemuck::{Pod, Zeroable};
use core::marker::PhantomData;
use core::mem::size_of;
use pollster::block_on;
use tracing::{debug, info};
use wgpu::{
    Adapter, AdapterInfo, BindGroup, BindGroupDescriptor, BindGroupEntry,
    BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingType, Buffer, BufferBindingType,
    BufferDescriptor, BufferUsages, CommandEncoderDescriptor, ComputePassDescriptor,
    ComputePipeline, ComputePipelineDescriptor, Device, DeviceDescriptor, ErrorFilter, Instance,
    InstanceDescriptor, MapMode, PipelineLayoutDescriptor, PollType, Queue,
    ShaderModuleDescriptor, ShaderSource, ShaderStages,
};

// Export dependencies from stream crate
use stream::internals::algorithms::kernels::{
    DEVICE_DRIVER_UNAVAILABLE, DEVICE_NAME_UNAVAILABLE, DeviceQuery, EngineRequest, StreamEngine,
};
use stream::internals::primitives::backend::Backend;
use stream::internals::primitives::buffer::check_destination;
use stream::internals::primitives::element::StreamFloat;
use stream::internals::primitives::errors::StreamError;

/// Invocations per workgroup; must match `WG` in the shader.
const WORKGROUP_SIZE: u32 = 256;

// -----------------------------------------------------------------------------
// Shader Source (WGSL)
// -----------------------------------------------------------------------------
const SHADER_SOURCE: &str = r#"
struct Params {
    n: u32,
    scalar: f32,
    init_a: f32,
    init_b: f32,
    init_c: f32,
    pad0: u32,
    pad1: u32,
    pad2: u32,
}

@group(0) @binding(0) var<uniform> params: Params;
@group(0) @binding(1) var<storage, read_write> a: array<f32>;
@group(0) @binding(2) var<storage, read_write> b: array<f32>;
@group(0) @binding(3) var<storage, read_write> c: array<f32>;
@group(0) @binding(4) var<storage, read_write> partials: array<f32>;

const WG: u32 = 256u;

var<workgroup> scratch: array<f32, 256>;

@compute @workgroup_size(256)
fn init_arrays(
    @builtin(global_invocation_id) gid: vec3<u32>,
    @builtin(num_workgroups) nwg: vec3<u32>
) {
    let stride = nwg.x * WG;
    for (var i = gid.x; i < params.n; i = i + stride) {
        a[i] = params.init_a;
        b[i] = params.init_b;
        c[i] = params.init_c;
    }
}

@compute @workgroup_size(256)
fn copy(
    @builtin(global_invocation_id) gid: vec3<u32>,
    @builtin(num_workgroups) nwg: vec3<u32>
) {
    let stride = nwg.x * WG;
    for (var i = gid.x; i < params.n; i = i + stride) {
        c[i] = a[i];
    }
}

@compute @workgroup_size(256)
fn mul(
    @builtin(global_invocation_id) gid: vec3<u32>,
    @builtin(num_workgroups) nwg: vec3<u32>
) {
    let stride = nwg.x * WG;
    for (var i = gid.x; i < params.n; i = i + stride) {
        b[i] = params.scalar * c[i];
    }
}

@compute @workgroup_size(256)
fn add(
    @builtin(global_invocation_id) gid: vec3<u32>,
    @builtin(num_workgroups) nwg: vec3<u32>
) {
    let stride = nwg.x * WG;
    for (var i = gid.x; i < params.n; i = i + stride) {
        c[i] = a[i] + b[i];
    }
}

@compute @workgroup_size(256)
fn triad(
    @builtin(global_invocation_id) gid: vec3<u32>,
    @builtin(num_workgroups) nwg: vec3<u32>
) {
    let stride = nwg.x * WG;
    for (var i = gid.x; i < params.n; i = i + stride) {
        a[i] = b[i] + params.scalar * c[i];
    }
}

@compute @workgroup_size(256)
fn nstream(
    @builtin(global_invocation_id) gid: vec3<u32>,
    @builtin(num_workgroups) nwg: vec3<u32>
) {
    let stride = nwg.x * WG;
    for (var i = gid.x; i < params.n; i = i + stride) {
        a[i] = (a[i] + b[i]) + params.scalar * c[i];
    }
}

@compute @workgroup_size(256)
fn dot_partials(
    @builtin(local_invocation_id) lid: vec3<u32>,
    @builtin(workgroup_id) wid: vec3<u32>,
    @builtin(num_workgroups) nwg: vec3<u32>
) {
    let stride = nwg.x * WG;
    var sum = 0.0;
    for (var i = wid.x * WG + lid.x; i < params.n; i = i + stride) {
        sum = sum + a[i] * b[i];
    }
    scratch[lid.x] = sum;
    workgroupBarrier();

    for (var offset = WG / 2u; offset > 0u; offset = offset / 2u) {
        if (lid.x < offset) {
            scratch[lid.x] = scratch[lid.x] + scratch[lid.x + offset];
        }
        workgroupBarrier();
    }

    if (lid.x == 0u) {
        partials[wid.x] = scratch[0];
    }
}
"#;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct GpuParams {
    n: u32,
    scalar: f32,
    init_a: f32,
    init_b: f32,
    init_c: f32,
    padding: [u32; 3],
}

// ============================================================================
// Adapter Enumeration
// ============================================================================

fn enumerate_adapters() -> Vec<Adapter> {
    Instance::new(&InstanceDescriptor::default()).enumerate_adapters(wgpu::Backends::all())
}

/// Device queries answered from the `wgpu` adapter list.
#[derive(Debug, Clone, Default)]
pub struct GpuDevices {
    adapters: Vec<AdapterInfo>,
}

impl GpuDevices {
    /// Enumerate the adapters visible to `wgpu`.
    pub fn new() -> Self {
        Self {
            adapters: enumerate_adapters().iter().map(Adapter::get_info).collect(),
        }
    }
}

impl DeviceQuery for GpuDevices {
    fn list_devices(&self) -> Vec<String> {
        self.adapters
            .iter()
            .map(|info| format!("{} ({:?})", info.name, info.backend))
            .collect()
    }

    fn device_name(&self, index: usize) -> String {
        match self.adapters.get(index) {
            Some(info) if !info.name.is_empty() => info.name.clone(),
            _ => DEVICE_NAME_UNAVAILABLE.to_string(),
        }
    }

    fn device_driver(&self, index: usize) -> String {
        let Some(info) = self.adapters.get(index) else {
            return DEVICE_DRIVER_UNAVAILABLE.to_string();
        };
        let driver = format!("{} {}", info.driver, info.driver_info);
        let driver = driver.trim();
        if driver.is_empty() {
            DEVICE_DRIVER_UNAVAILABLE.to_string()
        } else {
            driver.to_string()
        }
    }
}

// ============================================================================
// GPU Engine
// ============================================================================

/// Kernel Engine running on a `wgpu` adapter.
pub struct GpuStream<T> {
    device: Device,
    queue: Queue,
    info: AdapterInfo,

    // Pipelines
    init_pipeline: ComputePipeline,
    copy_pipeline: ComputePipeline,
    mul_pipeline: ComputePipeline,
    add_pipeline: ComputePipeline,
    triad_pipeline: ComputePipeline,
    nstream_pipeline: ComputePipeline,
    dot_pipeline: ComputePipeline,

    // Buffers
    params_buffer: Buffer,
    a_buffer: Buffer,
    b_buffer: Buffer,
    c_buffer: Buffer,
    partials_buffer: Buffer,
    staging_buffer: Buffer,
    partials_staging: Buffer,
    bind_group: BindGroup,

    params: GpuParams,
    n: usize,
    groups: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T: StreamFloat> GpuStream<T> {
    /// Open adapter `device`, compile the kernels and allocate the arrays.
    pub fn new(array_size: usize, device: usize, scalar: T) -> Result<Self, StreamError> {
        if T::PRECISION != f32::PRECISION {
            return Err(StreamError::DeviceUnavailable(format!(
                "GPU backend supports float precision only, got {}",
                T::PRECISION
            )));
        }
        if array_size == 0 {
            return Err(StreamError::InvalidArraySize(array_size));
        }

        let mut adapters = enumerate_adapters();
        if device >= adapters.len() {
            return Err(StreamError::DeviceUnavailable(format!(
                "GPU device index {device} out of range ({} adapters found)",
                adapters.len()
            )));
        }
        let adapter = adapters.swap_remove(device);
        let adapter_info = adapter.get_info();
        let limits = adapter.limits();

        // Capacity limits
        let array_bytes = array_size.saturating_mul(size_of::<f32>()) as u64;
        let binding_limit = u64::from(limits.max_storage_buffer_binding_size);
        if array_size > u32::MAX as usize
            || array_bytes > binding_limit
            || array_bytes > limits.max_buffer_size
        {
            return Err(StreamError::Allocation {
                array: "a",
                requested_bytes: array_bytes as usize,
            });
        }

        let (device, queue): (Device, Queue) = block_on(adapter.request_device(
            &DeviceDescriptor {
                label: Some("stream device"),
                required_limits: limits.clone(),
                ..Default::default()
            },
        ))
        .map_err(|e| StreamError::DeviceUnavailable(format!("{}: {e}", adapter_info.name)))?;

        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("stream kernels"),
            source: ShaderSource::Wgsl(SHADER_SOURCE.into()),
        });

        let storage_entry = |binding: u32| BindGroupLayoutEntry {
            binding,
            visibility: ShaderStages::COMPUTE,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Storage { read_only: false },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("stream layout"),
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::COMPUTE,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                storage_entry(1),
                storage_entry(2),
                storage_entry(3),
                storage_entry(4),
            ],
        });
        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("stream pipeline layout"),
            bind_group_layouts: &[&layout],
            ..Default::default()
        });
        let create_pipeline = |entry: &str| {
            device.create_compute_pipeline(&ComputePipelineDescriptor {
                label: Some(entry),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point: Some(entry),
                compilation_options: Default::default(),
                cache: None,
            })
        };

        let max_groups = limits.max_compute_workgroups_per_dimension.max(1);
        let groups = (array_size as u32).div_ceil(WORKGROUP_SIZE).clamp(1, max_groups);
        let partial_bytes = u64::from(groups) * size_of::<f32>() as u64;

        // Allocation
        device.push_error_scope(ErrorFilter::OutOfMemory);
        let create_buffer = |label: &str, size: u64, usage: BufferUsages| {
            device.create_buffer(&BufferDescriptor {
                label: Some(label),
                size,
                usage,
                mapped_at_creation: false,
            })
        };
        let array_usage = BufferUsages::STORAGE | BufferUsages::COPY_SRC;
        let params_buffer = create_buffer(
            "params",
            size_of::<GpuParams>() as u64,
            BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        );
        let a_buffer = create_buffer("a", array_bytes, array_usage);
        let b_buffer = create_buffer("b", array_bytes, array_usage);
        let c_buffer = create_buffer("c", array_bytes, array_usage);
        let partials_buffer = create_buffer("partials", partial_bytes, array_usage);
        let staging_buffer = create_buffer(
            "staging",
            array_bytes,
            BufferUsages::MAP_READ | BufferUsages::COPY_DST,
        );
        let partials_staging = create_buffer(
            "partials staging",
            partial_bytes,
            BufferUsages::MAP_READ | BufferUsages::COPY_DST,
        );
        if let Some(err) = block_on(device.pop_error_scope()) {
            debug!(%err, "device buffer allocation failed");
            return Err(StreamError::Allocation {
                array: "device arrays",
                requested_bytes: (3 * array_bytes + 2 * partial_bytes) as usize,
            });
        }

        let bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("stream bind group"),
            layout: &layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: params_buffer.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: a_buffer.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 2,
                    resource: b_buffer.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 3,
                    resource: c_buffer.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 4,
                    resource: partials_buffer.as_entire_binding(),
                },
            ],
        });

        let params = GpuParams {
            n: array_size as u32,
            scalar: scalar.widen() as f32,
            init_a: 0.0,
            init_b: 0.0,
            init_c: 0.0,
            padding: [0; 3],
        };
        queue.write_buffer(&params_buffer, 0, bytemuck::cast_slice(&[params]));

        info!(adapter = %adapter_info.name, backend = ?adapter_info.backend, groups, "GPU engine ready");

        Ok(Self {
            init_pipeline: create_pipeline("init_arrays"),
            copy_pipeline: create_pipeline("copy"),
            mul_pipeline: create_pipeline("mul"),
            add_pipeline: create_pipeline("add"),
            triad_pipeline: create_pipeline("triad"),
            nstream_pipeline: create_pipeline("nstream"),
            dot_pipeline: create_pipeline("dot_partials"),
            device,
            queue,
            info: adapter_info,
            params_buffer,
            a_buffer,
            b_buffer,
            c_buffer,
            partials_buffer,
            staging_buffer,
            partials_staging,
            bind_group,
            params,
            n: array_size,
            groups,
            _marker: PhantomData,
        })
    }

    /// Construct from a factory request.
    pub fn from_request(request: &EngineRequest<T>) -> Result<Self, StreamError> {
        Self::new(request.array_size, request.device, request.scalar)
    }

    /// Information about the adapter in use.
    pub fn adapter_info(&self) -> &AdapterInfo {
        &self.info
    }

    fn wait(&self) -> Result<(), StreamError> {
        self.device
            .poll(PollType::Wait {
                submission_index: None,
                timeout: None,
            })
            .map(|_| ())
            .map_err(|e| StreamError::DeviceFailure(format!("queue wait: {e}")))
    }

    fn dispatch(&self, label: &str, pipeline: &ComputePipeline) -> Result<(), StreamError> {
        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor { label: Some(label) });
        {
            let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor::default());
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.dispatch_workgroups(self.groups, 1, 1);
        }
        self.queue.submit(Some(encoder.finish()));
        self.wait()
    }

    fn download(
        &self,
        source: &Buffer,
        staging: &Buffer,
        len: usize,
    ) -> Result<Vec<f32>, StreamError> {
        let size = (len * size_of::<f32>()) as u64;
        let mut encoder = self.device.create_command_encoder(&Default::default());
        encoder.copy_buffer_to_buffer(source, 0, staging, 0, size);
        self.queue.submit(Some(encoder.finish()));

        let slice = staging.slice(..size);
        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        slice.map_async(MapMode::Read, move |v| {
            let _ = tx.send(v);
        });
        self.wait()?;

        match block_on(rx.receive()) {
            Some(Ok(())) => {
                let data = slice.get_mapped_range();
                let values = bytemuck::cast_slice(&data).to_vec();
                drop(data);
                staging.unmap();
                Ok(values)
            }
            Some(Err(e)) => Err(StreamError::DeviceFailure(format!("buffer map: {e}"))),
            None => Err(StreamError::DeviceFailure(
                "buffer map callback dropped".to_string(),
            )),
        }
    }
}

impl<T: StreamFloat> StreamEngine<T> for GpuStream<T> {
    fn backend(&self) -> Backend {
        Backend::GPU
    }

    fn implementation(&self) -> String {
        format!("wgpu {:?} on {}", self.info.backend, self.info.name)
    }

    fn array_size(&self) -> usize {
        self.n
    }

    fn init_arrays(&mut self, init_a: T, init_b: T, init_c: T) -> Result<(), StreamError> {
        self.params.init_a = init_a.widen() as f32;
        self.params.init_b = init_b.widen() as f32;
        self.params.init_c = init_c.widen() as f32;
        self.queue
            .write_buffer(&self.params_buffer, 0, bytemuck::cast_slice(&[self.params]));
        self.dispatch("init_arrays", &self.init_pipeline)
    }

    fn read_arrays(&self, a: &mut [T], b: &mut [T], c: &mut [T]) -> Result<(), StreamError> {
        check_destination("a", self.n, a.len())?;
        check_destination("b", self.n, b.len())?;
        check_destination("c", self.n, c.len())?;

        for (source, dest) in [(&self.a_buffer, a), (&self.b_buffer, b), (&self.c_buffer, c)] {
            let values = self.download(source, &self.staging_buffer, self.n)?;
            for (d, v) in dest.iter_mut().zip(values) {
                *d = T::narrow(f64::from(v));
            }
        }
        Ok(())
    }

    fn copy(&mut self) -> Result<(), StreamError> {
        self.dispatch("copy", &self.copy_pipeline)
    }

    fn mul(&mut self) -> Result<(), StreamError> {
        self.dispatch("mul", &self.mul_pipeline)
    }

    fn add(&mut self) -> Result<(), StreamError> {
        self.dispatch("add", &self.add_pipeline)
    }

    fn triad(&mut self) -> Result<(), StreamError> {
        self.dispatch("triad", &self.triad_pipeline)
    }

    fn nstream(&mut self) -> Result<(), StreamError> {
        self.dispatch("nstream", &self.nstream_pipeline)
    }

    fn dot(&mut self) -> Result<T, StreamError> {
        self.dispatch("dot", &self.dot_pipeline)?;
        let partials = self.download(
            &self.partials_buffer,
            &self.partials_staging,
            self.groups as usize,
        )?;
        let sum: f64 = partials.into_iter().map(f64::from).sum();
        Ok(T::narrow(sum))
    }
}
