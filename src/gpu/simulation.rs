//! GPU pendulum grid using wgpu compute shaders
//!
//! Two storage buffers hold the grid. Two bind groups are built up front,
//! one reading buffer 0 and writing buffer 1 and one the other way round,
//! so a step is a single dispatch followed by flipping the current index.

use std::sync::Arc;

use wgpu::util::DeviceExt;

use super::shaders::step_shader;
use super::types::{GpuCell, StepUniforms, WORKGROUP_SIZE};
use crate::error::{SimError, SimResult};
use crate::initial::InitialAngles;
use crate::params::SimulationParams;
use crate::simulator::{GridSimulator, checked_cell_count};
use crate::state::CellState;

/// Most workgroups a single dispatch dimension may use
const MAX_WORKGROUPS: u32 = 65_535;

/// Pendulum grid stepped by a compute shader
pub struct GpuSimulation {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,

    pipeline: wgpu::ComputePipeline,

    // Ping-pong state buffers
    cell_buffers: [wgpu::Buffer; 2],
    // Kept alive to maintain GPU resource (referenced by bind groups)
    _uniform_buffer: wgpu::Buffer,

    // bind_groups[i] reads cell_buffers[i] and writes the other one
    bind_groups: [wgpu::BindGroup; 2],
    // Kept alive to maintain GPU resource
    _bind_group_layout: wgpu::BindGroupLayout,

    // Staging buffer for reading back results
    staging_buffer: wgpu::Buffer,

    side: usize,
    cell_count: u32,
    current: usize,
    steps: u64,
}

impl GpuSimulation {
    /// Create a GPU simulation on a freshly requested device
    pub fn new<F>(side: usize, params: SimulationParams, initial: F) -> SimResult<Self>
    where
        F: Fn(usize, usize) -> InitialAngles,
    {
        let (device, queue) = pollster::block_on(Self::create_device())?;
        Self::with_device(Arc::new(device), Arc::new(queue), side, params, initial)
    }

    /// Create a simulation using an existing device and queue
    pub fn with_device<F>(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        side: usize,
        params: SimulationParams,
        initial: F,
    ) -> SimResult<Self>
    where
        F: Fn(usize, usize) -> InitialAngles,
    {
        params.validate()?;
        let cell_count = checked_cell_count(side)?;
        let cell_count = u32::try_from(cell_count).map_err(|_| SimError::GridTooLarge(side))?;
        if cell_count.div_ceil(WORKGROUP_SIZE) > MAX_WORKGROUPS {
            return Err(SimError::GridTooLarge(side));
        }

        let buffer_size = cell_count as u64 * std::mem::size_of::<GpuCell>() as u64;
        if buffer_size > device.limits().max_storage_buffer_binding_size as u64 {
            return Err(SimError::GridTooLarge(side));
        }

        let mut cells = Vec::with_capacity(cell_count as usize);
        for row in 0..side {
            for col in 0..side {
                let angles = initial(row, col);
                cells.push(GpuCell::from(&CellState::at_rest(angles.angle1, angles.angle2)));
            }
        }

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Pendulum Step Shader"),
            source: wgpu::ShaderSource::Wgsl(step_shader().into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Pendulum Step Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Pendulum Step Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Pendulum Step Pipeline"),
            layout: Some(&pipeline_layout),
            module: &module,
            entry_point: Some("step_cells"),
            compilation_options: Default::default(),
            cache: None,
        });

        let usage =
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::COPY_SRC;

        let front = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cell Buffer A"),
            contents: bytemuck::cast_slice(&cells),
            usage,
        });
        let back = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cell Buffer B"),
            size: buffer_size,
            usage,
            mapped_at_creation: false,
        });

        let uniforms = StepUniforms::new(&params, cell_count);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Step Uniform Buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let make_bind_group = |label: &str, src: &wgpu::Buffer, dst: &wgpu::Buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: src.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: dst.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: uniform_buffer.as_entire_binding(),
                    },
                ],
            })
        };
        let bind_groups = [
            make_bind_group("Step Bind Group A->B", &front, &back),
            make_bind_group("Step Bind Group B->A", &back, &front),
        ];

        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Staging Buffer"),
            size: buffer_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        tracing::debug!(side, cell_count, "created GPU pendulum grid");

        Ok(Self {
            device,
            queue,
            pipeline,
            cell_buffers: [front, back],
            _uniform_buffer: uniform_buffer,
            bind_groups,
            _bind_group_layout: bind_group_layout,
            staging_buffer,
            side,
            cell_count,
            current: 0,
            steps: 0,
        })
    }

    async fn create_device() -> SimResult<(wgpu::Device, wgpu::Queue)> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| SimError::GpuUnavailable("no suitable GPU adapter".to_string()))?;

        tracing::info!(adapter = ?adapter.get_info().name, "using GPU adapter");

        adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Pendulum Grid Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None, // trace path
            )
            .await
            .map_err(|e| SimError::GpuUnavailable(e.to_string()))
    }

    /// Dispatch one step and swap buffer roles
    pub fn step(&mut self) {
        let workgroups = self.cell_count.div_ceil(WORKGROUP_SIZE);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Pendulum Step Encoder"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Pendulum Step Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_groups[self.current], &[]);
            pass.dispatch_workgroups(workgroups.max(1), 1, 1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));

        self.current ^= 1;
        self.steps += 1;
    }

    /// Read back the current buffer
    pub fn read_cells(&self) -> SimResult<Vec<GpuCell>> {
        let size = self.cell_count as u64 * std::mem::size_of::<GpuCell>() as u64;

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Read Cells Encoder"),
            });
        encoder.copy_buffer_to_buffer(
            &self.cell_buffers[self.current],
            0,
            &self.staging_buffer,
            0,
            size,
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = self.staging_buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|e| SimError::Gpu(e.to_string()))?
            .map_err(|e| SimError::Gpu(e.to_string()))?;

        let data = buffer_slice.get_mapped_range();
        let cells: Vec<GpuCell> = bytemuck::cast_slice(&data).to_vec();
        drop(data);
        self.staging_buffer.unmap();

        Ok(cells)
    }

    /// Index (0 or 1) of the buffer currently marked current
    pub fn current_buffer(&self) -> usize {
        self.current
    }

    pub fn cell_count(&self) -> u32 {
        self.cell_count
    }
}

impl GridSimulator for GpuSimulation {
    fn side(&self) -> usize {
        self.side
    }

    fn step(&mut self) {
        GpuSimulation::step(self)
    }

    fn steps_taken(&self) -> u64 {
        self.steps
    }

    fn snapshot(&self) -> SimResult<Vec<CellState>> {
        Ok(self.read_cells()?.into_iter().map(CellState::from).collect())
    }
}
