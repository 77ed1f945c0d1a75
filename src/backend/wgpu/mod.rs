//! WebGPU backend.
//!
//! Runs the tiled kernel as a compute shader: one workgroup per output tile,
//! one thread per output element, workgroup storage as the tile staging
//! buffer. Input and output live in pitched storage buffers; the host
//! uploads before the single dispatch and drains the interior with a
//! blocking mapped readback.

mod adapter;
mod shader;

pub use adapter::WgpuAdapter;

use std::time::Instant;

use tracing::debug;

use crate::error::{Result, SmoothError};
use crate::field::Field;
use crate::geometry::GridGeometry;
use crate::memory::{pitch_elems, PitchedBuffer};
use crate::timing::SmoothTimings;

use super::SmoothBackend;

/// GPU backend over wgpu (Vulkan, Metal, DX12, GL).
pub struct WgpuBackend {
    adapter: WgpuAdapter,
}

impl WgpuBackend {
    /// Create a backend on the platform's preferred adapter.
    ///
    /// Fails with [`SmoothError::BackendUnavailable`] when no adapter exists.
    pub async fn new() -> Result<Self> {
        let adapter = WgpuAdapter::new().await?;
        Ok(Self { adapter })
    }

    /// Name of the underlying adapter.
    pub fn adapter_name(&self) -> &str {
        self.adapter.name()
    }

    /// Check `geometry` against the device limits.
    ///
    /// The workgroup shape and its storage footprint are geometry-derived,
    /// so a geometry that is valid for the CPU backend can still exceed what
    /// this adapter supports. That is a configuration error, detected before
    /// any buffer is allocated.
    fn check_limits(&self, geometry: &GridGeometry, pitch: u32) -> Result<()> {
        let limits = self.adapter.limits();
        let tile = geometry.tile_width();

        if tile > limits.max_compute_workgroup_size_x || tile > limits.max_compute_workgroup_size_y
        {
            return Err(SmoothError::InvalidGeometry(format!(
                "tile width {tile} exceeds max workgroup dimension {}",
                limits.max_compute_workgroup_size_x
            )));
        }
        if tile * tile > limits.max_compute_invocations_per_workgroup {
            return Err(SmoothError::InvalidGeometry(format!(
                "tile of {} threads exceeds max workgroup invocations {}",
                tile * tile,
                limits.max_compute_invocations_per_workgroup
            )));
        }
        let staged_bytes = geometry.staged_slots() * std::mem::size_of::<f32>() as u32;
        if staged_bytes > limits.max_compute_workgroup_storage_size {
            return Err(SmoothError::InvalidGeometry(format!(
                "staging buffer of {staged_bytes} bytes exceeds workgroup storage limit {}",
                limits.max_compute_workgroup_storage_size
            )));
        }
        if geometry.tiles_per_axis() > limits.max_compute_workgroups_per_dimension {
            return Err(SmoothError::InvalidGeometry(format!(
                "{} tiles per axis exceeds max workgroups per dimension {}",
                geometry.tiles_per_axis(),
                limits.max_compute_workgroups_per_dimension
            )));
        }
        let buffer_bytes =
            pitch as u64 * geometry.grid_width() as u64 * std::mem::size_of::<f32>() as u64;
        if buffer_bytes > limits.max_storage_buffer_binding_size as u64 {
            return Err(SmoothError::AllocationFailed(format!(
                "pitched field of {buffer_bytes} bytes exceeds storage binding limit {}",
                limits.max_storage_buffer_binding_size
            )));
        }
        Ok(())
    }
}

impl SmoothBackend for WgpuBackend {
    fn name(&self) -> &str {
        "wgpu"
    }

    fn smooth(
        &self,
        input: &Field,
        output: &mut Field,
        geometry: &GridGeometry,
    ) -> Result<SmoothTimings> {
        input.check_shape(geometry)?;
        output.check_shape(geometry)?;

        let grid = geometry.grid_width();
        let pitch = pitch_elems(grid) as u32;
        self.check_limits(geometry, pitch)?;

        let device = self.adapter.device();
        let queue = self.adapter.queue();
        let buffer_bytes = pitch as u64 * grid as u64 * std::mem::size_of::<f32>() as u64;

        // Allocation plus transfer-in: pitched device buffers, then the
        // host field translated to the pitched layout and uploaded.
        let transfer_start = Instant::now();
        let input_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Field Input"),
            size: buffer_bytes,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let output_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Field Output"),
            size: buffer_bytes,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let mut staged_in = PitchedBuffer::new(grid);
        staged_in.copy_from_field(input);
        queue.write_buffer(&input_buffer, 0, bytemuck::cast_slice(staged_in.as_slice()));
        let transfer = transfer_start.elapsed();

        // Kernel execution through blocking readback.
        let compute_start = Instant::now();
        let source = shader::smoothing_shader(geometry, pitch);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Smoothing Shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Smoothing Bind Group Layout"),
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
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Smoothing Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Smoothing Pipeline"),
            layout: Some(&pipeline_layout),
            module: &module,
            entry_point: shader::ENTRY_POINT,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Smoothing Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: input_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: output_buffer.as_entire_binding(),
                },
            ],
        });

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Readback Staging"),
            size: buffer_bytes,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Smoothing Encoder"),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Smoothing Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            let tiles = geometry.tiles_per_axis();
            pass.dispatch_workgroups(tiles, tiles, 1);
        }
        encoder.copy_buffer_to_buffer(&output_buffer, 0, &staging, 0, buffer_bytes);
        queue.submit(std::iter::once(encoder.finish()));

        // Blocking drain: mapping the staging buffer forces kernel
        // completion before the copy back to the host field.
        let buffer_slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|e| SmoothError::TransferFailed(format!("Channel error: {}", e)))?
            .map_err(|e| SmoothError::TransferFailed(format!("Map failed: {:?}", e)))?;

        let mut staged_out = PitchedBuffer::new(grid);
        {
            let data = buffer_slice.get_mapped_range();
            staged_out
                .as_mut_slice()
                .copy_from_slice(bytemuck::cast_slice(&data));
        }
        staging.unmap();

        let koffset = geometry.kernel_offset();
        let interior = geometry.interior_width();
        staged_out.copy_region_to_field(koffset, koffset, interior, interior, output);
        let compute = compute_start.elapsed();

        let timings = SmoothTimings { transfer, compute };
        debug!(
            backend = self.name(),
            adapter = self.adapter.name(),
            grid,
            kernel = geometry.kernel_width(),
            tile = geometry.tile_width(),
            %timings,
            "smoothing complete"
        );
        Ok(timings)
    }
}
