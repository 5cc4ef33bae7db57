//! wgpu all-pairs backend.

use crate::{ComputeBackend, ComputeError, ComputeResult, CpuBackend};
use bytemuck::{Pod, Zeroable};
use std::sync::Mutex;
use wgpu::util::DeviceExt;

/// Bodies per workgroup tile; below this count the non-tiled kernel is used.
const TILE_SIZE: usize = 256;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct Params {
    n: u32,
    _pad: u32,
    g: f32,
    softening: f32,
}

/// GPU backend built on a wgpu compute device.
///
/// Kernel invocations take the internal mutex, so concurrent ensemble
/// trials serialise at the device. Positions are staged through f32; the
/// backend contract only promises agreement with the CPU kernel to 1e-3.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    tiled: wgpu::ComputePipeline,
    simple: wgpu::ComputePipeline,
    layout: wgpu::BindGroupLayout,
    dispatch: Mutex<()>,
    label: String,
}

impl WgpuBackend {
    pub fn new() -> ComputeResult<Self> {
        let instance = wgpu::Instance::default();
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            compatible_surface: None,
        }))
        .ok_or(ComputeError::NoAdapter)?;

        let info = adapter.get_info();
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("ds-compute"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
            },
            None,
        ))
        .map_err(|e| ComputeError::Device(e.to_string()))?;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("nbody"),
            source: wgpu::ShaderSource::Wgsl(include_str!("nbody.wgsl").into()),
        });

        let entries: Vec<wgpu::BindGroupLayoutEntry> = (0..5)
            .map(|binding| wgpu::BindGroupLayoutEntry {
                binding,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: if binding == 0 {
                        wgpu::BufferBindingType::Uniform
                    } else {
                        wgpu::BufferBindingType::Storage {
                            read_only: binding < 3,
                        }
                    },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            })
            .collect();

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("nbody bind group layout"),
            entries: &entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("nbody pipeline layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let make_pipeline = |entry_point: &str| {
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(entry_point),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point,
                compilation_options: Default::default(),
                cache: None,
            })
        };

        let tiled = make_pipeline("main_tiled");
        let simple = make_pipeline("main_simple");

        tracing::info!(adapter = %info.name, "wgpu backend initialised");

        Ok(Self {
            device,
            queue,
            tiled,
            simple,
            layout,
            dispatch: Mutex::new(()),
            label: format!("gpu ({})", info.name),
        })
    }

    fn run_kernel(
        &self,
        positions: &[f64],
        masses: &[f64],
        g: f64,
        softening: f64,
    ) -> ComputeResult<(Vec<f64>, Vec<f64>)> {
        let n = masses.len();
        let _guard = self.dispatch.lock().unwrap_or_else(|e| e.into_inner());

        let pos_f32: Vec<f32> = positions.iter().map(|&v| v as f32).collect();
        let mass_f32: Vec<f32> = masses.iter().map(|&v| v as f32).collect();
        let params = Params {
            n: n as u32,
            _pad: 0,
            g: g as f32,
            softening: softening as f32,
        };

        let params_buf = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("params"),
                contents: bytemuck::bytes_of(&params),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let pos_buf = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("positions"),
                contents: bytemuck::cast_slice(&pos_f32),
                usage: wgpu::BufferUsages::STORAGE,
            });
        let mass_buf = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("masses"),
                contents: bytemuck::cast_slice(&mass_f32),
                usage: wgpu::BufferUsages::STORAGE,
            });

        let out_bytes = (n * std::mem::size_of::<f32>()) as u64;
        let make_out = |label| {
            self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: out_bytes,
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
                mapped_at_creation: false,
            })
        };
        let ax_buf = make_out("accel_x");
        let ay_buf = make_out("accel_y");

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("nbody bind group"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: pos_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: mass_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: ax_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: ay_buf.as_entire_binding(),
                },
            ],
        });

        let staging_ax = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("staging accel_x"),
            size: out_bytes,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let staging_ay = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("staging accel_y"),
            size: out_bytes,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("nbody pass"),
                timestamp_writes: None,
            });
            if n < TILE_SIZE {
                pass.set_pipeline(&self.simple);
                pass.set_bind_group(0, &bind_group, &[]);
                pass.dispatch_workgroups(n.div_ceil(64) as u32, 1, 1);
            } else {
                pass.set_pipeline(&self.tiled);
                pass.set_bind_group(0, &bind_group, &[]);
                pass.dispatch_workgroups(n.div_ceil(TILE_SIZE) as u32, 1, 1);
            }
        }
        encoder.copy_buffer_to_buffer(&ax_buf, 0, &staging_ax, 0, out_bytes);
        encoder.copy_buffer_to_buffer(&ay_buf, 0, &staging_ay, 0, out_bytes);
        self.queue.submit(Some(encoder.finish()));

        let read_back = |buffer: &wgpu::Buffer| -> ComputeResult<Vec<f64>> {
            let slice = buffer.slice(..);
            let (tx, rx) = std::sync::mpsc::channel();
            slice.map_async(wgpu::MapMode::Read, move |result| {
                let _ = tx.send(result);
            });
            self.device.poll(wgpu::Maintain::Wait);
            match rx.recv() {
                Ok(Ok(())) => {}
                _ => return Err(ComputeError::Readback),
            }
            let data = slice.get_mapped_range();
            let out: Vec<f64> = bytemuck::cast_slice::<u8, f32>(&data)
                .iter()
                .map(|&v| f64::from(v))
                .collect();
            drop(data);
            buffer.unmap();
            Ok(out)
        };

        let ax = read_back(&staging_ax)?;
        let ay = read_back(&staging_ay)?;
        Ok((ax, ay))
    }
}

impl ComputeBackend for WgpuBackend {
    fn name(&self) -> &str {
        &self.label
    }

    fn available(&self) -> bool {
        true
    }

    fn nbody_forces(
        &self,
        positions: &[f64],
        masses: &[f64],
        g: f64,
        softening: f64,
    ) -> (Vec<f64>, Vec<f64>) {
        match self.run_kernel(positions, masses, g, softening) {
            Ok(out) => out,
            Err(e) => {
                tracing::warn!("gpu kernel failed, falling back to cpu: {e}");
                CpuBackend::new().nbody_forces(positions, masses, g, softening)
            }
        }
    }

    fn matvec(&self, mat: &[Vec<f64>], vec: &[f64]) -> Vec<f64> {
        // Gain matrices are tiny; not worth a round trip to the device.
        CpuBackend::new().matvec(mat, vec)
    }

    fn cleanup(&self) {
        self.device.poll(wgpu::Maintain::Wait);
    }
}
