use std::borrow::Cow;

use bytemuck::{Pod, Zeroable};
use pathtracing::{
    RenderingBackend,
    renderer::Dispatch,
    sampling::SeedBuffer,
    scene::{CameraUniforms, GpuPrimitive, Scene},
    settings::RenderSettings,
};
use wgpu::util::DeviceExt;

pub(crate) const WORKGROUP_SIZE: u32 = 8;

#[derive(Pod, Zeroable, Clone, Copy, Debug)]
#[repr(C)]
struct DispatchPushConstants {
    iteration: u32,
    skybox_active: u32,
    chunk: [u32; 2],
    extent: [u32; 2],
    image_size: [u32; 2],
}

/// Device side of the path tracer: the compute pipeline and every buffer it touches.
pub(crate) struct Kernel {
    pipeline: wgpu::ComputePipeline,

    accumulation_buffer: wgpu::Buffer,
    // kept alive for the bind group, never read back
    _seed_buffer: wgpu::Buffer,
    _scene_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,

    bind_group: wgpu::BindGroup,

    image_size: [u32; 2],
    skybox_active: bool,
}

impl Kernel {
    pub(crate) fn init(
        device: &wgpu::Device,
        settings: &RenderSettings,
        scene: &Scene,
        seeds: &SeedBuffer,
    ) -> Kernel {
        let shader_module_descriptor = wgpu::ShaderModuleDescriptor {
            label: Some("Path Tracing Compute Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shaders/pathtracing.wgsl"))),
        };
        let shader = device.create_shader_module(shader_module_descriptor);

        let accumulation_buffer = Self::make_accumulation_buffer(device, settings.width, settings.height);

        let seed_buffer_desc = wgpu::util::BufferInitDescriptor {
            label: Some("Seed Buffer"),
            contents: seeds.as_bytes(),
            usage: wgpu::BufferUsages::STORAGE,
        };
        let seed_buffer = device.create_buffer_init(&seed_buffer_desc);

        let records: Vec<GpuPrimitive> = scene.to_gpu();
        let scene_buffer_desc = wgpu::util::BufferInitDescriptor {
            label: Some("Scene Buffer"),
            contents: bytemuck::cast_slice(&records),
            usage: wgpu::BufferUsages::STORAGE,
        };
        let scene_buffer = device.create_buffer_init(&scene_buffer_desc);

        let camera_buffer_desc = wgpu::BufferDescriptor {
            label: Some("Camera Uniform Buffer"),
            size: size_of::<CameraUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        };
        let camera_buffer = device.create_buffer(&camera_buffer_desc);

        let storage = |binding: u32, read_only: bool| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout_desc = wgpu::BindGroupLayoutDescriptor {
            label: Some("Path Tracing Bind Group Layout"),
            entries: &[
                storage(0, false),
                storage(1, false),
                storage(2, true),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        };
        let bind_group_layout = device.create_bind_group_layout(&bind_group_layout_desc);

        let pipeline_layout_descriptor = wgpu::PipelineLayoutDescriptor {
            label: Some("Path Tracing Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[wgpu::PushConstantRange {
                stages: wgpu::ShaderStages::COMPUTE,
                range: 0..size_of::<DispatchPushConstants>() as u32,
            }],
        };
        let pipeline_layout = device.create_pipeline_layout(&pipeline_layout_descriptor);

        let compute_pipeline_descriptor = wgpu::ComputePipelineDescriptor {
            label: Some("Path Tracing Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        };
        let pipeline = device.create_compute_pipeline(&compute_pipeline_descriptor);

        let bind_group_desc = wgpu::BindGroupDescriptor {
            label: Some("Path Tracing Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: accumulation_buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: seed_buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: scene_buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 3, resource: camera_buffer.as_entire_binding() },
            ],
        };
        let bind_group = device.create_bind_group(&bind_group_desc);

        tracing::debug!(
            primitives = records.len(),
            seeds = seeds.len(),
            "path tracing kernel initialized"
        );

        Kernel {
            pipeline,
            accumulation_buffer,
            _seed_buffer: seed_buffer,
            _scene_buffer: scene_buffer,
            camera_buffer,
            bind_group,
            image_size: [settings.width, settings.height],
            skybox_active: settings.skybox_active,
        }
    }

    // one rgba32 float texel per pixel, zeroed by wgpu on creation
    fn make_accumulation_buffer(device: &wgpu::Device, width: u32, height: u32) -> wgpu::Buffer {
        let accumulation_buffer_desc = wgpu::BufferDescriptor {
            label: Some("Accumulation Buffer"),
            size: width as u64 * height as u64 * size_of::<[f32; 4]>() as u64,
            usage: wgpu::BufferUsages::STORAGE,
            mapped_at_creation: false,
        };

        device.create_buffer(&accumulation_buffer_desc)
    }

    pub(crate) fn accumulation_buffer(&self) -> &wgpu::Buffer {
        &self.accumulation_buffer
    }

    pub(crate) fn image_size(&self) -> [u32; 2] {
        self.image_size
    }

    /// Borrows the kernel for one command encoder's worth of work
    pub(crate) fn recorder<'a>(
        &'a self,
        queue: &'a wgpu::Queue,
        encoder: &'a mut wgpu::CommandEncoder,
    ) -> KernelRecorder<'a> {
        KernelRecorder { kernel: self, queue, encoder }
    }

    fn record_dispatch(&self, encoder: &mut wgpu::CommandEncoder, dispatch: &Dispatch) {
        let cpass_descriptor = wgpu::ComputePassDescriptor {
            label: Some("Path Tracing Compute Pass"),
            timestamp_writes: None,
        };
        let mut cpass = encoder.begin_compute_pass(&cpass_descriptor);

        let push_constants = DispatchPushConstants {
            iteration: dispatch.iteration,
            skybox_active: self.skybox_active as u32,
            chunk: dispatch.rect.origin(),
            extent: dispatch.rect.extent(),
            image_size: self.image_size,
        };

        cpass.set_pipeline(&self.pipeline);
        cpass.set_push_constants(0, bytemuck::bytes_of(&push_constants));
        cpass.set_bind_group(0, &self.bind_group, &[]);

        let [x, y, z] = dispatch.workgroups([WORKGROUP_SIZE, WORKGROUP_SIZE]);
        cpass.dispatch_workgroups(x, y, z);
    }
}

/// Records kernel work into a frame's command encoder. The display pass recorded after it
/// in the same encoder sees every accumulation write.
pub(crate) struct KernelRecorder<'a> {
    kernel: &'a Kernel,
    queue: &'a wgpu::Queue,
    encoder: &'a mut wgpu::CommandEncoder,
}

impl RenderingBackend for KernelRecorder<'_> {
    fn bind_camera(&mut self, camera: &CameraUniforms) {
        self.queue.write_buffer(&self.kernel.camera_buffer, 0, bytemuck::bytes_of(camera));
    }

    fn dispatch(&mut self, dispatch: &Dispatch) {
        self.kernel.record_dispatch(&mut *self.encoder, dispatch);
    }
}
