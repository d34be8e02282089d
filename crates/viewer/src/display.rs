use std::borrow::Cow;

use bytemuck::{Pod, Zeroable};

use crate::kernel::Kernel;

#[derive(Pod, Zeroable, Clone, Copy, Debug)]
#[repr(C)]
struct DisplayPushConstants {
    image_size: [u32; 2],
    surface_size: [u32; 2],
}

/// Draws the accumulation buffer onto the swapchain image, scaled to the surface.
pub(crate) struct Display {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    image_size: [u32; 2],
}

impl Display {
    pub(crate) fn init(device: &wgpu::Device, target_format: wgpu::TextureFormat, kernel: &Kernel) -> Display {
        let shader_module_descriptor = wgpu::ShaderModuleDescriptor {
            label: Some("Display Shaders"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shaders/display.wgsl"))),
        };
        let shader = device.create_shader_module(shader_module_descriptor);

        let bind_group_layout_desc = wgpu::BindGroupLayoutDescriptor {
            label: Some("Display Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        };
        let bind_group_layout = device.create_bind_group_layout(&bind_group_layout_desc);

        let pipeline_layout_descriptor = wgpu::PipelineLayoutDescriptor {
            label: Some("Display Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[wgpu::PushConstantRange {
                stages: wgpu::ShaderStages::FRAGMENT,
                range: 0..size_of::<DisplayPushConstants>() as u32,
            }],
        };
        let pipeline_layout = device.create_pipeline_layout(&pipeline_layout_descriptor);

        let pipeline_compilation_options = wgpu::PipelineCompilationOptions {
            zero_initialize_workgroup_memory: false,
            ..Default::default()
        };

        let targets = &[Some(target_format.into())];
        let render_pipeline_descriptor = wgpu::RenderPipelineDescriptor {
            label: Some("Display Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vert_main"),
                compilation_options: pipeline_compilation_options.clone(),
                buffers: &[],
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("frag_main"),
                compilation_options: pipeline_compilation_options,
                targets,
            }),
            multiview: None,
            cache: None,
        };
        let pipeline = device.create_render_pipeline(&render_pipeline_descriptor);

        let bind_group_desc = wgpu::BindGroupDescriptor {
            label: Some("Display Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: kernel.accumulation_buffer().as_entire_binding(),
            }],
        };
        let bind_group = device.create_bind_group(&bind_group_desc);

        Display { pipeline, bind_group, image_size: kernel.image_size() }
    }

    pub(crate) fn render(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView, surface_size: [u32; 2]) {
        let color_attachments = [Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations { load: wgpu::LoadOp::Clear(wgpu::Color::BLACK), store: wgpu::StoreOp::Store },
        })];
        let rpass_descriptor = wgpu::RenderPassDescriptor {
            label: Some("Display Render Pass"),
            color_attachments: &color_attachments,
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        };
        let mut rpass = encoder.begin_render_pass(&rpass_descriptor);

        let push_constants = DisplayPushConstants { image_size: self.image_size, surface_size };

        rpass.set_pipeline(&self.pipeline);
        rpass.set_push_constants(wgpu::ShaderStages::FRAGMENT, 0, bytemuck::bytes_of(&push_constants));
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.draw(0..3, 0..1);
    }
}
