use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        model::Vertex,
        scene_graph::{AxesHelper, LineVertex},
        texture::Texture,
    },
    pipelines::basic::{PipelineOptions, mk_render_pipeline},
};

impl Vertex for LineVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Vertex buffer of an [`AxesHelper`], drawn as a line list.
#[derive(Debug)]
pub struct AxesLines {
    pub vertex_buffer: wgpu::Buffer,
    pub vertex_count: u32,
}

impl AxesLines {
    pub fn new(device: &wgpu::Device, axes: &AxesHelper) -> Self {
        let vertices = axes.line_vertices();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Axes Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            vertex_buffer,
            vertex_count: vertices.len() as u32,
        }
    }
}

pub fn mk_axes_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    sample_count: u32,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Axes Pipeline Layout"),
        bind_group_layouts: &[camera_bind_group_layout],
        push_constant_ranges: &[],
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Axes Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("axes.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &layout,
        Some(config.format),
        Some(wgpu::BlendState::REPLACE),
        Some(Texture::DEPTH_FORMAT),
        &[LineVertex::desc()],
        shader,
        PipelineOptions {
            topology: wgpu::PrimitiveTopology::LineList,
            cull_mode: None,
            ..PipelineOptions::new("Axes Pipeline", sample_count)
        },
    )
}
