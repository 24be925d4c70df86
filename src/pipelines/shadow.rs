use crate::{
    data_structures::{
        model::{ModelVertex, Vertex},
        texture::Texture,
        transform::TransformRaw,
    },
    pipelines::basic::{PipelineOptions, mk_render_pipeline},
};

/// Depth only pass from the directional light into the shadow map.
///
/// Front faces are culled so the stored depth is the far side of each
/// caster, which keeps lit surfaces from shadowing themselves.
pub fn mk_shadow_pipeline(
    device: &wgpu::Device,
    shadow_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Shadow Pipeline Layout"),
        bind_group_layouts: &[shadow_bind_group_layout],
        push_constant_ranges: &[],
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Shadow Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shadow.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &layout,
        None,
        None,
        Some(Texture::DEPTH_FORMAT),
        &[ModelVertex::desc(), TransformRaw::desc()],
        shader,
        PipelineOptions {
            cull_mode: Some(wgpu::Face::Front),
            depth_bias: wgpu::DepthBiasState {
                constant: 2,
                slope_scale: 2.0,
                clamp: 0.0,
            },
            ..PipelineOptions::new("Shadow Pipeline", 1)
        },
    )
}
