//! Render pipelines.
//!
//! - `basic` draws unlit textured meshes and holds the shared pipeline builder
//! - `standard` draws diffuse lit meshes that receive shadows
//! - `shadow` renders shadow casters into the light's depth map
//! - `axes` draws the axes helper as coloured lines
//! - `light` holds the light uniform and shadow map bindings

pub mod axes;
pub mod basic;
pub mod light;
pub mod shadow;
pub mod standard;

/// Every pipeline the scene renderer switches between.
#[derive(Debug)]
pub struct Pipelines {
    pub basic: wgpu::RenderPipeline,
    pub standard: wgpu::RenderPipeline,
    pub shadow: wgpu::RenderPipeline,
    pub axes: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        sample_count: u32,
        material_bind_group_layout: &wgpu::BindGroupLayout,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        light: &light::LightResources,
    ) -> Self {
        Self {
            basic: basic::mk_basic_pipeline(
                device,
                config,
                sample_count,
                material_bind_group_layout,
                camera_bind_group_layout,
            ),
            standard: standard::mk_standard_pipeline(
                device,
                config,
                sample_count,
                material_bind_group_layout,
                camera_bind_group_layout,
                &light.bind_group_layout,
            ),
            shadow: shadow::mk_shadow_pipeline(device, &light.shadow_bind_group_layout),
            axes: axes::mk_axes_pipeline(device, config, sample_count, camera_bind_group_layout),
        }
    }
}
