//! Light uniform shared by the lit and shadow passes.

use cgmath::{Matrix4, SquareMatrix};
use wgpu::util::DeviceExt;

use crate::data_structures::{scene_graph::Scene, texture::Texture};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    view_proj: [[f32; 4]; 4],
    // xyz towards the light, w unused
    direction: [f32; 4],
    color: [f32; 4],
    ambient: [f32; 4],
    // x bias, y normal bias, z shadow map size, w 1.0 when the map is sampled
    shadow: [f32; 4],
}

impl LightUniform {
    /// Lighting of `scene` as the shaders see it.
    ///
    /// The shadow map is only sampled when shadows are enabled on the
    /// renderer and the directional light casts them.
    pub fn from_scene(scene: &Scene, shadows_enabled: bool, shadow_map_size: u32) -> Self {
        let ambient = scene.ambient_radiance();
        let mut uniform = Self {
            view_proj: Matrix4::identity().into(),
            direction: [0.0, 1.0, 0.0, 0.0],
            color: [0.0; 4],
            ambient: [ambient[0], ambient[1], ambient[2], 1.0],
            shadow: [0.0, 0.0, shadow_map_size.max(1) as f32, 0.0],
        };
        if let Some((light, cast_shadow)) = scene.directional_light() {
            let dir = light.to_light();
            let color = light.radiance();
            uniform.view_proj = light.view_proj().into();
            uniform.direction = [dir.x, dir.y, dir.z, 0.0];
            uniform.color = [color[0], color[1], color[2], 1.0];
            uniform.shadow[0] = light.shadow.bias;
            uniform.shadow[1] = light.shadow.normal_bias;
            if shadows_enabled && cast_shadow {
                uniform.shadow[3] = 1.0;
            }
        }
        uniform
    }

    pub fn shadows_enabled(&self) -> bool {
        self.shadow[3] > 0.5
    }

    pub fn view_proj(&self) -> Matrix4<f32> {
        self.view_proj.into()
    }

    pub fn direction(&self) -> [f32; 3] {
        [self.direction[0], self.direction[1], self.direction[2]]
    }

    pub fn ambient(&self) -> [f32; 3] {
        [self.ambient[0], self.ambient[1], self.ambient[2]]
    }

    pub fn color(&self) -> [f32; 3] {
        [self.color[0], self.color[1], self.color[2]]
    }
}

impl Default for LightUniform {
    fn default() -> Self {
        Self::from_scene(&Scene::new(), false, 1)
    }
}

/// Light buffer, shadow map and the two bind groups reading them.
///
/// The shadow pass gets a bind group with the uniform only, since the map is
/// its render target and cannot be sampled at the same time.
#[derive(Debug)]
pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub shadow_map: Texture,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
    pub shadow_bind_group_layout: wgpu::BindGroupLayout,
    pub shadow_bind_group: wgpu::BindGroup,
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

impl LightResources {
    pub fn new(device: &wgpu::Device, shadow_map_size: u32) -> Self {
        let uniform = LightUniform::default();
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let shadow_map = Texture::create_shadow_map(device, shadow_map_size);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                uniform_entry(0),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Depth,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
            label: Some("light_bind_group_layout"),
        });
        let sampler = shadow_map.sampler.clone().unwrap_or_else(|| {
            device.create_sampler(&wgpu::SamplerDescriptor {
                compare: Some(wgpu::CompareFunction::LessEqual),
                ..Default::default()
            })
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&shadow_map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
            label: Some("light_bind_group"),
        });

        let shadow_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[uniform_entry(0)],
                label: Some("shadow_bind_group_layout"),
            });
        let shadow_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &shadow_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("shadow_bind_group"),
        });

        Self {
            uniform,
            buffer,
            shadow_map,
            bind_group_layout,
            bind_group,
            shadow_bind_group_layout,
            shadow_bind_group,
        }
    }

    pub fn shadow_map_size(&self) -> u32 {
        self.shadow_map.texture.width()
    }

    /// Replace the uniform and upload it.
    pub fn update(&mut self, queue: &wgpu::Queue, uniform: LightUniform) {
        self.uniform = uniform;
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}
