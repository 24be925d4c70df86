//! GPU meshes, materials and the draw helpers used by the render passes.

use std::ops::Range;

use wgpu::util::DeviceExt;

use crate::data_structures::{
    geometry::{Geometry, Group},
    texture,
    transform::TransformRaw,
};

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// How a material reacts to the scene lights.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shading {
    /// Texture colour only; lights and shadows are ignored.
    Basic,
    /// Diffuse lighting from ambient and directional lights, receives shadows.
    Standard,
}

#[derive(Debug)]
pub struct Material {
    pub name: String,
    pub shading: Shading,
    pub diffuse_texture: texture::Texture,
    pub bind_group: wgpu::BindGroup,
}

impl Material {
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        shading: Shading,
        diffuse_texture: texture::Texture,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let sampler = diffuse_texture
            .sampler
            .clone()
            .unwrap_or_else(|| texture::create_default_sampler(device));
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&diffuse_texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
            label: Some(name),
        });

        Self {
            name: name.to_string(),
            shading,
            diffuse_texture,
            bind_group,
        }
    }
}

/// Vertex and index buffers of one geometry plus its draw groups.
#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
    pub groups: Vec<Group>,
}

impl Mesh {
    pub fn from_geometry(device: &wgpu::Device, name: &str, geometry: &Geometry) -> Self {
        let vertices = geometry.vertices();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Vertex Buffer")),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Index Buffer")),
            contents: bytemuck::cast_slice(&geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        log::debug!(
            "uploaded mesh {name}: {} vertices, {} indices, {} groups",
            vertices.len(),
            geometry.indices.len(),
            geometry.draw_groups().len()
        );

        Self {
            name: name.to_string(),
            vertex_buffer,
            index_buffer,
            num_elements: geometry.indices.len() as u32,
            groups: geometry.draw_groups(),
        }
    }
}

/// A mesh, the materials its groups refer to and the buffer holding its
/// world transform.
#[derive(Debug)]
pub struct Model {
    pub mesh: Mesh,
    pub materials: Vec<Material>,
    pub transform_buffer: wgpu::Buffer,
}

impl Model {
    pub fn new(
        device: &wgpu::Device,
        mesh: Mesh,
        materials: Vec<Material>,
        transform: TransformRaw,
    ) -> Self {
        let transform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Transform Buffer", mesh.name)),
            contents: bytemuck::cast_slice(&[transform]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        if materials.windows(2).any(|pair| pair[0].shading != pair[1].shading) {
            log::warn!("mesh {} mixes shading models; the first one is used", mesh.name);
        }
        for group in &mesh.groups {
            if group.material_index >= materials.len() {
                log::warn!(
                    "mesh {} references material {} but only {} are bound; the group will be skipped",
                    mesh.name,
                    group.material_index,
                    materials.len()
                );
            }
        }
        Self {
            mesh,
            materials,
            transform_buffer,
        }
    }

    pub fn write_transform(&self, queue: &wgpu::Queue, transform: TransformRaw) {
        queue.write_buffer(&self.transform_buffer, 0, bytemuck::cast_slice(&[transform]));
    }

    /// Shading of the first material. Mixed shading within one model is not
    /// supported by the render batches.
    pub fn shading(&self) -> Shading {
        self.materials
            .first()
            .map(|m| m.shading)
            .unwrap_or(Shading::Basic)
    }
}

pub trait DrawModel<'a> {
    /// Draws every group with its own material bound at group 0.
    fn draw_model(
        &mut self,
        model: &'a Model,
        camera_bind_group: &'a wgpu::BindGroup,
        light_bind_group: Option<&'a wgpu::BindGroup>,
    );

    /// Geometry only, for depth passes. The caller binds the pass uniforms.
    fn draw_model_depth(&mut self, model: &'a Model);
}

impl<'a, 'b> DrawModel<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_model(
        &mut self,
        model: &'b Model,
        camera_bind_group: &'b wgpu::BindGroup,
        light_bind_group: Option<&'b wgpu::BindGroup>,
    ) {
        self.set_vertex_buffer(0, model.mesh.vertex_buffer.slice(..));
        self.set_vertex_buffer(1, model.transform_buffer.slice(..));
        self.set_index_buffer(model.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.set_bind_group(1, camera_bind_group, &[]);
        if let Some(light_bind_group) = light_bind_group {
            self.set_bind_group(2, light_bind_group, &[]);
        }
        for group in &model.mesh.groups {
            let Some(material) = model.materials.get(group.material_index) else {
                continue;
            };
            self.set_bind_group(0, &material.bind_group, &[]);
            self.draw_indexed(group_range(group), 0, 0..1);
        }
    }

    fn draw_model_depth(&mut self, model: &'b Model) {
        self.set_vertex_buffer(0, model.mesh.vertex_buffer.slice(..));
        self.set_vertex_buffer(1, model.transform_buffer.slice(..));
        self.set_index_buffer(model.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..model.mesh.num_elements, 0, 0..1);
    }
}

fn group_range(group: &Group) -> Range<u32> {
    group.start..group.start + group.count
}
