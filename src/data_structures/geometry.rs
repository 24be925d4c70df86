//! Procedural box and plane geometry.
//!
//! Both generators produce indexed triangle lists with per-vertex normals and
//! texture coordinates. Texture coordinates use wgpu's convention (v grows
//! downwards, the top row of an image is `v = 0`), so images can be uploaded
//! without flipping.
//!
//! A box is split into six draw groups, one per face, in the order +X, -X,
//! +Y, -Y, +Z, -Z. Group `i` is drawn with material `i`, which is how the
//! grass block gets a different texture on its top, bottom and sides.

use crate::data_structures::model::ModelVertex;

/// A contiguous index range drawn with one material.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Group {
    pub start: u32,
    pub count: u32,
    pub material_index: usize,
}

/// CPU side vertex and index data.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub groups: Vec<Group>,
}

impl Geometry {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn vertices(&self) -> Vec<ModelVertex> {
        self.positions
            .iter()
            .zip(&self.normals)
            .zip(&self.tex_coords)
            .map(|((position, normal), tex_coords)| ModelVertex {
                position: *position,
                tex_coords: *tex_coords,
                normal: *normal,
            })
            .collect()
    }

    /// Groups to draw; a geometry without explicit groups is one group over
    /// all indices with material 0.
    pub fn draw_groups(&self) -> Vec<Group> {
        if self.groups.is_empty() {
            vec![Group {
                start: 0,
                count: self.indices.len() as u32,
                material_index: 0,
            }]
        } else {
            self.groups.clone()
        }
    }

    /// Axis aligned bounds as (min, max).
    pub fn bounds(&self) -> ([f32; 3], [f32; 3]) {
        let mut min = [f32::INFINITY; 3];
        let mut max = [f32::NEG_INFINITY; 3];
        for position in &self.positions {
            for axis in 0..3 {
                min[axis] = min[axis].min(position[axis]);
                max[axis] = max[axis].max(position[axis]);
            }
        }
        (min, max)
    }
}

/// Box centred on the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxGeometry {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    pub depth_segments: u32,
}

impl BoxGeometry {
    pub fn new(width: f32, height: f32, depth: f32) -> Self {
        Self {
            width,
            height,
            depth,
            width_segments: 1,
            height_segments: 1,
            depth_segments: 1,
        }
    }

    pub fn build(&self) -> Geometry {
        let mut geometry = Geometry::default();
        let (w, h, d) = (self.width, self.height, self.depth);
        let (ws, hs, ds) = (
            self.width_segments.max(1),
            self.height_segments.max(1),
            self.depth_segments.max(1),
        );
        // (u axis, v axis, w axis, u dir, v dir, face width, face height, offset along w, grid)
        let faces = [
            (2, 1, 0, -1.0, -1.0, d, h, w, ds, hs),
            (2, 1, 0, 1.0, -1.0, d, h, -w, ds, hs),
            (0, 2, 1, 1.0, 1.0, w, d, h, ws, ds),
            (0, 2, 1, 1.0, -1.0, w, d, -h, ws, ds),
            (0, 1, 2, 1.0, -1.0, w, h, d, ws, hs),
            (0, 1, 2, -1.0, -1.0, w, h, -d, ws, hs),
        ];
        for (material_index, (u, v, axis, udir, vdir, fw, fh, depth, gx, gy)) in
            faces.into_iter().enumerate()
        {
            push_face(
                &mut geometry,
                FaceSpec {
                    u,
                    v,
                    w: axis,
                    udir,
                    vdir,
                    width: fw,
                    height: fh,
                    depth,
                    grid_x: gx,
                    grid_y: gy,
                },
                material_index,
            );
        }
        geometry
    }
}

/// Flat rectangle in the XY plane facing +Z.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaneGeometry {
    pub width: f32,
    pub height: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl PlaneGeometry {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            width_segments: 1,
            height_segments: 1,
        }
    }

    pub fn build(&self) -> Geometry {
        let mut geometry = Geometry::default();
        let grid_x = self.width_segments.max(1);
        let grid_y = self.height_segments.max(1);
        let segment_width = self.width / grid_x as f32;
        let segment_height = self.height / grid_y as f32;

        for iy in 0..=grid_y {
            let y = iy as f32 * segment_height - self.height / 2.0;
            for ix in 0..=grid_x {
                let x = ix as f32 * segment_width - self.width / 2.0;
                geometry.positions.push([x, -y, 0.0]);
                geometry.normals.push([0.0, 0.0, 1.0]);
                geometry
                    .tex_coords
                    .push([ix as f32 / grid_x as f32, iy as f32 / grid_y as f32]);
            }
        }
        push_grid_indices(&mut geometry.indices, 0, grid_x, grid_y);
        geometry
    }
}

struct FaceSpec {
    u: usize,
    v: usize,
    w: usize,
    udir: f32,
    vdir: f32,
    width: f32,
    height: f32,
    depth: f32,
    grid_x: u32,
    grid_y: u32,
}

fn push_face(geometry: &mut Geometry, face: FaceSpec, material_index: usize) {
    let first_vertex = geometry.positions.len() as u32;
    let first_index = geometry.indices.len() as u32;
    let segment_width = face.width / face.grid_x as f32;
    let segment_height = face.height / face.grid_y as f32;
    let normal_sign = if face.depth > 0.0 { 1.0 } else { -1.0 };

    for iy in 0..=face.grid_y {
        let y = iy as f32 * segment_height - face.height / 2.0;
        for ix in 0..=face.grid_x {
            let x = ix as f32 * segment_width - face.width / 2.0;
            let mut position = [0.0; 3];
            position[face.u] = x * face.udir;
            position[face.v] = y * face.vdir;
            position[face.w] = face.depth / 2.0;
            let mut normal = [0.0; 3];
            normal[face.w] = normal_sign;
            geometry.positions.push(position);
            geometry.normals.push(normal);
            geometry.tex_coords.push([
                ix as f32 / face.grid_x as f32,
                iy as f32 / face.grid_y as f32,
            ]);
        }
    }
    push_grid_indices(&mut geometry.indices, first_vertex, face.grid_x, face.grid_y);
    geometry.groups.push(Group {
        start: first_index,
        count: geometry.indices.len() as u32 - first_index,
        material_index,
    });
}

// Two counter-clockwise triangles per grid cell.
fn push_grid_indices(indices: &mut Vec<u32>, base: u32, grid_x: u32, grid_y: u32) {
    let row = grid_x + 1;
    for iy in 0..grid_y {
        for ix in 0..grid_x {
            let a = base + ix + row * iy;
            let b = base + ix + row * (iy + 1);
            let c = base + (ix + 1) + row * (iy + 1);
            let d = base + (ix + 1) + row * iy;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
}
