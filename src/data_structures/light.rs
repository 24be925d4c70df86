//! Light sources as they live in the scene graph.
//!
//! The GPU side (uniform layout, bind groups, shadow map) is in
//! [`crate::pipelines::light`]; this module only holds the parameters and the
//! math that derives the light's shadow camera from them.

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, Vector3};

use crate::camera::OPENGL_TO_WGPU_MATRIX;

/// Convert a 0xRRGGBB sRGB colour into linear RGB.
pub fn linear_rgb(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| {
        let c = ((hex >> shift) & 0xff) as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [channel(16), channel(8), channel(0)]
}

/// Uniform light hitting every surface from every direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

impl AmbientLight {
    pub fn new(hex: u32, intensity: f32) -> Self {
        Self {
            color: linear_rgb(hex),
            intensity,
        }
    }

    pub fn radiance(&self) -> [f32; 3] {
        self.color.map(|c| c * self.intensity)
    }
}

/// Orthographic frustum the shadow map is rendered with, in light space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowCamera {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ShadowCamera {
    fn default() -> Self {
        Self {
            left: -5.0,
            right: 5.0,
            bottom: -5.0,
            top: 5.0,
            near: 0.5,
            far: 500.0,
        }
    }
}

/// Shadow parameters of a directional light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightShadow {
    pub camera: ShadowCamera,
    /// Depth offset applied before the comparison, fights shadow acne.
    pub bias: f32,
    /// Offset along the surface normal in world units.
    pub normal_bias: f32,
}

impl Default for LightShadow {
    fn default() -> Self {
        Self {
            camera: ShadowCamera::default(),
            bias: 0.0,
            normal_bias: 0.0,
        }
    }
}

/// Parallel light shining from `position` towards `target`, like the sun.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    pub color: [f32; 3],
    pub intensity: f32,
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub shadow: LightShadow,
}

impl DirectionalLight {
    pub fn new(hex: u32, intensity: f32) -> Self {
        Self {
            color: linear_rgb(hex),
            intensity,
            position: Point3::new(0.0, 1.0, 0.0),
            target: Point3::origin(),
            shadow: LightShadow::default(),
        }
    }

    pub fn with_position(mut self, position: impl Into<Point3<f32>>) -> Self {
        self.position = position.into();
        self
    }

    pub fn radiance(&self) -> [f32; 3] {
        self.color.map(|c| c * self.intensity)
    }

    /// Unit vector pointing from the surface towards the light.
    pub fn to_light(&self) -> Vector3<f32> {
        let offset = self.position - self.target;
        if offset.magnitude2() == 0.0 {
            Vector3::unit_y()
        } else {
            offset.normalize()
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        let dir = self.to_light();
        // look_at is undefined when the view direction is parallel to up
        let up = if dir.y.abs() > 0.999 {
            Vector3::unit_z()
        } else {
            Vector3::unit_y()
        };
        Matrix4::look_at_rh(self.position, self.target, up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let cam = &self.shadow.camera;
        OPENGL_TO_WGPU_MATRIX * cgmath::ortho(cam.left, cam.right, cam.bottom, cam.top, cam.near, cam.far)
    }

    /// World space to shadow map clip space.
    pub fn view_proj(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }
}
