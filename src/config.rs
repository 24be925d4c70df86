//! Scene, renderer and camera settings.
//!
//! Every value defaults to what the grass block demo ships with. Callers tweak
//! individual fields through the `with_*` builders before handing the config to
//! [`crate::flow::run`].

use cgmath::Point3;

/// Renderer (surface, framebuffer and shadow map) settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    /// Window title on native, ignored on the web.
    pub title: String,
    /// 4x MSAA when enabled.
    pub antialias: bool,
    /// Ratio between surface pixels and logical window pixels.
    ///
    /// `None` follows the display's scale factor.
    pub pixel_ratio: Option<f64>,
    pub shadow_map_enabled: bool,
    /// Edge length of the square shadow map in texels.
    pub shadow_map_size: u32,
    pub clear_colour: wgpu::Color,
}

impl RendererConfig {
    pub const MSAA_SAMPLES: u32 = 4;

    pub fn sample_count(&self) -> u32 {
        if self.antialias { Self::MSAA_SAMPLES } else { 1 }
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            title: "grass block".to_string(),
            antialias: true,
            pixel_ratio: None,
            shadow_map_enabled: true,
            shadow_map_size: 512,
            clear_colour: wgpu::Color::BLACK,
        }
    }
}

/// Initial perspective camera placement and frustum.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Point3<f32>,
    pub target: Point3<f32>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            position: Point3::new(5.0, 5.0, 10.0),
            target: Point3::new(0.0, 0.0, 0.0),
        }
    }
}

/// Top level configuration for the demo.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub renderer: RendererConfig,
    pub camera: CameraConfig,
    /// Visibility of the axes helper at the origin.
    pub show_axes: bool,
    /// Cube spin in radians per second. One turn every two seconds by default.
    pub spin_speed: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            renderer: RendererConfig::default(),
            camera: CameraConfig::default(),
            show_axes: false,
            spin_speed: std::f64::consts::PI,
        }
    }
}

impl SceneConfig {
    pub fn with_axes(mut self, show_axes: bool) -> Self {
        self.show_axes = show_axes;
        self
    }

    pub fn with_antialias(mut self, antialias: bool) -> Self {
        self.renderer.antialias = antialias;
        self
    }

    pub fn with_pixel_ratio(mut self, pixel_ratio: f64) -> Self {
        self.renderer.pixel_ratio = Some(pixel_ratio);
        self
    }

    pub fn with_shadows(mut self, enabled: bool) -> Self {
        self.renderer.shadow_map_enabled = enabled;
        self
    }

    pub fn with_clear_colour(mut self, colour: wgpu::Color) -> Self {
        self.renderer.clear_colour = colour;
        self
    }

    pub fn with_camera_position(mut self, position: impl Into<Point3<f32>>) -> Self {
        self.camera.position = position.into();
        self
    }

    pub fn with_spin_speed(mut self, radians_per_second: f64) -> Self {
        self.spin_speed = radians_per_second;
        self
    }
}
