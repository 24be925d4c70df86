use std::sync::Arc;

use anyhow::Context as _;
use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    camera::{CameraResources, PerspectiveCamera},
    config::{RendererConfig, SceneConfig},
    data_structures::texture,
    pipelines::{Pipelines, light::LightResources},
    resources::texture::diffuse_layout,
};

/// Surface size for a window of physical size `window` on a display with
/// `scale_factor`, rendered at `pixel_ratio` surface pixels per logical pixel.
///
/// Without an explicit ratio the surface matches the window. Both sides are
/// kept at least one pixel wide.
pub fn surface_size(
    window: PhysicalSize<u32>,
    scale_factor: f64,
    pixel_ratio: Option<f64>,
) -> [u32; 2] {
    let [width, height] = match pixel_ratio {
        Some(ratio) if scale_factor > 0.0 && ratio > 0.0 => {
            let logical = window.to_logical::<f64>(scale_factor);
            [
                (logical.width * ratio).round() as u32,
                (logical.height * ratio).round() as u32,
            ]
        }
        _ => [window.width, window.height],
    };
    [width.max(1), height.max(1)]
}

/// Depth buffer and, with antialiasing, the multisampled colour target.
#[derive(Debug)]
pub struct RenderTargets {
    pub depth: texture::Texture,
    pub msaa: Option<texture::Texture>,
}

impl RenderTargets {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: [u32; 2],
        sample_count: u32,
    ) -> Self {
        let depth = texture::Texture::create_depth_texture(device, size, sample_count, "depth_texture");
        let msaa = (sample_count > 1).then(|| {
            texture::Texture::create_msaa_framebuffer(device, format, size, sample_count)
        });
        Self { depth, msaa }
    }

    /// Colour attachment drawing into `target`, through the multisampled
    /// buffer when there is one.
    pub fn color_attachment<'a>(
        &'a self,
        target: &'a wgpu::TextureView,
        clear: wgpu::Color,
    ) -> wgpu::RenderPassColorAttachment<'a> {
        let (view, resolve_target) = match &self.msaa {
            Some(msaa) => (&msaa.view, Some(target)),
            None => (target, None),
        };
        wgpu::RenderPassColorAttachment {
            view,
            resolve_target,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(clear),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        }
    }
}

/// Everything the renderer owns: surface, device, targets, camera, light and
/// pipelines.
#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub renderer: RendererConfig,
    pub targets: RenderTargets,
    pub material_layout: wgpu::BindGroupLayout,
    pub camera: CameraResources,
    pub light: LightResources,
    pub pipelines: Pipelines,
    pub clear_colour: wgpu::Color,
}

impl Context {
    pub async fn new(window: Arc<Window>, scene: &SceneConfig) -> anyhow::Result<Self> {
        let renderer = scene.renderer.clone();
        let [width, height] = surface_size(
            window.inner_size(),
            window.scale_factor(),
            renderer.pixel_ratio,
        );

        log::info!("wgpu setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("creating the render surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no graphics adapter is compatible with the surface")?;
        log::info!("adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("requesting the graphics device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shaders write linear colour and rely on an sRGB surface
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("the surface supports no texture format")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let sample_count = renderer.sample_count();
        let targets = RenderTargets::new(&device, config.format, [width, height], sample_count);

        let camera = PerspectiveCamera::from_config(&scene.camera, width, height);
        let window_size = window.inner_size();
        let camera = CameraResources::new(&device, camera, [window_size.width, window_size.height]);

        let light = LightResources::new(&device, renderer.shadow_map_size);
        let material_layout = diffuse_layout(&device);
        let pipelines = Pipelines::new(
            &device,
            &config,
            sample_count,
            &material_layout,
            &camera.bind_group_layout,
            &light,
        );
        log::info!(
            "renderer ready: {width}x{height} {:?}, {sample_count}x msaa, shadows {}",
            config.format,
            if renderer.shadow_map_enabled { "on" } else { "off" }
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            clear_colour: renderer.clear_colour,
            renderer,
            targets,
            material_layout,
            camera,
            light,
            pipelines,
        })
    }

    pub fn sample_count(&self) -> u32 {
        self.renderer.sample_count()
    }

    /// Reconfigure the surface for a window of physical size `window`.
    ///
    /// A zero sized window (minimised) is ignored and keeps the old surface.
    pub fn resize(&mut self, window: PhysicalSize<u32>) -> bool {
        if window.width == 0 || window.height == 0 {
            return false;
        }
        let [width, height] =
            surface_size(window, self.window.scale_factor(), self.renderer.pixel_ratio);
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.targets = RenderTargets::new(
            &self.device,
            self.config.format,
            [width, height],
            self.sample_count(),
        );
        self.camera.resize(width, height);
        self.camera.controls.set_viewport(window.width, window.height);
        log::debug!("resized surface to {width}x{height}");
        true
    }
}

/// Handles a flow needs to create its GPU resources before the first frame.
///
/// Device and queue are reference counted by wgpu, so cloning them is cheap.
#[derive(Debug, Clone)]
pub struct InitContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub material_layout: wgpu::BindGroupLayout,
}

impl From<&Context> for InitContext {
    fn from(ctx: &Context) -> Self {
        Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
            material_layout: ctx.material_layout.clone(),
        }
    }
}
