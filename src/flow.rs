//! Flow control and application event loop.
//!
//! A "flow" is a self-contained scene: it builds its GPU resources from an
//! [`InitContext`], reacts to window input, advances its animation every frame
//! and says what to draw through a [`Render`] tree.
//!
//! # User-facing types
//!
//! - [`GraphicsFlow`] is the trait scenes implement
//! - [`Out`] lets a hook reconfigure the [`Context`]
//!
//! # Lifecycle
//!
//! Every frame the loop
//! 1. lets the orbit controls move the camera and uploads it
//! 2. calls `on_update` on all flows
//! 3. collects `on_render` from all flows into per-pipeline batches
//! 4. records the shadow pass and the main pass, then presents
//! 5. requests the next redraw
//!
//! Window input reaches the controls first and every flow afterwards.

use std::{fmt::Debug, iter, pin::Pin, sync::Arc};

use instant::Duration;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    clock::Clock,
    config::SceneConfig,
    context::{Context, InitContext},
    render::{Batches, Render, draw_frame},
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Output of every lifecycle hook.
///
/// `Out::Configure` modifies the Context, for instance the clear colour or
/// the camera. `Empty` is the default when nothing needs to change.
pub enum Out {
    Configure(Box<dyn FnOnce(&mut Context)>),
    Empty,
}

impl Default for Out {
    fn default() -> Self {
        Self::Empty
    }
}

#[cfg(feature = "integration-tests")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageTestResult {
    Passed,
    Waiting,
    Failed,
}

/// Trait for implementing a renderable scene.
///
/// # Lifecycle
///
/// 1. `on_init()` is called once after construction; configure the context here
/// 2. `on_window_events()` is called for each winit window event
/// 3. `on_update()` is called every frame before rendering
/// 4. `on_render()` is called every frame and says what to draw
pub trait GraphicsFlow {
    /// Initialize the flow and configure the context.
    fn on_init(&mut self, ctx: &mut Context) -> Out;

    /// Advance the flow by one frame. `dt` is the time since the last frame.
    fn on_update(&mut self, ctx: &Context, dt: Duration) -> Out;

    /// Handle window events (keyboard, mouse, resizing, ...).
    fn on_window_events(&mut self, ctx: &Context, event: &WindowEvent) -> Out;

    /// Renderable objects of this flow for the current frame.
    fn on_render(&self) -> Render<'_>;

    /// Inspect the rendered frame. The loop exits once every flow passes.
    #[cfg(feature = "integration-tests")]
    fn render_to_texture(
        &mut self,
        ctx: &Context,
        texture: &image::RgbaImage,
    ) -> Result<ImageTestResult, anyhow::Error>;
}

impl Debug for dyn GraphicsFlow + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GraphicsFlow")
    }
}

/// Factory for a flow: takes an `InitContext` and asynchronously builds the
/// flow, loading whatever assets it needs.
pub type FlowConstructor = Box<
    dyn FnOnce(InitContext) -> Pin<Box<dyn Future<Output = anyhow::Result<Box<dyn GraphicsFlow>>>>>,
>;

/// The GPU context plus per-frame bookkeeping.
#[derive(Debug)]
pub struct AppState {
    pub(crate) ctx: Context,
    frames: u64,
}

impl AppState {
    async fn new(window: Arc<Window>, config: &SceneConfig) -> anyhow::Result<Self> {
        let ctx = Context::new(window, config).await?;
        Ok(Self { ctx, frames: 0 })
    }

    fn resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        self.ctx.resize(size);
    }

    fn collect_batches<'f>(flows: &'f [Box<dyn GraphicsFlow>]) -> Batches<'f> {
        let mut batches = Batches::default();
        flows
            .iter()
            .for_each(|flow| flow.on_render().set_pipelines(&mut batches));
        batches
    }

    #[cfg(not(feature = "integration-tests"))]
    fn render(&mut self, flows: &[Box<dyn GraphicsFlow>]) -> Result<(), wgpu::SurfaceError> {
        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let batches = Self::collect_batches(flows);
        draw_frame(&self.ctx, &mut encoder, &view, &self.ctx.targets, &batches);

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        self.frames += 1;
        Ok(())
    }

    /// Renders into an offscreen texture of the surface's size and hands the
    /// pixels to every flow. Returns whether all of them passed.
    #[cfg(feature = "integration-tests")]
    fn render(
        &mut self,
        flows: &mut [Box<dyn GraphicsFlow>],
        async_runtime: &tokio::runtime::Runtime,
    ) -> anyhow::Result<bool> {
        let (width, height) = (self.ctx.config.width, self.ctx.config.height);
        let extent3d = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Golden Image Test Output Texture"),
            size: extent3d,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.ctx.config.format,
            usage: wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Test Render Encoder"),
            });
        {
            let batches = Self::collect_batches(flows);
            draw_frame(&self.ctx, &mut encoder, &view, &self.ctx.targets, &batches);
        }

        // Rows of a texture copy have to be 256 byte aligned
        let unpadded_bytes_per_row = 4 * width;
        let padded_bytes_per_row = unpadded_bytes_per_row
            .div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
            * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let output_buffer = self.ctx.device.create_buffer(&wgpu::BufferDescriptor {
            size: (padded_bytes_per_row * height) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            label: Some("Test Readback Buffer"),
            mapped_at_creation: false,
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &output_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            extent3d,
        );
        self.ctx.queue.submit(iter::once(encoder.finish()));
        self.frames += 1;

        let pixels = async_runtime.block_on(async {
            let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
            let buffer_slice = output_buffer.slice(..);
            buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
                tx.send(result).ok();
            });
            self.ctx.device.poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: Some(Duration::from_secs(3)),
            })?;
            rx.receive()
                .await
                .ok_or_else(|| anyhow::anyhow!("readback channel closed"))??;
            let data = buffer_slice.get_mapped_range();
            let mut pixels = Vec::with_capacity((unpadded_bytes_per_row * height) as usize);
            for row in data.chunks(padded_bytes_per_row as usize) {
                pixels.extend_from_slice(&row[..unpadded_bytes_per_row as usize]);
            }
            anyhow::Ok(pixels)
        })?;
        output_buffer.unmap();

        let mut img = image::RgbaImage::from_raw(width, height, pixels)
            .ok_or_else(|| anyhow::anyhow!("readback does not fit a {width}x{height} image"))?;
        if matches!(
            self.ctx.config.format,
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
        ) {
            img.pixels_mut().for_each(|p| p.0.swap(0, 2));
        }

        let mut all_passed = true;
        for flow in flows.iter_mut() {
            match flow.render_to_texture(&self.ctx, &img)? {
                ImageTestResult::Passed => (),
                ImageTestResult::Waiting => all_passed = false,
                ImageTestResult::Failed => anyhow::bail!("golden image assertion failed"),
            }
        }
        Ok(all_passed)
    }
}

pub(crate) enum FlowEvent {
    #[allow(dead_code)]
    Initialized {
        state: AppState,
        flows: Vec<Box<dyn GraphicsFlow>>,
    },
    #[allow(dead_code)]
    Failed(anyhow::Error),
}

impl Debug for FlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized { state: _, flows } => {
                f.debug_struct("Initialized").field("flows", flows).finish()
            }
            Self::Failed(e) => f.debug_tuple("Failed").field(e).finish(),
        }
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[allow(dead_code)]
    proxy: winit::event_loop::EventLoopProxy<FlowEvent>,
    config: SceneConfig,
    state: Option<AppState>,
    graphics_flows: Vec<Box<dyn GraphicsFlow>>,
    // Taken once the window exists
    constructors: Option<Vec<FlowConstructor>>,
    // Frame deltas, started once the flows are up
    frame_clock: Clock,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(
        event_loop: &EventLoop<FlowEvent>,
        config: SceneConfig,
        constructors: Vec<FlowConstructor>,
    ) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime: tokio::runtime::Runtime::new()?,
            proxy,
            config,
            state: None,
            graphics_flows: Vec::new(),
            constructors: Some(constructors),
            frame_clock: Clock::new(false),
            error: None,
        })
    }

    /// Stops the loop; `run` returns `error`.
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        self.error = Some(error);
        event_loop.exit();
    }

    fn start(&mut self, mut state: AppState, flows: Vec<Box<dyn GraphicsFlow>>) {
        self.graphics_flows = flows;
        let size = state.ctx.window.inner_size();
        state.resize(size);
        for flow in self.graphics_flows.iter_mut() {
            let out = flow.on_init(&mut state.ctx);
            handle_flow_output(&mut state.ctx, out);
        }
        log::info!("{} flow(s) running", self.graphics_flows.len());
        self.frame_clock.start();
        state.ctx.window.request_redraw();
        self.state = Some(state);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let dt = self.frame_clock.delta();

        state.ctx.camera.update(&state.ctx.queue);
        for flow in self.graphics_flows.iter_mut() {
            let out = flow.on_update(&state.ctx, dt);
            handle_flow_output(&mut state.ctx, out);
        }

        #[cfg(not(feature = "integration-tests"))]
        match state.render(&self.graphics_flows) {
            Ok(()) => (),
            // Reconfigure the surface if it's lost or outdated
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = state.ctx.window.inner_size();
                state.resize(size);
            }
            Err(wgpu::SurfaceError::Timeout) => log::warn!("surface timed out, skipping frame"),
            Err(e) => {
                let error = anyhow::Error::new(e).context("unable to render");
                self.fail(event_loop, error);
                return;
            }
        }

        #[cfg(feature = "integration-tests")]
        match state.render(&mut self.graphics_flows, &self.async_runtime) {
            Ok(true) => {
                log::info!("all render assertions passed after {} frames", state.frames);
                event_loop.exit();
                return;
            }
            Ok(false) => (),
            Err(e) => {
                self.fail(event_loop, e);
                return;
            }
        }

        state.ctx.window.request_redraw();
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(constructors) = self.constructors.take() else {
            return;
        };

        #[allow(unused_mut)]
        let mut window_attributes =
            Window::default_attributes().with_title(self.config.renderer.title.clone());

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowAttributesExtWebSys;

            // The canvas fills the page and is appended to the document body
            if let Some(window) = web_sys::window() {
                let width = window.inner_width().ok().and_then(|w| w.as_f64());
                let height = window.inner_height().ok().and_then(|h| h.as_f64());
                if let (Some(width), Some(height)) = (width, height) {
                    window_attributes = window_attributes
                        .with_inner_size(winit::dpi::LogicalSize::new(width, height));
                }
            }
            window_attributes = window_attributes.with_append(true);
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, anyhow::Error::new(e).context("creating the window"));
                return;
            }
        };

        let config = self.config.clone();
        let init_future = async move {
            let app_state = AppState::new(window, &config).await?;
            let flow_futures: Vec<_> = constructors
                .into_iter()
                .map(|constructor| constructor((&app_state.ctx).into()))
                .collect();
            let flows = futures::future::try_join_all(flow_futures).await?;
            anyhow::Ok((app_state, flows))
        };

        #[cfg(not(target_arch = "wasm32"))]
        match self.async_runtime.block_on(init_future) {
            Ok((app_state, flows)) => self.start(app_state, flows),
            Err(e) => self.fail(event_loop, e.context("initialising the scene")),
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let event = match init_future.await {
                    Ok((state, flows)) => FlowEvent::Initialized { state, flows },
                    Err(e) => FlowEvent::Failed(e.context("initialising the scene")),
                };
                if proxy.send_event(event).is_err() {
                    log::error!("event loop closed before the scene was ready");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            FlowEvent::Initialized { state, flows } => self.start(state, flows),
            FlowEvent::Failed(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        state.ctx.camera.controls.handle_window_event(&event);
        for flow in self.graphics_flows.iter_mut() {
            let out = flow.on_window_events(&state.ctx, &event);
            handle_flow_output(&mut state.ctx, out);
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

fn handle_flow_output(ctx: &mut Context, out: Out) {
    match out {
        Out::Configure(f) => f(ctx),
        Out::Empty => (),
    }
}

/// Opens the window and runs `constructors`' flows until the window closes.
///
/// Errors during start-up and fatal render errors end the loop and are
/// returned here.
pub fn run(config: SceneConfig, constructors: Vec<FlowConstructor>) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            eprintln!("Warning: Could not initialize logger: {e}");
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    #[cfg(all(feature = "integration-tests", target_os = "linux"))]
    let event_loop: EventLoop<FlowEvent> = {
        use winit::platform::wayland::EventLoopBuilderExtWayland;

        EventLoop::with_user_event().with_any_thread(true).build()?
    };

    #[cfg(all(feature = "integration-tests", target_os = "windows"))]
    let event_loop: EventLoop<FlowEvent> = {
        use winit::platform::windows::EventLoopBuilderExtWindows;

        EventLoop::with_user_event().with_any_thread(true).build()?
    };

    #[cfg(not(all(
        feature = "integration-tests",
        any(target_os = "linux", target_os = "windows")
    )))]
    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;

    let mut app = App::new(&event_loop, config, constructors)?;

    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
