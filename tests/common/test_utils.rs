#![allow(dead_code)]

use std::rc::Rc;

use grass_block::{
    context::Context,
    demo::GrassBlock,
    flow::{GraphicsFlow, Out},
    render::Render,
};
#[cfg(feature = "integration-tests")]
use grass_block::flow::ImageTestResult;

pub(crate) struct FrameCounter(pub(crate) u32);
impl Default for FrameCounter {
    fn default() -> Self {
        Self(0)
    }
}
impl FrameCounter {
    pub(crate) fn frame(&self) -> u32 {
        self.0
    }

    pub(crate) fn progress(&mut self) {
        self.0 += 1;
    }
}

/// Called with frame 0 on init and with the current frame before every render.
pub(crate) type Setup = Rc<dyn Fn(u32, &mut Context)>;

pub(crate) type Validate =
    Box<dyn Fn(&Context, &FrameCounter, &image::RgbaImage) -> anyhow::Result<ImageResult>>;

/// Verdict of a validator, mirrored onto the engine's test result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ImageResult {
    Passed,
    Waiting,
    Failed,
}

/// Runs the real scene and hands every rendered frame to `validate`.
pub(crate) struct GoldenFlow {
    pub(crate) scene: GrassBlock,
    pub(crate) frames: FrameCounter,
    pub(crate) setup: Setup,
    pub(crate) validate: Validate,
}

impl GraphicsFlow for GoldenFlow {
    fn on_init(&mut self, ctx: &mut Context) -> Out {
        let out = self.scene.on_init(ctx);
        (self.setup)(0, ctx);
        out
    }

    fn on_update(&mut self, ctx: &Context, dt: instant::Duration) -> Out {
        self.frames.progress();
        let scene_out = self.scene.on_update(ctx, dt);
        let setup = Rc::clone(&self.setup);
        let frame = self.frames.frame();
        Out::Configure(Box::new(move |ctx| {
            if let Out::Configure(f) = scene_out {
                f(ctx);
            }
            setup(frame, ctx);
        }))
    }

    fn on_window_events(&mut self, ctx: &Context, event: &grass_block::WindowEvent) -> Out {
        self.scene.on_window_events(ctx, event)
    }

    fn on_render(&self) -> Render<'_> {
        self.scene.on_render()
    }

    #[cfg(feature = "integration-tests")]
    fn render_to_texture(
        &mut self,
        ctx: &Context,
        texture: &image::RgbaImage,
    ) -> Result<ImageTestResult, anyhow::Error> {
        Ok(match (self.validate)(ctx, &self.frames, texture)? {
            ImageResult::Passed => ImageTestResult::Passed,
            ImageResult::Waiting => ImageTestResult::Waiting,
            ImageResult::Failed => ImageTestResult::Failed,
        })
    }
}

pub(crate) fn setup(f: impl Fn(u32, &mut Context) + 'static) -> Setup {
    Rc::new(f)
}

pub(crate) fn validator(
    f: impl Fn(&Context, &FrameCounter, &image::RgbaImage) -> anyhow::Result<ImageResult> + 'static,
) -> Validate {
    Box::new(f)
}

/// Pixel at the centre of the image.
pub(crate) fn centre_pixel(texture: &image::RgbaImage) -> image::Rgba<u8> {
    *texture.get_pixel(texture.width() / 2, texture.height() / 2)
}

/// Screen pixel `world` lands on in the current camera view.
pub(crate) fn project_to_pixel(
    ctx: &Context,
    texture: &image::RgbaImage,
    world: [f32; 3],
) -> Option<(u32, u32)> {
    let clip = ctx.camera.camera.view_proj() * cgmath::Vector4::new(world[0], world[1], world[2], 1.0);
    if clip.w <= 0.0 {
        return None;
    }
    let (x, y) = (clip.x / clip.w, clip.y / clip.w);
    if x.abs() > 1.0 || y.abs() > 1.0 {
        return None;
    }
    let px = ((x * 0.5 + 0.5) * texture.width() as f32) as u32;
    let py = ((0.5 - y * 0.5) * texture.height() as f32) as u32;
    Some((px.min(texture.width() - 1), py.min(texture.height() - 1)))
}

/// Mean of the RGB channels over a square patch around `(x, y)`.
pub(crate) fn brightness(texture: &image::RgbaImage, (x, y): (u32, u32), radius: u32) -> f32 {
    let (mut sum, mut count) = (0.0, 0u32);
    for py in y.saturating_sub(radius)..=(y + radius).min(texture.height() - 1) {
        for px in x.saturating_sub(radius)..=(x + radius).min(texture.width() - 1) {
            let p = texture.get_pixel(px, py);
            sum += p.0[..3].iter().map(|c| *c as f32).sum::<f32>() / 3.0;
            count += 1;
        }
    }
    sum / count.max(1) as f32
}

pub(crate) fn is_clear(pixel: &image::Rgba<u8>, colour: wgpu::Color) -> bool {
    let f_to_u8 = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as i32;
    let expected = [f_to_u8(colour.r), f_to_u8(colour.g), f_to_u8(colour.b)];
    pixel.0[..3]
        .iter()
        .zip(expected)
        .all(|(a, b)| (*a as i32 - b).abs() <= 2)
}

#[macro_export]
macro_rules! golden_image_test {
    ($config:expr, $setup:expr, $validate:expr) => {{
        use grass_block::flow::{FlowConstructor, GraphicsFlow};
        use $crate::common::test_utils::{FrameCounter, GoldenFlow, setup, validator};

        let config: grass_block::config::SceneConfig = $config;
        let scene_config = config.clone();
        let constructor: FlowConstructor = Box::new(move |ctx| {
            Box::pin(async move {
                let scene = grass_block::demo::GrassBlock::new(ctx, scene_config).await?;
                let flow: Box<dyn GraphicsFlow> = Box::new(GoldenFlow {
                    scene,
                    frames: FrameCounter::default(),
                    setup: setup($setup),
                    validate: validator($validate),
                });
                Ok(flow)
            })
        });

        grass_block::flow::run(config, vec![constructor])
            .expect("Failed to run flow for integration test.");
    }};
}
