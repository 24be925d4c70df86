#[cfg(feature = "integration-tests")]
mod common;

#[test]
#[cfg(feature = "integration-tests")]
fn should_render_without_antialiasing_and_shadows() {
    use common::test_utils::{FrameCounter, ImageResult, centre_pixel, is_clear};
    use grass_block::{config::SceneConfig, context::Context};
    use wgpu::Color;

    golden_image_test!(
        SceneConfig::default()
            .with_antialias(false)
            .with_shadows(false)
            .with_axes(true),
        |_: u32, ctx: &mut Context| ctx.clear_colour = Color::BLACK,
        |ctx: &Context, frames: &FrameCounter, texture: &image::RgbaImage| {
            if frames.frame() < 2 {
                return Ok(ImageResult::Waiting);
            }
            assert_eq!(ctx.sample_count(), 1);
            assert!(ctx.targets.msaa.is_none());
            assert_eq!(texture.width(), ctx.config.width);
            assert_eq!(texture.height(), ctx.config.height);
            assert!(!is_clear(&centre_pixel(texture), Color::BLACK));
            Ok(ImageResult::Passed)
        }
    );
}
