#[cfg(feature = "integration-tests")]
mod common;

// winit allows one event loop per process, so every golden image test lives in
// its own test binary.
#[test]
#[cfg(feature = "integration-tests")]
fn should_show_clear_colour_above_the_horizon() {
    use common::test_utils::{FrameCounter, ImageResult, centre_pixel, is_clear};
    use grass_block::{config::SceneConfig, context::Context};
    use wgpu::Color;

    golden_image_test!(
        SceneConfig::default().with_clear_colour(Color::WHITE),
        |_: u32, _: &mut Context| {},
        |_: &Context, frames: &FrameCounter, texture: &image::RgbaImage| {
            if frames.frame() < 2 {
                return Ok(ImageResult::Waiting);
            }
            // The camera looks down at the origin, so the top edge is sky
            let corner = texture.get_pixel(0, 0);
            assert!(is_clear(corner, Color::WHITE), "corner was {corner:?}");
            let centre = centre_pixel(texture);
            assert!(!is_clear(&centre, Color::WHITE), "the cube is missing");
            Ok(ImageResult::Passed)
        }
    );
}
