#[cfg(feature = "integration-tests")]
mod common;

/// Floor point inside the cube's shadow for every spin angle: the light
/// shifts the shadow of the cube's bottom face by (5/3, 0, 10/3), and this
/// point is within 2 units of that square's centre.
#[cfg(feature = "integration-tests")]
const SHADOWED_FLOOR: [f32; 3] = [0.5, -3.0, 3.0];

#[cfg(feature = "integration-tests")]
const SHADOWS_OFF_AT: u32 = 4;

#[test]
#[cfg(feature = "integration-tests")]
fn should_darken_the_floor_under_the_cube() {
    use std::cell::Cell;

    use common::test_utils::{FrameCounter, ImageResult, brightness, project_to_pixel};
    use grass_block::{
        config::SceneConfig, context::Context, demo::build_scene, pipelines::light::LightUniform,
    };

    golden_image_test!(
        SceneConfig::default(),
        |frame: u32, ctx: &mut Context| {
            if frame == SHADOWS_OFF_AT {
                let (scene, _) = build_scene(&SceneConfig::default());
                let uniform = LightUniform::from_scene(&scene, false, ctx.light.shadow_map_size());
                ctx.light.update(&ctx.queue, uniform);
            }
        },
        {
            let shadowed = Cell::new(None);
            move |ctx: &Context, frames: &FrameCounter, texture: &image::RgbaImage| {
                if frames.frame() < SHADOWS_OFF_AT - 1 {
                    return Ok(ImageResult::Waiting);
                }
                let pixel = project_to_pixel(ctx, texture, SHADOWED_FLOOR)
                    .ok_or_else(|| anyhow::anyhow!("the shadowed floor is off screen"))?;
                let value = brightness(texture, pixel, 2);
                let Some(in_shadow) = shadowed.get() else {
                    assert!(ctx.light.uniform.shadows_enabled());
                    shadowed.set(Some(value));
                    return Ok(ImageResult::Waiting);
                };
                assert!(!ctx.light.uniform.shadows_enabled());
                // Ambient 0.4 against 0.4 plus the sun's diffuse term
                assert!(
                    value > in_shadow * 1.1,
                    "lit floor {value} is not brighter than shadowed floor {in_shadow}"
                );
                Ok(ImageResult::Passed)
            }
        }
    );
}
