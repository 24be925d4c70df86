use cgmath::{InnerSpace, Point3, Vector3, Vector4};
use grass_block::{
    camera::{CameraUniform, PerspectiveCamera},
    config::{RendererConfig, SceneConfig},
    context::surface_size,
    demo::{CUBE_SIZE, build_scene, sun_light},
    pipelines::light::LightUniform,
};
use winit::dpi::PhysicalSize;

fn project(view_proj: cgmath::Matrix4<f32>, point: [f32; 3]) -> Vector3<f32> {
    let clip = view_proj * Vector4::new(point[0], point[1], point[2], 1.0);
    clip.truncate() / clip.w
}

#[test]
fn defaults_describe_the_demo() {
    let config = SceneConfig::default();
    assert_eq!(config.camera.fov_degrees, 75.0);
    assert_eq!(config.camera.near, 0.1);
    assert_eq!(config.camera.far, 1000.0);
    assert_eq!(config.camera.position, Point3::new(5.0, 5.0, 10.0));
    assert_eq!(config.camera.target, Point3::new(0.0, 0.0, 0.0));
    assert!(!config.show_axes);
    assert!(config.renderer.shadow_map_enabled);
    assert_eq!(config.renderer.pixel_ratio, None);
    assert_eq!(config.renderer.sample_count(), RendererConfig::MSAA_SAMPLES);
    assert_eq!(config.with_antialias(false).renderer.sample_count(), 1);
}

#[test]
fn builders_override_single_fields() {
    let config = SceneConfig::default()
        .with_pixel_ratio(1.5)
        .with_camera_position([0.0, 2.0, 8.0])
        .with_spin_speed(1.0);
    assert_eq!(config.renderer.pixel_ratio, Some(1.5));
    assert_eq!(config.camera.position, Point3::new(0.0, 2.0, 8.0));
    assert_eq!(config.spin_speed, 1.0);
    assert_eq!(config.camera.target, SceneConfig::default().camera.target);
    assert!(config.renderer.antialias);

    let camera = PerspectiveCamera::from_config(&config.camera, 100, 100);
    let expected = -Vector3::new(0.0f32, 2.0, 8.0).normalize();
    assert!((camera.forward() - expected).magnitude() < 1e-6);
}

#[test]
fn camera_looks_at_the_origin() {
    let config = SceneConfig::default();
    let camera = PerspectiveCamera::from_config(&config.camera, 800, 600);
    assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);

    let centre = project(camera.view_proj(), [0.0, 0.0, 0.0]);
    assert!(centre.x.abs() < 1e-5 && centre.y.abs() < 1e-5);
    assert!(centre.z > 0.0 && centre.z < 1.0);

    let expected = -Vector3::new(5.0f32, 5.0, 10.0).normalize();
    assert!((camera.forward() - expected).magnitude() < 1e-6);

    let mut uniform = CameraUniform::new();
    uniform.update_view_proj(&camera);
    assert_eq!(uniform.view_proj(), camera.view_proj());
}

#[test]
fn whole_cube_is_in_view() {
    let camera = PerspectiveCamera::from_config(&SceneConfig::default().camera, 800, 600);
    let h = CUBE_SIZE / 2.0;
    for x in [-h, h] {
        for y in [-h, h] {
            for z in [-h, h] {
                let ndc = project(camera.view_proj(), [x, y, z]);
                assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0, "{ndc:?}");
                assert!((0.0..=1.0).contains(&ndc.z));
            }
        }
    }
}

#[test]
fn resize_only_changes_the_aspect() {
    let mut camera = PerspectiveCamera::from_config(&SceneConfig::default().camera, 800, 600);
    let before = camera.clone();
    camera.resize(1000, 500);
    assert_eq!(camera.aspect, 2.0);
    assert_eq!(camera.position, before.position);
    assert_eq!(camera.fovy, before.fovy);
    // Zero sized windows never divide by zero
    camera.resize(0, 0);
    assert!(camera.aspect.is_finite());
}

#[test]
fn surface_follows_the_pixel_ratio() {
    let window = PhysicalSize::new(1600, 1200);
    assert_eq!(surface_size(window, 2.0, None), [1600, 1200]);
    assert_eq!(surface_size(window, 2.0, Some(1.0)), [800, 600]);
    assert_eq!(surface_size(window, 1.0, Some(2.0)), [3200, 2400]);
    assert_eq!(surface_size(PhysicalSize::new(0, 0), 1.0, None), [1, 1]);
}

#[test]
fn light_uniform_describes_the_sun() {
    let (scene, _) = build_scene(&SceneConfig::default());
    let uniform = LightUniform::from_scene(&scene, true, 512);

    let expected = Vector3::new(-5.0f32, 3.0, -10.0).normalize();
    let direction = Vector3::from(uniform.direction());
    assert!((direction - expected).magnitude() < 1e-6);
    assert_eq!(uniform.color(), [1.0, 1.0, 1.0]);
    assert_eq!(uniform.ambient(), [0.4, 0.4, 0.4]);
    assert!(uniform.shadows_enabled());
    assert_eq!(uniform.view_proj(), sun_light().view_proj());
}

#[test]
fn shadow_map_needs_renderer_and_light() {
    let (mut scene, nodes) = build_scene(&SceneConfig::default());
    assert!(!LightUniform::from_scene(&scene, false, 512).shadows_enabled());

    if let Some(sun) = scene.get_mut(nodes.sun) {
        sun.cast_shadow = false;
    }
    assert!(!LightUniform::from_scene(&scene, true, 512).shadows_enabled());
    assert!(!LightUniform::default().shadows_enabled());
}

#[test]
fn hidden_sun_leaves_only_ambient() {
    let (mut scene, nodes) = build_scene(&SceneConfig::default());
    scene.set_visible(nodes.sun, false);
    let uniform = LightUniform::from_scene(&scene, true, 512);
    assert_eq!(uniform.color(), [0.0, 0.0, 0.0]);
    assert_eq!(uniform.ambient(), [0.4, 0.4, 0.4]);
    assert!(!uniform.shadows_enabled());
}

#[test]
fn shadow_camera_covers_the_cube() {
    let view_proj = sun_light().view_proj();
    let h = CUBE_SIZE / 2.0;
    for x in [-h, h] {
        for y in [-h, h] {
            for z in [-h, h] {
                let ndc = project(view_proj, [x, y, z]);
                assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0, "{ndc:?}");
                assert!(ndc.z > 0.0 && ndc.z < 1.0);
            }
        }
    }
}
