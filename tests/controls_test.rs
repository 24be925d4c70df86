use std::f32::consts::{FRAC_PI_2, PI};

use cgmath::{InnerSpace, MetricSpace, Point3};
use grass_block::{
    camera::PerspectiveCamera,
    config::CameraConfig,
    controls::{ControlState, OrbitControls, PointerButton, Spherical},
};

const VIEWPORT: [u32; 2] = [800, 600];

fn setup() -> (PerspectiveCamera, OrbitControls) {
    let camera = PerspectiveCamera::from_config(&CameraConfig::default(), VIEWPORT[0], VIEWPORT[1]);
    let controls = OrbitControls::new(&camera, VIEWPORT);
    (camera, controls)
}

fn distance(camera: &PerspectiveCamera, controls: &OrbitControls) -> f32 {
    camera.position.distance(controls.target)
}

fn assert_close(a: Point3<f32>, b: Point3<f32>) {
    assert!(a.distance(b) < 1e-3, "{a:?} != {b:?}");
}

#[test]
fn orbits_around_the_look_at_point() {
    let (camera, controls) = setup();
    assert_eq!(controls.target, Point3::new(0.0, 0.0, 0.0));
    assert_eq!(controls.state(), ControlState::None);
    assert!((distance(&camera, &controls) - 150.0f32.sqrt()).abs() < 1e-5);
}

#[test]
fn idle_update_does_not_move_the_camera() {
    let (mut camera, mut controls) = setup();
    let before = camera.position;
    assert!(!controls.update(&mut camera));
    assert_close(camera.position, before);
}

#[test]
fn rotating_keeps_the_distance() {
    let (mut camera, mut controls) = setup();
    let radius = distance(&camera, &controls);
    controls.rotate_left(0.7);
    controls.rotate_up(0.2);
    assert!(controls.update(&mut camera));
    assert!((distance(&camera, &controls) - radius).abs() < 1e-4);
    assert_eq!(camera.target, controls.target);
}

#[test]
fn dragging_half_the_viewport_height_turns_half_around() {
    let (mut camera, mut controls) = setup();
    controls.pointer_down(PointerButton::Primary, 100.0, 100.0);
    assert_eq!(controls.state(), ControlState::Rotate);
    controls.pointer_move(400.0, 100.0);
    controls.pointer_up();
    assert_eq!(controls.state(), ControlState::None);

    controls.update(&mut camera);
    assert_close(camera.position, Point3::new(-5.0, 5.0, -10.0));
}

#[test]
fn press_without_a_cursor_position_waits_for_the_first_move() {
    let (mut camera, mut controls) = setup();
    let before = camera.position;
    controls.button_down(PointerButton::Primary);
    assert_eq!(controls.state(), ControlState::Rotate);

    // Far from the origin, but only anchors the drag
    controls.pointer_move(400.0, 300.0);
    assert!(!controls.update(&mut camera));
    assert_close(camera.position, before);

    // Half the viewport height from the anchor is half a turn
    controls.pointer_move(700.0, 300.0);
    controls.update(&mut camera);
    assert_close(camera.position, Point3::new(-5.0, 5.0, -10.0));
}

#[test]
fn press_keeps_a_known_cursor_position() {
    let (mut camera, mut controls) = setup();
    controls.pointer_move(100.0, 100.0);
    controls.button_down(PointerButton::Primary);
    controls.pointer_move(400.0, 100.0);
    controls.update(&mut camera);
    assert_close(camera.position, Point3::new(-5.0, 5.0, -10.0));
}

#[test]
fn polar_angle_is_clamped() {
    let (mut camera, mut controls) = setup();
    controls.max_polar_angle = FRAC_PI_2;
    controls.rotate_up(-10.0);
    controls.update(&mut camera);
    assert!(camera.position.y.abs() < 1e-3);

    controls.rotate_up(10.0);
    controls.update(&mut camera);
    // Never exactly over the pole
    let offset = camera.position - controls.target;
    assert!(offset.y > 0.0);
    assert!(offset.x.abs() + offset.z.abs() > 0.0);
}

#[test]
fn dolly_scales_the_distance() {
    let (mut camera, mut controls) = setup();
    let radius = distance(&camera, &controls);
    controls.dolly_in(0.5);
    controls.update(&mut camera);
    assert!((distance(&camera, &controls) - radius * 0.5).abs() < 1e-4);

    controls.dolly_out(0.5);
    controls.update(&mut camera);
    assert!((distance(&camera, &controls) - radius).abs() < 1e-4);
}

#[test]
fn distance_limits_apply() {
    let (mut camera, mut controls) = setup();
    controls.max_distance = 5.0;
    controls.update(&mut camera);
    assert!((distance(&camera, &controls) - 5.0).abs() < 1e-4);

    controls.min_distance = 2.0;
    controls.dolly_in(0.01);
    controls.update(&mut camera);
    assert!((distance(&camera, &controls) - 2.0).abs() < 1e-4);
}

#[test]
fn wheel_up_zooms_in() {
    let (mut camera, mut controls) = setup();
    let radius = distance(&camera, &controls);
    controls.wheel(1.0);
    controls.update(&mut camera);
    assert!(distance(&camera, &controls) < radius);
}

#[test]
fn wheel_is_ignored_while_dragging() {
    let (mut camera, mut controls) = setup();
    let radius = distance(&camera, &controls);
    controls.pointer_down(PointerButton::Primary, 0.0, 0.0);
    controls.wheel(1.0);
    controls.update(&mut camera);
    assert!((distance(&camera, &controls) - radius).abs() < 1e-4);
}

#[test]
fn panning_moves_camera_and_target_together() {
    let (mut camera, mut controls) = setup();
    let offset = camera.position - controls.target;
    controls.pointer_down(PointerButton::Secondary, 0.0, 0.0);
    assert_eq!(controls.state(), ControlState::Pan);
    controls.pointer_move(120.0, -40.0);
    assert!(controls.update(&mut camera));

    assert_ne!(controls.target, Point3::new(0.0, 0.0, 0.0));
    assert!(((camera.position - controls.target) - offset).magnitude() < 1e-3);
    assert_eq!(camera.target, controls.target);
}

#[test]
fn disabled_controls_ignore_input() {
    let (mut camera, mut controls) = setup();
    let before = camera.position;
    controls.enabled = false;
    controls.pointer_down(PointerButton::Primary, 0.0, 0.0);
    controls.pointer_move(300.0, 200.0);
    controls.wheel(3.0);
    assert_eq!(controls.state(), ControlState::None);
    assert!(!controls.update(&mut camera));
    assert_close(camera.position, before);
}

#[test]
fn damping_spreads_a_rotation_over_frames() {
    let (mut camera, mut controls) = setup();
    controls.enable_damping = true;
    let start = Spherical::from_offset(camera.position - controls.target);
    controls.rotate_left(1.0);

    controls.update(&mut camera);
    let first = Spherical::from_offset(camera.position - controls.target);
    assert!((start.theta - first.theta - controls.damping_factor).abs() < 1e-4);

    assert!(controls.update(&mut camera));
    let second = Spherical::from_offset(camera.position - controls.target);
    assert!(second.theta < first.theta);
    assert!(first.theta - second.theta < start.theta - first.theta);
}

#[test]
fn spherical_matches_the_offset() {
    let offset = cgmath::Vector3::new(5.0, 5.0, 10.0);
    let spherical = Spherical::from_offset(offset);
    assert!((spherical.theta - 0.5f32.atan()).abs() < 1e-6);
    assert!(spherical.phi > 0.0 && spherical.phi < PI / 2.0);
    assert!((spherical.to_offset() - offset).magnitude() < 1e-4);
}
