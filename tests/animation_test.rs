use std::f64::consts::{PI, TAU};

use grass_block::{
    animation::{AnimationDriver, DriverState, spin_angle},
    clock::Clock,
    data_structures::transform::Transform,
};
use instant::{Duration, Instant};

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

#[test]
fn spin_starts_at_zero() {
    assert_eq!(spin_angle(0.0, PI).0, 0.0);
}

#[test]
fn spin_completes_a_turn_every_two_seconds() {
    assert!(close(spin_angle(2.0, PI).0, 0.0));
    assert!(close(spin_angle(4.0, PI).0, 0.0));
    assert!(close(spin_angle(0.5, PI).0, (PI / 2.0) as f32));
    assert!(close(spin_angle(1.0, PI).0, PI as f32));
}

#[test]
fn spin_is_elapsed_times_pi_modulo_a_turn() {
    for step in 0..400 {
        let t = step as f64 * 0.137;
        let expected = (t * PI).rem_euclid(TAU) as f32;
        let expected = if expected >= TAU as f32 { 0.0 } else { expected };
        let angle = spin_angle(t, PI).0;
        assert!(close(angle, expected), "t = {t}: {angle} != {expected}");
        assert!((0.0..TAU as f32).contains(&angle));
    }
}

#[test]
fn spin_just_before_a_full_turn_wraps_to_zero() {
    // 2π - 3e-9 rounds up to exactly 2π in f32
    let angle = spin_angle(2.0 - 1e-9, PI).0;
    assert!(angle < TAU as f32);
    assert!(angle >= 0.0);
    assert_eq!(spin_angle(-1e-12, PI).0, 0.0);
}

#[test]
fn spin_stays_precise_after_a_long_session() {
    // Half a second past a full day is a quarter turn
    assert!(close(spin_angle(86_400.5, PI).0, (PI / 2.0) as f32));
    assert!(close(spin_angle(86_401.0, PI).0, PI as f32));
}

#[test]
fn driver_starts_idle_and_runs_once_started() {
    let mut driver = AnimationDriver::new(PI);
    assert_eq!(driver.state(), DriverState::Idle);

    let start = Instant::now();
    driver.start_at(start);
    assert_eq!(driver.state(), DriverState::Running);

    // A second start keeps the original start time
    driver.start_at(start + Duration::from_secs(1));
    let mut transform = Transform::new();
    let angle = driver.tick_at(start + Duration::from_millis(1500), &mut transform);
    assert!(close(angle.0, (1.5 * PI) as f32));
    assert_eq!(transform.rotation.y, angle);
}

#[test]
fn tick_on_idle_driver_starts_it_at_zero() {
    let mut driver = AnimationDriver::new(PI);
    let mut transform = Transform::new();
    let angle = driver.tick_at(Instant::now(), &mut transform);
    assert_eq!(driver.state(), DriverState::Running);
    assert_eq!(angle.0, 0.0);
}

#[test]
fn tick_only_touches_the_y_rotation() {
    let mut driver = AnimationDriver::new(PI);
    let start = Instant::now();
    driver.start_at(start);
    let mut transform = Transform::new().with_position([1.0, 2.0, 3.0]);
    driver.tick_at(start + Duration::from_millis(250), &mut transform);
    assert_eq!(transform.position, cgmath::Vector3::new(1.0, 2.0, 3.0));
    assert_eq!(transform.rotation.x.0, 0.0);
    assert_eq!(transform.rotation.z.0, 0.0);
}

#[test]
fn clock_auto_starts_on_first_read() {
    let mut clock = Clock::new(true);
    assert!(!clock.is_running());
    let now = Instant::now();
    assert_eq!(clock.delta_at(now), Duration::ZERO);
    assert!(clock.is_running());
    assert_eq!(clock.start_time(), Some(now));

    let later = now + Duration::from_millis(40);
    assert_eq!(clock.delta_at(later), Duration::from_millis(40));
    assert!((clock.elapsed_time_at(later) - 0.04).abs() < 1e-9);
}

#[test]
fn clock_without_auto_start_stays_at_zero() {
    let mut clock = Clock::new(false);
    let now = Instant::now();
    assert_eq!(clock.elapsed_time_at(now + Duration::from_secs(3)), 0.0);
    assert!(!clock.is_running());
}

#[test]
fn stopped_clock_freezes_elapsed_time() {
    let mut clock = Clock::new(false);
    let now = Instant::now();
    clock.start_at(now);
    clock.stop_at(now + Duration::from_secs(2));
    assert!(!clock.is_running());
    assert_eq!(clock.elapsed_time_at(now + Duration::from_secs(10)), 2.0);
}
