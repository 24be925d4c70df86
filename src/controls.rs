//! Orbit controls: drag to rotate around a target, scroll to dolly, right
//! drag to pan.
//!
//! Input only records deltas; nothing touches the camera until
//! [`OrbitControls::update`] runs, once per frame. With damping enabled the
//! recorded deltas are applied a fraction at a time and decay, so the camera
//! keeps gliding for a few frames after the pointer stops.

use std::f32::consts::PI;

use cgmath::{InnerSpace, MetricSpace, Point3, Vector2, Vector3};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent};

use crate::camera::PerspectiveCamera;

const EPS: f32 = 1e-6;

/// What a pointer drag currently does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlState {
    None,
    Rotate,
    Dolly,
    Pan,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

/// Radius, polar angle from +Y and azimuth around +Y (from +Z towards +X).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Spherical {
    pub fn from_offset(offset: Vector3<f32>) -> Self {
        let radius = offset.magnitude();
        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_offset(&self) -> Vector3<f32> {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vector3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }

    /// Keep phi strictly between the poles so the view never flips.
    pub fn make_safe(&mut self) {
        self.phi = self.phi.clamp(EPS, PI - EPS);
    }
}

#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub enabled: bool,
    /// Point the camera orbits around and looks at.
    pub target: Point3<f32>,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub min_azimuth_angle: f32,
    pub max_azimuth_angle: f32,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub enable_zoom: bool,
    pub zoom_speed: f32,
    pub enable_rotate: bool,
    pub rotate_speed: f32,
    pub enable_pan: bool,
    pub pan_speed: f32,

    state: ControlState,
    pointer: Option<Vector2<f32>>,
    viewport: [u32; 2],
    spherical_delta: Spherical,
    scale: f32,
    pan_offset: Vector3<f32>,
    pending_pan: Vector2<f32>,
}

impl OrbitControls {
    /// Controls orbiting `camera` around the point it is looking at.
    ///
    /// `viewport` is the surface size in physical pixels; rotating by a full
    /// viewport height turns the camera once around the target.
    pub fn new(camera: &PerspectiveCamera, viewport: [u32; 2]) -> Self {
        Self {
            enabled: true,
            target: camera.target,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            min_azimuth_angle: f32::NEG_INFINITY,
            max_azimuth_angle: f32::INFINITY,
            enable_damping: false,
            damping_factor: 0.05,
            enable_zoom: true,
            zoom_speed: 1.0,
            enable_rotate: true,
            rotate_speed: 1.0,
            enable_pan: true,
            pan_speed: 1.0,
            state: ControlState::None,
            pointer: None,
            viewport,
            spherical_delta: Spherical {
                radius: 0.0,
                phi: 0.0,
                theta: 0.0,
            },
            scale: 1.0,
            pan_offset: Vector3::new(0.0, 0.0, 0.0),
            pending_pan: Vector2::new(0.0, 0.0),
        }
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = [width, height];
    }

    fn viewport_height(&self) -> f32 {
        self.viewport[1].max(1) as f32
    }

    fn zoom_scale(&self) -> f32 {
        0.95f32.powf(self.zoom_speed)
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    pub fn dolly_in(&mut self, dolly_scale: f32) {
        self.scale *= dolly_scale;
    }

    pub fn dolly_out(&mut self, dolly_scale: f32) {
        self.scale /= dolly_scale;
    }

    /// Queue a pan by a pointer delta in pixels. It is converted to world
    /// units during the next update, when the camera is at hand.
    pub fn pan_pixels(&mut self, dx: f32, dy: f32) {
        self.pending_pan += Vector2::new(dx, dy);
    }

    pub fn pointer_down(&mut self, button: PointerButton, x: f32, y: f32) {
        if !self.enabled {
            return;
        }
        self.button_down(button);
        self.pointer = Some(Vector2::new(x, y));
    }

    /// Starts a drag at wherever the pointer currently is. Without a known
    /// position the first move only anchors the drag.
    pub fn button_down(&mut self, button: PointerButton) {
        if !self.enabled {
            return;
        }
        self.state = match button {
            PointerButton::Primary if self.enable_rotate => ControlState::Rotate,
            PointerButton::Middle if self.enable_zoom => ControlState::Dolly,
            PointerButton::Secondary if self.enable_pan => ControlState::Pan,
            _ => ControlState::None,
        };
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        let position = Vector2::new(x, y);
        let Some(last) = self.pointer.replace(position) else {
            return;
        };
        if !self.enabled {
            return;
        }
        let delta = position - last;
        let height = self.viewport_height();
        match self.state {
            ControlState::Rotate => {
                self.rotate_left(2.0 * PI * delta.x / height * self.rotate_speed);
                self.rotate_up(2.0 * PI * delta.y / height * self.rotate_speed);
            }
            ControlState::Dolly => {
                if delta.y > 0.0 {
                    self.dolly_out(self.zoom_scale());
                } else if delta.y < 0.0 {
                    self.dolly_in(self.zoom_scale());
                }
            }
            ControlState::Pan => self.pan_pixels(delta.x * self.pan_speed, delta.y * self.pan_speed),
            ControlState::None => (),
        }
    }

    pub fn pointer_up(&mut self) {
        self.state = ControlState::None;
    }

    /// Positive `delta` means scrolling away from the user, which zooms in.
    pub fn wheel(&mut self, delta: f32) {
        if !self.enabled || !self.enable_zoom || self.state != ControlState::None {
            return;
        }
        if delta > 0.0 {
            self.dolly_in(self.zoom_scale());
        } else if delta < 0.0 {
            self.dolly_out(self.zoom_scale());
        }
    }

    /// Feed a window event into the controls. Returns whether it was used.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    MouseButton::Left => PointerButton::Primary,
                    MouseButton::Middle => PointerButton::Middle,
                    MouseButton::Right => PointerButton::Secondary,
                    _ => return false,
                };
                match state {
                    ElementState::Pressed => self.button_down(button),
                    ElementState::Released => self.pointer_up(),
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_move(position.x as f32, position.y as f32);
                self.state != ControlState::None
            }
            WindowEvent::CursorLeft { .. } => {
                self.pointer_up();
                self.pointer = None;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32,
                };
                self.wheel(delta);
                true
            }
            WindowEvent::Touch(touch) => {
                let (x, y) = (touch.location.x as f32, touch.location.y as f32);
                match touch.phase {
                    TouchPhase::Started => self.pointer_down(PointerButton::Primary, x, y),
                    TouchPhase::Moved => self.pointer_move(x, y),
                    TouchPhase::Ended | TouchPhase::Cancelled => {
                        self.pointer_up();
                        self.pointer = None;
                    }
                }
                true
            }
            _ => false,
        }
    }

    fn resolve_pending_pan(&mut self, camera: &PerspectiveCamera) {
        if self.pending_pan == Vector2::new(0.0, 0.0) {
            return;
        }
        let offset = camera.position - self.target;
        // Half the visible height at the target's depth
        let target_distance = offset.magnitude() * (camera.fovy.0 / 2.0).tan();
        let height = self.viewport_height();
        let forward = camera.forward();
        let mut right = forward.cross(camera.up);
        if right.magnitude2() < EPS {
            right = Vector3::unit_x();
        }
        let right = right.normalize();
        let up = right.cross(forward).normalize();

        let left = -right * (2.0 * self.pending_pan.x * target_distance / height);
        let upward = up * (2.0 * self.pending_pan.y * target_distance / height);
        self.pan_offset += left + upward;
        self.pending_pan = Vector2::new(0.0, 0.0);
    }

    fn clamp_azimuth(&self, theta: f32) -> f32 {
        let (mut min, mut max) = (self.min_azimuth_angle, self.max_azimuth_angle);
        if !min.is_finite() || !max.is_finite() {
            return theta;
        }
        let two_pi = 2.0 * PI;
        if min < -PI {
            min += two_pi;
        } else if min > PI {
            min -= two_pi;
        }
        if max < -PI {
            max += two_pi;
        } else if max > PI {
            max -= two_pi;
        }
        if min <= max {
            theta.clamp(min, max)
        } else if theta > (min + max) / 2.0 {
            theta.max(min)
        } else {
            theta.min(max)
        }
    }

    /// Apply pending input to `camera`. Returns whether the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        self.resolve_pending_pan(camera);
        let last_position = camera.position;
        let last_target = self.target;

        let mut spherical = Spherical::from_offset(camera.position - self.target);
        let step = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };
        spherical.theta += self.spherical_delta.theta * step;
        spherical.phi += self.spherical_delta.phi * step;

        spherical.theta = self.clamp_azimuth(spherical.theta);
        spherical.phi = spherical
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle);
        spherical.make_safe();
        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.target += self.pan_offset * step;
        camera.position = self.target + spherical.to_offset();
        camera.look_at(self.target);

        if self.enable_damping {
            self.spherical_delta.theta *= 1.0 - self.damping_factor;
            self.spherical_delta.phi *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.spherical_delta.theta = 0.0;
            self.spherical_delta.phi = 0.0;
            self.pan_offset = Vector3::new(0.0, 0.0, 0.0);
        }
        self.scale = 1.0;

        last_position.distance2(camera.position) > EPS || last_target.distance2(self.target) > EPS
    }
}
