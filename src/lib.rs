//! grass-block
//!
//! A textured grass block spinning above a wooden floor, rendered with wgpu on
//! native targets and in the browser. The scene has an ambient and a
//! directional light, a shadow map, 4x MSAA and orbit controls.
//!
//! High-level modules
//! - `animation`: clock driven spin of the cube
//! - `camera`: perspective camera and its uniform
//! - `clock`: elapsed/delta time keeping
//! - `config`: renderer, camera and scene settings
//! - `context`: GPU and window context that owns device/queue/pipelines
//! - `controls`: orbit controls steering the camera
//! - `data_structures`: geometry, models, textures, lights and the scene graph
//! - `demo`: the grass block scene itself
//! - `flow`: event loop and the flow abstraction scenes implement
//! - `pipelines`: render pipelines and their shaders
//! - `render`: render composition and the per-frame passes
//! - `resources`: asset loading
//!

pub mod animation;
pub mod camera;
pub mod clock;
pub mod config;
pub mod context;
pub mod controls;
pub mod data_structures;
pub mod demo;
pub mod flow;
pub mod pipelines;
pub mod render;
pub mod resources;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use winit::event::WindowEvent;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Runs the grass block scene until its window is closed.
pub fn run(config: config::SceneConfig) -> anyhow::Result<()> {
    flow::run(config.clone(), vec![demo::GrassBlock::constructor(config)])
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), wasm_bindgen::JsValue> {
    run(config::SceneConfig::default()).map_err(|e| JsValue::from_str(&format!("{e:#}")))
}
