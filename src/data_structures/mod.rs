//! Scene data: geometry, GPU models and textures, transforms, lights and the
//! scene graph tying them together.
//!
//! - `geometry` generates box and plane vertex data
//! - `light` holds ambient and directional light parameters
//! - `model` contains GPU meshes, materials and draw helpers
//! - `scene_graph` is the flat object list the renderer walks every frame
//! - `texture` wraps GPU textures and render targets
//! - `transform` holds per-object position/rotation/scale

pub mod geometry;
pub mod light;
pub mod model;
pub mod scene_graph;
pub mod texture;
pub mod transform;
