//! Engine data structures: meshes, instances and textures.
//!
//! - `model` contains the vertex format, CPU mesh data and GPU meshes
//! - `texture` wraps the depth texture
//! - `instance` holds per-drawable transformation data

pub mod instance;
pub mod model;
pub mod texture;
