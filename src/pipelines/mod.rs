//! Render pipelines and the uniforms they bind.
//!
//! - `basic` holds the shared pipeline builder
//! - `light` is the point light uniform (bind group 1 of the lit pipeline)
//! - `phong` draws the extruded text with one of two specular models
//! - `glow` draws the alpha blended cube

pub mod basic;
pub mod glow;
pub mod light;
pub mod phong;
