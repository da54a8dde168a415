//! glyph-glow
//!
//! Extruded 3D text ("A" and "7") lit by a small glowing cube that the user
//! moves with the keyboard. Runs in the browser on WebGL2 and natively in a
//! desktop window. The scene comes in three variants that only differ in
//! colours, materials and in how the point light follows the cube.
//!
//! High-level modules
//! - `camera`: perspective camera, projection, orbit controls and uniforms
//! - `config`: scene configuration and the three variants
//! - `context`: window, surface, device and shared uniforms
//! - `data_structures`: vertices, meshes, instances and the depth texture
//! - `flow`: the winit event loop and the web entry point
//! - `input`: key bindings
//! - `pipelines`: render pipelines and their uniforms
//! - `render`: uploads a scene and draws it
//! - `resources`: font loading, text extrusion and the cube mesh
//! - `scene`: GPU independent session state
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod input;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;
