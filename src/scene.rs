//! Session state of the demo.
//!
//! [`Scene`] owns everything that changes while the demo runs: the camera,
//! the glowing cube, the point light, both text materials and, once the font
//! has resolved, the text labels. It knows nothing about the GPU. The event
//! loop feeds it input and the renderer reads it back every frame.

use cgmath::{Point3, Rad, Vector3};
use winit::{event::WindowEvent, keyboard::Key};

use crate::{
    camera::{Camera, OrbitController, Projection},
    config::{LightSync, MaterialConfig, MaterialSlot, SceneConfig, SpecularModel},
    data_structures::{instance::Instance, model::MeshData},
    input::InputAction,
    resources::{
        font::{Font, FontError},
        text::text_mesh,
    },
};

/// Uniform values of one text material.
#[derive(Debug, Clone, PartialEq)]
pub struct PhongMaterial {
    /// Where the shading assumes the light to be; copied from the cube every frame.
    pub light_position: Vector3<f32>,
    pub ambient_intensity: f32,
    pub diffuse_color: [f32; 3],
    pub specular_color: [f32; 3],
    pub shininess: f32,
    pub specular_model: SpecularModel,
}

impl From<&MaterialConfig> for PhongMaterial {
    fn from(config: &MaterialConfig) -> Self {
        Self {
            light_position: Vector3::new(0.0, 0.0, 0.0),
            ambient_intensity: config.ambient_intensity,
            diffuse_color: config.diffuse_color,
            specular_color: config.specular_color,
            shininess: config.shininess,
            specular_model: config.specular_model,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    pub position: Vector3<f32>,
    pub color: [f32; 3],
    pub intensity: f32,
    pub range: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlowCube {
    pub position: Vector3<f32>,
    /// Accumulated rotation around x in radians.
    pub rotation_x: f32,
    /// Accumulated rotation around y in radians.
    pub rotation_y: f32,
}

impl GlowCube {
    pub fn instance(&self) -> Instance {
        let rotation = cgmath::Quaternion::from(cgmath::Euler {
            x: Rad(self.rotation_x),
            y: Rad(self.rotation_y),
            z: Rad(0.0),
        });
        Instance {
            position: self.position,
            rotation,
            ..Default::default()
        }
    }
}

/// An extruded string placed in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub text: String,
    pub material: MaterialSlot,
    pub transform: Instance,
    pub geometry: MeshData,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FontState {
    Pending,
    /// Holds the family name reported by the font, if any.
    Loaded(Option<String>),
    /// Holds the rendered error.
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug)]
pub struct Scene {
    config: SceneConfig,
    pub camera: Camera,
    pub projection: Projection,
    pub controller: OrbitController,
    viewport: Viewport,
    pub cube: GlowCube,
    pub light: PointLight,
    letter: PhongMaterial,
    number: PhongMaterial,
    labels: Vec<TextLabel>,
    font: FontState,
}

impl Scene {
    pub fn new(config: SceneConfig, width: u32, height: u32) -> Self {
        let target = Point3::from(config.camera.target);
        let camera = Camera::new(config.camera.position, target);
        let projection = Projection::from_config(width, height, &config.camera);
        let cube = GlowCube {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation_x: 0.0,
            rotation_y: 0.0,
        };
        let light = PointLight {
            position: config.light.position.into(),
            color: config.light.color,
            intensity: config.light.intensity,
            range: config.light.range,
        };
        let mut letter = PhongMaterial::from(&config.letter);
        let mut number = PhongMaterial::from(&config.number);
        letter.light_position = cube.position;
        number.light_position = cube.position;

        log::info!(
            "scene `{}` created at {}x{}, light sync {:?}",
            config.variant,
            width,
            height,
            config.light_sync
        );

        Self {
            controller: OrbitController::new(target),
            viewport: Viewport { width, height },
            camera,
            projection,
            cube,
            light,
            letter,
            number,
            labels: Vec::new(),
            font: FontState::Pending,
            config,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn labels(&self) -> &[TextLabel] {
        &self.labels
    }

    pub fn font_state(&self) -> &FontState {
        &self.font
    }

    pub fn material(&self, slot: MaterialSlot) -> &PhongMaterial {
        match slot {
            MaterialSlot::Letter => &self.letter,
            MaterialSlot::Number => &self.number,
        }
    }

    pub fn clear_colour(&self) -> wgpu::Color {
        self.config.clear_colour()
    }

    /// Maps a logical key to an action and applies it. Returns `false` for
    /// unbound keys, which leave the scene untouched.
    pub fn handle_key(&mut self, key: &Key) -> bool {
        match InputAction::from_key(key) {
            Some(action) => {
                self.handle_action(action);
                true
            }
            None => false,
        }
    }

    pub fn handle_action(&mut self, action: InputAction) {
        let step = self.config.move_step;
        match action {
            InputAction::CubeUp => self.move_cube(step),
            InputAction::CubeDown => self.move_cube(-step),
            InputAction::CameraLeft => self.camera.position.x -= step,
            InputAction::CameraRight => self.camera.position.x += step,
        }
    }

    fn move_cube(&mut self, dy: f32) {
        self.cube.position.y += dy;
        if self.config.light_sync == LightSync::OnKeypress {
            self.light.position.y = self.cube.position.y;
        }
    }

    /// Forwards mouse input to the orbit controls. Returns `true` if the camera moved.
    pub fn handle_pointer(&mut self, event: &WindowEvent) -> bool {
        self.controller.handle_window_event(&mut self.camera, event)
    }

    /// Applies a new viewport size. Zero sizes and unchanged sizes are
    /// ignored; returns `true` if the projection changed.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        let viewport = Viewport { width, height };
        if viewport == self.viewport {
            return false;
        }
        self.viewport = viewport;
        self.projection.resize(width, height);
        true
    }

    /// Per frame update, run before every redraw.
    pub fn update(&mut self) {
        let spin = self.config.cube_spin_per_frame;
        self.cube.rotation_x += spin;
        self.cube.rotation_y += spin;

        self.letter.light_position = self.cube.position;
        self.number.light_position = self.cube.position;

        if self.config.light_sync == LightSync::EveryFrame {
            self.light.position = self.cube.position;
            self.light.intensity = self.config.light.intensity;
        }
    }

    /// Consumes the result of the one-shot font load.
    ///
    /// On success every configured label is built; if any of them fails no
    /// label is added. Failures are logged and kept in [`FontState::Failed`],
    /// the scene keeps rendering without text.
    pub fn on_font_loaded(&mut self, result: Result<Font, FontError>) {
        if self.font != FontState::Pending {
            log::warn!("font already resolved ({:?}), ignoring second result", self.font);
            return;
        }
        match result.and_then(|font| self.build_labels(&font).map(|labels| (font, labels))) {
            Ok((font, labels)) => {
                log::info!(
                    "font {:?} loaded, built {} text meshes",
                    font.family_name.as_deref().unwrap_or("<unnamed>"),
                    labels.len()
                );
                self.labels = labels;
                self.font = FontState::Loaded(font.family_name);
            }
            Err(e) => {
                log::error!("could not load font from {}: {}", self.config.font_source, e);
                self.font = FontState::Failed(e.to_string());
            }
        }
    }

    fn build_labels(&self, font: &Font) -> Result<Vec<TextLabel>, FontError> {
        self.config
            .labels
            .iter()
            .map(|label| {
                let geometry = text_mesh(font, &label.text, &self.config.text)?;
                Ok(TextLabel {
                    text: label.text.clone(),
                    material: label.material,
                    transform: Instance::from(Vector3::new(label.offset_x, 0.0, 0.0)),
                    geometry,
                })
            })
            .collect()
    }
}
