//! Scene configuration and the three demo variants.
//!
//! The demo ships as three configurations of one scene. They differ in
//! background colour, material parameters, the x-offset of the letter and in
//! when the point light follows the glowing cube ([`LightSync`]). Everything
//! else (camera, text parameters, step sizes) is shared.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Typeface served by the three.js examples; fetched once at startup.
pub const DEFAULT_FONT_URL: &str =
    "https://threejs.org/examples/fonts/helvetiker_bold.typeface.json";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown variant `{0}`, expected one of: studio, night, fixed")]
    UnknownVariant(String),
}

/// The three shipped scene configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Grey background, light follows the cube on `w`/`s` only.
    #[default]
    Studio,
    /// Black background, letter further left, light re-synced every frame.
    Night,
    /// Dark background, the light never moves after creation.
    Fixed,
}

impl Variant {
    pub const ALL: [Variant; 3] = [Variant::Studio, Variant::Night, Variant::Fixed];

    pub fn name(self) -> &'static str {
        match self {
            Variant::Studio => "studio",
            Variant::Night => "night",
            Variant::Fixed => "fixed",
        }
    }

    pub fn config(self) -> SceneConfig {
        match self {
            Variant::Studio => SceneConfig::studio(),
            Variant::Night => SceneConfig::night(),
            Variant::Fixed => SceneConfig::fixed(),
        }
    }
}

impl FromStr for Variant {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Variant::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnknownVariant(wanted.to_string()))
    }
}

impl Variant {
    /// Reads `variant=<name>` from a URL query string such as `?variant=night`.
    /// Returns `Ok(None)` if the parameter is absent.
    pub fn from_query(query: &str) -> Result<Option<Self>, ConfigError> {
        query
            .trim_start_matches('?')
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "variant")
            .map(|(_, value)| value.parse())
            .transpose()
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// When the point light copies the cube's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightSync {
    /// Position and intensity are re-applied before every frame.
    EveryFrame,
    /// The light's y follows the cube whenever `w`/`s` moves it.
    OnKeypress,
    /// The light stays where it was created.
    Never,
}

/// Specular term used by a text material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecularModel {
    /// Phong: reflected light vector against the view vector.
    Plastic,
    /// Blinn: half vector against the surface normal.
    Metal,
}

impl SpecularModel {
    pub(crate) fn as_u32(self) -> u32 {
        match self {
            SpecularModel::Plastic => 0,
            SpecularModel::Metal => 1,
        }
    }
}

/// Which of the two text materials a label is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialSlot {
    Letter,
    Number,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialConfig {
    pub ambient_intensity: f32,
    pub diffuse_color: [f32; 3],
    pub specular_color: [f32; 3],
    pub shininess: f32,
    pub specular_model: SpecularModel,
}

impl MaterialConfig {
    pub fn plastic(diffuse_color: [f32; 3]) -> Self {
        Self {
            ambient_intensity: 0.656,
            diffuse_color,
            specular_color: [1.0, 1.0, 1.0],
            shininess: 20.0,
            specular_model: SpecularModel::Plastic,
        }
    }

    pub fn metal(color: [f32; 3]) -> Self {
        Self {
            ambient_intensity: 0.656,
            diffuse_color: color,
            specular_color: color,
            shininess: 50.0,
            specular_model: SpecularModel::Metal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelConfig {
    pub text: String,
    pub offset_x: f32,
    pub material: MaterialSlot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightConfig {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub intensity: f32,
    /// Distance at which the light's contribution reaches zero. `0.0` disables falloff.
    pub range: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextConfig {
    pub size: f32,
    pub depth: f32,
    pub curve_segments: u32,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            size: 1.0,
            depth: 0.2,
            curve_segments: 12,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub fov_y_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 5.0],
            target: [0.0, 0.0, 0.0],
            fov_y_degrees: 75.0,
            znear: 0.1,
            zfar: 1000.0,
        }
    }
}

/// Everything one scene variant needs; consumed by [`crate::scene::Scene::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    pub variant: Variant,
    /// sRGB hex colour, e.g. `0x7f7f7f`.
    pub background: u32,
    pub letter: MaterialConfig,
    pub number: MaterialConfig,
    pub labels: Vec<LabelConfig>,
    pub light: LightConfig,
    pub light_sync: LightSync,
    pub text: TextConfig,
    pub camera: CameraConfig,
    pub font_source: String,
    pub cube_size: f32,
    /// Radians added to the cube's x and y rotation every frame.
    pub cube_spin_per_frame: f32,
    /// Distance moved per `w`/`s`/`a`/`d` press.
    pub move_step: f32,
}

impl SceneConfig {
    fn base(variant: Variant) -> Self {
        Self {
            variant,
            background: 0x7f7f7f,
            letter: MaterialConfig::plastic([0.1, 0.1, 0.8]),
            number: MaterialConfig::metal([0.9, 0.8, 0.2]),
            labels: vec![
                LabelConfig {
                    text: "A".to_string(),
                    offset_x: -2.0,
                    material: MaterialSlot::Letter,
                },
                LabelConfig {
                    text: "7".to_string(),
                    offset_x: 2.0,
                    material: MaterialSlot::Number,
                },
            ],
            light: LightConfig {
                position: [0.0, 0.0, 0.0],
                color: [1.0, 1.0, 1.0],
                intensity: 1.0,
                range: 10.0,
            },
            light_sync: LightSync::OnKeypress,
            text: TextConfig::default(),
            camera: CameraConfig::default(),
            font_source: DEFAULT_FONT_URL.to_string(),
            cube_size: 0.5,
            cube_spin_per_frame: 0.02,
            move_step: 0.1,
        }
    }

    pub fn studio() -> Self {
        Self::base(Variant::Studio)
    }

    pub fn night() -> Self {
        let mut config = Self::base(Variant::Night);
        config.background = 0x000000;
        config.letter.ambient_intensity = 0.3;
        config.letter.diffuse_color = [0.2, 0.2, 0.9];
        config.number.ambient_intensity = 0.3;
        config.labels[0].offset_x = -3.0;
        config.light.intensity = 1.5;
        config.light_sync = LightSync::EveryFrame;
        config
    }

    pub fn fixed() -> Self {
        let mut config = Self::base(Variant::Fixed);
        config.background = 0x202020;
        config.number = MaterialConfig::plastic([0.9, 0.8, 0.2]);
        config.light.color = [1.0, 0.9, 0.7];
        config.light_sync = LightSync::Never;
        config
    }

    /// Background as a linear clear colour for an sRGB surface.
    pub fn clear_colour(&self) -> wgpu::Color {
        let channel = |shift: u32| srgb_to_linear(((self.background >> shift) & 0xff) as f64 / 255.0);
        wgpu::Color {
            r: channel(16),
            g: channel(8),
            b: channel(0),
            a: 1.0,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Variant::default().config()
    }
}

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_parses_case_insensitively() {
        assert_eq!("Night".parse::<Variant>(), Ok(Variant::Night));
        assert_eq!(" fixed ".parse::<Variant>(), Ok(Variant::Fixed));
        assert_eq!(
            "disco".parse::<Variant>(),
            Err(ConfigError::UnknownVariant("disco".to_string()))
        );
    }

    #[test]
    fn variant_from_query_string() {
        assert_eq!(Variant::from_query("?variant=night"), Ok(Some(Variant::Night)));
        assert_eq!(Variant::from_query("?debug=1&variant=fixed"), Ok(Some(Variant::Fixed)));
        assert_eq!(Variant::from_query(""), Ok(None));
        assert_eq!(Variant::from_query("?other=night"), Ok(None));
        assert!(Variant::from_query("?variant=disco").is_err());
    }

    #[test]
    fn every_variant_places_two_labels() {
        for variant in Variant::ALL {
            let config = variant.config();
            assert_eq!(config.variant, variant);
            assert_eq!(config.labels.len(), 2);
            assert_eq!(config.labels[1].offset_x, 2.0);
        }
        assert_eq!(SceneConfig::studio().labels[0].offset_x, -2.0);
        assert_eq!(SceneConfig::night().labels[0].offset_x, -3.0);
    }

    #[test]
    fn variants_differ_in_sync_policy() {
        assert_eq!(SceneConfig::studio().light_sync, LightSync::OnKeypress);
        assert_eq!(SceneConfig::night().light_sync, LightSync::EveryFrame);
        assert_eq!(SceneConfig::fixed().light_sync, LightSync::Never);
    }

    #[test]
    fn grey_background_maps_to_linear_mid_grey() {
        let colour = SceneConfig::studio().clear_colour();
        assert!((colour.r - 0.212).abs() < 0.001, "{}", colour.r);
        assert_eq!(colour.r, colour.g);
        assert_eq!(colour.g, colour.b);
        assert_eq!(SceneConfig::night().clear_colour().r, 0.0);
    }

    #[test]
    fn config_survives_json() {
        let config = SceneConfig::night();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"every_frame\""));
        let back: SceneConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
