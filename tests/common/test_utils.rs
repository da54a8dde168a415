use glyph_glow::{
    config::{SceneConfig, Variant},
    resources::font::Font,
    scene::Scene,
};
use winit::{
    dpi::PhysicalPosition,
    event::{DeviceId, ElementState, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent},
    keyboard::{Key, SmolStr},
};

/// Minimal typeface: an "A" with a triangular hole, a "7" and the fallback "?".
pub const FIXTURE_FONT: &str = r#"{
    "familyName": "Fixture Sans",
    "resolution": 1000,
    "underlineThickness": 50,
    "boundingBox": { "xMin": 0, "xMax": 700, "yMin": -200, "yMax": 1000 },
    "glyphs": {
        "A": { "ha": 700, "o": "m 0 0 l 700 0 l 350 1000 z m 250 200 l 350 500 l 450 200 z" },
        "7": { "ha": 600, "o": "m 0 1000 l 600 1000 l 600 900 l 250 0 l 120 0 l 450 900 l 0 900 z" },
        "?": { "ha": 400, "o": "m 100 0 l 300 0 l 300 200 l 100 200 z" }
    }
}"#;

/// Same font without "7" and without the fallback glyph.
pub const FONT_WITHOUT_SEVEN: &str = r#"{
    "resolution": 1000,
    "glyphs": {
        "A": { "ha": 700, "o": "m 0 0 l 700 0 l 350 1000 z" }
    }
}"#;

pub fn font() -> Font {
    Font::from_json(FIXTURE_FONT).expect("fixture font parses")
}

pub fn scene(variant: Variant) -> Scene {
    Scene::new(variant.config(), 800, 600)
}

pub fn loaded_scene(config: SceneConfig) -> Scene {
    let mut scene = Scene::new(config, 800, 600);
    scene.on_font_loaded(Ok(font()));
    scene
}

pub fn key(name: &str) -> Key {
    Key::Character(SmolStr::new(name))
}

fn device() -> DeviceId {
    // SAFETY: the events never reach a real event loop.
    unsafe { DeviceId::dummy() }
}

pub fn left_button(state: ElementState) -> WindowEvent {
    WindowEvent::MouseInput {
        device_id: device(),
        state,
        button: MouseButton::Left,
    }
}

pub fn cursor_at(x: f64, y: f64) -> WindowEvent {
    WindowEvent::CursorMoved {
        device_id: device(),
        position: PhysicalPosition::new(x, y),
    }
}

pub fn cursor_left() -> WindowEvent {
    WindowEvent::CursorLeft { device_id: device() }
}

pub fn wheel_lines(lines: f32) -> WindowEvent {
    WindowEvent::MouseWheel {
        device_id: device(),
        delta: MouseScrollDelta::LineDelta(0.0, lines),
        phase: TouchPhase::Moved,
    }
}
