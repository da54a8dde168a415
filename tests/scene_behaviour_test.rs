use approx::assert_relative_eq;
use cgmath::InnerSpace;
use glyph_glow::{
    config::{MaterialSlot, SceneConfig, Variant},
    input::InputAction,
    resources::font::{Font, FontError, load_font},
    scene::{FontState, Scene},
};
use winit::{
    event::ElementState,
    keyboard::{Key, NamedKey},
};

use crate::common::test_utils::{
    FONT_WITHOUT_SEVEN, cursor_at, cursor_left, font, key, left_button, loaded_scene, scene,
    wheel_lines,
};

mod common;

fn snapshot(scene: &Scene) -> (cgmath::Vector3<f32>, cgmath::Vector3<f32>, cgmath::Point3<f32>) {
    (scene.cube.position, scene.light.position, scene.camera.position)
}

#[test]
fn w_and_s_move_the_cube_by_one_step() {
    let mut scene = scene(Variant::Studio);
    assert!(scene.handle_key(&key("w")));
    assert_relative_eq!(scene.cube.position.y, 0.1);
    assert!(scene.handle_key(&key("s")));
    assert!(scene.handle_key(&key("s")));
    assert_relative_eq!(scene.cube.position.y, -0.1);
    assert_eq!(scene.cube.position.x, 0.0);
    assert_eq!(scene.cube.position.z, 0.0);
}

#[test]
fn a_and_d_move_the_camera_along_x() {
    let mut scene = scene(Variant::Studio);
    let start = scene.camera.position;
    assert!(scene.handle_key(&key("a")));
    assert_relative_eq!(scene.camera.position.x, start.x - 0.1);
    assert!(scene.handle_key(&key("d")));
    assert!(scene.handle_key(&key("d")));
    assert_relative_eq!(scene.camera.position.x, start.x + 0.1);
    assert_eq!(scene.camera.position.y, start.y);
    assert_eq!(scene.camera.position.z, start.z);
}

#[test]
fn other_keys_change_nothing() {
    let mut scene = scene(Variant::Studio);
    let before = snapshot(&scene);
    for other in [key("W"), key("x"), key(" "), Key::Named(NamedKey::ArrowUp)] {
        assert!(!scene.handle_key(&other), "{:?} should be unbound", other);
    }
    assert_eq!(snapshot(&scene), before);
}

#[test]
fn key_repeats_are_applied_every_time() {
    let mut scene = scene(Variant::Studio);
    for _ in 0..5 {
        scene.handle_action(InputAction::CubeUp);
    }
    assert_relative_eq!(scene.cube.position.y, 0.5, epsilon = 1e-6);
}

#[test]
fn font_produces_two_meshes_at_variant_offsets() {
    for (variant, letter_x) in [
        (Variant::Studio, -2.0),
        (Variant::Night, -3.0),
        (Variant::Fixed, -2.0),
    ] {
        let scene = loaded_scene(variant.config());
        let labels = scene.labels();
        assert_eq!(labels.len(), 2, "{}", variant);
        assert_eq!(labels[0].text, "A");
        assert_eq!(labels[0].material, MaterialSlot::Letter);
        assert_eq!(labels[0].transform.position.x, letter_x);
        assert_eq!(labels[1].text, "7");
        assert_eq!(labels[1].material, MaterialSlot::Number);
        assert_eq!(labels[1].transform.position.x, 2.0);
        assert!(labels.iter().all(|l| !l.geometry.is_empty()));
        assert_eq!(
            scene.font_state(),
            &FontState::Loaded(Some("Fixture Sans".to_string()))
        );
    }
}

#[test]
fn text_is_one_unit_tall_and_extruded() {
    let scene = loaded_scene(SceneConfig::studio());
    let (min, max) = scene.labels()[0].geometry.bounds().expect("non-empty text");
    assert_relative_eq!(min[1], 0.0, epsilon = 1e-5);
    assert_relative_eq!(max[1], 1.0, epsilon = 1e-5);
    assert_relative_eq!(min[2], 0.0, epsilon = 1e-5);
    assert_relative_eq!(max[2], 0.2, epsilon = 1e-5);
}

#[test]
fn resize_updates_aspect() {
    let mut scene = scene(Variant::Studio);
    assert!(scene.resize(1920, 1080));
    assert_relative_eq!(scene.projection.aspect(), 1920.0 / 1080.0);
    assert_eq!(scene.viewport().width, 1920);
    assert_eq!(scene.viewport().height, 1080);
}

#[test]
fn resize_to_same_size_is_a_no_op() {
    let mut scene = scene(Variant::Studio);
    assert!(scene.resize(1024, 768));
    let projection = scene.projection.clone();
    assert!(!scene.resize(1024, 768));
    assert_eq!(scene.projection, projection);
}

#[test]
fn zero_sized_resize_is_ignored() {
    let mut scene = scene(Variant::Studio);
    let projection = scene.projection.clone();
    assert!(!scene.resize(0, 600));
    assert!(!scene.resize(800, 0));
    assert_eq!(scene.projection, projection);
    assert_eq!(scene.viewport().width, 800);
}

#[test]
fn studio_light_follows_the_cube_on_keypress() {
    let mut scene = scene(Variant::Studio);
    scene.handle_key(&key("w"));
    assert_eq!(scene.light.position.y, scene.cube.position.y);
    scene.handle_key(&key("s"));
    scene.handle_key(&key("s"));
    assert_eq!(scene.light.position.y, scene.cube.position.y);
}

#[test]
fn night_light_follows_the_cube_after_a_frame() {
    let mut scene = scene(Variant::Night);
    scene.handle_key(&key("w"));
    scene.update();
    assert_eq!(scene.light.position, scene.cube.position);
    assert_eq!(scene.light.intensity, SceneConfig::night().light.intensity);
}

#[test]
fn fixed_light_never_follows_the_cube() {
    let mut scene = scene(Variant::Fixed);
    let start = scene.light.position;
    scene.handle_key(&key("w"));
    scene.update();
    assert_eq!(scene.light.position, start);
    assert_ne!(scene.light.position.y, scene.cube.position.y);
    // the shading still uses the cube position
    assert_eq!(
        scene.material(MaterialSlot::Letter).light_position,
        scene.cube.position
    );
}

#[test]
fn font_failure_leaves_no_meshes() {
    let mut scene = scene(Variant::Studio);
    scene.on_font_loaded(Err(FontError::MissingGlyph('A')));
    assert!(scene.labels().is_empty());
    assert!(matches!(scene.font_state(), FontState::Failed(_)));
    // the scene keeps running
    scene.update();
    scene.handle_key(&key("w"));
    assert_relative_eq!(scene.cube.position.y, 0.1);
}

#[test]
fn missing_glyph_without_fallback_adds_no_label() {
    let mut scene = scene(Variant::Studio);
    let font = Font::from_json(FONT_WITHOUT_SEVEN).expect("font parses");
    scene.on_font_loaded(Ok(font));
    assert!(scene.labels().is_empty());
    match scene.font_state() {
        FontState::Failed(reason) => assert!(reason.contains('7'), "{}", reason),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[test]
fn second_font_result_is_ignored() {
    let mut scene = loaded_scene(SceneConfig::studio());
    scene.on_font_loaded(Err(FontError::MissingGlyph('A')));
    assert_eq!(scene.labels().len(), 2);
    assert!(matches!(scene.font_state(), FontState::Loaded(_)));

    let mut failed = scene_with_failure();
    failed.on_font_loaded(Ok(font()));
    assert!(failed.labels().is_empty());
}

fn scene_with_failure() -> Scene {
    let mut scene = scene(Variant::Night);
    scene.on_font_loaded(Err(FontError::MissingGlyph('A')));
    scene
}

#[tokio::test]
async fn unreachable_font_file_fails_the_scene() {
    let mut scene = scene(Variant::Studio);
    let result = load_font("does/not/exist.typeface.json").await;
    assert!(matches!(result, Err(FontError::Load(_))));
    scene.on_font_loaded(result);
    assert!(scene.labels().is_empty());
    assert!(matches!(scene.font_state(), FontState::Failed(_)));
}

#[test]
fn left_drag_orbits_only_while_pressed() {
    let mut scene = scene(Variant::Studio);
    let start = scene.camera.position;

    // moving without a pressed button only tracks the cursor
    assert!(!scene.handle_pointer(&cursor_at(100.0, 100.0)));
    assert!(!scene.handle_pointer(&cursor_at(140.0, 100.0)));
    assert_eq!(scene.camera.position, start);

    assert!(!scene.handle_pointer(&left_button(ElementState::Pressed)));
    assert!(scene.controller.is_dragging());
    assert!(scene.handle_pointer(&cursor_at(180.0, 90.0)));
    assert!(scene.handle_pointer(&cursor_at(220.0, 80.0)));
    let orbited = scene.camera.position;
    assert_ne!(orbited, start);
    assert_relative_eq!(
        (orbited - scene.controller.target).magnitude(),
        (start - scene.controller.target).magnitude(),
        epsilon = 1e-4
    );

    assert!(!scene.handle_pointer(&left_button(ElementState::Released)));
    assert!(!scene.controller.is_dragging());
    assert!(!scene.handle_pointer(&cursor_at(300.0, 300.0)));
    assert_eq!(scene.camera.position, orbited);
}

#[test]
fn leaving_the_window_ends_the_drag() {
    let mut scene = scene(Variant::Studio);
    scene.handle_pointer(&left_button(ElementState::Pressed));
    scene.handle_pointer(&cursor_at(100.0, 100.0));
    assert!(!scene.handle_pointer(&cursor_left()));
    assert!(!scene.controller.is_dragging());

    let position = scene.camera.position;
    // the first move after re-entering only records the cursor
    assert!(!scene.handle_pointer(&cursor_at(10.0, 10.0)));
    assert!(!scene.handle_pointer(&cursor_at(50.0, 10.0)));
    assert_eq!(scene.camera.position, position);
}

#[test]
fn wheel_zooms_towards_the_target() {
    let mut scene = scene(Variant::Studio);
    let target = scene.controller.target;
    let before = (scene.camera.position - target).magnitude();
    assert!(scene.handle_pointer(&wheel_lines(2.0)));
    let after = (scene.camera.position - target).magnitude();
    assert!(after < before, "{} >= {}", after, before);
    assert!(!scene.handle_pointer(&wheel_lines(0.0)));
}
