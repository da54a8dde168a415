//! Perspective camera, projection and orbit controls.
//!
//! The camera stores a position and a viewing direction. Keyboard movement
//! translates the position without turning the camera; orbiting with the
//! mouse re-aims it at the controller's target.

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::config::CameraConfig;

// cgmath builds OpenGL clip space (z in -1..1); wgpu expects z in 0..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    /// Unit viewing direction.
    pub direction: Vector3<f32>,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>>(position: P, target: Point3<f32>) -> Self {
        let position = position.into();
        let direction = (target - position).normalize();
        Self {
            position,
            direction,
        }
    }

    pub fn look_at(&mut self, target: Point3<f32>) {
        let to_target = target - self.position;
        if to_target.magnitude2() > f32::EPSILON {
            self.direction = to_target.normalize();
        }
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.direction, Vector3::unit_y())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn from_config(width: u32, height: u32, config: &CameraConfig) -> Self {
        Self::new(
            width,
            height,
            cgmath::Deg(config.fov_y_degrees),
            config.znear,
            config.zfar,
        )
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Camera uniform buffer and its bind group (group 0 of every pipeline).
#[derive(Debug)]
pub struct CameraResources {
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(device: &wgpu::Device) -> Self {
        use wgpu::util::DeviceExt;

        let uniform = CameraUniform::new();
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout =
            crate::pipelines::basic::mk_uniform_layout(device, "camera_bind_group_layout");
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn update(&mut self, queue: &wgpu::Queue, camera: &Camera, projection: &Projection) {
        self.uniform.update_view_proj(camera, projection);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

/// Mouse orbit controls around a fixed target.
///
/// Left-drag rotates the camera on a sphere around `target`, the wheel moves
/// it closer or further away. The controller only touches the camera while
/// the user interacts with it.
#[derive(Debug, Clone)]
pub struct OrbitController {
    pub target: Point3<f32>,
    /// Radians per dragged pixel.
    pub rotate_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    dragging: bool,
    cursor: Option<(f64, f64)>,
}

impl OrbitController {
    const POLE_MARGIN: f32 = 0.01;

    pub fn new(target: Point3<f32>) -> Self {
        Self {
            target,
            rotate_speed: 0.005,
            min_distance: 1.0,
            max_distance: 100.0,
            dragging: false,
            cursor: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Feeds a window event to the controller. Returns `true` if the camera moved.
    pub fn handle_window_event(&mut self, camera: &mut Camera, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = *state == ElementState::Pressed;
                false
            }
            WindowEvent::CursorMoved { position, .. } => {
                let current = (position.x, position.y);
                let previous = self.cursor.replace(current);
                match previous {
                    Some((x, y)) if self.dragging => {
                        self.orbit(camera, (current.0 - x) as f32, (current.1 - y) as f32);
                        true
                    }
                    _ => false,
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.dragging = false;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                };
                self.zoom(camera, steps);
                steps != 0.0
            }
            _ => false,
        }
    }

    /// Rotates the camera around the target by a cursor delta in pixels.
    pub fn orbit(&self, camera: &mut Camera, dx: f32, dy: f32) {
        let offset = camera.position - self.target;
        let radius = offset.magnitude();
        if radius <= f32::EPSILON {
            return;
        }
        let theta = offset.x.atan2(offset.z) - dx * self.rotate_speed;
        let phi = ((offset.y / radius).clamp(-1.0, 1.0).acos() - dy * self.rotate_speed).clamp(
            Self::POLE_MARGIN,
            std::f32::consts::PI - Self::POLE_MARGIN,
        );
        camera.position = self.target
            + Vector3::new(
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
                radius * phi.sin() * theta.cos(),
            );
        camera.look_at(self.target);
    }

    /// Positive steps move towards the target.
    pub fn zoom(&self, camera: &mut Camera, steps: f32) {
        let offset = camera.position - self.target;
        let radius = offset.magnitude();
        if radius <= f32::EPSILON || steps == 0.0 {
            return;
        }
        let scaled = (radius * 0.95f32.powf(steps)).clamp(self.min_distance, self.max_distance);
        camera.position = self.target + offset * (scaled / radius);
        camera.look_at(self.target);
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use cgmath::{EuclideanSpace, MetricSpace};

    use super::*;

    fn default_camera() -> Camera {
        Camera::new((0.0, 0.0, 5.0), Point3::origin())
    }

    #[test]
    fn camera_looks_down_negative_z() {
        let camera = default_camera();
        assert_relative_eq!(camera.direction, -Vector3::unit_z());
    }

    #[test]
    fn projection_tracks_aspect() {
        let mut projection = Projection::new(800, 600, cgmath::Deg(75.0), 0.1, 1000.0);
        assert_relative_eq!(projection.aspect(), 800.0 / 600.0);
        projection.resize(1920, 1080);
        assert_relative_eq!(projection.aspect(), 1920.0 / 1080.0);
    }

    #[test]
    fn origin_lands_in_view_volume() {
        let camera = default_camera();
        let projection = Projection::new(800, 600, cgmath::Deg(75.0), 0.1, 1000.0);
        let clip = projection.calc_matrix() * camera.calc_matrix() * cgmath::Vector4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert_relative_eq!(ndc.x, 0.0);
        assert_relative_eq!(ndc.y, 0.0);
        assert!(ndc.z > 0.0 && ndc.z < 1.0, "{}", ndc.z);
    }

    #[test]
    fn orbit_keeps_distance_and_faces_target() {
        let controller = OrbitController::new(Point3::origin());
        let mut camera = default_camera();
        controller.orbit(&mut camera, 120.0, -40.0);
        assert_relative_eq!(camera.position.distance(Point3::origin()), 5.0, epsilon = 1e-4);
        let to_target = (Point3::origin() - camera.position).normalize();
        assert_relative_eq!(camera.direction, to_target, epsilon = 1e-5);
        assert!(camera.position.x < 0.0);
    }

    #[test]
    fn orbit_does_not_flip_over_the_pole() {
        let controller = OrbitController::new(Point3::origin());
        let mut camera = default_camera();
        controller.orbit(&mut camera, 0.0, 10_000.0);
        assert!(camera.position.y > 0.0);
        assert!(camera.position.x.abs() < 1e-3);
    }

    #[test]
    fn zoom_is_clamped() {
        let controller = OrbitController::new(Point3::origin());
        let mut camera = default_camera();
        controller.zoom(&mut camera, 1_000.0);
        assert_relative_eq!(camera.position.z, controller.min_distance, epsilon = 1e-5);
        controller.zoom(&mut camera, -1_000.0);
        assert_relative_eq!(camera.position.z, controller.max_distance, epsilon = 1e-3);
    }
}
