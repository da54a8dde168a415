use cgmath::Vector3;

use crate::data_structures::model::{MeshData, ModelVertex};

/// An axis-aligned box centred on the origin with per-face normals and UVs.
///
/// Each face gets its own four vertices so the glow shader can use the face
/// UVs as a radial coordinate.
pub fn cube(size: f32) -> MeshData {
    let half = size / 2.0;
    // (normal, u axis, v axis) with u x v == normal, so faces wind CCW from outside.
    let faces = [
        (Vector3::unit_x(), -Vector3::unit_z(), Vector3::unit_y()),
        (-Vector3::unit_x(), Vector3::unit_z(), Vector3::unit_y()),
        (Vector3::unit_y(), Vector3::unit_x(), -Vector3::unit_z()),
        (-Vector3::unit_y(), Vector3::unit_x(), Vector3::unit_z()),
        (Vector3::unit_z(), Vector3::unit_x(), Vector3::unit_y()),
        (-Vector3::unit_z(), -Vector3::unit_x(), Vector3::unit_y()),
    ];
    let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

    let mut data = MeshData::default();
    for (normal, u, v) in faces {
        let base = data.vertices.len() as u32;
        for (su, sv) in corners {
            let position: Vector3<f32> = (normal + u * su + v * sv) * half;
            data.vertices.push(ModelVertex {
                position: position.into(),
                normal: normal.into(),
                tex_coords: [(su + 1.0) / 2.0, (1.0 - sv) / 2.0],
            });
        }
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    data
}
