//! Extruded text meshes.
//!
//! Glyph outlines are flattened into closed contours, the front and back caps
//! are tessellated with an even-odd fill and every contour edge becomes a wall
//! quad. The front cap sits at `z = depth` facing +z, the back cap at `z = 0`.

use cgmath::{InnerSpace, Point2, Vector3};
use lyon_tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, VertexBuffers,
    math::point, path::Path,
};

use crate::{
    config::TextConfig,
    data_structures::model::{MeshData, ModelVertex},
    resources::font::{Font, FontError, PathCommand},
};

/// A closed polyline; the closing edge from the last to the first point is implicit.
pub type Contour = Vec<Point2<f32>>;

const EPSILON: f32 = 1e-6;

/// Builds the extruded mesh for `text`.
pub fn text_mesh(font: &Font, text: &str, options: &TextConfig) -> Result<MeshData, FontError> {
    let commands = font.layout(text, options.size)?;
    let contours = flatten(&commands, options.curve_segments.max(1));
    extrude(&contours, options.depth)
}

/// Turns path commands into closed contours, approximating every curve with
/// `segments` straight pieces.
pub fn flatten(commands: &[PathCommand], segments: u32) -> Vec<Contour> {
    let mut contours = Vec::new();
    let mut current: Contour = Vec::new();

    for command in commands {
        match *command {
            PathCommand::MoveTo(p) => {
                close_contour(std::mem::take(&mut current), &mut contours);
                current.push(p);
            }
            PathCommand::LineTo(p) => current.push(p),
            PathCommand::QuadTo { ctrl, to } => {
                let from = current.last().copied().unwrap_or(to);
                current.extend((1..=segments).map(|i| {
                    let t = i as f32 / segments as f32;
                    let mt = 1.0 - t;
                    Point2::new(
                        mt * mt * from.x + 2.0 * mt * t * ctrl.x + t * t * to.x,
                        mt * mt * from.y + 2.0 * mt * t * ctrl.y + t * t * to.y,
                    )
                }));
            }
            PathCommand::CubicTo { ctrl1, ctrl2, to } => {
                let from = current.last().copied().unwrap_or(to);
                current.extend((1..=segments).map(|i| {
                    let t = i as f32 / segments as f32;
                    let mt = 1.0 - t;
                    let (a, b, c, d) = (mt * mt * mt, 3.0 * mt * mt * t, 3.0 * mt * t * t, t * t * t);
                    Point2::new(
                        a * from.x + b * ctrl1.x + c * ctrl2.x + d * to.x,
                        a * from.y + b * ctrl1.y + c * ctrl2.y + d * to.y,
                    )
                }));
            }
        }
    }
    close_contour(current, &mut contours);
    contours
}

fn close_contour(mut contour: Contour, contours: &mut Vec<Contour>) {
    contour.dedup_by(|a, b| same_point(*a, *b));
    while contour.len() > 1 && same_point(contour[0], contour[contour.len() - 1]) {
        contour.pop();
    }
    if contour.len() >= 3 && signed_area(&contour).abs() > EPSILON {
        contours.push(contour);
    }
}

fn same_point(a: Point2<f32>, b: Point2<f32>) -> bool {
    (a.x - b.x).abs() <= EPSILON && (a.y - b.y).abs() <= EPSILON
}

/// Shoelace area; positive for counter-clockwise contours.
pub fn signed_area(contour: &[Point2<f32>]) -> f32 {
    let n = contour.len();
    (0..n)
        .map(|i| {
            let (a, b) = (contour[i], contour[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum::<f32>()
        / 2.0
}

/// Even-odd point in polygon test.
fn contains(contour: &[Point2<f32>], p: Point2<f32>) -> bool {
    let n = contour.len();
    let mut inside = false;
    for i in 0..n {
        let (a, b) = (contour[i], contour[(i + n - 1) % n]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
    }
    inside
}

/// A contour is a hole when an odd number of other contours enclose it.
fn is_hole(contours: &[Contour], index: usize) -> bool {
    let probe = contours[index][0];
    contours
        .iter()
        .enumerate()
        .filter(|(other, contour)| *other != index && contains(contour, probe))
        .count()
        % 2
        == 1
}

/// Pushes a triangle wound so that its front face points along `facing`.
/// Zero-area triangles are dropped.
fn push_facing(data: &mut MeshData, [a, b, c]: [u32; 3], facing: Vector3<f32>) {
    let position = |i: u32| Vector3::from(data.vertices[i as usize].position);
    let normal = (position(b) - position(a)).cross(position(c) - position(a));
    if normal.magnitude() <= EPSILON {
        return;
    }
    if normal.dot(facing) > 0.0 {
        data.indices.extend_from_slice(&[a, b, c]);
    } else {
        data.indices.extend_from_slice(&[a, c, b]);
    }
}

/// Extrudes closed contours from `z = 0` to `z = depth`.
pub fn extrude(contours: &[Contour], depth: f32) -> Result<MeshData, FontError> {
    let mut data = MeshData::default();
    if contours.is_empty() {
        return Ok(data);
    }

    let caps = tessellate(contours)?;
    for (z, facing) in [(depth, Vector3::unit_z()), (0.0, -Vector3::unit_z())] {
        let base = data.vertices.len() as u32;
        data.vertices
            .extend(caps.vertices.iter().map(|&[x, y]| ModelVertex {
                position: [x, y, z],
                normal: facing.into(),
                tex_coords: [x, y],
            }));
        for tri in caps.indices.chunks_exact(3) {
            push_facing(&mut data, [base + tri[0], base + tri[1], base + tri[2]], facing);
        }
    }

    for (index, contour) in contours.iter().enumerate() {
        let counter_clockwise = signed_area(contour) > 0.0;
        let hole = is_hole(contours, index);
        let n = contour.len();
        for i in 0..n {
            let (a, b) = (contour[i], contour[(i + 1) % n]);
            let edge = b - a;
            let length = edge.magnitude();
            if length <= EPSILON {
                continue;
            }
            // Solid lies left of a CCW outer edge and right of a CCW hole edge.
            let right = Vector3::new(edge.y, -edge.x, 0.0) / length;
            let outward = if counter_clockwise != hole { right } else { -right };

            let base = data.vertices.len() as u32;
            let corners = [(a, 0.0), (b, 0.0), (b, depth), (a, depth)];
            data.vertices.extend(corners.iter().enumerate().map(|(corner, (p, z))| {
                ModelVertex {
                    position: [p.x, p.y, *z],
                    normal: outward.into(),
                    tex_coords: [if corner == 1 || corner == 2 { length } else { 0.0 }, *z],
                }
            }));
            push_facing(&mut data, [base, base + 1, base + 2], outward);
            push_facing(&mut data, [base, base + 2, base + 3], outward);
        }
    }
    Ok(data)
}

fn tessellate(contours: &[Contour]) -> Result<VertexBuffers<[f32; 2], u32>, FontError> {
    let mut builder = Path::builder();
    for contour in contours {
        builder.begin(point(contour[0].x, contour[0].y));
        for p in &contour[1..] {
            builder.line_to(point(p.x, p.y));
        }
        builder.end(true);
    }
    let path = builder.build();

    let mut buffers: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();
    FillTessellator::new()
        .tessellate_path(
            &path,
            &FillOptions::tolerance(0.001).with_fill_rule(FillRule::EvenOdd),
            &mut BuffersBuilder::new(&mut buffers, |vertex: FillVertex| {
                vertex.position().to_array()
            }),
        )
        .map_err(|e| FontError::Tessellation(format!("{:?}", e)))?;
    Ok(buffers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: f32, max: f32) -> Contour {
        vec![
            Point2::new(min, min),
            Point2::new(max, min),
            Point2::new(max, max),
            Point2::new(min, max),
        ]
    }

    fn centroid(data: &MeshData, tri: &[u32]) -> Vector3<f32> {
        tri.iter()
            .map(|&i| Vector3::from(data.vertices[i as usize].position))
            .fold(Vector3::new(0.0, 0.0, 0.0), |acc, p| acc + p)
            / 3.0
    }

    fn assert_faces_match_normals(data: &MeshData) {
        for tri in data.indices.chunks_exact(3) {
            let p = |k: usize| Vector3::from(data.vertices[tri[k] as usize].position);
            let geometric = (p(1) - p(0)).cross(p(2) - p(0));
            let stored = Vector3::from(data.vertices[tri[0] as usize].normal);
            assert!(geometric.dot(stored) > 0.0, "triangle {:?} faces inwards", tri);
        }
    }

    #[test]
    fn flattens_curves_into_segments() {
        let commands = [
            PathCommand::MoveTo(Point2::new(0.0, 0.0)),
            PathCommand::LineTo(Point2::new(1.0, 0.0)),
            PathCommand::QuadTo {
                ctrl: Point2::new(1.0, 1.0),
                to: Point2::new(0.0, 1.0),
            },
        ];
        let contours = flatten(&commands, 4);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].len(), 2 + 4);
        assert_eq!(contours[0][5], Point2::new(0.0, 1.0));
    }

    #[test]
    fn drops_closing_duplicates_and_degenerate_contours() {
        let commands = [
            PathCommand::MoveTo(Point2::new(0.0, 0.0)),
            PathCommand::LineTo(Point2::new(1.0, 0.0)),
            PathCommand::LineTo(Point2::new(1.0, 1.0)),
            PathCommand::LineTo(Point2::new(0.0, 0.0)),
            PathCommand::MoveTo(Point2::new(5.0, 5.0)),
            PathCommand::LineTo(Point2::new(6.0, 6.0)),
        ];
        let contours = flatten(&commands, 12);
        assert_eq!(contours, vec![vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
        ]]);
    }

    #[test]
    fn extrudes_a_square() {
        let data = extrude(&[square(0.0, 1.0)], 0.2).unwrap();
        let cap_triangles = tessellate(&[square(0.0, 1.0)]).unwrap().indices.len() / 3;
        assert!(cap_triangles >= 2);
        // both caps plus two triangles per wall
        assert_eq!(data.triangle_count(), 2 * cap_triangles + 4 * 2);
        assert_eq!(data.bounds(), Some(([0.0, 0.0, 0.0], [1.0, 1.0, 0.2])));
        assert_faces_match_normals(&data);
    }

    #[test]
    fn winding_does_not_change_outward_normals() {
        let mut clockwise = square(0.0, 1.0);
        clockwise.reverse();
        let cap_vertices = tessellate(&[clockwise.clone()]).unwrap().vertices.len();
        let data = extrude(&[clockwise], 0.2).unwrap();
        assert_faces_match_normals(&data);
        let walls = &data.vertices[2 * cap_vertices..];
        assert_eq!(walls.len(), 16);
        for v in walls {
            let centre_to_vertex = Vector3::new(v.position[0] - 0.5, v.position[1] - 0.5, 0.0);
            assert!(Vector3::from(v.normal).dot(centre_to_vertex) > 0.0);
        }
    }

    #[test]
    fn holes_stay_open() {
        let contours = [square(0.0, 3.0), square(1.0, 2.0)];
        assert!(!is_hole(&contours, 0));
        assert!(is_hole(&contours, 1));

        let data = extrude(&contours, 0.2).unwrap();
        assert_faces_match_normals(&data);
        for tri in data.indices.chunks_exact(3) {
            let c = centroid(&data, tri);
            let in_hole = c.x > 1.0 + 1e-3 && c.x < 2.0 - 1e-3 && c.y > 1.0 + 1e-3 && c.y < 2.0 - 1e-3;
            assert!(!in_hole, "triangle {:?} covers the hole", tri);
        }
        // hole walls point towards the hole's centre
        let hole_walls = &data.vertices[data.vertices.len() - 16..];
        for v in hole_walls {
            let from_centre = Vector3::new(v.position[0] - 1.5, v.position[1] - 1.5, 0.0);
            assert!(Vector3::from(v.normal).dot(from_centre) < 0.0);
        }
    }

    #[test]
    fn collinear_triangles_are_dropped() {
        let mut data = MeshData::default();
        data.vertices.extend(
            [[0.45, 0.9, 0.2], [0.0, 0.9, 0.2], [0.6, 0.9, 0.2], [0.0, 0.0, 0.2]]
                .iter()
                .map(|&position| ModelVertex {
                    position,
                    normal: [0.0, 0.0, 1.0],
                    tex_coords: [0.0, 0.0],
                }),
        );
        push_facing(&mut data, [0, 1, 2], Vector3::unit_z());
        assert!(data.indices.is_empty());
        push_facing(&mut data, [1, 2, 3], Vector3::unit_z());
        assert_eq!(data.triangle_count(), 1);
        assert_faces_match_normals(&data);
    }

    #[test]
    fn empty_text_builds_empty_mesh() {
        let data = extrude(&[], 0.2).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn builds_text_from_font() {
        let font = Font::from_json(
            r#"{ "resolution": 1000, "glyphs": {
                "7": { "ha": 600, "o": "m 0 1000 l 600 1000 l 600 900 l 250 0 l 120 0 l 450 900 l 0 900" }
            } }"#,
        )
        .unwrap();
        let data = text_mesh(&font, "7", &TextConfig::default()).unwrap();
        assert!(data.triangle_count() > 0);
        let (min, max) = data.bounds().unwrap();
        assert!(min[0] >= -1e-5 && max[0] <= 0.6 + 1e-5);
        assert!((max[2] - 0.2).abs() < 1e-6);
        assert_faces_match_normals(&data);
    }
}
