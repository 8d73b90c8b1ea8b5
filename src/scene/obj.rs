//! Wavefront OBJ loading
//!
//! Supports `v`, `vt`, `vn` and polygonal `f` records. Every face corner
//! becomes its own vertex; polygons are fanned into triangles. Tangents
//! are derived from UV gradients since OBJ does not carry them.

use std::fs;
use std::path::Path;

use crate::rasterizer::{MeshError, Vec2, Vec3, Vertex};

/// Load an OBJ file into a triangle-list vertex and index buffer
pub fn load_obj<P: AsRef<Path>>(path: P, flip_handedness: bool) -> Result<(Vec<Vertex>, Vec<u32>), MeshError> {
    let source = fs::read_to_string(path)?;
    parse_obj(&source, flip_handedness)
}

/// Parse OBJ text. With `flip_handedness`, Z is negated and the winding
/// reversed to turn right-handed data into left-handed.
pub fn parse_obj(source: &str, flip_handedness: bool) -> Result<(Vec<Vertex>, Vec<u32>), MeshError> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut uvs: Vec<Vec2> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();

    let mut vertices: Vec<Vertex> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    let z_sign = if flip_handedness { -1.0 } else { 1.0 };

    for (line_idx, raw) in source.lines().enumerate() {
        let line_no = line_idx + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some("v") => {
                let [x, y, z] = parse_floats::<3>(&mut tokens, line_no)?;
                positions.push(Vec3::new(x, y, z * z_sign));
            }
            Some("vt") => {
                let [u, v] = parse_floats::<2>(&mut tokens, line_no)?;
                // OBJ has V pointing up, images have row 0 at the top
                uvs.push(Vec2::new(u, 1.0 - v));
            }
            Some("vn") => {
                let [x, y, z] = parse_floats::<3>(&mut tokens, line_no)?;
                normals.push(Vec3::new(x, y, z * z_sign).normalize());
            }
            Some("f") => {
                let corners = tokens
                    .map(|t| parse_corner(t, &positions, &uvs, &normals, line_no))
                    .collect::<Result<Vec<_>, _>>()?;
                if corners.len() < 3 {
                    return Err(parse_error(line_no, "face needs at least 3 corners"));
                }

                for i in 1..corners.len() - 1 {
                    let mut tri = [corners[0], corners[i], corners[i + 1]];
                    if flip_handedness {
                        tri.swap(1, 2);
                    }

                    let face_normal = (tri[1].position - tri[0].position)
                        .cross(tri[2].position - tri[0].position)
                        .normalize();

                    for mut v in tri {
                        if v.normal == Vec3::ZERO {
                            v.normal = face_normal;
                        }
                        indices.push(vertices.len() as u32);
                        vertices.push(v);
                    }
                }
            }
            // Groups, objects, materials and smoothing are ignored
            _ => {}
        }
    }

    compute_tangents(&mut vertices, &indices);
    Ok((vertices, indices))
}

/// Accumulate per-triangle tangents from UV gradients, then orthogonalize
/// each against its vertex normal
pub fn compute_tangents(vertices: &mut [Vertex], indices: &[u32]) {
    let mut tangents = vec![Vec3::ZERO; vertices.len()];

    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let (v0, v1, v2) = (&vertices[i0], &vertices[i1], &vertices[i2]);

        let delta_pos1 = v1.position - v0.position;
        let delta_pos2 = v2.position - v0.position;
        let delta_uv1 = v1.uv - v0.uv;
        let delta_uv2 = v2.uv - v0.uv;

        let det = delta_uv1.cross(delta_uv2);
        if det.abs() < 1e-12 {
            continue;
        }
        let tangent = (delta_pos1 * delta_uv2.y - delta_pos2 * delta_uv1.y) * (1.0 / det);

        tangents[i0] += tangent;
        tangents[i1] += tangent;
        tangents[i2] += tangent;
    }

    for (vertex, tangent) in vertices.iter_mut().zip(tangents) {
        let n = vertex.normal;
        let mut t = (tangent - n * n.dot(tangent)).normalize();
        if t == Vec3::ZERO {
            // No usable UVs: any direction perpendicular to the normal
            let axis = if n.x.abs() < 0.9 { Vec3::UNIT_X } else { Vec3::UNIT_Y };
            t = (axis - n * n.dot(axis)).normalize();
        }
        vertex.tangent = t;
    }
}

fn parse_error(line: usize, reason: &str) -> MeshError {
    MeshError::Parse {
        line,
        reason: reason.to_string(),
    }
}

fn parse_floats<'a, const N: usize>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<[f32; N], MeshError> {
    let mut out = [0.0; N];
    for slot in out.iter_mut() {
        let token = tokens.next().ok_or_else(|| parse_error(line, "missing coordinate"))?;
        *slot = token
            .parse()
            .map_err(|_| parse_error(line, &format!("invalid number '{}'", token)))?;
    }
    Ok(out)
}

/// Resolve a 1-based (or negative, relative) OBJ index
fn resolve<T: Copy>(items: &[T], token: &str, line: usize) -> Result<T, MeshError> {
    let raw: i64 = token
        .parse()
        .map_err(|_| parse_error(line, &format!("invalid index '{}'", token)))?;
    let idx = if raw < 0 { items.len() as i64 + raw } else { raw - 1 };
    usize::try_from(idx)
        .ok()
        .and_then(|i| items.get(i).copied())
        .ok_or_else(|| parse_error(line, &format!("index {} out of range", raw)))
}

/// Parse one `v`, `v/vt`, `v//vn` or `v/vt/vn` face corner
fn parse_corner(
    token: &str,
    positions: &[Vec3],
    uvs: &[Vec2],
    normals: &[Vec3],
    line: usize,
) -> Result<Vertex, MeshError> {
    let mut parts = token.split('/');

    let position = resolve(positions, parts.next().unwrap_or(""), line)?;
    let uv = match parts.next() {
        Some(s) if !s.is_empty() => resolve(uvs, s, line)?,
        _ => Vec2::default(),
    };
    let normal = match parts.next() {
        Some(s) if !s.is_empty() => resolve(normals, s, line)?,
        _ => Vec3::ZERO,
    };

    Ok(Vertex::new(position, uv, normal, Vec3::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.001
    }

    const QUAD: &str = "\
# unit quad facing +Z
v -1 -1 0
v 1 -1 0
v 1 1 0
v -1 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn test_quad_is_fanned_into_two_triangles() {
        let (vertices, indices) = parse_obj(QUAD, false).unwrap();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(vertices.len(), 6);
        assert_eq!(vertices[3].position, Vec3::new(-1.0, -1.0, 0.0));
        assert_eq!(vertices[5].position, Vec3::new(-1.0, 1.0, 0.0));
    }

    #[test]
    fn test_v_coordinate_is_flipped() {
        let (vertices, _) = parse_obj(QUAD, false).unwrap();
        assert_eq!(vertices[0].uv, Vec2::new(0.0, 1.0));
        assert_eq!(vertices[2].uv, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_tangent_follows_u_and_is_orthonormal() {
        let (vertices, _) = parse_obj(QUAD, false).unwrap();
        for v in &vertices {
            assert!(approx(v.tangent.x, 1.0), "{:?}", v.tangent);
            assert!(approx(v.tangent.dot(v.normal), 0.0));
        }
    }

    #[test]
    fn test_flip_handedness_negates_z_and_winding() {
        let (vertices, _) = parse_obj(QUAD, true).unwrap();
        assert!(approx(vertices[0].normal.z, -1.0));
        // Corners 1 and 2 of the first triangle are swapped
        assert_eq!(vertices[1].position, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(vertices[2].position, Vec3::new(1.0, -1.0, 0.0));
    }

    #[test]
    fn test_missing_normals_use_face_normal() {
        let src = "v 0 0 0\nv 0 1 0\nv 1 0 0\nf 1 2 3\n";
        let (vertices, _) = parse_obj(src, false).unwrap();
        assert!(approx(vertices[0].normal.z, -1.0));
        assert!(approx(vertices[0].tangent.len(), 1.0));
    }

    #[test]
    fn test_negative_indices_are_relative() {
        let src = "v 0 0 0\nv 0 1 0\nv 1 0 0\nf -3 -2 -1\n";
        let (vertices, _) = parse_obj(src, false).unwrap();
        assert_eq!(vertices[2].position, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_out_of_range_index_reports_line() {
        let src = "v 0 0 0\nv 0 1 0\nf 1 2 3\n";
        let err = parse_obj(src, false).unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 3, .. }), "{err}");
    }

    #[test]
    fn test_bad_number_is_parse_error() {
        let err = parse_obj("v 0 zero 0\n", false).unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 1, .. }));
    }
}
