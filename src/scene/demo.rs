//! Built-in scene used when no scene file is present
//!
//! A textured cube (triangle list) resting on a ground quad (triangle
//! strip), with procedurally generated texture maps.

use crate::rasterizer::{
    Camera, Color, Light, Material, Mesh, MeshError, PrimitiveTopology, Texture, Vec2, Vec3, Vertex,
    HEIGHT, WIDTH,
};
use super::Scene;

/// Create a unit cube, each face wound clockwise as seen from outside
pub fn create_test_cube() -> Result<Mesh, MeshError> {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    let normals = [
        Vec3::new(0.0, 0.0, -1.0), // Front
        Vec3::new(0.0, 0.0, 1.0),  // Back
        Vec3::new(0.0, 1.0, 0.0),  // Top
        Vec3::new(0.0, -1.0, 0.0), // Bottom
        Vec3::new(1.0, 0.0, 0.0),  // Right
        Vec3::new(-1.0, 0.0, 0.0), // Left
    ];

    for normal in normals {
        // Face basis as seen by a viewer looking at it
        let look = -normal;
        let hint = if normal.y.abs() > 0.5 { Vec3::UNIT_Z } else { Vec3::UNIT_Y };
        let right = hint.cross(look).normalize();
        let up = look.cross(right);

        let corners = [
            (normal - right + up, Vec2::new(0.0, 0.0)),
            (normal + right + up, Vec2::new(1.0, 0.0)),
            (normal + right - up, Vec2::new(1.0, 1.0)),
            (normal - right - up, Vec2::new(0.0, 1.0)),
        ];

        let base = vertices.len() as u32;
        for (pos, uv) in corners {
            vertices.push(Vertex::new(pos, uv, normal, right));
        }

        // Two triangles per face
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Mesh::new(vertices, indices, PrimitiveTopology::TriangleList)
}

/// Square ground plane facing +Y, as a four-vertex strip
pub fn create_ground(half_size: f32, height: f32) -> Result<Mesh, MeshError> {
    let tangent = Vec3::UNIT_X;
    let corner = |x: f32, z: f32, u: f32, v: f32| {
        Vertex::new(Vec3::new(x * half_size, height, z * half_size), Vec2::new(u, v), Vec3::UNIT_Y, tangent)
    };

    // Far-left, far-right, near-left, near-right
    let vertices = vec![
        corner(-1.0, 1.0, 0.0, 0.0),
        corner(1.0, 1.0, 1.0, 0.0),
        corner(-1.0, -1.0, 0.0, 1.0),
        corner(1.0, -1.0, 1.0, 1.0),
    ];

    Mesh::new(vertices, vec![0, 1, 2, 3], PrimitiveTopology::TriangleStrip)
}

/// Normal map with raised square tiles: flat centers, beveled borders
fn tile_normal_map(size: usize, tile: usize) -> Texture {
    let flat = Color::new(128, 128, 255);
    let mut tex = Texture::solid(size, size, flat);
    let tilt = 90;

    for y in 0..size {
        for x in 0..size {
            let (tx, ty) = (x % tile, y % tile);
            let color = if tx == 0 {
                Color::new(128 - tilt, 128, 230)
            } else if tx == tile - 1 {
                Color::new(128 + tilt, 128, 230)
            } else if ty == 0 {
                Color::new(128, 128 - tilt, 230)
            } else if ty == tile - 1 {
                Color::new(128, 128 + tilt, 230)
            } else {
                flat
            };
            tex.pixels[y * size + x] = color;
        }
    }

    tex.name = "tiles_normal".to_string();
    tex
}

fn demo_material() -> Material {
    Material {
        diffuse: Texture::checkerboard(64, 64, Color::new(200, 120, 60), Color::new(90, 90, 110)),
        normal: tile_normal_map(64, 8),
        specular: Texture::solid(1, 1, Color::new(180, 180, 180)),
        gloss: Texture::checkerboard(64, 64, Color::new(255, 255, 255), Color::new(70, 70, 70)),
    }
}

/// Assemble the demo scene
pub fn demo_scene() -> Result<Scene, MeshError> {
    let cube = create_test_cube()?;
    let ground = create_ground(6.0, -1.0)?;

    Ok(Scene {
        width: WIDTH,
        height: HEIGHT,
        camera: Camera::new(WIDTH as f32 / HEIGHT as f32, 60.0, Vec3::new(0.0, 1.0, -6.0)),
        meshes: vec![cube, ground],
        material: Some(demo_material()),
        light: Light::default(),
    })
}
