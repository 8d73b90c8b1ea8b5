//! Core rendering functions
//! Vertex transformation, triangle rasterization with a depth buffer,
//! and the per-frame orchestration around them

use std::path::Path;

use thiserror::Error;

use super::camera::{Camera, LookInput, MoveInput};
use super::math::{barycentric, edge_function, Matrix, Vec2, Vec4};
use super::shading::{Light, Material, PixelShader, ShadingInput};
use super::types::{Color, ColorRGB, Mesh, RenderSettings, VertexOut};

/// Smallest clip-space w a vertex may have before its triangles are dropped
const MIN_CLIP_W: f32 = 1e-6;
/// Triangles with less screen area (in pixels) are culled
const MIN_AREA: f32 = 1.0;
/// Depth range stretched to full gray in depth visualization
const DEPTH_VIS_NEAR: f32 = 0.985;
const DEPTH_VIS_FAR: f32 = 1.0;
/// Mesh spin speed in radians per second
const ROTATION_SPEED: f32 = 1.0;

/// Error type for dumping the color buffer
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
}

/// Framebuffer for software rendering
pub struct Framebuffer {
    pub pixels: Vec<u8>,    // RGBA, 4 bytes per pixel
    pub zbuffer: Vec<f32>,  // Depth buffer
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height * 4],
            zbuffer: vec![f32::INFINITY; width * height],
            width,
            height,
        }
    }

    /// Fill with a color and reset every depth to +infinity
    pub fn clear(&mut self, color: Color) {
        let bytes = color.to_bytes();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&bytes);
        }
        self.zbuffer.fill(f32::INFINITY);
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 4;
            self.pixels[idx..idx + 4].copy_from_slice(&color.to_bytes());
        }
    }

    /// Write the color buffer to an image file (format from the extension)
    pub fn save_image<P: AsRef<Path>>(&self, path: P) -> Result<(), SaveError> {
        image::save_buffer(
            path,
            &self.pixels,
            self.width as u32,
            self.height as u32,
            image::ExtendedColorType::Rgba8,
        )?;
        Ok(())
    }
}

/// Project every vertex of `mesh` into screen space.
///
/// Positions go through world * view * projection and the perspective
/// divide; normals and tangents only through the world matrix.
pub fn transform_vertices(mesh: &mut Mesh, camera: &Camera, width: usize, height: usize) {
    let world_view_projection = mesh.world_matrix * camera.view_matrix * camera.projection_matrix;
    let world = mesh.world_matrix;

    mesh.vertices_out.clear();
    mesh.vertices_out.extend(mesh.vertices.iter().map(|v| {
        let clip = world_view_projection.transform_point4(v.position);

        // No near-plane clipping; w <= 0 is caught per triangle
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        let ndc_z = clip.z / clip.w;

        VertexOut {
            position: Vec4::new(
                (ndc_x + 1.0) / 2.0 * width as f32,
                (1.0 - ndc_y) / 2.0 * height as f32,
                ndc_z,
                clip.w,
            ),
            color: v.color,
            uv: v.uv,
            normal: world.transform_vector(v.normal),
            tangent: world.transform_vector(v.tangent),
        }
    }));
}

/// Fill one triangle. Returns the number of pixels written.
pub fn rasterize_triangle(
    fb: &mut Framebuffer,
    v0: &VertexOut,
    v1: &VertexOut,
    v2: &VertexOut,
    shader: &PixelShader,
) -> usize {
    let width = fb.width as f32;
    let height = fb.height as f32;
    let (p0, p1, p2) = (v0.position.xy(), v1.position.xy(), v2.position.xy());

    if v0.position.w <= MIN_CLIP_W || v1.position.w <= MIN_CLIP_W || v2.position.w <= MIN_CLIP_W {
        return 0;
    }

    // Whole triangle beyond one side of the screen
    let xs = [p0.x, p1.x, p2.x];
    let ys = [p0.y, p1.y, p2.y];
    if xs.iter().all(|&x| x < 0.0)
        || xs.iter().all(|&x| x > width)
        || ys.iter().all(|&y| y < 0.0)
        || ys.iter().all(|&y| y > height)
    {
        return 0;
    }

    // Back-facing, degenerate, or NaN
    let area = edge_function(p1, p2, p0);
    if !(area >= MIN_AREA) {
        return 0;
    }

    let min_x = xs.iter().copied().fold(f32::INFINITY, f32::min).floor().max(0.0) as usize;
    let min_y = ys.iter().copied().fold(f32::INFINITY, f32::min).floor().max(0.0) as usize;
    let max_x = (xs.iter().copied().fold(f32::NEG_INFINITY, f32::max).ceil().min(width)).max(0.0) as usize;
    let max_y = (ys.iter().copied().fold(f32::NEG_INFINITY, f32::max).ceil().min(height)).max(0.0) as usize;

    let mut written = 0;

    for y in min_y..max_y {
        for x in min_x..max_x {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);

            let Some([w0, w1, w2]) = barycentric(p, p0, p1, p2, area) else {
                continue;
            };

            // Depth test on interpolated NDC depth
            let z_interp = 1.0 / (w0 / v0.position.z + w1 / v1.position.z + w2 / v2.position.z);
            if !(0.0..=1.0).contains(&z_interp) {
                continue;
            }
            let idx = y * fb.width + x;
            if z_interp > fb.zbuffer[idx] {
                continue;
            }
            fb.zbuffer[idx] = z_interp;

            let color = if shader.settings.visualize_depth {
                let t = (z_interp - DEPTH_VIS_NEAR) / (DEPTH_VIS_FAR - DEPTH_VIS_NEAR);
                ColorRGB::gray(t.clamp(0.0, 1.0))
            } else {
                // Perspective-correct weights
                let pw0 = w0 / v0.position.w;
                let pw1 = w1 / v1.position.w;
                let pw2 = w2 / v2.position.w;
                let depth = 1.0 / (pw0 + pw1 + pw2);

                let input = ShadingInput {
                    position: p,
                    color: (v0.color * pw0 + v1.color * pw1 + v2.color * pw2) * depth,
                    uv: (v0.uv * pw0 + v1.uv * pw1 + v2.uv * pw2) * depth,
                    normal: ((v0.normal * pw0 + v1.normal * pw1 + v2.normal * pw2) * depth).normalize(),
                    tangent: ((v0.tangent * pw0 + v1.tangent * pw1 + v2.tangent * pw2) * depth).normalize(),
                };
                shader.shade(&input)
            };

            fb.set_pixel(x, y, color.to_color());
            written += 1;
        }
    }

    written
}

/// Counters from one rendered frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub triangles: usize,
    pub pixels_written: usize,
}

/// Owns the camera, meshes, textures and buffers, and runs one
/// update + render per frame
pub struct Renderer {
    pub camera: Camera,
    pub meshes: Vec<Mesh>,
    pub material: Option<Material>,
    pub light: Light,
    fb: Framebuffer,
    /// World matrices the meshes were created with
    base_transforms: Vec<Matrix>,
    mesh_rotation: f32,
}

impl Renderer {
    pub fn new(
        width: usize,
        height: usize,
        camera: Camera,
        meshes: Vec<Mesh>,
        material: Option<Material>,
        light: Light,
    ) -> Self {
        let base_transforms = meshes.iter().map(|m| m.world_matrix).collect();
        Self {
            camera,
            meshes,
            material,
            light,
            fb: Framebuffer::new(width, height),
            base_transforms,
            mesh_rotation: 0.0,
        }
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }

    /// Advance the camera and, if enabled, the mesh spin
    pub fn update(&mut self, elapsed: f32, movement: MoveInput, look: LookInput, settings: &RenderSettings) {
        self.camera.update(elapsed, movement, look);

        if settings.rotate_meshes {
            self.mesh_rotation += ROTATION_SPEED * elapsed;
            let spin = Matrix::rotation_y(self.mesh_rotation);
            for (mesh, base) in self.meshes.iter_mut().zip(&self.base_transforms) {
                mesh.world_matrix = spin * *base;
            }
        }
    }

    /// Clear, transform and rasterize every mesh into the color buffer
    pub fn render(&mut self, settings: &RenderSettings) -> FrameStats {
        let (width, height) = (self.fb.width, self.fb.height);
        self.fb.clear(Color::BLACK);

        for mesh in &mut self.meshes {
            transform_vertices(mesh, &self.camera, width, height);
        }

        let shader = PixelShader {
            camera: &self.camera,
            material: self.material.as_ref(),
            light: &self.light,
            settings,
            width,
            height,
        };

        let mut stats = FrameStats::default();
        for mesh in &self.meshes {
            for i in 0..mesh.triangle_count() {
                let [a, b, c] = mesh.triangle(i);
                let out = &mesh.vertices_out;
                stats.pixels_written += rasterize_triangle(&mut self.fb, &out[a], &out[b], &out[c], &shader);
                stats.triangles += 1;
            }
        }

        stats
    }

    /// Dump the current color buffer to disk
    pub fn save_buffer_to_image<P: AsRef<Path>>(&self, path: P) -> Result<(), SaveError> {
        self.fb.save_image(path)
    }
}
