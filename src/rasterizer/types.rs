//! Core types for the rasterizer

use std::ops::{Add, Mul};
use serde::{Serialize, Deserialize};
use thiserror::Error;

use super::math::{Matrix, Vec2, Vec3, Vec4};

/// RGBA color (0-255 per channel), the framebuffer's storage format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Convert to [u8; 4] for framebuffer
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Floating-point RGB color used by shading. Channels are nominally
/// 0.0-1.0 but may exceed 1.0 until written to the framebuffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorRGB {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl ColorRGB {
    pub const BLACK: ColorRGB = ColorRGB { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: ColorRGB = ColorRGB { r: 1.0, g: 1.0, b: 1.0 };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn gray(v: f32) -> Self {
        Self { r: v, g: v, b: v }
    }

    /// Clamp each channel to at most 1.0. There is no lower clamp.
    pub fn max_to_one(self) -> Self {
        Self {
            r: self.r.min(1.0),
            g: self.g.min(1.0),
            b: self.b.min(1.0),
        }
    }

    /// Upper-clamp, scale by 255 and truncate
    pub fn to_color(self) -> Color {
        let c = self.max_to_one();
        Color::new((c.r * 255.0) as u8, (c.g * 255.0) as u8, (c.b * 255.0) as u8)
    }

    pub fn from_color(c: Color) -> Self {
        Self {
            r: c.r as f32 / 255.0,
            g: c.g as f32 / 255.0,
            b: c.b as f32 / 255.0,
        }
    }
}

impl Add for ColorRGB {
    type Output = ColorRGB;
    fn add(self, o: ColorRGB) -> ColorRGB {
        ColorRGB::new(self.r + o.r, self.g + o.g, self.b + o.b)
    }
}

impl Mul<f32> for ColorRGB {
    type Output = ColorRGB;
    fn mul(self, s: f32) -> ColorRGB {
        ColorRGB::new(self.r * s, self.g * s, self.b * s)
    }
}

/// A model-space vertex
#[derive(Debug, Clone, Copy, Default)]
pub struct Vertex {
    pub position: Vec3,
    pub color: ColorRGB,
    pub uv: Vec2,
    pub normal: Vec3,
    pub tangent: Vec3,
}

impl Vertex {
    pub fn new(position: Vec3, uv: Vec2, normal: Vec3, tangent: Vec3) -> Self {
        Self {
            position,
            color: ColorRGB::WHITE,
            uv,
            normal,
            tangent,
        }
    }
}

/// A transformed vertex.
///
/// `position.x`/`position.y` are screen pixels, `position.z` is NDC depth
/// and `position.w` is the clip-space w kept for perspective correction.
/// Normal and tangent are world-space and not renormalized.
#[derive(Debug, Clone, Copy, Default)]
pub struct VertexOut {
    pub position: Vec4,
    pub color: ColorRGB,
    pub uv: Vec2,
    pub normal: Vec3,
    pub tangent: Vec3,
}

/// How an index buffer is grouped into triangles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimitiveTopology {
    #[default]
    TriangleList,
    TriangleStrip,
}

/// Error type for mesh construction and loading
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
}

/// Indexed triangle mesh with its world transform and per-frame
/// transformed vertices
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub topology: PrimitiveTopology,
    pub world_matrix: Matrix,
    /// Filled by the vertex stage, aligned 1:1 with `vertices`
    pub vertices_out: Vec<VertexOut>,
}

impl Mesh {
    /// Build a mesh, rejecting any index that does not name a vertex
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>, topology: PrimitiveTopology) -> Result<Self, MeshError> {
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count: vertices.len(),
            });
        }

        Ok(Self {
            vertices,
            indices,
            topology,
            world_matrix: Matrix::IDENTITY,
            vertices_out: Vec::new(),
        })
    }

    pub fn with_world_matrix(mut self, world: Matrix) -> Self {
        self.world_matrix = world;
        self
    }

    pub fn triangle_count(&self) -> usize {
        match self.topology {
            PrimitiveTopology::TriangleList => self.indices.len() / 3,
            PrimitiveTopology::TriangleStrip => self.indices.len().saturating_sub(2),
        }
    }

    /// Vertex indices of the i-th triangle.
    /// Odd strip triangles swap their last two corners to keep the winding.
    pub fn triangle(&self, i: usize) -> [usize; 3] {
        let idx = |n: usize| self.indices[n] as usize;
        match self.topology {
            PrimitiveTopology::TriangleList => [idx(i * 3), idx(i * 3 + 1), idx(i * 3 + 2)],
            PrimitiveTopology::TriangleStrip => {
                if i % 2 == 0 {
                    [idx(i), idx(i + 1), idx(i + 2)]
                } else {
                    [idx(i), idx(i + 2), idx(i + 1)]
                }
            }
        }
    }
}

/// Error type for texture loading
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to load {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("texture has zero size")]
    Empty,
}

/// Decoded image, read-only after load
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Color>,
    pub name: String,
}

impl Texture {
    /// Single-color texture
    pub fn solid(width: usize, height: usize, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
            name: String::new(),
        }
    }

    /// Wrap an already decoded pixel grid (row-major, top row first)
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Color>, name: String) -> Result<Self, TextureError> {
        if width == 0 || height == 0 || pixels.len() != width * height {
            return Err(TextureError::Empty);
        }
        Ok(Self { width, height, pixels, name })
    }

    /// Load texture from an image file (PNG, JPEG or BMP)
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| TextureError::Load {
            path: path.display().to_string(),
            source,
        })?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        Self::from_image(img, name)
    }

    /// Convert a decoded image into RGBA texels
    fn from_image(img: image::DynamicImage, name: String) -> Result<Self, TextureError> {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        let pixels: Vec<Color> = rgba
            .pixels()
            .map(|p| Color::with_alpha(p[0], p[1], p[2], p[3]))
            .collect();

        Self::from_pixels(width as usize, height as usize, pixels, name)
    }

    /// Create a checkerboard test texture
    pub fn checkerboard(width: usize, height: usize, color1: Color, color2: Color) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / 4) + (y / 4)) % 2 == 0;
                pixels.push(if checker { color1 } else { color2 });
            }
        }
        Self { width, height, pixels, name: "checkerboard".to_string() }
    }

    /// Nearest-neighbor sample. UVs are clamped into [0, 1) so the lookup
    /// never leaves the pixel grid. An empty texture samples as black.
    pub fn sample(&self, uv: Vec2) -> ColorRGB {
        if self.pixels.is_empty() {
            return ColorRGB::BLACK;
        }
        let tx = ((uv.x.clamp(0.0, 1.0) * self.width as f32) as usize).min(self.width - 1);
        let ty = ((uv.y.clamp(0.0, 1.0) * self.height as f32) as usize).min(self.height - 1);
        ColorRGB::from_color(self.pixels[ty * self.width + tx])
    }
}

/// Pixel shader lighting mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightingMode {
    ObservedArea,
    Diffuse,
    Specular,
    #[default]
    Combined,
}

impl LightingMode {
    /// Next mode in the cycle ObservedArea -> Diffuse -> Specular -> Combined
    pub fn next(self) -> Self {
        match self {
            LightingMode::ObservedArea => LightingMode::Diffuse,
            LightingMode::Diffuse => LightingMode::Specular,
            LightingMode::Specular => LightingMode::Combined,
            LightingMode::Combined => LightingMode::ObservedArea,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LightingMode::ObservedArea => "Observed Area",
            LightingMode::Diffuse => "Diffuse",
            LightingMode::Specular => "Specular",
            LightingMode::Combined => "Combined",
        }
    }
}

/// Render toggles, fixed for the duration of a frame.
/// Toggling produces a new value for the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    pub lighting_mode: LightingMode,
    /// Replace geometric normals with the normal map
    pub use_normal_map: bool,
    /// Output remapped depth instead of shading
    pub visualize_depth: bool,
    /// Spin meshes about their Y axis during update
    pub rotate_meshes: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            lighting_mode: LightingMode::Combined,
            use_normal_map: true,
            visualize_depth: false,
            rotate_meshes: false,
        }
    }
}

impl RenderSettings {
    pub fn toggled_depth_visualization(self) -> Self {
        Self { visualize_depth: !self.visualize_depth, ..self }
    }

    pub fn toggled_rotation(self) -> Self {
        Self { rotate_meshes: !self.rotate_meshes, ..self }
    }

    pub fn toggled_normal_map(self) -> Self {
        Self { use_normal_map: !self.use_normal_map, ..self }
    }

    pub fn cycled_lighting_mode(self) -> Self {
        Self { lighting_mode: self.lighting_mode.next(), ..self }
    }
}
