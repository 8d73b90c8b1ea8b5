//! Vector and matrix math for 3D rendering
//!
//! Matrices use the row-vector convention: a point is transformed as
//! `p * M`, so `world * view * projection` applies `world` first.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};
use serde::{Serialize, Deserialize};

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const UNIT_X: Vec3 = Vec3 { x: 1.0, y: 0.0, z: 0.0 };
    pub const UNIT_Y: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };
    pub const UNIT_Z: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 1.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn len(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction. A zero vector stays zero.
    pub fn normalize(self) -> Vec3 {
        let l = self.len();
        if l == 0.0 {
            return Vec3::ZERO;
        }
        Vec3 {
            x: self.x / l,
            y: self.y / l,
            z: self.z / l,
        }
    }

    pub fn scale(self, s: f32) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    /// Reflect `self` about the plane with the given unit normal
    pub fn reflect(self, normal: Vec3) -> Vec3 {
        self - normal * (2.0 * normal.dot(self))
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, other: Vec3) {
        *self = *self + other;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        self.scale(s)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// 2D Vector (screen positions and texture coordinates)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Z component of the 3D cross product of two planar vectors
    pub fn cross(self, other: Vec2) -> f32 {
        self.x * other.y - self.y * other.x
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, s: f32) -> Vec2 {
        Vec2::new(self.x * s, self.y * s)
    }
}

/// Homogeneous 4D vector (clip-space positions)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn from_point(p: Vec3) -> Self {
        Self::new(p.x, p.y, p.z, 1.0)
    }

    pub fn xy(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// 4x4 matrix, stored row-major
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub m: [[f32; 4]; 4],
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Build from three basis axes and a translation (one per row)
    pub fn from_axes(x: Vec3, y: Vec3, z: Vec3, t: Vec3) -> Self {
        Self {
            m: [
                [x.x, x.y, x.z, 0.0],
                [y.x, y.y, y.z, 0.0],
                [z.x, z.y, z.z, 0.0],
                [t.x, t.y, t.z, 1.0],
            ],
        }
    }

    pub fn translation(t: Vec3) -> Self {
        Self::from_axes(Vec3::UNIT_X, Vec3::UNIT_Y, Vec3::UNIT_Z, t)
    }

    pub fn rotation_x(pitch: f32) -> Self {
        let (s, c) = pitch.sin_cos();
        Self::from_axes(
            Vec3::UNIT_X,
            Vec3::new(0.0, c, -s),
            Vec3::new(0.0, s, c),
            Vec3::ZERO,
        )
    }

    pub fn rotation_y(yaw: f32) -> Self {
        let (s, c) = yaw.sin_cos();
        Self::from_axes(
            Vec3::new(c, 0.0, -s),
            Vec3::UNIT_Y,
            Vec3::new(s, 0.0, c),
            Vec3::ZERO,
        )
    }

    pub fn rotation_z(roll: f32) -> Self {
        let (s, c) = roll.sin_cos();
        Self::from_axes(
            Vec3::new(c, s, 0.0),
            Vec3::new(-s, c, 0.0),
            Vec3::UNIT_Z,
            Vec3::ZERO,
        )
    }

    /// Pitch about X, then yaw about Y, then roll about Z
    pub fn rotation(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self::rotation_x(pitch) * Self::rotation_y(yaw) * Self::rotation_z(roll)
    }

    /// Left-handed perspective projection (D3DXMatrixPerspectiveFovLH layout).
    /// `fov_tan` is tan(fov / 2). Depth maps near -> 0, far -> 1.
    pub fn perspective_fov_lh(fov_tan: f32, aspect: f32, near: f32, far: f32) -> Self {
        let y_scale = 1.0 / fov_tan;
        let x_scale = y_scale / aspect;
        let depth = far / (far - near);
        Self {
            m: [
                [x_scale, 0.0, 0.0, 0.0],
                [0.0, y_scale, 0.0, 0.0],
                [0.0, 0.0, depth, 1.0],
                [0.0, 0.0, -near * depth, 0.0],
            ],
        }
    }

    pub fn axis_x(&self) -> Vec3 {
        Vec3::new(self.m[0][0], self.m[0][1], self.m[0][2])
    }

    pub fn axis_y(&self) -> Vec3 {
        Vec3::new(self.m[1][0], self.m[1][1], self.m[1][2])
    }

    pub fn axis_z(&self) -> Vec3 {
        Vec3::new(self.m[2][0], self.m[2][1], self.m[2][2])
    }

    /// Full homogeneous transform of a position (w = 1 in)
    pub fn transform_point4(&self, p: Vec3) -> Vec4 {
        let v = Vec4::from_point(p);
        let m = &self.m;
        Vec4 {
            x: v.x * m[0][0] + v.y * m[1][0] + v.z * m[2][0] + v.w * m[3][0],
            y: v.x * m[0][1] + v.y * m[1][1] + v.z * m[2][1] + v.w * m[3][1],
            z: v.x * m[0][2] + v.y * m[1][2] + v.z * m[2][2] + v.w * m[3][2],
            w: v.x * m[0][3] + v.y * m[1][3] + v.z * m[2][3] + v.w * m[3][3],
        }
    }

    /// Transform a direction (translation ignored)
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        self.axis_x() * v.x + self.axis_y() * v.y + self.axis_z() * v.z
    }

    /// General 4x4 inverse. Returns None for a singular matrix.
    pub fn inverse(&self) -> Option<Matrix> {
        let a = &self.m;

        let s0 = a[0][0] * a[1][1] - a[1][0] * a[0][1];
        let s1 = a[0][0] * a[1][2] - a[1][0] * a[0][2];
        let s2 = a[0][0] * a[1][3] - a[1][0] * a[0][3];
        let s3 = a[0][1] * a[1][2] - a[1][1] * a[0][2];
        let s4 = a[0][1] * a[1][3] - a[1][1] * a[0][3];
        let s5 = a[0][2] * a[1][3] - a[1][2] * a[0][3];

        let c5 = a[2][2] * a[3][3] - a[3][2] * a[2][3];
        let c4 = a[2][1] * a[3][3] - a[3][1] * a[2][3];
        let c3 = a[2][1] * a[3][2] - a[3][1] * a[2][2];
        let c2 = a[2][0] * a[3][3] - a[3][0] * a[2][3];
        let c1 = a[2][0] * a[3][2] - a[3][0] * a[2][2];
        let c0 = a[2][0] * a[3][1] - a[3][0] * a[2][1];

        let det = s0 * c5 - s1 * c4 + s2 * c3 + s3 * c2 - s4 * c1 + s5 * c0;
        if det.abs() < 1e-12 {
            return None;
        }
        let inv = 1.0 / det;

        let mut b = [[0.0f32; 4]; 4];
        b[0][0] = (a[1][1] * c5 - a[1][2] * c4 + a[1][3] * c3) * inv;
        b[0][1] = (-a[0][1] * c5 + a[0][2] * c4 - a[0][3] * c3) * inv;
        b[0][2] = (a[3][1] * s5 - a[3][2] * s4 + a[3][3] * s3) * inv;
        b[0][3] = (-a[2][1] * s5 + a[2][2] * s4 - a[2][3] * s3) * inv;

        b[1][0] = (-a[1][0] * c5 + a[1][2] * c2 - a[1][3] * c1) * inv;
        b[1][1] = (a[0][0] * c5 - a[0][2] * c2 + a[0][3] * c1) * inv;
        b[1][2] = (-a[3][0] * s5 + a[3][2] * s2 - a[3][3] * s1) * inv;
        b[1][3] = (a[2][0] * s5 - a[2][2] * s2 + a[2][3] * s1) * inv;

        b[2][0] = (a[1][0] * c4 - a[1][1] * c2 + a[1][3] * c0) * inv;
        b[2][1] = (-a[0][0] * c4 + a[0][1] * c2 - a[0][3] * c0) * inv;
        b[2][2] = (a[3][0] * s4 - a[3][1] * s2 + a[3][3] * s0) * inv;
        b[2][3] = (-a[2][0] * s4 + a[2][1] * s2 - a[2][3] * s0) * inv;

        b[3][0] = (-a[1][0] * c3 + a[1][1] * c1 - a[1][2] * c0) * inv;
        b[3][1] = (a[0][0] * c3 - a[0][1] * c1 + a[0][2] * c0) * inv;
        b[3][2] = (-a[3][0] * s3 + a[3][1] * s1 - a[3][2] * s0) * inv;
        b[3][3] = (a[2][0] * s3 - a[2][1] * s1 + a[2][2] * s0) * inv;

        Some(Matrix { m: b })
    }
}

impl Mul for Matrix {
    type Output = Matrix;
    fn mul(self, other: Matrix) -> Matrix {
        let mut out = [[0.0f32; 4]; 4];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.m[r][k] * other.m[k][c]).sum();
            }
        }
        Matrix { m: out }
    }
}

/// Edge function: signed doubled area of (a, b, p).
/// Positive when p lies clockwise of a->b on a y-down screen.
pub fn edge_function(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b - a).cross(p - a)
}

/// Barycentric weights of p in a triangle whose signed area
/// `edge_function(v1, v2, v0)` is `area`. Each weight belongs to the vertex
/// opposite the edge it was measured on.
///
/// Returns `None` when p lies outside the triangle or the area is zero.
pub fn barycentric(p: Vec2, v0: Vec2, v1: Vec2, v2: Vec2, area: f32) -> Option<[f32; 3]> {
    if area == 0.0 {
        return None;
    }
    let w0 = edge_function(v1, v2, p) / area;
    if w0 < 0.0 {
        return None;
    }
    let w1 = edge_function(v2, v0, p) / area;
    if w1 < 0.0 {
        return None;
    }
    let w2 = edge_function(v0, v1, p) / area;
    if w2 < 0.0 {
        return None;
    }
    Some([w0, w1, w2])
}
