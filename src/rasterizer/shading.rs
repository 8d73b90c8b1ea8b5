//! Per-pixel lighting: Lambert diffuse, Phong specular, tangent-space
//! normal mapping

use std::f32::consts::PI;

use super::camera::Camera;
use super::math::{Vec2, Vec3};
use super::types::{ColorRGB, LightingMode, RenderSettings, Texture};

/// Directional light and material response constants
#[derive(Debug, Clone, Copy)]
pub struct Light {
    /// Unit direction the light travels in
    pub direction: Vec3,
    pub intensity: f32,
    /// Phong exponent, scaled per pixel by the gloss map
    pub shininess: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            direction: Vec3::new(0.577, -0.577, 0.577).normalize(),
            intensity: 7.0,
            shininess: 25.0,
        }
    }
}

/// The four texture maps a lit mesh is shaded with
#[derive(Debug, Clone)]
pub struct Material {
    pub diffuse: Texture,
    pub normal: Texture,
    pub specular: Texture,
    pub gloss: Texture,
}

/// Interpolated attributes of one covered pixel
#[derive(Debug, Clone, Copy)]
pub struct ShadingInput {
    /// Pixel center in screen space
    pub position: Vec2,
    pub color: ColorRGB,
    pub uv: Vec2,
    pub normal: Vec3,
    pub tangent: Vec3,
}

/// Everything the pixel shader reads besides the pixel itself
pub struct PixelShader<'a> {
    pub camera: &'a Camera,
    pub material: Option<&'a Material>,
    pub light: &'a Light,
    pub settings: &'a RenderSettings,
    pub width: usize,
    pub height: usize,
}

impl PixelShader<'_> {
    /// Shade one pixel. Without a material the interpolated vertex color
    /// is returned unlit.
    pub fn shade(&self, input: &ShadingInput) -> ColorRGB {
        let Some(material) = self.material else {
            return input.color.max_to_one();
        };

        let normal = if self.settings.use_normal_map {
            sample_normal_map(&material.normal, input.uv, input.normal, input.tangent)
        } else {
            input.normal
        };

        let observed_area = normal.dot(-self.light.direction);
        if observed_area < 0.0 {
            return ColorRGB::BLACK;
        }

        let ray = self.camera.view_ray(input.position.x, input.position.y, self.width, self.height);

        let diffuse = || material.diffuse.sample(input.uv) * (observed_area * self.light.intensity / PI);
        let specular = || {
            let exponent = self.light.shininess * material.gloss.sample(input.uv).r;
            phong(material.specular.sample(input.uv), exponent, self.light.direction, -ray, normal) * observed_area
        };

        let color = match self.settings.lighting_mode {
            LightingMode::ObservedArea => ColorRGB::gray(observed_area),
            LightingMode::Diffuse => diffuse(),
            LightingMode::Specular => specular(),
            LightingMode::Combined => diffuse() + specular(),
        };

        color.max_to_one()
    }
}

/// Replace the geometric normal with the normal map sample, expressed in
/// the (tangent, bitangent, normal) frame
pub fn sample_normal_map(normal_map: &Texture, uv: Vec2, normal: Vec3, tangent: Vec3) -> Vec3 {
    let bitangent = normal.cross(tangent);
    let s = normal_map.sample(uv);
    let sampled = Vec3::new(2.0 * s.r - 1.0, 2.0 * s.g - 1.0, 2.0 * s.b - 1.0);
    (tangent * sampled.x + bitangent * sampled.y + normal * sampled.z).normalize()
}

/// Phong specular term.
///
/// `light_dir` points from the light into the scene, `to_eye` from the
/// surface towards the camera.
pub fn phong(specular: ColorRGB, exponent: f32, light_dir: Vec3, to_eye: Vec3, normal: Vec3) -> ColorRGB {
    let reflect = light_dir.reflect(normal);
    let cos_alpha = reflect.dot(to_eye).max(0.0);
    if cos_alpha <= 0.0 {
        return ColorRGB::BLACK;
    }
    specular * cos_alpha.powf(exponent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::Color;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.001
    }

    fn flat_material() -> Material {
        Material {
            diffuse: Texture::solid(2, 2, Color::new(255, 255, 255)),
            // (0.5, 0.5, 1.0) decodes to the unperturbed normal
            normal: Texture::solid(2, 2, Color::new(128, 128, 255)),
            specular: Texture::solid(2, 2, Color::new(255, 255, 255)),
            gloss: Texture::solid(2, 2, Color::new(255, 255, 255)),
        }
    }

    fn input(normal: Vec3) -> ShadingInput {
        ShadingInput {
            position: Vec2::new(50.0, 50.0),
            color: ColorRGB::new(0.2, 0.4, 0.6),
            uv: Vec2::new(0.5, 0.5),
            normal,
            tangent: Vec3::UNIT_X,
        }
    }

    fn shade_with(mode: LightingMode, normal_map: bool, light: &Light, n: Vec3) -> ColorRGB {
        let camera = Camera::default();
        let material = flat_material();
        let settings = RenderSettings {
            lighting_mode: mode,
            use_normal_map: normal_map,
            ..Default::default()
        };
        let shader = PixelShader {
            camera: &camera,
            material: Some(&material),
            light,
            settings: &settings,
            width: 100,
            height: 100,
        };
        shader.shade(&input(n))
    }

    #[test]
    fn test_unlit_returns_vertex_color() {
        let camera = Camera::default();
        let light = Light::default();
        let settings = RenderSettings::default();
        let shader = PixelShader {
            camera: &camera,
            material: None,
            light: &light,
            settings: &settings,
            width: 100,
            height: 100,
        };
        assert_eq!(shader.shade(&input(Vec3::UNIT_Y)), ColorRGB::new(0.2, 0.4, 0.6));
    }

    #[test]
    fn test_surface_facing_away_is_black() {
        let light = Light::default();
        for mode in [LightingMode::ObservedArea, LightingMode::Diffuse, LightingMode::Specular, LightingMode::Combined] {
            let c = shade_with(mode, false, &light, light.direction);
            assert_eq!(c, ColorRGB::BLACK, "{:?}", mode);
        }
    }

    #[test]
    fn test_observed_area_is_cosine() {
        let light = Light {
            direction: Vec3::new(0.0, -1.0, 0.0),
            ..Default::default()
        };
        let n = Vec3::new(0.0, 1.0, 1.0).normalize();
        let c = shade_with(LightingMode::ObservedArea, false, &light, n);
        assert!(approx(c.r, n.y) && approx(c.g, n.y) && approx(c.b, n.y));
    }

    #[test]
    fn test_diffuse_is_lambert_over_pi() {
        let light = Light {
            direction: Vec3::new(0.0, -1.0, 0.0),
            intensity: 1.0,
            ..Default::default()
        };
        let c = shade_with(LightingMode::Diffuse, false, &light, Vec3::UNIT_Y);
        assert!(approx(c.r, 1.0 / PI));
    }

    #[test]
    fn test_flat_normal_map_keeps_normal() {
        let map = Texture::solid(1, 1, Color::new(128, 128, 255));
        let n = sample_normal_map(&map, Vec2::new(0.0, 0.0), Vec3::UNIT_Y, Vec3::UNIT_X);
        assert!(n.y > 0.99);
    }

    #[test]
    fn test_normal_map_tilts_towards_tangent() {
        let map = Texture::solid(1, 1, Color::new(255, 128, 128));
        let n = sample_normal_map(&map, Vec2::new(0.0, 0.0), Vec3::UNIT_Y, Vec3::UNIT_X);
        assert!(n.x > 0.99);
    }

    #[test]
    fn test_phong_peaks_on_mirror_direction() {
        let light_dir = Vec3::new(1.0, -1.0, 0.0).normalize();
        let mirror = Vec3::new(1.0, 1.0, 0.0).normalize();
        let c = phong(ColorRGB::WHITE, 25.0, light_dir, mirror, Vec3::UNIT_Y);
        assert!(approx(c.r, 1.0));
    }

    #[test]
    fn test_phong_behind_reflection_is_black() {
        let light_dir = Vec3::new(1.0, -1.0, 0.0).normalize();
        let away = Vec3::new(-1.0, -1.0, 0.0).normalize();
        // A zero exponent must not turn 0^0 into a highlight
        let c = phong(ColorRGB::WHITE, 0.0, light_dir, away, Vec3::UNIT_Y);
        assert_eq!(c, ColorRGB::BLACK);
    }
}
