//! Scene description loading
//!
//! Uses RON (Rusty Object Notation) for human-readable scene files.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rasterizer::{MeshError, TextureError, Vec3, HEIGHT, WIDTH};

/// Error type for scene loading
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),
    #[error("Texture error: {0}")]
    Texture(#[from] TextureError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub origin: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            origin: Vec3::new(0.0, 5.0, -64.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Wavefront OBJ file, relative to the scene file. Always loaded as a
    /// triangle list.
    pub path: String,
    pub translation: Vec3,
    /// Convert a right-handed OBJ into this left-handed space
    pub flip_handedness: bool,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            path: "vehicle.obj".to_string(),
            translation: Vec3::ZERO,
            flip_handedness: true,
        }
    }
}

/// Texture files, relative to the scene file. All four are required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    pub diffuse: String,
    pub normal: String,
    pub specular: String,
    pub gloss: String,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            diffuse: "vehicle_diffuse.png".to_string(),
            normal: "vehicle_normal.png".to_string(),
            specular: "vehicle_specular.png".to_string(),
            gloss: "vehicle_gloss.png".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub direction: Vec3,
    pub intensity: f32,
    pub shininess: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            direction: Vec3::new(0.577, -0.577, 0.577),
            intensity: 7.0,
            shininess: 25.0,
        }
    }
}

/// Everything needed to build a renderable scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub width: usize,
    pub height: usize,
    pub camera: CameraConfig,
    pub mesh: MeshConfig,
    pub textures: TextureConfig,
    pub light: LightConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            camera: CameraConfig::default(),
            mesh: MeshConfig::default(),
            textures: TextureConfig::default(),
            light: LightConfig::default(),
        }
    }
}

/// Load a scene description from a RON file
pub fn load_scene_config<P: AsRef<Path>>(path: P) -> Result<SceneConfig, SceneError> {
    let contents = fs::read_to_string(path)?;
    load_scene_config_from_str(&contents)
}

/// Load a scene description from a RON string
pub fn load_scene_config_from_str(s: &str) -> Result<SceneConfig, SceneError> {
    Ok(ron::from_str(s)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = load_scene_config_from_str(
            "(width: 320, camera: (fov_degrees: 60.0), mesh: (path: \"cube.obj\"))",
        )
        .unwrap();

        assert_eq!(config.width, 320);
        assert_eq!(config.height, HEIGHT);
        assert_eq!(config.camera.fov_degrees, 60.0);
        assert_eq!(config.camera.origin, CameraConfig::default().origin);
        assert_eq!(config.mesh.path, "cube.obj");
        assert!(config.mesh.flip_handedness);
        assert_eq!(config.light.intensity, 7.0);
    }

    #[test]
    fn test_malformed_config_is_parse_error() {
        let err = load_scene_config_from_str("(width: \"wide\")").unwrap_err();
        assert!(matches!(err, SceneError::Parse(_)));
    }

    #[test]
    fn test_scene_file_loads_from_disk() {
        let path = std::env::temp_dir().join(format!("softraster_scene_{}.ron", std::process::id()));
        fs::write(
            &path,
            "(camera: (origin: (x: 1.0, y: 2.0, z: 3.0)), textures: (gloss: \"shiny.png\"))",
        )
        .unwrap();
        let loaded = load_scene_config(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded.camera.origin, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(loaded.textures.gloss, "shiny.png");
        assert_eq!(loaded.textures.diffuse, TextureConfig::default().diffuse);
    }

    #[test]
    fn test_missing_scene_file_is_io_error() {
        let err = load_scene_config("/nonexistent/scene.ron").unwrap_err();
        assert!(matches!(err, SceneError::Io(_)));
    }
}
