//! Scene module - everything the renderer needs to draw a frame
//!
//! - RON scene descriptions (camera, mesh, textures, light)
//! - Wavefront OBJ meshes with generated tangents
//! - A built-in demo scene

mod config;
mod demo;
mod obj;

pub use config::*;
pub use demo::*;
pub use obj::*;

use std::path::Path;

use crate::rasterizer::{Camera, Light, Material, Matrix, Mesh, PrimitiveTopology, Renderer, Texture};

/// Loaded scene resources, ready to hand to a `Renderer`
pub struct Scene {
    pub width: usize,
    pub height: usize,
    pub camera: Camera,
    pub meshes: Vec<Mesh>,
    pub material: Option<Material>,
    pub light: Light,
}

impl Scene {
    /// Load the mesh and textures named by `config`. Paths are resolved
    /// against `base_dir`. Any missing resource is an error.
    pub fn from_config(config: &SceneConfig, base_dir: &Path) -> Result<Self, SceneError> {
        let mesh = load_mesh(&config.mesh, base_dir)?;

        let load = |name: &str| -> Result<Texture, SceneError> {
            let tex = Texture::from_file(base_dir.join(name))?;
            log::info!("Loaded texture: {} ({}x{})", tex.name, tex.width, tex.height);
            Ok(tex)
        };
        let material = Material {
            diffuse: load(&config.textures.diffuse)?,
            normal: load(&config.textures.normal)?,
            specular: load(&config.textures.specular)?,
            gloss: load(&config.textures.gloss)?,
        };

        let aspect = config.width as f32 / config.height as f32;
        let camera = Camera::new(aspect, config.camera.fov_degrees, config.camera.origin);

        let light = Light {
            direction: config.light.direction.normalize(),
            intensity: config.light.intensity,
            shininess: config.light.shininess,
        };

        Ok(Self {
            width: config.width,
            height: config.height,
            camera,
            meshes: vec![mesh],
            material: Some(material),
            light,
        })
    }

    pub fn into_renderer(self) -> Renderer {
        Renderer::new(self.width, self.height, self.camera, self.meshes, self.material, self.light)
    }
}

/// Load the OBJ mesh named by `config`. OBJ faces carry their own corners,
/// so the result is always a triangle list.
pub fn load_mesh(config: &MeshConfig, base_dir: &Path) -> Result<Mesh, SceneError> {
    let (vertices, indices) = load_obj(base_dir.join(&config.path), config.flip_handedness)?;
    let mesh = Mesh::new(vertices, indices, PrimitiveTopology::TriangleList)?
        .with_world_matrix(Matrix::translation(config.translation));
    log::info!(
        "Loaded mesh {}: {} vertices, {} triangles",
        config.path,
        mesh.vertices.len(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

/// Load a scene file and its resources
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<Scene, SceneError> {
    let path = path.as_ref();
    let config = load_scene_config(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    Scene::from_config(&config, base_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::MeshError;

    #[test]
    fn test_missing_mesh_is_fatal() {
        let config = SceneConfig {
            mesh: MeshConfig {
                path: "definitely_missing.obj".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = Scene::from_config(&config, Path::new("/nonexistent")).err().unwrap();
        assert!(matches!(err, SceneError::Mesh(MeshError::Io(_))), "{err}");
    }

    #[test]
    fn test_obj_faces_stay_separate_triangles() {
        let dir = std::env::temp_dir().join(format!("softraster_scene_faces_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("two.obj"),
            "v 0 0 0\nv 0 1 0\nv 1 0 0\nv 5 0 0\nv 5 1 0\nv 6 0 0\nf 1 2 3\nf 4 5 6\n",
        )
        .unwrap();

        let config = MeshConfig {
            path: "two.obj".to_string(),
            ..Default::default()
        };
        let mesh = load_mesh(&config, &dir);
        let _ = std::fs::remove_dir_all(&dir);
        let mesh = mesh.unwrap();

        assert_eq!(mesh.topology, PrimitiveTopology::TriangleList);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.triangle(0), [0, 1, 2]);
        assert_eq!(mesh.triangle(1), [3, 4, 5]);
    }

    #[test]
    fn test_missing_texture_is_fatal() {
        let dir = std::env::temp_dir().join(format!("softraster_scene_tex_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("tri.obj"), "v 0 0 0\nv 0 1 0\nv 1 0 0\nf 1 2 3\n").unwrap();

        let config = SceneConfig {
            mesh: MeshConfig {
                path: "tri.obj".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let result = Scene::from_config(&config, &dir);
        let _ = std::fs::remove_dir_all(&dir);

        assert!(matches!(result, Err(SceneError::Texture(_))));
    }
}
