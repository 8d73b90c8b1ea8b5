//! Application state and hotkey handling
//!
//! Owns the renderer plus the per-frame render toggles. Input polling lives
//! in `main.rs`; everything here is window-agnostic.

use crate::rasterizer::{FrameStats, LookInput, MoveInput, RenderSettings, Renderer, SaveError};

/// File written by the screenshot hotkey
pub const SCREENSHOT_PATH: &str = "Rasterizer_ColorBuffer.bmp";

/// Discrete actions bound to keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    ToggleDepthVisualization,
    ToggleRotation,
    ToggleNormalMap,
    CycleLightingMode,
    Screenshot,
}

/// Main application state
pub struct AppState {
    pub renderer: Renderer,
    pub settings: RenderSettings,
    /// Mouse position at the previous frame, for look deltas
    last_mouse: Option<(f32, f32)>,
}

impl AppState {
    pub fn new(renderer: Renderer) -> Self {
        Self {
            renderer,
            settings: RenderSettings::default(),
            last_mouse: None,
        }
    }

    /// Apply a hotkey command. Toggles take effect on the next frame.
    pub fn apply(&mut self, command: Command) -> Result<(), SaveError> {
        match command {
            Command::ToggleDepthVisualization => {
                self.settings = self.settings.toggled_depth_visualization();
                log::info!("Depth buffer visualization: {}", on_off(self.settings.visualize_depth));
            }
            Command::ToggleRotation => {
                self.settings = self.settings.toggled_rotation();
                log::info!("Mesh rotation: {}", on_off(self.settings.rotate_meshes));
            }
            Command::ToggleNormalMap => {
                self.settings = self.settings.toggled_normal_map();
                log::info!("Normal map: {}", on_off(self.settings.use_normal_map));
            }
            Command::CycleLightingMode => {
                self.settings = self.settings.cycled_lighting_mode();
                log::info!("Lighting mode: {}", self.settings.lighting_mode.label());
            }
            Command::Screenshot => {
                self.renderer.save_buffer_to_image(SCREENSHOT_PATH)?;
                log::info!("Saved color buffer to {}", SCREENSHOT_PATH);
            }
        }
        Ok(())
    }

    /// Convert an absolute mouse position into a look delta
    pub fn look_input(&mut self, mouse: (f32, f32), active: bool) -> LookInput {
        let (dx, dy) = match self.last_mouse {
            Some((lx, ly)) => (mouse.0 - lx, mouse.1 - ly),
            None => (0.0, 0.0),
        };
        self.last_mouse = Some(mouse);
        LookInput { dx, dy, active }
    }

    /// Update the scene and render one frame
    pub fn frame(&mut self, elapsed: f32, movement: MoveInput, look: LookInput) -> FrameStats {
        self.renderer.update(elapsed, movement, look, &self.settings);
        self.renderer.render(&self.settings)
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "ON"
    } else {
        "OFF"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::{Camera, Light, LightingMode};

    fn empty_app() -> AppState {
        AppState::new(Renderer::new(4, 4, Camera::default(), Vec::new(), None, Light::default()))
    }

    #[test]
    fn test_toggles_flip_settings() {
        let mut app = empty_app();
        app.apply(Command::ToggleDepthVisualization).unwrap();
        app.apply(Command::ToggleRotation).unwrap();
        app.apply(Command::ToggleNormalMap).unwrap();
        app.apply(Command::CycleLightingMode).unwrap();

        assert!(app.settings.visualize_depth);
        assert!(app.settings.rotate_meshes);
        assert!(!app.settings.use_normal_map);
        assert_eq!(app.settings.lighting_mode, LightingMode::ObservedArea);
    }

    #[test]
    fn test_first_look_has_no_delta() {
        let mut app = empty_app();
        let first = app.look_input((100.0, 50.0), true);
        assert_eq!((first.dx, first.dy), (0.0, 0.0));

        let second = app.look_input((103.0, 48.0), true);
        assert_eq!((second.dx, second.dy), (3.0, -2.0));
        assert!(second.active);
    }

    #[test]
    fn test_frame_with_no_meshes_draws_nothing() {
        let mut app = empty_app();
        let stats = app.frame(0.016, MoveInput::default(), LookInput::default());
        assert_eq!(stats, FrameStats::default());
    }
}
