//! softraster: CPU triangle rasterizer
//!
//! Renders a textured, normal-mapped mesh entirely in software and
//! presents the color buffer through a macroquad window:
//! - Perspective-correct attributes with a depth buffer
//! - Observed-area / diffuse / specular / combined lighting
//! - Free-look camera (WASD + right mouse drag)

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod rasterizer;
mod scene;
mod app;

use std::path::Path;

use macroquad::prelude::*;
use rasterizer::{MoveInput, HEIGHT, WIDTH};
use scene::{demo_scene, load_scene, Scene};
use app::{AppState, Command};

const SCENE_PATH: &str = "assets/scene.ron";
/// Frames between debug-level frame statistics
const STATS_INTERVAL: u64 = 120;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("softraster v{}", VERSION),
        window_width: WIDTH as i32,
        window_height: HEIGHT as i32,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

/// Scene file if present, otherwise the built-in demo
fn startup_scene() -> Result<Scene, Box<dyn std::error::Error>> {
    if Path::new(SCENE_PATH).exists() {
        log::info!("Loading scene from {}", SCENE_PATH);
        Ok(load_scene(SCENE_PATH)?)
    } else {
        log::warn!("{} not found, using the built-in demo scene", SCENE_PATH);
        Ok(demo_scene()?)
    }
}

fn poll_movement() -> MoveInput {
    MoveInput {
        forward: is_key_down(KeyCode::W),
        back: is_key_down(KeyCode::S),
        left: is_key_down(KeyCode::A),
        right: is_key_down(KeyCode::D),
    }
}

fn poll_commands() -> Vec<Command> {
    [
        (KeyCode::F4, Command::ToggleDepthVisualization),
        (KeyCode::F5, Command::ToggleRotation),
        (KeyCode::F6, Command::ToggleNormalMap),
        (KeyCode::F7, Command::CycleLightingMode),
        (KeyCode::X, Command::Screenshot),
    ]
    .into_iter()
    .filter(|(key, _)| is_key_pressed(*key))
    .map(|(_, command)| command)
    .collect()
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("=== softraster v{} ===", VERSION);

    let scene = match startup_scene() {
        Ok(scene) => scene,
        Err(e) => {
            log::error!("Failed to load scene: {}", e);
            std::process::exit(1);
        }
    };
    log::info!(
        "Framebuffer {}x{}, {} mesh(es)",
        scene.width,
        scene.height,
        scene.meshes.len()
    );

    let mut app = AppState::new(scene.into_renderer());
    log::info!("Lighting mode: {}", app.settings.lighting_mode.label());

    let mut frame_count: u64 = 0;

    loop {
        for command in poll_commands() {
            if let Err(e) = app.apply(command) {
                log::error!("Screenshot failed: {}", e);
            }
        }

        let look = app.look_input(mouse_position(), is_mouse_button_down(MouseButton::Right));
        let stats = app.frame(get_frame_time(), poll_movement(), look);
        if frame_count % STATS_INTERVAL == 0 {
            log::debug!(
                "Frame {}: {} triangles, {} pixels written, {} fps",
                frame_count,
                stats.triangles,
                stats.pixels_written,
                get_fps()
            );
        }
        frame_count += 1;

        // Present the software framebuffer scaled to the window
        let fb = app.renderer.framebuffer();
        let texture = Texture2D::from_rgba8(fb.width as u16, fb.height as u16, &fb.pixels);
        texture.set_filter(FilterMode::Nearest);

        clear_background(BLACK);
        draw_texture_ex(
            &texture,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(screen_width(), screen_height())),
                ..Default::default()
            },
        );

        next_frame().await;
    }
}
