//! rasterizr viewer
//!
//! Renders a RON scene (or the built-in demo) on the CPU pipeline and shows
//! the resolved target in a window, or writes it straight to a PNG.
//!
//! Keys:
//! - W: toggle wireframe / solid fill
//! - M: toggle 4x multisampling
//! - S: save the current image to `rasterizr.png`
//! - Escape: quit

use std::path::PathBuf;

use clap::Parser;
use log::{error, info};
use macroquad::prelude::*;

use rasterizr::pipeline::rasterizer::FillMode;
use rasterizr::scene::{load_scene, Scene, SceneError};

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const SCREENSHOT_PATH: &str = "rasterizr.png";

/// rasterizr - software rasterization pipeline viewer
#[derive(Parser, Debug)]
#[command(name = "rasterizr", version, about = "CPU rasterization pipeline viewer")]
struct Args {
    /// Scene file (RON). Renders the built-in demo when omitted.
    #[arg(short, long)]
    scene: Option<PathBuf>,

    /// Write the rendered image to this PNG and exit without opening a window
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Window pixels per rendered pixel
    #[arg(long, default_value_t = 3)]
    scale: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), SceneError> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    info!("rasterizr v{}", VERSION);

    let scene = match &args.scene {
        Some(path) => {
            info!("Loading scene from: {}", path.display());
            load_scene(path)?
        }
        None => Scene::demo(),
    };

    if let Some(output) = &args.output {
        scene.render_to_png(output)?;
        info!("Wrote {}", output.display());
        return Ok(());
    }

    let (width, height) = scene.viewer_size()?;
    let scale = args.scale.clamp(1, 16) as i32;
    let conf = Conf {
        window_title: format!("rasterizr v{}", VERSION),
        window_width: width as i32 * scale,
        window_height: height as i32 * scale,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    };

    macroquad::Window::from_config(conf, run_viewer(scene));
    Ok(())
}

/// Render `scene` into a nearest-filtered texture, logging failures
fn render_texture(scene: &Scene) -> Option<Texture2D> {
    let rendered = scene.viewer_size().and_then(|size| Ok((size, scene.render()?)));
    match rendered {
        Ok(((width, height), device)) => {
            let target = &device.output_merger.render_target;
            let texture = Texture2D::from_rgba8(width, height, &target.resolve());
            texture.set_filter(FilterMode::Nearest);
            Some(texture)
        }
        Err(e) => {
            error!("Render failed: {}", e);
            None
        }
    }
}

async fn run_viewer(mut scene: Scene) {
    let mut texture = render_texture(&scene);

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        let mut dirty = false;
        if is_key_pressed(KeyCode::W) {
            scene.rasterizer.fill_mode = match scene.rasterizer.fill_mode {
                FillMode::Solid => FillMode::Wireframe,
                FillMode::Wireframe => FillMode::Solid,
            };
            info!("Fill mode: {:?}", scene.rasterizer.fill_mode);
            dirty = true;
        }
        if is_key_pressed(KeyCode::M) {
            scene.rasterizer.multisample_enabled = !scene.rasterizer.multisample_enabled;
            if scene.rasterizer.multisample_count < 2 {
                scene.rasterizer.multisample_count = 4;
            }
            info!(
                "Multisampling: {} ({}x)",
                scene.rasterizer.multisample_enabled, scene.rasterizer.multisample_count
            );
            dirty = true;
        }
        if dirty {
            texture = render_texture(&scene);
        }

        if is_key_pressed(KeyCode::S) {
            match scene.render_to_png(SCREENSHOT_PATH) {
                Ok(()) => info!("Saved {}", SCREENSHOT_PATH),
                Err(e) => error!("Save failed: {}", e),
            }
        }

        clear_background(BLACK);

        if let Some(texture) = &texture {
            // Fit the image to the window, keeping its aspect ratio
            let fit = (screen_width() / texture.width()).min(screen_height() / texture.height());
            let (draw_w, draw_h) = (texture.width() * fit, texture.height() * fit);
            draw_texture_ex(
                texture,
                (screen_width() - draw_w) * 0.5,
                (screen_height() - draw_h) * 0.5,
                WHITE,
                DrawTextureParams {
                    dest_size: Some(vec2(draw_w, draw_h)),
                    ..Default::default()
                },
            );
        }

        draw_text(
            &format!(
                "{:?} | MSAA {} | W fill, M msaa, S save",
                scene.rasterizer.fill_mode,
                if scene.rasterizer.multisample_enabled { "on" } else { "off" }
            ),
            8.0,
            20.0,
            18.0,
            Color::from_rgba(200, 200, 200, 255),
        );

        next_frame().await;
    }
}
