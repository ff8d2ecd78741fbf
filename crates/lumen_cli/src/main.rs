mod cli;
mod demo;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Args;
use lumen_renderer::{FrameState, PathTracer, RenderConfig};
use std::path::Path;
use std::time::Instant;

fn load_config(path: &Path) -> Result<RenderConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse config {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.clone().into())
        .init();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => RenderConfig::default(),
    };
    if args.no_bvh {
        config.use_bvh = false;
    }
    if args.sort {
        config.sort_by_material = true;
    }

    let scene = demo::cornell_box(args.width, args.height, args.depth);
    let mut tracer = PathTracer::new(scene, config).context("Failed to initialize path tracer")?;

    log::info!("Rendering {} iterations", args.iterations);
    let start = Instant::now();
    for iteration in 0..args.iterations {
        let frame = if iteration == 0 {
            FrameState::changed()
        } else {
            FrameState::unchanged()
        };
        if let Err(err) = tracer.render_iteration(iteration, frame) {
            log::error!("Render failed: {}", err);
            return Err(err).with_context(|| format!("Iteration {} failed", iteration));
        }
        if (iteration + 1) % 16 == 0 {
            log::info!("{}/{} iterations", iteration + 1, args.iterations);
        }
    }
    log::info!("Rendered in {:?}", start.elapsed());

    let accumulated = tracer.teardown();
    let rgba = accumulated.to_rgba8();
    image::save_buffer(
        &args.output,
        &rgba,
        accumulated.width(),
        accumulated.height(),
        image::ColorType::Rgba8,
    )
    .with_context(|| format!("Failed to write {}", args.output.display()))?;
    log::info!("Saved to {}", args.output.display());

    Ok(())
}
