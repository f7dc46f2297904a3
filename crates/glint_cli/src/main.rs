//! glint - offline CSG ray tracer.
//!
//! Loads a JSON scene description, renders it and writes a PNG.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use glint_core::SceneDescription;
use glint_renderer::{
    assemble, build_camera, render, RenderSettings, ToneExposure, TraceLimits,
};

#[derive(Parser)]
#[command(name = "glint", version, about = "Offline CSG ray tracer")]
struct Args {
    /// Scene description file (JSON)
    #[arg(long, short)]
    scene: PathBuf,

    /// Output image width in pixels
    #[arg(long, default_value_t = 1024)]
    width: u32,

    /// Output image height in pixels
    #[arg(long, default_value_t = 768)]
    height: u32,

    /// Output PNG path
    #[arg(long, short, default_value = "render.png")]
    output: PathBuf,

    /// Override the scene's maximum recursion depth (negative = unlimited)
    #[arg(long)]
    trace_depth: Option<i32>,

    /// Derive the exposure factor from a scene probe
    #[arg(long, conflicts_with = "exposure")]
    auto_exposure: bool,

    /// Fixed exposure factor
    #[arg(long, allow_hyphen_values = true)]
    exposure: Option<f32>,

    /// Skip sRGB gamma encoding of the output
    #[arg(long)]
    no_gamma: bool,

    /// Bucket edge length in pixels
    #[arg(long, default_value_t = 64)]
    bucket_size: u32,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let description = SceneDescription::from_path(&args.scene)
        .with_context(|| format!("loading scene {}", args.scene.display()))?;

    let mut scene = assemble(&description).context("assembling scene")?;
    if let Some(depth) = args.trace_depth {
        scene.set_limits(TraceLimits {
            max_recursion_depth: depth,
        });
    }

    let camera = build_camera(&description.camera, args.width, args.height);

    let settings = RenderSettings {
        exposure: if args.auto_exposure {
            ToneExposure::Auto
        } else {
            match args.exposure {
                Some(factor) => ToneExposure::Manual(factor),
                None => ToneExposure::Off,
            }
        },
        srgb_gamma: !args.no_gamma,
        bucket_size: args.bucket_size,
    };

    log::info!(
        "rendering {} at {}x{}",
        args.scene.display(),
        args.width,
        args.height
    );
    let start = Instant::now();
    let buffer = render(&scene, &camera, &settings);
    log::info!("rendered in {:.2?}", start.elapsed());

    let image = image::RgbaImage::from_raw(buffer.width, buffer.height, buffer.to_rgba())
        .context("building output image")?;
    image
        .save(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;

    println!("wrote {}", args.output.display());
    Ok(())
}
