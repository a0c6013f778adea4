use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use lux_core::{SceneDescription, TextureCache};
use lux_renderer::{render, Camera, RenderConfig, Scene};

mod cli;

use cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level.into())
        .parse_default_env()
        .init();

    if args.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build_global()
            .context("Failed to configure the worker pool")?;
    }

    let start = Instant::now();
    let desc = SceneDescription::from_path(&args.scene)
        .with_context(|| format!("Failed to load scene {}", args.scene.display()))?;

    let base_dir = args.scene.parent().unwrap_or_else(|| Path::new("."));
    let mut textures = TextureCache::with_base_dir(base_dir);
    let scene = Scene::from_description(&desc, &mut textures)
        .with_context(|| format!("Failed to build scene {}", args.scene.display()))?;
    log::info!(
        "Scene ready in {:.2?} ({} textures)",
        start.elapsed(),
        textures.len()
    );

    let camera = Camera::from_description(&desc.camera);
    let mut config = RenderConfig::from_description(&desc);
    if let Some(samples) = args.samples {
        config.samples_per_pixel = samples.max(1);
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let image = render(&camera, &scene, &config);
    let tone = config.tone_mapper();

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            image
                .write_ppm(&mut writer, &tone)
                .and_then(|()| writer.flush())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => {
            let mut writer = BufWriter::new(io::stdout().lock());
            image
                .write_ppm(&mut writer, &tone)
                .and_then(|()| writer.flush())
                .context("Failed to write image to standard output")?;
        }
    }

    log::info!("Total time {:.2?}", start.elapsed());
    Ok(())
}
