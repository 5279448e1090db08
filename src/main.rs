//! Headless flyover
//!
//! Flies a camera east across the world, streaming, culling and batching
//! chunks every frame without opening a window.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use glam::{Mat4, Vec3, Vec4};

use voxelscape::{MaterialCategory, Renderer, World, WorldSettings, load_settings, save_settings};

/// Headless voxel world flyover
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// World seed (overrides the settings file)
    #[arg(long)]
    seed: Option<u32>,

    /// Render distance in chunks (overrides the settings file)
    #[arg(long)]
    render_distance: Option<i32>,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 120)]
    frames: u32,

    /// Camera speed in blocks per frame
    #[arg(long, default_value_t = 4.0)]
    speed: f32,

    /// Camera height above sea level
    #[arg(long, default_value_t = 60.0)]
    height: f32,

    /// Generation worker threads (0 generates inline; defaults to the core count)
    #[arg(long)]
    workers: Option<usize>,

    /// Rebuild the overview map every N frames
    #[arg(long, default_value_t = 30)]
    overview_every: u32,

    /// Load settings from a bincode file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Write the effective settings to a bincode file
    #[arg(long)]
    write_settings: Option<PathBuf>,
}

/// Stands in for a GPU backend: counts what it is handed.
#[derive(Default)]
struct LogRenderer {
    frame: u64,
    instances: usize,
    batches: usize,
    total_instances: u64,
}

impl Renderer for LogRenderer {
    fn submit(&mut self, _category: MaterialCategory, positions: &[Vec3]) {
        self.instances += positions.len();
        self.batches += 1;
    }

    fn submit_rotated(&mut self, _category: MaterialCategory, instances: &[Vec4]) {
        self.instances += instances.len();
        self.batches += 1;
    }

    fn finish_frame(&mut self, camera_position: Vec3) {
        tracing::debug!(
            "Frame {} at ({:.1}, {:.1}, {:.1}): {} instances in {} batches",
            self.frame,
            camera_position.x,
            camera_position.y,
            camera_position.z,
            self.instances,
            self.batches
        );
        self.total_instances += self.instances as u64;
        self.frame += 1;
        self.instances = 0;
        self.batches = 0;
    }
}

fn effective_settings(args: &Args) -> Result<WorldSettings> {
    let mut settings = match &args.settings {
        Some(path) => load_settings(path)?,
        None => WorldSettings {
            workers: num_cpus::get(),
            ..WorldSettings::default()
        },
    };
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    if let Some(render_distance) = args.render_distance {
        settings.render_distance = render_distance.max(0);
    }
    if let Some(workers) = args.workers {
        settings.workers = workers;
    }
    Ok(settings)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let settings = effective_settings(&args)?;
    if let Some(path) = &args.write_settings {
        save_settings(path, &settings)?;
        tracing::info!("Settings written to {}", path.display());
    }

    let mut world = World::new(&settings).context("starting chunk generation workers")?;
    let mut renderer = LogRenderer::default();
    let projection = Mat4::perspective_rh_gl(70f32.to_radians(), 16.0 / 9.0, 0.1, 1000.0);
    let direction = Vec3::new(1.0, -0.25, 0.0).normalize();

    tracing::info!("Starting flyover: {} frames", args.frames);
    let started = Instant::now();
    let mut visible_total = 0usize;

    for frame in 0..args.frames {
        let eye = Vec3::new(frame as f32 * args.speed, args.height, 8.0);
        let view_proj = projection * Mat4::look_to_rh(eye, direction, Vec3::Y);

        world.update(eye);
        let instances = world.frame_instances(&view_proj);
        visible_total += instances.chunk_count();
        instances.submit_to(&mut renderer, eye);

        world.refresh_local_map(Instant::now(), eye);
        if args.overview_every > 0 && frame % args.overview_every == 0 {
            world.refresh_overview();
        }
    }
    world.refresh_overview();

    let frames = args.frames.max(1) as f64;
    tracing::info!(
        "Flyover done in {:.2?}: {} frames, {} chunks resident, {} chunks visited, {:.1} visible chunks per frame, {:.0} instances per frame",
        started.elapsed(),
        args.frames,
        world.store().len(),
        world.store().visited().len(),
        visible_total as f64 / frames,
        renderer.total_instances as f64 / frames
    );
    Ok(())
}
