use anyhow::{Context, Result};
use glam::Vec3;
use gridcraft::{
    config::WorldConfig,
    utils::math::Ray,
    world::{ChunkDims, World},
};
use log::{info, warn};
use simple_logger::SimpleLogger;
use std::time::Instant;

const TICK: f32 = 1.0 / 20.0;
const SETTLE_TICKS: usize = 4;
const MAX_TICKS: usize = 10_000;

fn load_config() -> Result<WorldConfig> {
    match std::env::args().nth(1) {
        Some(path) => WorldConfig::load(&path).with_context(|| format!("Failed to load config from {path}")),
        None => Ok(WorldConfig::default()),
    }
}

fn spawn_column_height(dims: ChunkDims, sea_level: i64) -> i64 {
    let height = i64::from(dims.height);
    (sea_level / height + 2).max(1)
}

fn main() -> Result<()> {
    let config = load_config()?;
    SimpleLogger::new().with_level(config.level_filter()?).init()?;
    info!("Starting gridcraft world '{}'", config.name);

    let dims = config.chunk_dims();
    let edge = i64::from(config.edge_size);
    let columns = edge.min(4);
    let layers = spawn_column_height(dims, config.terrain.sea_level).min(edge);
    let save = config.save_dir.is_some();
    let mut world = World::new(config)?;

    for cz in 0..columns {
        for cy in 0..layers {
            for cx in 0..columns {
                world.request_chunk_load(cx, cy, cz);
            }
        }
    }

    let started = Instant::now();
    let mut ticks = 0;
    while world.pending_requests() > 0 && ticks < MAX_TICKS {
        world.update(TICK);
        ticks += 1;
    }
    for _ in 0..SETTLE_TICKS {
        let report = world.update(TICK);
        if report.refreshed + report.remeshed + report.contended == 0 {
            break;
        }
    }
    info!("Loaded {} chunks in {} ticks ({:?})", world.stats().resident_chunks, ticks, started.elapsed());

    let center = (columns * i64::from(dims.width)) as f32 / 2.0 + 0.5;
    let top = (layers * i64::from(dims.height)) as f32 + 1.0;
    let ray = Ray::new(Vec3::new(center, top, center), Vec3::NEG_Y).with_max_distance(top + 1.0);
    match world.raycast_world(&ray, true) {
        Some(hit) => info!(
            "Surface below spawn: {} at {:?}, distance {:.1}",
            hit.voxel.info().name,
            hit.position,
            hit.near
        ),
        None => warn!("No solid ground below spawn"),
    }

    let stats = world.stats();
    info!(
        "{} resident chunks, {} visible voxels, {} dirty, light level {}",
        stats.resident_chunks,
        stats.visible_voxels,
        stats.dirty_chunks,
        world.sky().light_level()
    );

    if save {
        let summary = world.save_all();
        if !summary.is_complete() {
            anyhow::bail!("Failed to save {} chunks: {:?}", summary.failed.len(), summary.failed);
        }
        info!("Saved {} chunks", summary.saved);
    }
    Ok(())
}
