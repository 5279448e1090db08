use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::core::biome::RegionRules;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WorldSettings {
    pub seed: u32,
    pub render_distance: i32,
    /// Generation threads. 0 generates on the calling thread.
    pub workers: usize,
    pub terrain: TerrainSettings,
    pub map: MapSettings,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            seed: 1,
            render_distance: RENDER_DISTANCE,
            workers: 0,
            terrain: TerrainSettings::default(),
            map: MapSettings::default(),
        }
    }
}

impl WorldSettings {
    pub fn continental_seed(&self) -> u32 {
        self.seed
    }

    pub fn elevation_seed(&self) -> u32 {
        self.seed.wrapping_add(1)
    }

    pub fn ridge_seed(&self) -> u32 {
        self.seed.wrapping_add(2)
    }

    pub fn aurora_seed(&self) -> u32 {
        self.seed.wrapping_add(3)
    }

    pub fn cave_seed(&self) -> u32 {
        self.seed.wrapping_add(4)
    }

    pub fn liquid_seed(&self) -> u32 {
        self.seed.wrapping_add(5)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TerrainSettings {
    pub land_threshold: f64,
    pub seabed_height: f64,
    pub continental_scale: f64,
    pub elevation_scale: f64,
    pub ridge_scale: f64,
    pub elevation_weight: f64,
    pub ridge_weight: f64,
    pub regions: RegionRules,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            land_threshold: LAND_THRESHOLD,
            seabed_height: SEABED_HEIGHT,
            continental_scale: CONTINENTAL_SCALE,
            elevation_scale: ELEVATION_SCALE,
            ridge_scale: RIDGE_SCALE,
            elevation_weight: ELEVATION_WEIGHT,
            ridge_weight: RIDGE_WEIGHT,
            regions: RegionRules::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MapSettings {
    /// Half extent of the local map in world units.
    pub local_radius: i32,
    pub local_refresh_secs: f32,
    /// Overview edge length in chunks.
    pub overview_chunks: i32,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            local_radius: LOCAL_MAP_RADIUS,
            local_refresh_secs: LOCAL_MAP_REFRESH_SECS,
            overview_chunks: OVERVIEW_CHUNKS,
        }
    }
}

pub fn save_settings(path: &Path, settings: &WorldSettings) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating settings file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    bincode::serialize_into(&mut writer, settings)
        .with_context(|| format!("writing settings to {}", path.display()))?;
    Ok(())
}

pub fn load_settings(path: &Path) -> Result<WorldSettings> {
    let file =
        File::open(path).with_context(|| format!("opening settings file {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let settings = bincode::deserialize_from(&mut reader)
        .with_context(|| format!("decoding settings from {}", path.display()))?;
    Ok(settings)
}
