//! Thread-safe chunk population.
//!
//! A `ChunkGenerator` holds only immutable noise tables, so one instance is
//! shared between the main thread and every generation worker.

use glam::Vec3;

use crate::constants::*;
use crate::core::chunk::{Chunk, ChunkKey};
use crate::core::material::MaterialCategory;
use crate::utils::settings::WorldSettings;
use crate::world::noise::NoiseField;
use crate::world::props::PropGenerator;
use crate::world::terrain::{TerrainClassifier, TerrainSample};

pub struct ChunkGenerator {
    terrain: TerrainClassifier,
    props: PropGenerator,
    noise_cave: NoiseField,
    noise_liquid: NoiseField,
    noise_aurora: NoiseField,
}

impl ChunkGenerator {
    pub fn new(settings: &WorldSettings) -> Self {
        ChunkGenerator {
            terrain: TerrainClassifier::new(settings),
            props: PropGenerator::new(),
            noise_cave: NoiseField::new(settings.cave_seed()),
            noise_liquid: NoiseField::new(settings.liquid_seed()),
            noise_aurora: NoiseField::new(settings.aurora_seed()),
        }
    }

    pub fn terrain(&self) -> &TerrainClassifier {
        &self.terrain
    }

    /// Builds a fresh, fully generated chunk.
    pub fn generate_chunk(&self, key: ChunkKey) -> Chunk {
        let mut chunk = Chunk::new();
        chunk.generate_detached(key, self);
        chunk
    }

    /// Fills every material list of `chunk` for the area under `key`.
    pub fn populate(&self, key: ChunkKey, chunk: &mut Chunk) {
        let (base_x, base_z) = key.origin();

        for lx in 0..CHUNK_SIZE {
            for lz in 0..CHUNK_SIZE {
                let x = base_x + lx;
                let z = base_z + lz;
                let sample = self.terrain.classify(x as f64, z as f64);
                if sample.is_land {
                    self.land_column(chunk, key, x, z, sample);
                } else {
                    self.water_column(chunk, x, z);
                }
            }
        }

        // Aurora pass
        for lx in 0..CHUNK_SIZE {
            for lz in 0..CHUNK_SIZE {
                let x = base_x + lx;
                let z = base_z + lz;
                for y in AURORA_MIN_Y..=AURORA_MAX_Y {
                    let n = self.noise_aurora.sample(
                        x as f64 * AURORA_FREQUENCY,
                        y as f64 * AURORA_FREQUENCY,
                        z as f64 * AURORA_FREQUENCY,
                    );
                    if n > AURORA_THRESHOLD {
                        chunk.push(MaterialCategory::Aurora, block(x, y, z));
                    }
                }
            }
        }
    }

    fn water_column(&self, chunk: &mut Chunk, x: i32, z: i32) {
        chunk.push(MaterialCategory::Water, block(x, 0, z));
        self.props.populate_water_column(&self.terrain, chunk, x, z);

        for y in (WORLD_MIN_Y..0).rev() {
            let cave = self.noise_cave.sample(
                x as f64 * SEABED_CAVE_FREQUENCY,
                y as f64 * SEABED_CAVE_FREQUENCY,
                z as f64 * SEABED_CAVE_FREQUENCY,
            );
            let category = if cave < SEABED_CAVE_THRESHOLD {
                MaterialCategory::Stone
            } else {
                MaterialCategory::Water
            };
            chunk.push(category, block(x, y, z));
        }
    }

    fn land_column(&self, chunk: &mut Chunk, key: ChunkKey, x: i32, z: i32, sample: TerrainSample) {
        debug_assert!(sample.is_land, "land path reached for water column ({x}, {z})");
        let ground = sample.height.floor() as i32;

        let surface = self.terrain.surface_material(key).category();
        chunk.push(surface, block(x, ground, z));
        chunk.push(MaterialCategory::Dirt, block(x, ground - 1, z));

        let cold = self.terrain.cold_liquid(key);
        for y in (WORLD_MIN_Y..=ground - 2).rev() {
            let category = if y >= 0 {
                MaterialCategory::Stone
            } else {
                self.underground(x, y, z, cold)
            };
            chunk.push(category, block(x, y, z));
        }

        if sample.height > PROP_MIN_HEIGHT {
            self.props
                .populate_land_column(&self.terrain, chunk, key, x, z, ground);
        }
    }

    /// Carves open space below sea level and fills it with cold liquid or lava.
    fn underground(&self, x: i32, y: i32, z: i32, cold: MaterialCategory) -> MaterialCategory {
        let cave = self.noise_cave.sample(
            x as f64 * DEEP_CAVE_FREQUENCY,
            y as f64 * DEEP_CAVE_FREQUENCY,
            z as f64 * DEEP_CAVE_FREQUENCY,
        );
        if cave < DEEP_CAVE_THRESHOLD {
            return MaterialCategory::Stone;
        }
        let liquid = self.noise_liquid.sample(
            x as f64 * LIQUID_FREQUENCY,
            y as f64 * LIQUID_FREQUENCY,
            z as f64 * LIQUID_FREQUENCY,
        );
        if liquid < LIQUID_THRESHOLD {
            cold
        } else {
            MaterialCategory::Lava
        }
    }
}

#[inline]
fn block(x: i32, y: i32, z: i32) -> Vec3 {
    Vec3::new(x as f32, y as f32, z as f32)
}
