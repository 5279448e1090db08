//! Per-column land/water and height classification.

use crate::core::biome::{ForestKind, RegionRules, SurfaceMaterial};
use crate::core::chunk::ChunkKey;
use crate::core::material::MaterialCategory;
use crate::utils::settings::{TerrainSettings, WorldSettings};
use crate::world::noise::NoiseField;

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct TerrainSample {
    pub height: f64,
    pub is_land: bool,
}

/// Pure function of `(x, z)` and the seeds it was built with.
pub struct TerrainClassifier {
    continental: NoiseField,
    elevation: NoiseField,
    ridge: NoiseField,
    settings: TerrainSettings,
}

impl TerrainClassifier {
    pub fn new(settings: &WorldSettings) -> Self {
        TerrainClassifier {
            continental: NoiseField::new(settings.continental_seed()),
            elevation: NoiseField::new(settings.elevation_seed()),
            ridge: NoiseField::new(settings.ridge_seed()),
            settings: settings.terrain.clone(),
        }
    }

    pub fn rules(&self) -> &RegionRules {
        &self.settings.regions
    }

    /// Continental mask rescaled to `[0, 1]`.
    pub fn continental(&self, x: f64, z: f64) -> f64 {
        let scale = self.settings.continental_scale;
        (self.continental.sample_2d(x / scale, z / scale) + 1.0) / 2.0
    }

    pub fn classify(&self, x: f64, z: f64) -> TerrainSample {
        let key = ChunkKey::containing(x, z);
        // ocean columns all share the seabed stub and never sample the relief layers
        if self.rules().forces_ocean(key) || self.continental(x, z) <= self.settings.land_threshold
        {
            return TerrainSample {
                height: self.settings.seabed_height,
                is_land: false,
            };
        }

        let elevation_scale = self.settings.elevation_scale;
        let ridge_scale = self.settings.ridge_scale;
        let elevation =
            (self.elevation.sample_2d(x / elevation_scale, z / elevation_scale) + 1.0) / 2.0;
        let ridge = self.ridge.ridge(x / ridge_scale, 0.0, z / ridge_scale);

        let (a, b) = self
            .rules()
            .relief(key)
            .unwrap_or((self.settings.elevation_weight, self.settings.ridge_weight));

        TerrainSample {
            height: elevation * a + ridge * b,
            is_land: true,
        }
    }

    pub fn surface_material(&self, key: ChunkKey) -> SurfaceMaterial {
        self.rules().surface(key)
    }

    pub fn cold_liquid(&self, key: ChunkKey) -> MaterialCategory {
        self.rules().cold_liquid(key)
    }

    pub fn forest(&self, key: ChunkKey) -> ForestKind {
        self.rules().forest(key)
    }
}
