//! Coordinate-banded region overrides.
//!
//! Oceans, highlands, deserts, poles and forest belts are keyed on raw chunk
//! coordinates rather than noise. They live in one ordered rule list so that
//! chunk generation and both map caches read identical answers.

use serde::{Deserialize, Serialize};

use crate::core::chunk::ChunkKey;
use crate::core::material::MaterialCategory;

/// Top block of a land column.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum SurfaceMaterial {
    #[default]
    Grass,
    Sand,
    Snow,
}

impl SurfaceMaterial {
    pub fn category(&self) -> MaterialCategory {
        match self {
            SurfaceMaterial::Grass => MaterialCategory::Grass,
            SurfaceMaterial::Sand => MaterialCategory::Sand,
            SurfaceMaterial::Snow => MaterialCategory::Snow,
        }
    }

    pub fn map_color(&self) -> [f32; 3] {
        self.category().color()
    }
}

/// Which trunked trees a band grows.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum ForestKind {
    /// Giant pines only, trunk extended far above the canopy.
    Taiga,
    /// Pine, fir, oak and ancient trees.
    Mixed,
    /// Fir, oak and ancient trees.
    Broadleaf,
    #[default]
    Open,
}

impl ForestKind {
    pub fn has_pines(&self) -> bool {
        matches!(self, ForestKind::Taiga | ForestKind::Mixed)
    }

    pub fn has_broadleaf(&self) -> bool {
        matches!(self, ForestKind::Mixed | ForestKind::Broadleaf)
    }
}

/// Inclusive, optionally open-ended rectangle in chunk coordinates.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct ChunkBand {
    pub min_x: Option<i32>,
    pub max_x: Option<i32>,
    pub min_z: Option<i32>,
    pub max_z: Option<i32>,
}

impl ChunkBand {
    pub fn x(min: Option<i32>, max: Option<i32>) -> Self {
        Self {
            min_x: min,
            max_x: max,
            ..Self::default()
        }
    }

    pub fn z(min: Option<i32>, max: Option<i32>) -> Self {
        Self {
            min_z: min,
            max_z: max,
            ..Self::default()
        }
    }

    pub fn contains(&self, key: ChunkKey) -> bool {
        self.min_x.is_none_or(|m| key.x >= m)
            && self.max_x.is_none_or(|m| key.x <= m)
            && self.min_z.is_none_or(|m| key.z >= m)
            && self.max_z.is_none_or(|m| key.z <= m)
    }
}

#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub enum RegionEffect {
    /// Column is water regardless of the continental mask.
    Ocean,
    /// Replaces the elevation and ridge weights of land columns.
    Relief { elevation_weight: f64, ridge_weight: f64 },
    Surface(SurfaceMaterial),
    /// Underground cold liquid freezes.
    FrozenLiquid,
    Forest(ForestKind),
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct RegionRule {
    pub name: String,
    pub band: ChunkBand,
    pub effect: RegionEffect,
}

impl RegionRule {
    pub fn new(name: &str, band: ChunkBand, effect: RegionEffect) -> Self {
        Self {
            name: name.to_string(),
            band,
            effect,
        }
    }
}

/// Ordered rule list. For every effect kind the first rule whose band holds
/// the key wins; later rules of the same kind are shadowed.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct RegionRules {
    pub rules: Vec<RegionRule>,
}

impl Default for RegionRules {
    fn default() -> Self {
        Self {
            rules: vec![
                RegionRule::new(
                    "northern-ocean-belt",
                    ChunkBand::z(Some(290), Some(1023)),
                    RegionEffect::Ocean,
                ),
                RegionRule::new(
                    "southern-ocean-belt",
                    ChunkBand::z(Some(-255), Some(-200)),
                    RegionEffect::Ocean,
                ),
                RegionRule::new(
                    "highlands",
                    ChunkBand::x(Some(-40), Some(-21)),
                    RegionEffect::Relief {
                        elevation_weight: 128.0,
                        ridge_weight: 96.0,
                    },
                ),
                RegionRule::new(
                    "desert",
                    ChunkBand::x(Some(160), None),
                    RegionEffect::Surface(SurfaceMaterial::Sand),
                ),
                RegionRule::new(
                    "polar",
                    ChunkBand::z(None, Some(-160)),
                    RegionEffect::Surface(SurfaceMaterial::Snow),
                ),
                RegionRule::new(
                    "frozen-depths",
                    ChunkBand::z(None, Some(-20)),
                    RegionEffect::FrozenLiquid,
                ),
                RegionRule::new(
                    "taiga",
                    ChunkBand::z(None, Some(-40)),
                    RegionEffect::Forest(ForestKind::Taiga),
                ),
                RegionRule::new(
                    "broadleaf",
                    ChunkBand::z(Some(40), None),
                    RegionEffect::Forest(ForestKind::Broadleaf),
                ),
                RegionRule::new(
                    "mixed-woodland",
                    ChunkBand::x(None, Some(19)),
                    RegionEffect::Forest(ForestKind::Mixed),
                ),
            ],
        }
    }
}

impl RegionRules {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    fn first_effect<T>(
        &self,
        key: ChunkKey,
        pick: impl Fn(&RegionEffect) -> Option<T>,
    ) -> Option<T> {
        self.rules
            .iter()
            .filter(|rule| rule.band.contains(key))
            .find_map(|rule| pick(&rule.effect))
    }

    pub fn forces_ocean(&self, key: ChunkKey) -> bool {
        self.first_effect(key, |effect| match effect {
            RegionEffect::Ocean => Some(()),
            _ => None,
        })
        .is_some()
    }

    pub fn relief(&self, key: ChunkKey) -> Option<(f64, f64)> {
        self.first_effect(key, |effect| match *effect {
            RegionEffect::Relief {
                elevation_weight,
                ridge_weight,
            } => Some((elevation_weight, ridge_weight)),
            _ => None,
        })
    }

    pub fn surface(&self, key: ChunkKey) -> SurfaceMaterial {
        self.first_effect(key, |effect| match *effect {
            RegionEffect::Surface(material) => Some(material),
            _ => None,
        })
        .unwrap_or_default()
    }

    /// Fill for open underground space that is not lava.
    pub fn cold_liquid(&self, key: ChunkKey) -> MaterialCategory {
        let frozen = self
            .first_effect(key, |effect| match effect {
                RegionEffect::FrozenLiquid => Some(()),
                _ => None,
            })
            .is_some();
        if frozen {
            MaterialCategory::Ice
        } else {
            MaterialCategory::Water
        }
    }

    pub fn forest(&self, key: ChunkKey) -> ForestKind {
        self.first_effect(key, |effect| match *effect {
            RegionEffect::Forest(kind) => Some(kind),
            _ => None,
        })
        .unwrap_or_default()
    }
}
