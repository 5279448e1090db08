//! Core data structures
//! Chunk keys and instance lists, material categories and region rules.

pub mod biome;
pub mod chunk;
pub mod material;

// Re-export commonly used types
pub use biome::{ChunkBand, ForestKind, RegionEffect, RegionRule, RegionRules, SurfaceMaterial};
pub use chunk::{Chunk, ChunkKey};
pub use material::MaterialCategory;
