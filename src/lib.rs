// Core module with chunk, material and region types
pub mod core;

// Render module with culling, batching and map caches
pub mod render;

// World module with generation and streaming
pub mod world;

// Settings and persistence
pub mod utils;

// Other modules
pub mod constants;

// Re-exports
pub use constants::*;
pub use crate::core::{Chunk, ChunkKey, MaterialCategory, RegionRules, SurfaceMaterial};
pub use crate::render::{FrameInstances, Frustum, MapVertex, Renderer, SpatialIndex};
pub use crate::utils::{WorldSettings, load_settings, save_settings};
pub use crate::world::{
    ChunkGenerator, ChunkStore, GenerationPool, NoiseField, PropGenerator, TerrainClassifier,
    TerrainSample, World,
};
