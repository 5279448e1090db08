//! World generation and storage
//! Noise, terrain classification, props, chunk population, streaming and the frame facade.

pub mod generator;
pub mod loader;
pub mod noise;
pub mod props;
pub mod state;
pub mod store;
pub mod terrain;

// Re-export commonly used types
pub use generator::ChunkGenerator;
pub use loader::{ChunkGenRequest, ChunkGenResult, GenerationPool};
pub use noise::NoiseField;
pub use props::{Gate, PropGenerator, TreeKind, tree_collision};
pub use state::World;
pub use store::{ChunkStore, UpdateStats, VisitedChunks};
pub use terrain::{TerrainClassifier, TerrainSample};
