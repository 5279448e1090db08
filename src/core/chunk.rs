use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::core::material::MaterialCategory;
use crate::world::generator::ChunkGenerator;
use crate::world::store::VisitedChunks;

/// Chunk-grid coordinate, `floor(world / CHUNK_SIZE)` on each horizontal axis.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default, Serialize, Deserialize)]
pub struct ChunkKey {
    pub x: i32,
    pub z: i32,
}

impl ChunkKey {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    pub fn from_world(x: f32, z: f32) -> Self {
        Self::containing(x as f64, z as f64)
    }

    /// Chunk holding the world column at `(x, z)`, clamped to
    /// `±WORLD_CHUNK_LIMIT` on each axis.
    pub fn containing(x: f64, z: f64) -> Self {
        let axis = |v: f64| {
            ((v / CHUNK_SIZE as f64).floor() as i32).clamp(-WORLD_CHUNK_LIMIT, WORLD_CHUNK_LIMIT)
        };
        Self { x: axis(x), z: axis(z) }
    }

    pub fn from_block(x: i32, z: i32) -> Self {
        Self {
            x: x.div_euclid(CHUNK_SIZE),
            z: z.div_euclid(CHUNK_SIZE),
        }
    }

    pub fn chebyshev(&self, other: ChunkKey) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }

    /// World coordinate of the chunk's minimum corner column.
    pub fn origin(&self) -> (i32, i32) {
        (self.x * CHUNK_SIZE, self.z * CHUNK_SIZE)
    }

    /// World-space box covering the chunk's full built height.
    pub fn world_bounds(&self) -> (Vec3, Vec3) {
        let (wx, wz) = self.origin();
        (
            Vec3::new(wx as f32, WORLD_MIN_Y as f32, wz as f32),
            Vec3::new(
                (wx + CHUNK_SIZE) as f32,
                WORLD_TOP_Y,
                (wz + CHUNK_SIZE) as f32,
            ),
        )
    }
}

/// Generated block instances of one 16x16 column area, grouped per material.
#[derive(Clone, Debug, PartialEq)]
pub struct Chunk {
    instances: [Vec<Vec3>; MaterialCategory::COUNT],
    // parallel to the Branch list
    branch_angles: Vec<f32>,
    generated: bool,
}

impl Default for Chunk {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunk {
    pub fn new() -> Self {
        Chunk {
            instances: std::array::from_fn(|_| Vec::new()),
            branch_angles: Vec::new(),
            generated: false,
        }
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    /// Populates the chunk once and records it as visited. Returns whether
    /// any work was done.
    pub fn generate(
        &mut self,
        key: ChunkKey,
        generator: &ChunkGenerator,
        visited: &mut VisitedChunks,
    ) -> bool {
        if self.generated {
            return false;
        }
        generator.populate(key, self);
        self.generated = true;
        visited.record(key);
        true
    }

    /// Populates the chunk without touching the visited set. Used off the
    /// main thread, where the caller merges visits afterwards.
    pub fn generate_detached(&mut self, key: ChunkKey, generator: &ChunkGenerator) -> bool {
        if self.generated {
            return false;
        }
        generator.populate(key, self);
        self.generated = true;
        true
    }

    #[inline]
    pub fn push(&mut self, category: MaterialCategory, position: Vec3) {
        debug_assert!(!category.is_rotated(), "{category:?} needs an angle");
        self.instances[category.index()].push(position);
    }

    pub fn push_rotated(&mut self, category: MaterialCategory, position: Vec3, angle: f32) {
        debug_assert!(category.is_rotated());
        self.instances[category.index()].push(position);
        self.branch_angles.push(angle);
    }

    pub fn positions(&self, category: MaterialCategory) -> &[Vec3] {
        &self.instances[category.index()]
    }

    /// Rotated instances as `(x, y, z, angle_radians)`.
    pub fn rotated_instances(&self) -> impl Iterator<Item = Vec4> + '_ {
        self.positions(MaterialCategory::Branch)
            .iter()
            .zip(&self.branch_angles)
            .map(|(p, a)| p.extend(*a))
    }

    pub fn instance_count(&self) -> usize {
        self.instances.iter().map(Vec::len).sum()
    }

    /// One-material summary of the chunk for the overview map. Water wins
    /// once more than `water_cells` sea-level cells exist, then sand, then
    /// snow, then grass.
    pub fn dominant_surface(&self, water_cells: usize) -> MaterialCategory {
        let water = self
            .positions(MaterialCategory::Water)
            .iter()
            .filter(|p| p.y.abs() < 0.1)
            .count();
        if water > water_cells {
            MaterialCategory::Water
        } else if !self.positions(MaterialCategory::Sand).is_empty() {
            MaterialCategory::Sand
        } else if !self.positions(MaterialCategory::Snow).is_empty() {
            MaterialCategory::Snow
        } else {
            MaterialCategory::Grass
        }
    }
}
