//! Cached 2D map vertex buffers.
//!
//! The local map is rebuilt on a wall-clock interval; the overview only when
//! it is panned or when new chunks have finished generating.

use std::time::{Duration, Instant};

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use crate::constants::*;
use crate::core::biome::SurfaceMaterial;
use crate::core::chunk::ChunkKey;
use crate::core::material::MaterialCategory;
use crate::utils::settings::MapSettings;
use crate::world::store::ChunkStore;
use crate::world::terrain::TerrainClassifier;

pub const WATER_MAP_COLOR: [f32; 3] = [0.0, 0.5, 0.5];

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MapVertex {
    /// World `(x, z)`.
    pub position: [f32; 2],
    pub color: [f32; 3],
}

/// What a map cell shows.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MapTile {
    Water,
    Surface(SurfaceMaterial),
}

impl MapTile {
    pub fn color(&self) -> [f32; 3] {
        match self {
            MapTile::Water => WATER_MAP_COLOR,
            MapTile::Surface(material) => material.map_color(),
        }
    }

    pub fn from_category(category: MaterialCategory) -> Self {
        match category {
            MaterialCategory::Sand => MapTile::Surface(SurfaceMaterial::Sand),
            MaterialCategory::Snow => MapTile::Surface(SurfaceMaterial::Snow),
            MaterialCategory::Grass => MapTile::Surface(SurfaceMaterial::Grass),
            _ => MapTile::Water,
        }
    }

    /// Same land test and region rules as chunk generation.
    pub fn column(terrain: &TerrainClassifier, x: i32, z: i32) -> Self {
        if terrain.classify(x as f64, z as f64).is_land {
            MapTile::Surface(terrain.surface_material(ChunkKey::from_block(x, z)))
        } else {
            MapTile::Water
        }
    }

    /// Cheap guess for a chunk that has not been generated: water if any of
    /// the four corners or the centre is water.
    pub fn probe(terrain: &TerrainClassifier, key: ChunkKey) -> Self {
        let (x, z) = key.origin();
        let (x, z) = (x as f64, z as f64);
        let size = CHUNK_SIZE as f64;
        let samples = [
            (x + size / 2.0, z + size / 2.0),
            (x, z),
            (x + size, z),
            (x, z + size),
            (x + size, z + size),
        ];
        if samples.iter().any(|&(sx, sz)| !terrain.classify(sx, sz).is_land) {
            MapTile::Water
        } else {
            MapTile::Surface(terrain.surface_material(key))
        }
    }
}

fn push_quad(out: &mut Vec<MapVertex>, x: f32, z: f32, size: f32, color: [f32; 3]) {
    let corners = [
        [x, z],
        [x + size, z],
        [x + size, z + size],
        [x, z],
        [x + size, z + size],
        [x, z + size],
    ];
    out.extend(corners.into_iter().map(|position| MapVertex { position, color }));
}

/// One 1x1 cell per column within a square around the player.
pub struct LocalMap {
    vertices: Vec<MapVertex>,
    radius: i32,
    interval: Duration,
    last_refresh: Option<Instant>,
}

impl LocalMap {
    pub fn new(settings: &MapSettings) -> Self {
        LocalMap {
            vertices: Vec::new(),
            radius: settings.local_radius,
            interval: Duration::from_secs_f32(settings.local_refresh_secs),
            last_refresh: None,
        }
    }

    /// Rebuilds the buffer if the refresh interval has elapsed. Returns whether
    /// it was rebuilt.
    pub fn refresh(&mut self, now: Instant, player: Vec3, terrain: &TerrainClassifier) -> bool {
        let fresh = self
            .last_refresh
            .is_some_and(|last| now.saturating_duration_since(last) < self.interval);
        if fresh && !self.vertices.is_empty() {
            return false;
        }
        self.rebuild(player, terrain);
        self.last_refresh = Some(now);
        true
    }

    fn rebuild(&mut self, player: Vec3, terrain: &TerrainClassifier) {
        let px = player.x.floor() as i32;
        let pz = player.z.floor() as i32;
        let side = (2 * self.radius) as usize;
        self.vertices.clear();
        self.vertices.reserve(side * side * 6);

        for z in pz - self.radius..pz + self.radius {
            for x in px - self.radius..px + self.radius {
                let tile = MapTile::column(terrain, x, z);
                push_quad(&mut self.vertices, x as f32, z as f32, 1.0, tile.color());
            }
        }
    }

    pub fn vertices(&self) -> &[MapVertex] {
        &self.vertices
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// One chunk-sized cell per chunk over a large pannable square.
pub struct OverviewMap {
    vertices: Vec<MapVertex>,
    pan: Vec2,
    chunks: i32,
    dirty: bool,
    seen_revision: Option<u64>,
}

impl OverviewMap {
    pub fn new(settings: &MapSettings) -> Self {
        OverviewMap {
            vertices: Vec::new(),
            pan: Vec2::ZERO,
            chunks: settings.overview_chunks,
            dirty: true,
            seen_revision: None,
        }
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    /// Centres the overview on world `(x, z)`.
    pub fn pan_to(&mut self, pan: Vec2) {
        if pan != self.pan {
            self.pan = pan;
            self.dirty = true;
        }
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan_to(self.pan + delta);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn center(&self) -> ChunkKey {
        ChunkKey::new(
            (self.pan.x / CHUNK_SIZE as f32).round() as i32,
            (self.pan.y / CHUNK_SIZE as f32).round() as i32,
        )
    }

    /// Rebuilds the buffer if it was panned or chunks finished generating
    /// since the last rebuild.
    pub fn refresh(&mut self, store: &ChunkStore, terrain: &TerrainClassifier) -> bool {
        let revision = store.visited().revision();
        if self.seen_revision != Some(revision) {
            self.dirty = true;
        }
        if !self.dirty {
            return false;
        }

        let center = self.center();
        let half = self.chunks / 2;
        self.vertices.clear();
        self.vertices.reserve((self.chunks * self.chunks) as usize * 6);

        for cz in center.z - half..center.z + half {
            for cx in center.x - half..center.x + half {
                let key = ChunkKey::new(cx, cz);
                let tile = self.tile(store, terrain, key);
                let color = if tile != MapTile::Water && !store.visited().contains(key) {
                    tile.color().map(|c| c * UNVISITED_SHADE)
                } else {
                    tile.color()
                };
                let (x, z) = key.origin();
                push_quad(&mut self.vertices, x as f32, z as f32, CHUNK_SIZE as f32, color);
            }
        }

        tracing::info!(
            "Overview rebuilt around ({}, {}): {} cells",
            center.x,
            center.z,
            self.vertices.len() / 6
        );
        self.dirty = false;
        self.seen_revision = Some(revision);
        true
    }

    /// Generated chunks are summarised from their contents; the rest are
    /// probed.
    pub fn tile(&self, store: &ChunkStore, terrain: &TerrainClassifier, key: ChunkKey) -> MapTile {
        match store.get(key) {
            Some(chunk) if chunk.is_generated() => {
                MapTile::from_category(chunk.dominant_surface(OVERVIEW_WATER_CELLS))
            }
            _ => MapTile::probe(terrain, key),
        }
    }

    pub fn vertices(&self) -> &[MapVertex] {
        &self.vertices
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}
