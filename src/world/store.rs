use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::chunk::{Chunk, ChunkKey};
use crate::world::generator::ChunkGenerator;
use crate::world::loader::GenerationPool;

/// Every chunk that has ever finished generating. The revision moves on each
/// completed generation and is what the overview map watches.
#[derive(Default, Debug, Clone)]
pub struct VisitedChunks {
    keys: FxHashSet<ChunkKey>,
    revision: u64,
}

impl VisitedChunks {
    pub fn record(&mut self, key: ChunkKey) {
        self.keys.insert(key);
        self.revision += 1;
    }

    pub fn contains(&self, key: ChunkKey) -> bool {
        self.keys.contains(&key)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateStats {
    pub evicted: usize,
    pub inserted: usize,
    pub generated: usize,
}

/// Active chunk set: after every update, exactly the Chebyshev ball of
/// `radius` around the player's chunk.
pub struct ChunkStore {
    chunks: FxHashMap<ChunkKey, Chunk>,
    radius: i32,
    // radius of the last completed update; differs from `radius` until then
    active_radius: i32,
    center: Option<ChunkKey>,
    visited: VisitedChunks,
}

impl ChunkStore {
    pub fn new(radius: i32) -> Self {
        assert!(radius >= 0, "render distance must not be negative");
        ChunkStore {
            chunks: FxHashMap::default(),
            radius,
            active_radius: radius,
            center: None,
            visited: VisitedChunks::default(),
        }
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// Radius the current contents were streamed with.
    pub fn active_radius(&self) -> i32 {
        self.active_radius
    }

    /// Takes effect on the next update.
    pub fn set_radius(&mut self, radius: i32) {
        assert!(radius >= 0, "render distance must not be negative");
        if radius != self.radius {
            tracing::info!("Render distance {} -> {}", self.radius, radius);
            self.radius = radius;
        }
    }

    pub fn center(&self) -> Option<ChunkKey> {
        self.center
    }

    pub fn visited(&self) -> &VisitedChunks {
        &self.visited
    }

    pub fn get(&self, key: ChunkKey) -> Option<&Chunk> {
        self.chunks.get(&key)
    }

    pub fn contains(&self, key: ChunkKey) -> bool {
        self.chunks.contains_key(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChunkKey, &Chunk)> {
        self.chunks.iter().map(|(k, c)| (*k, c))
    }

    pub fn keys(&self) -> impl Iterator<Item = ChunkKey> + '_ {
        self.chunks.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Streams the active set around `player` and generates everything new
    /// on the calling thread.
    pub fn update(&mut self, player: ChunkKey, generator: &ChunkGenerator) -> UpdateStats {
        let mut stats = self.evict_and_insert(player);
        for (key, chunk) in self.chunks.iter_mut() {
            if chunk.generate(*key, generator, &mut self.visited) {
                stats.generated += 1;
            }
        }
        self.finish(player, stats)
    }

    /// Same contract as [`update`](Self::update), with generation fanned out
    /// to worker threads. Blocks until every chunk in the set is generated.
    pub fn update_with_pool(
        &mut self,
        player: ChunkKey,
        generator: &ChunkGenerator,
        pool: &GenerationPool,
    ) -> UpdateStats {
        let mut stats = self.evict_and_insert(player);

        let mut pending: Vec<ChunkKey> = self
            .chunks
            .iter()
            .filter(|(_, chunk)| !chunk.is_generated())
            .map(|(key, _)| *key)
            .collect();
        pending.sort_by_key(|key| (key.chebyshev(player), *key));

        for (key, chunk) in pool.generate(&pending) {
            match self.chunks.get_mut(&key) {
                Some(slot) if !slot.is_generated() => {
                    *slot = chunk;
                    self.visited.record(key);
                    stats.generated += 1;
                }
                _ => {}
            }
        }

        // Anything the pool failed to deliver is generated inline.
        for (key, chunk) in self.chunks.iter_mut() {
            if chunk.generate(*key, generator, &mut self.visited) {
                stats.generated += 1;
            }
        }
        self.finish(player, stats)
    }

    fn evict_and_insert(&mut self, player: ChunkKey) -> UpdateStats {
        let radius = self.radius;
        let before = self.chunks.len();
        self.chunks.retain(|key, _| key.chebyshev(player) <= radius);
        let evicted = before - self.chunks.len();

        let mut inserted = 0;
        for x in player.x - radius..=player.x + radius {
            for z in player.z - radius..=player.z + radius {
                self.chunks.entry(ChunkKey::new(x, z)).or_insert_with(|| {
                    inserted += 1;
                    Chunk::new()
                });
            }
        }

        UpdateStats {
            evicted,
            inserted,
            generated: 0,
        }
    }

    fn finish(&mut self, player: ChunkKey, stats: UpdateStats) -> UpdateStats {
        let side = (2 * self.radius + 1) as usize;
        assert_eq!(
            self.chunks.len(),
            side * side,
            "active set around {player:?} has the wrong size"
        );
        debug_assert!(self.covers_exactly(player));

        if self.center != Some(player) {
            tracing::debug!(
                "Chunk store moved to ({}, {}): evicted {}, inserted {}, generated {}",
                player.x,
                player.z,
                stats.evicted,
                stats.inserted,
                stats.generated
            );
        }
        self.center = Some(player);
        self.active_radius = self.radius;
        stats
    }

    /// True iff the stored keys are exactly the generated Chebyshev ball
    /// around `player`.
    pub fn covers_exactly(&self, player: ChunkKey) -> bool {
        let side = (2 * self.radius + 1) as usize;
        self.chunks.len() == side * side
            && self
                .chunks
                .iter()
                .all(|(key, chunk)| key.chebyshev(player) <= self.radius && chunk.is_generated())
    }
}
