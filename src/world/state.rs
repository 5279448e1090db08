use std::sync::Arc;
use std::time::Instant;

use glam::{Mat4, Vec2, Vec3};

use crate::core::chunk::{Chunk, ChunkKey};
use crate::render::frustum::Frustum;
use crate::render::instances::FrameInstances;
use crate::render::map::{LocalMap, OverviewMap};
use crate::render::quadtree::SpatialIndex;
use crate::utils::settings::WorldSettings;
use crate::world::generator::ChunkGenerator;
use crate::world::loader::GenerationPool;
use crate::world::store::{ChunkStore, UpdateStats};

/// Owns everything one frame touches: generator, active chunks, optional
/// worker pool and both map caches.
pub struct World {
    generator: Arc<ChunkGenerator>,
    store: ChunkStore,
    pool: Option<GenerationPool>,
    local_map: LocalMap,
    overview: OverviewMap,
}

impl World {
    /// Spawns `settings.workers` generation threads when non-zero.
    pub fn new(settings: &WorldSettings) -> std::io::Result<Self> {
        let generator = Arc::new(ChunkGenerator::new(settings));
        let pool = if settings.workers > 0 {
            Some(GenerationPool::new(settings.workers, Arc::clone(&generator))?)
        } else {
            None
        };
        tracing::info!(
            "World seed {} render distance {} ({} workers)",
            settings.seed,
            settings.render_distance,
            settings.workers
        );

        Ok(World {
            generator,
            store: ChunkStore::new(settings.render_distance),
            pool,
            local_map: LocalMap::new(&settings.map),
            overview: OverviewMap::new(&settings.map),
        })
    }

    pub fn generator(&self) -> &ChunkGenerator {
        &self.generator
    }

    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    pub fn set_render_distance(&mut self, radius: i32) {
        self.store.set_radius(radius);
    }

    /// Streams the active set to the chunk under `player`.
    pub fn update(&mut self, player: Vec3) -> UpdateStats {
        let key = ChunkKey::from_world(player.x, player.z);
        match &self.pool {
            Some(pool) => self.store.update_with_pool(key, &self.generator, pool),
            None => self.store.update(key, &self.generator),
        }
    }

    /// Chunks whose bounds intersect the view volume of `view_proj`.
    pub fn visible_chunks(&self, view_proj: &Mat4) -> Vec<(ChunkKey, &Chunk)> {
        let Some(center) = self.store.center() else {
            return Vec::new();
        };
        let frustum = Frustum::extract(view_proj);
        SpatialIndex::from_store(&self.store, center, self.store.active_radius()).query(&frustum)
    }

    pub fn frame_instances(&self, view_proj: &Mat4) -> FrameInstances {
        FrameInstances::collect(self.visible_chunks(view_proj))
    }

    pub fn refresh_local_map(&mut self, now: Instant, player: Vec3) -> bool {
        self.local_map.refresh(now, player, self.generator.terrain())
    }

    pub fn refresh_overview(&mut self) -> bool {
        self.overview.refresh(&self.store, self.generator.terrain())
    }

    pub fn pan_overview(&mut self, delta: Vec2) {
        self.overview.pan_by(delta);
    }

    pub fn local_map(&self) -> &LocalMap {
        &self.local_map
    }

    pub fn overview(&self) -> &OverviewMap {
        &self.overview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WORLD_CHUNK_LIMIT;
    use crate::utils::settings::MapSettings;

    fn settings(workers: usize) -> WorldSettings {
        WorldSettings {
            render_distance: 3,
            workers,
            map: MapSettings {
                local_radius: 8,
                local_refresh_secs: 1.0,
                overview_chunks: 10,
            },
            ..WorldSettings::default()
        }
    }

    fn view_proj(eye: Vec3, dir: Vec3) -> Mat4 {
        let view = Mat4::look_to_rh(eye, dir, Vec3::Y);
        Mat4::perspective_rh_gl(70f32.to_radians(), 16.0 / 9.0, 0.1, 300.0) * view
    }

    #[test]
    fn nothing_is_visible_before_the_first_update() {
        let world = World::new(&settings(0)).unwrap();
        assert!(world.visible_chunks(&view_proj(Vec3::ZERO, Vec3::X)).is_empty());
    }

    #[test]
    fn one_frame_end_to_end() {
        let mut world = World::new(&settings(0)).unwrap();
        let eye = Vec3::new(8.0, 40.0, 8.0);
        let stats = world.update(eye);
        assert_eq!(stats.generated, 49);

        let vp = view_proj(eye, Vec3::X);
        let visible = world.visible_chunks(&vp);
        assert!(!visible.is_empty());
        assert!(visible.len() < world.store().len());
        assert!(visible.iter().all(|(key, _)| world.store().contains(*key)));
        // the chunk under the camera is always in view
        assert!(visible.iter().any(|(key, _)| *key == ChunkKey::new(0, 0)));

        let frame = world.frame_instances(&vp);
        assert_eq!(frame.chunk_count(), visible.len());

        assert!(world.refresh_local_map(Instant::now(), eye));
        assert_eq!(world.local_map().vertices().len(), 16 * 16 * 6);
        assert!(world.refresh_overview());
        assert!(!world.refresh_overview());
        world.pan_overview(Vec2::new(-16.0, 0.0));
        assert!(world.refresh_overview());
    }

    #[test]
    fn worker_pool_produces_the_same_world() {
        let mut pooled = World::new(&settings(2)).unwrap();
        let mut inline = World::new(&settings(0)).unwrap();
        for step in 0..3 {
            let eye = Vec3::new(step as f32 * 40.0, 30.0, -12.0);
            pooled.update(eye);
            inline.update(eye);
        }
        assert_eq!(pooled.store().len(), inline.store().len());
        for (key, chunk) in inline.store().iter() {
            assert_eq!(pooled.store().get(key), Some(chunk));
        }
        assert_eq!(pooled.store().visited().len(), inline.store().visited().len());
    }

    #[test]
    fn generation_at_the_world_edge_does_not_overflow() {
        let mut world = World::new(&WorldSettings {
            render_distance: 0,
            ..settings(0)
        })
        .unwrap();
        let stats = world.update(Vec3::new(2.2e9, 40.0, 0.0));
        assert_eq!(stats.generated, 1);
        assert_eq!(world.store().center(), Some(ChunkKey::new(WORLD_CHUNK_LIMIT, 0)));
    }

    #[test]
    fn radius_change_keeps_resident_chunks_visible_until_next_update() {
        let mut world = World::new(&settings(0)).unwrap();
        let eye = Vec3::new(8.0, 40.0, 8.0);
        world.update(eye);
        world.set_render_distance(1);

        let vp = view_proj(eye, Vec3::X);
        let frustum = Frustum::extract(&vp);
        let returned: Vec<ChunkKey> = world.visible_chunks(&vp).iter().map(|(k, _)| *k).collect();
        for (key, _) in world.store().iter() {
            let (min, max) = key.world_bounds();
            if frustum.intersects(min, max) {
                assert!(returned.contains(&key), "{key:?} visible but not returned");
            }
        }

        world.update(eye);
        assert_eq!(world.store().len(), 9);
        assert!(world.visible_chunks(&vp).len() <= 9);
    }
}
