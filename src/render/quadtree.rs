//! Per-frame quadtree over the active chunk set.
//!
//! Built from scratch every query cycle and dropped afterwards; it borrows the
//! chunks straight out of the store.

use glam::Vec3;

use crate::constants::*;
use crate::core::chunk::{Chunk, ChunkKey};
use crate::render::frustum::{Aabb, Frustum};
use crate::world::store::ChunkStore;

struct Node<'a> {
    // inclusive chunk-grid bounds
    min_x: i32,
    min_z: i32,
    max_x: i32,
    max_z: i32,
    items: Vec<(ChunkKey, &'a Chunk)>,
    children: Option<Box<[Node<'a>; 4]>>,
}

impl<'a> Node<'a> {
    fn new(min_x: i32, min_z: i32, max_x: i32, max_z: i32) -> Self {
        Node {
            min_x,
            min_z,
            max_x,
            max_z,
            items: Vec::new(),
            children: None,
        }
    }

    fn contains(&self, key: ChunkKey) -> bool {
        key.x >= self.min_x && key.x <= self.max_x && key.z >= self.min_z && key.z <= self.max_z
    }

    fn world_bounds(&self) -> Aabb {
        Aabb::new(
            Vec3::new(
                (self.min_x * CHUNK_SIZE) as f32,
                WORLD_MIN_Y as f32,
                (self.min_z * CHUNK_SIZE) as f32,
            ),
            Vec3::new(
                ((self.max_x + 1) * CHUNK_SIZE) as f32,
                WORLD_TOP_Y,
                ((self.max_z + 1) * CHUNK_SIZE) as f32,
            ),
        )
    }

    fn subdivide(&mut self) {
        let mid_x = (self.min_x + self.max_x).div_euclid(2);
        let mid_z = (self.min_z + self.max_z).div_euclid(2);
        let mut children = Box::new([
            Node::new(self.min_x, self.min_z, mid_x, mid_z),
            Node::new(mid_x + 1, self.min_z, self.max_x, mid_z),
            Node::new(self.min_x, mid_z + 1, mid_x, self.max_z),
            Node::new(mid_x + 1, mid_z + 1, self.max_x, self.max_z),
        ]);
        for item in self.items.drain(..) {
            if let Some(child) = children.iter_mut().find(|c| c.contains(item.0)) {
                child.items.push(item);
            }
        }
        self.children = Some(children);
    }

    fn insert(&mut self, key: ChunkKey, chunk: &'a Chunk) -> bool {
        if !self.contains(key) {
            return false;
        }
        if self.children.is_none() {
            self.items.push((key, chunk));
            // a single-cell node can never split further
            if self.items.len() > QUADTREE_CAPACITY
                && (self.min_x < self.max_x || self.min_z < self.max_z)
            {
                self.subdivide();
            }
            return true;
        }
        match self.children.as_mut() {
            Some(children) => children.iter_mut().any(|child| child.insert(key, chunk)),
            None => false,
        }
    }

    fn query(&self, frustum: &Frustum, out: &mut Vec<(ChunkKey, &'a Chunk)>) {
        if !frustum.intersects_aabb(&self.world_bounds()) {
            return;
        }
        match &self.children {
            None => out.extend(self.items.iter().copied().filter(|(key, _)| {
                let (min, max) = key.world_bounds();
                frustum.intersects(min, max)
            })),
            Some(children) => {
                for child in children.iter() {
                    child.query(frustum, out);
                }
            }
        }
    }

    fn len(&self) -> usize {
        self.items.len()
            + self
                .children
                .as_ref()
                .map_or(0, |children| children.iter().map(Node::len).sum())
    }

    fn depth(&self) -> usize {
        1 + self
            .children
            .as_ref()
            .map_or(0, |children| children.iter().map(Node::depth).max().unwrap_or(0))
    }
}

pub struct SpatialIndex<'a> {
    root: Node<'a>,
}

impl<'a> SpatialIndex<'a> {
    /// Empty index over the inclusive chunk rectangle `min..=max`.
    pub fn new(min: ChunkKey, max: ChunkKey) -> Self {
        debug_assert!(min.x <= max.x && min.z <= max.z);
        SpatialIndex {
            root: Node::new(min.x, min.z, max.x, max.z),
        }
    }

    /// Indexes every stored chunk inside the square of `radius` around
    /// `center`.
    pub fn from_store(store: &'a ChunkStore, center: ChunkKey, radius: i32) -> Self {
        let mut index = Self::new(
            ChunkKey::new(center.x - radius, center.z - radius),
            ChunkKey::new(center.x + radius, center.z + radius),
        );
        for (key, chunk) in store.iter() {
            let inserted = index.insert(key, chunk);
            debug_assert!(inserted, "{key:?} outside the index around {center:?}");
        }
        index
    }

    /// Returns false when `key` lies outside the index bounds.
    pub fn insert(&mut self, key: ChunkKey, chunk: &'a Chunk) -> bool {
        self.root.insert(key, chunk)
    }

    /// Chunks whose own world box survives the frustum test. Whole subtrees
    /// are skipped when their combined box does not.
    pub fn query(&self, frustum: &Frustum) -> Vec<(ChunkKey, &'a Chunk)> {
        let mut out = Vec::new();
        self.root.query(frustum, &mut out);
        out
    }

    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use glam::Mat4;

    use super::*;

    fn grid(center: ChunkKey, radius: i32) -> Vec<(ChunkKey, Chunk)> {
        let mut chunks = Vec::new();
        for x in center.x - radius..=center.x + radius {
            for z in center.z - radius..=center.z + radius {
                chunks.push((ChunkKey::new(x, z), Chunk::new()));
            }
        }
        chunks
    }

    fn frustum(eye: Vec3, dir: Vec3) -> Frustum {
        let view = Mat4::look_to_rh(eye, dir, Vec3::Y);
        let proj = Mat4::perspective_rh_gl(70f32.to_radians(), 1.5, 0.1, 400.0);
        Frustum::extract(&(proj * view))
    }

    fn check_against_brute_force(center: ChunkKey, radius: i32, frustum: &Frustum) {
        let chunks = grid(center, radius);
        let mut index = SpatialIndex::new(
            ChunkKey::new(center.x - radius, center.z - radius),
            ChunkKey::new(center.x + radius, center.z + radius),
        );
        for (key, chunk) in &chunks {
            assert!(index.insert(*key, chunk));
        }
        assert_eq!(index.len(), chunks.len());

        let returned: BTreeSet<ChunkKey> = index.query(frustum).iter().map(|(k, _)| *k).collect();
        let all: BTreeSet<ChunkKey> = chunks.iter().map(|(k, _)| *k).collect();
        let visible: BTreeSet<ChunkKey> = chunks
            .iter()
            .map(|(k, _)| *k)
            .filter(|k| {
                let (min, max) = k.world_bounds();
                frustum.intersects(min, max)
            })
            .collect();

        assert!(returned.is_superset(&visible));
        assert!(returned.is_subset(&all));
        assert_eq!(returned, visible);
    }

    #[test]
    fn query_is_complete_and_bounded() {
        let center = ChunkKey::new(0, 0);
        for dir in [Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::new(1.0, -0.5, 1.0).normalize()] {
            check_against_brute_force(center, 10, &frustum(Vec3::new(8.0, 40.0, 8.0), dir));
        }
    }

    #[test]
    fn negative_coordinates_split_cleanly() {
        let center = ChunkKey::new(-37, -12);
        let (ox, oz) = center.origin();
        let eye = Vec3::new(ox as f32, 60.0, oz as f32);
        check_against_brute_force(center, 7, &frustum(eye, Vec3::new(-1.0, -0.2, 0.3).normalize()));
    }

    #[test]
    fn full_grid_subdivides() {
        let chunks = grid(ChunkKey::new(3, 3), 5);
        let mut index = SpatialIndex::new(ChunkKey::new(-2, -2), ChunkKey::new(8, 8));
        for (key, chunk) in &chunks {
            index.insert(*key, chunk);
        }
        assert_eq!(index.len(), 121);
        assert!(index.depth() > 2);
    }

    #[test]
    fn out_of_bounds_insert_is_rejected() {
        let chunk = Chunk::new();
        let mut index = SpatialIndex::new(ChunkKey::new(0, 0), ChunkKey::new(3, 3));
        assert!(!index.insert(ChunkKey::new(4, 0), &chunk));
        assert!(!index.insert(ChunkKey::new(0, -1), &chunk));
        assert!(index.insert(ChunkKey::new(3, 3), &chunk));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn frustum_looking_away_culls_everything_behind() {
        let chunks = grid(ChunkKey::new(0, 0), 4);
        let mut index = SpatialIndex::new(ChunkKey::new(-4, -4), ChunkKey::new(4, 4));
        for (key, chunk) in &chunks {
            index.insert(*key, chunk);
        }
        // camera far east of the grid, looking further east
        let returned = index.query(&frustum(Vec3::new(500.0, 40.0, 8.0), Vec3::X));
        assert!(returned.is_empty());
    }
}
