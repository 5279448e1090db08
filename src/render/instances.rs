//! Per-frame instance batches handed to the renderer.

use glam::{Vec3, Vec4};

use crate::core::chunk::{Chunk, ChunkKey};
use crate::core::material::MaterialCategory;

/// External consumer of a frame's instance lists.
pub trait Renderer {
    fn submit(&mut self, category: MaterialCategory, positions: &[Vec3]);

    /// Instances packed as `(x, y, z, yaw_radians)`.
    fn submit_rotated(&mut self, category: MaterialCategory, instances: &[Vec4]);

    fn finish_frame(&mut self, camera_position: Vec3);
}

/// Every visible chunk's instances concatenated per material category.
#[derive(Default, Debug, Clone)]
pub struct FrameInstances {
    positions: Vec<Vec<Vec3>>,
    rotated: Vec<Vec4>,
    chunks: usize,
}

impl FrameInstances {
    pub fn new() -> Self {
        FrameInstances {
            positions: vec![Vec::new(); MaterialCategory::COUNT],
            rotated: Vec::new(),
            chunks: 0,
        }
    }

    pub fn collect<'a>(visible: impl IntoIterator<Item = (ChunkKey, &'a Chunk)>) -> Self {
        let mut frame = Self::new();
        for (_, chunk) in visible {
            frame.push_chunk(chunk);
        }
        frame
    }

    pub fn push_chunk(&mut self, chunk: &Chunk) {
        if self.positions.is_empty() {
            self.positions = vec![Vec::new(); MaterialCategory::COUNT];
        }
        for category in MaterialCategory::ALL {
            if category.is_rotated() {
                continue;
            }
            self.positions[category.index()].extend_from_slice(chunk.positions(category));
        }
        self.rotated.extend(chunk.rotated_instances());
        self.chunks += 1;
    }

    pub fn positions(&self, category: MaterialCategory) -> &[Vec3] {
        self.positions
            .get(category.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn rotated(&self) -> &[Vec4] {
        &self.rotated
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    pub fn instance_count(&self) -> usize {
        self.positions.iter().map(Vec::len).sum::<usize>() + self.rotated.len()
    }

    /// Hands every non-empty batch to `renderer` and closes the frame.
    pub fn submit_to(&self, renderer: &mut dyn Renderer, camera_position: Vec3) {
        for category in MaterialCategory::ALL {
            if category.is_rotated() {
                if !self.rotated.is_empty() {
                    renderer.submit_rotated(category, &self.rotated);
                }
                continue;
            }
            let batch = self.positions(category);
            if !batch.is_empty() {
                renderer.submit(category, batch);
            }
        }
        renderer.finish_frame(camera_position);
    }
}
