//! Render-facing modules
//! Frustum culling, the per-frame quadtree, instance batching and map caches.

pub mod frustum;
pub mod instances;
pub mod map;
pub mod quadtree;

// Re-export commonly used types
pub use frustum::{Aabb, Frustum, Plane};
pub use instances::{FrameInstances, Renderer};
pub use map::{LocalMap, MapTile, MapVertex, OverviewMap};
pub use quadtree::SpatialIndex;
