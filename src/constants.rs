// World constants
pub const CHUNK_SIZE: i32 = 16;
pub const WORLD_MIN_Y: i32 = -1;
pub const WORLD_TOP_Y: f32 = 512.0;
pub const RENDER_DISTANCE: i32 = 18;
// Chunk keys are clamped to this magnitude so block coordinates stay within i32
pub const WORLD_CHUNK_LIMIT: i32 = 1 << 26;

// Terrain constants
pub const LAND_THRESHOLD: f64 = 0.48;
pub const SEABED_HEIGHT: f64 = -4.0;
pub const CONTINENTAL_SCALE: f64 = 100.0;
pub const ELEVATION_SCALE: f64 = 50.0;
pub const RIDGE_SCALE: f64 = 25.0;
pub const ELEVATION_WEIGHT: f64 = 8.0;
pub const RIDGE_WEIGHT: f64 = 12.0;
pub const PROP_MIN_HEIGHT: f64 = 2.0;

// Underground carving
pub const SEABED_CAVE_FREQUENCY: f64 = 0.04;
pub const SEABED_CAVE_THRESHOLD: f64 = 0.6;
pub const DEEP_CAVE_FREQUENCY: f64 = 0.1;
pub const DEEP_CAVE_THRESHOLD: f64 = -0.8;
pub const LIQUID_FREQUENCY: f64 = 0.02;
pub const LIQUID_THRESHOLD: f64 = 0.3;

// Sky band
pub const AURORA_MIN_Y: i32 = 165;
pub const AURORA_MAX_Y: i32 = 166;
pub const AURORA_FREQUENCY: f64 = 0.1;
pub const AURORA_THRESHOLD: f64 = 0.44;

// Props
pub const TREE_COLLISION_RADIUS: f32 = 3.0;
pub const FALLEN_LOG_MAX_REACH: i32 = 20;
pub const FALLEN_LOG_MIN_LENGTH: i32 = 6;

// Spatial index
pub const QUADTREE_CAPACITY: usize = 10;

// Map caches
pub const LOCAL_MAP_RADIUS: i32 = 96;
pub const LOCAL_MAP_REFRESH_SECS: f32 = 1.0;
pub const OVERVIEW_CHUNKS: i32 = 400;
pub const OVERVIEW_WATER_CELLS: usize = 5;
pub const UNVISITED_SHADE: f32 = 0.5;
