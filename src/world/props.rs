//! Hash-gated decorations placed on land and water columns.
//!
//! Every decision here is a pure function of integer world coordinates, so a
//! chunk regenerated after eviction gets exactly the same props.

use glam::Vec3;

use crate::constants::*;
use crate::core::biome::ForestKind;
use crate::core::chunk::{Chunk, ChunkKey};
use crate::core::material::MaterialCategory;
use crate::world::terrain::TerrainClassifier;

/// Coordinate hash `|(x * m1) ^ (z * m2)|` with a `hash % n < k` rarity test.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gate {
    pub m1: i32,
    pub m2: i32,
    pub n: u32,
    pub k: u32,
}

impl Gate {
    pub const fn new(m1: i32, m2: i32, n: u32, k: u32) -> Self {
        Self { m1, m2, n, k }
    }

    #[inline]
    pub fn hash(&self, x: i32, z: i32) -> u32 {
        (x.wrapping_mul(self.m1) ^ z.wrapping_mul(self.m2)).unsigned_abs()
    }

    /// The column hash when the gate passes.
    #[inline]
    pub fn check(&self, x: i32, z: i32) -> Option<u32> {
        let hash = self.hash(x, z);
        (hash % self.n < self.k).then_some(hash)
    }
}

pub const PINE_GATE: Gate = Gate::new(73856093, 19349663, 2000, 1);
pub const FIR_GATE: Gate = Gate::new(83492791, 19349663, 2000, 1);
pub const OAK_GATE: Gate = Gate::new(92821, 123457, 1000, 1);
pub const ANCIENT_GATE: Gate = Gate::new(112233, 445566, 3000, 1);
pub const FALLEN_LOG_GATE: Gate = Gate::new(92821, 68917, 500, 1);
pub const LEAF_PILE_GATE: Gate = Gate::new(412871, 167591, 300, 1);
pub const BUSH_SMALL_GATE: Gate = Gate::new(17771, 55117, 700, 1);
pub const BUSH_MEDIUM_GATE: Gate = Gate::new(18323, 51511, 1000, 2);
pub const BUSH_LARGE_GATE: Gate = Gate::new(23719, 41389, 1200, 1);
pub const BRANCH_GATE: Gate = Gate::new(12345, 6789, 1000, 1);
pub const LILY_GATE: Gate = Gate::new(91321, 7817, 100, 1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeKind {
    /// `giant` extends the trunk far above the canopy; otherwise the top
    /// trunk layer turns into leaves.
    Pine { giant: bool },
    Fir,
    Oak,
    Ancient,
}

impl TreeKind {
    /// Trunk list a new tree of this kind must keep its distance from.
    pub fn trunk_category(&self) -> MaterialCategory {
        match self {
            TreeKind::Pine { .. } | TreeKind::Fir => MaterialCategory::Trunk,
            TreeKind::Oak => MaterialCategory::OakTrunk,
            TreeKind::Ancient => MaterialCategory::AncientTrunk,
        }
    }

    pub fn gate(&self) -> Gate {
        match self {
            TreeKind::Pine { .. } => PINE_GATE,
            TreeKind::Fir => FIR_GATE,
            TreeKind::Oak => OAK_GATE,
            TreeKind::Ancient => ANCIENT_GATE,
        }
    }
}

/// True if any existing trunk block lies closer than `radius` to `base`.
pub fn tree_collision(trunks: &[Vec3], base: Vec3, radius: f32) -> bool {
    trunks.iter().any(|p| p.distance(base) < radius)
}

// Cheap avalanche so each branch of an ancient tree gets its own jitter.
fn mix(hash: u32, salt: u32) -> u32 {
    let mut h = hash ^ salt.wrapping_mul(0x9E37_79B9);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85EB_CA6B);
    h ^= h >> 13;
    h
}

fn push_trunk(chunk: &mut Chunk, category: MaterialCategory, x: i32, y: i32, z: i32, thickness: i32) {
    for tx in 0..thickness {
        for tz in 0..thickness {
            chunk.push(category, Vec3::new((x + tx) as f32, y as f32, (z + tz) as f32));
        }
    }
}

fn push_sphere(chunk: &mut Chunk, category: MaterialCategory, center: Vec3, radius: f32) {
    let r = radius as i32;
    for dy in -r..=r {
        for dx in -r..=r {
            for dz in -r..=r {
                let offset = Vec3::new(dx as f32, dy as f32, dz as f32);
                if offset.length() < radius {
                    chunk.push(category, center + offset);
                }
            }
        }
    }
}

fn push_disc(chunk: &mut Chunk, category: MaterialCategory, x: i32, y: i32, z: i32, radius: i32) {
    for dx in -radius..=radius {
        for dz in -radius..=radius {
            if ((dx * dx + dz * dz) as f32).sqrt() <= radius as f32 {
                chunk.push(category, Vec3::new((x + dx) as f32, y as f32, (z + dz) as f32));
            }
        }
    }
}

pub struct PropGenerator {
    collision_radius: f32,
}

impl Default for PropGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PropGenerator {
    const PINE_HEIGHT: i32 = 80;
    const PINE_THICKNESS: i32 = 4;
    const PINE_ROOTS: i32 = 15;
    const PINE_GIANT_EXTRA: i32 = 90;
    const PINE_CANOPY_DROP: i32 = 70;
    const PINE_CANOPY_LAYERS: i32 = 80;
    const PINE_BOTTOM_RADIUS: f32 = 8.0;
    const PINE_TOP_RADIUS: f32 = 2.0;
    const PINE_RING_WIDTH: f32 = 1.0;

    const FIR_HEIGHT: i32 = 40;
    const FIR_THICKNESS: i32 = 3;
    const FIR_CANOPY_RADIUS: f32 = 7.0;

    const OAK_HEIGHT: i32 = 7;
    const OAK_THICKNESS: i32 = 2;
    const OAK_CANOPY_RADIUS: f32 = 4.0;

    const ANCIENT_HEIGHT: i32 = 30;
    const ANCIENT_THICKNESS: i32 = 3;
    const ANCIENT_CANOPY_RADIUS: f32 = 5.0;
    const ANCIENT_BRANCH_HEIGHTS: [i32; 4] = [7, 13, 19, 25];

    pub fn new() -> Self {
        PropGenerator {
            collision_radius: TREE_COLLISION_RADIUS,
        }
    }

    /// Places hash-gated props on one land column whose top block sits at
    /// `ground`.
    pub fn populate_land_column(
        &self,
        terrain: &TerrainClassifier,
        chunk: &mut Chunk,
        key: ChunkKey,
        x: i32,
        z: i32,
        ground: i32,
    ) {
        let forest = terrain.forest(key);
        for kind in Self::trees_for(forest) {
            if kind.gate().check(x, z).is_some() {
                self.plant_tree(chunk, kind, x, z, ground);
            }
        }

        self.fallen_log(terrain, chunk, x, z, ground);
        self.leaf_pile(chunk, x, z, ground);

        for (gate, category, radius) in [
            (BUSH_SMALL_GATE, MaterialCategory::BushSmall, 1),
            (BUSH_MEDIUM_GATE, MaterialCategory::BushMedium, 2),
            (BUSH_LARGE_GATE, MaterialCategory::BushLarge, 3),
        ] {
            if gate.check(x, z).is_some() {
                push_disc(chunk, category, x, ground + 1, z, radius);
            }
        }

        if let Some(hash) = BRANCH_GATE.check(x, z) {
            let angle = ((hash % 360) as f32).to_radians();
            chunk.push_rotated(
                MaterialCategory::Branch,
                Vec3::new(x as f32 + 0.5, ground as f32 + 0.5, z as f32 + 0.5),
                angle,
            );
        }
    }

    fn trees_for(forest: ForestKind) -> Vec<TreeKind> {
        let mut kinds = Vec::with_capacity(4);
        if forest.has_pines() {
            kinds.push(TreeKind::Pine {
                giant: forest == ForestKind::Taiga,
            });
        }
        if forest.has_broadleaf() {
            kinds.extend([TreeKind::Fir, TreeKind::Oak, TreeKind::Ancient]);
        }
        kinds
    }

    /// Grows a tree rooted at column `(x, z)` unless another trunk of the same
    /// family is too close. Does not consult the hash gate.
    pub fn plant_tree(&self, chunk: &mut Chunk, kind: TreeKind, x: i32, z: i32, ground: i32) -> bool {
        let base = Vec3::new(x as f32, (ground + 1) as f32, z as f32);
        if tree_collision(chunk.positions(kind.trunk_category()), base, self.collision_radius) {
            return false;
        }
        match kind {
            TreeKind::Pine { giant } => self.pine(chunk, x, z, ground, giant),
            TreeKind::Fir => {
                for i in 1..=Self::FIR_HEIGHT {
                    push_trunk(chunk, MaterialCategory::Trunk, x, ground + i, z, Self::FIR_THICKNESS);
                }
                let offset = Self::FIR_THICKNESS as f32 / 2.0;
                let center = Vec3::new(
                    x as f32 + offset,
                    (ground + Self::FIR_HEIGHT) as f32,
                    z as f32 + offset,
                );
                push_sphere(chunk, MaterialCategory::FirLeaf, center, Self::FIR_CANOPY_RADIUS);
            }
            TreeKind::Oak => {
                for i in 1..=Self::OAK_HEIGHT {
                    push_trunk(chunk, MaterialCategory::OakTrunk, x, ground + i, z, Self::OAK_THICKNESS);
                }
                let offset = Self::OAK_THICKNESS as f32 / 2.0;
                let center = Vec3::new(
                    x as f32 + offset,
                    (ground + Self::OAK_HEIGHT + 2) as f32,
                    z as f32 + offset,
                );
                push_sphere(chunk, MaterialCategory::OakLeaf, center, Self::OAK_CANOPY_RADIUS);
            }
            TreeKind::Ancient => self.ancient(chunk, x, z, ground),
        }
        true
    }

    fn pine(&self, chunk: &mut Chunk, x: i32, z: i32, ground: i32, giant: bool) {
        let t = Self::PINE_THICKNESS;
        for i in 1..=Self::PINE_HEIGHT {
            let category = if !giant && i == Self::PINE_HEIGHT {
                MaterialCategory::PineLeaf
            } else {
                MaterialCategory::Trunk
            };
            push_trunk(chunk, category, x, ground + i, z, t);
        }
        for i in 0..Self::PINE_ROOTS {
            push_trunk(chunk, MaterialCategory::Trunk, x, ground - i, z, t);
        }
        if giant {
            for i in Self::PINE_HEIGHT + 1..=Self::PINE_HEIGHT + Self::PINE_GIANT_EXTRA {
                push_trunk(chunk, MaterialCategory::Trunk, x, ground + i, z, t);
            }
        }
        for leaf in Self::pine_canopy(x, z, ground) {
            chunk.push(MaterialCategory::PineLeaf, leaf);
        }
    }

    /// Stacked rings shrinking from the bottom radius to the top radius.
    /// Only lattice cells within one ring width inside each layer's radius
    /// are kept.
    pub fn pine_canopy(x: i32, z: i32, ground: i32) -> Vec<Vec3> {
        let mut leaves = Vec::new();
        let base = ground + Self::PINE_HEIGHT - Self::PINE_CANOPY_DROP;
        let center_offset = (Self::PINE_THICKNESS - 1) as f32 / 2.0;
        let step = (Self::PINE_BOTTOM_RADIUS - Self::PINE_TOP_RADIUS)
            / (Self::PINE_CANOPY_LAYERS - 1) as f32;

        for layer in 0..Self::PINE_CANOPY_LAYERS {
            let radius = Self::PINE_BOTTOM_RADIUS - layer as f32 * step;
            let range = radius.ceil() as i32;
            for dx in -range..=range {
                for dz in -range..=range {
                    let dist = ((dx * dx + dz * dz) as f32).sqrt();
                    if dist <= radius && dist > radius - Self::PINE_RING_WIDTH {
                        leaves.push(Vec3::new(
                            x as f32 + center_offset + dx as f32,
                            (base + layer) as f32,
                            z as f32 + center_offset + dz as f32,
                        ));
                    }
                }
            }
        }
        leaves
    }

    fn ancient(&self, chunk: &mut Chunk, x: i32, z: i32, ground: i32) {
        let hash = ANCIENT_GATE.hash(x, z);
        for i in 1..=Self::ANCIENT_HEIGHT {
            push_trunk(
                chunk,
                MaterialCategory::AncientTrunk,
                x,
                ground + i,
                z,
                Self::ANCIENT_THICKNESS,
            );
        }
        let offset = Self::ANCIENT_THICKNESS as f32 / 2.0;
        let crown = Vec3::new(
            x as f32 + offset,
            (ground + Self::ANCIENT_HEIGHT) as f32,
            z as f32 + offset,
        );
        push_sphere(chunk, MaterialCategory::AncientLeaf, crown, Self::ANCIENT_CANOPY_RADIUS);

        for (b, height) in Self::ANCIENT_BRANCH_HEIGHTS.iter().enumerate() {
            let h = mix(hash, b as u32 + 1);
            let start_y = height + (h % 3) as i32 - 1;
            let length = 10 + ((h >> 8) % 3) as i32;
            let jitter = ((h >> 16) % 21) as f32 - 10.0;
            let heading = (b as f32 * 90.0 + jitter).to_radians();
            let dir = Vec3::new(heading.cos(), 0.0, heading.sin());
            let start = Vec3::new(x as f32 + offset, (ground + start_y) as f32, z as f32 + offset);

            for i in 1..=length {
                chunk.push(MaterialCategory::AncientBranch, start + dir * i as f32);
            }
            let tip = start + dir * (length + 1) as f32;
            for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        let d = Vec3::new(dx as f32, dy as f32, dz as f32);
                        if d.length() < 1.5 {
                            chunk.push(MaterialCategory::AncientLeaf, tip + d);
                        }
                    }
                }
            }
        }
    }

    /// Columns touching water in their 3x3 neighbourhood may grow a fallen log.
    pub fn near_water(terrain: &TerrainClassifier, x: i32, z: i32) -> bool {
        (-1..=1).any(|dx| {
            (-1..=1).any(|dz| !terrain.classify((x + dx) as f64, (z + dz) as f64).is_land)
        })
    }

    fn fallen_log(&self, terrain: &TerrainClassifier, chunk: &mut Chunk, x: i32, z: i32, ground: i32) {
        let Some(hash) = FALLEN_LOG_GATE.check(x, z) else {
            return;
        };
        if !Self::near_water(terrain, x, z) {
            return;
        }
        let heading = ((hash % 360) as f64).to_radians();
        let (dir_x, dir_z) = (heading.cos(), heading.sin());
        let reach = |sign: f64| {
            (0..FALLEN_LOG_MAX_REACH)
                .take_while(|step| {
                    let t = sign * (step + 1) as f64;
                    terrain.classify(x as f64 + t * dir_x, z as f64 + t * dir_z).is_land
                })
                .count() as i32
        };
        let back = reach(-1.0);
        let forward = reach(1.0);
        let total = back + forward + 1;
        if total < FALLEN_LOG_MIN_LENGTH {
            return;
        }

        let y = (ground + 1) as f32;
        for i in 0..total {
            let t = (i - back) as f64;
            let px = (x as f64 + t * dir_x) as f32;
            let pz = (z as f64 + t * dir_z) as f32;
            for tx in 0..2 {
                for tz in 0..2 {
                    chunk.push(
                        MaterialCategory::FallenTrunk,
                        Vec3::new(px + tx as f32 - 1.0, y, pz + tz as f32 - 1.0),
                    );
                }
            }
        }
    }

    fn leaf_pile(&self, chunk: &mut Chunk, x: i32, z: i32, ground: i32) {
        let Some(hash) = LEAF_PILE_GATE.check(x, z) else {
            return;
        };
        let hash = hash as u64;
        let size = hash % 4 + 3;
        for i in 0..size {
            let px = ((hash + i * 13) % 3) as i32 - 1;
            let pz = ((hash + i * 7) % 3) as i32 - 1;
            chunk.push(
                MaterialCategory::LeafPile,
                Vec3::new((x + px) as f32, (ground + 1) as f32, (z + pz) as f32),
            );
        }
    }

    /// Lily pads sit on a sparse lattice of local cells in open water.
    pub fn populate_water_column(
        &self,
        terrain: &TerrainClassifier,
        chunk: &mut Chunk,
        x: i32,
        z: i32,
    ) {
        let (lx, lz) = (x.rem_euclid(CHUNK_SIZE), z.rem_euclid(CHUNK_SIZE));
        let on_lattice = |l: i32| l > 3 && l < CHUNK_SIZE - 3 && l % 7 == 3;
        if !on_lattice(lx) || !on_lattice(lz) {
            return;
        }
        if LILY_GATE.check(x, z).is_none() {
            return;
        }
        let open_water = (-3..=3).all(|dx| {
            (-3..=3).all(|dz| !terrain.classify((x + dx) as f64, (z + dz) as f64).is_land)
        });
        if !open_water {
            return;
        }
        for dx in -6..6 {
            for dz in -6..6 {
                if (dx <= -5 || dx >= 4) && (dz <= -5 || dz >= 4) {
                    continue;
                }
                chunk.push(
                    MaterialCategory::WaterLily,
                    Vec3::new((x + dx) as f32, 0.2, (z + dz) as f32),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec4;

    use super::*;
    use crate::core::biome::{ChunkBand, RegionEffect, RegionRule, RegionRules};
    use crate::utils::settings::WorldSettings;

    #[test]
    fn gate_is_pure_and_matches_rarity() {
        let a = OAK_GATE.check(123, -77);
        let b = OAK_GATE.check(123, -77);
        assert_eq!(a, b);

        let passed = (0..200)
            .flat_map(|x| (0..200).map(move |z| (x, z)))
            .filter(|&(x, z)| LEAF_PILE_GATE.check(x, z).is_some())
            .count();
        // 1 in 300 over 40k columns
        assert!(passed > 20 && passed < 400, "passed {passed}");
    }

    #[test]
    fn hash_survives_overflowing_products() {
        let gate = Gate::new(i32::MAX, i32::MAX, 7, 7);
        assert!(gate.check(i32::MIN, 3).is_some());
    }

    #[test]
    fn tree_collision_uses_strict_radius() {
        let trunks = [Vec3::new(0.0, 5.0, 0.0)];
        assert!(tree_collision(&trunks, Vec3::new(1.0, 5.0, 0.0), 3.0));
        assert!(tree_collision(&trunks, Vec3::new(2.9, 5.0, 0.0), 3.0));
        assert!(!tree_collision(&trunks, Vec3::new(3.0, 5.0, 0.0), 3.0));
        assert!(!tree_collision(&[], Vec3::ZERO, 3.0));
    }

    #[test]
    fn second_tree_within_radius_is_suppressed() {
        let props = PropGenerator::new();
        let mut chunk = Chunk::new();
        assert!(props.plant_tree(&mut chunk, TreeKind::Oak, 4, 4, 10));
        let trunks = chunk.positions(MaterialCategory::OakTrunk).len();
        let leaves = chunk.positions(MaterialCategory::OakLeaf).len();

        assert!(!props.plant_tree(&mut chunk, TreeKind::Oak, 5, 4, 10));
        assert_eq!(chunk.positions(MaterialCategory::OakTrunk).len(), trunks);
        assert_eq!(chunk.positions(MaterialCategory::OakLeaf).len(), leaves);

        // other families keep their own trunk lists
        assert!(props.plant_tree(&mut chunk, TreeKind::Ancient, 5, 4, 10));
        assert!(props.plant_tree(&mut chunk, TreeKind::Oak, 12, 4, 10));
    }

    #[test]
    fn pine_and_fir_share_a_trunk_list() {
        let props = PropGenerator::new();
        let mut chunk = Chunk::new();
        assert!(props.plant_tree(&mut chunk, TreeKind::Pine { giant: false }, 0, 0, 5));
        assert!(!props.plant_tree(&mut chunk, TreeKind::Fir, 1, 1, 5));
    }

    #[test]
    fn giant_pine_is_all_trunk_above_canopy() {
        let props = PropGenerator::new();
        let mut giant = Chunk::new();
        props.plant_tree(&mut giant, TreeKind::Pine { giant: true }, 0, 0, 5);
        let mut regular = Chunk::new();
        props.plant_tree(&mut regular, TreeKind::Pine { giant: false }, 0, 0, 5);

        let cross_section = 16;
        let giant_trunk = giant.positions(MaterialCategory::Trunk);
        let regular_trunk = regular.positions(MaterialCategory::Trunk);
        assert_eq!(giant_trunk.len(), (80 + 15 + 90) * cross_section);
        assert_eq!(regular_trunk.len(), (79 + 15) * cross_section);
        assert_eq!(
            regular.positions(MaterialCategory::PineLeaf).len(),
            giant.positions(MaterialCategory::PineLeaf).len() + cross_section
        );
    }

    #[test]
    fn pine_canopy_stays_on_its_rings() {
        let leaves = PropGenerator::pine_canopy(0, 0, 0);
        assert!(!leaves.is_empty());
        let center = 1.5;
        for leaf in &leaves {
            let layer = leaf.y as i32 - 10;
            assert!((0..80).contains(&layer));
            let radius = 8.0 - layer as f32 * (6.0 / 79.0);
            let dist = ((leaf.x - center).powi(2) + (leaf.z - center).powi(2)).sqrt();
            assert!(dist <= radius + 1e-4 && dist > radius - 1.0 - 1e-4);
        }
    }

    #[test]
    fn ancient_tree_is_reproducible() {
        let props = PropGenerator::new();
        let mut a = Chunk::new();
        let mut b = Chunk::new();
        props.plant_tree(&mut a, TreeKind::Ancient, 40, -8, 12);
        props.plant_tree(&mut b, TreeKind::Ancient, 40, -8, 12);
        assert_eq!(a, b);
        let branches = a.positions(MaterialCategory::AncientBranch).len();
        assert!((40..=48).contains(&branches), "branches {branches}");
    }

    #[test]
    fn inland_origin_is_not_near_water() {
        let terrain = TerrainClassifier::new(&WorldSettings::default());
        assert!(!PropGenerator::near_water(&terrain, 0, 0));
        assert!(PropGenerator::near_water(&terrain, 0, 290 * CHUNK_SIZE));
    }

    /// Land is exactly one chunk, everything around it forced ocean.
    fn island(cx: i32, cz: i32) -> TerrainClassifier {
        let sea = |band| RegionRule::new("sea", band, RegionEffect::Ocean);
        let mut settings = WorldSettings::default();
        settings.terrain.land_threshold = -1.0;
        settings.terrain.regions = RegionRules {
            rules: vec![
                sea(ChunkBand::x(None, Some(cx - 1))),
                sea(ChunkBand::x(Some(cx + 1), None)),
                sea(ChunkBand::z(None, Some(cz - 1))),
                sea(ChunkBand::z(Some(cz + 1), None)),
            ],
        };
        TerrainClassifier::new(&settings)
    }

    /// Step centres of a fallen log, taken from each 2x2 cross-section.
    fn log_steps(chunk: &Chunk, y: f32) -> Vec<Vec3> {
        let blocks = chunk.positions(MaterialCategory::FallenTrunk);
        assert_eq!(blocks.len() % 4, 0);
        blocks
            .chunks(4)
            .map(|section| {
                let min = section.iter().fold(Vec3::splat(f32::MAX), |a, b| a.min(*b));
                let max = section.iter().fold(Vec3::splat(f32::MIN), |a, b| a.max(*b));
                assert_eq!(max - min, Vec3::new(1.0, 0.0, 1.0));
                assert_eq!(min.y, y);
                max
            })
            .collect()
    }

    #[test]
    fn fallen_log_runs_across_land_until_water() {
        let terrain = island(10, 9);
        let props = PropGenerator::new();
        let (x, z) = (172, 144);
        assert_eq!(FALLEN_LOG_GATE.check(x, z).map(|h| h % 360), Some(140));
        assert!(PropGenerator::near_water(&terrain, x, z));

        let mut chunk = Chunk::new();
        props.fallen_log(&terrain, &mut chunk, x, z, 20);
        let steps = log_steps(&chunk, 21.0);
        // heading 140 points back into the island; one step behind is already sea
        assert_eq!(steps.len(), 16);
        assert_eq!(steps[0], Vec3::new(172.0, 21.0, 144.0));

        let heading = 140f32.to_radians();
        for (i, step) in steps.iter().enumerate() {
            assert!(terrain.classify(step.x as f64, step.z as f64).is_land, "step {i} at {step}");
            if i > 0 {
                let delta = *step - steps[i - 1];
                assert!((delta.x - heading.cos()).abs() < 1e-3);
                assert!((delta.z - heading.sin()).abs() < 1e-3);
            }
        }
        let last = steps[steps.len() - 1];
        let beyond = (last.x + heading.cos(), last.z + heading.sin());
        assert!(!terrain.classify(beyond.0 as f64, beyond.1 as f64).is_land);
    }

    #[test]
    fn fallen_log_stops_at_max_reach() {
        let terrain = island(-6, -12);
        let props = PropGenerator::new();
        let mut chunk = Chunk::new();
        props.fallen_log(&terrain, &mut chunk, -96, -192, 5);
        let steps = log_steps(&chunk, 6.0);
        assert_eq!(steps.len() as i32, FALLEN_LOG_MAX_REACH + 1);
        assert_eq!(steps[0], Vec3::new(-96.0, 6.0, -192.0));
    }

    #[test]
    fn fallen_log_needs_water_and_length() {
        let props = PropGenerator::new();

        // gate passes but the column is inland
        let terrain = island(1, 2);
        assert!(FALLEN_LOG_GATE.check(25, 45).is_some());
        assert!(!PropGenerator::near_water(&terrain, 25, 45));
        let mut chunk = Chunk::new();
        props.fallen_log(&terrain, &mut chunk, 25, 45, 10);
        assert_eq!(chunk.instance_count(), 0);

        // island corner: both directions hit the sea after one step
        let terrain = island(-60, 20);
        assert!(FALLEN_LOG_GATE.check(-960, 320).is_some());
        assert!(PropGenerator::near_water(&terrain, -960, 320));
        props.fallen_log(&terrain, &mut chunk, -960, 320, 10);
        assert_eq!(chunk.instance_count(), 0);
    }

    #[test]
    fn lily_pad_covers_twelve_cells_minus_corners() {
        let terrain = TerrainClassifier::new(&WorldSettings::default());
        let props = PropGenerator::new();
        let (x, z) = (10, 4650);
        assert!(LILY_GATE.check(x, z).is_some());

        let mut chunk = Chunk::new();
        props.populate_water_column(&terrain, &mut chunk, x, z);
        let pads = chunk.positions(MaterialCategory::WaterLily);
        assert_eq!(pads.len(), 12 * 12 - 4 * 4);
        for pad in pads {
            assert_eq!(pad.y, 0.2);
            assert!((4.0..=15.0).contains(&pad.x));
            assert!((4644.0..=4655.0).contains(&pad.z));
            assert!(!terrain.classify(pad.x as f64, pad.z as f64).is_land);
        }
        let has = |dx: i32, dz: i32| {
            pads.contains(&Vec3::new((x + dx) as f32, 0.2, (z + dz) as f32))
        };
        for (dx, dz) in [(-6, -6), (-5, -5), (5, 5), (4, 4), (-6, 5), (5, -6)] {
            assert!(!has(dx, dz), "corner ({dx}, {dz})");
        }
        for (dx, dz) in [(-4, -6), (-6, -4), (3, 5), (5, 3), (0, 0), (-6, 0)] {
            assert!(has(dx, dz), "edge ({dx}, {dz})");
        }
    }

    #[test]
    fn lily_needs_lattice_and_open_water() {
        let props = PropGenerator::new();
        let ocean = TerrainClassifier::new(&WorldSettings::default());
        let mut chunk = Chunk::new();
        // off the lattice
        props.populate_water_column(&ocean, &mut chunk, 11, 4650);
        assert_eq!(chunk.instance_count(), 0);

        // same gate-passing column, but the neighbourhood is land
        let mut settings = WorldSettings::default();
        settings.terrain.land_threshold = -1.0;
        settings.terrain.regions = RegionRules::empty();
        let land = TerrainClassifier::new(&settings);
        props.populate_water_column(&land, &mut chunk, 10, 4650);
        assert_eq!(chunk.instance_count(), 0);
    }

    #[test]
    fn leaf_pile_is_a_short_diagonal() {
        let props = PropGenerator::new();
        let mut chunk = Chunk::new();
        props.leaf_pile(&mut chunk, 2, 326, 10);
        assert_eq!(
            chunk.positions(MaterialCategory::LeafPile),
            &[
                Vec3::new(1.0, 11.0, 325.0),
                Vec3::new(2.0, 11.0, 326.0),
                Vec3::new(3.0, 11.0, 327.0),
            ]
        );
    }

    #[test]
    fn bushes_are_discs_of_their_size() {
        let terrain = TerrainClassifier::new(&WorldSettings::default());
        let props = PropGenerator::new();
        for ((x, z), category, cells, radius) in [
            ((7, 337), MaterialCategory::BushSmall, 5, 1.0),
            ((1, 5), MaterialCategory::BushMedium, 13, 2.0),
            ((4, 252), MaterialCategory::BushLarge, 29, 3.0),
        ] {
            let mut chunk = Chunk::new();
            props.populate_land_column(&terrain, &mut chunk, ChunkKey::from_block(x, z), x, z, 10);
            let bush = chunk.positions(category);
            assert_eq!(bush.len(), cells, "{category:?}");
            assert_eq!(chunk.instance_count(), cells);
            let center = Vec3::new(x as f32, 11.0, z as f32);
            assert!(bush.iter().all(|p| p.distance(center) <= radius));
        }
    }

    #[test]
    fn ground_branch_takes_its_angle_from_the_hash() {
        let terrain = TerrainClassifier::new(&WorldSettings::default());
        let props = PropGenerator::new();
        let (x, z) = (8, 96);
        assert_eq!(BRANCH_GATE.check(x, z).map(|h| h % 360), Some(40));

        let mut chunk = Chunk::new();
        props.populate_land_column(&terrain, &mut chunk, ChunkKey::from_block(x, z), x, z, 10);
        let branches: Vec<Vec4> = chunk.rotated_instances().collect();
        assert_eq!(branches, vec![Vec4::new(8.5, 10.5, 96.5, 40f32.to_radians())]);
        assert_eq!(chunk.instance_count(), 1);
    }

    #[test]
    fn forest_kinds_pick_tree_families() {
        assert_eq!(
            PropGenerator::trees_for(ForestKind::Taiga),
            vec![TreeKind::Pine { giant: true }]
        );
        assert_eq!(PropGenerator::trees_for(ForestKind::Broadleaf).len(), 3);
        assert_eq!(PropGenerator::trees_for(ForestKind::Mixed).len(), 4);
        assert!(PropGenerator::trees_for(ForestKind::Open).is_empty());
    }
}
