use serde::{Deserialize, Serialize};

/// Instance group handed to the renderer. Every generated block belongs to
/// exactly one category and is drawn in one instanced batch per frame.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum MaterialCategory {
    Grass,
    Sand,
    Snow,
    Dirt,
    Stone,
    Lava,
    Water,
    Ice,
    Trunk,
    PineLeaf,
    FirLeaf,
    OakTrunk,
    OakLeaf,
    AncientTrunk,
    AncientLeaf,
    AncientBranch,
    FallenTrunk,
    WaterLily,
    LeafPile,
    BushSmall,
    BushMedium,
    BushLarge,
    Branch,
    Aurora,
}

impl MaterialCategory {
    pub const COUNT: usize = 24;

    pub const ALL: [MaterialCategory; Self::COUNT] = [
        MaterialCategory::Grass,
        MaterialCategory::Sand,
        MaterialCategory::Snow,
        MaterialCategory::Dirt,
        MaterialCategory::Stone,
        MaterialCategory::Lava,
        MaterialCategory::Water,
        MaterialCategory::Ice,
        MaterialCategory::Trunk,
        MaterialCategory::PineLeaf,
        MaterialCategory::FirLeaf,
        MaterialCategory::OakTrunk,
        MaterialCategory::OakLeaf,
        MaterialCategory::AncientTrunk,
        MaterialCategory::AncientLeaf,
        MaterialCategory::AncientBranch,
        MaterialCategory::FallenTrunk,
        MaterialCategory::WaterLily,
        MaterialCategory::LeafPile,
        MaterialCategory::BushSmall,
        MaterialCategory::BushMedium,
        MaterialCategory::BushLarge,
        MaterialCategory::Branch,
        MaterialCategory::Aurora,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Flat debug colour, also used for map cells.
    pub fn color(&self) -> [f32; 3] {
        match self {
            MaterialCategory::Grass => [0.19, 0.66, 0.32],
            MaterialCategory::Sand => [0.93, 0.79, 0.69],
            MaterialCategory::Snow => [0.95, 0.95, 1.0],
            MaterialCategory::Dirt => [0.43, 0.39, 0.34],
            MaterialCategory::Stone => [0.5, 0.5, 0.5],
            MaterialCategory::Lava => [1.0, 0.5, 0.0],
            MaterialCategory::Water => [0.0, 0.5, 1.0],
            MaterialCategory::Ice => [0.8, 0.9, 1.0],
            MaterialCategory::Trunk => [0.29, 0.21, 0.13],
            MaterialCategory::PineLeaf => [0.07, 0.46, 0.34],
            MaterialCategory::FirLeaf => [0.13, 0.54, 0.13],
            MaterialCategory::OakTrunk => [0.55, 0.27, 0.07],
            MaterialCategory::OakLeaf => [0.36, 0.6, 0.33],
            MaterialCategory::AncientTrunk => [0.4, 0.25, 0.1],
            MaterialCategory::AncientLeaf => [0.2, 0.5, 0.2],
            MaterialCategory::AncientBranch => [0.3, 0.2, 0.1],
            MaterialCategory::FallenTrunk => [0.45, 0.22, 0.07],
            MaterialCategory::WaterLily => [0.2, 0.7, 0.2],
            MaterialCategory::LeafPile => [0.44, 0.39, 0.32],
            MaterialCategory::BushSmall => [0.35, 0.43, 0.30],
            MaterialCategory::BushMedium => [0.52, 0.54, 0.35],
            MaterialCategory::BushLarge => [0.6, 0.61, 0.35],
            MaterialCategory::Branch => [0.4, 0.3, 0.2],
            MaterialCategory::Aurora => [1.0, 1.0, 1.0],
        }
    }

    /// Top-of-column materials that only ever sit on land.
    pub fn is_surface(&self) -> bool {
        matches!(
            self,
            MaterialCategory::Grass | MaterialCategory::Sand | MaterialCategory::Snow
        )
    }

    /// Categories whose instances carry a yaw angle next to the position.
    pub fn is_rotated(&self) -> bool {
        matches!(self, MaterialCategory::Branch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_indexed_in_declaration_order() {
        for (i, category) in MaterialCategory::ALL.iter().enumerate() {
            assert_eq!(category.index(), i);
        }
    }

    #[test]
    fn only_branch_is_rotated() {
        let rotated: Vec<_> = MaterialCategory::ALL
            .iter()
            .filter(|c| c.is_rotated())
            .collect();
        assert_eq!(rotated, vec![&MaterialCategory::Branch]);
    }
}
