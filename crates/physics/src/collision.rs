//! Collision layers and filtering.

use rapier3d::prelude::*;

/// Collision layers for the things that live in a village.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Static environment (ground, walls, houses)
    Environment = 1 << 0,
    /// Player character
    Player = 1 << 1,
    /// Zombies
    Enemy = 1 << 2,
}

/// A set of [`Layer`]s used to filter queries (the ground mask, for example).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionLayers(u32);

impl CollisionLayers {
    pub const ALL: Self = Self(u32::MAX);
    pub const NONE: Self = Self(0);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Add a layer to the set.
    pub const fn with(self, layer: Layer) -> Self {
        Self(self.0 | layer as u32)
    }

    pub const fn contains(self, layer: Layer) -> bool {
        self.0 & layer as u32 != 0
    }

    /// Query groups that match colliders belonging to any of these layers.
    pub fn query_groups(self) -> InteractionGroups {
        InteractionGroups::new(Group::ALL, Group::from_bits_retain(self.0))
    }
}

impl From<Layer> for CollisionLayers {
    fn from(layer: Layer) -> Self {
        Self(layer as u32)
    }
}

impl Default for CollisionLayers {
    /// Ground checks default to the environment layer only.
    fn default() -> Self {
        Layer::Environment.into()
    }
}

impl Layer {
    /// Membership/filter pair for a collider on this layer.
    pub fn groups(self) -> InteractionGroups {
        let membership = Group::from_bits_retain(self as u32);
        let filter = match self {
            Layer::Environment => Group::ALL,
            Layer::Player => {
                Group::from_bits_retain(Layer::Environment as u32 | Layer::Enemy as u32)
            }
            Layer::Enemy => Group::from_bits_retain(
                Layer::Environment as u32 | Layer::Player as u32 | Layer::Enemy as u32,
            ),
        };
        InteractionGroups::new(membership, filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layers_compose() {
        let mask = CollisionLayers::NONE.with(Layer::Environment).with(Layer::Enemy);
        assert!(mask.contains(Layer::Environment));
        assert!(mask.contains(Layer::Enemy));
        assert!(!mask.contains(Layer::Player));
        assert_eq!(CollisionLayers::default(), CollisionLayers::from(Layer::Environment));
    }
}
