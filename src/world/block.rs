use crate::world::blocks_data::{self, BlockInfo};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Numeric block type as stored in chunk data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct BlockId(pub u16);

impl BlockId {
    pub const AIR: BlockId = BlockId(0);

    pub fn is_air(&self) -> bool {
        *self == Self::AIR
    }

    /// Static properties of this type, if it is a known block.
    pub fn info(&self) -> Option<&'static BlockInfo> {
        blocks_data::lookup(*self)
    }

    /// Light and sight pass through blocks of this type.
    pub fn is_see_through(&self) -> bool {
        self.is_air() || self.info().map_or(false, |info| info.see_through)
    }

    pub fn is_liquid(&self) -> bool {
        self.info().map_or(false, |info| info.liquid.is_some())
    }
}

impl Display for BlockId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.info() {
            Some(info) => write!(f, "{} ({})", info.name, self.0),
            None => write!(f, "{}", self.0),
        }
    }
}

impl From<u16> for BlockId {
    fn from(id: u16) -> Self {
        Self(id)
    }
}

impl From<BlockId> for u16 {
    fn from(id: BlockId) -> u16 {
        id.0
    }
}

/// Position of a block inside its chunk. `y` is height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct LocalPos {
    pub x: u8,
    pub y: u8,
    pub z: u8,
}

impl LocalPos {
    pub const fn new(x: u8, y: u8, z: u8) -> Self {
        Self { x, y, z }
    }
}

/// Immutable snapshot of one voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub variant: u8,
    pub sky_light: u8,
    pub block_light: u8,
    pub pos: LocalPos,
}

impl Block {
    pub fn is_air(&self) -> bool {
        self.id.is_air()
    }

    /// The brighter of the two light channels.
    pub fn light_level(&self) -> u8 {
        self.sky_light.max(self.block_light)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_see_through_types() {
        assert!(BlockId::AIR.is_see_through());
        assert!(blocks_data::GLASS.is_see_through());
        assert!(!blocks_data::STONE.is_see_through());
        // Unknown ids are treated as solid
        assert!(!BlockId(4000).is_see_through());
    }

    #[test]
    fn test_light_level_takes_brighter_channel() {
        let block = Block {
            id: blocks_data::STONE,
            variant: 0,
            sky_light: 3,
            block_light: 9,
            pos: LocalPos::new(0, 0, 0),
        };
        assert_eq!(block.light_level(), 9);
    }

    #[test]
    fn test_display_uses_table_name() {
        assert_eq!(blocks_data::STONE.to_string(), "stone (1)");
        assert_eq!(BlockId(999).to_string(), "999");
    }
}
