// blocks_data.rs - Well-known block types of the classic chunk format

use crate::world::block::BlockId;

pub const AIR: BlockId = BlockId(0);
pub const STONE: BlockId = BlockId(1);
pub const GRASS: BlockId = BlockId(2);
pub const DIRT: BlockId = BlockId(3);
pub const COBBLESTONE: BlockId = BlockId(4);
pub const PLANKS: BlockId = BlockId(5);
pub const BEDROCK: BlockId = BlockId(7);
pub const WATER_FLOWING: BlockId = BlockId(8);
pub const WATER: BlockId = BlockId(9);
pub const LAVA_FLOWING: BlockId = BlockId(10);
pub const LAVA: BlockId = BlockId(11);
pub const SAND: BlockId = BlockId(12);
pub const GRAVEL: BlockId = BlockId(13);
pub const GOLD_ORE: BlockId = BlockId(14);
pub const IRON_ORE: BlockId = BlockId(15);
pub const COAL_ORE: BlockId = BlockId(16);
pub const LOG: BlockId = BlockId(17);
pub const LEAVES: BlockId = BlockId(18);
pub const GLASS: BlockId = BlockId(20);
pub const LAPIS_ORE: BlockId = BlockId(21);
pub const TORCH: BlockId = BlockId(50);
pub const DIAMOND_ORE: BlockId = BlockId(56);
pub const REDSTONE_ORE: BlockId = BlockId(73);
pub const REDSTONE_ORE_LIT: BlockId = BlockId(74);
pub const SNOW_LAYER: BlockId = BlockId(78);
pub const ICE: BlockId = BlockId(79);

/// Liquids of the same family merge their surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Liquid {
    Water,
    Lava,
}

#[derive(Debug, Clone, Copy)]
pub struct BlockInfo {
    pub id: BlockId,
    pub name: &'static str,
    /// Sky stays visible through this block.
    pub see_through: bool,
    pub liquid: Option<Liquid>,
    /// Base colour used for synthesized sprites.
    pub color: [u8; 4],
}

const fn solid(id: BlockId, name: &'static str, color: [u8; 3]) -> BlockInfo {
    BlockInfo {
        id,
        name,
        see_through: false,
        liquid: None,
        color: [color[0], color[1], color[2], 255],
    }
}

const fn clear(id: BlockId, name: &'static str, color: [u8; 4]) -> BlockInfo {
    BlockInfo {
        id,
        name,
        see_through: true,
        liquid: None,
        color,
    }
}

const fn liquid(id: BlockId, name: &'static str, kind: Liquid, color: [u8; 4]) -> BlockInfo {
    BlockInfo {
        id,
        name,
        see_through: true,
        liquid: Some(kind),
        color,
    }
}

pub static BLOCKS: &[BlockInfo] = &[
    clear(AIR, "air", [0, 0, 0, 0]),
    solid(STONE, "stone", [125, 125, 125]),
    solid(GRASS, "grass", [95, 159, 53]),
    solid(DIRT, "dirt", [134, 96, 67]),
    solid(COBBLESTONE, "cobblestone", [112, 112, 112]),
    solid(PLANKS, "planks", [157, 128, 79]),
    solid(BEDROCK, "bedrock", [84, 84, 84]),
    liquid(WATER_FLOWING, "flowing_water", Liquid::Water, [47, 67, 244, 160]),
    liquid(WATER, "water", Liquid::Water, [47, 67, 244, 160]),
    liquid(LAVA_FLOWING, "flowing_lava", Liquid::Lava, [212, 90, 18, 255]),
    liquid(LAVA, "lava", Liquid::Lava, [212, 90, 18, 255]),
    solid(SAND, "sand", [219, 211, 160]),
    solid(GRAVEL, "gravel", [136, 126, 126]),
    solid(GOLD_ORE, "gold_ore", [143, 140, 125]),
    solid(IRON_ORE, "iron_ore", [136, 130, 127]),
    solid(COAL_ORE, "coal_ore", [115, 115, 115]),
    solid(LOG, "log", [102, 81, 51]),
    clear(LEAVES, "leaves", [60, 192, 41, 200]),
    clear(GLASS, "glass", [218, 240, 244, 64]),
    solid(LAPIS_ORE, "lapis_ore", [102, 112, 134]),
    clear(TORCH, "torch", [255, 214, 100, 255]),
    solid(DIAMOND_ORE, "diamond_ore", [129, 140, 143]),
    solid(REDSTONE_ORE, "redstone_ore", [132, 107, 107]),
    solid(REDSTONE_ORE_LIT, "lit_redstone_ore", [132, 107, 107]),
    clear(SNOW_LAYER, "snow_layer", [239, 251, 251, 255]),
    clear(ICE, "ice", [125, 173, 255, 159]),
];

/// Finds a block's table entry. The table is sorted by id.
pub fn lookup(id: BlockId) -> Option<&'static BlockInfo> {
    BLOCKS
        .binary_search_by_key(&id, |info| info.id)
        .ok()
        .map(|index| &BLOCKS[index])
}

pub fn by_name(name: &str) -> Option<&'static BlockInfo> {
    BLOCKS.iter().find(|info| info.name == name)
}

/// Ores highlighted by the mineral mode when no list is configured.
pub fn default_minerals() -> Vec<(BlockId, [u8; 3])> {
    vec![
        (DIAMOND_ORE, [0, 220, 255]),
        (GOLD_ORE, [255, 215, 0]),
        (IRON_ORE, [216, 175, 147]),
        (LAPIS_ORE, [30, 60, 255]),
        (REDSTONE_ORE, [255, 0, 0]),
        (REDSTONE_ORE_LIT, [255, 0, 0]),
        (COAL_ORE, [20, 20, 20]),
    ]
}
