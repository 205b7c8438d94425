use crate::world::block::{Block, BlockId, LocalPos};
use crate::world::chunk_coord::ChunkCoord;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

pub const CHUNK_WIDTH: usize = 16;
pub const CHUNK_DEPTH: usize = 16;
pub const CHUNK_HEIGHT: usize = 128;
pub const CHUNK_VOLUME: usize = CHUNK_WIDTH * CHUNK_DEPTH * CHUNK_HEIGHT;
pub const MAX_LIGHT: u8 = 15;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ChunkFlags: u16 {
        const HAS_LIGHT = 0b0000_0001;
    }
}

/// Fixed-size column of blocks, stored as parallel attribute arrays.
///
/// Index order is height fastest, then z, then x, so a vertical column is a
/// contiguous run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub position: ChunkCoord,
    pub flags: ChunkFlags,
    ids: Vec<BlockId>,
    variants: Vec<u8>,
    sky_light: Vec<u8>,
    block_light: Vec<u8>,
    // One past the highest non-see-through block per column, 0 when open to bedrock.
    heightmap: Vec<u8>,
}

impl Chunk {
    /// All-air chunk. Without light data every block reads full sky light.
    pub fn new(position: ChunkCoord, flags: ChunkFlags) -> Self {
        Self {
            position,
            flags,
            ids: vec![BlockId::AIR; CHUNK_VOLUME],
            variants: vec![0; CHUNK_VOLUME],
            sky_light: vec![MAX_LIGHT; CHUNK_VOLUME],
            block_light: vec![0; CHUNK_VOLUME],
            heightmap: vec![0; CHUNK_WIDTH * CHUNK_DEPTH],
        }
    }

    pub fn empty(position: ChunkCoord) -> Self {
        Self::new(position, ChunkFlags::HAS_LIGHT)
    }

    /// Position of a block inside the attribute arrays.
    ///
    /// Panics on out-of-range coordinates.
    #[inline]
    pub fn index(x: usize, y: usize, z: usize) -> usize {
        assert!(
            x < CHUNK_WIDTH && y < CHUNK_HEIGHT && z < CHUNK_DEPTH,
            "block ({x}, {y}, {z}) outside chunk"
        );
        y + z * CHUNK_HEIGHT + x * CHUNK_HEIGHT * CHUNK_DEPTH
    }

    #[inline]
    pub fn position_of(index: usize) -> LocalPos {
        let y = index % CHUNK_HEIGHT;
        let z = (index / CHUNK_HEIGHT) % CHUNK_DEPTH;
        let x = index / (CHUNK_HEIGHT * CHUNK_DEPTH);
        LocalPos::new(x as u8, y as u8, z as u8)
    }

    pub fn has_light(&self) -> bool {
        self.flags.contains(ChunkFlags::HAS_LIGHT)
    }

    pub fn block(&self, x: usize, y: usize, z: usize) -> Block {
        self.block_at_index(Self::index(x, y, z))
    }

    pub fn block_at(&self, pos: LocalPos) -> Block {
        self.block(pos.x as usize, pos.y as usize, pos.z as usize)
    }

    pub fn block_at_index(&self, index: usize) -> Block {
        Block {
            id: self.ids[index],
            variant: self.variants[index],
            sky_light: self.sky_light[index],
            block_light: self.block_light[index],
            pos: Self::position_of(index),
        }
    }

    /// The block offset by `(dx, dy, dz)` from `pos`, if it lies in this chunk.
    pub fn neighbor(&self, pos: LocalPos, dx: i32, dy: i32, dz: i32) -> Option<Block> {
        let x = pos.x as i32 + dx;
        let y = pos.y as i32 + dy;
        let z = pos.z as i32 + dz;
        let in_bounds = (0..CHUNK_WIDTH as i32).contains(&x)
            && (0..CHUNK_HEIGHT as i32).contains(&y)
            && (0..CHUNK_DEPTH as i32).contains(&z);
        in_bounds.then(|| self.block(x as usize, y as usize, z as usize))
    }

    pub fn set_block(&mut self, x: usize, y: usize, z: usize, id: BlockId, variant: u8) {
        let index = Self::index(x, y, z);
        self.ids[index] = id;
        self.variants[index] = variant & 0x0F;
        self.update_heightmap(x, y, z, id);
    }

    pub fn set_light(&mut self, x: usize, y: usize, z: usize, sky: u8, block: u8) {
        let index = Self::index(x, y, z);
        self.sky_light[index] = sky.min(MAX_LIGHT);
        self.block_light[index] = block.min(MAX_LIGHT);
    }

    /// Sets the same light levels on every block.
    pub fn fill_light(&mut self, sky: u8, block: u8) {
        self.sky_light.fill(sky.min(MAX_LIGHT));
        self.block_light.fill(block.min(MAX_LIGHT));
    }

    pub fn column_height(&self, x: usize, z: usize) -> usize {
        self.heightmap[x * CHUNK_DEPTH + z] as usize
    }

    /// True when every block above `pos` in its column lets the sky through.
    pub fn is_sky_exposed(&self, pos: LocalPos) -> bool {
        pos.y as usize + 1 >= self.column_height(pos.x as usize, pos.z as usize)
    }

    pub fn block_count(&self) -> usize {
        self.ids.iter().filter(|id| !id.is_air()).count()
    }

    pub(crate) fn raw_parts(&self) -> (&[BlockId], &[u8], &[u8], &[u8]) {
        (&self.ids, &self.variants, &self.sky_light, &self.block_light)
    }

    /// Assembles a chunk from decoded attribute arrays.
    pub(crate) fn from_parts(
        position: ChunkCoord,
        flags: ChunkFlags,
        ids: Vec<BlockId>,
        variants: Vec<u8>,
        sky_light: Vec<u8>,
        block_light: Vec<u8>,
    ) -> Self {
        debug_assert_eq!(ids.len(), CHUNK_VOLUME);
        let mut chunk = Self {
            position,
            flags,
            ids,
            variants,
            sky_light,
            block_light,
            heightmap: vec![0; CHUNK_WIDTH * CHUNK_DEPTH],
        };
        for x in 0..CHUNK_WIDTH {
            for z in 0..CHUNK_DEPTH {
                chunk.rescan_column(x, z);
            }
        }
        chunk
    }

    fn update_heightmap(&mut self, x: usize, y: usize, z: usize, id: BlockId) {
        let column = x * CHUNK_DEPTH + z;
        let top = self.heightmap[column] as usize;
        if !id.is_see_through() {
            if y + 1 > top {
                self.heightmap[column] = (y + 1) as u8;
            }
        } else if y + 1 == top {
            self.rescan_column(x, z);
        }
    }

    fn rescan_column(&mut self, x: usize, z: usize) {
        let base = Self::index(x, 0, z);
        let column = &self.ids[base..base + CHUNK_HEIGHT];
        let top = column
            .iter()
            .rposition(|id| !id.is_see_through())
            .map_or(0, |y| y + 1);
        self.heightmap[x * CHUNK_DEPTH + z] = top as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::blocks_data::{GLASS, STONE};

    #[test]
    fn test_chunk_operations() {
        let mut chunk = Chunk::empty(ChunkCoord::new(2, -3));
        assert_eq!(chunk.block_count(), 0);

        chunk.set_block(1, 2, 3, STONE, 4);
        chunk.set_light(1, 2, 3, 7, 20);
        let block = chunk.block(1, 2, 3);
        assert_eq!(block.id, STONE);
        assert_eq!(block.variant, 4);
        assert_eq!(block.sky_light, 7);
        assert_eq!(block.block_light, MAX_LIGHT);
        assert_eq!(block.pos, LocalPos::new(1, 2, 3));
        assert_eq!(chunk.block_count(), 1);
    }

    #[test]
    fn test_index_round_trip() {
        for &(x, y, z) in &[(0, 0, 0), (15, 127, 15), (3, 64, 9)] {
            let pos = Chunk::position_of(Chunk::index(x, y, z));
            assert_eq!(pos, LocalPos::new(x as u8, y as u8, z as u8));
        }
    }

    #[test]
    #[should_panic]
    fn test_out_of_bounds_is_a_defect() {
        let chunk = Chunk::empty(ChunkCoord::new(0, 0));
        chunk.block(0, CHUNK_HEIGHT, 0);
    }

    #[test]
    fn test_neighbor_bounds() {
        let chunk = Chunk::empty(ChunkCoord::new(0, 0));
        let corner = LocalPos::new(0, 0, 0);
        assert!(chunk.neighbor(corner, -1, 0, 0).is_none());
        assert!(chunk.neighbor(corner, 0, -1, 0).is_none());
        assert_eq!(
            chunk.neighbor(corner, 1, 1, 1).unwrap().pos,
            LocalPos::new(1, 1, 1)
        );
    }

    #[test]
    fn test_heightmap() {
        let mut chunk = Chunk::empty(ChunkCoord::new(0, 0));
        chunk.set_block(5, 10, 5, STONE, 0);
        chunk.set_block(5, 20, 5, GLASS, 0);
        assert_eq!(chunk.column_height(5, 5), 11);
        assert!(chunk.is_sky_exposed(LocalPos::new(5, 10, 5)));
        assert!(!chunk.is_sky_exposed(LocalPos::new(5, 9, 5)));

        chunk.set_block(5, 10, 5, BlockId::AIR, 0);
        assert_eq!(chunk.column_height(5, 5), 0);
        assert!(chunk.is_sky_exposed(LocalPos::new(5, 0, 5)));
    }
}
