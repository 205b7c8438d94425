//! Per-block render modes.
//!
//! The set of modes is closed: each is a variant of [`RenderMode`], and every
//! variant implements [`ProcessBlock`].

pub mod cave;
pub mod lighting;
pub mod mineral;
pub mod overlay;
pub mod spawn;

pub use cave::CaveMode;
pub use lighting::{LightingMode, SmoothLightingMode, LIGHT_CURVE};
pub use mineral::MineralMode;
pub use overlay::OverlayMode;
pub use spawn::SpawnMode;

use crate::render::sample::{ModeOutcome, VisualSample};
use crate::utils::error::ConfigurationError;
use crate::world::block::Block;
use crate::world::chunk::{Chunk, CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH};
use glam::IVec3;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// The four chunks sharing a face with the one being drawn. `None` where a
/// chunk is missing or corrupt.
#[derive(Debug, Clone, Copy, Default)]
pub struct Neighborhood<'c> {
    pub pos_x: Option<&'c Chunk>,
    pub neg_x: Option<&'c Chunk>,
    pub pos_z: Option<&'c Chunk>,
    pub neg_z: Option<&'c Chunk>,
}

/// Everything a mode may inspect about the block being drawn.
#[derive(Debug, Clone, Copy)]
pub struct BlockContext<'c> {
    pub block: Block,
    pub chunk: &'c Chunk,
    pub neighbors: Neighborhood<'c>,
    /// World block position, `y` being height.
    pub world: IVec3,
}

impl<'c> BlockContext<'c> {
    pub fn new(chunk: &'c Chunk, block: Block) -> Self {
        let world = IVec3::new(
            chunk.position.x() * CHUNK_WIDTH as i32 + block.pos.x as i32,
            block.pos.y as i32,
            chunk.position.z() * CHUNK_DEPTH as i32 + block.pos.z as i32,
        );
        Self {
            block,
            chunk,
            neighbors: Neighborhood::default(),
            world,
        }
    }

    pub fn with_neighbors(mut self, neighbors: Neighborhood<'c>) -> Self {
        self.neighbors = neighbors;
        self
    }

    /// The block offset by `(dx, dy, dz)` and the chunk holding it, looked up
    /// in a neighbouring chunk when the offset crosses the border along one
    /// horizontal axis.
    ///
    /// `None` above or below the world, past the adjacent chunks, across a
    /// corner, or when the neighbouring chunk is absent.
    pub fn neighbor(&self, dx: i32, dy: i32, dz: i32) -> Option<(&'c Chunk, Block)> {
        let pos = self.block.pos;
        let x = pos.x as i32 + dx;
        let y = pos.y as i32 + dy;
        let z = pos.z as i32 + dz;
        if !(0..CHUNK_HEIGHT as i32).contains(&y) {
            return None;
        }
        let (width, depth) = (CHUNK_WIDTH as i32, CHUNK_DEPTH as i32);
        let chunk = match (x.div_euclid(width), z.div_euclid(depth)) {
            (0, 0) => self.chunk,
            (1, 0) => self.neighbors.pos_x?,
            (-1, 0) => self.neighbors.neg_x?,
            (0, 1) => self.neighbors.pos_z?,
            (0, -1) => self.neighbors.neg_z?,
            _ => return None,
        };
        let block = chunk.block(
            x.rem_euclid(width) as usize,
            y as usize,
            z.rem_euclid(depth) as usize,
        );
        Some((chunk, block))
    }
}

/// One step of the mode chain.
pub trait ProcessBlock {
    fn process<'a>(&'a self, ctx: &BlockContext<'_>, sample: VisualSample<'a>) -> ModeOutcome<'a>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKind {
    Normal,
    Lighting,
    SmoothLighting,
    Cave,
    Overlay,
    Spawn,
    Mineral,
}

impl ModeKind {
    pub const ALL: [ModeKind; 7] = [
        ModeKind::Normal,
        ModeKind::Lighting,
        ModeKind::SmoothLighting,
        ModeKind::Cave,
        ModeKind::Overlay,
        ModeKind::Spawn,
        ModeKind::Mineral,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ModeKind::Normal => "normal",
            ModeKind::Lighting => "lighting",
            ModeKind::SmoothLighting => "smooth-lighting",
            ModeKind::Cave => "cave",
            ModeKind::Overlay => "overlay",
            ModeKind::Spawn => "spawn",
            ModeKind::Mineral => "mineral",
        }
    }
}

impl Display for ModeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModeKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ConfigurationError::UnknownMode(s.to_string()))
    }
}

/// Passes the texture sample through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalMode;

impl ProcessBlock for NormalMode {
    fn process<'a>(&'a self, _ctx: &BlockContext<'_>, sample: VisualSample<'a>) -> ModeOutcome<'a> {
        ModeOutcome::Draw(sample)
    }
}

#[derive(Debug, Clone)]
pub enum RenderMode {
    Normal(NormalMode),
    Lighting(LightingMode),
    SmoothLighting(SmoothLightingMode),
    Cave(CaveMode),
    Overlay(OverlayMode),
    Spawn(SpawnMode),
    Mineral(MineralMode),
}

impl RenderMode {
    pub fn kind(&self) -> ModeKind {
        match self {
            RenderMode::Normal(_) => ModeKind::Normal,
            RenderMode::Lighting(_) => ModeKind::Lighting,
            RenderMode::SmoothLighting(_) => ModeKind::SmoothLighting,
            RenderMode::Cave(_) => ModeKind::Cave,
            RenderMode::Overlay(_) => ModeKind::Overlay,
            RenderMode::Spawn(_) => ModeKind::Spawn,
            RenderMode::Mineral(_) => ModeKind::Mineral,
        }
    }
}

impl ProcessBlock for RenderMode {
    fn process<'a>(&'a self, ctx: &BlockContext<'_>, sample: VisualSample<'a>) -> ModeOutcome<'a> {
        match self {
            RenderMode::Normal(mode) => mode.process(ctx, sample),
            RenderMode::Lighting(mode) => mode.process(ctx, sample),
            RenderMode::SmoothLighting(mode) => mode.process(ctx, sample),
            RenderMode::Cave(mode) => mode.process(ctx, sample),
            RenderMode::Overlay(mode) => mode.process(ctx, sample),
            RenderMode::Spawn(mode) => mode.process(ctx, sample),
            RenderMode::Mineral(mode) => mode.process(ctx, sample),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::render::texture::Sprite;
    use crate::world::block::{BlockId, LocalPos};
    use crate::world::chunk_coord::ChunkCoord;

    pub fn grey_sprite() -> Sprite {
        Sprite::flat_cube([200, 200, 200, 255])
    }

    pub fn chunk_with(blocks: &[(LocalPos, BlockId)]) -> Chunk {
        let mut chunk = Chunk::empty(ChunkCoord::new(0, 0));
        for (pos, id) in blocks {
            chunk.set_block(pos.x as usize, pos.y as usize, pos.z as usize, *id, 0);
        }
        chunk
    }

    pub fn drawn<'a>(outcome: ModeOutcome<'a>) -> VisualSample<'a> {
        match outcome {
            ModeOutcome::Draw(sample) => sample,
            ModeOutcome::Skip => panic!("expected the block to be drawn"),
        }
    }
}
