use crate::config::modes::{OverlayKey, OverlaySettings};
use crate::render::modes::{BlockContext, ProcessBlock};
use crate::render::sample::{ModeOutcome, VisualSample};
use crate::world::block::LocalPos;
use crate::world::chunk::{CHUNK_DEPTH, CHUNK_WIDTH};
use crate::world::chunk_coord::{ChunkCoord, REGION_SIZE};
use glam::Vec4;

/// Marks blocks selected by chunk metadata with a translucent layer.
///
/// The base sample is left as it is; the compositor paints the layer over it.
#[derive(Debug, Clone)]
pub struct OverlayMode {
    key: OverlayKey,
    color: Vec4,
}

impl OverlayMode {
    pub fn new(settings: &OverlaySettings) -> Self {
        let [r, g, b, a] = settings.color;
        Self {
            key: settings.key,
            color: Vec4::new(r as f32, g as f32, b as f32, a as f32) / 255.0,
        }
    }

    pub fn selects(&self, ctx: &BlockContext<'_>) -> bool {
        match self.key {
            OverlayKey::ChunkBorder => on_chunk_ring(ctx.block.pos),
            OverlayKey::RegionBorder => on_region_ring(ctx.chunk.position, ctx.block.pos),
            OverlayKey::MissingLight => !ctx.chunk.has_light(),
        }
    }
}

fn on_chunk_ring(pos: LocalPos) -> bool {
    let last_x = (CHUNK_WIDTH - 1) as u8;
    let last_z = (CHUNK_DEPTH - 1) as u8;
    pos.x == 0 || pos.x == last_x || pos.z == 0 || pos.z == last_z
}

fn on_region_ring(chunk: ChunkCoord, pos: LocalPos) -> bool {
    let local = chunk.region_local();
    let last = REGION_SIZE - 1;
    (local.x == 0 && pos.x == 0)
        || (local.x == last && pos.x as usize == CHUNK_WIDTH - 1)
        || (local.y == 0 && pos.z == 0)
        || (local.y == last && pos.z as usize == CHUNK_DEPTH - 1)
}

impl ProcessBlock for OverlayMode {
    fn process<'a>(&'a self, ctx: &BlockContext<'_>, sample: VisualSample<'a>) -> ModeOutcome<'a> {
        if self.selects(ctx) {
            ModeOutcome::Draw(sample.with_overlay(self.color))
        } else {
            ModeOutcome::Draw(sample)
        }
    }
}
