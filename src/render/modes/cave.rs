use crate::render::modes::{BlockContext, ProcessBlock};
use crate::render::sample::{ModeOutcome, VisualSample};

/// Hides everything open to the sky, leaving enclosed structure.
///
/// A block is exposed when nothing above it in its column blocks the sky.
/// Air and see-through blocks (glass, leaves, water) do not block it.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaveMode;

impl ProcessBlock for CaveMode {
    fn process<'a>(&'a self, ctx: &BlockContext<'_>, sample: VisualSample<'a>) -> ModeOutcome<'a> {
        if ctx.chunk.is_sky_exposed(ctx.block.pos) {
            ModeOutcome::Skip
        } else {
            ModeOutcome::Draw(sample)
        }
    }
}
