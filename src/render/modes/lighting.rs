use crate::config::modes::LightingSettings;
use crate::render::modes::{BlockContext, ProcessBlock};
use crate::render::sample::{ColorTransform, ModeOutcome, VisualSample};
use crate::world::block::Block;
use crate::world::chunk::MAX_LIGHT;
use once_cell::sync::Lazy;

/// Sky light removed before the curve lookup in night renders.
pub const NIGHT_DIMMING: u8 = 11;

const FALLOFF: f32 = 0.8;

/// Brightness factor per light level: `0.8^(15 - level)`.
///
/// Level 15 maps to exactly 1.0 and level 0 to about 0.035.
pub static LIGHT_CURVE: Lazy<[f32; 16]> = Lazy::new(|| {
    let mut curve = [0.0; 16];
    for (level, factor) in curve.iter_mut().enumerate() {
        *factor = FALLOFF.powi(MAX_LIGHT as i32 - level as i32);
    }
    curve
});

/// Brightness for a possibly fractional light level, linear between table entries.
pub fn curve_at(level: f32) -> f32 {
    let level = level.clamp(0.0, MAX_LIGHT as f32);
    let low = level.floor() as usize;
    let high = level.ceil() as usize;
    let t = level - low as f32;
    LIGHT_CURVE[low] * (1.0 - t) + LIGHT_CURVE[high] * t
}

fn effective_level(block: &Block, night: bool) -> u8 {
    let sky = if night {
        block.sky_light.saturating_sub(NIGHT_DIMMING)
    } else {
        block.sky_light
    };
    sky.max(block.block_light)
}

/// Attenuates by the block's own light level.
#[derive(Debug, Clone, Default)]
pub struct LightingMode {
    night: bool,
}

impl LightingMode {
    pub fn new(settings: &LightingSettings) -> Self {
        Self {
            night: settings.night,
        }
    }

    pub fn brightness(&self, block: &Block) -> f32 {
        LIGHT_CURVE[effective_level(block, self.night) as usize]
    }
}

impl ProcessBlock for LightingMode {
    fn process<'a>(&'a self, ctx: &BlockContext<'_>, sample: VisualSample<'a>) -> ModeOutcome<'a> {
        if !ctx.chunk.has_light() {
            return ModeOutcome::Draw(sample);
        }
        let factor = self.brightness(&ctx.block);
        ModeOutcome::Draw(sample.with_transform(ColorTransform::attenuate(factor)))
    }
}

const FACE_NEIGHBORS: [(i32, i32, i32); 6] = [
    (1, 0, 0),
    (-1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
    (0, 0, 1),
    (0, 0, -1),
];

/// Attenuates by the mean light level of the block and its six face
/// neighbours, reaching into adjacent chunks at the border.
///
/// Neighbours outside the world, in absent chunks or in chunks without light
/// data are left out of the mean.
#[derive(Debug, Clone, Default)]
pub struct SmoothLightingMode {
    night: bool,
}

impl SmoothLightingMode {
    pub fn new(settings: &LightingSettings) -> Self {
        Self {
            night: settings.night,
        }
    }

    pub fn averaged_level(&self, ctx: &BlockContext<'_>) -> f32 {
        let (sum, count) = FACE_NEIGHBORS
            .iter()
            .filter_map(|&(dx, dy, dz)| ctx.neighbor(dx, dy, dz))
            .filter(|(chunk, _)| chunk.has_light())
            .map(|(_, block)| block)
            .fold(
                (effective_level(&ctx.block, self.night) as u32, 1u32),
                |(sum, count), neighbor| {
                    (sum + effective_level(&neighbor, self.night) as u32, count + 1)
                },
            );
        sum as f32 / count as f32
    }
}

impl ProcessBlock for SmoothLightingMode {
    fn process<'a>(&'a self, ctx: &BlockContext<'_>, sample: VisualSample<'a>) -> ModeOutcome<'a> {
        if !ctx.chunk.has_light() {
            return ModeOutcome::Draw(sample);
        }
        let factor = curve_at(self.averaged_level(ctx));
        ModeOutcome::Draw(sample.with_transform(ColorTransform::attenuate(factor)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::modes::test_support::{chunk_with, drawn, grey_sprite};
    use crate::render::modes::Neighborhood;
    use crate::world::block::LocalPos;
    use crate::world::blocks_data::STONE;
    use crate::world::chunk::{Chunk, ChunkFlags};
    use crate::world::chunk_coord::ChunkCoord;

    #[test]
    fn test_curve_endpoints_and_monotonic() {
        assert_eq!(LIGHT_CURVE[15], 1.0);
        assert!(LIGHT_CURVE[0] < 0.05);
        for pair in LIGHT_CURVE.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert!(LIGHT_CURVE[15] - LIGHT_CURVE[14] > LIGHT_CURVE[1] - LIGHT_CURVE[0]);
    }

    #[test]
    fn test_curve_interpolation() {
        assert_eq!(curve_at(15.0), 1.0);
        assert_eq!(curve_at(20.0), 1.0);
        assert_eq!(curve_at(-3.0), LIGHT_CURVE[0]);
        let mid = curve_at(7.5);
        assert!(mid > LIGHT_CURVE[7] && mid < LIGHT_CURVE[8]);
    }

    #[test]
    fn test_lighting_monotonic_in_level() {
        let mode = LightingMode::default();
        let sprite = grey_sprite();
        let pos = LocalPos::new(3, 10, 3);
        let mut previous = -1.0;
        for level in 0..=MAX_LIGHT {
            let mut chunk = chunk_with(&[(pos, STONE)]);
            chunk.set_light(3, 10, 3, level, 0);
            let ctx = BlockContext::new(&chunk, chunk.block_at(pos));
            let sample = drawn(mode.process(&ctx, VisualSample::new(&sprite)));
            let brightness = sample.transform.scale.x;
            assert!(brightness >= previous);
            previous = brightness;
        }
        assert_eq!(previous, 1.0);
    }

    #[test]
    fn test_block_light_wins_when_brighter() {
        let mode = LightingMode::default();
        let mut chunk = chunk_with(&[(LocalPos::new(0, 0, 0), STONE)]);
        chunk.set_light(0, 0, 0, 2, 12);
        assert_eq!(mode.brightness(&chunk.block(0, 0, 0)), LIGHT_CURVE[12]);
    }

    #[test]
    fn test_night_dims_sky_only() {
        let night = LightingMode::new(&LightingSettings { night: true });
        let mut chunk = chunk_with(&[(LocalPos::new(0, 0, 0), STONE)]);
        chunk.set_light(0, 0, 0, 15, 0);
        assert_eq!(night.brightness(&chunk.block(0, 0, 0)), LIGHT_CURVE[4]);
        chunk.set_light(0, 0, 0, 15, 9);
        assert_eq!(night.brightness(&chunk.block(0, 0, 0)), LIGHT_CURVE[9]);
    }

    #[test]
    fn test_chunk_without_light_is_unattenuated() {
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0), ChunkFlags::empty());
        chunk.set_block(0, 0, 0, STONE, 0);
        let sprite = grey_sprite();
        let ctx = BlockContext::new(&chunk, chunk.block(0, 0, 0));
        for outcome in [
            LightingMode::default().process(&ctx, VisualSample::new(&sprite)),
            SmoothLightingMode::default().process(&ctx, VisualSample::new(&sprite)),
        ] {
            assert!(drawn(outcome).transform.is_identity());
        }
    }

    #[test]
    fn test_smooth_lighting_averages_neighbors() {
        let mode = SmoothLightingMode::default();
        let mut chunk = chunk_with(&[(LocalPos::new(5, 5, 5), STONE)]);
        chunk.fill_light(0, 0);
        chunk.set_light(5, 5, 5, 14, 0);
        chunk.set_light(5, 6, 5, 7, 0);

        let ctx = BlockContext::new(&chunk, chunk.block(5, 5, 5));
        assert_eq!(mode.averaged_level(&ctx), 3.0);
    }

    #[test]
    fn test_smooth_lighting_skips_absent_neighbors() {
        let mode = SmoothLightingMode::default();
        let mut chunk = chunk_with(&[]);
        chunk.fill_light(0, 0);
        chunk.set_light(0, 0, 0, 9, 0);
        chunk.set_light(1, 0, 0, 3, 0);
        // Corner block with no neighbouring chunks: three neighbours plus itself
        let ctx = BlockContext::new(&chunk, chunk.block(0, 0, 0));
        assert_eq!(mode.averaged_level(&ctx), 3.0);
    }

    #[test]
    fn test_smooth_lighting_same_across_chunk_border() {
        let mode = SmoothLightingMode::default();

        let mut single = chunk_with(&[]);
        single.fill_light(0, 0);
        single.set_light(14, 20, 7, 5, 0);
        single.set_light(15, 20, 7, 10, 0);
        let interior = BlockContext::new(&single, single.block(14, 20, 7));

        let mut west = Chunk::empty(ChunkCoord::new(0, 0));
        west.fill_light(0, 0);
        west.set_light(15, 20, 7, 5, 0);
        let mut east = Chunk::empty(ChunkCoord::new(1, 0));
        east.fill_light(0, 0);
        east.set_light(0, 20, 7, 10, 0);
        let border = BlockContext::new(&west, west.block(15, 20, 7)).with_neighbors(Neighborhood {
            pos_x: Some(&east),
            ..Neighborhood::default()
        });

        assert_eq!(mode.averaged_level(&interior), 15.0 / 7.0);
        assert_eq!(mode.averaged_level(&border), mode.averaged_level(&interior));
    }

    #[test]
    fn test_smooth_lighting_ignores_unlit_neighbor_chunk() {
        let mode = SmoothLightingMode::default();
        let mut chunk = chunk_with(&[]);
        chunk.fill_light(6, 0);
        // Reads full sky light everywhere, but carries no light data
        let unlit = Chunk::new(ChunkCoord::new(1, 0), ChunkFlags::empty());
        let ctx = BlockContext::new(&chunk, chunk.block(15, 10, 8)).with_neighbors(Neighborhood {
            pos_x: Some(&unlit),
            ..Neighborhood::default()
        });
        assert_eq!(mode.averaged_level(&ctx), 6.0);
    }

    #[test]
    fn test_smooth_lighting_removes_banding() {
        let mode = SmoothLightingMode::default();
        let mut chunk = chunk_with(&[]);
        chunk.fill_light(15, 0);
        for x in 0..16 {
            for y in 0..64 {
                for z in 0..16 {
                    chunk.set_light(x, y, z, if x < 8 { 4 } else { 12 }, 0);
                }
            }
        }
        let edge_dark = BlockContext::new(&chunk, chunk.block(7, 10, 5));
        let edge_light = BlockContext::new(&chunk, chunk.block(8, 10, 5));
        let hard_step = LIGHT_CURVE[12] - LIGHT_CURVE[4];
        let smooth_step =
            curve_at(mode.averaged_level(&edge_light)) - curve_at(mode.averaged_level(&edge_dark));
        assert!(smooth_step > 0.0 && smooth_step < hard_step);
    }
}
