//! Isometric projection and draw order.
//!
//! World x runs towards the upper right of the image, world z towards the
//! lower right and height straight up. The viewer looks along (-x, +z, +y), so
//! the far corner of a chunk is its maximum x, minimum z and minimum height.

use crate::world::block::LocalPos;
use crate::world::chunk::{CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH};
use crate::world::chunk_coord::ChunkCoord;
use glam::IVec2;
use std::cmp::Ordering;

/// Width and height of one block sprite.
pub const SPRITE_SIZE: u32 = 24;
/// Horizontal pixels per step along x or z.
pub const STEP_ACROSS: i32 = 12;
/// Vertical pixels per step along x or z.
pub const STEP_DOWN: i32 = 6;
/// Vertical pixels per unit of height.
pub const STEP_UP: i32 = 12;
/// Screen pixels a liquid surface sits below a full block top.
pub const LIQUID_SURFACE_DROP: i32 = 2;

/// Pixel rectangle with exclusive upper bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub min: IVec2,
    pub max: IVec2,
}

impl PixelRect {
    pub fn new(min: IVec2, max: IVec2) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> i32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> i32 {
        self.max.y - self.min.y
    }

    pub fn intersects(&self, other: &PixelRect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    pub fn contains(&self, point: IVec2) -> bool {
        point.x >= self.min.x && point.x < self.max.x && point.y >= self.min.y && point.y < self.max.y
    }
}

/// Top-left corner of the sprite for the block at world position `(x, y, z)`.
#[inline]
pub fn project(x: i32, y: i32, z: i32) -> IVec2 {
    IVec2::new(
        STEP_ACROSS * (x + z),
        STEP_DOWN * (z - x) - STEP_UP * y,
    )
}

/// Global pixel origin of a chunk's block (0, 0, 0).
pub fn chunk_origin(coord: ChunkCoord) -> IVec2 {
    project(
        coord.x() * CHUNK_WIDTH as i32,
        0,
        coord.z() * CHUNK_DEPTH as i32,
    )
}

/// Sprite corner of a chunk-local block relative to the chunk origin.
#[inline]
pub fn project_local(pos: LocalPos) -> IVec2 {
    project(pos.x as i32, pos.y as i32, pos.z as i32)
}

/// Everything any block of the chunk can paint.
pub fn chunk_bounds(coord: ChunkCoord) -> PixelRect {
    let origin = chunk_origin(coord);
    let (min, max) = local_extent();
    PixelRect::new(origin + min, origin + max)
}

// Extent of all sprites of one chunk relative to its origin, including the
// downward shift of liquid surfaces.
fn local_extent() -> (IVec2, IVec2) {
    let w = CHUNK_WIDTH as i32 - 1;
    let d = CHUNK_DEPTH as i32 - 1;
    let h = CHUNK_HEIGHT as i32 - 1;
    let sprite = SPRITE_SIZE as i32;
    let min = IVec2::new(0, project(w, h, 0).y);
    let max = IVec2::new(
        project(w, 0, d).x + sprite,
        project(0, 0, d).y + sprite + LIQUID_SURFACE_DROP,
    );
    (min, max)
}

/// Chunk columns whose painted area intersects `rect`, widened by `margin`
/// chunks, in chunk draw order.
///
/// Chunk bounds depend only on `cx + cz` horizontally and `cz - cx`
/// vertically, so both sums are solved for directly.
pub fn chunks_for_rect(rect: &PixelRect, margin: u32) -> Vec<ChunkCoord> {
    let (min, max) = local_extent();
    let across = STEP_ACROSS * CHUNK_WIDTH as i32;
    let down = STEP_DOWN * CHUNK_WIDTH as i32;
    let margin = margin as i32;

    let (sum_lo, sum_hi) = overlapping_steps(rect.min.x, rect.max.x, across, min.x, max.x);
    let (diff_lo, diff_hi) = overlapping_steps(rect.min.y, rect.max.y, down, min.y, max.y);

    let mut coords = Vec::new();
    for sum in (sum_lo - margin)..=(sum_hi + margin) {
        for diff in (diff_lo - margin)..=(diff_hi + margin) {
            if (sum - diff).rem_euclid(2) != 0 {
                continue;
            }
            coords.push(ChunkCoord::new((sum - diff) / 2, (sum + diff) / 2));
        }
    }
    coords.sort_by(chunk_draw_order);
    coords
}

// Integer steps `k` for which `[k * step + lo, k * step + hi)` overlaps `[r0, r1)`.
fn overlapping_steps(r0: i32, r1: i32, step: i32, lo: i32, hi: i32) -> (i32, i32) {
    let first = (r0 - hi).div_euclid(step) + 1;
    let last = (r1 - lo - 1).div_euclid(step);
    (first, last)
}

/// Back-to-front order of blocks inside one chunk: x descending, then z
/// ascending, then height ascending (screen y descending within a column).
#[inline]
pub fn draw_order(a: &LocalPos, b: &LocalPos) -> Ordering {
    b.x.cmp(&a.x)
        .then_with(|| a.z.cmp(&b.z))
        .then_with(|| a.y.cmp(&b.y))
}

/// Back-to-front order of whole chunk columns.
pub fn chunk_draw_order(a: &ChunkCoord, b: &ChunkCoord) -> Ordering {
    b.x().cmp(&a.x()).then_with(|| a.z().cmp(&b.z()))
}

/// Every position of a chunk in draw order.
pub fn draw_sequence() -> impl Iterator<Item = LocalPos> {
    (0..CHUNK_WIDTH).rev().flat_map(|x| {
        (0..CHUNK_DEPTH).flat_map(move |z| {
            (0..CHUNK_HEIGHT).map(move |y| LocalPos::new(x as u8, y as u8, z as u8))
        })
    })
}

/// Visible face of a cube sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    Top,
    Left,
    Right,
}

/// Which face of the cube silhouette covers sprite pixel `(px, py)`.
pub fn cube_face_at(px: u32, py: u32) -> Option<CubeFace> {
    let size = SPRITE_SIZE as f32;
    let half = size / 2.0;
    let x = px as f32 + 0.5;
    let y = py as f32 + 0.5;
    let slope = (x - half).abs() / 2.0;

    if x < 0.0 || x > size || y < slope || y > size - slope {
        return None;
    }
    if y < half - slope {
        Some(CubeFace::Top)
    } else if x < half {
        Some(CubeFace::Left)
    } else {
        Some(CubeFace::Right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn random_pos(rng: &mut ChaCha8Rng) -> LocalPos {
        LocalPos::new(
            rng.gen_range(0..CHUNK_WIDTH as u8),
            rng.gen_range(0..CHUNK_HEIGHT as u8),
            rng.gen_range(0..CHUNK_DEPTH as u8),
        )
    }

    #[test]
    fn test_projection_steps() {
        assert_eq!(project(0, 0, 0), IVec2::ZERO);
        assert_eq!(project(1, 0, 0), IVec2::new(12, -6));
        assert_eq!(project(0, 0, 1), IVec2::new(12, 6));
        assert_eq!(project(0, 1, 0), IVec2::new(0, -12));
    }

    #[test]
    fn test_draw_order_is_total() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..5000 {
            let a = random_pos(&mut rng);
            let b = random_pos(&mut rng);
            let ab = draw_order(&a, &b);
            let ba = draw_order(&b, &a);
            assert_eq!(ab, ba.reverse());
            assert_eq!(ab == Ordering::Equal, a == b);
        }
    }

    #[test]
    fn test_draw_order_is_stable_under_start_point() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut positions: Vec<_> = (0..300).map(|_| random_pos(&mut rng)).collect();
        positions.dedup();
        let mut forward = positions.clone();
        forward.sort_by(draw_order);

        positions.rotate_left(137);
        positions.reverse();
        positions.sort_by(draw_order);
        assert_eq!(forward, positions);
    }

    #[test]
    fn test_occluders_draw_later() {
        // A block one step nearer on any axis must be painted after.
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..2000 {
            let a = random_pos(&mut rng);
            let nearer = [
                (a.x.checked_sub(1), Some(a.y), Some(a.z)),
                (Some(a.x), a.y.checked_add(1), Some(a.z)),
                (Some(a.x), Some(a.y), a.z.checked_add(1)),
            ];
            for (x, y, z) in nearer {
                let (Some(x), Some(y), Some(z)) = (x, y, z) else {
                    continue;
                };
                if (y as usize) < CHUNK_HEIGHT && (z as usize) < CHUNK_DEPTH {
                    let b = LocalPos::new(x, y, z);
                    assert_eq!(draw_order(&a, &b), Ordering::Less, "{a:?} vs {b:?}");
                }
            }
        }
    }

    #[test]
    fn test_draw_sequence_sorted_and_complete() {
        let sequence: Vec<_> = draw_sequence().collect();
        assert_eq!(sequence.len(), CHUNK_WIDTH * CHUNK_DEPTH * CHUNK_HEIGHT);
        assert!(sequence
            .windows(2)
            .all(|pair| draw_order(&pair[0], &pair[1]) == Ordering::Less));
    }

    #[test]
    fn test_chunk_bounds_cover_every_sprite() {
        let coord = ChunkCoord::new(-3, 5);
        let bounds = chunk_bounds(coord);
        let origin = chunk_origin(coord);
        for pos in draw_sequence().step_by(7) {
            let corner = origin + project_local(pos);
            let far = corner + IVec2::splat(SPRITE_SIZE as i32 - 1);
            let dropped = far + IVec2::new(0, LIQUID_SURFACE_DROP);
            assert!(bounds.contains(corner) && bounds.contains(far) && bounds.contains(dropped));
        }
    }

    #[test]
    fn test_chunks_for_rect_matches_brute_force() {
        let rects = [
            PixelRect::new(IVec2::new(0, 0), IVec2::new(384, 384)),
            PixelRect::new(IVec2::new(-768, 1152), IVec2::new(-384, 1536)),
            PixelRect::new(IVec2::new(191, -97), IVec2::new(193, -95)),
        ];
        for rect in rects {
            let mut expected: Vec<_> = (-40..40)
                .flat_map(|x| (-40..40).map(move |z| ChunkCoord::new(x, z)))
                .filter(|c| chunk_bounds(*c).intersects(&rect))
                .collect();
            expected.sort_by(chunk_draw_order);
            assert_eq!(chunks_for_rect(&rect, 0), expected, "{rect:?}");
        }
    }

    #[test]
    fn test_margin_widens_selection() {
        let rect = PixelRect::new(IVec2::new(0, 0), IVec2::new(384, 384));
        let exact = chunks_for_rect(&rect, 0);
        let wide = chunks_for_rect(&rect, 1);
        assert!(wide.len() > exact.len());
        assert!(exact.iter().all(|c| wide.contains(c)));
    }

    #[test]
    fn test_cube_silhouette() {
        assert_eq!(cube_face_at(12, 1), Some(CubeFace::Top));
        assert_eq!(cube_face_at(2, 14), Some(CubeFace::Left));
        assert_eq!(cube_face_at(21, 14), Some(CubeFace::Right));
        assert_eq!(cube_face_at(0, 0), None);
        assert_eq!(cube_face_at(23, 23), None);
    }
}
