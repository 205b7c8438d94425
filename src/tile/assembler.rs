use crate::config::rendering::RenderConfig;
use crate::render::compositor::Canvas;
use crate::render::modes::{BlockContext, Neighborhood};
use crate::render::pipeline::{base_sample, MissingTextureLog, RenderChain};
use crate::render::projection::{
    chunk_bounds, chunk_origin, chunks_for_rect, draw_sequence, project_local, PixelRect,
    LIQUID_SURFACE_DROP, SPRITE_SIZE,
};
use crate::render::sample::ModeOutcome;
use crate::render::texture::TextureSource;
use crate::utils::error::ConfigurationError;
use crate::world::chunk::Chunk;
use crate::world::chunk_coord::ChunkCoord;
use crate::world::storage::ChunkLoader;
use glam::IVec2;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

/// Grid position of one output tile. Tile `(0, 0)` starts at pixel `(0, 0)`
/// of the projected world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub col: i32,
    pub row: i32,
}

impl TileCoord {
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    pub fn rect(&self, width: u32, height: u32) -> PixelRect {
        let min = IVec2::new(self.col * width as i32, self.row * height as i32);
        PixelRect::new(min, min + IVec2::new(width as i32, height as i32))
    }

    /// Every tile touched by any of the given chunks, sorted.
    pub fn covering(chunks: &[ChunkCoord], width: u32, height: u32) -> Vec<TileCoord> {
        let (w, h) = (width as i32, height as i32);
        let mut tiles = BTreeSet::new();
        for coord in chunks {
            let bounds = chunk_bounds(*coord);
            let cols = bounds.min.x.div_euclid(w)..=(bounds.max.x - 1).div_euclid(w);
            let rows = bounds.min.y.div_euclid(h)..=(bounds.max.y - 1).div_euclid(h);
            for col in cols {
                for row in rows.clone() {
                    tiles.insert(TileCoord::new(col, row));
                }
            }
        }
        tiles.into_iter().collect()
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.col, self.row)
    }
}

/// Immutable run-wide state shared by every tile worker.
pub struct RenderContext {
    pub chain: RenderChain,
    pub textures: Arc<dyn TextureSource>,
    pub tile_width: u32,
    pub tile_height: u32,
    pub margin: u32,
    pub missing_textures: MissingTextureLog,
}

impl RenderContext {
    /// Validates the configuration and builds the mode chain.
    pub fn new(
        config: &RenderConfig,
        textures: Arc<dyn TextureSource>,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let chain = RenderChain::from_config(config)?;
        Ok(Self {
            chain,
            textures,
            tile_width: config.tile_width,
            tile_height: config.tile_height,
            margin: config.overlap_margin,
            missing_textures: MissingTextureLog::new(),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileStats {
    pub chunks_drawn: usize,
    /// Chunks in the footprint that were missing or corrupt.
    pub chunks_absent: usize,
    pub blocks_drawn: usize,
    pub blocks_skipped: usize,
}

#[derive(Debug, Clone)]
pub struct RenderedTile {
    pub coord: TileCoord,
    pub image: RgbaImage,
    pub stats: TileStats,
    pub blank: bool,
}

type LoadedChunks = HashMap<ChunkCoord, Option<Arc<Chunk>>>;

const FACE_OFFSETS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

fn loaded_chunk(loaded: &LoadedChunks, coord: ChunkCoord) -> Option<&Chunk> {
    loaded.get(&coord).and_then(|chunk| chunk.as_deref())
}

fn neighborhood(loaded: &LoadedChunks, coord: ChunkCoord) -> Neighborhood<'_> {
    Neighborhood {
        pos_x: loaded_chunk(loaded, coord.offset(1, 0)),
        neg_x: loaded_chunk(loaded, coord.offset(-1, 0)),
        pos_z: loaded_chunk(loaded, coord.offset(0, 1)),
        neg_z: loaded_chunk(loaded, coord.offset(0, -1)),
    }
}

/// Renders single tiles. Cheap to create; one per worker is fine.
pub struct TileAssembler<'r> {
    context: &'r RenderContext,
    loader: &'r ChunkLoader,
}

impl<'r> TileAssembler<'r> {
    pub fn new(context: &'r RenderContext, loader: &'r ChunkLoader) -> Self {
        Self { context, loader }
    }

    pub fn render(&self, tile: TileCoord) -> RenderedTile {
        let ctx = self.context;
        let rect = tile.rect(ctx.tile_width, ctx.tile_height);
        let mut canvas = Canvas::new(ctx.tile_width, ctx.tile_height);
        let mut stats = TileStats::default();

        let footprint = chunks_for_rect(&rect, ctx.margin);
        let mut loaded: LoadedChunks = footprint
            .iter()
            .map(|&coord| (coord, self.loader.load(coord)))
            .collect();
        if ctx.chain.reads_neighbors() {
            self.load_neighbors(&footprint, &rect, &mut loaded);
        }

        for &coord in &footprint {
            match loaded_chunk(&loaded, coord) {
                Some(chunk) => {
                    let neighbors = neighborhood(&loaded, coord);
                    self.draw_chunk(chunk, neighbors, &rect, &mut canvas, &mut stats);
                    stats.chunks_drawn += 1;
                }
                None => stats.chunks_absent += 1,
            }
        }

        log::debug!(
            "Tile {}: {} chunks, {} absent, {} blocks drawn",
            tile,
            stats.chunks_drawn,
            stats.chunks_absent,
            stats.blocks_drawn
        );
        RenderedTile {
            coord: tile,
            blank: canvas.is_blank(),
            image: canvas.finalize(),
            stats,
        }
    }

    // Adds the face neighbours of visible chunks that lie outside the footprint.
    fn load_neighbors(&self, footprint: &[ChunkCoord], rect: &PixelRect, loaded: &mut LoadedChunks) {
        let extra: Vec<ChunkCoord> = footprint
            .iter()
            .filter(|&&coord| {
                loaded_chunk(loaded, coord).is_some() && chunk_bounds(coord).intersects(rect)
            })
            .flat_map(|coord| FACE_OFFSETS.map(|(dx, dz)| coord.offset(dx, dz)))
            .filter(|coord| !loaded.contains_key(coord))
            .collect();
        for coord in extra {
            loaded
                .entry(coord)
                .or_insert_with(|| self.loader.load(coord));
        }
    }

    fn draw_chunk(
        &self,
        chunk: &Chunk,
        neighbors: Neighborhood<'_>,
        rect: &PixelRect,
        canvas: &mut Canvas,
        stats: &mut TileStats,
    ) {
        if !chunk_bounds(chunk.position).intersects(rect) {
            return;
        }
        let ctx = self.context;
        let origin = chunk_origin(chunk.position) - rect.min;
        let paints_air = ctx.chain.paints_air();

        for pos in draw_sequence() {
            let block = chunk.block_at(pos);
            if block.is_air() && !paints_air {
                continue;
            }
            let corner = origin + project_local(pos);
            if !sprite_touches(corner, canvas) {
                continue;
            }

            let block_ctx = BlockContext::new(chunk, block).with_neighbors(neighbors);
            let base = base_sample(ctx.textures.as_ref(), chunk, &block, &ctx.missing_textures);
            match ctx.chain.process(&block_ctx, base) {
                ModeOutcome::Draw(sample) => {
                    if canvas.composite(corner, &sample) {
                        stats.blocks_drawn += 1;
                    }
                }
                ModeOutcome::Skip => stats.blocks_skipped += 1,
            }
        }
    }
}

// Samples may shift down by the liquid drop, never up or sideways.
fn sprite_touches(corner: IVec2, canvas: &Canvas) -> bool {
    let size = SPRITE_SIZE as i32;
    corner.x < canvas.width() as i32
        && corner.x + size > 0
        && corner.y < canvas.height() as i32
        && corner.y + size + LIQUID_SURFACE_DROP > 0
}
