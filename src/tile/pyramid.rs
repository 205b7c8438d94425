//! Coarser zoom levels built from finished tiles.

use crate::tile::assembler::TileCoord;
use image::imageops::{self, FilterType};
use image::RgbaImage;

/// Tile one zoom level up that contains `tile`.
pub fn parent_of(tile: TileCoord) -> TileCoord {
    TileCoord::new(tile.col.div_euclid(2), tile.row.div_euclid(2))
}

/// The four tiles one zoom level down, in `[top-left, top-right,
/// bottom-left, bottom-right]` order.
pub fn children_of(tile: TileCoord) -> [TileCoord; 4] {
    let (col, row) = (tile.col * 2, tile.row * 2);
    [
        TileCoord::new(col, row),
        TileCoord::new(col + 1, row),
        TileCoord::new(col, row + 1),
        TileCoord::new(col + 1, row + 1),
    ]
}

/// Merges up to four child tiles, ordered as [`children_of`], into one
/// parent of the same size. Absent children leave their quarter transparent.
pub fn downsample(children: [Option<&RgbaImage>; 4], width: u32, height: u32) -> RgbaImage {
    let mut mosaic = RgbaImage::new(width * 2, height * 2);
    for (index, child) in children.iter().enumerate() {
        let Some(child) = child else { continue };
        let x = (index as u32 % 2) * width;
        let y = (index as u32 / 2) * height;
        imageops::replace(&mut mosaic, *child, x as i64, y as i64);
    }
    imageops::resize(&mosaic, width, height, FilterType::Triangle)
}
