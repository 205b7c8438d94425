use crate::render::projection::{cube_face_at, CubeFace, SPRITE_SIZE};
use crate::utils::error::MissingTextureError;
use crate::world::block::BlockId;
use crate::world::blocks_data::BLOCKS;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::collections::HashMap;

/// Colour of the sprite substituted for blocks without a texture.
pub const FALLBACK_COLOR: [u8; 4] = [255, 0, 255, 255];

const LEFT_SHADE: f32 = 0.8;
const RIGHT_SHADE: f32 = 0.65;

/// One block's isometric image, always `SPRITE_SIZE` square.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    image: RgbaImage,
    transparent: bool,
}

impl Sprite {
    /// Wraps an image, resampling it when it is not sprite-sized.
    pub fn from_image(image: RgbaImage) -> Self {
        if image.dimensions() == (SPRITE_SIZE, SPRITE_SIZE) {
            return Self::wrap(image);
        }
        log::debug!(
            "Resampling {}x{} sprite to {}x{}",
            image.width(),
            image.height(),
            SPRITE_SIZE,
            SPRITE_SIZE
        );
        Self::wrap(imageops::resize(
            &image,
            SPRITE_SIZE,
            SPRITE_SIZE,
            FilterType::Nearest,
        ))
    }

    fn wrap(image: RgbaImage) -> Self {
        let transparent = image.pixels().all(|p| p.0[3] == 0);
        Self { image, transparent }
    }

    pub fn empty() -> Self {
        Self::wrap(RgbaImage::new(SPRITE_SIZE, SPRITE_SIZE))
    }

    /// Cube silhouette with the side faces darkened.
    pub fn shaded_cube(color: [u8; 4]) -> Self {
        Self::cube_with(|face| {
            let shade = match face {
                CubeFace::Top => 1.0,
                CubeFace::Left => LEFT_SHADE,
                CubeFace::Right => RIGHT_SHADE,
            };
            let scale = |c: u8| (c as f32 * shade).round() as u8;
            [scale(color[0]), scale(color[1]), scale(color[2]), color[3]]
        })
    }

    /// Cube silhouette in a single flat colour.
    pub fn flat_cube(color: [u8; 4]) -> Self {
        Self::cube_with(|_| color)
    }

    fn cube_with(paint: impl Fn(CubeFace) -> [u8; 4]) -> Self {
        let image = RgbaImage::from_fn(SPRITE_SIZE, SPRITE_SIZE, |x, y| match cube_face_at(x, y) {
            Some(face) => Rgba(paint(face)),
            None => Rgba([0, 0, 0, 0]),
        });
        Self::wrap(image)
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// No pixel has any coverage.
    pub fn is_transparent(&self) -> bool {
        self.transparent
    }
}

/// Sprite lookup by block type and variant.
///
/// Implemented by the asset loader; the renderer only reads from it.
pub trait TextureSource: Send + Sync {
    fn lookup(&self, id: BlockId, variant: u8) -> Result<&Sprite, MissingTextureError>;

    /// Substitute for failed lookups.
    fn fallback(&self) -> &Sprite;
}

/// In-memory sprite table.
pub struct TextureAtlas {
    sprites: HashMap<(BlockId, u8), Sprite>,
    empty: Sprite,
    fallback: Sprite,
}

impl Default for TextureAtlas {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureAtlas {
    pub fn new() -> Self {
        Self {
            sprites: HashMap::new(),
            empty: Sprite::empty(),
            fallback: Sprite::shaded_cube(FALLBACK_COLOR),
        }
    }

    /// Shaded cubes in each known block's base colour.
    pub fn synthesized() -> Self {
        let mut atlas = Self::new();
        for info in BLOCKS.iter().filter(|info| !info.id.is_air()) {
            atlas.insert(info.id, 0, Sprite::shaded_cube(info.color));
        }
        atlas
    }

    pub fn insert(&mut self, id: BlockId, variant: u8, sprite: Sprite) {
        self.sprites.insert((id, variant), sprite);
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

impl TextureSource for TextureAtlas {
    fn lookup(&self, id: BlockId, variant: u8) -> Result<&Sprite, MissingTextureError> {
        if id.is_air() {
            return Ok(&self.empty);
        }
        self.sprites
            .get(&(id, variant))
            .or_else(|| self.sprites.get(&(id, 0)))
            .ok_or(MissingTextureError {
                block: id.0,
                variant,
            })
    }

    fn fallback(&self) -> &Sprite {
        &self.fallback
    }
}
