pub mod compositor;
pub mod modes;
pub mod pipeline;
pub mod projection;
pub mod sample;
pub mod texture;

pub use compositor::Canvas;
pub use modes::{BlockContext, ModeKind, Neighborhood, ProcessBlock, RenderMode};
pub use pipeline::{base_sample, MissingTextureLog, RenderChain};
pub use projection::{chunks_for_rect, draw_order, project, PixelRect, SPRITE_SIZE};
pub use sample::{ColorTransform, ModeOutcome, VisualSample};
pub use texture::{Sprite, TextureAtlas, TextureSource};
