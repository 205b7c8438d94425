pub mod config;
pub mod render;
pub mod tile;
pub mod utils;
pub mod world;

// Re-export commonly used types
pub use config::{ModeSettings, RenderConfig};
pub use render::{RenderChain, TextureAtlas, TextureSource};
pub use tile::{RenderContext, TileAssembler, TileCoord, TileScheduler};
pub use utils::error::{ConfigurationError, CorruptChunkError, MissingTextureError};
pub use world::{Chunk, ChunkCoord, ChunkLoader, ChunkSource};
