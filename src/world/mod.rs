pub mod block;
pub mod blocks_data;
pub mod chunk;
pub mod chunk_coord;
pub mod reader;
pub mod storage;

// Re-export commonly used types
pub use block::{Block, BlockId, LocalPos};
pub use blocks_data::BLOCKS;
pub use chunk::{Chunk, ChunkFlags, CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_VOLUME, CHUNK_WIDTH};
pub use chunk_coord::ChunkCoord;
pub use reader::{decode_chunk, encode_chunk, ByteOrder};
pub use storage::{ChunkLoader, ChunkSource, DirectoryChunkSource, LoadCounts, MemoryChunkSource};
