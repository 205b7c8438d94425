use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Raised by the chunk reader when a buffer cannot be trusted.
///
/// Callers treat the chunk as absent and render nothing for its columns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorruptChunkError {
    #[error("Chunk buffer too short: {len} bytes, header needs {needed}")]
    TooShort { len: usize, needed: usize },

    #[error("Bad chunk magic: {0:02x?}")]
    BadMagic([u8; 4]),

    #[error("Unrecognised byte-order mark: {0:#06x}")]
    BadByteOrderMark(u16),

    #[error("Unsupported chunk format version: {0}")]
    UnsupportedVersion(u16),

    #[error("Chunk dimensions {found:?} do not match engine dimensions {expected:?}")]
    DimensionMismatch {
        found: (u16, u16, u16),
        expected: (u16, u16, u16),
    },

    #[error("Unknown chunk flag bits: {0:#06x}")]
    UnknownFlags(u16),

    #[error("Chunk buffer length {actual} does not match expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Chunk requested at {requested:?} reports position {found:?}")]
    PositionMismatch {
        requested: (i32, i32),
        found: (i32, i32),
    },
}

/// Fatal to a run; detected before any tile work begins.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Unknown render mode: {0}")]
    UnknownMode(String),

    #[error("Render mode listed twice: {0}")]
    DuplicateMode(String),

    #[error("Render modes {0} and {1} cannot be combined")]
    ConflictingModes(String, String),

    #[error("Render mode chain is empty")]
    EmptyChain,

    #[error("Spawn mode requires a spawn point")]
    MissingSpawnPoint,

    #[error("Mineral mode requires at least one mineral")]
    NoMinerals,

    #[error("Invalid tile size {width}x{height}")]
    InvalidTileSize { width: u32, height: u32 },

    #[error("Chunk cache capacity must be at least 1")]
    InvalidCacheCapacity,

    #[error("Render mode {0} must come first in the chain")]
    MustBeFirst(String),

    #[error("Unknown block in configuration: {0}")]
    UnknownBlock(String),

    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Texture lookup miss. Recoverable through the fallback sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Texture not found for block {block}:{variant}")]
pub struct MissingTextureError {
    pub block: u16,
    pub variant: u8,
}
