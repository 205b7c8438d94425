pub mod assembler;
pub mod pyramid;
pub mod scheduler;

pub use assembler::{RenderContext, RenderedTile, TileAssembler, TileCoord, TileStats};
pub use pyramid::{children_of, downsample, parent_of};
pub use scheduler::{CancelHandle, RunSummary, TileScheduler};
