use anyhow::{anyhow, bail, Context, Result};
use crossbeam_channel::bounded;
use isotile::config::RenderConfig;
use isotile::render::TextureAtlas;
use isotile::tile::{RenderContext, RenderedTile, TileCoord, TileScheduler};
use isotile::utils::logging;
use isotile::world::{ChunkLoader, ChunkSource, DirectoryChunkSource};
use log::{info, warn, LevelFilter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, ScopedJoinHandle};

fn main() -> Result<()> {
    logging::init(LevelFilter::Info)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [config_path, chunk_dir, out_dir] = args.as_slice() else {
        bail!("usage: isotile <config.toml> <chunk-dir> <out-dir>");
    };

    let config = RenderConfig::load(Path::new(config_path))?;
    let source = DirectoryChunkSource::new(chunk_dir);
    let coords = source
        .coords()
        .with_context(|| format!("Failed to list chunks in {}", chunk_dir))?;
    if coords.is_empty() {
        bail!("No chunk files found in {}", chunk_dir);
    }
    info!("Found {} chunks", coords.len());

    let source: Arc<dyn ChunkSource> = Arc::new(source);
    let loader = if config.cache_chunks {
        ChunkLoader::cached(source, config.cache_capacity)
    } else {
        ChunkLoader::new(source)
    };
    let context = RenderContext::new(&config, Arc::new(TextureAtlas::synthesized()))?;
    let tiles = TileCoord::covering(&coords, config.tile_width, config.tile_height);
    let scheduler = TileScheduler::new(Arc::new(context), Arc::new(loader), config.workers);

    let out_dir = PathBuf::from(out_dir);
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create output directory {:?}", out_dir))?;

    let (sender, receiver) = bounded::<RenderedTile>(64);
    let summary = thread::scope(|scope| {
        let writer = scope.spawn(|| {
            let mut written = 0usize;
            for tile in receiver {
                if tile.blank {
                    continue;
                }
                let path = out_dir.join(format!("{}.png", tile.coord));
                match tile.image.save(&path) {
                    Ok(()) => written += 1,
                    Err(e) => warn!("Failed to write {:?}: {}", path, e),
                }
            }
            written
        });

        let summary = scheduler.run(&tiles, &sender);
        drop(sender);
        let written = join_writer(writer)?;
        info!("Wrote {} tiles to {:?}", written, out_dir);
        summary
    })?;

    info!(
        "Done: {} tiles rendered, {} blocks drawn",
        summary.tiles_rendered, summary.blocks_drawn
    );
    Ok(())
}

fn join_writer(writer: ScopedJoinHandle<'_, usize>) -> Result<usize> {
    writer
        .join()
        .map_err(|_| anyhow!("Tile writer thread panicked"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_writer_reports_count() {
        let written = thread::scope(|scope| join_writer(scope.spawn(|| 7))).unwrap();
        assert_eq!(written, 7);
    }

    #[test]
    fn test_join_writer_propagates_panic() {
        let result = thread::scope(|scope| {
            join_writer(scope.spawn(|| -> usize { panic!("disk full") }))
        });
        assert!(result.is_err());
    }
}
