use crate::tile::assembler::{RenderContext, RenderedTile, TileAssembler, TileCoord};
use crate::world::storage::{ChunkLoader, LoadCounts};
use anyhow::{Context, Result};
use crossbeam_channel::{unbounded, Sender};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Stops a run from scheduling further tiles. Tiles already in flight finish.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub tiles_rendered: usize,
    pub tiles_blank: usize,
    /// Tiles never started because the run was cancelled.
    pub tiles_cancelled: usize,
    pub blocks_drawn: usize,
    pub chunks: LoadCounts,
    pub elapsed: Duration,
}

#[derive(Default)]
struct Counters {
    rendered: AtomicUsize,
    blank: AtomicUsize,
    cancelled: AtomicUsize,
    blocks: AtomicUsize,
}

/// Renders tiles in parallel on a dedicated worker pool.
pub struct TileScheduler {
    context: Arc<RenderContext>,
    loader: Arc<ChunkLoader>,
    workers: usize,
    cancel: CancelHandle,
}

impl TileScheduler {
    /// `workers == 0` sizes the pool to the machine.
    pub fn new(context: Arc<RenderContext>, loader: Arc<ChunkLoader>, workers: usize) -> Self {
        Self {
            context,
            loader,
            workers,
            cancel: CancelHandle::default(),
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Renders `tiles` in no particular order, sending each finished tile to
    /// `sink`. A dropped receiver cancels the run.
    pub fn run(&self, tiles: &[TileCoord], sink: &Sender<RenderedTile>) -> Result<RunSummary> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("tile-worker-{}", i))
            .build()
            .with_context(|| format!("Failed to create tile pool with {} workers", self.workers))?;

        let started = Instant::now();
        let counters = Counters::default();
        let assembler = TileAssembler::new(&self.context, &self.loader);
        log::info!(
            "Rendering {} tiles on {} workers",
            tiles.len(),
            pool.current_num_threads()
        );

        pool.install(|| {
            tiles.par_iter().for_each(|&tile| {
                if self.cancel.is_cancelled() {
                    counters.cancelled.fetch_add(1, Ordering::Relaxed);
                    return;
                }
                let rendered = assembler.render(tile);
                counters.rendered.fetch_add(1, Ordering::Relaxed);
                counters
                    .blocks
                    .fetch_add(rendered.stats.blocks_drawn, Ordering::Relaxed);
                if rendered.blank {
                    counters.blank.fetch_add(1, Ordering::Relaxed);
                }
                if sink.send(rendered).is_err() {
                    log::warn!("Tile receiver dropped, cancelling run");
                    self.cancel.cancel();
                }
            });
        });

        let summary = RunSummary {
            tiles_rendered: counters.rendered.into_inner(),
            tiles_blank: counters.blank.into_inner(),
            tiles_cancelled: counters.cancelled.into_inner(),
            blocks_drawn: counters.blocks.into_inner(),
            chunks: self.loader.counts(),
            elapsed: started.elapsed(),
        };
        log::info!(
            "Rendered {} tiles ({} blank, {} cancelled) in {:.2?}; chunks: {} decoded, {} missing, {} corrupt",
            summary.tiles_rendered,
            summary.tiles_blank,
            summary.tiles_cancelled,
            summary.elapsed,
            summary.chunks.decoded,
            summary.chunks.missing,
            summary.chunks.corrupt
        );
        Ok(summary)
    }

    /// Renders every tile and returns them sorted by coordinate.
    pub fn render_all(&self, tiles: &[TileCoord]) -> Result<(Vec<RenderedTile>, RunSummary)> {
        let (sender, receiver) = unbounded();
        let summary = self.run(tiles, &sender)?;
        drop(sender);
        let mut rendered: Vec<_> = receiver.into_iter().collect();
        rendered.sort_by_key(|tile| tile.coord);
        Ok((rendered, summary))
    }
}
