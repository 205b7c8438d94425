use crate::utils::error::CorruptChunkError;
use crate::world::chunk::Chunk;
use crate::world::chunk_coord::ChunkCoord;
use crate::world::reader::decode_chunk;
use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Supplies raw chunk buffers. Implemented by the world-file reader that
/// slices region files; the renderer never opens files itself.
pub trait ChunkSource: Send + Sync {
    fn raw_chunk(&self, coord: ChunkCoord) -> Option<Vec<u8>>;
}

/// Chunk buffers held in memory, keyed by coordinate.
#[derive(Default)]
pub struct MemoryChunkSource {
    chunks: RwLock<HashMap<ChunkCoord, Arc<[u8]>>>,
}

impl MemoryChunkSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, coord: ChunkCoord, data: Vec<u8>) {
        self.chunks.write().insert(coord, data.into());
    }

    pub fn len(&self) -> usize {
        self.chunks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.read().is_empty()
    }

    pub fn coords(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<_> = self.chunks.read().keys().copied().collect();
        coords.sort();
        coords
    }
}

impl ChunkSource for MemoryChunkSource {
    fn raw_chunk(&self, coord: ChunkCoord) -> Option<Vec<u8>> {
        self.chunks.read().get(&coord).map(|data| data.to_vec())
    }
}

/// One pre-sliced chunk buffer per file, named `c.<x>.<z>.chunk`.
pub struct DirectoryChunkSource {
    root: PathBuf,
}

impl DirectoryChunkSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn file_name(coord: ChunkCoord) -> String {
        format!("c.{}.{}.chunk", coord.x(), coord.z())
    }

    fn parse_file_name(name: &str) -> Option<ChunkCoord> {
        let mut parts = name.strip_prefix("c.")?.strip_suffix(".chunk")?.split('.');
        let x = parts.next()?.parse().ok()?;
        let z = parts.next()?.parse().ok()?;
        parts.next().is_none().then(|| ChunkCoord::new(x, z))
    }

    /// Every chunk present in the directory, sorted.
    pub fn coords(&self) -> io::Result<Vec<ChunkCoord>> {
        let mut coords = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if let Some(coord) = entry.file_name().to_str().and_then(Self::parse_file_name) {
                coords.push(coord);
            }
        }
        coords.sort();
        Ok(coords)
    }
}

impl ChunkSource for DirectoryChunkSource {
    fn raw_chunk(&self, coord: ChunkCoord) -> Option<Vec<u8>> {
        let path = self.root.join(Self::file_name(coord));
        match fs::read(&path) {
            Ok(data) => Some(data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                log::warn!("Failed to read chunk file {:?}: {}", path, e);
                None
            }
        }
    }
}

/// Snapshot of loader activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadCounts {
    pub decoded: usize,
    pub missing: usize,
    pub corrupt: usize,
}

type CacheSlot = Arc<OnceCell<Option<Arc<Chunk>>>>;

struct CacheEntry {
    slot: CacheSlot,
    last_used: u64,
}

impl CacheEntry {
    // Nobody is decoding into the slot or holding the chunk.
    fn is_idle(&self) -> bool {
        Arc::strong_count(&self.slot) == 1
            && self
                .slot
                .get()
                .map_or(true, |chunk| chunk.as_ref().map_or(true, |c| Arc::strong_count(c) == 1))
    }
}

/// Least-recently-used chunk slots, evicting only idle ones.
struct ChunkCache {
    entries: HashMap<ChunkCoord, CacheEntry>,
    capacity: usize,
    clock: u64,
}

impl ChunkCache {
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            clock: 0,
        }
    }

    fn slot(&mut self, coord: ChunkCoord) -> CacheSlot {
        self.clock += 1;
        let now = self.clock;
        if let Some(entry) = self.entries.get_mut(&coord) {
            entry.last_used = now;
            return entry.slot.clone();
        }

        while self.entries.len() >= self.capacity && self.evict_one() {}
        let slot = CacheSlot::default();
        self.entries.insert(
            coord,
            CacheEntry {
                slot: slot.clone(),
                last_used: now,
            },
        );
        slot
    }

    fn evict_one(&mut self) -> bool {
        let victim = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_idle())
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(coord, _)| *coord);
        match victim {
            Some(coord) => {
                self.entries.remove(&coord);
                log::trace!("Evicted chunk {:?} from cache", coord);
                true
            }
            None => false,
        }
    }
}

/// Fetches and decodes chunks, turning corrupt buffers into absent chunks.
///
/// With caching enabled a chunk is decoded at most once while it stays
/// resident, however many tiles ask for it concurrently. The cache holds up
/// to `capacity` chunks; chunks still held by a tile are never evicted, so it
/// may run over while they are all in use.
pub struct ChunkLoader {
    source: Arc<dyn ChunkSource>,
    cache: Option<Mutex<ChunkCache>>,
    decoded: AtomicUsize,
    missing: AtomicUsize,
    corrupt: AtomicUsize,
}

impl ChunkLoader {
    pub fn new(source: Arc<dyn ChunkSource>) -> Self {
        Self {
            source,
            cache: None,
            decoded: AtomicUsize::new(0),
            missing: AtomicUsize::new(0),
            corrupt: AtomicUsize::new(0),
        }
    }

    pub fn cached(source: Arc<dyn ChunkSource>, capacity: usize) -> Self {
        Self {
            cache: Some(Mutex::new(ChunkCache::new(capacity))),
            ..Self::new(source)
        }
    }

    /// Chunks currently held by the cache.
    pub fn resident(&self) -> usize {
        self.cache
            .as_ref()
            .map_or(0, |cache| cache.lock().entries.len())
    }

    /// The decoded chunk, or `None` when it is missing or corrupt.
    pub fn load(&self, coord: ChunkCoord) -> Option<Arc<Chunk>> {
        match &self.cache {
            Some(cache) => {
                // The map lock is held only to find the slot; decoding runs outside it.
                let slot = cache.lock().slot(coord);
                slot.get_or_init(|| self.fetch(coord)).clone()
            }
            None => self.fetch(coord),
        }
    }

    pub fn counts(&self) -> LoadCounts {
        LoadCounts {
            decoded: self.decoded.load(Ordering::Relaxed),
            missing: self.missing.load(Ordering::Relaxed),
            corrupt: self.corrupt.load(Ordering::Relaxed),
        }
    }

    fn fetch(&self, coord: ChunkCoord) -> Option<Arc<Chunk>> {
        let Some(data) = self.source.raw_chunk(coord) else {
            self.missing.fetch_add(1, Ordering::Relaxed);
            return None;
        };

        match decode_checked(&data, coord) {
            Ok(chunk) => {
                self.decoded.fetch_add(1, Ordering::Relaxed);
                log::debug!("Decoded chunk {:?} ({} blocks)", coord, chunk.block_count());
                Some(Arc::new(chunk))
            }
            Err(e) => {
                self.corrupt.fetch_add(1, Ordering::Relaxed);
                log::warn!("Skipping corrupt chunk {:?}: {}", coord, e);
                None
            }
        }
    }
}

fn decode_checked(data: &[u8], coord: ChunkCoord) -> Result<Chunk, CorruptChunkError> {
    let chunk = decode_chunk(data)?;
    if chunk.position != coord {
        return Err(CorruptChunkError::PositionMismatch {
            requested: (coord.x(), coord.z()),
            found: (chunk.position.x(), chunk.position.z()),
        });
    }
    Ok(chunk)
}
