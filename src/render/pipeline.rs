use crate::config::modes::ModeSettings;
use crate::config::rendering::RenderConfig;
use crate::render::modes::{
    BlockContext, CaveMode, LightingMode, MineralMode, ModeKind, NormalMode, OverlayMode,
    ProcessBlock, RenderMode, SmoothLightingMode, SpawnMode,
};
use crate::render::projection::LIQUID_SURFACE_DROP;
use crate::render::sample::{ModeOutcome, VisualSample};
use crate::render::texture::TextureSource;
use crate::utils::error::ConfigurationError;
use crate::world::block::{Block, BlockId};
use crate::world::chunk::Chunk;
use glam::IVec2;
use parking_lot::Mutex;
use std::collections::HashSet;

/// Validated, ordered list of render modes.
///
/// Built once per run and shared read-only between tile workers.
#[derive(Debug, Clone)]
pub struct RenderChain {
    modes: Vec<RenderMode>,
}

impl RenderChain {
    pub fn new<S: AsRef<str>>(
        names: &[S],
        settings: &ModeSettings,
    ) -> Result<Self, ConfigurationError> {
        if names.is_empty() {
            return Err(ConfigurationError::EmptyChain);
        }

        let mut kinds: Vec<ModeKind> = Vec::with_capacity(names.len());
        for name in names {
            let kind: ModeKind = name.as_ref().parse()?;
            if kinds.contains(&kind) {
                return Err(ConfigurationError::DuplicateMode(kind.name().to_string()));
            }
            kinds.push(kind);
        }

        if kinds.contains(&ModeKind::Lighting) && kinds.contains(&ModeKind::SmoothLighting) {
            return Err(ConfigurationError::ConflictingModes(
                ModeKind::Lighting.name().to_string(),
                ModeKind::SmoothLighting.name().to_string(),
            ));
        }
        if kinds.iter().skip(1).any(|kind| *kind == ModeKind::Normal) {
            return Err(ConfigurationError::MustBeFirst(ModeKind::Normal.name().to_string()));
        }

        let modes = kinds
            .into_iter()
            .map(|kind| build_mode(kind, settings))
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!(
            "Render chain: {}",
            modes
                .iter()
                .map(|mode| mode.kind().name())
                .collect::<Vec<_>>()
                .join(" -> ")
        );
        Ok(Self { modes })
    }

    pub fn from_config(config: &RenderConfig) -> Result<Self, ConfigurationError> {
        Self::new(&config.modes, &config.settings)
    }

    pub fn kinds(&self) -> Vec<ModeKind> {
        self.modes.iter().map(RenderMode::kind).collect()
    }

    pub fn contains(&self, kind: ModeKind) -> bool {
        self.modes.iter().any(|mode| mode.kind() == kind)
    }

    /// Air blocks must go through the chain too, since a mode may paint them.
    pub fn paints_air(&self) -> bool {
        self.contains(ModeKind::Spawn)
    }

    /// Some mode looks at blocks in the chunks around the one being drawn.
    pub fn reads_neighbors(&self) -> bool {
        self.contains(ModeKind::SmoothLighting)
    }

    /// Runs every mode in order. A skip ends the chain.
    pub fn process<'a>(
        &'a self,
        ctx: &BlockContext<'_>,
        mut sample: VisualSample<'a>,
    ) -> ModeOutcome<'a> {
        for mode in &self.modes {
            match mode.process(ctx, sample) {
                ModeOutcome::Draw(next) => sample = next,
                ModeOutcome::Skip => return ModeOutcome::Skip,
            }
        }
        ModeOutcome::Draw(sample)
    }
}

fn build_mode(kind: ModeKind, settings: &ModeSettings) -> Result<RenderMode, ConfigurationError> {
    Ok(match kind {
        ModeKind::Normal => RenderMode::Normal(NormalMode),
        ModeKind::Lighting => RenderMode::Lighting(LightingMode::new(&settings.lighting)),
        ModeKind::SmoothLighting => {
            RenderMode::SmoothLighting(SmoothLightingMode::new(&settings.lighting))
        }
        ModeKind::Cave => RenderMode::Cave(CaveMode),
        ModeKind::Overlay => RenderMode::Overlay(OverlayMode::new(&settings.overlay)),
        ModeKind::Spawn => RenderMode::Spawn(SpawnMode::new(&settings.spawn)?),
        ModeKind::Mineral => {
            RenderMode::Mineral(MineralMode::new(settings.minerals.as_deref())?)
        }
    })
}

/// Block types already reported as lacking a texture.
#[derive(Debug, Default)]
pub struct MissingTextureLog {
    reported: Mutex<HashSet<BlockId>>,
}

impl MissingTextureLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// True the first time `id` is recorded.
    pub fn record(&self, id: BlockId) -> bool {
        self.reported.lock().insert(id)
    }

    pub fn len(&self) -> usize {
        self.reported.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reported.lock().is_empty()
    }
}

/// The plain texture sample a chain starts from.
///
/// Missing textures fall back to the source's substitute sprite and are
/// logged once per block type.
pub fn base_sample<'a>(
    textures: &'a dyn TextureSource,
    chunk: &Chunk,
    block: &Block,
    missing: &MissingTextureLog,
) -> VisualSample<'a> {
    let sprite = match textures.lookup(block.id, block.variant) {
        Ok(sprite) => sprite,
        Err(err) => {
            if missing.record(block.id) {
                log::warn!("{}, using fallback", err);
            }
            textures.fallback()
        }
    };

    let sample = VisualSample::new(sprite);
    if is_liquid_surface(chunk, block) {
        sample.with_offset(IVec2::new(0, LIQUID_SURFACE_DROP))
    } else {
        sample
    }
}

fn is_liquid_surface(chunk: &Chunk, block: &Block) -> bool {
    let Some(liquid) = block.id.info().and_then(|info| info.liquid) else {
        return false;
    };
    match chunk.neighbor(block.pos, 0, 1, 0) {
        Some(above) => above.id.info().and_then(|info| info.liquid) != Some(liquid),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::modes::{BlockRef, MineralSetting};
    use crate::render::texture::{Sprite, TextureAtlas, FALLBACK_COLOR};
    use crate::world::blocks_data::{DIAMOND_ORE, LAVA, STONE, WATER, WATER_FLOWING};
    use crate::world::chunk_coord::ChunkCoord;

    fn chain(names: &[&str]) -> Result<RenderChain, ConfigurationError> {
        let mut settings = ModeSettings::default();
        settings.spawn.position = Some([0, 0, 0]);
        RenderChain::new(names, &settings)
    }

    #[test]
    fn test_builds_in_configured_order() {
        let built = chain(&["normal", "cave", "smooth-lighting", "mineral"]).unwrap();
        assert_eq!(
            built.kinds(),
            vec![
                ModeKind::Normal,
                ModeKind::Cave,
                ModeKind::SmoothLighting,
                ModeKind::Mineral
            ]
        );
        assert!(!built.paints_air());
        assert!(chain(&["spawn"]).unwrap().paints_air());
    }

    #[test]
    fn test_rejects_bad_chains() {
        assert!(matches!(chain(&[]), Err(ConfigurationError::EmptyChain)));
        assert!(matches!(
            chain(&["normal", "glow"]),
            Err(ConfigurationError::UnknownMode(_))
        ));
        assert!(matches!(
            chain(&["cave", "cave"]),
            Err(ConfigurationError::DuplicateMode(_))
        ));
        assert!(matches!(
            chain(&["lighting", "smooth-lighting"]),
            Err(ConfigurationError::ConflictingModes(_, _))
        ));
        assert!(matches!(
            chain(&["cave", "normal"]),
            Err(ConfigurationError::MustBeFirst(_))
        ));
        assert!(matches!(
            RenderChain::new(&["spawn"], &ModeSettings::default()),
            Err(ConfigurationError::MissingSpawnPoint)
        ));

        let mut settings = ModeSettings::default();
        settings.minerals = Some(vec![MineralSetting {
            block: BlockRef::Name("mithril".into()),
            color: [0, 0, 0],
        }]);
        assert!(matches!(
            RenderChain::new(&["mineral"], &settings),
            Err(ConfigurationError::UnknownBlock(_))
        ));
    }

    #[test]
    fn test_from_config_defaults() {
        let chain = RenderChain::from_config(&RenderConfig::default()).unwrap();
        assert_eq!(chain.kinds(), vec![ModeKind::Normal, ModeKind::Lighting]);
    }

    #[test]
    fn test_skip_short_circuits() {
        // Cave skips the exposed block before mineral could tint it
        let built = chain(&["cave", "mineral"]).unwrap();
        let mut chunk = Chunk::empty(ChunkCoord::new(0, 0));
        chunk.set_block(0, 0, 0, DIAMOND_ORE, 0);
        let sprite = Sprite::flat_cube([10, 10, 10, 255]);
        let ctx = BlockContext::new(&chunk, chunk.block(0, 0, 0));
        assert!(matches!(
            built.process(&ctx, VisualSample::new(&sprite)),
            ModeOutcome::Skip
        ));
    }

    #[test]
    fn test_base_sample_fallback_logged_once() {
        let atlas = TextureAtlas::new();
        let missing = MissingTextureLog::new();
        let mut chunk = Chunk::empty(ChunkCoord::new(0, 0));
        chunk.set_block(0, 0, 0, STONE, 0);
        chunk.set_block(1, 0, 0, STONE, 3);
        for x in 0..2 {
            let sample = base_sample(&atlas, &chunk, &chunk.block(x, 0, 0), &missing);
            assert_eq!(sample.sprite.pixel(12, 2), FALLBACK_COLOR);
        }
        assert_eq!(missing.len(), 1);
        assert!(!missing.record(STONE));
    }

    #[test]
    fn test_liquid_surface_is_lowered() {
        let atlas = TextureAtlas::synthesized();
        let missing = MissingTextureLog::new();
        let mut chunk = Chunk::empty(ChunkCoord::new(0, 0));
        chunk.set_block(3, 10, 3, WATER, 0);
        chunk.set_block(3, 11, 3, WATER_FLOWING, 0);
        chunk.set_block(5, 10, 5, LAVA, 0);
        chunk.set_block(5, 11, 5, WATER, 0);

        let offset = |x, y, z| base_sample(&atlas, &chunk, &chunk.block(x, y, z), &missing).offset;
        assert_eq!(offset(3, 10, 3), IVec2::ZERO);
        assert_eq!(offset(3, 11, 3), IVec2::new(0, LIQUID_SURFACE_DROP));
        assert_eq!(offset(5, 10, 5), IVec2::new(0, LIQUID_SURFACE_DROP));
        assert!(missing.is_empty());
    }
}
