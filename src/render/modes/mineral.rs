use crate::config::modes::{BlockRef, MineralSetting};
use crate::render::modes::{BlockContext, ProcessBlock};
use crate::render::sample::{ColorTransform, ModeOutcome, VisualSample};
use crate::utils::error::ConfigurationError;
use crate::world::block::BlockId;
use crate::world::blocks_data::{self, default_minerals};
use glam::Vec3;
use std::collections::HashMap;

/// Share of the highlight colour in a tinted mineral.
pub const MINERAL_TINT: f32 = 0.6;

/// Tints the configured ore types; everything else passes through.
#[derive(Debug, Clone)]
pub struct MineralMode {
    tints: HashMap<BlockId, ColorTransform>,
}

impl MineralMode {
    /// `None` selects the built-in ore list.
    pub fn new(minerals: Option<&[MineralSetting]>) -> Result<Self, ConfigurationError> {
        let entries = match minerals {
            None => default_minerals(),
            Some([]) => return Err(ConfigurationError::NoMinerals),
            Some(settings) => settings
                .iter()
                .map(|setting| Ok((resolve(&setting.block)?, setting.color)))
                .collect::<Result<Vec<_>, ConfigurationError>>()?,
        };

        let tints = entries
            .into_iter()
            .map(|(id, [r, g, b])| {
                let color = Vec3::new(r as f32, g as f32, b as f32) / 255.0;
                (id, ColorTransform::tint(color, MINERAL_TINT))
            })
            .collect();
        Ok(Self { tints })
    }

    pub fn highlights(&self, id: BlockId) -> bool {
        self.tints.contains_key(&id)
    }
}

fn resolve(block: &BlockRef) -> Result<BlockId, ConfigurationError> {
    match block {
        BlockRef::Id(id) => Ok(BlockId(*id)),
        BlockRef::Name(name) => blocks_data::by_name(name)
            .map(|info| info.id)
            .ok_or_else(|| ConfigurationError::UnknownBlock(name.clone())),
    }
}

impl ProcessBlock for MineralMode {
    fn process<'a>(&'a self, ctx: &BlockContext<'_>, sample: VisualSample<'a>) -> ModeOutcome<'a> {
        match self.tints.get(&ctx.block.id) {
            Some(tint) => ModeOutcome::Draw(sample.with_transform(*tint)),
            None => ModeOutcome::Draw(sample),
        }
    }
}
