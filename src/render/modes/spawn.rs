use crate::config::modes::SpawnSettings;
use crate::render::modes::{BlockContext, ProcessBlock};
use crate::render::sample::{ModeOutcome, VisualSample};
use crate::render::texture::Sprite;
use crate::utils::error::ConfigurationError;
use glam::IVec3;

/// Paints a solid marker cube at the spawn point, whatever block is there.
#[derive(Debug, Clone)]
pub struct SpawnMode {
    position: IVec3,
    marker: Sprite,
}

impl SpawnMode {
    pub fn new(settings: &SpawnSettings) -> Result<Self, ConfigurationError> {
        let [x, y, z] = settings
            .position
            .ok_or(ConfigurationError::MissingSpawnPoint)?;
        Ok(Self {
            position: IVec3::new(x, y, z),
            marker: Sprite::flat_cube(settings.color),
        })
    }

    pub fn position(&self) -> IVec3 {
        self.position
    }
}

impl ProcessBlock for SpawnMode {
    fn process<'a>(&'a self, ctx: &BlockContext<'_>, sample: VisualSample<'a>) -> ModeOutcome<'a> {
        if ctx.world == self.position {
            ModeOutcome::Draw(sample.replaced(&self.marker))
        } else {
            ModeOutcome::Draw(sample)
        }
    }
}
