use crate::config::modes::ModeSettings;
use crate::utils::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::path::Path;

const MAX_TILE_SIZE: u32 = 8192;

/// Run-wide render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub tile_width: u32,
    pub tile_height: u32,
    /// Extra ring of chunks loaded around each tile's exact footprint.
    pub overlap_margin: u32,
    /// Mode chain, applied in order.
    pub modes: Vec<String>,
    /// Worker threads; 0 lets the pool pick.
    pub workers: usize,
    /// Share decoded chunks between tiles.
    pub cache_chunks: bool,
    /// Most chunks kept decoded at once when caching.
    pub cache_capacity: usize,
    #[serde(flatten)]
    pub settings: ModeSettings,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tile_width: 384,
            tile_height: 384,
            overlap_margin: 1,
            modes: vec!["normal".to_string(), "lighting".to_string()],
            workers: 0,
            cache_chunks: true,
            cache_capacity: 1024,
            settings: ModeSettings::default(),
        }
    }
}

impl RenderConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigurationError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        log::info!("Loaded render config from {:?} ({} modes)", path, config.modes.len());
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let valid = |size: u32| size > 0 && size <= MAX_TILE_SIZE;
        if !valid(self.tile_width) || !valid(self.tile_height) {
            return Err(ConfigurationError::InvalidTileSize {
                width: self.tile_width,
                height: self.tile_height,
            });
        }
        if self.cache_chunks && self.cache_capacity == 0 {
            return Err(ConfigurationError::InvalidCacheCapacity);
        }
        Ok(())
    }
}
