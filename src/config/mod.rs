pub mod modes;
pub mod rendering;

pub use modes::{
    BlockRef, LightingSettings, MineralSetting, ModeSettings, OverlayKey, OverlaySettings,
    SpawnSettings,
};
pub use rendering::RenderConfig;
