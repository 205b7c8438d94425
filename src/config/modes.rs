use serde::{Deserialize, Serialize};

/// Settings consumed by individual render modes when the chain is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeSettings {
    pub lighting: LightingSettings,
    pub overlay: OverlaySettings,
    pub spawn: SpawnSettings,
    /// `None` highlights the built-in ore list.
    pub minerals: Option<Vec<MineralSetting>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingSettings {
    /// Dim sky light as at night.
    pub night: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlayKey {
    /// Outer ring of every chunk.
    ChunkBorder,
    /// Outer ring of every region.
    RegionBorder,
    /// Whole chunks stored without light data.
    MissingLight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    pub key: OverlayKey,
    pub color: [u8; 4],
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            key: OverlayKey::RegionBorder,
            color: [255, 255, 0, 96],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnSettings {
    /// World block position `[x, y, z]`, `y` being height.
    pub position: Option<[i32; 3]>,
    pub color: [u8; 4],
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            position: None,
            color: [255, 0, 0, 255],
        }
    }
}

/// A block given by table name or numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockRef {
    Id(u16),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MineralSetting {
    pub block: BlockRef,
    pub color: [u8; 3],
}
