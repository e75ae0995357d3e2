use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Frontend modules by framework name.
    #[serde(default)]
    pub frontends: BTreeMap<String, FrontendEntry>,

    /// Extension modules added to every frontend.
    #[serde(default)]
    pub extensions: Vec<PathBuf>,

    #[serde(default)]
    pub conversion: ConversionConfig,

    #[serde(default)]
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            frontends: BTreeMap::new(),
            extensions: Vec::new(),
            conversion: ConversionConfig::default(),
            log_level: Some("info".to_string()),
        }
    }
}

impl AppConfig {
    /// Enabled frontends, in name order.
    pub fn enabled_frontends(&self) -> impl Iterator<Item = (&str, &FrontendEntry)> {
        self.frontends
            .iter()
            .filter(|(_, entry)| entry.enabled)
            .map(|(name, entry)| (name.as_str(), entry))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendEntry {
    pub path: PathBuf,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Extension modules added to this frontend only.
    #[serde(default)]
    pub extensions: Vec<PathBuf>,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Validate every converted model before handing it out.
    #[serde(default)]
    pub validate: bool,

    /// Run `normalize` after conversion.
    #[serde(default)]
    pub normalize: bool,
}
