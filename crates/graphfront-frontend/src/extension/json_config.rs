use serde::{Deserialize, Serialize};
use std::any::Any;
use std::path::{Path, PathBuf};

use graphfront_common::{Error, Result};

use super::{Extension, ExtensionKind};

/// One transformation described by a JSON configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationEntry {
    pub id: String,
    #[serde(default)]
    pub library: Option<PathBuf>,
    #[serde(default)]
    pub match_kind: Option<String>,
    #[serde(default)]
    pub custom_attributes: serde_json::Value,
}

/// Transformation settings read from a JSON file.
///
/// The file holds an array of [`TransformationEntry`]. Relative `library`
/// paths are resolved against the directory containing the file.
#[derive(Debug, Clone)]
pub struct JsonConfigExtension {
    path: PathBuf,
    entries: Vec<TransformationEntry>,
}

impl JsonConfigExtension {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let entries = Self::parse(&contents, base)?;
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    fn parse(contents: &str, base: &Path) -> Result<Vec<TransformationEntry>> {
        let mut entries: Vec<TransformationEntry> = serde_json::from_str(contents)?;
        for entry in &mut entries {
            if entry.id.trim().is_empty() {
                return Err(Error::general("transformation entry without an id"));
            }
            if let Some(library) = entry.library.as_mut() {
                if library.is_relative() {
                    *library = base.join(&*library);
                }
            }
        }
        Ok(entries)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[TransformationEntry] {
        &self.entries
    }

    pub fn entry(&self, id: &str) -> Option<&TransformationEntry> {
        self.entries.iter().find(|e| e.id == id)
    }
}

impl Extension for JsonConfigExtension {
    fn kind(&self) -> ExtensionKind {
        ExtensionKind::JsonConfig
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
