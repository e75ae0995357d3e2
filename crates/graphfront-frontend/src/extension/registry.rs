use std::sync::Arc;

use graphfront_common::Result;
use tracing::debug;

use super::{Extension, ExtensionKind};
use crate::traits::FrontendImpl;

/// Extensions added to one frontend, in insertion order.
#[derive(Clone, Default)]
pub struct ExtensionRegistry {
    extensions: Vec<Arc<dyn Extension>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, extension: Arc<dyn Extension>) {
        self.extensions.push(extension);
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Extension>> {
        self.extensions.iter()
    }

    pub fn of_kind(&self, kind: ExtensionKind) -> impl Iterator<Item = &Arc<dyn Extension>> {
        self.extensions.iter().filter(move |e| e.kind() == kind)
    }

    /// Hands every recorded extension, in order, to a newly attached implementation.
    pub fn replay(&self, actual: &mut dyn FrontendImpl) -> Result<()> {
        for extension in &self.extensions {
            debug!(kind = ?extension.kind(), frontend = %actual.name(), "replaying extension");
            actual.add_extension(Arc::clone(extension))?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.extensions.iter().map(|e| e.kind()))
            .finish()
    }
}
