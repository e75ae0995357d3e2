use std::any::Any;
use std::sync::Arc;

use super::{ConversionExtensionBase, Extension, ExtensionKind};
use crate::handle::PluginHandle;

/// An extension created by a loaded module, together with that module's handle.
///
/// The extension's code lives in the module, so the wrapped value is dropped
/// before the handle.
pub struct ModuleExtension {
    extension: Arc<dyn Extension>,
    module: PluginHandle,
}

impl ModuleExtension {
    pub fn new(extension: Arc<dyn Extension>, module: PluginHandle) -> Self {
        Self { extension, module }
    }

    pub fn inner(&self) -> &Arc<dyn Extension> {
        &self.extension
    }
}

impl Extension for ModuleExtension {
    fn kind(&self) -> ExtensionKind {
        self.extension.kind()
    }

    fn as_any(&self) -> &dyn Any {
        self.extension.as_any()
    }

    fn as_conversion(&self) -> Option<&dyn ConversionExtensionBase> {
        self.extension.as_conversion()
    }

    fn plugin_handle(&self) -> Option<&PluginHandle> {
        Some(&self.module)
    }
}
