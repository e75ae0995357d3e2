//! Cross-cutting capabilities that can be attached to a frontend.
//!
//! Each category is an independent type. Whether a frontend accepts a given
//! extension is decided by the frontend implementation; the
//! [`ExtensionRegistry`] only remembers what was added so it can be replayed
//! when an implementation attaches later.

pub mod conversion;
pub mod decoder;
pub mod json_config;
pub mod module;
pub mod progress;
pub mod registry;
pub mod telemetry;

use std::any::Any;

use crate::handle::PluginHandle;

pub use conversion::{ConversionExtension, ConversionExtensionBase, OpExtension};
pub use decoder::DecoderTransformationExtension;
pub use json_config::{JsonConfigExtension, TransformationEntry};
pub use module::ModuleExtension;
pub use progress::ProgressReporterExtension;
pub use registry::ExtensionRegistry;
pub use telemetry::TelemetryExtension;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionKind {
    Telemetry,
    DecoderTransformation,
    JsonConfig,
    Conversion,
    ProgressReporter,
    /// A category defined outside this crate.
    Other,
}

pub trait Extension: Any + Send + Sync {
    fn kind(&self) -> ExtensionKind;

    fn as_any(&self) -> &dyn Any;

    /// Conversion view, for extensions of kind [`ExtensionKind::Conversion`].
    fn as_conversion(&self) -> Option<&dyn ConversionExtensionBase> {
        None
    }

    /// Module this extension was loaded from, if any.
    fn plugin_handle(&self) -> Option<&PluginHandle> {
        None
    }
}

impl dyn Extension {
    pub fn downcast_ref<T: Extension>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn is<T: Extension>(&self) -> bool {
        self.as_any().is::<T>()
    }
}
