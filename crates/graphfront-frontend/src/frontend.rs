use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use graphfront_common::{Error, Model, Result, Variant};
use tracing::{debug, info};

use crate::extension::{Extension, ExtensionRegistry};
use crate::handle::{PluginCache, PluginHandle};
use crate::input_model::InputModel;
use crate::traits::{FrontendImpl, UnsetFrontend};
use crate::transplant::transplant;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConversionOptions {
    /// Run [`Model::validate`] on every converted model.
    pub validate: bool,
}

/// Uniform entry point over a format implementation that may not be attached yet.
///
/// An unattached frontend dispatches to [`UnsetFrontend`], so every call site
/// below is the same whether or not an implementation is present.
pub struct Frontend {
    actual: Box<dyn FrontendImpl>,
    attached: bool,
    extensions: ExtensionRegistry,
    options: ConversionOptions,
    cache: Arc<PluginCache>,
    // Dropped after `actual`, whose code may live in the module.
    handle: Option<PluginHandle>,
}

impl Frontend {
    /// A valid frontend with no implementation, using the process-wide module cache.
    pub fn empty() -> Self {
        Self::empty_in(PluginCache::global())
    }

    /// Like [`Frontend::empty`], loading extension modules through `cache`.
    pub fn empty_in(cache: Arc<PluginCache>) -> Self {
        Self {
            actual: Box::new(UnsetFrontend),
            attached: false,
            extensions: ExtensionRegistry::new(),
            options: ConversionOptions::default(),
            cache,
            handle: None,
        }
    }

    /// Frontend for an in-process implementation.
    pub fn new(actual: Box<dyn FrontendImpl>) -> Self {
        Self {
            actual,
            attached: true,
            ..Self::empty()
        }
    }

    /// Frontend backed by the implementation a loaded module exports.
    pub fn from_module(handle: PluginHandle, cache: Arc<PluginCache>) -> Result<Self> {
        let actual = handle.create_frontend()?;
        let mut frontend = Self::empty_in(cache);
        frontend.attach(actual, Some(handle))?;
        Ok(frontend)
    }

    pub fn with_options(mut self, options: ConversionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> ConversionOptions {
        self.options
    }

    pub fn set_options(&mut self, options: ConversionOptions) {
        self.options = options;
    }

    /// Installs `actual`, replacing any current implementation, and replays every
    /// extension added so far into it.
    pub fn attach(
        &mut self,
        mut actual: Box<dyn FrontendImpl>,
        handle: Option<PluginHandle>,
    ) -> Result<()> {
        if let Err(e) = self.extensions.replay(actual.as_mut()) {
            drop(actual);
            drop(handle);
            return Err(e);
        }

        let previous = std::mem::replace(&mut self.actual, actual);
        drop(previous);
        self.handle = handle;
        self.attached = true;

        info!(
            frontend = %self.actual.name(),
            module = ?self.handle.as_ref().map(|h| h.path().display().to_string()),
            extensions = self.extensions.len(),
            "frontend attached"
        );
        Ok(())
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn plugin_handle(&self) -> Option<&PluginHandle> {
        self.handle.as_ref()
    }

    pub fn extensions(&self) -> &ExtensionRegistry {
        &self.extensions
    }

    /// Framework name, empty when nothing is attached.
    pub fn name(&self) -> String {
        self.actual.name()
    }

    pub fn probe(&self, inputs: &[Variant]) -> bool {
        self.actual.probe(inputs)
    }

    pub fn load(&self, inputs: &[Variant]) -> Result<InputModel> {
        let actual = self.dispatch("load", |fe| fe.load(inputs))?;
        Ok(InputModel::new(actual, self.handle.clone()))
    }

    pub fn convert(&self, model: &InputModel) -> Result<Model> {
        let raw = self.dispatch("convert", |fe| fe.convert(model.actual()))?;
        self.finish_conversion(raw)
    }

    pub fn convert_partially(&self, model: &InputModel) -> Result<Model> {
        let raw = self.dispatch("convert_partially", |fe| fe.convert_partially(model.actual()))?;
        self.finish_conversion(raw)
    }

    pub fn decode(&self, model: &InputModel) -> Result<Model> {
        let raw = self.dispatch("decode", |fe| fe.decode(model.actual()))?;
        self.finish_conversion(raw)
    }

    /// Completes a model produced by [`Frontend::convert_partially`].
    pub fn convert_in_place(&self, model: &mut Model) -> Result<()> {
        self.dispatch("convert", |fe| fe.convert_in_place(model))
    }

    pub fn normalize(&self, model: &mut Model) -> Result<()> {
        self.dispatch("normalize", |fe| fe.normalize(model))
    }

    /// Records `extension` and passes it to the implementation.
    ///
    /// Without an implementation this only records it; it is handed over on
    /// [`Frontend::attach`].
    pub fn add_extension(&mut self, extension: Arc<dyn Extension>) -> Result<()> {
        self.extensions.record(Arc::clone(&extension));
        debug!(
            kind = ?extension.kind(),
            attached = self.attached,
            "extension added"
        );
        self.actual.add_extension(extension)
    }

    pub fn add_extensions(
        &mut self,
        extensions: impl IntoIterator<Item = Arc<dyn Extension>>,
    ) -> Result<()> {
        for extension in extensions {
            self.add_extension(extension)?;
        }
        Ok(())
    }

    /// Loads every extension exported by the module at `path` and adds each one.
    pub fn add_extension_from_path(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let module = self.cache.acquire(path)?;
        let extensions = module.create_extensions()?;
        self.add_extensions(extensions)
    }

    /// [`Frontend::add_extension_from_path`] for a UTF-16 encoded path.
    pub fn add_extension_from_wide_path(&mut self, path: &[u16]) -> Result<()> {
        let path = String::from_utf16(path)
            .map_err(|e| Error::initialization(format!("invalid UTF-16 module path: {e}")))?;
        self.add_extension_from_path(PathBuf::from(path))
    }

    fn dispatch<T>(
        &self,
        operation: &'static str,
        call: impl FnOnce(&dyn FrontendImpl) -> Result<T>,
    ) -> Result<T> {
        debug!(frontend = %self.actual.name(), operation, "dispatching");
        call(self.actual.as_ref()).inspect_err(|e| {
            debug!(operation, error = %e, "frontend call failed");
        })
    }

    fn finish_conversion(&self, raw: Model) -> Result<Model> {
        let model = transplant(&raw, self.handle.as_ref());
        drop(raw);
        if self.options.validate {
            model.validate()?;
        }
        Ok(model)
    }
}

impl Default for Frontend {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Frontend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frontend")
            .field("name", &self.actual.name())
            .field("attached", &self.attached)
            .field("extensions", &self.extensions)
            .field("options", &self.options)
            .field("handle", &self.handle)
            .finish()
    }
}
