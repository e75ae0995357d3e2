use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use graphfront_common::{Error, Result, Variant};
use tracing::{debug, info, warn};

use crate::frontend::{ConversionOptions, Frontend};
use crate::handle::{PluginCache, PluginHandle};
use crate::traits::FrontendImpl;

#[derive(Debug, Clone)]
struct Registration {
    path: PathBuf,
    extensions: Vec<PathBuf>,
}

/// Named frontend modules and the extensions to apply to them.
pub struct FrontendManager {
    cache: Arc<PluginCache>,
    frontends: BTreeMap<String, Registration>,
    extensions: Vec<PathBuf>,
    options: ConversionOptions,
}

impl FrontendManager {
    pub fn new() -> Self {
        Self::with_cache(PluginCache::global())
    }

    pub fn with_cache(cache: Arc<PluginCache>) -> Self {
        Self {
            cache,
            frontends: BTreeMap::new(),
            extensions: Vec::new(),
            options: ConversionOptions::default(),
        }
    }

    pub fn cache(&self) -> &Arc<PluginCache> {
        &self.cache
    }

    pub fn register_frontend(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.register_frontend_with_extensions(name, path, Vec::new());
    }

    /// Registers a frontend whose instances also receive `extensions` (module paths).
    pub fn register_frontend_with_extensions(
        &mut self,
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        extensions: Vec<PathBuf>,
    ) {
        let name = name.into();
        let path = path.into();
        debug!(frontend = %name, path = %path.display(), "registered frontend");
        self.frontends
            .insert(name, Registration { path, extensions });
    }

    /// Adds an extension module applied to every frontend this manager creates.
    pub fn add_extension_path(&mut self, path: impl Into<PathBuf>) {
        self.extensions.push(path.into());
    }

    pub fn set_options(&mut self, options: ConversionOptions) {
        self.options = options;
    }

    /// Registered framework names, sorted.
    pub fn available_frontends(&self) -> Vec<&str> {
        self.frontends.keys().map(String::as_str).collect()
    }

    pub fn load_by_framework(&self, name: &str) -> Result<Frontend> {
        let registration = self
            .frontends
            .get(name)
            .ok_or_else(|| Error::general(format!("unknown frontend '{name}'")))?;
        let (handle, actual) = self.open_module(registration)?;
        self.assemble(name, registration, handle, actual)
    }

    /// First registered frontend, in name order, whose probe accepts `inputs`.
    ///
    /// Frontend modules that fail to load are skipped. Extension modules that
    /// fail to load end the search with their error.
    pub fn load_by_model(&self, inputs: &[Variant]) -> Result<Option<Frontend>> {
        for (name, registration) in &self.frontends {
            let (handle, actual) = match self.open_module(registration) {
                Ok(opened) => opened,
                Err(e) => {
                    warn!(frontend = %name, error = %e, "skipping frontend that failed to load");
                    continue;
                }
            };
            let frontend = self.assemble(name, registration, handle, actual)?;
            if frontend.probe(inputs) {
                info!(frontend = %name, "frontend claims input");
                return Ok(Some(frontend));
            }
        }
        Ok(None)
    }

    fn open_module(
        &self,
        registration: &Registration,
    ) -> Result<(PluginHandle, Box<dyn FrontendImpl>)> {
        let handle = self.cache.acquire(&registration.path)?;
        let actual = handle.create_frontend()?;
        Ok((handle, actual))
    }

    /// Starts from an empty frontend so extensions go through the same deferred
    /// path as caller-added ones, then attaches the module's implementation.
    fn assemble(
        &self,
        name: &str,
        registration: &Registration,
        handle: PluginHandle,
        actual: Box<dyn FrontendImpl>,
    ) -> Result<Frontend> {
        let mut frontend = Frontend::empty_in(Arc::clone(&self.cache)).with_options(self.options);
        for path in self.extensions.iter().chain(&registration.extensions) {
            frontend.add_extension_from_path(path)?;
        }
        frontend.attach(actual, Some(handle))?;

        debug!(frontend = %name, "instantiated frontend");
        Ok(frontend)
    }
}

impl Default for FrontendManager {
    fn default() -> Self {
        Self::new()
    }
}
