use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, Weak};

use graphfront_common::{Error, Result, SharedObject};
use tracing::{debug, info, warn};

use crate::abi::ABI_VERSION;
use crate::extension::{Extension, ModuleExtension};
use crate::loader::{Module, ModuleLoader, NativeLoader};
use crate::traits::FrontendImpl;

struct ResidentModule {
    path: PathBuf,
    abi_version: u32,
    module: Box<dyn Module>,
}

impl Drop for ResidentModule {
    fn drop(&mut self) {
        info!(path = %self.path.display(), "unloading module");
    }
}

/// Shared reference to a loaded module.
///
/// Clones share one reference count; the module is unloaded when the last
/// clone, and the last keep-alive handed out by [`PluginHandle::keep_alive`],
/// is dropped.
#[derive(Clone)]
pub struct PluginHandle {
    inner: Arc<ResidentModule>,
}

impl PluginHandle {
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub fn abi_version(&self) -> u32 {
        self.inner.abi_version
    }

    /// Number of live references to the module.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    pub fn same_module(&self, other: &PluginHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Opaque reference that keeps the module loaded, for storing in a model.
    pub fn keep_alive(&self) -> SharedObject {
        self.inner.clone()
    }

    pub fn create_frontend(&self) -> Result<Box<dyn FrontendImpl>> {
        self.inner.module.create_frontend()
    }

    /// Instantiates the module's extensions, each holding a reference to this handle.
    pub fn create_extensions(&self) -> Result<Vec<Arc<dyn Extension>>> {
        let extensions = self.inner.module.create_extensions()?;
        debug!(path = %self.path().display(), count = extensions.len(), "created module extensions");
        Ok(extensions
            .into_iter()
            .map(|ext| Arc::new(ModuleExtension::new(ext, self.clone())) as Arc<dyn Extension>)
            .collect())
    }
}

impl fmt::Debug for PluginHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginHandle")
            .field("path", &self.inner.path)
            .field("abi_version", &self.inner.abi_version)
            .field("ref_count", &self.ref_count())
            .finish()
    }
}

/// Table of resident modules keyed by resolved path.
///
/// Acquisition is serialised, so concurrent first-time acquisitions of the
/// same path load the module once and share the result.
pub struct PluginCache {
    loader: Box<dyn ModuleLoader>,
    expected_abi_version: u32,
    resident: Mutex<HashMap<PathBuf, Weak<ResidentModule>>>,
}

impl PluginCache {
    pub fn new() -> Self {
        Self::with_loader(NativeLoader)
    }

    pub fn with_loader(loader: impl ModuleLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            expected_abi_version: ABI_VERSION,
            resident: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_abi_version(mut self, version: u32) -> Self {
        self.expected_abi_version = version;
        self
    }

    /// Process-wide cache backed by [`NativeLoader`].
    pub fn global() -> Arc<PluginCache> {
        static GLOBAL: OnceLock<Arc<PluginCache>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(PluginCache::new())))
    }

    /// Returns a handle to the module at `path`, loading it if it is not resident.
    pub fn acquire(&self, path: impl AsRef<Path>) -> Result<PluginHandle> {
        let resolved = resolve(path.as_ref());
        let mut resident = self
            .resident
            .lock()
            .map_err(|_| Error::general("plugin cache lock poisoned"))?;

        if let Some(inner) = resident.get(&resolved).and_then(Weak::upgrade) {
            debug!(path = %resolved.display(), "module already resident");
            return Ok(PluginHandle { inner });
        }
        resident.retain(|_, module| module.strong_count() > 0);

        let module = self.loader.open(&resolved)?;
        let abi_version = module.abi_version();
        if abi_version != self.expected_abi_version {
            warn!(
                path = %resolved.display(),
                abi_version,
                expected = self.expected_abi_version,
                "rejecting module with incompatible ABI version"
            );
            return Err(Error::initialization(format!(
                "module {} reports ABI version {abi_version}, expected {}",
                resolved.display(),
                self.expected_abi_version
            )));
        }

        let inner = Arc::new(ResidentModule {
            path: resolved.clone(),
            abi_version,
            module,
        });
        resident.insert(resolved, Arc::downgrade(&inner));
        info!(path = %inner.path.display(), abi_version, "loaded module");
        Ok(PluginHandle { inner })
    }

    pub fn is_resident(&self, path: impl AsRef<Path>) -> bool {
        let resolved = resolve(path.as_ref());
        self.resident
            .lock()
            .ok()
            .and_then(|map| map.get(&resolved).map(|m| m.strong_count() > 0))
            .unwrap_or(false)
    }

    pub fn resident_count(&self) -> usize {
        self.resident
            .lock()
            .map(|map| map.values().filter(|m| m.strong_count() > 0).count())
            .unwrap_or(0)
    }
}

impl Default for PluginCache {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
