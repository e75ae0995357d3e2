use std::path::Path;
use std::sync::Arc;

use graphfront_common::{Error, Result};
use libloading::Library;
use tracing::debug;

use crate::abi::{
    ABI_VERSION_SYMBOL, AbiVersionFn, EXTENSIONS_CREATE_SYMBOL, ExtensionsCreateFn,
    FRONTEND_CREATE_SYMBOL, FrontendCreateFn,
};
use crate::extension::Extension;
use crate::traits::FrontendImpl;

/// A module opened by a [`ModuleLoader`]. Dropping it unloads the module.
pub trait Module: Send + Sync {
    /// Version tag the module reports.
    fn abi_version(&self) -> u32;

    fn create_frontend(&self) -> Result<Box<dyn FrontendImpl>> {
        Err(Error::initialization("module does not export a frontend"))
    }

    fn create_extensions(&self) -> Result<Vec<Arc<dyn Extension>>> {
        Err(Error::initialization("module does not export extensions"))
    }
}

/// Opens modules by path.
pub trait ModuleLoader: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn Module>>;
}

/// Loads shared libraries from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeLoader;

impl ModuleLoader for NativeLoader {
    fn open(&self, path: &Path) -> Result<Box<dyn Module>> {
        // SAFETY: Loading a library runs its initialisers; modules are trusted by configuration.
        let library = unsafe { Library::new(path) }.map_err(|e| {
            Error::initialization(format!("failed to load module {}: {e}", path.display()))
        })?;

        // SAFETY: Symbol types match the contract in `crate::abi`.
        let abi_version = unsafe {
            let version = library.get::<AbiVersionFn>(ABI_VERSION_SYMBOL).map_err(|e| {
                Error::initialization(format!(
                    "module {} has no ABI version export: {e}",
                    path.display()
                ))
            })?;
            version()
        };
        let create_frontend = unsafe { library.get::<FrontendCreateFn>(FRONTEND_CREATE_SYMBOL) }
            .ok()
            .map(|symbol| *symbol);
        let create_extensions =
            unsafe { library.get::<ExtensionsCreateFn>(EXTENSIONS_CREATE_SYMBOL) }
                .ok()
                .map(|symbol| *symbol);

        debug!(
            path = %path.display(),
            abi_version,
            frontend = create_frontend.is_some(),
            extensions = create_extensions.is_some(),
            "opened native module"
        );

        Ok(Box::new(NativeModule {
            abi_version,
            create_frontend,
            create_extensions,
            _library: library,
        }))
    }
}

struct NativeModule {
    abi_version: u32,
    create_frontend: Option<FrontendCreateFn>,
    create_extensions: Option<ExtensionsCreateFn>,
    // Last field: the factories above point into it.
    _library: Library,
}

impl Module for NativeModule {
    fn abi_version(&self) -> u32 {
        self.abi_version
    }

    fn create_frontend(&self) -> Result<Box<dyn FrontendImpl>> {
        let create = self
            .create_frontend
            .ok_or_else(|| Error::initialization("module does not export a frontend"))?;
        Ok(create())
    }

    fn create_extensions(&self) -> Result<Vec<Arc<dyn Extension>>> {
        let create = self
            .create_extensions
            .ok_or_else(|| Error::initialization("module does not export extensions"))?;
        Ok(create())
    }
}
