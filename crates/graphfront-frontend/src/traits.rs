use std::any::Any;
use std::sync::Arc;

use graphfront_common::{Error, Model, Result, Variant};

use crate::extension::Extension;

/// Format-specific parsed model, produced by [`FrontendImpl::load`].
pub trait InputModelImpl: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

/// Capability set a format frontend implements.
///
/// Every capability except [`name`](FrontendImpl::name) has a default, so a
/// format only overrides what it supports. Defaults report the capability as
/// absent: `probe` answers `false`, conversions fail with
/// [`Error::NotImplemented`] naming the operation, and `add_extension` ignores
/// the extension.
pub trait FrontendImpl: Send + Sync {
    /// Framework name, e.g. `onnx`.
    fn name(&self) -> String;

    /// Whether this frontend can load `inputs`.
    fn probe(&self, _inputs: &[Variant]) -> bool {
        false
    }

    fn load(&self, _inputs: &[Variant]) -> Result<Box<dyn InputModelImpl>> {
        Err(Error::not_implemented("load"))
    }

    /// Full conversion.
    fn convert(&self, _model: &dyn InputModelImpl) -> Result<Model> {
        Err(Error::not_implemented("convert"))
    }

    /// Conversion that may leave untranslated framework nodes as placeholders.
    fn convert_partially(&self, _model: &dyn InputModelImpl) -> Result<Model> {
        Err(Error::not_implemented("convert_partially"))
    }

    /// Structure-only decode with no semantic conversion.
    fn decode(&self, _model: &dyn InputModelImpl) -> Result<Model> {
        Err(Error::not_implemented("decode"))
    }

    /// Completes a partially converted model in place.
    fn convert_in_place(&self, _model: &mut Model) -> Result<()> {
        Err(Error::not_implemented("convert"))
    }

    fn normalize(&self, _model: &mut Model) -> Result<()> {
        Err(Error::not_implemented("normalize"))
    }

    fn add_extension(&mut self, _extension: Arc<dyn Extension>) -> Result<()> {
        Ok(())
    }
}

/// Stand-in implementation for a frontend with nothing attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsetFrontend;

impl FrontendImpl for UnsetFrontend {
    fn name(&self) -> String {
        String::new()
    }
}

/// Recovers the concrete input model type a frontend produced in `load`.
pub fn downcast_input<T: InputModelImpl>(model: &dyn InputModelImpl) -> Result<&T> {
    model.as_any().downcast_ref::<T>().ok_or_else(|| {
        Error::general(format!(
            "input model is not a {}",
            std::any::type_name::<T>()
        ))
    })
}
