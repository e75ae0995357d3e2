use std::fmt;

use crate::handle::PluginHandle;
use crate::traits::InputModelImpl;

/// A parsed, not yet converted model returned by [`crate::Frontend::load`].
pub struct InputModel {
    actual: Box<dyn InputModelImpl>,
    // Dropped after `actual`, whose code may live in the module.
    handle: Option<PluginHandle>,
}

impl InputModel {
    pub(crate) fn new(actual: Box<dyn InputModelImpl>, handle: Option<PluginHandle>) -> Self {
        Self { actual, handle }
    }

    pub fn actual(&self) -> &dyn InputModelImpl {
        self.actual.as_ref()
    }

    pub fn downcast_ref<T: InputModelImpl>(&self) -> Option<&T> {
        self.actual.as_any().downcast_ref::<T>()
    }

    pub fn plugin_handle(&self) -> Option<&PluginHandle> {
        self.handle.as_ref()
    }
}

impl fmt::Debug for InputModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputModel")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}
