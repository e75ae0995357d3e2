use std::any::Any;
use std::sync::Arc;

use graphfront_common::{Model, Result};

use super::{Extension, ExtensionKind};

pub type ModelPassFn = Arc<dyn Fn(&mut Model) -> Result<()> + Send + Sync>;

/// A pass a frontend runs over the decoded model before conversion.
pub struct DecoderTransformationExtension {
    name: String,
    pass: ModelPassFn,
}

impl DecoderTransformationExtension {
    pub fn new(
        name: impl Into<String>,
        pass: impl Fn(&mut Model) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            pass: Arc::new(pass),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, model: &mut Model) -> Result<()> {
        tracing::debug!(pass = %self.name, model = %model.friendly_name(), "applying decoder transformation");
        (self.pass)(model)
    }
}

impl Extension for DecoderTransformationExtension {
    fn kind(&self) -> ExtensionKind {
        ExtensionKind::DecoderTransformation
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
