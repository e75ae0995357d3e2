use std::any::Any;
use std::sync::Arc;

use graphfront_common::{Error, Result};

use super::{Extension, ExtensionKind};

/// `(progress, total_steps, completed_steps)`
pub type ProgressFn = Arc<dyn Fn(f32, u32, u32) + Send + Sync>;

/// Receives conversion progress from a frontend.
#[derive(Default)]
pub struct ProgressReporterExtension {
    callback: Option<ProgressFn>,
}

impl ProgressReporterExtension {
    pub fn new(callback: impl Fn(f32, u32, u32) + Send + Sync + 'static) -> Self {
        Self {
            callback: Some(Arc::new(callback)),
        }
    }

    /// `progress` must lie in `[0, 1]` and `completed_steps` may not exceed `total_steps`.
    pub fn report_progress(&self, progress: f32, total_steps: u32, completed_steps: u32) -> Result<()> {
        if !(0.0..=1.0).contains(&progress) {
            return Err(Error::general(format!(
                "progress value {progress} is outside [0, 1]"
            )));
        }
        if completed_steps > total_steps {
            return Err(Error::general(format!(
                "completed steps {completed_steps} exceed total steps {total_steps}"
            )));
        }
        if let Some(callback) = &self.callback {
            callback(progress, total_steps, completed_steps);
        }
        Ok(())
    }
}

impl Extension for ProgressReporterExtension {
    fn kind(&self) -> ExtensionKind {
        ExtensionKind::ProgressReporter
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
