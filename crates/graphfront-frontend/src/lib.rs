pub mod abi;
pub mod extension;
pub mod frontend;
pub mod handle;
pub mod input_model;
pub mod loader;
pub mod manager;
pub mod traits;
pub mod transplant;

pub use extension::{Extension, ExtensionKind, ExtensionRegistry};
pub use frontend::{ConversionOptions, Frontend};
pub use handle::{PluginCache, PluginHandle};
pub use input_model::InputModel;
pub use loader::{Module, ModuleLoader, NativeLoader};
pub use manager::FrontendManager;
pub use traits::{FrontendImpl, InputModelImpl, UnsetFrontend, downcast_input};
pub use transplant::transplant;
