//! Entry points a frontend or extension module exports.
//!
//! Every module exports `graphfront_abi_version` with the C ABI. Factories use
//! the Rust ABI and hand back trait objects, so a module must be built with the
//! same compiler and the same `graphfront-frontend` version as the host.
//! [`export_module!`](crate::export_module) generates all of them.

use std::sync::Arc;

use crate::extension::Extension;
use crate::traits::FrontendImpl;

/// Version tag a module must report to be accepted.
pub const ABI_VERSION: u32 = 1;

pub const ABI_VERSION_SYMBOL: &[u8] = b"graphfront_abi_version\0";
pub const FRONTEND_CREATE_SYMBOL: &[u8] = b"graphfront_frontend_create\0";
pub const EXTENSIONS_CREATE_SYMBOL: &[u8] = b"graphfront_extensions_create\0";

pub type AbiVersionFn = unsafe extern "C" fn() -> u32;
pub type FrontendCreateFn = fn() -> Box<dyn FrontendImpl>;
pub type ExtensionsCreateFn = fn() -> Vec<Arc<dyn Extension>>;

/// Exports module entry points.
///
/// ```ignore
/// graphfront_frontend::export_module! {
///     frontend: OnnxFrontend::default(),
///     extensions: vec![Arc::new(OpExtension::new("Gelu", "Gelu")) as Arc<dyn Extension>],
/// }
/// ```
///
/// Either part may be omitted, but not both.
#[macro_export]
macro_rules! export_module {
    (frontend: $frontend:expr $(, extensions: $extensions:expr)? $(,)?) => {
        $crate::export_module!(@abi);

        #[unsafe(no_mangle)]
        pub fn graphfront_frontend_create() -> ::std::boxed::Box<dyn $crate::FrontendImpl> {
            ::std::boxed::Box::new($frontend)
        }

        $(
            #[unsafe(no_mangle)]
            pub fn graphfront_extensions_create()
                -> ::std::vec::Vec<::std::sync::Arc<dyn $crate::Extension>> {
                $extensions
            }
        )?
    };
    (extensions: $extensions:expr $(,)?) => {
        $crate::export_module!(@abi);

        #[unsafe(no_mangle)]
        pub fn graphfront_extensions_create()
            -> ::std::vec::Vec<::std::sync::Arc<dyn $crate::Extension>> {
            $extensions
        }
    };
    (@abi) => {
        #[unsafe(no_mangle)]
        pub extern "C" fn graphfront_abi_version() -> u32 {
            $crate::abi::ABI_VERSION
        }
    };
}
