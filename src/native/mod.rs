//! Native side of the binding
//!
//! - [`types`]: C ABI handles, option enums and status codes
//! - [`routine`]: the `(Routine, Precision) -> symbol` capability table
//! - [`call`]: marshalled arguments of one routine call
//! - [`Backend`]: executes a [`NativeCall`]
//! - [`ClBlastLibrary`]: the dynamically loaded CLBlast, with its complex shim
//! - [`ClBlast`]: process-wide loader and entry point

mod backend;
pub mod call;
mod library;
mod loader;
pub mod routine;
mod shim;
pub mod types;

pub use backend::Backend;
pub use call::{CallArgs, ConvGeometry, NativeCall};
pub use library::ClBlastLibrary;
pub use loader::{
    ClBlast, ComplexPolicy, LoaderConfig, ENV_COMPLEX_PATH, ENV_LIBRARY_PATH, ENV_SHIM_PATH,
};
pub use routine::Routine;
pub use shim::{ComplexPath, ShimLibrary};
pub use types::Status;
