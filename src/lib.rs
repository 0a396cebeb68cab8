//! # clblast
//!
//! **Runtime-loaded bindings to CLBlast, the OpenCL BLAS library.**
//!
//! The crate does no arithmetic of its own. It finds and loads the CLBlast shared
//! library at runtime, checks the operands of each call, picks the native entry
//! point for the operands' element type (f32, f64, complex64, complex128), passes
//! buffers, offsets, scalars, queues and event slots across the C ABI, and turns
//! the returned status into a [`Result`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use clblast::prelude::*;
//!
//! let clblast = ClBlast::new();
//! let blas = clblast.blas::<OpenClRuntime>()?;
//!
//! // x: ClBuffer of 1024 f32 values, queue: ClQueue
//! let mut events = ClEventList::new();
//! blas.scal(1024, 2.0, &x, 0, 1, &queue, Some(&mut events))?;
//! events.wait()?;
//! ```
//!
//! ## Loading
//!
//! A [`ClBlast`] binds the library unless the process is already bound (see
//! [`LoaderConfig`] and the `CLBLAST_*` environment variables). Later instances
//! share a successful bind; after a failed attempt the next instance tries again.
//!
//! ## Feature Flags
//!
//! - `opencl` (default): [`runtime::opencl`], a runtime over raw OpenCL handles
//! - `f16`: `half::f16` / `half::bf16` host elements

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dtype;
pub mod error;
pub mod native;
pub mod ops;
pub mod runtime;

pub use dtype::{Complex128, Complex64, DType, Precision, Scalar};
pub use error::{Error, Result};
pub use native::{ClBlast, ComplexPolicy, LoaderConfig, Routine, Status};
pub use ops::{Blas, ConvGeometry, Math};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dtype::{Complex128, Complex64, DType, Scalar};
    pub use crate::error::{Error, Result};
    pub use crate::native::types::{Diag, KernelMode, Layout, Side, Transpose, Uplo};
    pub use crate::native::{ClBlast, LoaderConfig};
    pub use crate::ops::{Blas, ConvGeometry, Math};
    pub use crate::runtime::{CommandQueue, DeviceBuffer, EventList, HostBuffer, Runtime};

    #[cfg(feature = "opencl")]
    pub use crate::runtime::opencl::{ClBuffer, ClEventList, ClQueue, OpenClRuntime};
}
