//! Routine wrappers
//!
//! Two routine tables share one dispatch path:
//!
//! ```text
//! Blas<R>   level 1/2/3 BLAS
//! Math<R>   CLBlast extensions (sum/imax/imin, hadamard, convolution lowering,
//!           batched GEMM/AXPY)
//!     │
//!     ▼
//! dispatch: validate dtypes → precision → CallArgs → Backend::enqueue
//!           → status check → event hand-off
//! ```
//!
//! Both tables are generic over the [`Runtime`](crate::runtime::Runtime) that owns
//! the buffers, queue and events, and hold the [`Backend`](crate::native::Backend)
//! they dispatch to. Validation happens entirely before the native call; a
//! rejected call never reaches CLBlast.

pub mod blas;
mod dispatch;
pub mod math;

pub use blas::Blas;
pub use math::{ConvGeometry, Math};
