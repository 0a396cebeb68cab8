//! CLBlast extension routines
//!
//! ```text
//! Math<R>
//!   ├── sum, imax, imin, hadamard   (this module)
//!   ├── conv: im2col, col2im, convgemm
//!   └── batched: axpy_batched, gemm_batched, gemm_strided_batched
//! ```
//!
//! Only `gemm_strided_batched` accepts complex operands; everything else is
//! restricted to f32/f64.

#![allow(clippy::too_many_arguments)]

mod batched;
mod conv;

pub use crate::native::call::ConvGeometry;

use super::dispatch::{self, ensure_same, ensure_same_or_unset, precision_for, region, vector};
use crate::dtype::{Precision, Scalar};
use crate::error::Result;
use crate::native::call::CallArgs;
use crate::native::{Backend, Routine};
use crate::runtime::{DeviceBuffer, Runtime};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Extension routine table over runtime `R`
///
/// Obtained from [`ClBlast::math`](crate::ClBlast::math), or built directly on a
/// custom [`Backend`] with [`Math::new`].
pub struct Math<R: Runtime> {
    backend: Arc<dyn Backend>,
    _runtime: PhantomData<fn() -> R>,
}

impl<R: Runtime> Math<R> {
    /// Create a routine table that dispatches to `backend`
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            _runtime: PhantomData,
        }
    }

    /// The backend calls are dispatched to
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    fn run(
        &self,
        routine: Routine,
        precision: Precision,
        args: CallArgs,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        dispatch::enqueue(&*self.backend, routine, precision, args, queue, events)
    }

    /// R\[offset_r\] := sum of X
    ///
    /// The result buffer is not type-checked against X.
    pub fn sum(
        &self,
        n: usize,
        r: &R::Buffer,
        offset_r: usize,
        x: &R::Buffer,
        offset_x: usize,
        inc_x: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        self.reduce(Routine::Sum, n, r, offset_r, x, offset_x, inc_x, queue, events)
    }

    /// R\[offset_r\] := index of the largest element of X
    pub fn imax(
        &self,
        n: usize,
        r: &R::Buffer,
        offset_r: usize,
        x: &R::Buffer,
        offset_x: usize,
        inc_x: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        self.reduce(Routine::Imax, n, r, offset_r, x, offset_x, inc_x, queue, events)
    }

    /// R\[offset_r\] := index of the smallest element of X
    pub fn imin(
        &self,
        n: usize,
        r: &R::Buffer,
        offset_r: usize,
        x: &R::Buffer,
        offset_x: usize,
        inc_x: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        self.reduce(Routine::Imin, n, r, offset_r, x, offset_x, inc_x, queue, events)
    }

    fn reduce(
        &self,
        routine: Routine,
        n: usize,
        r: &R::Buffer,
        offset_r: usize,
        x: &R::Buffer,
        offset_x: usize,
        inc_x: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        let precision = precision_for(routine, x.dtype())?;
        let args = CallArgs::Reduce {
            n,
            result: region(r, offset_r),
            x: vector(x, offset_x, inc_x),
        };
        self.run(routine, precision, args, queue, events)
    }

    /// Z := alpha * X ⊙ Y + beta * Z (element-wise product)
    pub fn hadamard(
        &self,
        n: usize,
        alpha: impl Into<Scalar>,
        x: &R::Buffer,
        offset_x: usize,
        inc_x: usize,
        y: &R::Buffer,
        offset_y: usize,
        inc_y: usize,
        beta: impl Into<Scalar>,
        z: &R::Buffer,
        offset_z: usize,
        inc_z: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        ensure_same("X", x.dtype(), "Y", y.dtype())?;
        ensure_same_or_unset("X", x.dtype(), "Z", z.dtype())?;
        let precision = precision_for(Routine::Had, x.dtype())?;

        let args = CallArgs::Had {
            n,
            alpha: alpha.into().to_native(precision, "alpha")?,
            x: vector(x, offset_x, inc_x),
            y: vector(y, offset_y, inc_y),
            beta: beta.into().to_native(precision, "beta")?,
            z: vector(z, offset_z, inc_z),
        };
        self.run(Routine::Had, precision, args, queue, events)
    }
}

impl<R: Runtime> Clone for Math<R> {
    fn clone(&self) -> Self {
        Self::new(self.backend.clone())
    }
}

impl<R: Runtime> fmt::Debug for Math<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Math")
            .field("backend", &self.backend.name())
            .field("runtime", &R::name())
            .finish()
    }
}
