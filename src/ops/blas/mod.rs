//! BLAS level 1, 2 and 3 routines
//!
//! Every method follows the same path: check operand dtypes, reject options
//! CLBlast cannot express, pick the precision from the capability table,
//! marshal, enqueue, map the status.
//!
//! ```text
//! Blas<R>
//!   ├── level1: scal, axpy, dot, dotu, dotc, asum, iamax, iamin, copy, nrm2,
//!   │           swap, rotg, rot, rotmg, rotm
//!   ├── level2: gemv
//!   └── level3: gemm, symm, syrk, syr2k, trmm, trsm, omatcopy
//! ```

#![allow(clippy::too_many_arguments)]

mod level1;
mod level2;
mod level3;

use super::dispatch;
use crate::dtype::Precision;
use crate::error::Result;
use crate::native::call::CallArgs;
use crate::native::{Backend, Routine};
use crate::runtime::Runtime;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// BLAS routine table over runtime `R`
///
/// Obtained from [`ClBlast::blas`](crate::ClBlast::blas), or built directly on a
/// custom [`Backend`] with [`Blas::new`].
pub struct Blas<R: Runtime> {
    backend: Arc<dyn Backend>,
    _runtime: PhantomData<fn() -> R>,
}

impl<R: Runtime> Blas<R> {
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
}

impl<R: Runtime> Clone for Blas<R> {
    fn clone(&self) -> Self {
        Self::new(self.backend.clone())
    }
}

impl<R: Runtime> fmt::Debug for Blas<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blas")
            .field("backend", &self.backend.name())
            .field("runtime", &R::name())
            .finish()
    }
}
