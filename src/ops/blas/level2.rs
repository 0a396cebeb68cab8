//! Level 2: matrix-vector routines

use super::Blas;
use crate::dtype::Scalar;
use crate::error::Result;
use crate::native::call::CallArgs;
use crate::native::types::{Layout, Transpose};
use crate::native::Routine;
use crate::ops::dispatch::{ensure_same, matrix, precision_for, transpose_code, vector};
use crate::runtime::{DeviceBuffer, Runtime};

impl<R: Runtime> Blas<R> {
    /// Y := alpha * op(A) * X + beta * Y
    ///
    /// `Transpose::ConjNoTrans` is rejected.
    pub fn gemv(
        &self,
        layout: Layout,
        trans: Transpose,
        m: usize,
        n: usize,
        alpha: impl Into<Scalar>,
        a: &R::Buffer,
        offset_a: usize,
        ld_a: usize,
        x: &R::Buffer,
        offset_x: usize,
        inc_x: usize,
        beta: impl Into<Scalar>,
        y: &R::Buffer,
        offset_y: usize,
        inc_y: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        ensure_same("A", a.dtype(), "X", x.dtype())?;
        ensure_same("X", x.dtype(), "Y", y.dtype())?;
        let trans = transpose_code("trans", trans)?;
        let precision = precision_for(Routine::Gemv, x.dtype())?;

        let args = CallArgs::Gemv {
            layout,
            trans,
            m,
            n,
            alpha: alpha.into().to_native(precision, "alpha")?,
            a: matrix(a, offset_a, ld_a),
            x: vector(x, offset_x, inc_x),
            beta: beta.into().to_native(precision, "beta")?,
            y: vector(y, offset_y, inc_y),
        };
        self.run(Routine::Gemv, precision, args, queue, events)
    }
}
