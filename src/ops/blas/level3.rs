//! Level 3: matrix-matrix routines, plus out-of-place matrix copy

use super::Blas;
use crate::dtype::Scalar;
use crate::error::Result;
use crate::native::call::CallArgs;
use crate::native::types::{Diag, Layout, Side, Transpose, Uplo};
use crate::native::Routine;
use crate::ops::dispatch::{ensure_same, matrix, precision_for, transpose_code};
use crate::runtime::{DeviceBuffer, Runtime};

impl<R: Runtime> Blas<R> {
    /// C := alpha * op(A) * op(B) + beta * C
    ///
    /// `Transpose::ConjNoTrans` is rejected for either operand.
    pub fn gemm(
        &self,
        layout: Layout,
        trans_a: Transpose,
        trans_b: Transpose,
        m: usize,
        n: usize,
        k: usize,
        alpha: impl Into<Scalar>,
        a: &R::Buffer,
        offset_a: usize,
        ld_a: usize,
        b: &R::Buffer,
        offset_b: usize,
        ld_b: usize,
        beta: impl Into<Scalar>,
        c: &R::Buffer,
        offset_c: usize,
        ld_c: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        ensure_same("A", a.dtype(), "B", b.dtype())?;
        ensure_same("A", a.dtype(), "C", c.dtype())?;
        let trans_a = transpose_code("transA", trans_a)?;
        let trans_b = transpose_code("transB", trans_b)?;
        let precision = precision_for(Routine::Gemm, a.dtype())?;

        let args = CallArgs::Gemm {
            layout,
            trans_a,
            trans_b,
            m,
            n,
            k,
            alpha: alpha.into().to_native(precision, "alpha")?,
            a: matrix(a, offset_a, ld_a),
            b: matrix(b, offset_b, ld_b),
            beta: beta.into().to_native(precision, "beta")?,
            c: matrix(c, offset_c, ld_c),
        };
        self.run(Routine::Gemm, precision, args, queue, events)
    }

    /// C := alpha * A * B + beta * C (or B * A for `Side::Right`), A symmetric
    pub fn symm(
        &self,
        layout: Layout,
        side: Side,
        uplo: Uplo,
        m: usize,
        n: usize,
        alpha: impl Into<Scalar>,
        a: &R::Buffer,
        offset_a: usize,
        ld_a: usize,
        b: &R::Buffer,
        offset_b: usize,
        ld_b: usize,
        beta: impl Into<Scalar>,
        c: &R::Buffer,
        offset_c: usize,
        ld_c: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        ensure_same("A", a.dtype(), "B", b.dtype())?;
        ensure_same("A", a.dtype(), "C", c.dtype())?;
        let precision = precision_for(Routine::Symm, a.dtype())?;

        let args = CallArgs::Symm {
            layout,
            side,
            uplo,
            m,
            n,
            alpha: alpha.into().to_native(precision, "alpha")?,
            a: matrix(a, offset_a, ld_a),
            b: matrix(b, offset_b, ld_b),
            beta: beta.into().to_native(precision, "beta")?,
            c: matrix(c, offset_c, ld_c),
        };
        self.run(Routine::Symm, precision, args, queue, events)
    }

    /// C := alpha * op(A) * op(A)^T + beta * C, C symmetric
    pub fn syrk(
        &self,
        layout: Layout,
        uplo: Uplo,
        trans: Transpose,
        n: usize,
        k: usize,
        alpha: impl Into<Scalar>,
        a: &R::Buffer,
        offset_a: usize,
        ld_a: usize,
        beta: impl Into<Scalar>,
        c: &R::Buffer,
        offset_c: usize,
        ld_c: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        ensure_same("A", a.dtype(), "C", c.dtype())?;
        let trans = transpose_code("trans", trans)?;
        let precision = precision_for(Routine::Syrk, a.dtype())?;

        let args = CallArgs::Syrk {
            layout,
            uplo,
            trans,
            n,
            k,
            alpha: alpha.into().to_native(precision, "alpha")?,
            a: matrix(a, offset_a, ld_a),
            beta: beta.into().to_native(precision, "beta")?,
            c: matrix(c, offset_c, ld_c),
        };
        self.run(Routine::Syrk, precision, args, queue, events)
    }

    /// C := alpha * (op(A) * op(B)^T + op(B) * op(A)^T) + beta * C
    pub fn syr2k(
        &self,
        layout: Layout,
        uplo: Uplo,
        trans: Transpose,
        n: usize,
        k: usize,
        alpha: impl Into<Scalar>,
        a: &R::Buffer,
        offset_a: usize,
        ld_a: usize,
        b: &R::Buffer,
        offset_b: usize,
        ld_b: usize,
        beta: impl Into<Scalar>,
        c: &R::Buffer,
        offset_c: usize,
        ld_c: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        ensure_same("A", a.dtype(), "B", b.dtype())?;
        ensure_same("A", a.dtype(), "C", c.dtype())?;
        let trans = transpose_code("trans", trans)?;
        let precision = precision_for(Routine::Syr2k, a.dtype())?;

        let args = CallArgs::Syr2k {
            layout,
            uplo,
            trans,
            n,
            k,
            alpha: alpha.into().to_native(precision, "alpha")?,
            a: matrix(a, offset_a, ld_a),
            b: matrix(b, offset_b, ld_b),
            beta: beta.into().to_native(precision, "beta")?,
            c: matrix(c, offset_c, ld_c),
        };
        self.run(Routine::Syr2k, precision, args, queue, events)
    }

    /// B := alpha * op(A) * B (or B * op(A)), A triangular
    pub fn trmm(
        &self,
        layout: Layout,
        side: Side,
        uplo: Uplo,
        trans: Transpose,
        diag: Diag,
        m: usize,
        n: usize,
        alpha: impl Into<Scalar>,
        a: &R::Buffer,
        offset_a: usize,
        ld_a: usize,
        b: &R::Buffer,
        offset_b: usize,
        ld_b: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        self.triangular(
            Routine::Trmm,
            layout,
            side,
            uplo,
            trans,
            diag,
            m,
            n,
            alpha.into(),
            a,
            offset_a,
            ld_a,
            b,
            offset_b,
            ld_b,
            queue,
            events,
        )
    }

    /// Solve op(A) * X = alpha * B (or X * op(A)) for X, overwriting B
    pub fn trsm(
        &self,
        layout: Layout,
        side: Side,
        uplo: Uplo,
        trans: Transpose,
        diag: Diag,
        m: usize,
        n: usize,
        alpha: impl Into<Scalar>,
        a: &R::Buffer,
        offset_a: usize,
        ld_a: usize,
        b: &R::Buffer,
        offset_b: usize,
        ld_b: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        self.triangular(
            Routine::Trsm,
            layout,
            side,
            uplo,
            trans,
            diag,
            m,
            n,
            alpha.into(),
            a,
            offset_a,
            ld_a,
            b,
            offset_b,
            ld_b,
            queue,
            events,
        )
    }

    fn triangular(
        &self,
        routine: Routine,
        layout: Layout,
        side: Side,
        uplo: Uplo,
        trans: Transpose,
        diag: Diag,
        m: usize,
        n: usize,
        alpha: Scalar,
        a: &R::Buffer,
        offset_a: usize,
        ld_a: usize,
        b: &R::Buffer,
        offset_b: usize,
        ld_b: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        ensure_same("A", a.dtype(), "B", b.dtype())?;
        let trans = transpose_code("trans", trans)?;
        let precision = precision_for(routine, a.dtype())?;

        let args = CallArgs::Trxm {
            layout,
            side,
            uplo,
            trans,
            diag,
            m,
            n,
            alpha: alpha.to_native(precision, "alpha")?,
            a: matrix(a, offset_a, ld_a),
            b: matrix(b, offset_b, ld_b),
        };
        self.run(routine, precision, args, queue, events)
    }

    /// B := alpha * op(A), out of place
    ///
    /// `Transpose::ConjNoTrans` is rejected.
    pub fn omatcopy(
        &self,
        layout: Layout,
        trans: Transpose,
        m: usize,
        n: usize,
        alpha: impl Into<Scalar>,
        a: &R::Buffer,
        offset_a: usize,
        ld_a: usize,
        b: &R::Buffer,
        offset_b: usize,
        ld_b: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        ensure_same("A", a.dtype(), "B", b.dtype())?;
        let trans = transpose_code("trans", trans)?;
        let precision = precision_for(Routine::Omatcopy, a.dtype())?;

        let args = CallArgs::Omatcopy {
            layout,
            trans,
            m,
            n,
            alpha: alpha.into().to_native(precision, "alpha")?,
            a: matrix(a, offset_a, ld_a),
            b: matrix(b, offset_b, ld_b),
        };
        self.run(Routine::Omatcopy, precision, args, queue, events)
    }
}
