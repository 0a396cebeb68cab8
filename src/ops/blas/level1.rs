//! Level 1: vector-vector routines

use super::Blas;
use crate::dtype::{DType, Scalar};
use crate::error::{Error, Result};
use crate::native::call::CallArgs;
use crate::native::types::Status;
use crate::native::Routine;
use crate::ops::dispatch::{
    ensure_all_same, ensure_same, ensure_same_or_unset, precision_for, region, vector,
};
use crate::runtime::{DeviceBuffer, Runtime};
use tracing::debug;

/// A real-valued result buffer (asum, nrm2) may hold X's dtype or, for complex
/// X, its component type; an undeclared result matches anything.
fn ensure_real_result(x: Option<DType>, r: Option<DType>) -> Result<()> {
    match (x, r) {
        (Some(x), Some(r)) if x.is_complex() && r == x.real_dtype() => Ok(()),
        _ => ensure_same_or_unset("X", x, "R", r),
    }
}

impl<R: Runtime> Blas<R> {
    /// X := alpha * X
    pub fn scal(
        &self,
        n: usize,
        alpha: impl Into<Scalar>,
        x: &R::Buffer,
        offset_x: usize,
        inc_x: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        let precision = precision_for(Routine::Scal, x.dtype())?;
        let args = CallArgs::Scal {
            n,
            alpha: alpha.into().to_native(precision, "alpha")?,
            x: vector(x, offset_x, inc_x),
        };
        self.run(Routine::Scal, precision, args, queue, events)
    }

    /// Y := alpha * X + Y
    pub fn axpy(
        &self,
        n: usize,
        alpha: impl Into<Scalar>,
        x: &R::Buffer,
        offset_x: usize,
        inc_x: usize,
        y: &R::Buffer,
        offset_y: usize,
        inc_y: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        ensure_same("X", x.dtype(), "Y", y.dtype())?;
        let precision = precision_for(Routine::Axpy, x.dtype())?;
        let args = CallArgs::Axpy {
            n,
            alpha: alpha.into().to_native(precision, "alpha")?,
            x: vector(x, offset_x, inc_x),
            y: vector(y, offset_y, inc_y),
        };
        self.run(Routine::Axpy, precision, args, queue, events)
    }

    /// R := X . Y (real dtypes)
    pub fn dot(
        &self,
        n: usize,
        r: &R::Buffer,
        offset_r: usize,
        x: &R::Buffer,
        offset_x: usize,
        inc_x: usize,
        y: &R::Buffer,
        offset_y: usize,
        inc_y: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        self.dot_routine(
            Routine::Dot,
            n,
            r,
            offset_r,
            x,
            offset_x,
            inc_x,
            y,
            offset_y,
            inc_y,
            queue,
            events,
        )
    }

    /// R := X . Y without conjugation (complex dtypes)
    pub fn dotu(
        &self,
        n: usize,
        r: &R::Buffer,
        offset_r: usize,
        x: &R::Buffer,
        offset_x: usize,
        inc_x: usize,
        y: &R::Buffer,
        offset_y: usize,
        inc_y: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        self.dot_routine(
            Routine::Dotu,
            n,
            r,
            offset_r,
            x,
            offset_x,
            inc_x,
            y,
            offset_y,
            inc_y,
            queue,
            events,
        )
    }

    /// R := conj(X) . Y (complex dtypes)
    pub fn dotc(
        &self,
        n: usize,
        r: &R::Buffer,
        offset_r: usize,
        x: &R::Buffer,
        offset_x: usize,
        inc_x: usize,
        y: &R::Buffer,
        offset_y: usize,
        inc_y: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        self.dot_routine(
            Routine::Dotc,
            n,
            r,
            offset_r,
            x,
            offset_x,
            inc_x,
            y,
            offset_y,
            inc_y,
            queue,
            events,
        )
    }

    fn dot_routine(
        &self,
        routine: Routine,
        n: usize,
        r: &R::Buffer,
        offset_r: usize,
        x: &R::Buffer,
        offset_x: usize,
        inc_x: usize,
        y: &R::Buffer,
        offset_y: usize,
        inc_y: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        ensure_same("X", x.dtype(), "Y", y.dtype())?;
        ensure_same_or_unset("X", x.dtype(), "R", r.dtype())?;
        let precision = precision_for(routine, x.dtype())?;
        let args = CallArgs::Dot {
            n,
            result: region(r, offset_r),
            x: vector(x, offset_x, inc_x),
            y: vector(y, offset_y, inc_y),
        };
        self.run(routine, precision, args, queue, events)
    }

    /// R := sum(|Re(X)| + |Im(X)|)
    pub fn asum(
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
        ensure_real_result(x.dtype(), r.dtype())?;
        self.reduce(Routine::Asum, n, r, offset_r, x, offset_x, inc_x, queue, events)
    }

    /// R := ||X||_2
    pub fn nrm2(
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
        ensure_real_result(x.dtype(), r.dtype())?;
        self.reduce(Routine::Nrm2, n, r, offset_r, x, offset_x, inc_x, queue, events)
    }

    /// R := index of max |X|
    pub fn iamax(
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
        self.reduce(Routine::Iamax, n, r, offset_r, x, offset_x, inc_x, queue, events)
    }

    /// R := index of min |X|
    pub fn iamin(
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
        self.reduce(Routine::Iamin, n, r, offset_r, x, offset_x, inc_x, queue, events)
    }

    /// Single-vector reduction into `r`; dtype checks are the caller's.
    pub(crate) fn reduce(
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

    /// Y := X
    ///
    /// Element types without a CLBlast copy routine (integers, f16, ...) fall
    /// back to [`Runtime::copy_buffer`], which requires unit increments.
    pub fn copy(
        &self,
        n: usize,
        x: &R::Buffer,
        offset_x: usize,
        inc_x: usize,
        y: &R::Buffer,
        offset_y: usize,
        inc_y: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        ensure_same("X", x.dtype(), "Y", y.dtype())?;

        let Some(precision) = x.dtype().and_then(DType::precision) else {
            return self.copy_fallback(n, x, offset_x, inc_x, y, offset_y, inc_y, queue, events);
        };
        let args = CallArgs::Pair {
            n,
            x: vector(x, offset_x, inc_x),
            y: vector(y, offset_y, inc_y),
        };
        self.run(Routine::Copy, precision, args, queue, events)
    }

    fn copy_fallback(
        &self,
        n: usize,
        x: &R::Buffer,
        offset_x: usize,
        inc_x: usize,
        y: &R::Buffer,
        offset_y: usize,
        inc_y: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        if inc_x != 1 {
            return Err(Error::invalid_argument(
                "incX",
                "device buffer copy does not support increments other than 1",
            ));
        }
        if inc_y != 1 {
            return Err(Error::invalid_argument(
                "incY",
                "device buffer copy does not support increments other than 1",
            ));
        }

        let value_size = x.value_size();
        let bytes = byte_len("n", n, value_size)?;
        let src_offset = byte_len("offsetX", offset_x, value_size)?;
        let dst_offset = byte_len("offsetY", offset_y, value_size)?;
        debug!(
            dtype = ?x.dtype(),
            runtime = R::name(),
            bytes,
            "copy without a CLBlast routine, using device buffer copy"
        );
        R::copy_buffer(queue, x, y, bytes, src_offset, dst_offset, events).map_err(|e| match e {
            Error::OpenCl { code, .. } => Error::Native {
                op: Routine::Copy.name(),
                status: Status(code),
            },
            other => other,
        })
    }

    /// X <-> Y
    pub fn swap(
        &self,
        n: usize,
        x: &R::Buffer,
        offset_x: usize,
        inc_x: usize,
        y: &R::Buffer,
        offset_y: usize,
        inc_y: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        ensure_same("X", x.dtype(), "Y", y.dtype())?;
        let precision = precision_for(Routine::Swap, x.dtype())?;
        let args = CallArgs::Pair {
            n,
            x: vector(x, offset_x, inc_x),
            y: vector(y, offset_y, inc_y),
        };
        self.run(Routine::Swap, precision, args, queue, events)
    }

    /// Construct a Givens plane rotation from (A, B), writing C and S
    pub fn rotg(
        &self,
        a: &R::Buffer,
        offset_a: usize,
        b: &R::Buffer,
        offset_b: usize,
        c: &R::Buffer,
        offset_c: usize,
        s: &R::Buffer,
        offset_s: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        ensure_all_same(&[
            ("A", a.dtype()),
            ("B", b.dtype()),
            ("C", c.dtype()),
            ("S", s.dtype()),
        ])?;
        let precision = precision_for(Routine::Rotg, a.dtype())?;
        let args = CallArgs::Rotg {
            a: region(a, offset_a),
            b: region(b, offset_b),
            c: region(c, offset_c),
            s: region(s, offset_s),
        };
        self.run(Routine::Rotg, precision, args, queue, events)
    }

    /// Apply a plane rotation to (X, Y)
    pub fn rot(
        &self,
        n: usize,
        x: &R::Buffer,
        offset_x: usize,
        inc_x: usize,
        y: &R::Buffer,
        offset_y: usize,
        inc_y: usize,
        cos: f64,
        sin: f64,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        ensure_same("X", x.dtype(), "Y", y.dtype())?;
        let precision = precision_for(Routine::Rot, x.dtype())?;
        let args = CallArgs::Rot {
            n,
            x: vector(x, offset_x, inc_x),
            y: vector(y, offset_y, inc_y),
            cos: Scalar::Real(cos).to_native(precision, "cos")?,
            sin: Scalar::Real(sin).to_native(precision, "sin")?,
        };
        self.run(Routine::Rot, precision, args, queue, events)
    }

    /// Construct a modified Givens rotation, writing its parameters into P
    pub fn rotmg(
        &self,
        d1: &R::Buffer,
        offset_d1: usize,
        d2: &R::Buffer,
        offset_d2: usize,
        b1: &R::Buffer,
        offset_b1: usize,
        b2: &R::Buffer,
        offset_b2: usize,
        p: &R::Buffer,
        offset_p: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        ensure_all_same(&[
            ("D1", d1.dtype()),
            ("D2", d2.dtype()),
            ("B1", b1.dtype()),
            ("B2", b2.dtype()),
            ("P", p.dtype()),
        ])?;
        let precision = precision_for(Routine::Rotmg, d1.dtype())?;
        let args = CallArgs::Rotmg {
            d1: region(d1, offset_d1),
            d2: region(d2, offset_d2),
            b1: region(b1, offset_b1),
            b2: region(b2, offset_b2),
            param: region(p, offset_p),
        };
        self.run(Routine::Rotmg, precision, args, queue, events)
    }

    /// Apply the modified rotation described by P to (X, Y)
    pub fn rotm(
        &self,
        n: usize,
        x: &R::Buffer,
        offset_x: usize,
        inc_x: usize,
        y: &R::Buffer,
        offset_y: usize,
        inc_y: usize,
        p: &R::Buffer,
        offset_p: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        ensure_same("X", x.dtype(), "Y", y.dtype())?;
        ensure_same_or_unset("X", x.dtype(), "P", p.dtype())?;
        let precision = precision_for(Routine::Rotm, x.dtype())?;
        let args = CallArgs::Rotm {
            n,
            x: vector(x, offset_x, inc_x),
            y: vector(y, offset_y, inc_y),
            param: region(p, offset_p),
        };
        self.run(Routine::Rotm, precision, args, queue, events)
    }
}

fn byte_len(arg: &'static str, count: usize, value_size: usize) -> Result<usize> {
    count
        .checked_mul(value_size)
        .ok_or_else(|| Error::invalid_argument(arg, "byte size overflows usize"))
}
