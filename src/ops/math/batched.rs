//! Batched routines
//!
//! `axpy_batched` and `gemm_batched` address each batch entry through host
//! arrays of element offsets (`I64`/`U64`, read natively as `size_t`) and host
//! arrays of per-entry scalars. `gemm_strided_batched` uses one fixed stride per
//! operand instead.

use super::Math;
use crate::dtype::{DType, Precision, Scalar};
use crate::error::{Error, Result};
use crate::native::call::{BatchedMatrix, BatchedVector, CallArgs, HostScalars};
use crate::native::types::{Layout, Transpose};
use crate::native::Routine;
use crate::ops::dispatch::{ensure_all_same, ensure_same, precision_for, strided, transpose_code};
use crate::runtime::{DeviceBuffer, HostBuffer, Runtime};
use std::mem;

fn ensure_positive(arg: &'static str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(Error::invalid_argument(arg, "must be greater than zero"));
    }
    Ok(())
}

/// `offset + batch_count` entries must fit in `buf`.
fn ensure_window<B: HostBuffer + ?Sized>(
    arg: &'static str,
    buf: &B,
    offset: usize,
    batch_count: usize,
) -> Result<()> {
    let end = offset
        .checked_add(batch_count)
        .ok_or_else(|| Error::invalid_argument(arg, "offset + batch_count overflows"))?;
    if end > buf.len() {
        return Err(Error::invalid_argument(
            arg,
            format!(
                "host buffer is too small: {} entries, {end} required",
                buf.len()
            ),
        ));
    }
    Ok(())
}

fn ensure_offsets_dtype<B: HostBuffer + ?Sized>(arg: &'static str, buf: &B) -> Result<()> {
    let dtype = buf.dtype();
    if !matches!(dtype, DType::I64 | DType::U64) {
        return Err(Error::invalid_argument(
            arg,
            format!("offsets must be i64 or u64, got {dtype}"),
        ));
    }
    if dtype.size_in_bytes() != mem::size_of::<usize>() {
        return Err(Error::invalid_argument(
            arg,
            "64-bit offsets do not match the platform size_t",
        ));
    }
    Ok(())
}

/// Address of entry `offset` of an offsets array already checked by
/// [`ensure_window`] and [`ensure_offsets_dtype`].
fn offsets_at<B: HostBuffer + ?Sized>(buf: &B, offset: usize) -> *const usize {
    // SAFETY: offset <= len, so the result is inside the array or one past its
    // end; elements are 64-bit and size_t is 64-bit.
    unsafe { buf.as_ptr().cast::<usize>().add(offset) }
}

/// Address of entry `offset` of a per-batch scalar array whose dtype matches
/// `precision`.
fn scalars_at<B: HostBuffer + ?Sized>(
    arg: &'static str,
    buf: &B,
    offset: usize,
    precision: Precision,
) -> Result<HostScalars> {
    // SAFETY (both arms): the window check bounds offset by len.
    match (precision, buf.dtype()) {
        (Precision::Single, DType::F32) => Ok(HostScalars::F32(unsafe {
            buf.as_ptr().cast::<f32>().add(offset)
        })),
        (Precision::Double, DType::F64) => Ok(HostScalars::F64(unsafe {
            buf.as_ptr().cast::<f64>().add(offset)
        })),
        (precision, dtype) => Err(Error::DTypeMismatch {
            lhs_arg: "device buffers",
            lhs: Some(precision.dtype()),
            rhs_arg: arg,
            rhs: Some(dtype),
        }),
    }
}

impl<R: Runtime> Math<R> {
    /// Y\[i\] := alphas\[i\] * X\[i\] + Y\[i\] for each of `batch_count` entries
    ///
    /// Entry `i` of X starts at `offsets_x[offset_offsets_x + i]` elements; the
    /// same holds for Y and for the scalars in `alphas`.
    pub fn axpy_batched(
        &self,
        n: usize,
        alphas: &(impl HostBuffer + ?Sized),
        offset_alphas: usize,
        x: &R::Buffer,
        offsets_x: &(impl HostBuffer + ?Sized),
        offset_offsets_x: usize,
        inc_x: usize,
        y: &R::Buffer,
        offsets_y: &(impl HostBuffer + ?Sized),
        offset_offsets_y: usize,
        inc_y: usize,
        batch_count: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        ensure_positive("n", n)?;
        ensure_window("alphas", alphas, offset_alphas, batch_count)?;
        ensure_window("offsetsX", offsets_x, offset_offsets_x, batch_count)?;
        ensure_window("offsetsY", offsets_y, offset_offsets_y, batch_count)?;
        ensure_offsets_dtype("offsetsX", offsets_x)?;
        ensure_offsets_dtype("offsetsY", offsets_y)?;
        ensure_same("X", x.dtype(), "Y", y.dtype())?;
        ensure_same("X", x.dtype(), "alphas", Some(alphas.dtype()))?;
        let precision = precision_for(Routine::AxpyBatched, x.dtype())?;

        let args = CallArgs::AxpyBatched {
            n,
            alphas: scalars_at("alphas", alphas, offset_alphas, precision)?,
            x: BatchedVector {
                mem: x.raw(),
                offsets: offsets_at(offsets_x, offset_offsets_x),
                inc: inc_x,
            },
            y: BatchedVector {
                mem: y.raw(),
                offsets: offsets_at(offsets_y, offset_offsets_y),
                inc: inc_y,
            },
            batch_count,
        };
        self.run(Routine::AxpyBatched, precision, args, queue, events)
    }

    /// C\[i\] := alphas\[i\] * op(A\[i\]) * op(B\[i\]) + betas\[i\] * C\[i\] for each of
    /// `batch_count` entries
    pub fn gemm_batched(
        &self,
        layout: Layout,
        trans_a: Transpose,
        trans_b: Transpose,
        m: usize,
        n: usize,
        k: usize,
        alphas: &(impl HostBuffer + ?Sized),
        offset_alphas: usize,
        a: &R::Buffer,
        offsets_a: &(impl HostBuffer + ?Sized),
        offset_offsets_a: usize,
        ld_a: usize,
        b: &R::Buffer,
        offsets_b: &(impl HostBuffer + ?Sized),
        offset_offsets_b: usize,
        ld_b: usize,
        betas: &(impl HostBuffer + ?Sized),
        offset_betas: usize,
        c: &R::Buffer,
        offsets_c: &(impl HostBuffer + ?Sized),
        offset_offsets_c: usize,
        ld_c: usize,
        batch_count: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        ensure_positive("m", m)?;
        ensure_positive("n", n)?;
        ensure_positive("k", k)?;
        ensure_window("alphas", alphas, offset_alphas, batch_count)?;
        ensure_window("offsetsA", offsets_a, offset_offsets_a, batch_count)?;
        ensure_window("offsetsB", offsets_b, offset_offsets_b, batch_count)?;
        ensure_window("betas", betas, offset_betas, batch_count)?;
        ensure_window("offsetsC", offsets_c, offset_offsets_c, batch_count)?;
        ensure_offsets_dtype("offsetsA", offsets_a)?;
        ensure_offsets_dtype("offsetsB", offsets_b)?;
        ensure_offsets_dtype("offsetsC", offsets_c)?;
        ensure_all_same(&[
            ("A", a.dtype()),
            ("B", b.dtype()),
            ("C", c.dtype()),
            ("alphas", Some(alphas.dtype())),
            ("betas", Some(betas.dtype())),
        ])?;
        let trans_a = transpose_code("transA", trans_a)?;
        let trans_b = transpose_code("transB", trans_b)?;
        let precision = precision_for(Routine::GemmBatched, a.dtype())?;

        let args = CallArgs::GemmBatched {
            layout,
            trans_a,
            trans_b,
            m,
            n,
            k,
            alphas: scalars_at("alphas", alphas, offset_alphas, precision)?,
            a: BatchedMatrix {
                mem: a.raw(),
                offsets: offsets_at(offsets_a, offset_offsets_a),
                ld: ld_a,
            },
            b: BatchedMatrix {
                mem: b.raw(),
                offsets: offsets_at(offsets_b, offset_offsets_b),
                ld: ld_b,
            },
            betas: scalars_at("betas", betas, offset_betas, precision)?,
            c: BatchedMatrix {
                mem: c.raw(),
                offsets: offsets_at(offsets_c, offset_offsets_c),
                ld: ld_c,
            },
            batch_count,
        };
        self.run(Routine::GemmBatched, precision, args, queue, events)
    }

    /// C\[i\] := alpha * op(A\[i\]) * op(B\[i\]) + beta * C\[i\], where entry `i` of
    /// each operand starts `i * stride` elements after its offset
    ///
    /// Accepts complex operands.
    pub fn gemm_strided_batched(
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
        stride_a: usize,
        b: &R::Buffer,
        offset_b: usize,
        ld_b: usize,
        stride_b: usize,
        beta: impl Into<Scalar>,
        c: &R::Buffer,
        offset_c: usize,
        ld_c: usize,
        stride_c: usize,
        batch_count: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        ensure_positive("m", m)?;
        ensure_positive("n", n)?;
        ensure_positive("k", k)?;
        ensure_all_same(&[("A", a.dtype()), ("B", b.dtype()), ("C", c.dtype())])?;
        let trans_a = transpose_code("transA", trans_a)?;
        let trans_b = transpose_code("transB", trans_b)?;
        let precision = precision_for(Routine::GemmStridedBatched, a.dtype())?;

        let args = CallArgs::GemmStridedBatched {
            layout,
            trans_a,
            trans_b,
            m,
            n,
            k,
            alpha: alpha.into().to_native(precision, "alpha")?,
            a: strided(a, offset_a, ld_a, stride_a),
            b: strided(b, offset_b, ld_b, stride_b),
            beta: beta.into().to_native(precision, "beta")?,
            c: strided(c, offset_c, ld_c, stride_c),
            batch_count,
        };
        self.run(Routine::GemmStridedBatched, precision, args, queue, events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_bounds() {
        let alphas = vec![1.0f32; 4];
        assert!(ensure_window("alphas", &alphas, 1, 3).is_ok());
        assert!(ensure_window("alphas", &alphas, 2, 3).is_err());
        assert!(ensure_window("alphas", &alphas, usize::MAX, 1).is_err());
        assert!(ensure_window("alphas", &alphas, 4, 0).is_ok());
    }

    #[test]
    fn test_offsets_must_be_64_bit() {
        assert!(ensure_offsets_dtype("offsetsX", &[0u64, 1][..]).is_ok());
        assert!(ensure_offsets_dtype("offsetsX", &[0i64, 1][..]).is_ok());
        let err = ensure_offsets_dtype("offsetsX", &[0i32, 1][..]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { arg: "offsetsX", .. }));
    }

    #[test]
    fn test_offsets_pointer_is_element_aligned() {
        let offsets: Vec<u64> = vec![0, 16, 32, 48];
        let p = offsets_at(&offsets, 2);
        assert_eq!(unsafe { *p }, 32);
    }

    #[test]
    fn test_scalars_follow_precision() {
        let alphas = vec![1.0f64, 2.0, 3.0];
        match scalars_at("alphas", &alphas, 1, Precision::Double).unwrap() {
            HostScalars::F64(p) => assert_eq!(unsafe { *p }, 2.0),
            other => panic!("unexpected {other:?}"),
        }
        assert!(scalars_at("alphas", &alphas, 0, Precision::Single).is_err());
    }
}
