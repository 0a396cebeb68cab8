//! Marshalled arguments of one native routine call
//!
//! Wrappers in [`crate::ops`] validate their inputs and lower them into a
//! [`NativeCall`]; a [`Backend`](super::Backend) turns that into the actual C call.
//! Everything here is plain data: raw handles, offsets, and scalars already in
//! their native layout.

use super::routine::Routine;
use super::types::{cl_command_queue, cl_event, cl_mem, Diag, KernelMode, Layout, Side, Uplo};
use crate::dtype::{NativeScalar, Precision};
use std::ffi::c_int;

/// Strided vector operand: buffer, element offset, increment
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Vector {
    /// Device buffer
    pub mem: cl_mem,
    /// Offset in elements
    pub offset: usize,
    /// Stride in elements
    pub inc: usize,
}

/// Matrix operand: buffer, element offset, leading dimension
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Matrix {
    /// Device buffer
    pub mem: cl_mem,
    /// Offset in elements
    pub offset: usize,
    /// Leading dimension
    pub ld: usize,
}

/// Matrix operand repeated every `stride` elements across a batch
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StridedMatrix {
    /// Device buffer
    pub mem: cl_mem,
    /// Offset of the first matrix in elements
    pub offset: usize,
    /// Leading dimension
    pub ld: usize,
    /// Distance between consecutive matrices in elements
    pub stride: usize,
}

/// Buffer region addressed only by offset (scalar results, rotation parameters,
/// images)
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Region {
    /// Device buffer
    pub mem: cl_mem,
    /// Offset in elements
    pub offset: usize,
}

/// Vector operand with one host-side offset per batch entry
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BatchedVector {
    /// Device buffer
    pub mem: cl_mem,
    /// Host array of `batch_count` offsets
    pub offsets: *const usize,
    /// Stride in elements
    pub inc: usize,
}

/// Matrix operand with one host-side offset per batch entry
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BatchedMatrix {
    /// Device buffer
    pub mem: cl_mem,
    /// Host array of `batch_count` offsets
    pub offsets: *const usize,
    /// Leading dimension
    pub ld: usize,
}

/// Host array of per-batch scalars
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum HostScalars {
    /// `const float*`
    F32(*const f32),
    /// `const double*`
    F64(*const f64),
}

/// Image geometry shared by im2col, col2im and convgemm
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ConvGeometry {
    /// Input channels
    pub channels: usize,
    /// Image height
    pub height: usize,
    /// Image width
    pub width: usize,
    /// Kernel height
    pub kernel_h: usize,
    /// Kernel width
    pub kernel_w: usize,
    /// Padding along the height axis
    pub pad_h: usize,
    /// Padding along the width axis
    pub pad_w: usize,
    /// Stride along the height axis
    pub stride_h: usize,
    /// Stride along the width axis
    pub stride_w: usize,
    /// Dilation along the height axis
    pub dilation_h: usize,
    /// Dilation along the width axis
    pub dilation_w: usize,
}

impl ConvGeometry {
    /// Geometry as handed to CLBlast: the width-axis padding and stride are
    /// replaced by their height-axis values.
    ///
    /// CLBlast 1.5 reads the width-axis padding and stride incorrectly; both axes
    /// must carry the same value for the kernels to produce correct output.
    pub fn mirrored_height_axis(self) -> Self {
        Self {
            pad_w: self.pad_h,
            stride_w: self.stride_h,
            ..self
        }
    }
}

/// Routine arguments in native form, one variant per argument shape
#[derive(Copy, Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum CallArgs {
    /// scal
    Scal {
        n: usize,
        alpha: NativeScalar,
        x: Vector,
    },
    /// axpy
    Axpy {
        n: usize,
        alpha: NativeScalar,
        x: Vector,
        y: Vector,
    },
    /// dot, dotu, dotc
    Dot {
        n: usize,
        result: Region,
        x: Vector,
        y: Vector,
    },
    /// asum, nrm2, iamax, iamin, sum, imax, imin
    Reduce {
        n: usize,
        result: Region,
        x: Vector,
    },
    /// copy, swap
    Pair { n: usize, x: Vector, y: Vector },
    /// rotg
    Rotg {
        a: Region,
        b: Region,
        c: Region,
        s: Region,
    },
    /// rot
    Rot {
        n: usize,
        x: Vector,
        y: Vector,
        cos: NativeScalar,
        sin: NativeScalar,
    },
    /// rotmg
    Rotmg {
        d1: Region,
        d2: Region,
        b1: Region,
        b2: Region,
        param: Region,
    },
    /// rotm
    Rotm {
        n: usize,
        x: Vector,
        y: Vector,
        param: Region,
    },
    /// gemv
    Gemv {
        layout: Layout,
        trans: c_int,
        m: usize,
        n: usize,
        alpha: NativeScalar,
        a: Matrix,
        x: Vector,
        beta: NativeScalar,
        y: Vector,
    },
    /// gemm
    Gemm {
        layout: Layout,
        trans_a: c_int,
        trans_b: c_int,
        m: usize,
        n: usize,
        k: usize,
        alpha: NativeScalar,
        a: Matrix,
        b: Matrix,
        beta: NativeScalar,
        c: Matrix,
    },
    /// symm
    Symm {
        layout: Layout,
        side: Side,
        uplo: Uplo,
        m: usize,
        n: usize,
        alpha: NativeScalar,
        a: Matrix,
        b: Matrix,
        beta: NativeScalar,
        c: Matrix,
    },
    /// syrk
    Syrk {
        layout: Layout,
        uplo: Uplo,
        trans: c_int,
        n: usize,
        k: usize,
        alpha: NativeScalar,
        a: Matrix,
        beta: NativeScalar,
        c: Matrix,
    },
    /// syr2k
    Syr2k {
        layout: Layout,
        uplo: Uplo,
        trans: c_int,
        n: usize,
        k: usize,
        alpha: NativeScalar,
        a: Matrix,
        b: Matrix,
        beta: NativeScalar,
        c: Matrix,
    },
    /// trmm, trsm
    Trxm {
        layout: Layout,
        side: Side,
        uplo: Uplo,
        trans: c_int,
        diag: Diag,
        m: usize,
        n: usize,
        alpha: NativeScalar,
        a: Matrix,
        b: Matrix,
    },
    /// omatcopy
    Omatcopy {
        layout: Layout,
        trans: c_int,
        m: usize,
        n: usize,
        alpha: NativeScalar,
        a: Matrix,
        b: Matrix,
    },
    /// had
    Had {
        n: usize,
        alpha: NativeScalar,
        x: Vector,
        y: Vector,
        beta: NativeScalar,
        z: Vector,
    },
    /// im2col (`src` = image, `dst` = columns) and col2im (`src` = columns,
    /// `dst` = image)
    Im2col {
        mode: KernelMode,
        geometry: ConvGeometry,
        src: Region,
        dst: Region,
    },
    /// convgemm
    Convgemm {
        mode: KernelMode,
        geometry: ConvGeometry,
        num_kernels: usize,
        batch_count: usize,
        im: Region,
        kernel: Region,
        result: Region,
    },
    /// axpyBatched
    AxpyBatched {
        n: usize,
        alphas: HostScalars,
        x: BatchedVector,
        y: BatchedVector,
        batch_count: usize,
    },
    /// gemmBatched
    GemmBatched {
        layout: Layout,
        trans_a: c_int,
        trans_b: c_int,
        m: usize,
        n: usize,
        k: usize,
        alphas: HostScalars,
        a: BatchedMatrix,
        b: BatchedMatrix,
        betas: HostScalars,
        c: BatchedMatrix,
        batch_count: usize,
    },
    /// gemmStridedBatched
    GemmStridedBatched {
        layout: Layout,
        trans_a: c_int,
        trans_b: c_int,
        m: usize,
        n: usize,
        k: usize,
        alpha: NativeScalar,
        a: StridedMatrix,
        b: StridedMatrix,
        beta: NativeScalar,
        c: StridedMatrix,
        batch_count: usize,
    },
}

// SAFETY: CallArgs only carries handles and host pointers by value; it never
// dereferences them. Whoever builds a call keeps the pointees alive until the
// backend returns.
unsafe impl Send for CallArgs {}

/// One fully marshalled routine call
#[derive(Debug)]
pub struct NativeCall {
    /// Routine to invoke
    pub routine: Routine,
    /// Precision variant
    pub precision: Precision,
    /// Routine arguments
    pub args: CallArgs,
    /// Address of the command queue handle
    pub queue: *mut cl_command_queue,
    /// Address of the event slot, or null when no event is requested
    pub event: *mut cl_event,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirrored_height_axis() {
        let g = ConvGeometry {
            channels: 3,
            height: 8,
            width: 6,
            kernel_h: 3,
            kernel_w: 2,
            pad_h: 1,
            pad_w: 0,
            stride_h: 2,
            stride_w: 1,
            dilation_h: 1,
            dilation_w: 2,
        };
        let m = g.mirrored_height_axis();
        assert_eq!((m.pad_h, m.pad_w), (1, 1));
        assert_eq!((m.stride_h, m.stride_w), (2, 2));
        assert_eq!(m.dilation_w, 2);
        assert_eq!(m.kernel_w, 2);
    }
}
