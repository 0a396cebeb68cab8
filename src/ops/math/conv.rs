//! Convolution lowering: im2col, col2im, convgemm
//!
//! All three hand CLBlast a geometry whose width-axis padding and stride equal
//! the height-axis ones, see [`ConvGeometry::mirrored_height_axis`].

use super::{ConvGeometry, Math};
use crate::error::Result;
use crate::native::call::CallArgs;
use crate::native::types::KernelMode;
use crate::native::Routine;
use crate::ops::dispatch::{ensure_same, ensure_same_or_unset, precision_for, region};
use crate::runtime::{DeviceBuffer, Runtime};
use tracing::trace;

fn lowered(routine: Routine, geometry: ConvGeometry) -> ConvGeometry {
    let mirrored = geometry.mirrored_height_axis();
    if mirrored != geometry {
        trace!(
            %routine,
            pad_w = geometry.pad_w,
            stride_w = geometry.stride_w,
            "width-axis padding/stride replaced by height-axis values"
        );
    }
    mirrored
}

impl<R: Runtime> Math<R> {
    /// Unfold image patches of `im` into the column matrix `col`
    pub fn im2col(
        &self,
        mode: KernelMode,
        geometry: ConvGeometry,
        im: &R::Buffer,
        offset_im: usize,
        col: &R::Buffer,
        offset_col: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        ensure_same("im", im.dtype(), "col", col.dtype())?;
        let precision = precision_for(Routine::Im2col, im.dtype())?;

        let args = CallArgs::Im2col {
            mode,
            geometry: lowered(Routine::Im2col, geometry),
            src: region(im, offset_im),
            dst: region(col, offset_col),
        };
        self.run(Routine::Im2col, precision, args, queue, events)
    }

    /// Fold the column matrix `col` back into the image `im`, accumulating
    /// overlapping patches
    pub fn col2im(
        &self,
        mode: KernelMode,
        geometry: ConvGeometry,
        col: &R::Buffer,
        offset_col: usize,
        im: &R::Buffer,
        offset_im: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        ensure_same("im", im.dtype(), "col", col.dtype())?;
        let precision = precision_for(Routine::Col2im, im.dtype())?;

        let args = CallArgs::Im2col {
            mode,
            geometry: lowered(Routine::Col2im, geometry),
            src: region(col, offset_col),
            dst: region(im, offset_im),
        };
        self.run(Routine::Col2im, precision, args, queue, events)
    }

    /// Batched convolution of `im` with `num_kernels` kernels as one GEMM
    pub fn convgemm(
        &self,
        mode: KernelMode,
        geometry: ConvGeometry,
        num_kernels: usize,
        batch_count: usize,
        im: &R::Buffer,
        offset_im: usize,
        kernel: &R::Buffer,
        offset_kernel: usize,
        result: &R::Buffer,
        offset_result: usize,
        queue: &R::Queue,
        events: Option<&mut R::Events>,
    ) -> Result<()> {
        ensure_same("im", im.dtype(), "kernel", kernel.dtype())?;
        ensure_same_or_unset("im", im.dtype(), "result", result.dtype())?;
        let precision = precision_for(Routine::Convgemm, im.dtype())?;

        let args = CallArgs::Convgemm {
            mode,
            geometry: lowered(Routine::Convgemm, geometry),
            num_kernels,
            batch_count,
            im: region(im, offset_im),
            kernel: region(kernel, offset_kernel),
            result: region(result, offset_result),
        };
        self.run(Routine::Convgemm, precision, args, queue, events)
    }
}
