//! Extension routine dispatch tests: batched preconditions, convolution geometry

mod common;

use clblast::dtype::{Complex64, DType, NativeScalar, Precision};
use clblast::native::call::{HostScalars, Region};
use clblast::native::types::{KernelMode, Layout, Transpose};
use clblast::native::{CallArgs, Routine};
use clblast::{ConvGeometry, Error, Math};
use common::*;

fn geometry() -> ConvGeometry {
    ConvGeometry {
        channels: 3,
        height: 8,
        width: 8,
        kernel_h: 3,
        kernel_w: 3,
        pad_h: 1,
        pad_w: 0,
        stride_h: 2,
        stride_w: 1,
        dilation_h: 1,
        dilation_w: 1,
    }
}

fn invalid_arg(err: &Error) -> &'static str {
    match err {
        Error::InvalidArgument { arg, .. } => *arg,
        other => panic!("expected InvalidArgument, got {other}"),
    }
}

// ============================================================================
// Reductions and hadamard
// ============================================================================

#[test]
fn test_sum_dispatches_reduce() {
    let spy = SpyBackend::new();
    let x = buf(1, DType::F64);
    let r = buf(2, DType::F64);
    math(&spy)
        .sum(16, &r, 1, &x, 0, 2, &queue(), None)
        .unwrap();
    let call = spy.last();
    assert_eq!(call.routine, Routine::Sum);
    assert_eq!(call.precision, Precision::Double);
    assert!(matches!(
        call.args,
        CallArgs::Reduce {
            n: 16,
            result: Region { offset: 1, .. },
            ..
        }
    ));
}

#[test]
fn test_extensions_reject_complex() {
    let spy = SpyBackend::new();
    let m = math(&spy);
    let q = queue();
    let z = buf(1, DType::Complex64);
    let r = buf(2, DType::I32);

    assert_rejected(m.sum(4, &z, 0, &z, 0, 1, &q, None), &spy);
    assert_rejected(m.imax(4, &r, 0, &z, 0, 1, &q, None), &spy);
    assert_rejected(m.imin(4, &r, 0, &z, 0, 1, &q, None), &spy);
    let err = assert_rejected(
        m.hadamard(4, 1.0, &z, 0, 1, &z, 0, 1, 0.0, &z, 0, 1, &q, None),
        &spy,
    );
    assert!(matches!(err, Error::UnsupportedDType { op: "had", .. }));
    assert_rejected(
        m.im2col(KernelMode::CrossCorrelation, geometry(), &z, 0, &z, 0, &q, None),
        &spy,
    );
}

#[test]
fn test_hadamard_checks_operands() {
    let spy = SpyBackend::new();
    let m = math(&spy);
    let q = queue();
    let x = buf(1, DType::F32);
    let y = buf(2, DType::F64);
    let z = MockBuffer::untyped(3, 4);

    assert_rejected(
        m.hadamard(4, 1.0, &x, 0, 1, &y, 0, 1, 0.0, &x, 0, 1, &q, None),
        &spy,
    );
    m.hadamard(4, 1.0, &x, 0, 1, &x, 0, 1, 0.5, &z, 0, 1, &q, None)
        .unwrap();
    assert!(matches!(
        spy.last().args,
        CallArgs::Had {
            alpha: NativeScalar::F32(_),
            beta: NativeScalar::F32(_),
            ..
        }
    ));
}

// ============================================================================
// Convolution lowering
// ============================================================================

#[test]
fn test_conv_routines_mirror_height_axis() {
    let spy = SpyBackend::new();
    let m = math(&spy);
    let q = queue();
    let im = buf(1, DType::F32);
    let col = buf(2, DType::F32);
    let kernel = buf(3, DType::F32);
    let result = buf(4, DType::F32);

    m.im2col(KernelMode::CrossCorrelation, geometry(), &im, 0, &col, 0, &q, None)
        .unwrap();
    m.col2im(KernelMode::Convolution, geometry(), &col, 0, &im, 0, &q, None)
        .unwrap();
    m.convgemm(
        KernelMode::CrossCorrelation,
        geometry(),
        16,
        2,
        &im,
        0,
        &kernel,
        0,
        &result,
        0,
        &q,
        None,
    )
    .unwrap();

    let calls = spy.calls();
    assert_eq!(calls.len(), 3);
    for call in &calls {
        let g = match call.args {
            CallArgs::Im2col { geometry, .. } | CallArgs::Convgemm { geometry, .. } => geometry,
            other => panic!("unexpected args {other:?}"),
        };
        assert_eq!((g.pad_h, g.pad_w), (1, 1), "{}", call.routine);
        assert_eq!((g.stride_h, g.stride_w), (2, 2), "{}", call.routine);
        assert_eq!(g.width, 8);
    }
    assert_eq!(calls[0].routine, Routine::Im2col);
    assert_eq!(calls[1].routine, Routine::Col2im);
    assert_eq!(calls[2].routine, Routine::Convgemm);
}

#[test]
fn test_col2im_reads_columns_writes_image() {
    let spy = SpyBackend::new();
    let im = buf(1, DType::F64);
    let col = buf(2, DType::F64);
    math(&spy)
        .col2im(KernelMode::Convolution, geometry(), &col, 5, &im, 7, &queue(), None)
        .unwrap();
    match spy.last().args {
        CallArgs::Im2col { mode, src, dst, .. } => {
            assert_eq!(mode, KernelMode::Convolution);
            assert_eq!((src.mem, src.offset), (col.mem(), 5));
            assert_eq!((dst.mem, dst.offset), (im.mem(), 7));
        }
        other => panic!("unexpected args {other:?}"),
    }
}

#[test]
fn test_conv_dtype_checks() {
    let spy = SpyBackend::new();
    let m = math(&spy);
    let q = queue();
    let im = buf(1, DType::F32);
    let col = buf(2, DType::F64);

    let err = assert_rejected(
        m.im2col(KernelMode::CrossCorrelation, geometry(), &im, 0, &col, 0, &q, None),
        &spy,
    );
    assert!(matches!(
        err,
        Error::DTypeMismatch {
            lhs_arg: "im",
            rhs_arg: "col",
            ..
        }
    ));
    assert_rejected(
        m.convgemm(
            KernelMode::CrossCorrelation,
            geometry(),
            4,
            1,
            &im,
            0,
            &col,
            0,
            &im,
            0,
            &q,
            None,
        ),
        &spy,
    );
}

// ============================================================================
// axpyBatched
// ============================================================================

struct AxpyBatch {
    n: usize,
    alphas: Vec<f32>,
    offset_alphas: usize,
    offsets_x: Vec<u64>,
    offset_offsets_x: usize,
    offsets_y: Vec<i64>,
    offset_offsets_y: usize,
    batch_count: usize,
}

impl AxpyBatch {
    fn valid() -> Self {
        Self {
            n: 4,
            alphas: vec![1.0, 2.0, 3.0],
            offset_alphas: 1,
            offsets_x: vec![0, 4, 8],
            offset_offsets_x: 1,
            offsets_y: vec![0, 4, 8, 12],
            offset_offsets_y: 2,
            batch_count: 2,
        }
    }

    fn run(&self, m: &Math<MockRuntime>, x: &MockBuffer, y: &MockBuffer) -> clblast::Result<()> {
        m.axpy_batched(
            self.n,
            &self.alphas,
            self.offset_alphas,
            x,
            &self.offsets_x,
            self.offset_offsets_x,
            1,
            y,
            &self.offsets_y,
            self.offset_offsets_y,
            1,
            self.batch_count,
            &queue(),
            None,
        )
    }
}

#[test]
fn test_axpy_batched_forwards_offset_pointers() {
    let spy = SpyBackend::new();
    let x = buf(1, DType::F32);
    let y = buf(2, DType::F32);
    let batch = AxpyBatch::valid();

    batch.run(&math(&spy), &x, &y).unwrap();

    assert_eq!(spy.call_count(), 1);
    let call = spy.last();
    assert_eq!(call.routine, Routine::AxpyBatched);
    assert_eq!(call.precision, Precision::Single);
    match call.args {
        CallArgs::AxpyBatched {
            n,
            alphas: HostScalars::F32(alphas),
            x: bx,
            y: by,
            batch_count,
        } => {
            assert_eq!(n, 4);
            assert_eq!(batch_count, 2);
            assert_eq!(alphas, batch.alphas[1..].as_ptr());
            assert_eq!(bx.offsets, batch.offsets_x[1..].as_ptr().cast::<usize>());
            assert_eq!(by.offsets, batch.offsets_y[2..].as_ptr().cast::<usize>());
            assert_eq!(bx.mem, x.mem());
            assert_eq!(by.mem, y.mem());
        }
        other => panic!("unexpected args {other:?}"),
    }
}

#[test]
fn test_axpy_batched_preconditions_name_the_argument() {
    let x = buf(1, DType::F32);
    let y = buf(2, DType::F32);

    let cases: Vec<(&str, Box<dyn Fn(&mut AxpyBatch)>)> = vec![
        ("n", Box::new(|b: &mut AxpyBatch| b.n = 0)),
        ("alphas", Box::new(|b: &mut AxpyBatch| b.offset_alphas = 2)),
        ("offsetsX", Box::new(|b: &mut AxpyBatch| b.offsets_x.truncate(2))),
        ("offsetsY", Box::new(|b: &mut AxpyBatch| b.offset_offsets_y = usize::MAX)),
        ("alphas", Box::new(|b: &mut AxpyBatch| b.batch_count = 3)),
    ];
    for (expected, mutate) in cases {
        let spy = SpyBackend::new();
        let mut batch = AxpyBatch::valid();
        mutate(&mut batch);
        let err = assert_rejected(batch.run(&math(&spy), &x, &y), &spy);
        assert_eq!(invalid_arg(&err), expected);
    }
}

#[test]
fn test_axpy_batched_offsets_must_be_64_bit() {
    let spy = SpyBackend::new();
    let x = buf(1, DType::F32);
    let y = buf(2, DType::F32);
    let offsets_x: Vec<i32> = vec![0, 4];
    let offsets_y: Vec<u64> = vec![0, 4];

    let err = assert_rejected(
        math(&spy).axpy_batched(
            4,
            &[1.0f32, 1.0][..],
            0,
            &x,
            &offsets_x,
            0,
            1,
            &y,
            &offsets_y,
            0,
            1,
            2,
            &queue(),
            None,
        ),
        &spy,
    );
    assert_eq!(invalid_arg(&err), "offsetsX");
}

#[test]
fn test_axpy_batched_alphas_follow_device_dtype() {
    let spy = SpyBackend::new();
    let x = buf(1, DType::F64);
    let y = buf(2, DType::F64);
    let batch = AxpyBatch::valid();

    let err = assert_rejected(batch.run(&math(&spy), &x, &y), &spy);
    assert!(matches!(
        err,
        Error::DTypeMismatch {
            rhs_arg: "alphas",
            ..
        }
    ));
}

#[test]
fn test_empty_batch_is_dispatched() {
    let spy = SpyBackend::new();
    let x = buf(1, DType::F32);
    let y = buf(2, DType::F32);
    let mut batch = AxpyBatch::valid();
    batch.batch_count = 0;
    batch.offset_alphas = 3;
    batch.run(&math(&spy), &x, &y).unwrap();
    assert_eq!(spy.call_count(), 1);
}

// ============================================================================
// gemmBatched / gemmStridedBatched
// ============================================================================

#[test]
fn test_gemm_batched_forwards_per_batch_arrays() {
    let spy = SpyBackend::new();
    let a = buf(1, DType::F64);
    let b = buf(2, DType::F64);
    let c = buf(3, DType::F64);
    let alphas = vec![1.0f64, 2.0];
    let betas = vec![0.0f64, 0.5];
    let offsets: Vec<u64> = vec![0, 16];

    math(&spy)
        .gemm_batched(
            Layout::RowMajor,
            Transpose::NoTrans,
            Transpose::Trans,
            4,
            4,
            4,
            &alphas,
            0,
            &a,
            &offsets,
            0,
            4,
            &b,
            &offsets,
            0,
            4,
            &betas,
            0,
            &c,
            &offsets,
            0,
            4,
            2,
            &queue(),
            None,
        )
        .unwrap();

    match spy.last().args {
        CallArgs::GemmBatched {
            trans_a,
            trans_b,
            alphas: HostScalars::F64(al),
            betas: HostScalars::F64(be),
            a: ba,
            c: bc,
            batch_count,
            ..
        } => {
            assert_eq!((trans_a, trans_b), (111, 112));
            assert_eq!(al, alphas.as_ptr());
            assert_eq!(be, betas.as_ptr());
            assert_eq!(ba.offsets, offsets.as_ptr().cast::<usize>());
            assert_eq!(bc.ld, 4);
            assert_eq!(batch_count, 2);
        }
        other => panic!("unexpected args {other:?}"),
    }
}

#[test]
fn test_gemm_batched_preconditions() {
    let spy = SpyBackend::new();
    let m = math(&spy);
    let a = buf(1, DType::F32);
    let alphas = vec![1.0f32; 2];
    let short_betas = vec![0.0f32; 1];
    let offsets: Vec<i64> = vec![0, 16];

    let err = assert_rejected(
        m.gemm_batched(
            Layout::RowMajor,
            Transpose::NoTrans,
            Transpose::NoTrans,
            4,
            0,
            4,
            &alphas,
            0,
            &a,
            &offsets,
            0,
            4,
            &a,
            &offsets,
            0,
            4,
            &alphas,
            0,
            &a,
            &offsets,
            0,
            4,
            2,
            &queue(),
            None,
        ),
        &spy,
    );
    assert_eq!(invalid_arg(&err), "n");

    let err = assert_rejected(
        m.gemm_batched(
            Layout::RowMajor,
            Transpose::NoTrans,
            Transpose::NoTrans,
            4,
            4,
            4,
            &alphas,
            0,
            &a,
            &offsets,
            0,
            4,
            &a,
            &offsets,
            0,
            4,
            &short_betas,
            0,
            &a,
            &offsets,
            0,
            4,
            2,
            &queue(),
            None,
        ),
        &spy,
    );
    assert_eq!(invalid_arg(&err), "betas");

    let err = assert_rejected(
        m.gemm_batched(
            Layout::RowMajor,
            Transpose::ConjNoTrans,
            Transpose::NoTrans,
            4,
            4,
            4,
            &alphas,
            0,
            &a,
            &offsets,
            0,
            4,
            &a,
            &offsets,
            0,
            4,
            &alphas,
            0,
            &a,
            &offsets,
            0,
            4,
            2,
            &queue(),
            None,
        ),
        &spy,
    );
    assert_eq!(invalid_arg(&err), "transA");
}

#[test]
fn test_gemm_strided_batched_accepts_complex() {
    let spy = SpyBackend::new();
    let a = buf(1, DType::Complex64);
    let b = buf(2, DType::Complex64);
    let c = buf(3, DType::Complex64);

    math(&spy)
        .gemm_strided_batched(
            Layout::ColMajor,
            Transpose::ConjTrans,
            Transpose::NoTrans,
            2,
            2,
            2,
            Complex64::new(0.0, 1.0),
            &a,
            0,
            2,
            4,
            &b,
            0,
            2,
            4,
            0.0,
            &c,
            0,
            2,
            4,
            8,
            &queue(),
            None,
        )
        .unwrap();

    let call = spy.last();
    assert_eq!(call.precision, Precision::ComplexSingle);
    match call.args {
        CallArgs::GemmStridedBatched {
            alpha: NativeScalar::C64(al),
            beta: NativeScalar::C64(be),
            a: sa,
            batch_count: 8,
            ..
        } => {
            assert_eq!(al.s, [0.0, 1.0]);
            assert_eq!(be.s, [0.0, 0.0]);
            assert_eq!(sa.stride, 4);
        }
        other => panic!("unexpected args {other:?}"),
    }
}

#[test]
fn test_gemm_strided_batched_rejects_zero_k() {
    let spy = SpyBackend::new();
    let a = buf(1, DType::F32);
    let err = assert_rejected(
        math(&spy).gemm_strided_batched(
            Layout::RowMajor,
            Transpose::NoTrans,
            Transpose::NoTrans,
            2,
            2,
            0,
            1.0,
            &a,
            0,
            2,
            4,
            &a,
            0,
            2,
            4,
            0.0,
            &a,
            0,
            2,
            4,
            1,
            &queue(),
            None,
        ),
        &spy,
    );
    assert_eq!(invalid_arg(&err), "k");
}
