//! Binding against a shared library that exports none of CLBlast's symbols
//!
//! `libm` binds like any other candidate, which lets the loader bookkeeping and
//! the complex calling strategy run without a GPU stack. Every test goes through
//! [`bound`], so the binary's first bind attempt is always the missing library,
//! followed by the stand-in with the shim strategy and no shim.
#![cfg(all(target_os = "linux", target_env = "gnu"))]

mod common;

use clblast::native::Routine;
use clblast::{ComplexPolicy, Precision};
use clblast::prelude::*;
use common::{buf, queue, MockRuntime};
use std::sync::OnceLock;

const STAND_IN: &str = "libm.so.6";

fn missing_library() -> LoaderConfig {
    LoaderConfig::new().library_path("/nonexistent/clblast/libclblast.so")
}

fn stand_in() -> LoaderConfig {
    LoaderConfig::new()
        .library_path(STAND_IN)
        .shim_path("/nonexistent/rindow/librindowclblast.so")
        .complex_policy(ComplexPolicy::Shim)
}

fn bound() -> &'static ClBlast {
    static BOUND: OnceLock<ClBlast> = OnceLock::new();
    BOUND.get_or_init(|| {
        assert!(!ClBlast::with_config(&missing_library()).is_available());
        ClBlast::with_config(&stand_in())
    })
}

fn gemm(blas: &Blas<MockRuntime>, dtype: DType) -> Result<()> {
    let a = buf(1, dtype);
    let b = buf(2, dtype);
    let c = buf(3, dtype);
    blas.gemm(
        Layout::RowMajor,
        Transpose::NoTrans,
        Transpose::NoTrans,
        2,
        2,
        2,
        1.0,
        &a,
        0,
        2,
        &b,
        0,
        2,
        0.0,
        &c,
        0,
        2,
        &queue(),
        None,
    )
}

#[test]
fn test_bind_succeeds_after_failed_attempt() {
    let clblast = bound();
    assert!(clblast.is_available());
    assert_eq!(clblast.library().unwrap().path(), STAND_IN);
    assert_eq!(ClBlast::load_attempts(), 2);

    // once bound, other configurations are ignored and nothing is reloaded
    let again = ClBlast::with_config(&missing_library());
    assert!(again.is_available());
    assert_eq!(again.library().unwrap().path(), STAND_IN);
    assert_eq!(ClBlast::load_attempts(), 2);
}

#[test]
fn test_stand_in_exports_no_routines() {
    let library = bound().library().unwrap();
    assert_eq!(library.symbol_count(), 0);
    assert!(!library.has_symbol(Routine::Gemm, Precision::Single));
    assert!(!library.has_symbol(Routine::Dotu, Precision::ComplexSingle));
    assert!(matches!(
        bound().clear_cache(),
        Err(Error::SymbolNotFound {
            symbol: "CLBlastClearCache"
        })
    ));
}

#[test]
fn test_complex_scalars_need_the_shim() {
    let clblast = bound();
    assert_eq!(clblast.library().unwrap().complex_path().name(), "shim (unavailable)");
    let blas = clblast.blas::<MockRuntime>().unwrap();

    for dtype in [DType::Complex64, DType::Complex128] {
        assert!(matches!(
            gemm(&blas, dtype),
            Err(Error::ShimUnavailable { routine: "gemm" })
        ));
    }
    let x = buf(4, DType::Complex64);
    assert!(matches!(
        blas.scal(4, 2.0, &x, 0, 1, &queue(), None),
        Err(Error::ShimUnavailable { routine: "scal" })
    ));
}

#[test]
fn test_routines_without_shim_go_to_clblast() {
    let blas = bound().blas::<MockRuntime>().unwrap();

    let r = buf(5, DType::Complex64);
    let x = buf(6, DType::Complex64);
    let y = buf(7, DType::Complex64);
    assert!(matches!(
        blas.dotu(4, &r, 0, &x, 0, 1, &y, 0, 1, &queue(), None),
        Err(Error::SymbolNotFound {
            symbol: "CLBlastCdotu"
        })
    ));

    // real precisions never consult the complex strategy
    assert!(matches!(
        gemm(&blas, DType::F32),
        Err(Error::SymbolNotFound {
            symbol: "CLBlastSgemm"
        })
    ));
}
