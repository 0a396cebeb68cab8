//! The dynamically loaded CLBlast library
//!
//! All symbols of the capability table are resolved once when the library is
//! bound and kept as untyped function pointers. A call looks its symbol up by
//! `(Routine, Precision)` and casts it to the routine's C signature; the scalar
//! type parameter of each signature is chosen from the call's [`NativeScalar`]s.

use super::backend::Backend;
use super::call::{CallArgs, HostScalars, NativeCall};
use super::routine::Routine;
use super::shim::{ComplexPath, ComplexTarget};
use super::types::{cl_command_queue, cl_device_id, cl_event, cl_mem, ClDouble2, ClFloat2, Status};
use crate::dtype::{NativeScalar, Precision};
use crate::error::{Error, Result};
use libloading::Library;
use std::collections::HashMap;
use std::ffi::{c_int, c_void};
use std::fmt;
use tracing::{debug, trace};

/// Untyped native entry point
pub(crate) type AnyFn = unsafe extern "C" fn();

type Q = *mut cl_command_queue;
type E = *mut cl_event;

// Native signatures. `A` is the by-value scalar type: f32, f64, cl_float2,
// cl_double2, or `*const c_void` when calling through the shim.
type ScalFn<A> = unsafe extern "C" fn(usize, A, cl_mem, usize, usize, Q, E) -> c_int;
type AxpyFn<A> =
    unsafe extern "C" fn(usize, A, cl_mem, usize, usize, cl_mem, usize, usize, Q, E) -> c_int;
type DotFn = unsafe extern "C" fn(
    usize, cl_mem, usize, cl_mem, usize, usize, cl_mem, usize, usize, Q, E,
) -> c_int;
type ReduceFn = unsafe extern "C" fn(usize, cl_mem, usize, cl_mem, usize, usize, Q, E) -> c_int;
type PairFn =
    unsafe extern "C" fn(usize, cl_mem, usize, usize, cl_mem, usize, usize, Q, E) -> c_int;
type RotgFn = unsafe extern "C" fn(
    cl_mem, usize, cl_mem, usize, cl_mem, usize, cl_mem, usize, Q, E,
) -> c_int;
type RotFn<A> =
    unsafe extern "C" fn(usize, cl_mem, usize, usize, cl_mem, usize, usize, A, A, Q, E) -> c_int;
type RotmgFn = unsafe extern "C" fn(
    cl_mem, usize, cl_mem, usize, cl_mem, usize, cl_mem, usize, cl_mem, usize, Q, E,
) -> c_int;
type RotmFn = unsafe extern "C" fn(
    usize, cl_mem, usize, usize, cl_mem, usize, usize, cl_mem, usize, Q, E,
) -> c_int;
type GemvFn<A> = unsafe extern "C" fn(
    c_int, c_int, usize, usize, A, cl_mem, usize, usize, cl_mem, usize, usize, A, cl_mem, usize,
    usize, Q, E,
) -> c_int;
type GemmFn<A> = unsafe extern "C" fn(
    c_int, c_int, c_int, usize, usize, usize, A, cl_mem, usize, usize, cl_mem, usize, usize, A,
    cl_mem, usize, usize, Q, E,
) -> c_int;
// symm and syr2k share this shape
type SymmFn<A> = unsafe extern "C" fn(
    c_int, c_int, c_int, usize, usize, A, cl_mem, usize, usize, cl_mem, usize, usize, A, cl_mem,
    usize, usize, Q, E,
) -> c_int;
type SyrkFn<A> = unsafe extern "C" fn(
    c_int, c_int, c_int, usize, usize, A, cl_mem, usize, usize, A, cl_mem, usize, usize, Q, E,
) -> c_int;
type TrxmFn<A> = unsafe extern "C" fn(
    c_int, c_int, c_int, c_int, c_int, usize, usize, A, cl_mem, usize, usize, cl_mem, usize, usize,
    Q, E,
) -> c_int;
type OmatcopyFn<A> = unsafe extern "C" fn(
    c_int, c_int, usize, usize, A, cl_mem, usize, usize, cl_mem, usize, usize, Q, E,
) -> c_int;
type HadFn<A> = unsafe extern "C" fn(
    usize, A, cl_mem, usize, usize, cl_mem, usize, usize, A, cl_mem, usize, usize, Q, E,
) -> c_int;
type Im2colFn = unsafe extern "C" fn(
    c_int, usize, usize, usize, usize, usize, usize, usize, usize, usize, usize, usize, cl_mem,
    usize, cl_mem, usize, Q, E,
) -> c_int;
type ConvgemmFn = unsafe extern "C" fn(
    c_int, usize, usize, usize, usize, usize, usize, usize, usize, usize, usize, usize, usize,
    usize, cl_mem, usize, cl_mem, usize, cl_mem, usize, Q, E,
) -> c_int;
type AxpyBatchedFn<A> = unsafe extern "C" fn(
    usize, *const A, cl_mem, *const usize, usize, cl_mem, *const usize, usize, usize, Q, E,
) -> c_int;
type GemmBatchedFn<A> = unsafe extern "C" fn(
    c_int, c_int, c_int, usize, usize, usize, *const A, cl_mem, *const usize, usize, cl_mem,
    *const usize, usize, *const A, cl_mem, *const usize, usize, usize, Q, E,
) -> c_int;
type GemmStridedBatchedFn<A> = unsafe extern "C" fn(
    c_int, c_int, c_int, usize, usize, usize, A, cl_mem, usize, usize, usize, cl_mem, usize, usize,
    usize, A, cl_mem, usize, usize, usize, usize, Q, E,
) -> c_int;
type ClearCacheFn = unsafe extern "C" fn() -> c_int;
type FillCacheFn = unsafe extern "C" fn(cl_device_id) -> c_int;

/// Reinterpret an untyped entry point as a concrete C signature.
#[inline]
pub(crate) fn cast<F: Copy>(f: AnyFn) -> F {
    debug_assert_eq!(std::mem::size_of::<F>(), std::mem::size_of::<AnyFn>());
    // SAFETY: F is always one of the function pointer aliases above, which
    // have the same size and representation as AnyFn.
    unsafe { std::mem::transmute_copy::<AnyFn, F>(&f) }
}

/// Resolve every symbol `lookup` names in `lib`; absent symbols are skipped.
pub(crate) fn resolve_symbols(
    lib: &Library,
    lookup: fn(Routine, Precision) -> Option<&'static str>,
    library: &str,
) -> HashMap<(Routine, Precision), AnyFn> {
    let mut symbols = HashMap::new();
    for routine in Routine::ALL {
        for precision in Precision::ALL {
            let Some(name) = lookup(routine, precision) else {
                continue;
            };
            // SAFETY: the symbol is only called after being cast to the
            // signature declared for it in clblast_c.h.
            match unsafe { lib.get::<AnyFn>(name.as_bytes()) } {
                Ok(sym) => {
                    symbols.insert((routine, precision), *sym);
                }
                Err(_) => debug!(library, symbol = name, "symbol not exported"),
            }
        }
    }
    symbols
}

/// Resolve `$fn_ty` from the primary library and call it.
macro_rules! invoke {
    ($lib:expr, $call:expr, $fn_ty:ty, ($($arg:expr),* $(,)?)) => {{
        let f: $fn_ty = $lib.primary($call)?;
        f($($arg),*)
    }};
}

/// Dispatch on the native scalar type(s) of a call, routing complex scalars
/// through the active [`ComplexPath`].
macro_rules! invoke_scaled {
    ($lib:expr, $call:expr, $fn_ty:ident, ($alpha:expr, $beta:expr), |$a:ident, $b:ident| ($($arg:expr),* $(,)?)) => {{
        match ($alpha, $beta) {
            (NativeScalar::F32($a), NativeScalar::F32($b)) => invoke!($lib, $call, $fn_ty<f32>, ($($arg),*)),
            (NativeScalar::F64($a), NativeScalar::F64($b)) => invoke!($lib, $call, $fn_ty<f64>, ($($arg),*)),
            (NativeScalar::C64(va), NativeScalar::C64(vb)) => match $lib.complex.target($call.routine)? {
                ComplexTarget::Direct => {
                    let ($a, $b) = (va, vb);
                    invoke!($lib, $call, $fn_ty<ClFloat2>, ($($arg),*))
                }
                ComplexTarget::Shim(shim) => {
                    let $a = &va as *const ClFloat2 as *const c_void;
                    let $b = &vb as *const ClFloat2 as *const c_void;
                    let f: $fn_ty<*const c_void> = shim.resolve($call)?;
                    f($($arg),*)
                }
            },
            (NativeScalar::C128(va), NativeScalar::C128(vb)) => match $lib.complex.target($call.routine)? {
                ComplexTarget::Direct => {
                    let ($a, $b) = (va, vb);
                    invoke!($lib, $call, $fn_ty<ClDouble2>, ($($arg),*))
                }
                ComplexTarget::Shim(shim) => {
                    let $a = &va as *const ClDouble2 as *const c_void;
                    let $b = &vb as *const ClDouble2 as *const c_void;
                    let f: $fn_ty<*const c_void> = shim.resolve($call)?;
                    f($($arg),*)
                }
            },
            (a, b) => return Err(mixed_scalars($call.routine, a, b)),
        }
    }};
    ($lib:expr, $call:expr, $fn_ty:ident, $alpha:expr, |$a:ident| ($($arg:expr),* $(,)?)) => {{
        match $alpha {
            NativeScalar::F32($a) => invoke!($lib, $call, $fn_ty<f32>, ($($arg),*)),
            NativeScalar::F64($a) => invoke!($lib, $call, $fn_ty<f64>, ($($arg),*)),
            NativeScalar::C64(v) => match $lib.complex.target($call.routine)? {
                ComplexTarget::Direct => {
                    let $a = v;
                    invoke!($lib, $call, $fn_ty<ClFloat2>, ($($arg),*))
                }
                ComplexTarget::Shim(shim) => {
                    let $a = &v as *const ClFloat2 as *const c_void;
                    let f: $fn_ty<*const c_void> = shim.resolve($call)?;
                    f($($arg),*)
                }
            },
            NativeScalar::C128(v) => match $lib.complex.target($call.routine)? {
                ComplexTarget::Direct => {
                    let $a = v;
                    invoke!($lib, $call, $fn_ty<ClDouble2>, ($($arg),*))
                }
                ComplexTarget::Shim(shim) => {
                    let $a = &v as *const ClDouble2 as *const c_void;
                    let f: $fn_ty<*const c_void> = shim.resolve($call)?;
                    f($($arg),*)
                }
            },
        }
    }};
}

fn mixed_scalars(routine: Routine, a: NativeScalar, b: NativeScalar) -> Error {
    Error::Internal(format!(
        "{routine}: scalar arguments disagree in precision ({a:?} vs {b:?})"
    ))
}

fn mixed_host_scalars(routine: Routine) -> Error {
    Error::Internal(format!(
        "{routine}: per-batch alpha and beta arrays disagree in precision"
    ))
}

/// A bound CLBlast shared library
pub struct ClBlastLibrary {
    path: String,
    symbols: HashMap<(Routine, Precision), AnyFn>,
    clear_cache: Option<ClearCacheFn>,
    fill_cache: Option<FillCacheFn>,
    complex: ComplexPath,
    _lib: Library,
}

impl ClBlastLibrary {
    /// Open the library at `path` and resolve the capability table
    pub(crate) fn open(path: &str, complex: ComplexPath) -> Result<Self> {
        // SAFETY: CLBlast's initializers only set up its kernel cache.
        let lib = unsafe { Library::new(path) }.map_err(|source| Error::Load {
            library: path.to_string(),
            source,
        })?;
        let symbols = resolve_symbols(&lib, Routine::symbol, path);
        // SAFETY: signatures as declared in clblast_c.h.
        let clear_cache = unsafe { lib.get::<ClearCacheFn>(b"CLBlastClearCache\0") }
            .ok()
            .map(|s| *s);
        let fill_cache = unsafe { lib.get::<FillCacheFn>(b"CLBlastFillCache\0") }
            .ok()
            .map(|s| *s);
        Ok(Self {
            path: path.to_string(),
            symbols,
            clear_cache,
            fill_cache,
            complex,
            _lib: lib,
        })
    }

    /// Path the library was loaded from
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Number of capability table entries the library exports
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Returns true if the routine is exported at `precision`
    pub fn has_symbol(&self, routine: Routine, precision: Precision) -> bool {
        self.symbols.contains_key(&(routine, precision))
    }

    /// Active complex-scalar strategy
    pub fn complex_path(&self) -> &ComplexPath {
        &self.complex
    }

    pub(crate) fn complex_path_mut(&mut self) -> &mut ComplexPath {
        &mut self.complex
    }

    /// Release all compiled kernels held by CLBlast
    pub fn clear_cache(&self) -> Result<()> {
        let f = self.clear_cache.ok_or(Error::SymbolNotFound {
            symbol: "CLBlastClearCache",
        })?;
        // SAFETY: takes no arguments.
        let status = Status(unsafe { f() });
        check_cache_status("ClearCache", status)
    }

    /// Compile and cache all kernels for `device`
    ///
    /// # Safety
    ///
    /// `device` must be a valid OpenCL device id.
    pub unsafe fn fill_cache(&self, device: cl_device_id) -> Result<()> {
        let f = self.fill_cache.ok_or(Error::SymbolNotFound {
            symbol: "CLBlastFillCache",
        })?;
        let status = Status(f(device));
        check_cache_status("FillCache", status)
    }

    fn primary<F: Copy>(&self, call: &NativeCall) -> Result<F> {
        let Some(symbol) = call.routine.symbol(call.precision) else {
            return Err(Error::unsupported_dtype(
                Some(call.precision.dtype()),
                call.routine.name(),
            ));
        };
        match self.symbols.get(&(call.routine, call.precision)) {
            Some(f) => Ok(cast(*f)),
            None => Err(Error::SymbolNotFound { symbol }),
        }
    }
}

fn check_cache_status(op: &'static str, status: Status) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(Error::Native { op, status })
    }
}

impl fmt::Debug for ClBlastLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClBlastLibrary")
            .field("path", &self.path)
            .field("symbols", &self.symbols.len())
            .field("complex", &self.complex)
            .finish()
    }
}

impl Backend for ClBlastLibrary {
    fn name(&self) -> &'static str {
        "clblast"
    }

    unsafe fn enqueue(&self, call: &NativeCall) -> Result<Status> {
        trace!(routine = %call.routine, precision = ?call.precision, "enqueue");
        let (q, e) = (call.queue, call.event);

        let code: c_int = match call.args {
            CallArgs::Scal { n, alpha, x } => {
                invoke_scaled!(self, call, ScalFn, alpha, |a| (n, a, x.mem, x.offset, x.inc, q, e))
            }
            CallArgs::Axpy { n, alpha, x, y } => invoke_scaled!(self, call, AxpyFn, alpha, |a| (
                n, a, x.mem, x.offset, x.inc, y.mem, y.offset, y.inc, q, e
            )),
            CallArgs::Dot { n, result, x, y } => invoke!(self, call, DotFn, (
                n, result.mem, result.offset, x.mem, x.offset, x.inc, y.mem, y.offset, y.inc, q, e
            )),
            CallArgs::Reduce { n, result, x } => invoke!(self, call, ReduceFn, (
                n, result.mem, result.offset, x.mem, x.offset, x.inc, q, e
            )),
            CallArgs::Pair { n, x, y } => invoke!(self, call, PairFn, (
                n, x.mem, x.offset, x.inc, y.mem, y.offset, y.inc, q, e
            )),
            CallArgs::Rotg { a, b, c, s } => invoke!(self, call, RotgFn, (
                a.mem, a.offset, b.mem, b.offset, c.mem, c.offset, s.mem, s.offset, q, e
            )),
            CallArgs::Rot { n, x, y, cos, sin } => {
                invoke_scaled!(self, call, RotFn, (cos, sin), |c, s| (
                    n, x.mem, x.offset, x.inc, y.mem, y.offset, y.inc, c, s, q, e
                ))
            }
            CallArgs::Rotmg { d1, d2, b1, b2, param } => invoke!(self, call, RotmgFn, (
                d1.mem, d1.offset, d2.mem, d2.offset, b1.mem, b1.offset, b2.mem, b2.offset,
                param.mem, param.offset, q, e
            )),
            CallArgs::Rotm { n, x, y, param } => invoke!(self, call, RotmFn, (
                n, x.mem, x.offset, x.inc, y.mem, y.offset, y.inc, param.mem, param.offset, q, e
            )),
            CallArgs::Gemv { layout, trans, m, n, alpha, a, x, beta, y } => {
                invoke_scaled!(self, call, GemvFn, (alpha, beta), |al, be| (
                    layout as c_int, trans, m, n, al, a.mem, a.offset, a.ld, x.mem, x.offset,
                    x.inc, be, y.mem, y.offset, y.inc, q, e
                ))
            }
            CallArgs::Gemm { layout, trans_a, trans_b, m, n, k, alpha, a, b, beta, c } => {
                invoke_scaled!(self, call, GemmFn, (alpha, beta), |al, be| (
                    layout as c_int, trans_a, trans_b, m, n, k, al, a.mem, a.offset, a.ld,
                    b.mem, b.offset, b.ld, be, c.mem, c.offset, c.ld, q, e
                ))
            }
            CallArgs::Symm { layout, side, uplo, m, n, alpha, a, b, beta, c } => {
                invoke_scaled!(self, call, SymmFn, (alpha, beta), |al, be| (
                    layout as c_int, side as c_int, uplo as c_int, m, n, al, a.mem, a.offset,
                    a.ld, b.mem, b.offset, b.ld, be, c.mem, c.offset, c.ld, q, e
                ))
            }
            CallArgs::Syrk { layout, uplo, trans, n, k, alpha, a, beta, c } => {
                invoke_scaled!(self, call, SyrkFn, (alpha, beta), |al, be| (
                    layout as c_int, uplo as c_int, trans, n, k, al, a.mem, a.offset, a.ld, be,
                    c.mem, c.offset, c.ld, q, e
                ))
            }
            CallArgs::Syr2k { layout, uplo, trans, n, k, alpha, a, b, beta, c } => {
                invoke_scaled!(self, call, SymmFn, (alpha, beta), |al, be| (
                    layout as c_int, uplo as c_int, trans, n, k, al, a.mem, a.offset, a.ld,
                    b.mem, b.offset, b.ld, be, c.mem, c.offset, c.ld, q, e
                ))
            }
            CallArgs::Trxm { layout, side, uplo, trans, diag, m, n, alpha, a, b } => {
                invoke_scaled!(self, call, TrxmFn, alpha, |al| (
                    layout as c_int, side as c_int, uplo as c_int, trans, diag as c_int, m, n,
                    al, a.mem, a.offset, a.ld, b.mem, b.offset, b.ld, q, e
                ))
            }
            CallArgs::Omatcopy { layout, trans, m, n, alpha, a, b } => {
                invoke_scaled!(self, call, OmatcopyFn, alpha, |al| (
                    layout as c_int, trans, m, n, al, a.mem, a.offset, a.ld, b.mem, b.offset,
                    b.ld, q, e
                ))
            }
            CallArgs::Had { n, alpha, x, y, beta, z } => {
                invoke_scaled!(self, call, HadFn, (alpha, beta), |al, be| (
                    n, al, x.mem, x.offset, x.inc, y.mem, y.offset, y.inc, be, z.mem, z.offset,
                    z.inc, q, e
                ))
            }
            CallArgs::Im2col { mode, geometry: g, src, dst } => invoke!(self, call, Im2colFn, (
                mode as c_int, g.channels, g.height, g.width, g.kernel_h, g.kernel_w, g.pad_h,
                g.pad_w, g.stride_h, g.stride_w, g.dilation_h, g.dilation_w, src.mem,
                src.offset, dst.mem, dst.offset, q, e
            )),
            CallArgs::Convgemm { mode, geometry: g, num_kernels, batch_count, im, kernel, result } => {
                invoke!(self, call, ConvgemmFn, (
                    mode as c_int, g.channels, g.height, g.width, g.kernel_h, g.kernel_w,
                    g.pad_h, g.pad_w, g.stride_h, g.stride_w, g.dilation_h, g.dilation_w,
                    num_kernels, batch_count, im.mem, im.offset, kernel.mem, kernel.offset,
                    result.mem, result.offset, q, e
                ))
            }
            CallArgs::AxpyBatched { n, alphas, x, y, batch_count } => match alphas {
                HostScalars::F32(al) => invoke!(self, call, AxpyBatchedFn<f32>, (
                    n, al, x.mem, x.offsets, x.inc, y.mem, y.offsets, y.inc, batch_count, q, e
                )),
                HostScalars::F64(al) => invoke!(self, call, AxpyBatchedFn<f64>, (
                    n, al, x.mem, x.offsets, x.inc, y.mem, y.offsets, y.inc, batch_count, q, e
                )),
            },
            CallArgs::GemmBatched {
                layout, trans_a, trans_b, m, n, k, alphas, a, b, betas, c, batch_count,
            } => match (alphas, betas) {
                (HostScalars::F32(al), HostScalars::F32(be)) => {
                    invoke!(self, call, GemmBatchedFn<f32>, (
                        layout as c_int, trans_a, trans_b, m, n, k, al, a.mem, a.offsets, a.ld,
                        b.mem, b.offsets, b.ld, be, c.mem, c.offsets, c.ld, batch_count, q, e
                    ))
                }
                (HostScalars::F64(al), HostScalars::F64(be)) => {
                    invoke!(self, call, GemmBatchedFn<f64>, (
                        layout as c_int, trans_a, trans_b, m, n, k, al, a.mem, a.offsets, a.ld,
                        b.mem, b.offsets, b.ld, be, c.mem, c.offsets, c.ld, batch_count, q, e
                    ))
                }
                _ => return Err(mixed_host_scalars(call.routine)),
            },
            CallArgs::GemmStridedBatched {
                layout, trans_a, trans_b, m, n, k, alpha, a, b, beta, c, batch_count,
            } => invoke_scaled!(self, call, GemmStridedBatchedFn, (alpha, beta), |al, be| (
                layout as c_int, trans_a, trans_b, m, n, k, al, a.mem, a.offset, a.ld, a.stride,
                b.mem, b.offset, b.ld, b.stride, be, c.mem, c.offset, c.ld, c.stride,
                batch_count, q, e
            )),
        };

        Ok(Status(code))
    }
}
