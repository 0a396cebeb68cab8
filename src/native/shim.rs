//! Complex-scalar calling strategy
//!
//! Some CLBlast packages export complex routines whose by-value `cl_float2` /
//! `cl_double2` arguments do not match the C ABI the caller sees. The
//! `rindowclblast` helper library re-exports those routines under
//! `RindowCLBlast{C,Z}<op>` taking the scalars by address. The strategy is
//! fixed when the library is bound.

use super::library::{resolve_symbols, AnyFn};
use super::routine::Routine;
use crate::dtype::Precision;
use crate::error::{Error, Result};
use crate::native::call::NativeCall;
use libloading::Library;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

/// How complex scalars reach the native library
pub enum ComplexPath {
    /// Pass `cl_float2` / `cl_double2` by value to `CLBlast{C,Z}<op>`
    Direct,
    /// Pass scalars by address to the shim; `None` if the shim failed to load
    Shim(Option<ShimLibrary>),
}

/// Where a complex-scalar call of one routine goes
pub(crate) enum ComplexTarget<'a> {
    Direct,
    Shim(&'a ShimLibrary),
}

impl ComplexPath {
    /// Calling strategy for a complex-scalar call of `routine`
    ///
    /// Routines the shim does not re-export are always called directly.
    pub(crate) fn target(&self, routine: Routine) -> Result<ComplexTarget<'_>> {
        match self {
            ComplexPath::Direct => Ok(ComplexTarget::Direct),
            ComplexPath::Shim(_) if !routine.has_shim() => Ok(ComplexTarget::Direct),
            ComplexPath::Shim(Some(shim)) => Ok(ComplexTarget::Shim(shim)),
            ComplexPath::Shim(None) => Err(Error::ShimUnavailable {
                routine: routine.name(),
            }),
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            ComplexPath::Direct => "direct",
            ComplexPath::Shim(Some(_)) => "shim",
            ComplexPath::Shim(None) => "shim (unavailable)",
        }
    }
}

impl fmt::Debug for ComplexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplexPath::Shim(Some(shim)) => write!(f, "Shim({})", shim.path),
            other => f.write_str(other.name()),
        }
    }
}

/// The bound `rindowclblast` helper library
pub struct ShimLibrary {
    path: String,
    symbols: HashMap<(Routine, Precision), AnyFn>,
    _lib: Library,
}

impl ShimLibrary {
    /// Open the shim at `path` and resolve its entry points
    pub(crate) fn open(path: &str) -> Result<Self> {
        // SAFETY: loading runs the library's initializers; the shim has none
        // beyond those of the CLBlast library it links against.
        let lib = unsafe { Library::new(path) }.map_err(|source| Error::Load {
            library: path.to_string(),
            source,
        })?;
        let symbols = resolve_symbols(&lib, Routine::shim_symbol, path);
        Ok(Self {
            path: path.to_string(),
            symbols,
            _lib: lib,
        })
    }

    /// Open the first candidate that loads
    pub(crate) fn open_first(candidates: &[String]) -> Option<Self> {
        for candidate in candidates {
            match Self::open(candidate) {
                Ok(shim) => {
                    info!(
                        library = %shim.path,
                        symbols = shim.symbols.len(),
                        "bound complex shim library"
                    );
                    return Some(shim);
                }
                Err(e) => debug!(library = %candidate, error = %e, "shim candidate not loaded"),
            }
        }
        warn!("no complex shim library could be loaded; complex scal/axpy/gemv/gemm/symm/syrk/syr2k/trmm/trsm/omatcopy/gemmStridedBatched will fail");
        None
    }

    /// Library path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Typed entry point for `call`
    pub(crate) fn resolve<F: Copy>(&self, call: &NativeCall) -> Result<F> {
        let symbol = call
            .routine
            .shim_symbol(call.precision)
            .ok_or(Error::ShimUnavailable {
                routine: call.routine.name(),
            })?;
        match self.symbols.get(&(call.routine, call.precision)) {
            Some(f) => Ok(super::library::cast(*f)),
            None => Err(Error::SymbolNotFound { symbol }),
        }
    }
}
