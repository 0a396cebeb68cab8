//! Capability table: which native symbol implements a routine at a precision
//!
//! Every wrapper looks up `(Routine, Precision)` here instead of branching on the
//! dtype itself. A routine/precision pair without an entry is unsupported and is
//! rejected before any native call.

use crate::dtype::Precision;

/// Every CLBlast routine this crate dispatches to
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Routine {
    // Level 1
    Scal,
    Axpy,
    Dot,
    Dotu,
    Dotc,
    Nrm2,
    Asum,
    Iamax,
    Iamin,
    Copy,
    Swap,
    Rotg,
    Rot,
    Rotmg,
    Rotm,
    // Level 2
    Gemv,
    // Level 3
    Gemm,
    Symm,
    Syrk,
    Syr2k,
    Trmm,
    Trsm,
    // Extensions
    Omatcopy,
    Sum,
    Imax,
    Imin,
    Had,
    Im2col,
    Col2im,
    Convgemm,
    AxpyBatched,
    GemmBatched,
    GemmStridedBatched,
}

impl Routine {
    /// All routines, in table order
    pub const ALL: [Routine; 33] = [
        Routine::Scal,
        Routine::Axpy,
        Routine::Dot,
        Routine::Dotu,
        Routine::Dotc,
        Routine::Nrm2,
        Routine::Asum,
        Routine::Iamax,
        Routine::Iamin,
        Routine::Copy,
        Routine::Swap,
        Routine::Rotg,
        Routine::Rot,
        Routine::Rotmg,
        Routine::Rotm,
        Routine::Gemv,
        Routine::Gemm,
        Routine::Symm,
        Routine::Syrk,
        Routine::Syr2k,
        Routine::Trmm,
        Routine::Trsm,
        Routine::Omatcopy,
        Routine::Sum,
        Routine::Imax,
        Routine::Imin,
        Routine::Had,
        Routine::Im2col,
        Routine::Col2im,
        Routine::Convgemm,
        Routine::AxpyBatched,
        Routine::GemmBatched,
        Routine::GemmStridedBatched,
    ];

    /// Operation name used in error messages
    pub const fn name(self) -> &'static str {
        match self {
            Routine::Scal => "scal",
            Routine::Axpy => "axpy",
            Routine::Dot => "dot",
            Routine::Dotu => "dotu",
            Routine::Dotc => "dotc",
            Routine::Nrm2 => "nrm2",
            Routine::Asum => "asum",
            Routine::Iamax => "iamax",
            Routine::Iamin => "iamin",
            Routine::Copy => "copy",
            Routine::Swap => "swap",
            Routine::Rotg => "rotg",
            Routine::Rot => "rot",
            Routine::Rotmg => "rotmg",
            Routine::Rotm => "rotm",
            Routine::Gemv => "gemv",
            Routine::Gemm => "gemm",
            Routine::Symm => "symm",
            Routine::Syrk => "syrk",
            Routine::Syr2k => "syr2k",
            Routine::Trmm => "trmm",
            Routine::Trsm => "trsm",
            Routine::Omatcopy => "omatcopy",
            Routine::Sum => "sum",
            Routine::Imax => "imax",
            Routine::Imin => "imin",
            Routine::Had => "had",
            Routine::Im2col => "im2col",
            Routine::Col2im => "col2im",
            Routine::Convgemm => "convgemm",
            Routine::AxpyBatched => "axpyBatched",
            Routine::GemmBatched => "gemmBatched",
            Routine::GemmStridedBatched => "gemmStridedBatched",
        }
    }

    /// Symbol in the primary CLBlast library, or `None` if the routine has no
    /// variant at this precision
    pub const fn symbol(self, precision: Precision) -> Option<&'static str> {
        use Precision::*;
        use Routine::*;

        let sym = match (self, precision) {
            (Scal, Single) => "CLBlastSscal",
            (Scal, Double) => "CLBlastDscal",
            (Scal, ComplexSingle) => "CLBlastCscal",
            (Scal, ComplexDouble) => "CLBlastZscal",

            (Axpy, Single) => "CLBlastSaxpy",
            (Axpy, Double) => "CLBlastDaxpy",
            (Axpy, ComplexSingle) => "CLBlastCaxpy",
            (Axpy, ComplexDouble) => "CLBlastZaxpy",

            (Dot, Single) => "CLBlastSdot",
            (Dot, Double) => "CLBlastDdot",
            (Dotu, ComplexSingle) => "CLBlastCdotu",
            (Dotu, ComplexDouble) => "CLBlastZdotu",
            (Dotc, ComplexSingle) => "CLBlastCdotc",
            (Dotc, ComplexDouble) => "CLBlastZdotc",

            (Nrm2, Single) => "CLBlastSnrm2",
            (Nrm2, Double) => "CLBlastDnrm2",
            (Nrm2, ComplexSingle) => "CLBlastScnrm2",
            (Nrm2, ComplexDouble) => "CLBlastDznrm2",

            (Asum, Single) => "CLBlastSasum",
            (Asum, Double) => "CLBlastDasum",
            (Asum, ComplexSingle) => "CLBlastScasum",
            (Asum, ComplexDouble) => "CLBlastDzasum",

            (Iamax, Single) => "CLBlastiSamax",
            (Iamax, Double) => "CLBlastiDamax",
            (Iamax, ComplexSingle) => "CLBlastiCamax",
            (Iamax, ComplexDouble) => "CLBlastiZamax",

            (Iamin, Single) => "CLBlastiSamin",
            (Iamin, Double) => "CLBlastiDamin",
            (Iamin, ComplexSingle) => "CLBlastiCamin",
            (Iamin, ComplexDouble) => "CLBlastiZamin",

            (Copy, Single) => "CLBlastScopy",
            (Copy, Double) => "CLBlastDcopy",
            (Copy, ComplexSingle) => "CLBlastCcopy",
            (Copy, ComplexDouble) => "CLBlastZcopy",

            (Swap, Single) => "CLBlastSswap",
            (Swap, Double) => "CLBlastDswap",
            (Swap, ComplexSingle) => "CLBlastCswap",
            (Swap, ComplexDouble) => "CLBlastZswap",

            (Rotg, Single) => "CLBlastSrotg",
            (Rotg, Double) => "CLBlastDrotg",
            (Rot, Single) => "CLBlastSrot",
            (Rot, Double) => "CLBlastDrot",
            (Rotmg, Single) => "CLBlastSrotmg",
            (Rotmg, Double) => "CLBlastDrotmg",
            (Rotm, Single) => "CLBlastSrotm",
            (Rotm, Double) => "CLBlastDrotm",

            (Gemv, Single) => "CLBlastSgemv",
            (Gemv, Double) => "CLBlastDgemv",
            (Gemv, ComplexSingle) => "CLBlastCgemv",
            (Gemv, ComplexDouble) => "CLBlastZgemv",

            (Gemm, Single) => "CLBlastSgemm",
            (Gemm, Double) => "CLBlastDgemm",
            (Gemm, ComplexSingle) => "CLBlastCgemm",
            (Gemm, ComplexDouble) => "CLBlastZgemm",

            (Symm, Single) => "CLBlastSsymm",
            (Symm, Double) => "CLBlastDsymm",
            (Symm, ComplexSingle) => "CLBlastCsymm",
            (Symm, ComplexDouble) => "CLBlastZsymm",

            (Syrk, Single) => "CLBlastSsyrk",
            (Syrk, Double) => "CLBlastDsyrk",
            (Syrk, ComplexSingle) => "CLBlastCsyrk",
            (Syrk, ComplexDouble) => "CLBlastZsyrk",

            (Syr2k, Single) => "CLBlastSsyr2k",
            (Syr2k, Double) => "CLBlastDsyr2k",
            (Syr2k, ComplexSingle) => "CLBlastCsyr2k",
            (Syr2k, ComplexDouble) => "CLBlastZsyr2k",

            (Trmm, Single) => "CLBlastStrmm",
            (Trmm, Double) => "CLBlastDtrmm",
            (Trmm, ComplexSingle) => "CLBlastCtrmm",
            (Trmm, ComplexDouble) => "CLBlastZtrmm",

            (Trsm, Single) => "CLBlastStrsm",
            (Trsm, Double) => "CLBlastDtrsm",
            (Trsm, ComplexSingle) => "CLBlastCtrsm",
            (Trsm, ComplexDouble) => "CLBlastZtrsm",

            (Omatcopy, Single) => "CLBlastSomatcopy",
            (Omatcopy, Double) => "CLBlastDomatcopy",
            (Omatcopy, ComplexSingle) => "CLBlastComatcopy",
            (Omatcopy, ComplexDouble) => "CLBlastZomatcopy",

            (Sum, Single) => "CLBlastSsum",
            (Sum, Double) => "CLBlastDsum",
            (Imax, Single) => "CLBlastiSmax",
            (Imax, Double) => "CLBlastiDmax",
            (Imin, Single) => "CLBlastiSmin",
            (Imin, Double) => "CLBlastiDmin",
            (Had, Single) => "CLBlastShad",
            (Had, Double) => "CLBlastDhad",
            (Im2col, Single) => "CLBlastSim2col",
            (Im2col, Double) => "CLBlastDim2col",
            (Col2im, Single) => "CLBlastScol2im",
            (Col2im, Double) => "CLBlastDcol2im",
            (Convgemm, Single) => "CLBlastSconvgemm",
            (Convgemm, Double) => "CLBlastDconvgemm",
            (AxpyBatched, Single) => "CLBlastSaxpyBatched",
            (AxpyBatched, Double) => "CLBlastDaxpyBatched",
            (GemmBatched, Single) => "CLBlastSgemmBatched",
            (GemmBatched, Double) => "CLBlastDgemmBatched",

            (GemmStridedBatched, Single) => "CLBlastSgemmStridedBatched",
            (GemmStridedBatched, Double) => "CLBlastDgemmStridedBatched",
            (GemmStridedBatched, ComplexSingle) => "CLBlastCgemmStridedBatched",
            (GemmStridedBatched, ComplexDouble) => "CLBlastZgemmStridedBatched",

            _ => return None,
        };
        Some(sym)
    }

    /// Symbol in the complex shim library, for routines whose complex variants
    /// take their scalars by address
    pub const fn shim_symbol(self, precision: Precision) -> Option<&'static str> {
        use Precision::*;
        use Routine::*;

        let sym = match (self, precision) {
            (Scal, ComplexSingle) => "RindowCLBlastCscal",
            (Scal, ComplexDouble) => "RindowCLBlastZscal",
            (Axpy, ComplexSingle) => "RindowCLBlastCaxpy",
            (Axpy, ComplexDouble) => "RindowCLBlastZaxpy",
            (Gemv, ComplexSingle) => "RindowCLBlastCgemv",
            (Gemv, ComplexDouble) => "RindowCLBlastZgemv",
            (Gemm, ComplexSingle) => "RindowCLBlastCgemm",
            (Gemm, ComplexDouble) => "RindowCLBlastZgemm",
            (Symm, ComplexSingle) => "RindowCLBlastCsymm",
            (Symm, ComplexDouble) => "RindowCLBlastZsymm",
            (Syrk, ComplexSingle) => "RindowCLBlastCsyrk",
            (Syrk, ComplexDouble) => "RindowCLBlastZsyrk",
            (Syr2k, ComplexSingle) => "RindowCLBlastCsyr2k",
            (Syr2k, ComplexDouble) => "RindowCLBlastZsyr2k",
            (Trmm, ComplexSingle) => "RindowCLBlastCtrmm",
            (Trmm, ComplexDouble) => "RindowCLBlastZtrmm",
            (Trsm, ComplexSingle) => "RindowCLBlastCtrsm",
            (Trsm, ComplexDouble) => "RindowCLBlastZtrsm",
            (Omatcopy, ComplexSingle) => "RindowCLBlastComatcopy",
            (Omatcopy, ComplexDouble) => "RindowCLBlastZomatcopy",
            (GemmStridedBatched, ComplexSingle) => "RindowCLBlastCgemmStridedBatched",
            (GemmStridedBatched, ComplexDouble) => "RindowCLBlastZgemmStridedBatched",
            _ => return None,
        };
        Some(sym)
    }

    /// Returns true if the routine has a native variant at `precision`
    #[inline]
    pub const fn supports(self, precision: Precision) -> bool {
        self.symbol(precision).is_some()
    }

    /// Returns true if complex scalars of this routine must be routed through
    /// the shim when the shim strategy is active
    #[inline]
    pub const fn has_shim(self) -> bool {
        self.shim_symbol(Precision::ComplexSingle).is_some()
    }
}

impl std::fmt::Display for Routine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
