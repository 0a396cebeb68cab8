//! C ABI types shared with the CLBlast and OpenCL libraries
//!
//! OpenCL object handles are opaque pointers owned by the GPU runtime. This crate
//! never creates or destroys them; it only forwards them into native calls.

#![allow(non_camel_case_types)]

use std::ffi::{c_int, c_void};
use std::fmt;

/// Opaque OpenCL memory object (`cl_mem`)
pub type cl_mem = *mut c_void;
/// Opaque OpenCL command queue (`cl_command_queue`)
pub type cl_command_queue = *mut c_void;
/// Opaque OpenCL event (`cl_event`)
pub type cl_event = *mut c_void;
/// Opaque OpenCL device id (`cl_device_id`)
pub type cl_device_id = *mut c_void;

/// Native two-component single-precision complex (`cl_float2`)
#[repr(C, align(8))]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ClFloat2 {
    /// `[re, im]`
    pub s: [f32; 2],
}

/// Native two-component double-precision complex (`cl_double2`)
#[repr(C, align(16))]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ClDouble2 {
    /// `[re, im]`
    pub s: [f64; 2],
}

// ============================================================================
// Status codes
// ============================================================================

/// Status code returned by every CLBlast routine
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Status(pub c_int);

impl Status {
    /// Routine completed (enqueued) successfully
    pub const SUCCESS: Self = Self(0);
    /// Routine or functionality not implemented by the installed CLBlast
    pub const NOT_IMPLEMENTED: Self = Self(-1024);

    /// Returns true for [`Status::SUCCESS`]
    #[inline]
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }

    /// Raw integer code
    #[inline]
    pub const fn code(self) -> c_int {
        self.0
    }

    /// CLBlast name of this status, if it is a documented one
    pub const fn name(self) -> Option<&'static str> {
        let name = match self.0 {
            0 => "CLBlastSuccess",
            -3 => "CLBlastOpenCLCompilerNotAvailable",
            -4 => "CLBlastTempBufferAllocFailure",
            -5 => "CLBlastOpenCLOutOfResources",
            -6 => "CLBlastOpenCLOutOfHostMemory",
            -11 => "CLBlastOpenCLBuildProgramFailure",
            -30 => "CLBlastInvalidValue",
            -36 => "CLBlastInvalidCommandQueue",
            -38 => "CLBlastInvalidMemObject",
            -42 => "CLBlastInvalidBinary",
            -43 => "CLBlastInvalidBuildOptions",
            -44 => "CLBlastInvalidProgram",
            -45 => "CLBlastInvalidProgramExecutable",
            -46 => "CLBlastInvalidKernelName",
            -47 => "CLBlastInvalidKernelDefinition",
            -48 => "CLBlastInvalidKernel",
            -49 => "CLBlastInvalidArgIndex",
            -50 => "CLBlastInvalidArgValue",
            -51 => "CLBlastInvalidArgSize",
            -52 => "CLBlastInvalidKernelArgs",
            -53 => "CLBlastInvalidLocalNumDimensions",
            -54 => "CLBlastInvalidLocalThreadsTotal",
            -55 => "CLBlastInvalidLocalThreadsDim",
            -56 => "CLBlastInvalidGlobalOffset",
            -57 => "CLBlastInvalidEventWaitList",
            -58 => "CLBlastInvalidEvent",
            -59 => "CLBlastInvalidOperation",
            -61 => "CLBlastInvalidBufferSize",
            -63 => "CLBlastInvalidGlobalWorkSize",
            -1024 => "CLBlastNotImplemented",
            -1022 => "CLBlastInvalidMatrixA",
            -1021 => "CLBlastInvalidMatrixB",
            -1020 => "CLBlastInvalidMatrixC",
            -1019 => "CLBlastInvalidVectorX",
            -1018 => "CLBlastInvalidVectorY",
            -1017 => "CLBlastInvalidDimension",
            -1016 => "CLBlastInvalidLeadDimA",
            -1015 => "CLBlastInvalidLeadDimB",
            -1014 => "CLBlastInvalidLeadDimC",
            -1013 => "CLBlastInvalidIncrementX",
            -1012 => "CLBlastInvalidIncrementY",
            -1011 => "CLBlastInsufficientMemoryA",
            -1010 => "CLBlastInsufficientMemoryB",
            -1009 => "CLBlastInsufficientMemoryC",
            -1008 => "CLBlastInsufficientMemoryX",
            -1007 => "CLBlastInsufficientMemoryY",
            -2050 => "CLBlastInsufficientMemoryTemp",
            -2049 => "CLBlastInvalidBatchCount",
            -2048 => "CLBlastInvalidOverrideKernel",
            -2047 => "CLBlastMissingOverrideParameter",
            -2046 => "CLBlastInvalidLocalMemUsage",
            -2045 => "CLBlastNoHalfPrecision",
            -2044 => "CLBlastNoDoublePrecision",
            -2043 => "CLBlastInvalidVectorScalar",
            -2042 => "CLBlastInsufficientMemoryScalar",
            -2041 => "CLBlastDatabaseError",
            -2040 => "CLBlastUnknownError",
            -2039 => "CLBlastUnexpectedError",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "Status({}, {})", self.0, name),
            None => write!(f, "Status({})", self.0),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", self.0, name),
            None => write!(f, "{}", self.0),
        }
    }
}

impl From<c_int> for Status {
    #[inline]
    fn from(code: c_int) -> Self {
        Self(code)
    }
}

// ============================================================================
// Routine option enums
// ============================================================================

/// Matrix storage order
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Layout {
    /// Row-major (C order)
    RowMajor = 101,
    /// Column-major (Fortran order)
    ColMajor = 102,
}

/// Operand transposition as requested by the caller
///
/// `ConjNoTrans` exists in the host-side BLAS vocabulary but has no CLBlast
/// counterpart; routines that take a transpose reject it before dispatch.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Transpose {
    /// Use the operand as stored
    NoTrans,
    /// Transpose
    Trans,
    /// Conjugate transpose
    ConjTrans,
    /// Conjugate without transposing (unsupported by CLBlast)
    ConjNoTrans,
}

impl Transpose {
    /// CLBlast enum value, or `None` for [`Transpose::ConjNoTrans`]
    #[inline]
    pub const fn to_native(self) -> Option<c_int> {
        match self {
            Self::NoTrans => Some(111),
            Self::Trans => Some(112),
            Self::ConjTrans => Some(113),
            Self::ConjNoTrans => None,
        }
    }
}

/// Which triangle of a symmetric/triangular matrix is referenced
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Uplo {
    /// Upper triangle
    Upper = 121,
    /// Lower triangle
    Lower = 122,
}

/// Whether a triangular matrix has an implicit unit diagonal
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Diag {
    /// Diagonal is read from memory
    NonUnit = 131,
    /// Diagonal is assumed to be all ones
    Unit = 132,
}

/// Side on which the special matrix appears
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Side {
    /// `op(A) * B`
    Left = 141,
    /// `B * op(A)`
    Right = 142,
}

/// Kernel orientation for im2col / col2im / convgemm
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum KernelMode {
    /// Cross-correlation (kernel not flipped)
    CrossCorrelation = 151,
    /// True convolution (kernel flipped)
    Convolution = 152,
}
