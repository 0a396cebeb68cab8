//! Error types for the CLBlast binding

use crate::dtype::DType;
use crate::native::types::Status;
use thiserror::Error;

/// Result type alias using this crate's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the loader and by every routine wrapper
#[derive(Error, Debug)]
pub enum Error {
    /// No CLBlast library could be bound in this process
    #[error("CLBlast library not loaded")]
    LibraryNotLoaded,

    /// A shared library failed to open
    #[error("failed to load '{library}': {source}")]
    Load {
        /// Library path or name that was tried
        library: String,
        /// Loader error
        #[source]
        source: libloading::Error,
    },

    /// A routine needs a symbol the installed library does not export
    #[error("symbol '{symbol}' not found in the CLBlast library")]
    SymbolNotFound {
        /// Native symbol name
        symbol: &'static str,
    },

    /// Complex routines go through the shim, but no shim library was bound
    #[error("complex '{routine}' requires the rindowclblast shim library, which is not loaded")]
    ShimUnavailable {
        /// Routine name
        routine: &'static str,
    },

    /// DType mismatch between operands
    #[error(
        "unmatched data type for {lhs_arg} and {rhs_arg}: {} vs {}",
        dtype_name(.lhs),
        dtype_name(.rhs)
    )]
    DTypeMismatch {
        /// First operand name
        lhs_arg: &'static str,
        /// First operand dtype
        lhs: Option<DType>,
        /// Second operand name
        rhs_arg: &'static str,
        /// Second operand dtype
        rhs: Option<DType>,
    },

    /// No native routine exists for this dtype
    #[error("unsupported data type {} for '{op}'", dtype_name(.dtype))]
    UnsupportedDType {
        /// The unsupported dtype (`None` when undeclared)
        dtype: Option<DType>,
        /// The operation name
        op: &'static str,
    },

    /// Invalid argument provided to an operation
    #[error("invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// The native routine returned a failure status
    #[error("CLBlast {op} error: status {status}")]
    Native {
        /// Routine name
        op: &'static str,
        /// Returned status
        status: Status,
    },

    /// The native routine reported `CLBlastNotImplemented`
    #[error("CLBlast {op} error: status {status}: Not Implemented")]
    NotImplemented {
        /// Routine name
        op: &'static str,
        /// Returned status
        status: Status,
    },

    /// An OpenCL runtime call failed
    #[error("OpenCL {call} failed with code {code}")]
    OpenCl {
        /// OpenCL function name
        call: &'static str,
        /// OpenCL error code
        code: i32,
    },

    /// Generic internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an unsupported dtype error
    pub fn unsupported_dtype(dtype: Option<DType>, op: &'static str) -> Self {
        Self::UnsupportedDType { dtype, op }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// Returns true for errors raised while validating arguments, before any
    /// native call was made
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::DTypeMismatch { .. } | Self::UnsupportedDType { .. } | Self::InvalidArgument { .. }
        )
    }

    /// Native status code, for errors returned by a routine
    pub fn status(&self) -> Option<Status> {
        match self {
            Self::Native { status, .. } | Self::NotImplemented { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn dtype_name(dtype: &Option<DType>) -> &'static str {
    dtype.map_or("unset", DType::short_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_error_message_has_code_and_op() {
        let err = Error::Native {
            op: "scal",
            status: Status(-1),
        };
        let msg = err.to_string();
        assert!(msg.contains("scal"));
        assert!(msg.contains("-1"));
        assert!(!err.is_invalid_argument());
    }

    #[test]
    fn test_not_implemented_message() {
        let err = Error::NotImplemented {
            op: "rotg",
            status: Status::NOT_IMPLEMENTED,
        };
        assert!(err.to_string().ends_with("Not Implemented"));
        assert_eq!(err.status(), Some(Status::NOT_IMPLEMENTED));
    }

    #[test]
    fn test_mismatch_names_operands() {
        let err = Error::DTypeMismatch {
            lhs_arg: "X",
            lhs: Some(DType::F32),
            rhs_arg: "Y",
            rhs: None,
        };
        assert_eq!(
            err.to_string(),
            "unmatched data type for X and Y: f32 vs unset"
        );
        assert!(err.is_invalid_argument());
        assert!(Error::unsupported_dtype(Some(DType::I32), "dot")
            .to_string()
            .contains("unsupported data type"));
    }
}
