//! Shared validation and enqueue path of every routine wrapper
//!
//! A wrapper validates its operands with the `ensure_*` helpers, selects a
//! [`Precision`] with [`precision_for`], lowers its arguments into
//! [`CallArgs`], and hands them to [`enqueue`], which owns the queue/event
//! slots and the status check.

use crate::dtype::{DType, Precision};
use crate::error::{Error, Result};
use crate::native::call::{CallArgs, Matrix, NativeCall, Region, StridedMatrix, Vector};
use crate::native::types::{cl_event, Status, Transpose};
use crate::native::{Backend, Routine};
use crate::runtime::{CommandQueue, DeviceBuffer, EventList};
use std::ffi::c_int;
use std::ptr;
use tracing::trace;

/// Both operands must carry the same dtype.
pub(crate) fn ensure_same(
    lhs_arg: &'static str,
    lhs: Option<DType>,
    rhs_arg: &'static str,
    rhs: Option<DType>,
) -> Result<()> {
    if lhs == rhs {
        Ok(())
    } else {
        Err(Error::DTypeMismatch {
            lhs_arg,
            lhs,
            rhs_arg,
            rhs,
        })
    }
}

/// An output buffer with an undeclared dtype matches anything.
pub(crate) fn ensure_same_or_unset(
    reference_arg: &'static str,
    reference: Option<DType>,
    out_arg: &'static str,
    out: Option<DType>,
) -> Result<()> {
    match out {
        None => Ok(()),
        Some(_) => ensure_same(reference_arg, reference, out_arg, out),
    }
}

/// Every operand must carry the dtype of the first one.
pub(crate) fn ensure_all_same(operands: &[(&'static str, Option<DType>)]) -> Result<()> {
    let Some(&(first_arg, first)) = operands.first() else {
        return Ok(());
    };
    operands
        .iter()
        .skip(1)
        .try_for_each(|&(arg, dtype)| ensure_same(first_arg, first, arg, dtype))
}

/// Native precision of `dtype` for `routine`, or `UnsupportedDType`.
pub(crate) fn precision_for(routine: Routine, dtype: Option<DType>) -> Result<Precision> {
    dtype
        .and_then(DType::precision)
        .filter(|&p| routine.supports(p))
        .ok_or_else(|| Error::unsupported_dtype(dtype, routine.name()))
}

/// CLBlast code of a transpose operand; `ConjNoTrans` has none.
pub(crate) fn transpose_code(arg: &'static str, trans: Transpose) -> Result<c_int> {
    trans.to_native().ok_or_else(|| {
        Error::invalid_argument(arg, "CLBlast does not support ConjNoTrans")
    })
}

/// Map a routine status to `Ok` or the matching error.
pub(crate) fn check_status(routine: Routine, status: Status) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else if status == Status::NOT_IMPLEMENTED {
        Err(Error::NotImplemented {
            op: routine.name(),
            status,
        })
    } else {
        Err(Error::Native {
            op: routine.name(),
            status,
        })
    }
}

pub(crate) fn vector<B: DeviceBuffer>(buf: &B, offset: usize, inc: usize) -> Vector {
    Vector {
        mem: buf.raw(),
        offset,
        inc,
    }
}

pub(crate) fn matrix<B: DeviceBuffer>(buf: &B, offset: usize, ld: usize) -> Matrix {
    Matrix {
        mem: buf.raw(),
        offset,
        ld,
    }
}

pub(crate) fn strided<B: DeviceBuffer>(
    buf: &B,
    offset: usize,
    ld: usize,
    stride: usize,
) -> StridedMatrix {
    StridedMatrix {
        mem: buf.raw(),
        offset,
        ld,
        stride,
    }
}

pub(crate) fn region<B: DeviceBuffer>(buf: &B, offset: usize) -> Region {
    Region {
        mem: buf.raw(),
        offset,
    }
}

/// Enqueue one routine and hand its completion event to `events`.
///
/// `args` may only carry handles and host pointers borrowed from the caller's
/// operands, so they outlive the call.
pub(crate) fn enqueue<Q, L>(
    backend: &dyn Backend,
    routine: Routine,
    precision: Precision,
    args: CallArgs,
    queue: &Q,
    events: Option<&mut L>,
) -> Result<()>
where
    Q: CommandQueue + ?Sized,
    L: EventList + ?Sized,
{
    let mut queue_handle = queue.raw();
    let mut event: cl_event = ptr::null_mut();
    let event_slot = if events.is_some() {
        &mut event as *mut cl_event
    } else {
        ptr::null_mut()
    };

    let call = NativeCall {
        routine,
        precision,
        args,
        queue: &mut queue_handle,
        event: event_slot,
    };
    trace!(backend = backend.name(), %routine, ?precision, "dispatch");

    // SAFETY: buffer and queue handles come from DeviceBuffer/CommandQueue
    // implementations, which guarantee they are live; the queue and event
    // slots are locals that outlive the call.
    let status = unsafe { backend.enqueue(&call)? };
    let checked = check_status(routine, status);

    if let Some(list) = events {
        match checked {
            Ok(()) => list.push_raw(event),
            Err(_) if !event.is_null() => list.discard_raw(event),
            Err(_) => {}
        }
    }
    checked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_output_is_wildcard() {
        assert!(ensure_same_or_unset("X", Some(DType::F32), "R", None).is_ok());
        assert!(ensure_same_or_unset("X", Some(DType::F32), "R", Some(DType::F32)).is_ok());
        let err =
            ensure_same_or_unset("X", Some(DType::F32), "R", Some(DType::F64)).unwrap_err();
        assert!(matches!(
            err,
            Error::DTypeMismatch {
                lhs_arg: "X",
                rhs_arg: "R",
                ..
            }
        ));
    }

    #[test]
    fn test_unset_input_is_not_wildcard() {
        assert!(ensure_same("X", None, "Y", Some(DType::F32)).is_err());
    }

    #[test]
    fn test_all_same_names_first_offender() {
        let err = ensure_all_same(&[
            ("A", Some(DType::F64)),
            ("B", Some(DType::F64)),
            ("C", Some(DType::F32)),
            ("S", Some(DType::F32)),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            Error::DTypeMismatch {
                lhs_arg: "A",
                rhs_arg: "C",
                ..
            }
        ));
    }

    #[test]
    fn test_precision_for_respects_table() {
        assert_eq!(
            precision_for(Routine::Gemm, Some(DType::Complex64)).unwrap(),
            Precision::ComplexSingle
        );
        assert!(precision_for(Routine::Had, Some(DType::Complex64)).is_err());
        assert!(precision_for(Routine::Scal, Some(DType::I32)).is_err());
        assert!(precision_for(Routine::Scal, None).is_err());
    }

    #[test]
    fn test_status_mapping() {
        assert!(check_status(Routine::Scal, Status::SUCCESS).is_ok());
        assert!(matches!(
            check_status(Routine::Rotg, Status::NOT_IMPLEMENTED),
            Err(Error::NotImplemented { op: "rotg", .. })
        ));
        assert!(matches!(
            check_status(Routine::Gemm, Status(-1017)),
            Err(Error::Native { op: "gemm", .. })
        ));
    }

    #[test]
    fn test_conj_no_trans_rejected() {
        assert_eq!(transpose_code("transA", Transpose::Trans).unwrap(), 112);
        assert!(transpose_code("transA", Transpose::ConjNoTrans)
            .unwrap_err()
            .is_invalid_argument());
    }
}
