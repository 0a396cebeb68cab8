//! The seam between routine wrappers and native code

use super::call::NativeCall;
use super::types::Status;
use crate::error::Result;

/// Executes marshalled routine calls
///
/// [`ClBlastLibrary`](super::ClBlastLibrary) is the production implementation;
/// tests substitute a recording backend to observe exactly which routine would
/// be called with which arguments.
pub trait Backend: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Invoke the routine described by `call` and return its status
    ///
    /// Errors are reserved for failures to reach the routine (missing symbol,
    /// missing shim); a routine that runs and fails reports it through the
    /// returned [`Status`].
    ///
    /// # Safety
    ///
    /// Every handle and pointer in `call` must be valid for the duration of the
    /// call, and `call.event`, when non-null, must point to a writable slot.
    unsafe fn enqueue(&self, call: &NativeCall) -> Result<Status>;
}
