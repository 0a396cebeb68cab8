//! Command queues and event lists

use crate::native::types::{cl_command_queue, cl_event};

/// Ordered execution context owned by the runtime
///
/// # Safety
///
/// `raw()` must return a live `cl_command_queue`.
pub unsafe trait CommandQueue {
    /// Underlying OpenCL command queue
    fn raw(&self) -> cl_command_queue;
}

/// Receives completion events of enqueued routines
pub trait EventList {
    /// Take ownership of a populated event handle
    fn push_raw(&mut self, event: cl_event);

    /// Dispose of an event created by a routine that then reported failure
    ///
    /// The handle is never pushed. Lists that own their events release it here;
    /// the default drops it.
    fn discard_raw(&mut self, event: cl_event) {
        let _ = event;
    }
}
