//! Core trait for the GPU runtime collaborator

use super::{CommandQueue, DeviceBuffer, EventList};
use crate::error::Result;

/// The OpenCL-like runtime that owns buffers, queues and events
///
/// The binding never creates or frees runtime objects. It reads raw handles
/// through the associated types and, for element types CLBlast cannot copy,
/// asks the runtime for a plain device-to-device byte copy.
///
/// # Associated Types
///
/// - `Buffer`: device memory with a declared element type
/// - `Queue`: ordered execution context every routine enqueues into
/// - `Events`: list receiving completion events
///
/// # Example
///
/// ```ignore
/// fn scale<R: Runtime>(blas: &Blas<R>, x: &R::Buffer, queue: &R::Queue) -> Result<()> {
///     blas.scal(4, 2.0, x, 0, 1, queue, None)
/// }
/// ```
pub trait Runtime: Send + Sync + 'static {
    /// Device buffer type
    type Buffer: DeviceBuffer;

    /// Command queue type
    type Queue: CommandQueue;

    /// Event list type
    type Events: EventList;

    /// Human-readable name of this runtime
    fn name() -> &'static str;

    /// Enqueue a device-to-device copy of `size_bytes` bytes
    ///
    /// Offsets are in bytes. When `events` is given, the completion event of the
    /// copy is appended to it.
    fn copy_buffer(
        queue: &Self::Queue,
        src: &Self::Buffer,
        dst: &Self::Buffer,
        size_bytes: usize,
        src_offset: usize,
        dst_offset: usize,
        events: Option<&mut Self::Events>,
    ) -> Result<()>;
}
