//! GPU runtime collaborator
//!
//! This module defines the `Runtime` trait and the handle traits the routine
//! wrappers are generic over, plus an implementation over raw OpenCL handles.
//!
//! # Architecture
//!
//! ```text
//! Runtime (backend identity, device-to-device copy)
//! ├── Buffer: DeviceBuffer (cl_mem + element type)
//! ├── Queue: CommandQueue (cl_command_queue)
//! └── Events: EventList (receives cl_event completion tokens)
//!
//! HostBuffer (host arrays of per-batch offsets/scalars)
//! ```

pub mod traits;

#[cfg(feature = "opencl")]
pub mod opencl;

pub use traits::{CommandQueue, DeviceBuffer, EventList, HostBuffer, Runtime};

#[cfg(feature = "opencl")]
pub use opencl::{ClBuffer, ClEventList, ClQueue, OpenClRuntime};
