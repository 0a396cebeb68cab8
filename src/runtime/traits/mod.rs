//! Traits describing the GPU runtime collaborator

pub mod buffer;
pub mod queue;
pub mod runtime;

pub use buffer::{DeviceBuffer, HostBuffer};
pub use queue::{CommandQueue, EventList};
pub use runtime::Runtime;
