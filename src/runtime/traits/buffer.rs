//! Device and host buffer handles

use crate::dtype::{DType, Element};
use crate::native::types::cl_mem;
use std::ffi::c_void;

/// GPU-resident memory owned by the runtime
///
/// # Safety
///
/// `raw()` must return a live `cl_mem` for as long as the buffer exists, and
/// `dtype()`/`value_size()` must describe the elements actually stored in it;
/// CLBlast indexes the buffer based on them.
pub unsafe trait DeviceBuffer {
    /// Underlying OpenCL memory object
    fn raw(&self) -> cl_mem;

    /// Declared element type, or `None` if the buffer is untyped
    ///
    /// Untyped output buffers match any operand type.
    fn dtype(&self) -> Option<DType>;

    /// Size of one element in bytes
    fn value_size(&self) -> usize;
}

/// Host-resident array handed to batched routines (per-batch offsets and
/// scalars)
///
/// # Safety
///
/// `as_ptr()` must point to `len()` contiguous elements of type `dtype()` that
/// stay valid and unmodified while a routine using them is being enqueued.
pub unsafe trait HostBuffer {
    /// Number of elements
    fn len(&self) -> usize;

    /// Element type
    fn dtype(&self) -> DType;

    /// Address of the first element
    fn as_ptr(&self) -> *const c_void;

    /// Returns true if the buffer has no elements
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

unsafe impl<T: Element> HostBuffer for [T] {
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn dtype(&self) -> DType {
        T::DTYPE
    }

    fn as_ptr(&self) -> *const c_void {
        <[T]>::as_ptr(self).cast()
    }
}

unsafe impl<T: Element> HostBuffer for Vec<T> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn dtype(&self) -> DType {
        T::DTYPE
    }

    fn as_ptr(&self) -> *const c_void {
        self.as_slice().as_ptr().cast()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn describe<B: HostBuffer + ?Sized>(buf: &B) -> (usize, DType) {
        (buf.len(), buf.dtype())
    }

    #[test]
    fn test_host_buffers_report_element_type() {
        let offsets: Vec<u64> = vec![0, 4, 8];
        assert_eq!(describe(&offsets), (3, DType::U64));
        assert_eq!(describe(&[1.0f32, 2.0][..]), (2, DType::F32));
        assert_eq!(
            HostBuffer::as_ptr(&offsets),
            offsets.as_ptr() as *const c_void
        );
        assert!(HostBuffer::is_empty(&Vec::<i64>::new()));
    }
}
