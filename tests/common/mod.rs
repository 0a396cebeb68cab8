//! Common test utilities
//!
//! `SpyBackend` stands in for the native library: it records every call it
//! receives, returns a programmable status and fills the event slot like CLBlast
//! would. `MockRuntime` provides handle-only buffers, queues and event lists,
//! records the fallback copies it is asked to perform and the events it is asked
//! to discard, and can be told to fail the next copy.
#![allow(dead_code)]

use clblast::dtype::{DType, Precision};
use clblast::error::{Error, Result};
use clblast::native::types::{cl_command_queue, cl_event, cl_mem, Status};
use clblast::native::{Backend, CallArgs, NativeCall, Routine};
use clblast::runtime::{CommandQueue, DeviceBuffer, EventList, Runtime};
use clblast::{Blas, Math};
use std::cell::{Cell, RefCell};
use std::sync::{Arc, Mutex};

/// Handle written into every requested event slot by [`SpyBackend`]
pub const ROUTINE_EVENT: usize = 0xE7E7;
/// Handle appended by [`MockRuntime::copy_buffer`]
pub const COPY_EVENT: usize = 0xC0C0;
/// Queue handle of [`queue`]
pub const QUEUE: usize = 0x9999;

// =============================================================================
// Spy backend
// =============================================================================

/// One call observed by [`SpyBackend`]
#[derive(Clone, Debug)]
pub struct Recorded {
    pub routine: Routine,
    pub precision: Precision,
    pub args: CallArgs,
    /// Queue handle read through `NativeCall::queue`
    pub queue: usize,
    /// Whether an event slot was passed
    pub wants_event: bool,
}

pub struct SpyBackend {
    calls: Mutex<Vec<Recorded>>,
    status: Mutex<Status>,
}

impl SpyBackend {
    pub fn new() -> Arc<Self> {
        Self::with_status(Status::SUCCESS)
    }

    pub fn with_status(status: Status) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            status: Mutex::new(status),
        })
    }

    pub fn set_status(&self, status: Status) {
        *self.status.lock().unwrap() = status;
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last(&self) -> Recorded {
        self.calls
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no native call was made")
    }
}

impl Backend for SpyBackend {
    fn name(&self) -> &'static str {
        "spy"
    }

    unsafe fn enqueue(&self, call: &NativeCall) -> Result<Status> {
        let queue = if call.queue.is_null() {
            0
        } else {
            *call.queue as usize
        };
        self.calls.lock().unwrap().push(Recorded {
            routine: call.routine,
            precision: call.precision,
            args: call.args,
            queue,
            wants_event: !call.event.is_null(),
        });
        if !call.event.is_null() {
            *call.event = ROUTINE_EVENT as cl_event;
        }
        Ok(*self.status.lock().unwrap())
    }
}

// =============================================================================
// Mock runtime
// =============================================================================

/// One `copy_buffer` request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CopyRecord {
    pub src: usize,
    pub dst: usize,
    pub size_bytes: usize,
    pub src_offset: usize,
    pub dst_offset: usize,
}

thread_local! {
    static COPIES: RefCell<Vec<CopyRecord>> = const { RefCell::new(Vec::new()) };
    static DISCARDED: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
    static COPY_FAILURE: Cell<Option<i32>> = const { Cell::new(None) };
}

/// Copies requested from the current test thread
pub fn copies() -> Vec<CopyRecord> {
    COPIES.with(|c| c.borrow().clone())
}

/// Events discarded on the current test thread
pub fn discarded() -> Vec<usize> {
    DISCARDED.with(|d| d.borrow().clone())
}

/// Make the next `copy_buffer` on this thread fail with OpenCL error `code`
pub fn fail_next_copy(code: i32) {
    COPY_FAILURE.with(|f| f.set(Some(code)));
}

pub struct MockRuntime;

#[derive(Debug)]
pub struct MockBuffer {
    id: usize,
    dtype: Option<DType>,
    value_size: usize,
}

impl MockBuffer {
    pub fn new(id: usize, dtype: DType) -> Self {
        Self {
            id,
            dtype: Some(dtype),
            value_size: dtype.size_in_bytes(),
        }
    }

    pub fn untyped(id: usize, value_size: usize) -> Self {
        Self {
            id,
            dtype: None,
            value_size,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn mem(&self) -> cl_mem {
        self.id as cl_mem
    }
}

unsafe impl DeviceBuffer for MockBuffer {
    fn raw(&self) -> cl_mem {
        self.id as cl_mem
    }

    fn dtype(&self) -> Option<DType> {
        self.dtype
    }

    fn value_size(&self) -> usize {
        self.value_size
    }
}

pub struct MockQueue(pub usize);

unsafe impl CommandQueue for MockQueue {
    fn raw(&self) -> cl_command_queue {
        self.0 as cl_command_queue
    }
}

#[derive(Debug, Default)]
pub struct MockEvents(pub Vec<usize>);

impl EventList for MockEvents {
    fn push_raw(&mut self, event: cl_event) {
        self.0.push(event as usize);
    }

    fn discard_raw(&mut self, event: cl_event) {
        DISCARDED.with(|d| d.borrow_mut().push(event as usize));
    }
}

impl Runtime for MockRuntime {
    type Buffer = MockBuffer;
    type Queue = MockQueue;
    type Events = MockEvents;

    fn name() -> &'static str {
        "mock"
    }

    fn copy_buffer(
        _queue: &MockQueue,
        src: &MockBuffer,
        dst: &MockBuffer,
        size_bytes: usize,
        src_offset: usize,
        dst_offset: usize,
        events: Option<&mut MockEvents>,
    ) -> Result<()> {
        if let Some(code) = COPY_FAILURE.with(|f| f.take()) {
            return Err(Error::OpenCl {
                call: "clEnqueueCopyBuffer",
                code,
            });
        }
        COPIES.with(|c| {
            c.borrow_mut().push(CopyRecord {
                src: src.id,
                dst: dst.id,
                size_bytes,
                src_offset,
                dst_offset,
            })
        });
        if let Some(events) = events {
            events.push_raw(COPY_EVENT as cl_event);
        }
        Ok(())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn queue() -> MockQueue {
    MockQueue(QUEUE)
}

pub fn buf(id: usize, dtype: DType) -> MockBuffer {
    MockBuffer::new(id, dtype)
}

pub fn blas(spy: &Arc<SpyBackend>) -> Blas<MockRuntime> {
    Blas::new(spy.clone())
}

pub fn math(spy: &Arc<SpyBackend>) -> Math<MockRuntime> {
    Math::new(spy.clone())
}

/// Assert that `result` is an invalid-argument error and that no native call
/// was made
#[track_caller]
pub fn assert_rejected(result: Result<()>, spy: &SpyBackend) -> clblast::Error {
    let err = result.expect_err("call should have been rejected");
    assert!(err.is_invalid_argument(), "unexpected error kind: {err}");
    assert_eq!(spy.call_count(), 0, "native layer must not be reached");
    err
}
