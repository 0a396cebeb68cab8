//! Raw-handle OpenCL runtime
//!
//! Wraps `cl_mem` / `cl_command_queue` / `cl_event` handles created elsewhere
//! (by an OpenCL crate or by C code) so they can be passed to the routine
//! wrappers. The three OpenCL entry points the binding itself needs are loaded
//! from the ICD loader on first use.

use super::traits::{CommandQueue, DeviceBuffer, EventList, Runtime};
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::native::types::{cl_command_queue, cl_event, cl_mem};
use libloading::Library;
use std::ffi::c_int;
use std::ptr;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Environment variable naming the OpenCL ICD loader to use
pub const ENV_OPENCL_LIBRARY_PATH: &str = "OPENCL_LIBRARY_PATH";

type EnqueueCopyBufferFn = unsafe extern "C" fn(
    cl_command_queue,
    cl_mem,
    cl_mem,
    usize,
    usize,
    usize,
    u32,
    *const cl_event,
    *mut cl_event,
) -> c_int;
type WaitForEventsFn = unsafe extern "C" fn(u32, *const cl_event) -> c_int;
type ReleaseEventFn = unsafe extern "C" fn(cl_event) -> c_int;

struct OpenClApi {
    enqueue_copy_buffer: EnqueueCopyBufferFn,
    wait_for_events: WaitForEventsFn,
    release_event: ReleaseEventFn,
    _lib: Library,
}

static OPENCL: OnceLock<std::result::Result<OpenClApi, String>> = OnceLock::new();

fn candidates() -> Vec<String> {
    let mut list = Vec::new();
    if let Ok(path) = std::env::var(ENV_OPENCL_LIBRARY_PATH) {
        list.push(path);
    }
    let defaults: &[&str] = if cfg!(windows) {
        &["OpenCL.dll"]
    } else if cfg!(target_os = "macos") {
        &["/System/Library/Frameworks/OpenCL.framework/OpenCL"]
    } else {
        &["libOpenCL.so.1", "libOpenCL.so"]
    };
    list.extend(defaults.iter().map(|s| s.to_string()));
    list
}

fn load_api() -> std::result::Result<OpenClApi, String> {
    let mut last_error = String::from("no candidates");
    for candidate in candidates() {
        // SAFETY: the ICD loader has no initialization side effects we depend on.
        let lib = match unsafe { Library::new(&candidate) } {
            Ok(lib) => lib,
            Err(e) => {
                debug!(library = %candidate, error = %e, "OpenCL candidate not loaded");
                last_error = format!("{candidate}: {e}");
                continue;
            }
        };
        // SAFETY: signatures as declared in CL/cl.h.
        let api = unsafe {
            let enqueue_copy_buffer = lib.get::<EnqueueCopyBufferFn>(b"clEnqueueCopyBuffer\0");
            let wait_for_events = lib.get::<WaitForEventsFn>(b"clWaitForEvents\0");
            let release_event = lib.get::<ReleaseEventFn>(b"clReleaseEvent\0");
            match (enqueue_copy_buffer, wait_for_events, release_event) {
                (Ok(copy), Ok(wait), Ok(release)) => Some((*copy, *wait, *release)),
                _ => None,
            }
        };
        match api {
            Some((enqueue_copy_buffer, wait_for_events, release_event)) => {
                return Ok(OpenClApi {
                    enqueue_copy_buffer,
                    wait_for_events,
                    release_event,
                    _lib: lib,
                })
            }
            None => last_error = format!("{candidate}: missing OpenCL entry points"),
        }
    }
    warn!(error = %last_error, "OpenCL runtime library could not be loaded");
    Err(last_error)
}

fn api() -> Result<&'static OpenClApi> {
    OPENCL
        .get_or_init(load_api)
        .as_ref()
        .map_err(|e| Error::Internal(format!("OpenCL runtime unavailable: {e}")))
}

fn check(call: &'static str, code: c_int) -> Result<()> {
    if code == 0 {
        Ok(())
    } else {
        Err(Error::OpenCl { call, code })
    }
}

/// OpenCL runtime over raw handles
#[derive(Copy, Clone, Debug, Default)]
pub struct OpenClRuntime;

impl Runtime for OpenClRuntime {
    type Buffer = ClBuffer;
    type Queue = ClQueue;
    type Events = ClEventList;

    fn name() -> &'static str {
        "opencl"
    }

    fn copy_buffer(
        queue: &ClQueue,
        src: &ClBuffer,
        dst: &ClBuffer,
        size_bytes: usize,
        src_offset: usize,
        dst_offset: usize,
        events: Option<&mut ClEventList>,
    ) -> Result<()> {
        let api = api()?;
        let mut event: cl_event = ptr::null_mut();
        let event_slot = if events.is_some() {
            &mut event as *mut cl_event
        } else {
            ptr::null_mut()
        };
        // SAFETY: the handles are live per the ClBuffer/ClQueue constructors.
        let code = unsafe {
            (api.enqueue_copy_buffer)(
                queue.raw,
                src.mem,
                dst.mem,
                src_offset,
                dst_offset,
                size_bytes,
                0,
                ptr::null(),
                event_slot,
            )
        };
        check("clEnqueueCopyBuffer", code)?;
        if let Some(list) = events {
            list.push_raw(event);
        }
        Ok(())
    }
}

/// A `cl_mem` with its element type
#[derive(Debug)]
pub struct ClBuffer {
    mem: cl_mem,
    dtype: Option<DType>,
    value_size: usize,
}

impl ClBuffer {
    /// Wrap a memory object holding elements of `dtype`
    ///
    /// # Safety
    ///
    /// `mem` must be a valid memory object that outlives the returned value.
    pub unsafe fn from_raw(mem: cl_mem, dtype: DType) -> Self {
        Self {
            mem,
            dtype: Some(dtype),
            value_size: dtype.size_in_bytes(),
        }
    }

    /// Wrap a memory object whose element type is not declared
    ///
    /// # Safety
    ///
    /// `mem` must be a valid memory object that outlives the returned value.
    pub unsafe fn untyped(mem: cl_mem, value_size: usize) -> Self {
        Self {
            mem,
            dtype: None,
            value_size,
        }
    }
}

unsafe impl DeviceBuffer for ClBuffer {
    fn raw(&self) -> cl_mem {
        self.mem
    }

    fn dtype(&self) -> Option<DType> {
        self.dtype
    }

    fn value_size(&self) -> usize {
        self.value_size
    }
}

/// A `cl_command_queue`
#[derive(Debug)]
pub struct ClQueue {
    raw: cl_command_queue,
}

impl ClQueue {
    /// Wrap a command queue
    ///
    /// # Safety
    ///
    /// `raw` must be a valid command queue that outlives the returned value.
    pub unsafe fn from_raw(raw: cl_command_queue) -> Self {
        Self { raw }
    }
}

unsafe impl CommandQueue for ClQueue {
    fn raw(&self) -> cl_command_queue {
        self.raw
    }
}

/// Owned completion events; released when the list is dropped
#[derive(Debug, Default)]
pub struct ClEventList {
    events: Vec<cl_event>,
}

impl ClEventList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of held events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if no event is held
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Held event handles
    pub fn as_raw(&self) -> &[cl_event] {
        &self.events
    }

    /// Block until every held event has completed
    ///
    /// Null handles are skipped.
    pub fn wait(&self) -> Result<()> {
        let live: Vec<cl_event> = self
            .events
            .iter()
            .copied()
            .filter(|event| !event.is_null())
            .collect();
        if live.is_empty() {
            return Ok(());
        }
        let api = api()?;
        let count = u32::try_from(live.len())
            .map_err(|_| Error::invalid_argument("events", "too many events to wait on"))?;
        // SAFETY: every non-null handle came from a successful enqueue.
        let code = unsafe { (api.wait_for_events)(count, live.as_ptr()) };
        check("clWaitForEvents", code)
    }
}

fn release(event: cl_event) {
    let Ok(api) = api() else {
        return;
    };
    // SAFETY: the caller owns one reference to `event`.
    let code = unsafe { (api.release_event)(event) };
    if code != 0 {
        debug!(code, "clReleaseEvent failed");
    }
}

impl EventList for ClEventList {
    fn push_raw(&mut self, event: cl_event) {
        self.events.push(event);
    }

    fn discard_raw(&mut self, event: cl_event) {
        if !event.is_null() {
            release(event);
        }
    }
}

impl Drop for ClEventList {
    fn drop(&mut self) {
        for event in self.events.drain(..) {
            if !event.is_null() {
                release(event);
            }
        }
    }
}
