//! Process-wide discovery and binding of the CLBlast library
//!
//! The first successful bind is kept for the life of the process and every later
//! construction reuses it. A failed attempt is not stored, so a later construction
//! tries again. Attempts are serialized. There is no unload.

use super::backend::Backend;
use super::library::ClBlastLibrary;
use super::shim::{ComplexPath, ShimLibrary};
use super::types::cl_device_id;
use crate::error::{Error, Result};
use crate::ops::{Blas, Math};
use crate::runtime::Runtime;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

/// Environment variable naming a CLBlast library to try first
pub const ENV_LIBRARY_PATH: &str = "CLBLAST_LIBRARY_PATH";
/// Environment variable naming a complex shim library to try first
pub const ENV_SHIM_PATH: &str = "CLBLAST_SHIM_PATH";
/// Environment variable selecting the complex strategy (`auto`, `direct`, `shim`)
pub const ENV_COMPLEX_PATH: &str = "CLBLAST_COMPLEX_PATH";

static LIBRARY: OnceLock<Arc<ClBlastLibrary>> = OnceLock::new();
static BIND_LOCK: Mutex<()> = parking_lot::const_mutex(());
static LOAD_ATTEMPTS: AtomicUsize = AtomicUsize::new(0);

/// Which calling strategy complex routines use
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ComplexPolicy {
    /// Shim on Linux, direct elsewhere
    #[default]
    Auto,
    /// Always pass complex scalars by value to CLBlast
    Direct,
    /// Always route complex scalars through the shim library
    Shim,
}

impl ComplexPolicy {
    /// Whether this policy selects the shim on the current platform
    pub fn uses_shim(self) -> bool {
        match self {
            ComplexPolicy::Auto => cfg!(target_os = "linux"),
            ComplexPolicy::Direct => false,
            ComplexPolicy::Shim => true,
        }
    }
}

impl FromStr for ComplexPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ComplexPolicy::Auto),
            "direct" => Ok(ComplexPolicy::Direct),
            "shim" => Ok(ComplexPolicy::Shim),
            other => Err(Error::invalid_argument(
                "complex policy",
                format!("expected auto, direct or shim, got '{other}'"),
            )),
        }
    }
}

/// Where to look for the native libraries
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoaderConfig {
    libraries: Vec<String>,
    shim_libraries: Vec<String>,
    complex: ComplexPolicy,
}

impl LoaderConfig {
    /// Empty configuration: no candidates, `Auto` policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform default candidates
    pub fn platform_default() -> Self {
        let libraries: &[&str] = if cfg!(windows) {
            &["clblast.dll"]
        } else if cfg!(target_os = "macos") {
            &["libclblast.dylib"]
        } else {
            &["libclblast.so", "libclblast.so.1"]
        };
        let shim_libraries: &[&str] = if cfg!(target_os = "linux") {
            &["librindowclblast.so"]
        } else {
            &[]
        };
        Self {
            libraries: libraries.iter().map(|s| s.to_string()).collect(),
            shim_libraries: shim_libraries.iter().map(|s| s.to_string()).collect(),
            complex: ComplexPolicy::Auto,
        }
    }

    /// Platform defaults, overridden by `CLBLAST_LIBRARY_PATH`,
    /// `CLBLAST_SHIM_PATH` and `CLBLAST_COMPLEX_PATH`
    pub fn from_env() -> Self {
        let mut config = Self::platform_default();
        if let Ok(path) = std::env::var(ENV_LIBRARY_PATH) {
            config = config.library_path(path);
        }
        if let Ok(path) = std::env::var(ENV_SHIM_PATH) {
            config = config.shim_path(path);
        }
        if let Ok(value) = std::env::var(ENV_COMPLEX_PATH) {
            match value.parse() {
                Ok(policy) => config.complex = policy,
                Err(e) => warn!(variable = ENV_COMPLEX_PATH, error = %e, "ignoring invalid value"),
            }
        }
        config
    }

    /// Try `path` before all other CLBlast candidates
    pub fn library_path(mut self, path: impl Into<String>) -> Self {
        self.libraries.insert(0, path.into());
        self
    }

    /// Try `path` before all other shim candidates
    pub fn shim_path(mut self, path: impl Into<String>) -> Self {
        self.shim_libraries.insert(0, path.into());
        self
    }

    /// Set the complex calling strategy
    pub fn complex_policy(mut self, policy: ComplexPolicy) -> Self {
        self.complex = policy;
        self
    }

    /// CLBlast candidates in try order
    pub fn libraries(&self) -> &[String] {
        &self.libraries
    }

    /// Shim candidates in try order
    pub fn shim_libraries(&self) -> &[String] {
        &self.shim_libraries
    }

    /// Complex calling strategy
    pub fn policy(&self) -> ComplexPolicy {
        self.complex
    }
}

fn bind(config: &LoaderConfig) -> Option<Arc<ClBlastLibrary>> {
    LOAD_ATTEMPTS.fetch_add(1, Ordering::SeqCst);

    for candidate in &config.libraries {
        debug!(library = %candidate, "trying CLBlast candidate");
        let complex = if config.complex.uses_shim() {
            ComplexPath::Shim(None)
        } else {
            ComplexPath::Direct
        };
        match ClBlastLibrary::open(candidate, complex) {
            Ok(mut library) => {
                if let ComplexPath::Shim(slot) = library.complex_path_mut() {
                    *slot = ShimLibrary::open_first(&config.shim_libraries);
                }
                info!(
                    library = %library.path(),
                    symbols = library.symbol_count(),
                    complex = library.complex_path().name(),
                    "bound CLBlast"
                );
                return Some(Arc::new(library));
            }
            Err(e) => debug!(library = %candidate, error = %e, "candidate not loaded"),
        }
    }

    warn!(candidates = ?config.libraries, "no CLBlast library could be loaded");
    None
}

/// Entry point: binds CLBlast once per process and hands out routine tables
#[derive(Clone, Debug)]
pub struct ClBlast {
    library: Option<Arc<ClBlastLibrary>>,
}

impl ClBlast {
    /// Bind using [`LoaderConfig::from_env`] unless already bound
    pub fn new() -> Self {
        Self::init(LoaderConfig::from_env)
    }

    /// Bind using `config` unless already bound
    ///
    /// `config` is ignored once any construction in this process has bound the
    /// library.
    pub fn with_config(config: &LoaderConfig) -> Self {
        Self::init(|| config.clone())
    }

    fn init(config: impl FnOnce() -> LoaderConfig) -> Self {
        if let Some(library) = LIBRARY.get() {
            return Self::bound(library);
        }
        let _guard = BIND_LOCK.lock();
        if let Some(library) = LIBRARY.get() {
            return Self::bound(library);
        }
        let library = bind(&config()).map(|library| LIBRARY.get_or_init(|| library).clone());
        Self { library }
    }

    fn bound(library: &Arc<ClBlastLibrary>) -> Self {
        Self {
            library: Some(library.clone()),
        }
    }

    /// Number of native bind attempts made in this process
    ///
    /// Stops growing once a bind has succeeded.
    pub fn load_attempts() -> usize {
        LOAD_ATTEMPTS.load(Ordering::SeqCst)
    }

    /// Returns true if CLBlast was bound
    pub fn is_available(&self) -> bool {
        self.library.is_some()
    }

    /// The bound library
    pub fn library(&self) -> Option<&Arc<ClBlastLibrary>> {
        self.library.as_ref()
    }

    fn backend(&self) -> Result<Arc<dyn Backend>> {
        match &self.library {
            Some(lib) => Ok(lib.clone() as Arc<dyn Backend>),
            None => Err(Error::LibraryNotLoaded),
        }
    }

    /// BLAS level 1/2/3 routines
    pub fn blas<R: Runtime>(&self) -> Result<Blas<R>> {
        Ok(Blas::new(self.backend()?))
    }

    /// Extension routines (convolution lowering, batched, element-wise)
    pub fn math<R: Runtime>(&self) -> Result<Math<R>> {
        Ok(Math::new(self.backend()?))
    }

    /// Release all kernels CLBlast has compiled
    pub fn clear_cache(&self) -> Result<()> {
        self.library
            .as_ref()
            .ok_or(Error::LibraryNotLoaded)?
            .clear_cache()
    }

    /// Compile and cache all kernels for `device`
    ///
    /// # Safety
    ///
    /// `device` must be a valid OpenCL device id.
    pub unsafe fn fill_cache(&self, device: cl_device_id) -> Result<()> {
        self.library
            .as_ref()
            .ok_or(Error::LibraryNotLoaded)?
            .fill_cache(device)
    }
}

impl Default for ClBlast {
    fn default() -> Self {
        Self::new()
    }
}
