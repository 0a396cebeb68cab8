//! Process-wide binding behaviour when no CLBlast library can be found
//!
//! Every test in this binary builds its loader from a configuration whose only
//! candidate does not exist, so the library is never bound here.

mod common;

use clblast::{ClBlast, Error, LoaderConfig};
use common::MockRuntime;

fn missing_library() -> LoaderConfig {
    LoaderConfig::new().library_path("/nonexistent/clblast/libclblast.so")
}

#[test]
fn test_failed_bind_reports_library_not_loaded() {
    let clblast = ClBlast::with_config(&missing_library());
    assert!(!clblast.is_available());
    assert!(clblast.library().is_none());
    assert!(matches!(
        clblast.blas::<MockRuntime>(),
        Err(Error::LibraryNotLoaded)
    ));
    assert!(matches!(
        clblast.math::<MockRuntime>(),
        Err(Error::LibraryNotLoaded)
    ));
    assert!(matches!(clblast.clear_cache(), Err(Error::LibraryNotLoaded)));
}

#[test]
fn test_failed_bind_is_retried() {
    let before = ClBlast::load_attempts();
    for _ in 0..3 {
        let clblast = ClBlast::with_config(&missing_library());
        assert!(!clblast.is_available());
    }
    let threads: Vec<_> = (0..4)
        .map(|_| std::thread::spawn(|| ClBlast::with_config(&missing_library()).is_available()))
        .collect();
    for t in threads {
        assert!(!t.join().unwrap());
    }
    // other tests in this binary may attempt concurrently
    assert!(ClBlast::load_attempts() >= before + 7);
}
