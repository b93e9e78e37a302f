//! Termination signals raise a flag; the scheduler does the teardown.

use std::io;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Register SIGINT, SIGTERM, and SIGHUP to set a shared shutdown flag.
///
/// # Errors
///
/// Fails if a handler cannot be installed.
pub fn shutdown_flag() -> io::Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    #[cfg(unix)]
    {
        use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
        for signal in [SIGINT, SIGTERM, SIGHUP] {
            signal_hook::flag::register(signal, Arc::clone(&flag))?;
        }
    }
    Ok(flag)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_sighup_raises_flag() {
        let flag = shutdown_flag().unwrap();
        assert!(!flag.load(Ordering::SeqCst));
        signal_hook::low_level::raise(signal_hook::consts::SIGHUP).unwrap();
        assert!(flag.load(Ordering::SeqCst));
    }
}
