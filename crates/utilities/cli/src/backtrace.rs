//! Helper to enable backtraces.

use std::sync::Once;

static INIT: Once = Once::new();

/// Sets `RUST_BACKTRACE=1` unless the variable is already set.
///
/// Call it at the top of `main`, before the runtime spawns any threads.
pub fn enable() {
    INIT.call_once(|| {
        if std::env::var_os("RUST_BACKTRACE").is_none() {
            // SAFETY: runs once, from `main`, before any other thread reads the environment.
            unsafe { std::env::set_var("RUST_BACKTRACE", "1") };
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_is_idempotent() {
        enable();
        let first = std::env::var("RUST_BACKTRACE").unwrap();
        enable();
        assert_eq!(std::env::var("RUST_BACKTRACE").unwrap(), first);
    }
}
