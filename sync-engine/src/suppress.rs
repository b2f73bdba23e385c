//! Scoped suppression flags.
//!
//! A flag is raised immediately before a guarded write and lowered when the
//! returned guard is dropped, so it can never outlive the write.

use std::sync::atomic::{AtomicBool, Ordering};

/// One suppression flag, private to a session.
#[derive(Debug, Default)]
pub(crate) struct SuppressFlag(AtomicBool);

impl SuppressFlag {
    /// Raise the flag until the guard is dropped.
    pub(crate) fn raise(&self) -> FlagGuard<'_> {
        self.0.store(true, Ordering::SeqCst);
        FlagGuard(&self.0)
    }

    /// Check whether a guarded write is in progress.
    pub(crate) fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Lowers its flag on drop.
#[must_use = "the flag is lowered as soon as the guard is dropped"]
pub(crate) struct FlagGuard<'a>(&'a AtomicBool);

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_starts_lowered() {
        assert!(!SuppressFlag::default().is_raised());
    }

    #[test]
    fn guard_scopes_the_flag() {
        let flag = SuppressFlag::default();
        {
            let _guard = flag.raise();
            assert!(flag.is_raised());
        }
        assert!(!flag.is_raised());
    }
}
