//! Single-flight guard for reconnect attempts.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub(crate) struct ReconnectFlag {
    pending: AtomicBool,
}

impl ReconnectFlag {
    /// Claim the flag. `None` if another attempt already holds it.
    pub(crate) fn try_begin(&self) -> Option<ReconnectGuard<'_>> {
        self.pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ReconnectGuard { flag: self })
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

/// Releases the flag on drop, including on early return.
#[derive(Debug)]
pub(crate) struct ReconnectGuard<'a> {
    flag: &'a ReconnectFlag,
}

impl Drop for ReconnectGuard<'_> {
    fn drop(&mut self) {
        self.flag.pending.store(false, Ordering::Release);
    }
}
