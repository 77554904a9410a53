use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SEQUENCE_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CURRENT_SEQUENCE_ID: u64 = NEXT_SEQUENCE_ID.fetch_add(1, Ordering::Relaxed);
}

/// Debug-build guard for code that must run on one thread at a time.
///
/// The checker starts detached and attaches to whichever thread checks it
/// first; from then on [`check`](Self::check) asserts that the caller is that
/// same thread. This is an assertion, not a lock: release builds pay nothing,
/// and a violation means the calling code broke its sequencing contract.
#[derive(Debug, Default)]
pub struct SequenceChecker {
    /// Sequence id of the attached thread, or 0 while detached.
    attached: AtomicU64,
}

impl SequenceChecker {
    pub fn new() -> Self {
        Self { attached: AtomicU64::new(0) }
    }

    /// Returns whether the calling thread is the attached one, attaching it
    /// first if the checker is currently detached.
    pub fn is_current(&self) -> bool {
        let current = CURRENT_SEQUENCE_ID.with(|id| *id);
        match self.attached.compare_exchange(0, current, Ordering::AcqRel, Ordering::Acquire) {
            Ok(_) => true,
            Err(attached) => attached == current,
        }
    }

    /// Detaches the checker so the next check re-attaches it.
    pub fn detach(&self) {
        self.attached.store(0, Ordering::Release);
    }

    /// Asserts, in debug builds, that the caller runs on the attached thread.
    #[track_caller]
    pub fn check(&self) {
        debug_assert!(self.is_current(), "called from a thread outside the owning sequence");
    }
}
