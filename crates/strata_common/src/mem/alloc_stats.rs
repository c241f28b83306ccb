//! Per-thread bookkeeping of the memory handed out by the [`Mallocator`](crate::alloc::Mallocator).

/// Snapshot of the allocation statistics of the current thread.
///
/// Only allocations going through the [`Mallocator`](crate::alloc::Mallocator) are counted, zero-sized allocations are never counted.
/// Memory released on another thread than the one it was allocated on is subtracted from the releasing thread, saturating at 0.
/// When the `memory_tracking` feature is disabled, all counters stay at 0.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct AllocStats {
    /// Number of allocations that have not been released yet.
    pub live_allocs:  usize,
    /// Number of bytes that have not been released yet.
    pub live_bytes:   usize,
    /// Number of allocations performed since the thread started.
    pub total_allocs: usize,
}

cfg_if::cfg_if! {
    if #[cfg(feature = "memory_tracking")] {
        use core::cell::Cell;

        thread_local! {
            static TLS_ALLOC_STATS : Cell<AllocStats> = const { Cell::new(AllocStats { live_allocs: 0, live_bytes: 0, total_allocs: 0 }) };
        }

        pub(crate) fn record_alloc(size: usize) {
            TLS_ALLOC_STATS.with(|stats| {
                let mut cur = stats.get();
                cur.live_allocs += 1;
                cur.live_bytes += size;
                cur.total_allocs += 1;
                stats.set(cur);
            });
        }

        pub(crate) fn record_dealloc(size: usize) {
            TLS_ALLOC_STATS.with(|stats| {
                let mut cur = stats.get();
                cur.live_allocs = cur.live_allocs.saturating_sub(1);
                cur.live_bytes = cur.live_bytes.saturating_sub(size);
                stats.set(cur);
            });
        }

        /// Get the allocation statistics of the calling thread.
        pub fn thread_alloc_stats() -> AllocStats {
            TLS_ALLOC_STATS.with(Cell::get)
        }
    } else {
        #[inline(always)]
        pub(crate) fn record_alloc(_size: usize) {}

        #[inline(always)]
        pub(crate) fn record_dealloc(_size: usize) {}

        /// Get the allocation statistics of the calling thread.
        pub fn thread_alloc_stats() -> AllocStats {
            AllocStats::default()
        }
    }
}
