//! Single-slot, overwrite-latest cross-thread signals.
//!
//! Moves a "canvas resized to (w, h)" notification from an asynchronous UI
//! callback to the frame loop without blocking either side: the writer
//! stores, the reader swaps the slot empty. Intermediate sizes are
//! deliberately lost; only the newest matters by the time a frame starts.

use std::sync::atomic::{AtomicU64, Ordering};

/// Slot value meaning "no pending signal". Packs as an impossible size
/// (`u32::MAX` by `u32::MAX`).
const EMPTY: u64 = u64::MAX;

/// Wait-free, last-write-wins handoff for viewport resize notifications.
#[derive(Debug)]
pub struct ViewportResizeSignal {
    slot: AtomicU64,
}

impl ViewportResizeSignal {
    /// Create an empty signal.
    pub const fn new() -> Self {
        Self {
            slot: AtomicU64::new(EMPTY),
        }
    }

    /// Post a new size, overwriting any unread one.
    ///
    /// Never blocks; safe to call from any thread. Sizes of
    /// `u32::MAX x u32::MAX` are reserved and clamped down by one.
    pub fn post(&self, width: u32, height: u32) {
        let packed = (u64::from(width) << 32) | u64::from(height);
        let packed = if packed == EMPTY { packed - 1 } else { packed };
        self.slot.store(packed, Ordering::Release);
    }

    /// Take the latest posted size, clearing the slot.
    ///
    /// Never blocks; returns `None` when nothing was posted since the last
    /// take.
    pub fn take(&self) -> Option<(u32, u32)> {
        let packed = self.slot.swap(EMPTY, Ordering::Acquire);
        if packed == EMPTY {
            return None;
        }
        #[allow(clippy::cast_possible_truncation)]
        Some(((packed >> 32) as u32, packed as u32))
    }
}

impl Default for ViewportResizeSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_signal_reads_none() {
        let signal = ViewportResizeSignal::new();
        assert_eq!(signal.take(), None);
    }

    #[test]
    fn test_last_writer_wins_and_read_clears() {
        let signal = ViewportResizeSignal::new();
        signal.post(640, 480);
        signal.post(800, 600);

        assert_eq!(signal.take(), Some((800, 600)));
        assert_eq!(signal.take(), None);
    }

    #[test]
    fn test_write_between_reads_not_lost() {
        let signal = ViewportResizeSignal::new();
        signal.post(1, 2);
        assert_eq!(signal.take(), Some((1, 2)));

        signal.post(3, 4);
        assert_eq!(signal.take(), Some((3, 4)));
    }

    #[test]
    fn test_cross_thread_handoff() {
        use std::sync::Arc;

        let signal = Arc::new(ViewportResizeSignal::new());
        let writer = Arc::clone(&signal);
        let handle = std::thread::spawn(move || {
            writer.post(320, 200);
        });
        handle.join().expect("writer thread");

        assert_eq!(signal.take(), Some((320, 200)));
    }
}
