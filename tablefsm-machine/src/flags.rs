//! Event flag accumulation between asynchronous producers and one consumer.

/// A word of event flags, one bit per named event.
pub type EventMask = u32;

/// The mask with bit `n` set.
pub const fn bit(n: u32) -> EventMask {
    1 << n
}

#[cfg(feature = "tokio")]
pub use sink::EventSet;

#[cfg(feature = "tokio")]
mod sink {
    use super::EventMask;
    use core::sync::atomic::{AtomicU32, Ordering};
    use tokio::sync::Notify;
    use tokio::time::{timeout, Duration};

    /// An addressable set of pending event flags.
    ///
    /// Producers `post` bits from any context, merging them into the pending
    /// word with an atomic OR. The single consumer waits for a mask of
    /// interest and consumes the matched bits. Posts that land between two
    /// waits coalesce: the consumer observes the union, not a count.
    ///
    /// The wait is the consumer's sole suspension point. With exactly one
    /// consumer no further locking is needed; the word itself is the only
    /// shared state.
    #[derive(Debug, Default)]
    pub struct EventSet {
        bits: AtomicU32,
        wakeup: Notify,
    }

    impl EventSet {
        pub fn new() -> Self {
            Default::default()
        }

        /// Merge `flags` into the pending set and wake the consumer.
        ///
        /// Callable from any producer context. Never blocks, never fails.
        pub fn post(&self, flags: EventMask) {
            self.bits.fetch_or(flags, Ordering::SeqCst);
            self.wakeup.notify_one();
        }

        /// The pending word as of this instant, without consuming anything.
        pub fn peek(&self) -> EventMask {
            self.bits.load(Ordering::SeqCst)
        }

        /// Resolve once any bit of `mask` is pending and consume the matched
        /// bits. Returns the whole pending word observed at wake, which may
        /// include bits outside `mask`; those stay pending.
        pub async fn wait_and_clear(&self, mask: EventMask) -> EventMask {
            self.wait_inner(mask, true).await
        }

        /// As `wait_and_clear`, but leave the flags pending.
        pub async fn wait(&self, mask: EventMask) -> EventMask {
            self.wait_inner(mask, false).await
        }

        /// Bounded `wait_and_clear`. `None` means the interval passed with
        /// no bit of `mask` posted, which callers treat as a quiet cycle.
        pub async fn wait_and_clear_timeout(
            &self,
            mask: EventMask,
            limit: Duration,
        ) -> Option<EventMask> {
            timeout(limit, self.wait_and_clear(mask)).await.ok()
        }

        async fn wait_inner(&self, mask: EventMask, clear: bool) -> EventMask {
            loop {
                let bits = self.bits.load(Ordering::SeqCst);
                if bits & mask != 0 {
                    if clear {
                        self.bits.fetch_and(!(bits & mask), Ordering::SeqCst);
                    }
                    return bits;
                }
                // a post landing between the check above and this await
                // leaves a stored permit, so the wakeup cannot be lost
                self.wakeup.notified().await;
            }
        }
    }
}
