#![doc = include_str!("../README.md")]
#![no_std]
#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod adapter;
pub mod error;
pub mod flags;

#[cfg(feature = "alloc")]
pub mod output;

use crate::flags::EventMask;

/// The ability to receive the event snapshot for one step.
///
/// The driver overwrites the context's pending snapshot with the flags it
/// consumed before each step; the snapshot is not a queue, so events that
/// arrived between two steps are observed as their union.
pub trait Deliver {
    fn deliver(&mut self, events: EventMask);
}

#[cfg(feature = "tokio")]
pub use driver::Driver;

#[cfg(feature = "tokio")]
mod driver {
    use crate::{
        adapter::{Adapter, Discard},
        error::{Error, Result},
        flags::{EventMask, EventSet},
        Deliver,
    };
    use core::future::Future;
    use std::sync::Arc;
    use tablefsm::{Drain, State, StateMachine};
    use tokio::time::Duration;

    /// A `Driver` runs a table driven state machine in a rust task.
    ///
    /// The driver owns the machine, the per-session context and the event
    /// set, and is the machine's single consumer: it waits for event flags,
    /// delivers the consumed snapshot into the context, runs exactly one
    /// step, then flushes whatever the step pushed into the context to the
    /// connected output adapters. Steps run to completion between waits, so
    /// state is never observed mid-transition.
    ///
    /// By default a driver runs forever. A halt mask designates control bits
    /// that end the loop gracefully, handing back the final state and the
    /// context; the machine's one fatal condition, a transition to a key
    /// absent from the table, ends it with an error. An idle timeout bounds
    /// each wait, and an expired wait is a quiet cycle: the loop goes back
    /// to waiting without running a step.
    pub struct Driver<K: 'static, C, O = Discard<<C as Drain>::Item>>
    where
        C: Drain + 'static,
    {
        machine: StateMachine<K, C>,
        context: C,
        events: Arc<EventSet>,
        mask: EventMask,
        halt: EventMask,
        idle_timeout: Option<Duration>,
        output: O,
    }

    impl<K, C> Driver<K, C>
    where
        K: Copy + PartialEq,
        C: Drain,
    {
        /// A driver over the given table and context, consuming the event
        /// bits in `mask`.
        pub fn new(table: &'static [State<K, C>], context: C, mask: EventMask) -> Self {
            Driver {
                machine: StateMachine::new(table),
                context,
                events: Arc::new(EventSet::new()),
                mask,
                halt: 0,
                idle_timeout: None,
                output: Discard::default(),
            }
        }
    }

    impl<K, C, O> Driver<K, C, O>
    where
        K: Copy + PartialEq,
        C: Drain,
    {
        /// A handle for producers. Any number of clones can post, from any
        /// task or callback context.
        pub fn events(&self) -> Arc<EventSet> {
            self.events.clone()
        }

        /// Connect a channel sender or adapter for the items the context
        /// accumulates.
        ///
        /// Any number can be connected, enabling fan-out. Each receives
        /// every item, and a stalling adapter stalls the driver.
        pub fn with_output<T>(self, output: T) -> Driver<K, C, impl Adapter<Item = C::Item>>
        where
            T: Adapter<Item = C::Item>,
            O: Adapter<Item = C::Item>,
            C::Item: Send + Clone,
        {
            Driver {
                machine: self.machine,
                context: self.context,
                events: self.events,
                mask: self.mask,
                halt: self.halt,
                idle_timeout: self.idle_timeout,
                output: self.output.merge(output),
            }
        }

        /// Designate control bits that end the loop gracefully.
        pub fn with_halt_mask(mut self, mask: EventMask) -> Self {
            self.halt = mask;
            self
        }

        /// Bound each wait. An expired wait is a quiet cycle, not an error.
        pub fn with_idle_timeout(mut self, limit: Duration) -> Self {
            self.idle_timeout = Some(limit);
            self
        }

        /// Convert this driver into a future that will run as a task,
        /// starting from the given initial state.
        #[allow(clippy::manual_async_fn)]
        pub fn task(mut self, initial: K) -> impl Future<Output = Result<(K, C)>> + Send
        where
            K: Send + Sync,
            C: Deliver + Send,
            O: Adapter<Item = C::Item>,
            C::Item: Send + 'static,
        {
            async move {
                self.machine.set_initial(initial, &mut self.context)?;

                // Flush anything the initial entry action produced
                for item in self.context.drain_all() {
                    self.output.notify(item).await?;
                }

                loop {
                    let fired = if let Some(limit) = self.idle_timeout {
                        match self
                            .events
                            .wait_and_clear_timeout(self.mask | self.halt, limit)
                            .await
                        {
                            Some(fired) => fired,
                            None => continue,
                        }
                    } else {
                        self.events.wait_and_clear(self.mask | self.halt).await
                    };

                    if fired & self.halt != 0 {
                        break;
                    }

                    self.context.deliver(fired & self.mask);
                    self.machine.run_step(&mut self.context)?;

                    // Flush items produced during the step, if any
                    for item in self.context.drain_all() {
                        self.output.notify(item).await?;
                    }
                }

                match self.machine.state() {
                    Some(state) => Ok((state, self.context)),
                    None => Err(Error::Fsm(tablefsm::Error::NotInitialised)),
                }
            }
        }
    }
}
