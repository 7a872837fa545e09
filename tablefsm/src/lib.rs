#![doc = include_str!("../README.md")]
#![no_std]
#[cfg(test)]
extern crate std;

/// A side-effect-only callback, used for entry and exit actions.
pub type Action<C> = fn(&mut C);

/// A run action. Returning `Some(key)` requests a transition to that state.
pub type RunAction<K, C> = fn(&mut C) -> Option<K>;

/// Result type for this crate
pub type Result<A> = core::result::Result<A, Error>;

/// Error type for this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// `run_step` was called before `set_initial`.
    NotInitialised,
    /// `set_initial` was called a second time.
    AlreadyInitialised,
    /// A transition was requested to a key absent from the table.
    /// This is the kernel's only fatal condition.
    UndefinedState,
}

/// One state's behaviour: a key and up to three optional callbacks
/// over a context of type `C`.
///
/// A table of these is the complete, immutable description of a machine.
/// An absent callback is a no-op. Entry and exit actions are `Action`s and
/// cannot request a transition; only the run action can, by returning the
/// key of the next state.
#[derive(Debug)]
pub struct State<K, C> {
    key: K,
    entry: Option<Action<C>>,
    run: Option<RunAction<K, C>>,
    exit: Option<Action<C>>,
}

impl<K, C> State<K, C> {
    /// Describe a state positionally, passing `None` for absent callbacks.
    pub const fn new(
        key: K,
        entry: Option<Action<C>>,
        run: Option<RunAction<K, C>>,
        exit: Option<Action<C>>,
    ) -> Self {
        State {
            key,
            entry,
            run,
            exit,
        }
    }

    /// The key this state is looked up by.
    pub fn key(&self) -> &K {
        &self.key
    }
}

/// A flat state machine over a static table of `State` records.
///
/// The machine holds the current key and nothing else; all per-session data
/// lives in the context value passed into `set_initial` and `run_step` by
/// whoever owns the machine. Exactly one step executes at a time: `run_step`
/// runs the current state's run action to completion and performs any
/// requested transition before it returns, so state is never observable
/// mid-transition.
#[derive(Debug)]
pub struct StateMachine<K: 'static, C: 'static> {
    table: &'static [State<K, C>],
    current: Option<K>,
}

impl<K, C> StateMachine<K, C>
where
    K: Copy + PartialEq + 'static,
    C: 'static,
{
    /// A machine over the given table, not yet initialised.
    pub fn new(table: &'static [State<K, C>]) -> Self {
        StateMachine {
            table,
            current: None,
        }
    }

    /// The current key, or `None` before `set_initial`.
    pub fn state(&self) -> Option<K> {
        self.current
    }

    /// Set the starting state and run its entry action, exactly once.
    ///
    /// A second call is a programming error and is rejected rather than
    /// silently re-initialising a machine that may already be running.
    pub fn set_initial(&mut self, key: K, context: &mut C) -> Result<()> {
        if self.current.is_some() {
            return Err(Error::AlreadyInitialised);
        }
        let state = self.descriptor(key)?;
        self.current = Some(key);
        if let Some(entry) = state.entry {
            entry(context);
        }
        Ok(())
    }

    /// Run one step: dispatch the current state's run action and perform
    /// the transition it requests, if any.
    ///
    /// A transition runs the current state's exit action, moves to the
    /// target, then runs the target's entry action. The target is validated
    /// against the table before the exit action runs, so an undefined target
    /// fails without leaving the machine between states. `Ok` means the
    /// caller may keep stepping; any `Err` is fatal to the driving loop.
    pub fn run_step(&mut self, context: &mut C) -> Result<()> {
        let key = self.current.ok_or(Error::NotInitialised)?;
        let state = self.descriptor(key)?;
        if let Some(run) = state.run {
            if let Some(next) = run(context) {
                self.transition(state, next, context)?;
            }
        }
        Ok(())
    }

    fn transition(&mut self, from: &State<K, C>, to: K, context: &mut C) -> Result<()> {
        let target = self.descriptor(to)?;
        if let Some(exit) = from.exit {
            exit(context);
        }
        self.current = Some(to);
        if let Some(entry) = target.entry {
            entry(context);
        }
        Ok(())
    }

    fn descriptor(&self, key: K) -> Result<&'static State<K, C>> {
        self.table
            .iter()
            .find(|s| s.key == key)
            .ok_or(Error::UndefinedState)
    }
}

/// The ability to extract accumulated items, typically diagnostic output
/// gathered in a context while callbacks ran.
///
/// This is how a driving loop collects whatever a step produced without the
/// kernel knowing anything about the context's internals.
pub trait Drain {
    /// Items accumulated in the context
    type Item;

    /// Remove and return the accumulated items.
    fn drain_all(&mut self) -> impl Iterator<Item = Self::Item> + Send
    where
        Self::Item: Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    enum Key {
        Stopped,
        Running,
        // declared but absent from the table
        Faulted,
    }

    #[derive(Default)]
    struct Probe {
        // what the run actions should request next
        request: Option<Key>,
        trace: Vec<&'static str>,
    }

    fn stopped_entry(p: &mut Probe) {
        p.trace.push("stopped:entry");
    }

    fn stopped_run(p: &mut Probe) -> Option<Key> {
        p.trace.push("stopped:run");
        p.request.take()
    }

    fn stopped_exit(p: &mut Probe) {
        p.trace.push("stopped:exit");
    }

    fn running_entry(p: &mut Probe) {
        p.trace.push("running:entry");
    }

    fn running_run(p: &mut Probe) -> Option<Key> {
        p.trace.push("running:run");
        p.request.take()
    }

    static TABLE: &[State<Key, Probe>] = &[
        State::new(
            Key::Stopped,
            Some(stopped_entry),
            Some(stopped_run),
            Some(stopped_exit),
        ),
        State::new(Key::Running, Some(running_entry), Some(running_run), None),
    ];

    #[test]
    fn initial_entry_runs_once() {
        let mut probe = Probe::default();
        let mut sm = StateMachine::new(TABLE);
        assert_eq!(sm.state(), None);
        sm.set_initial(Key::Stopped, &mut probe).unwrap();
        assert_eq!(sm.state(), Some(Key::Stopped));
        assert_eq!(probe.trace, ["stopped:entry"]);
    }

    #[test]
    fn set_initial_twice_is_rejected() {
        let mut probe = Probe::default();
        let mut sm = StateMachine::new(TABLE);
        sm.set_initial(Key::Stopped, &mut probe).unwrap();
        let err = sm.set_initial(Key::Running, &mut probe).unwrap_err();
        assert_eq!(err, Error::AlreadyInitialised);
        // state and trace are untouched by the rejected call
        assert_eq!(sm.state(), Some(Key::Stopped));
        assert_eq!(probe.trace, ["stopped:entry"]);
    }

    #[test]
    fn step_before_initialisation_is_rejected() {
        let mut probe = Probe::default();
        let mut sm = StateMachine::new(TABLE);
        assert_eq!(sm.run_step(&mut probe), Err(Error::NotInitialised));
    }

    #[test]
    fn quiet_step_stays_put() {
        let mut probe = Probe::default();
        let mut sm = StateMachine::new(TABLE);
        sm.set_initial(Key::Stopped, &mut probe).unwrap();
        sm.run_step(&mut probe).unwrap();
        assert_eq!(sm.state(), Some(Key::Stopped));
        assert_eq!(probe.trace, ["stopped:entry", "stopped:run"]);
    }

    #[test]
    fn transition_runs_exit_then_entry_exactly_once() {
        let mut probe = Probe::default();
        let mut sm = StateMachine::new(TABLE);
        sm.set_initial(Key::Stopped, &mut probe).unwrap();
        probe.request = Some(Key::Running);
        sm.run_step(&mut probe).unwrap();
        assert_eq!(sm.state(), Some(Key::Running));
        assert_eq!(
            probe.trace,
            [
                "stopped:entry",
                "stopped:run",
                "stopped:exit",
                "running:entry"
            ]
        );
    }

    #[test]
    fn absent_exit_is_a_no_op() {
        let mut probe = Probe::default();
        let mut sm = StateMachine::new(TABLE);
        sm.set_initial(Key::Running, &mut probe).unwrap();
        probe.request = Some(Key::Stopped);
        sm.run_step(&mut probe).unwrap();
        assert_eq!(sm.state(), Some(Key::Stopped));
        // no exit record between the run and the next entry
        assert_eq!(
            probe.trace,
            ["running:entry", "running:run", "stopped:entry"]
        );
    }

    #[test]
    fn undefined_target_is_fatal_and_leaves_state_alone() {
        let mut probe = Probe::default();
        let mut sm = StateMachine::new(TABLE);
        sm.set_initial(Key::Stopped, &mut probe).unwrap();
        probe.request = Some(Key::Faulted);
        assert_eq!(sm.run_step(&mut probe), Err(Error::UndefinedState));
        assert_eq!(sm.state(), Some(Key::Stopped));
        // the exit action must not have run for the failed transition
        assert_eq!(probe.trace, ["stopped:entry", "stopped:run"]);
    }

    #[test]
    fn initial_key_must_be_in_the_table() {
        let mut probe = Probe::default();
        let mut sm = StateMachine::new(TABLE);
        assert_eq!(
            sm.set_initial(Key::Faulted, &mut probe),
            Err(Error::UndefinedState)
        );
        assert_eq!(sm.state(), None);
    }
}
