//! Generic LIFO state machine shared by the screen flow and every fighter's
//! action stack.
//!
//! States are registered once under a key and never destroyed. The stack only
//! holds keys; entering and leaving a state goes through its lifecycle hooks
//! (`startup`/`cleanup` for switches, `pause`/`resume` for overlays) and the
//! persistent mapping returned by one hook is handed unchanged to the next.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use tracing::trace;

use crate::error::StackError;

/// Wall-clock milliseconds since the loop started.
pub type Millis = u64;

/// Opaque key/value payload carried across transitions.
pub type Persist = serde_json::Map<String, serde_json::Value>;

// ── Transition requests ─────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition<K> {
    Stay,
    Quit,
    Switch(K),
    Push(K),
    Pop(usize),
}

// ── StateCore ───────────────────────────────────────────────────────────────

/// Flags and bookkeeping every stacked state carries.
#[derive(Clone, Debug)]
pub struct StateCore<K> {
    pub done: bool,
    pub quit: bool,
    pub suspended: bool,
    pub withdrawn: bool,
    /// Target of a `done` switch.
    pub next: Option<K>,
    /// Target of a `suspended` push.
    pub higher: Option<K>,
    pub pop_count: usize,
    /// Key of the state this one was entered from.
    pub previous: Option<K>,
    pub persist: Persist,
    pub start_time: Millis,
    pub resume_time: Millis,
}

impl<K> Default for StateCore<K> {
    fn default() -> Self {
        Self {
            done: false,
            quit: false,
            suspended: false,
            withdrawn: false,
            next: None,
            higher: None,
            pop_count: 1,
            previous: None,
            persist: Persist::new(),
            start_time: 0,
            resume_time: 0,
        }
    }
}

impl<K: Copy> StateCore<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_targets(next: Option<K>, higher: Option<K>) -> Self {
        Self { next, higher, ..Self::default() }
    }

    pub fn enter(&mut self, persist: Persist, now: Millis) {
        self.persist = persist;
        self.start_time = now;
    }

    pub fn reenter(&mut self, persist: Persist, now: Millis) {
        self.persist = persist;
        self.resume_time = now;
    }

    pub fn take_persist(&mut self) -> Persist {
        std::mem::take(&mut self.persist)
    }

    /// Request a switch to `next` on the following dispatch.
    pub fn finish(&mut self, next: K) {
        self.next = Some(next);
        self.done = true;
    }

    /// Request `higher` to be pushed over this state.
    pub fn suspend(&mut self, higher: K) {
        self.higher = Some(higher);
        self.suspended = true;
    }

    pub fn withdraw(&mut self) {
        self.withdrawn = true;
    }

    /// Screen dispatch order: quit, done, suspended, withdrawn.
    pub fn screen_request(&self) -> Result<Transition<K>, StackError> {
        if self.quit {
            Ok(Transition::Quit)
        } else if self.done {
            self.next.map(Transition::Switch).ok_or(StackError::MissingTarget("done"))
        } else if self.suspended {
            self.higher.map(Transition::Push).ok_or(StackError::MissingTarget("suspended"))
        } else if self.withdrawn {
            Ok(Transition::Pop(self.pop_count))
        } else {
            Ok(Transition::Stay)
        }
    }

    /// Action dispatch order: suspended, withdrawn, done.
    pub fn action_request(&self) -> Result<Transition<K>, StackError> {
        if self.suspended {
            self.higher.map(Transition::Push).ok_or(StackError::MissingTarget("suspended"))
        } else if self.withdrawn {
            Ok(Transition::Pop(self.pop_count))
        } else if self.done {
            self.next.map(Transition::Switch).ok_or(StackError::MissingTarget("done"))
        } else {
            Ok(Transition::Stay)
        }
    }
}

// ── StackState ──────────────────────────────────────────────────────────────

/// Lifecycle contract of anything the [`StateMachine`] can hold.
///
/// `C` is the context the hooks may touch: the application context for
/// screens, the fighter body for actions.
pub trait StackState<K: Copy, C: ?Sized> {
    fn core(&self) -> &StateCore<K>;
    fn core_mut(&mut self) -> &mut StateCore<K>;

    fn startup(&mut self, _ctx: &mut C, persist: Persist, now: Millis) {
        self.core_mut().enter(persist, now);
    }

    fn cleanup(&mut self, _ctx: &mut C) -> Persist {
        self.core_mut().take_persist()
    }

    fn pause(&mut self, _ctx: &mut C) -> Persist {
        self.core().persist.clone()
    }

    fn resume(&mut self, _ctx: &mut C, persist: Persist, now: Millis) {
        self.core_mut().reenter(persist, now);
    }
}

impl<K: Copy, C: ?Sized, T: StackState<K, C> + ?Sized> StackState<K, C> for Box<T> {
    fn core(&self) -> &StateCore<K> {
        (**self).core()
    }
    fn core_mut(&mut self) -> &mut StateCore<K> {
        (**self).core_mut()
    }
    fn startup(&mut self, ctx: &mut C, persist: Persist, now: Millis) {
        (**self).startup(ctx, persist, now)
    }
    fn cleanup(&mut self, ctx: &mut C) -> Persist {
        (**self).cleanup(ctx)
    }
    fn pause(&mut self, ctx: &mut C) -> Persist {
        (**self).pause(ctx)
    }
    fn resume(&mut self, ctx: &mut C, persist: Persist, now: Millis) {
        (**self).resume(ctx, persist, now)
    }
}

// ── StateMachine ────────────────────────────────────────────────────────────

pub struct StateMachine<K, S> {
    registry: HashMap<K, S>,
    stack: Vec<K>,
}

impl<K, S> Default for StateMachine<K, S> {
    fn default() -> Self {
        Self { registry: HashMap::new(), stack: Vec::new() }
    }
}

impl<K: Copy + Eq + Hash + Debug, S> StateMachine<K, S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a machine from a fixed list of variants and a factory.
    pub fn from_factory(keys: &[K], mut build: impl FnMut(K) -> S) -> Self {
        let registry = keys.iter().map(|&k| (k, build(k))).collect();
        Self { registry, stack: Vec::new() }
    }

    pub fn register(&mut self, key: K, state: S) {
        self.registry.insert(key, state);
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Stack keys, bottom first.
    pub fn keys(&self) -> &[K] {
        &self.stack
    }

    pub fn peek(&self) -> Result<K, StackError> {
        self.stack.last().copied().ok_or(StackError::Empty)
    }

    pub fn get(&self, key: K) -> Option<&S> {
        self.registry.get(&key)
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut S> {
        self.registry.get_mut(&key)
    }

    pub fn top(&self) -> Result<&S, StackError> {
        let key = self.peek()?;
        self.registry.get(&key).ok_or_else(|| unknown(key))
    }

    pub fn top_mut(&mut self) -> Result<&mut S, StackError> {
        let key = self.peek()?;
        self.registry.get_mut(&key).ok_or_else(|| unknown(key))
    }

    /// Key directly beneath the top, if any.
    pub fn beneath(&self) -> Option<K> {
        self.stack.len().checked_sub(2).map(|i| self.stack[i])
    }

    fn state_mut(&mut self, key: K) -> Result<&mut S, StackError> {
        self.registry.get_mut(&key).ok_or_else(|| unknown(key))
    }
}

impl<K: Copy + Eq + Hash + Debug, S> StateMachine<K, S> {
    /// Seed the root state. Any existing stack is cleaned up first.
    pub fn start<C: ?Sized>(&mut self, ctx: &mut C, name: K, persist: Persist, now: Millis) -> Result<(), StackError>
    where
        S: StackState<K, C>,
    {
        self.state_mut(name)?;
        self.clear(ctx);
        self.state_mut(name)?.startup(ctx, persist, now);
        self.stack.push(name);
        trace!(state = ?name, "stack started");
        Ok(())
    }

    /// Replace the top with `name`.
    pub fn switch_to<C: ?Sized>(&mut self, ctx: &mut C, name: K, now: Millis) -> Result<(), StackError>
    where
        S: StackState<K, C>,
    {
        let old = self.peek()?;
        self.state_mut(name)?;
        if self.stack[..self.stack.len() - 1].contains(&name) {
            return Err(StackError::AlreadyOnStack(format!("{name:?}")));
        }

        let persist = self.leave(ctx, old)?;
        self.stack.pop();

        let state = self.state_mut(name)?;
        state.core_mut().previous = Some(old);
        state.startup(ctx, persist, now);
        self.stack.push(name);
        trace!(from = ?old, to = ?name, "switch");
        Ok(())
    }

    /// Pause the top and enter `name` above it.
    pub fn push<C: ?Sized>(&mut self, ctx: &mut C, name: K, now: Millis) -> Result<(), StackError>
    where
        S: StackState<K, C>,
    {
        let below = self.peek()?;
        self.state_mut(name)?;
        if self.stack.contains(&name) {
            return Err(StackError::AlreadyOnStack(format!("{name:?}")));
        }

        let paused = self.state_mut(below)?;
        let persist = paused.pause(ctx);
        paused.core_mut().suspended = false;

        let state = self.state_mut(name)?;
        state.core_mut().previous = Some(below);
        state.startup(ctx, persist, now);
        self.stack.push(name);
        trace!(over = ?below, pushed = ?name, "push");
        Ok(())
    }

    /// Clean up `count` states and resume the one exposed with the persistent
    /// data of the last state removed. Emptying the stack is rejected.
    pub fn pop<C: ?Sized>(&mut self, ctx: &mut C, count: usize, now: Millis) -> Result<(), StackError>
    where
        S: StackState<K, C>,
    {
        let depth = self.stack.len();
        if count == 0 || count >= depth {
            return Err(StackError::InvalidTransition { requested: count, depth });
        }

        let mut persist = Persist::new();
        let mut last = None;
        for _ in 0..count {
            let key = self.peek()?;
            persist = self.leave(ctx, key)?;
            self.stack.pop();
            last = Some(key);
        }

        let exposed = self.peek()?;
        let state = self.state_mut(exposed)?;
        state.core_mut().previous = last;
        state.resume(ctx, persist, now);
        trace!(count, exposed = ?exposed, "pop");
        Ok(())
    }

    /// Clean up every state on the stack, top first.
    pub fn clear<C: ?Sized>(&mut self, ctx: &mut C)
    where
        S: StackState<K, C>,
    {
        while let Some(key) = self.stack.pop() {
            if let Some(state) = self.registry.get_mut(&key) {
                state.cleanup(ctx);
                reset_exit_flags(state.core_mut());
            }
        }
    }

    pub fn apply<C: ?Sized>(&mut self, ctx: &mut C, request: Transition<K>, now: Millis) -> Result<(), StackError>
    where
        S: StackState<K, C>,
    {
        match request {
            Transition::Stay | Transition::Quit => Ok(()),
            Transition::Switch(name) => self.switch_to(ctx, name, now),
            Transition::Push(name) => self.push(ctx, name, now),
            Transition::Pop(count) => self.pop(ctx, count, now),
        }
    }

    fn leave<C: ?Sized>(&mut self, ctx: &mut C, key: K) -> Result<Persist, StackError>
    where
        S: StackState<K, C>,
    {
        let state = self.state_mut(key)?;
        let persist = state.cleanup(ctx);
        reset_exit_flags(state.core_mut());
        Ok(persist)
    }
}

fn reset_exit_flags<K>(core: &mut StateCore<K>) {
    core.done = false;
    core.withdrawn = false;
    core.suspended = false;
}

fn unknown<K: Debug>(key: K) -> StackError {
    StackError::UnknownState(format!("{key:?}"))
}
