//! Reactive signal cells
//!
//! A small push-based reactive graph:
//! - Signals hold values and remember which effects read them
//! - Writing a signal marks its subscribed effects dirty and flushes them
//!
//! Everything here is single-threaded. The graph lives behind an
//! `Rc<RefCell<_>>` and is only touched from event callbacks on the host
//! loop, one at a time.
//!
//! # State
//!
//! [`State<T>`] is a cheap-clone handle pairing a signal with the shared graph.
//! A `State<bool>` is the reactive cell the visibility tracker writes to.
//!
//! Effects flushed through a `State` write run under a shared borrow of the
//! graph, so they may read any `State`. A `State` written while an effect is
//! running is queued and applied as soon as that effect returns.
//!
//! ```rust
//! use inview_core::reactive::{ReactiveGraph, State};
//!
//! let graph = ReactiveGraph::shared();
//! let visible = State::new_in(&graph, false);
//!
//! visible.set(true);
//! assert!(visible.get());
//! ```

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

new_key_type! {
    /// Unique identifier for a signal
    pub struct SignalId;
    /// Unique identifier for an effect
    pub struct EffectId;
}

/// A reactive signal handle (cheap to copy)
#[derive(Debug)]
pub struct Signal<T> {
    id: SignalId,
    _marker: PhantomData<T>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Signal<T> {}

impl<T> Signal<T> {
    /// Get the signal's internal ID
    pub fn id(&self) -> SignalId {
        self.id
    }
}

/// An effect handle
#[derive(Debug, Clone, Copy)]
pub struct Effect {
    id: EffectId,
}

impl Effect {
    pub fn id(&self) -> EffectId {
        self.id
    }
}

type EffectFn = Box<dyn FnMut(&ReactiveGraph)>;
type QueuedWrite = Box<dyn FnOnce(&mut ReactiveGraph)>;

struct SignalNode {
    value: Box<dyn Any>,
    /// Bumped on every write, equal value or not
    version: u64,
    subscribers: SmallVec<[EffectId; 4]>,
}

struct EffectNode {
    /// Taken out while the effect runs so the graph can be lent to it
    run: Option<EffectFn>,
    dependencies: SmallVec<[SignalId; 4]>,
    dirty: Cell<bool>,
}

/// The reactive graph that owns all signals and effects
pub struct ReactiveGraph {
    signals: SlotMap<SignalId, SignalNode>,
    effects: SlotMap<EffectId, EffectNode>,
    pending_effects: RefCell<VecDeque<EffectId>>,
    /// Writes made through a `State` while the graph was lent to an effect
    queued_writes: RefCell<VecDeque<QueuedWrite>>,
    /// Signals read by the effect currently running
    tracking: RefCell<Option<Vec<SignalId>>>,
}

/// Shared reactive graph for the host loop
pub type SharedReactiveGraph = Rc<RefCell<ReactiveGraph>>;

impl ReactiveGraph {
    /// Create a new reactive graph
    pub fn new() -> Self {
        Self {
            signals: SlotMap::with_key(),
            effects: SlotMap::with_key(),
            pending_effects: RefCell::new(VecDeque::new()),
            queued_writes: RefCell::new(VecDeque::new()),
            tracking: RefCell::new(None),
        }
    }

    /// Create a new graph wrapped for sharing between [`State`] handles
    pub fn shared() -> SharedReactiveGraph {
        Rc::new(RefCell::new(Self::new()))
    }

    // =========================================================================
    // SIGNALS
    // =========================================================================

    /// Create a new signal with an initial value
    pub fn create_signal<T: 'static>(&mut self, initial: T) -> Signal<T> {
        let id = self.signals.insert(SignalNode {
            value: Box::new(initial),
            version: 0,
            subscribers: SmallVec::new(),
        });
        Signal {
            id,
            _marker: PhantomData,
        }
    }

    /// Get the current value of a signal
    ///
    /// Inside a running effect the signal is recorded as a dependency.
    pub fn get<T: Clone + 'static>(&self, signal: Signal<T>) -> Option<T> {
        if let Some(ref mut deps) = *self.tracking.borrow_mut() {
            if !deps.contains(&signal.id) {
                deps.push(signal.id);
            }
        }

        self.get_untracked(signal)
    }

    /// Get the current value without tracking as a dependency
    pub fn get_untracked<T: Clone + 'static>(&self, signal: Signal<T>) -> Option<T> {
        self.signals
            .get(signal.id)
            .and_then(|node| node.value.downcast_ref::<T>().cloned())
    }

    /// Set the value of a signal and run the effects it triggers
    pub fn set<T: 'static>(&mut self, signal: Signal<T>, value: T) {
        self.write(signal, value);
        self.flush_effects();
    }

    /// Store a value and mark subscribers dirty without running them
    fn write<T: 'static>(&mut self, signal: Signal<T>, value: T) {
        let Some(node) = self.signals.get_mut(signal.id) else {
            return;
        };
        node.value = Box::new(value);
        node.version += 1;

        let subscribers = node.subscribers.clone();
        for effect_id in subscribers {
            self.mark_dirty(effect_id);
        }
    }

    /// Get the write count of a signal
    pub fn signal_version(&self, id: SignalId) -> Option<u64> {
        self.signals.get(id).map(|n| n.version)
    }

    // =========================================================================
    // EFFECTS
    // =========================================================================

    /// Create an effect that re-runs whenever a signal it read is written
    ///
    /// The effect runs once immediately.
    pub fn create_effect<F>(&mut self, run: F) -> Effect
    where
        F: FnMut(&ReactiveGraph) + 'static,
    {
        let effect = self.insert_effect(run);
        self.flush_effects();
        effect
    }

    fn insert_effect<F>(&mut self, run: F) -> Effect
    where
        F: FnMut(&ReactiveGraph) + 'static,
    {
        let id = self.effects.insert(EffectNode {
            run: Some(Box::new(run)),
            dependencies: SmallVec::new(),
            dirty: Cell::new(true),
        });
        self.pending_effects.borrow_mut().push_back(id);
        Effect { id }
    }

    // =========================================================================
    // INTERNAL
    // =========================================================================

    fn mark_dirty(&mut self, effect_id: EffectId) {
        if let Some(node) = self.effects.get(effect_id) {
            if !node.dirty.get() {
                node.dirty.set(true);
                self.pending_effects.borrow_mut().push_back(effect_id);
            }
        }
    }

    fn queue_write(&self, write: QueuedWrite) {
        self.queued_writes.borrow_mut().push_back(write);
    }

    /// Apply queued writes, then take the next dirty effect out of its node
    fn next_effect(&mut self) -> Option<(EffectId, EffectFn)> {
        loop {
            let write = self.queued_writes.get_mut().pop_front();
            match write {
                Some(write) => write(self),
                None => break,
            }
        }

        while let Some(effect_id) = self.pending_effects.get_mut().pop_front() {
            let Some(node) = self.effects.get_mut(effect_id) else {
                continue;
            };
            if !node.dirty.get() {
                continue;
            }
            node.dirty.set(false);
            if let Some(run) = node.run.take() {
                return Some((effect_id, run));
            }
        }
        None
    }

    /// Put an effect back and resubscribe it to what it read
    fn finish_effect(&mut self, effect_id: EffectId, run: EffectFn, deps: Vec<SignalId>) {
        let Some(node) = self.effects.get_mut(effect_id) else {
            return;
        };
        node.run = Some(run);

        for &dep_id in &node.dependencies {
            if let Some(sig) = self.signals.get_mut(dep_id) {
                sig.subscribers.retain(|s| *s != effect_id);
            }
        }
        for &dep_id in &deps {
            if let Some(sig) = self.signals.get_mut(dep_id) {
                if !sig.subscribers.contains(&effect_id) {
                    sig.subscribers.push(effect_id);
                }
            }
        }
        node.dependencies = deps.into_iter().collect();
    }

    fn flush_effects(&mut self) {
        while let Some((effect_id, mut run)) = self.next_effect() {
            self.tracking.replace(Some(Vec::new()));
            run(self);
            let deps = self.tracking.take().unwrap_or_default();
            self.finish_effect(effect_id, run, deps);
        }
    }
}

/// Create an effect in a shared graph
///
/// Unlike [`ReactiveGraph::create_effect`], the effect runs under a shared
/// borrow, so it may read and write [`State`] handles of the same graph.
pub fn create_effect_in<F>(reactive: &SharedReactiveGraph, run: F) -> Effect
where
    F: FnMut(&ReactiveGraph) + 'static,
{
    let effect = reactive.borrow_mut().insert_effect(run);
    flush_shared(reactive);
    effect
}

/// Run pending effects without holding the graph mutably while they run
fn flush_shared(reactive: &SharedReactiveGraph) {
    loop {
        let next = reactive.borrow_mut().next_effect();
        let Some((effect_id, mut run)) = next else {
            break;
        };

        let deps = {
            let graph = reactive.borrow();
            graph.tracking.replace(Some(Vec::new()));
            run(&*graph);
            graph.tracking.take().unwrap_or_default()
        };
        reactive.borrow_mut().finish_effect(effect_id, run, deps);
    }
}

impl Default for ReactiveGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReactiveGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveGraph")
            .field("signals", &self.signals.len())
            .field("effects", &self.effects.len())
            .field("pending_effects", &self.pending_effects.borrow().len())
            .finish()
    }
}

// =============================================================================
// STATE - cell handle over a shared graph
// =============================================================================

/// A bound state value with direct get/set methods
pub struct State<T> {
    signal: Signal<T>,
    reactive: SharedReactiveGraph,
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            signal: self.signal,
            reactive: Rc::clone(&self.reactive),
        }
    }
}

impl<T> fmt::Debug for State<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("signal", &self.signal.id)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + 'static> State<T> {
    /// Wrap an existing signal
    pub fn new(signal: Signal<T>, reactive: SharedReactiveGraph) -> Self {
        Self { signal, reactive }
    }

    /// Create a signal in `reactive` and wrap it
    pub fn new_in(reactive: &SharedReactiveGraph, initial: T) -> Self {
        let signal = reactive.borrow_mut().create_signal(initial);
        Self::new(signal, Rc::clone(reactive))
    }

    /// Get the current value
    pub fn get(&self) -> T
    where
        T: Default,
    {
        self.try_get().unwrap_or_default()
    }

    /// Get the current value, returning None if the signal is gone
    pub fn try_get(&self) -> Option<T> {
        self.reactive.borrow().get_untracked(self.signal)
    }

    /// Set a new value
    ///
    /// The graph borrow is released before subscribed effects run. Inside a
    /// running effect the write is queued until that effect returns.
    pub fn set(&self, value: T) {
        let signal = self.signal;
        let written = match self.reactive.try_borrow_mut() {
            Ok(mut graph) => {
                graph.write(signal, value);
                true
            }
            Err(_) => {
                self.reactive
                    .borrow()
                    .queue_write(Box::new(move |graph: &mut ReactiveGraph| {
                        graph.write(signal, value)
                    }));
                false
            }
        };

        if written {
            flush_shared(&self.reactive);
        }
    }

    /// Number of writes since creation
    pub fn version(&self) -> u64 {
        self.reactive
            .borrow()
            .signal_version(self.signal.id)
            .unwrap_or(0)
    }

    /// Get the underlying signal
    pub fn signal(&self) -> Signal<T> {
        self.signal
    }
}
