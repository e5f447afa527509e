//! Per-instance hook slots addressed by call order.
//!
//! Every component instance owns a [`HookCells`] arena. The Nth hook call of
//! an invocation addresses slot N, so hooks must be called unconditionally and
//! in the same order on every render. A slot reached by a different kind of
//! hook than the one that created it is re-initialised, which is how a
//! conditional hook call shows up: state silently resets.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::diagnostics::HOOKS;
use crate::instance_context::with_instance;
use crate::owned::RefHolder;
use crate::platform::RenderScheduler;

pub(crate) type Cleanup = Box<dyn FnOnce()>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HookKind {
    State,
    Reducer,
    Effect,
    Memo,
    Callback,
    Ref,
}

struct HookSlot {
    kind: HookKind,
    value: Rc<dyn Any>,
    effect: Option<Rc<EffectState>>,
}

/// Cleared when the effect that handed it out is cleaned up.
#[derive(Clone, Debug)]
pub struct ActiveFlag(Rc<Cell<bool>>);

impl ActiveFlag {
    fn new() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    pub fn is_active(&self) -> bool {
        self.0.get()
    }

    fn deactivate(&self) {
        self.0.set(false);
    }
}

/// Handed to effect callbacks.
pub struct EffectScope {
    active: ActiveFlag,
}

impl EffectScope {
    pub fn on_cleanup(&self, cleanup: impl FnOnce() + 'static) -> EffectResult {
        EffectResult::new(cleanup)
    }

    /// A flag that stays set until this run of the effect is cleaned up.
    /// Asynchronous work started by the effect checks it before applying results.
    pub fn active_flag(&self) -> ActiveFlag {
        self.active.clone()
    }
}

#[derive(Default)]
pub struct EffectResult {
    cleanup: Option<Cleanup>,
}

impl EffectResult {
    pub fn new(cleanup: impl FnOnce() + 'static) -> Self {
        Self {
            cleanup: Some(Box::new(cleanup)),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

impl From<()> for EffectResult {
    fn from(_: ()) -> Self {
        Self::none()
    }
}

#[derive(Default)]
struct EffectState {
    cleanup: RefCell<Option<Cleanup>>,
    active: RefCell<Option<ActiveFlag>>,
}

impl EffectState {
    fn run_cleanup(&self) {
        if let Some(flag) = self.active.borrow_mut().take() {
            flag.deactivate();
        }
        let cleanup = self.cleanup.borrow_mut().take();
        if let Some(cleanup) = cleanup {
            cleanup();
        }
    }

    fn set_result(&self, active: ActiveFlag, result: EffectResult) {
        *self.active.borrow_mut() = Some(active);
        *self.cleanup.borrow_mut() = result.cleanup;
    }
}

struct EffectCell<D> {
    deps: RefCell<Option<D>>,
    state: Rc<EffectState>,
}

/// An effect waiting for its instance's subtree to be committed.
pub(crate) struct PendingEffect {
    owner: Weak<HookCells>,
    state: Rc<EffectState>,
    run: Box<dyn FnOnce(&EffectScope) -> EffectResult>,
    /// Puts back the dependencies seen before this effect was queued.
    rollback: Option<Box<dyn FnOnce()>>,
}

impl PendingEffect {
    pub(crate) fn run(self) {
        let Some(owner) = self.owner.upgrade().filter(|owner| owner.alive.get()) else {
            log::trace!(target: HOOKS, "skipping effect of unmounted instance");
            return;
        };
        self.state.run_cleanup();
        let active = ActiveFlag::new();
        let scope = EffectScope {
            active: active.clone(),
        };
        log::trace!(target: HOOKS, "running effect in {}", owner.component);
        let result = (self.run)(&scope);
        self.state.set_result(active, result);
    }
}

struct MemoCell<T, D> {
    entry: RefCell<Option<(D, T)>>,
}

struct ReducerCell<S, A> {
    state: RefCell<S>,
    reducer: RefCell<Rc<dyn Fn(&S, A) -> S>>,
}

/// Hook state of one component instance.
pub(crate) struct HookCells {
    component: &'static str,
    slots: RefCell<Vec<HookSlot>>,
    cursor: Cell<usize>,
    previous_count: Cell<Option<usize>>,
    alive: Cell<bool>,
    dirty: Cell<bool>,
    scheduler: Option<Weak<dyn RenderScheduler>>,
    pending: RefCell<Vec<PendingEffect>>,
    retired: RefCell<Vec<Cleanup>>,
}

impl HookCells {
    pub(crate) fn new(component: &'static str, scheduler: Weak<dyn RenderScheduler>) -> Rc<Self> {
        Rc::new(Self::build(component, Some(scheduler)))
    }

    /// Cells that never schedule renders, for one-shot string rendering.
    pub(crate) fn detached(component: &'static str) -> Rc<Self> {
        Rc::new(Self::build(component, None))
    }

    fn build(component: &'static str, scheduler: Option<Weak<dyn RenderScheduler>>) -> Self {
        Self {
            component,
            slots: RefCell::new(Vec::new()),
            cursor: Cell::new(0),
            previous_count: Cell::new(None),
            alive: Cell::new(true),
            dirty: Cell::new(false),
            scheduler,
            pending: RefCell::new(Vec::new()),
            retired: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn component(&self) -> &'static str {
        self.component
    }

    pub(crate) fn begin_invocation(&self) {
        self.cursor.set(0);
        self.dirty.set(false);
    }

    pub(crate) fn finish_invocation(&self) {
        let count = self.cursor.get();
        if cfg!(debug_assertions) {
            if let Some(previous) = self.previous_count.get() {
                if previous != count {
                    log::warn!(
                        target: HOOKS,
                        "{} called {count} hooks, previous render called {previous}; hooks must not be called conditionally",
                        self.component
                    );
                }
            }
        }
        self.previous_count.set(Some(count));
    }

    /// A hook of this instance requested a render since its last invocation.
    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    fn slot<T: 'static>(&self, kind: HookKind, init: impl FnOnce() -> T) -> Rc<T> {
        self.slot_with_effect(kind, || (init(), None))
    }

    fn slot_with_effect<T: 'static>(
        &self,
        kind: HookKind,
        init: impl FnOnce() -> (T, Option<Rc<EffectState>>),
    ) -> Rc<T> {
        let index = self.cursor.get();
        self.cursor.set(index + 1);
        {
            let slots = self.slots.borrow();
            if let Some(slot) = slots.get(index) {
                if slot.kind == kind {
                    if let Ok(value) = Rc::clone(&slot.value).downcast::<T>() {
                        return value;
                    }
                }
                log::warn!(
                    target: HOOKS,
                    "{}: hook #{index} was {:?}, now {kind:?}; slot reinitialised",
                    self.component,
                    slot.kind
                );
            }
        }
        let (value, effect) = init();
        let value = Rc::new(value);
        let slot = HookSlot {
            kind,
            value: Rc::clone(&value) as Rc<dyn Any>,
            effect,
        };
        let replaced = {
            let mut slots = self.slots.borrow_mut();
            if index < slots.len() {
                Some(std::mem::replace(&mut slots[index], slot))
            } else {
                slots.push(slot);
                None
            }
        };
        if let Some(state) = replaced.and_then(|slot| slot.effect) {
            self.retired
                .borrow_mut()
                .push(Box::new(move || state.run_cleanup()));
        }
        value
    }

    fn queue_effect(
        self: &Rc<Self>,
        state: &Rc<EffectState>,
        run: Box<dyn FnOnce(&EffectScope) -> EffectResult>,
        rollback: Option<Box<dyn FnOnce()>>,
    ) {
        self.pending.borrow_mut().push(PendingEffect {
            owner: Rc::downgrade(self),
            state: Rc::clone(state),
            run,
            rollback,
        });
    }

    fn schedule_render(&self) {
        if !self.alive.get() {
            log::debug!(target: HOOKS, "{}: update after unmount ignored", self.component);
            return;
        }
        self.dirty.set(true);
        if let Some(scheduler) = self.scheduler.as_ref().and_then(Weak::upgrade) {
            scheduler.request_render();
        }
    }

    /// Effects queued by the last invocation, plus cleanups of slots that
    /// were overwritten by misaligned hooks.
    pub(crate) fn take_effects(&self) -> (Vec<Cleanup>, Vec<PendingEffect>) {
        let retired = std::mem::take(&mut *self.retired.borrow_mut());
        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        (retired, pending)
    }

    /// Drops effects queued by a render whose output was never committed.
    /// Their dependencies are restored so the next render queues them again.
    pub(crate) fn discard_pending(&self) {
        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        for effect in pending.into_iter().rev() {
            if let Some(rollback) = effect.rollback {
                rollback();
            }
        }
    }

    /// Marks the instance unmounted and returns every outstanding cleanup,
    /// in slot order.
    pub(crate) fn dispose(&self) -> Vec<Cleanup> {
        self.alive.set(false);
        self.pending.borrow_mut().clear();
        let mut cleanups = std::mem::take(&mut *self.retired.borrow_mut());
        for slot in self.slots.borrow().iter() {
            if let Some(state) = &slot.effect {
                let state = Rc::clone(state);
                cleanups.push(Box::new(move || state.run_cleanup()));
            }
        }
        cleanups
    }
}

impl fmt::Debug for HookCells {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookCells")
            .field("component", &self.component)
            .field("slots", &self.slots.borrow().len())
            .field("alive", &self.alive.get())
            .finish()
    }
}

/// Setter returned by [`use_state`].
pub struct SetState<T> {
    cell: Weak<RefCell<T>>,
    owner: Weak<HookCells>,
}

impl<T> Clone for SetState<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Weak::clone(&self.cell),
            owner: Weak::clone(&self.owner),
        }
    }
}

impl<T: PartialEq + 'static> SetState<T> {
    /// Stores `next` and schedules a render, unless it equals the current value.
    pub fn set(&self, next: T) {
        self.update(|_| next);
    }

    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let Some(cell) = self.cell.upgrade() else {
            return;
        };
        let next = f(&cell.borrow());
        if *cell.borrow() == next {
            log::trace!(target: HOOKS, "state unchanged; render skipped");
            return;
        }
        *cell.borrow_mut() = next;
        if let Some(owner) = self.owner.upgrade() {
            log::debug!(target: HOOKS, "state updated in {}", owner.component);
            owner.schedule_render();
        }
    }

    /// Current value, if the owning instance is still mounted.
    pub fn get(&self) -> Option<T>
    where
        T: Clone,
    {
        self.cell.upgrade().map(|cell| cell.borrow().clone())
    }
}

impl<T> fmt::Debug for SetState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SetState")
    }
}

/// Dispatcher returned by [`use_reducer`].
pub struct Dispatch<S, A> {
    cell: Weak<ReducerCell<S, A>>,
    owner: Weak<HookCells>,
}

impl<S, A> Clone for Dispatch<S, A> {
    fn clone(&self) -> Self {
        Self {
            cell: Weak::clone(&self.cell),
            owner: Weak::clone(&self.owner),
        }
    }
}

impl<S: PartialEq + 'static, A: 'static> Dispatch<S, A> {
    pub fn dispatch(&self, action: A) {
        let Some(cell) = self.cell.upgrade() else {
            return;
        };
        let reducer = Rc::clone(&cell.reducer.borrow());
        let next = reducer(&cell.state.borrow(), action);
        if *cell.state.borrow() == next {
            log::trace!(target: HOOKS, "reducer returned an equal state; render skipped");
            return;
        }
        *cell.state.borrow_mut() = next;
        if let Some(owner) = self.owner.upgrade() {
            log::debug!(target: HOOKS, "reducer state updated in {}", owner.component);
            owner.schedule_render();
        }
    }
}

impl<S, A> fmt::Debug for Dispatch<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Dispatch")
    }
}

/// State cell. `init` runs on the first render only.
pub fn use_state<T>(init: impl FnOnce() -> T) -> (T, SetState<T>)
where
    T: Clone + PartialEq + 'static,
{
    with_instance(|cells| {
        let cell = cells.slot(HookKind::State, || RefCell::new(init()));
        let value = cell.borrow().clone();
        let setter = SetState {
            cell: Rc::downgrade(&cell),
            owner: Rc::downgrade(cells),
        };
        (value, setter)
    })
}

/// Reducer cell. The latest `reducer` passed in is the one `dispatch` uses.
pub fn use_reducer<S, A, R>(reducer: R, initial: S) -> (S, Dispatch<S, A>)
where
    S: Clone + PartialEq + 'static,
    A: 'static,
    R: Fn(&S, A) -> S + 'static,
{
    with_instance(|cells| {
        let reducer: Rc<dyn Fn(&S, A) -> S> = Rc::new(reducer);
        let cell = cells.slot(HookKind::Reducer, || ReducerCell {
            state: RefCell::new(initial),
            reducer: RefCell::new(Rc::clone(&reducer)),
        });
        *cell.reducer.borrow_mut() = reducer;
        let state = cell.state.borrow().clone();
        let dispatch = Dispatch {
            cell: Rc::downgrade(&cell),
            owner: Rc::downgrade(cells),
        };
        (state, dispatch)
    })
}

/// Runs `effect` after the subtree commits, on mount and whenever `deps`
/// changes. The previous run's cleanup runs first.
pub fn use_effect<D, F, R>(effect: F, deps: D)
where
    D: PartialEq + 'static,
    F: FnOnce(&EffectScope) -> R + 'static,
    R: Into<EffectResult>,
{
    with_instance(|cells| {
        let cell = effect_cell::<D>(cells);
        let changed = cell.deps.borrow().as_ref() != Some(&deps);
        if changed {
            let previous = cell.deps.replace(Some(deps));
            let weak = Rc::downgrade(&cell);
            let rollback = move || {
                if let Some(cell) = weak.upgrade() {
                    *cell.deps.borrow_mut() = previous;
                }
            };
            cells.queue_effect(
                &cell.state,
                Box::new(move |scope| effect(scope).into()),
                Some(Box::new(rollback)),
            );
        }
    })
}

/// Runs `effect` after every commit of the instance.
pub fn use_effect_always<F, R>(effect: F)
where
    F: FnOnce(&EffectScope) -> R + 'static,
    R: Into<EffectResult>,
{
    with_instance(|cells| {
        let cell = effect_cell::<()>(cells);
        cells.queue_effect(&cell.state, Box::new(move |scope| effect(scope).into()), None);
    })
}

fn effect_cell<D: 'static>(cells: &Rc<HookCells>) -> Rc<EffectCell<D>> {
    cells.slot_with_effect(HookKind::Effect, || {
        let state = Rc::new(EffectState::default());
        let cell = EffectCell {
            deps: RefCell::new(None),
            state: Rc::clone(&state),
        };
        (cell, Some(state))
    })
}

/// Cached value, recomputed when `deps` changes.
pub fn use_memo<T, D>(compute: impl FnOnce() -> T, deps: D) -> T
where
    T: Clone + 'static,
    D: PartialEq + 'static,
{
    with_instance(|cells| memo_slot(cells, HookKind::Memo, compute, deps))
}

/// Identity-stable callback, replaced when `deps` changes.
pub fn use_callback<F, D>(callback: F, deps: D) -> Rc<F>
where
    F: 'static,
    D: PartialEq + 'static,
{
    with_instance(|cells| memo_slot(cells, HookKind::Callback, || Rc::new(callback), deps))
}

fn memo_slot<T, D>(cells: &Rc<HookCells>, kind: HookKind, compute: impl FnOnce() -> T, deps: D) -> T
where
    T: Clone + 'static,
    D: PartialEq + 'static,
{
    let cell = cells.slot(kind, || MemoCell::<T, D> {
        entry: RefCell::new(None),
    });
    if let Some((cached, value)) = cell.entry.borrow().as_ref() {
        if *cached == deps {
            return value.clone();
        }
    }
    let value = compute();
    *cell.entry.borrow_mut() = Some((deps, value.clone()));
    value
}

/// Mutable holder whose identity is stable for the instance's lifetime.
pub fn use_ref<T: 'static>(initial: T) -> RefHolder<T> {
    with_instance(|cells| {
        let holder = cells.slot(HookKind::Ref, || RefHolder::new(initial));
        RefHolder::clone(&holder)
    })
}
