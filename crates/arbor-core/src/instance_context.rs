use std::cell::RefCell;
use std::rc::Rc;

use crate::hooks::HookCells;

// Thread-local stack of component instances currently being invoked.
thread_local! {
    static INSTANCE_STACK: RefCell<Vec<Rc<HookCells>>> = const { RefCell::new(Vec::new()) };
}

/// Guard that pops the instance stack on drop.
#[must_use = "InstanceScopeGuard pops the instance stack on drop"]
pub struct InstanceScopeGuard;

impl Drop for InstanceScopeGuard {
    fn drop(&mut self) {
        INSTANCE_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Pushes the instance onto the thread-local stack for the duration of the scope.
pub(crate) fn enter(cells: &Rc<HookCells>) -> InstanceScopeGuard {
    INSTANCE_STACK.with(|stack| {
        stack.borrow_mut().push(Rc::clone(cells));
    });
    InstanceScopeGuard
}

/// Access the instance whose component function is running.
///
/// # Panics
/// Panics if no component is being invoked: hooks may only be called from
/// inside a component function.
pub(crate) fn with_instance<R>(f: impl FnOnce(&Rc<HookCells>) -> R) -> R {
    let cells = INSTANCE_STACK.with(|stack| stack.borrow().last().cloned());
    match cells {
        Some(cells) => f(&cells),
        None => panic!("hook called outside of a component render"),
    }
}

pub(crate) fn try_with_instance<R>(f: impl FnOnce(&Rc<HookCells>) -> R) -> Option<R> {
    let cells = INSTANCE_STACK.with(|stack| stack.borrow().last().cloned())?;
    Some(f(&cells))
}

/// Whether a component function is currently running on this thread.
pub fn in_component() -> bool {
    try_with_instance(|_| ()).is_some()
}
