//! Events delivered to listeners registered on host handles.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::host::{HandleId, Host, SharedHost};

/// Modifier keys held while an event fired.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.ctrl || self.shift || self.alt || self.meta
    }
}

/// A host event as seen by listeners.
///
/// Listeners get a shared reference; the two flags use interior mutability so
/// any listener along the bubbling path can cancel the default action or stop
/// propagation.
#[derive(Debug)]
pub struct Event {
    name: String,
    target: HandleId,
    current_target: Cell<HandleId>,
    button: u16,
    modifiers: Modifiers,
    value: Option<String>,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl Event {
    pub fn new(name: impl Into<String>, target: HandleId) -> Self {
        Self {
            name: name.into(),
            target,
            current_target: Cell::new(target),
            button: 0,
            modifiers: Modifiers::default(),
            value: None,
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    /// Primary-button click on `target`.
    pub fn click(target: HandleId) -> Self {
        Self::new("click", target)
    }

    pub fn with_button(mut self, button: u16) -> Self {
        self.button = button;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Attaches a value payload, as an `input` or `change` event carries.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> HandleId {
        self.target
    }

    /// Handle whose listener is currently running.
    pub fn current_target(&self) -> HandleId {
        self.current_target.get()
    }

    pub fn button(&self) -> u16 {
        self.button
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

/// Listener attached to a host handle. Compared by pointer identity.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&Event)>);

impl EventHandler {
    pub fn new(handler: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(handler))
    }

    pub fn call(&self, event: &Event) {
        (self.0)(event)
    }

    pub fn ptr_eq(&self, other: &EventHandler) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<F: Fn(&Event) + 'static> From<Rc<F>> for EventHandler {
    fn from(handler: Rc<F>) -> Self {
        Self(handler)
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({:p})", Rc::as_ptr(&self.0).cast::<()>())
    }
}

/// Normalises `onClick` / `click` style names to the host event name.
pub fn event_name(name: &str) -> String {
    match name.strip_prefix("on") {
        Some(rest) if rest.chars().next().is_some_and(|c| c.is_ascii_uppercase()) => {
            rest.to_ascii_lowercase()
        }
        _ => name.to_ascii_lowercase(),
    }
}

/// Bubbles `event` from its target up to the root of the host tree.
///
/// The listener path is collected first and the host borrow released before
/// any listener runs, so listeners are free to trigger re-renders.
pub fn dispatch_event<H: Host>(host: &SharedHost<H>, event: &Event) {
    let path = {
        let host = host.borrow();
        let mut path = Vec::new();
        let mut current = Some(event.target);
        while let Some(handle) = current {
            if let Some(listener) = host.listener(handle, &event.name) {
                path.push((handle, listener));
            }
            current = host.parent(handle);
        }
        path
    };
    for (handle, listener) in path {
        event.current_target.set(handle);
        listener.call(event);
        if event.propagation_stopped() {
            break;
        }
    }
}
