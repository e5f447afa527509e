//! Arena of live instances, one per mounted node.

use std::rc::Rc;

use smallvec::SmallVec;

use crate::hooks::HookCells;
use crate::host::HandleId;
use crate::node::{Component, Key, Node};
use crate::props::Props;

pub(crate) type InstanceId = usize;

pub(crate) type ChildList = SmallVec<[InstanceId; 4]>;

pub(crate) struct Instance {
    pub(crate) key: Option<Key>,
    pub(crate) kind: LiveKind,
}

pub(crate) enum LiveKind {
    Text {
        handle: HandleId,
        text: String,
    },
    Element {
        handle: HandleId,
        tag: String,
        props: Props,
        children: ChildList,
    },
    Component {
        component: Component,
        props: Props,
        hooks: Rc<HookCells>,
        child: InstanceId,
    },
    Fragment {
        children: ChildList,
    },
    Boundary {
        child: InstanceId,
        failed: bool,
    },
}

#[derive(Default)]
pub(crate) struct LiveTree {
    slots: Vec<Option<Instance>>,
    free: Vec<InstanceId>,
}

impl LiveTree {
    pub(crate) fn insert(&mut self, instance: Instance) -> InstanceId {
        match self.free.pop() {
            Some(id) => {
                self.slots[id] = Some(instance);
                id
            }
            None => {
                self.slots.push(Some(instance));
                self.slots.len() - 1
            }
        }
    }

    pub(crate) fn remove(&mut self, id: InstanceId) -> Option<Instance> {
        let instance = self.slots.get_mut(id)?.take()?;
        self.free.push(id);
        Some(instance)
    }

    pub(crate) fn get(&self, id: InstanceId) -> Option<&Instance> {
        self.slots.get(id)?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: InstanceId) -> Option<&mut Instance> {
        self.slots.get_mut(id)?.as_mut()
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Same kind, same tag or component, same key.
    pub(crate) fn matches(&self, id: InstanceId, node: &Node) -> bool {
        let Some(instance) = self.get(id) else {
            return false;
        };
        let same_type = match (&instance.kind, node) {
            (LiveKind::Text { .. }, Node::Text(_)) => true,
            (LiveKind::Element { tag, .. }, Node::Element(element)) => *tag == element.tag,
            (LiveKind::Component { component, .. }, Node::Component(node)) => {
                *component == node.component
            }
            (LiveKind::Fragment { .. }, Node::Fragment(_) | Node::Outlet(_)) => true,
            (LiveKind::Boundary { .. }, Node::Boundary(_)) => true,
            _ => false,
        };
        same_type && instance.key == node.key()
    }

    pub(crate) fn is_fragment(&self, id: InstanceId) -> bool {
        matches!(
            self.get(id).map(|instance| &instance.kind),
            Some(LiveKind::Fragment { .. })
        )
    }

    pub(crate) fn key(&self, id: InstanceId) -> Option<Key> {
        self.get(id)?.key
    }

    /// First host handle in document order, if the instance renders any.
    pub(crate) fn first_handle(&self, id: InstanceId) -> Option<HandleId> {
        match &self.get(id)?.kind {
            LiveKind::Text { handle, .. } | LiveKind::Element { handle, .. } => Some(*handle),
            LiveKind::Component { child, .. } | LiveKind::Boundary { child, .. } => {
                self.first_handle(*child)
            }
            LiveKind::Fragment { children } => self.first_handle_in(children.iter().copied()),
        }
    }

    pub(crate) fn first_handle_in(
        &self,
        ids: impl IntoIterator<Item = InstanceId>,
    ) -> Option<HandleId> {
        ids.into_iter().find_map(|id| self.first_handle(id))
    }

    /// Top-level host handles of the instance, in document order.
    pub(crate) fn collect_handles(&self, id: InstanceId, out: &mut Vec<HandleId>) {
        let Some(instance) = self.get(id) else {
            return;
        };
        match &instance.kind {
            LiveKind::Text { handle, .. } | LiveKind::Element { handle, .. } => out.push(*handle),
            LiveKind::Component { child, .. } | LiveKind::Boundary { child, .. } => {
                self.collect_handles(*child, out)
            }
            LiveKind::Fragment { children } => {
                for &child in children {
                    self.collect_handles(child, out);
                }
            }
        }
    }
}
