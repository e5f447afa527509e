//! Converges the host tree from the previous node tree to the next one.
//!
//! Failure contract: when `patch(old = Some(id), ..)` returns an error, `id`
//! is still mounted and still valid (it may be partially updated). A failed
//! mount leaves nothing behind. Error boundaries rely on both.

mod keyed;
mod live;
mod props;

use std::rc::{Rc, Weak};

use crate::diagnostics::{MEMO, PATCH, RUNTIME};
use crate::error::ReconcileError;
use crate::hooks::{Cleanup, HookCells, PendingEffect};
use crate::host::{HandleId, Host, SharedHost};
use crate::instance_context;
use crate::node::{BoundaryNode, Component, ComponentNode, ElementNode, Node};
use crate::platform::RenderScheduler;
use crate::props::Props;

pub(crate) use keyed::longest_increasing;
pub(crate) use live::{ChildList, Instance, InstanceId, LiveKind, LiveTree};

/// How sibling lists are matched up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChildDiffStrategy {
    /// Prefix/suffix stripping, then keys and a longest-increasing-subsequence
    /// move pass; falls back to positional matching when a side has no keys.
    #[default]
    Keyed,
    /// Always positional. Never moves handles.
    Indexed,
}

/// Work deferred until a render pass has been fully applied.
#[derive(Default)]
pub(crate) struct CommitQueue {
    pub(crate) cleanups: Vec<Cleanup>,
    pub(crate) effects: Vec<PendingEffect>,
}

pub(crate) struct Reconciler<'a, H: Host> {
    host: &'a SharedHost<H>,
    tree: &'a mut LiveTree,
    queue: &'a mut CommitQueue,
    scheduler: Weak<dyn RenderScheduler>,
    strategy: ChildDiffStrategy,
}

impl<'a, H: Host> Reconciler<'a, H> {
    pub(crate) fn new(
        host: &'a SharedHost<H>,
        tree: &'a mut LiveTree,
        queue: &'a mut CommitQueue,
        scheduler: Weak<dyn RenderScheduler>,
        strategy: ChildDiffStrategy,
    ) -> Self {
        Self {
            host,
            tree,
            queue,
            scheduler,
            strategy,
        }
    }

    /// Makes the host subtree under `parent` represent `new` instead of `old`.
    /// New handles are inserted before `before` (appended when `None`).
    pub(crate) fn patch(
        &mut self,
        parent: HandleId,
        old: Option<InstanceId>,
        new: Option<&Node>,
        before: Option<HandleId>,
    ) -> Result<Option<InstanceId>, ReconcileError> {
        match (old, new) {
            (None, None) => Ok(None),
            (None, Some(node)) => self.mount(parent, node, before).map(Some),
            (Some(id), None) => {
                self.unmount(parent, id)?;
                Ok(None)
            }
            (Some(id), Some(node)) => self.update(parent, id, node, before).map(Some),
        }
    }

    fn mount(
        &mut self,
        parent: HandleId,
        node: &Node,
        before: Option<HandleId>,
    ) -> Result<InstanceId, ReconcileError> {
        match node {
            Node::Text(text) => {
                let handle = {
                    let mut host = self.host.borrow_mut();
                    let handle = host.create_text(text);
                    if let Err(err) = host.insert_before(parent, handle, before) {
                        host.release(handle).ok();
                        return Err(err.into());
                    }
                    handle
                };
                Ok(self.tree.insert(Instance {
                    key: None,
                    kind: LiveKind::Text {
                        handle,
                        text: text.clone(),
                    },
                }))
            }
            Node::Element(element) => self.mount_element(parent, element, before),
            Node::Component(component) => self.mount_component(parent, component, before),
            Node::Fragment(fragment) | Node::Outlet(fragment) => {
                let mut children = ChildList::new();
                if let Err(err) =
                    self.patch_children(parent, &mut children, &fragment.children, before)
                {
                    self.discard(parent, children);
                    return Err(err);
                }
                Ok(self.tree.insert(Instance {
                    key: fragment.key,
                    kind: LiveKind::Fragment { children },
                }))
            }
            Node::Boundary(boundary) => {
                let (child, failed) = match self.mount(parent, &boundary.child, before) {
                    Ok(child) => (child, false),
                    Err(ReconcileError::Render(err)) => {
                        log::error!(target: RUNTIME, "boundary caught: {err}");
                        (self.mount(parent, &boundary.fallback, before)?, true)
                    }
                    Err(err) => return Err(err),
                };
                Ok(self.tree.insert(Instance {
                    key: boundary.key,
                    kind: LiveKind::Boundary { child, failed },
                }))
            }
        }
    }

    fn mount_element(
        &mut self,
        parent: HandleId,
        element: &ElementNode,
        before: Option<HandleId>,
    ) -> Result<InstanceId, ReconcileError> {
        let handle = self.host.borrow_mut().create_element(&element.tag);
        let mut children = ChildList::new();
        let filled = self.fill_element(handle, element, &mut children).and_then(|()| {
            self.host
                .borrow_mut()
                .insert_before(parent, handle, before)
                .map_err(ReconcileError::from)
        });
        if let Err(err) = filled {
            for child in children {
                self.dispose(child);
            }
            if let Some(node_ref) = element.props.get_node_ref() {
                node_ref.assign(None);
            }
            self.host.borrow_mut().release(handle).ok();
            return Err(err);
        }
        log::trace!(target: PATCH, "mounted <{}> as {handle}", element.tag);
        Ok(self.tree.insert(Instance {
            key: element.props.key(),
            kind: LiveKind::Element {
                handle,
                tag: element.tag.clone(),
                props: element.props.clone(),
                children,
            },
        }))
    }

    fn fill_element(
        &mut self,
        handle: HandleId,
        element: &ElementNode,
        children: &mut ChildList,
    ) -> Result<(), ReconcileError> {
        self.apply_props(handle, &Props::default(), &element.props)?;
        if element.props.html().is_none() {
            self.patch_children(handle, children, &element.children, None)?;
        }
        Ok(())
    }

    fn mount_component(
        &mut self,
        parent: HandleId,
        node: &ComponentNode,
        before: Option<HandleId>,
    ) -> Result<InstanceId, ReconcileError> {
        let hooks = HookCells::new(node.component.name(), Weak::clone(&self.scheduler));
        let mounted = self
            .invoke(&hooks, node.component, &node.props)
            .and_then(|child| self.mount(parent, &child, before));
        let child = match mounted {
            Ok(child) => child,
            Err(err) => {
                self.queue.cleanups.extend(hooks.dispose());
                return Err(err);
            }
        };
        self.flush_hooks(&hooks);
        Ok(self.tree.insert(Instance {
            key: node.props.key(),
            kind: LiveKind::Component {
                component: node.component,
                props: node.props.clone(),
                hooks,
                child,
            },
        }))
    }

    /// Runs a component function with `hooks` as the current instance.
    fn invoke(
        &self,
        hooks: &Rc<HookCells>,
        component: Component,
        props: &Props,
    ) -> Result<Node, ReconcileError> {
        log::trace!(target: RUNTIME, "rendering {}", component.name());
        hooks.begin_invocation();
        let rendered = {
            let _scope = instance_context::enter(hooks);
            component.call(props)
        };
        hooks.finish_invocation();
        rendered.map_err(|err| {
            hooks.discard_pending();
            ReconcileError::Render(err.in_component(component.name()))
        })
    }

    fn flush_hooks(&mut self, hooks: &HookCells) {
        let (retired, effects) = hooks.take_effects();
        self.queue.cleanups.extend(retired);
        self.queue.effects.extend(effects);
    }

    fn update(
        &mut self,
        parent: HandleId,
        id: InstanceId,
        node: &Node,
        before: Option<HandleId>,
    ) -> Result<InstanceId, ReconcileError> {
        if self.tree.is_fragment(id) && node.is_fragment_like() {
            self.update_fragment(parent, id, node, before)?;
            return Ok(id);
        }
        if !self.tree.matches(id, node) {
            return self.replace(parent, id, node, before);
        }
        match node {
            Node::Text(text) => self.update_text(id, text),
            Node::Element(element) => self.update_element(id, element),
            Node::Component(component) => self.update_component(parent, id, component, before),
            Node::Boundary(boundary) => self.update_boundary(parent, id, boundary, before),
            Node::Fragment(_) | Node::Outlet(_) => {
                self.update_fragment(parent, id, node, before)?;
                Ok(id)
            }
        }
    }

    /// Mounts `node` where `id` sits, then unmounts `id`.
    fn replace(
        &mut self,
        parent: HandleId,
        id: InstanceId,
        node: &Node,
        before: Option<HandleId>,
    ) -> Result<InstanceId, ReconcileError> {
        log::trace!(target: PATCH, "replacing instance {id} with {:?}", node.kind());
        let anchor = self.tree.first_handle(id).or(before);
        let replacement = self.mount(parent, node, anchor)?;
        self.unmount(parent, id)?;
        Ok(replacement)
    }

    fn update_text(&mut self, id: InstanceId, next: &str) -> Result<InstanceId, ReconcileError> {
        if let Some(Instance {
            kind: LiveKind::Text { handle, text },
            ..
        }) = self.tree.get_mut(id)
        {
            if text != next {
                self.host.borrow_mut().set_text(*handle, next)?;
                *text = next.to_string();
            }
        }
        Ok(id)
    }

    fn update_element(
        &mut self,
        id: InstanceId,
        element: &ElementNode,
    ) -> Result<InstanceId, ReconcileError> {
        let (handle, old_props, mut children) = match self.tree.get_mut(id) {
            Some(Instance {
                kind:
                    LiveKind::Element {
                        handle,
                        props,
                        children,
                        ..
                    },
                ..
            }) => (*handle, std::mem::take(props), std::mem::take(children)),
            _ => return Ok(id),
        };
        let result = self.patch_element(handle, &old_props, element, &mut children);
        if let Some(Instance {
            kind:
                LiveKind::Element {
                    props,
                    children: slot,
                    ..
                },
            ..
        }) = self.tree.get_mut(id)
        {
            *props = element.props.clone();
            *slot = children;
        }
        result.map(|()| id)
    }

    fn patch_element(
        &mut self,
        handle: HandleId,
        old: &Props,
        element: &ElementNode,
        children: &mut ChildList,
    ) -> Result<(), ReconcileError> {
        if element.props.html().is_some() {
            for child in std::mem::take(children) {
                self.unmount(handle, child)?;
            }
        }
        self.apply_props(handle, old, &element.props)?;
        if element.props.html().is_none() {
            self.patch_children(handle, children, &element.children, None)?;
        }
        Ok(())
    }

    fn update_component(
        &mut self,
        parent: HandleId,
        id: InstanceId,
        node: &ComponentNode,
        before: Option<HandleId>,
    ) -> Result<InstanceId, ReconcileError> {
        let (hooks, child, props_unchanged) = match self.tree.get(id) {
            Some(Instance {
                kind: LiveKind::Component {
                    props, hooks, child, ..
                },
                ..
            }) => (Rc::clone(hooks), *child, *props == node.props),
            _ => return Ok(id),
        };
        if node.memoized && props_unchanged && !hooks.is_dirty() {
            log::debug!(target: MEMO, "{}: props unchanged, render skipped", node.component.name());
            return Ok(id);
        }
        if node.memoized {
            log::debug!(target: MEMO, "{}: rendering", node.component.name());
        }
        let rendered = self.invoke(&hooks, node.component, &node.props)?;
        let child = match self.update(parent, child, &rendered, before) {
            Ok(child) => child,
            Err(err) => {
                hooks.discard_pending();
                return Err(err);
            }
        };
        self.flush_hooks(&hooks);
        if let Some(Instance {
            kind:
                LiveKind::Component {
                    props,
                    child: slot,
                    ..
                },
            ..
        }) = self.tree.get_mut(id)
        {
            *props = node.props.clone();
            *slot = child;
        }
        Ok(id)
    }

    fn update_boundary(
        &mut self,
        parent: HandleId,
        id: InstanceId,
        node: &BoundaryNode,
        before: Option<HandleId>,
    ) -> Result<InstanceId, ReconcileError> {
        let Some(Instance {
            kind: LiveKind::Boundary { child, .. },
            ..
        }) = self.tree.get(id)
        else {
            return Ok(id);
        };
        let current = *child;
        let (child, failed) = match self.update(parent, current, &node.child, before) {
            Ok(child) => (child, false),
            Err(ReconcileError::Render(err)) => {
                log::error!(target: RUNTIME, "boundary caught: {err}");
                (self.update(parent, current, &node.fallback, before)?, true)
            }
            Err(err) => return Err(err),
        };
        if let Some(Instance {
            kind: LiveKind::Boundary {
                child: slot,
                failed: flag,
            },
            ..
        }) = self.tree.get_mut(id)
        {
            *slot = child;
            *flag = failed;
        }
        Ok(id)
    }

    fn update_fragment(
        &mut self,
        parent: HandleId,
        id: InstanceId,
        node: &Node,
        before: Option<HandleId>,
    ) -> Result<(), ReconcileError> {
        let mut children = match self.tree.get_mut(id) {
            Some(Instance {
                kind: LiveKind::Fragment { children },
                ..
            }) => std::mem::take(children),
            _ => return Ok(()),
        };
        let result = self.patch_children(parent, &mut children, node.fragment_children(), before);
        if let Some(instance) = self.tree.get_mut(id) {
            instance.key = node.key();
            if let LiveKind::Fragment { children: slot } = &mut instance.kind {
                *slot = children;
            }
        }
        result
    }

    /// Removes the instance's handles from `parent` and disposes its subtree.
    pub(crate) fn unmount(
        &mut self,
        parent: HandleId,
        id: InstanceId,
    ) -> Result<(), ReconcileError> {
        let mut handles = Vec::new();
        self.tree.collect_handles(id, &mut handles);
        self.dispose(id);
        let mut host = self.host.borrow_mut();
        for handle in handles {
            host.remove_child(parent, handle)?;
            host.release(handle)?;
        }
        Ok(())
    }

    /// Unmounts what a failed mount managed to create.
    fn discard(&mut self, parent: HandleId, children: ChildList) {
        for child in children {
            if let Err(err) = self.unmount(parent, child) {
                log::warn!(target: PATCH, "failed to discard instance {child}: {err}");
            }
        }
    }

    /// Drops the instance subtree from the arena: hook cleanups go to the
    /// commit queue and element refs are cleared. The host is not touched.
    fn dispose(&mut self, id: InstanceId) {
        let Some(instance) = self.tree.remove(id) else {
            return;
        };
        match instance.kind {
            LiveKind::Text { .. } => {}
            LiveKind::Element {
                props, children, ..
            } => {
                for child in children {
                    self.dispose(child);
                }
                if let Some(node_ref) = props.get_node_ref() {
                    node_ref.assign(None);
                }
            }
            LiveKind::Component { hooks, child, .. } => {
                self.dispose(child);
                log::trace!(target: RUNTIME, "disposing {}", hooks.component());
                self.queue.cleanups.extend(hooks.dispose());
            }
            LiveKind::Fragment { children } => {
                for child in children {
                    self.dispose(child);
                }
            }
            LiveKind::Boundary { child, .. } => self.dispose(child),
        }
    }

    /// Moves every top-level handle of `id` before `anchor`, keeping their order.
    fn move_before(
        &mut self,
        parent: HandleId,
        id: InstanceId,
        anchor: Option<HandleId>,
    ) -> Result<(), ReconcileError> {
        let mut handles = Vec::new();
        self.tree.collect_handles(id, &mut handles);
        log::trace!(target: PATCH, "moving instance {id} before {anchor:?}");
        let mut host = self.host.borrow_mut();
        for handle in handles {
            host.insert_before(parent, handle, anchor)?;
        }
        Ok(())
    }
}
