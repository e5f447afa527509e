//! Root mount: owns the live tree of one mount point and drives renders.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::diagnostics::RUNTIME;
use crate::error::ReconcileError;
use crate::host::{HandleId, Host, SharedHost};
use crate::node::{Component, Node};
use crate::platform::RenderScheduler;
use crate::props::Props;
use crate::reconcile::{ChildDiffStrategy, CommitQueue, InstanceId, LiveTree, Reconciler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootOptions {
    pub child_diff: ChildDiffStrategy,
    /// Upper bound on consecutive passes triggered by updates made while
    /// rendering or committing.
    pub max_render_passes: usize,
}

impl Default for RootOptions {
    fn default() -> Self {
        Self {
            child_diff: ChildDiffStrategy::Keyed,
            max_render_passes: 100,
        }
    }
}

#[derive(Default)]
struct RootState {
    tree: LiveTree,
    top: Option<InstanceId>,
    node: Option<Node>,
    queue: CommitQueue,
}

struct RootInner<H: Host> {
    host: SharedHost<H>,
    mount: HandleId,
    options: RootOptions,
    this: Weak<RootInner<H>>,
    state: RefCell<RootState>,
    pending: RefCell<Option<Node>>,
    rendering: Cell<bool>,
    dirty: Cell<bool>,
    render_count: Cell<usize>,
}

/// Render context for one mount point.
///
/// Cloning shares the same root.
pub struct Root<H: Host> {
    inner: Rc<RootInner<H>>,
}

impl<H: Host> Clone for Root<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<H: Host> Root<H> {
    pub fn new(host: SharedHost<H>, mount: HandleId) -> Self {
        Self::with_options(host, mount, RootOptions::default())
    }

    pub fn with_options(host: SharedHost<H>, mount: HandleId, options: RootOptions) -> Self {
        let inner = Rc::new_cyclic(|this| RootInner {
            host,
            mount,
            options,
            this: Weak::clone(this),
            state: RefCell::new(RootState::default()),
            pending: RefCell::new(None),
            rendering: Cell::new(false),
            dirty: Cell::new(false),
            render_count: Cell::new(0),
        });
        Self { inner }
    }

    /// Renders `component` with `props` as the root node.
    pub fn render(&self, component: Component, props: Props) -> Result<(), ReconcileError> {
        self.render_node(Node::component(component, props))
    }

    /// Replaces the root node and renders it. Called during a render, the
    /// new node is picked up by the pass that follows.
    pub fn render_node(&self, node: Node) -> Result<(), ReconcileError> {
        *self.inner.pending.borrow_mut() = Some(node);
        self.inner.schedule()
    }

    /// Re-renders the current root node.
    pub fn rerender(&self) -> Result<(), ReconcileError> {
        self.inner.schedule()
    }

    pub fn host(&self) -> &SharedHost<H> {
        &self.inner.host
    }

    pub fn mount(&self) -> HandleId {
        self.inner.mount
    }

    pub fn options(&self) -> RootOptions {
        self.inner.options
    }

    /// Completed render passes.
    pub fn render_count(&self) -> usize {
        self.inner.render_count.get()
    }

    pub fn is_rendering(&self) -> bool {
        self.inner.rendering.get()
    }

    /// Live instances currently mounted.
    pub fn instance_count(&self) -> usize {
        self.inner
            .state
            .try_borrow()
            .map(|state| state.tree.len())
            .unwrap_or_default()
    }
}

impl<H: Host> RootInner<H> {
    fn schedule(&self) -> Result<(), ReconcileError> {
        if self.rendering.get() {
            self.dirty.set(true);
            return Ok(());
        }
        self.run()
    }

    /// Render passes until no update arrives during a pass or its commit.
    fn run(&self) -> Result<(), ReconcileError> {
        self.rendering.set(true);
        let mut passes = 0;
        let outcome = loop {
            self.dirty.set(false);
            passes += 1;
            let pass = self.render_pass();
            self.commit();
            if let Err(err) = pass {
                break Err(err);
            }
            if !self.dirty.get() {
                break Ok(());
            }
            if passes >= self.options.max_render_passes {
                log::error!(
                    target: RUNTIME,
                    "render loop stopped after {passes} passes; an update keeps scheduling renders"
                );
                break Ok(());
            }
        };
        self.rendering.set(false);
        if let Err(err) = &outcome {
            log::error!(target: RUNTIME, "render failed: {err}");
        }
        outcome
    }

    fn render_pass(&self) -> Result<(), ReconcileError> {
        let scheduler: Weak<dyn RenderScheduler> = self.this.clone();
        let mut state = self.state.borrow_mut();
        if let Some(node) = self.pending.borrow_mut().take() {
            state.node = Some(node);
        }
        let RootState {
            tree,
            top,
            node,
            queue,
        } = &mut *state;
        let Some(node) = node.as_ref() else {
            return Ok(());
        };
        let pass = self.render_count.get() + 1;
        log::debug!(target: RUNTIME, "render pass {pass}");
        let mut reconciler =
            Reconciler::new(&self.host, tree, queue, scheduler, self.options.child_diff);
        let result = reconciler.patch(self.mount, *top, Some(node), None);
        self.render_count.set(pass);
        match result {
            Ok(next) => {
                *top = next;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Cleanups of unmounted instances first, then effects in queue order.
    fn commit(&self) {
        let queue = std::mem::take(&mut self.state.borrow_mut().queue);
        for cleanup in queue.cleanups {
            cleanup();
        }
        for effect in queue.effects {
            effect.run();
        }
    }
}

impl<H: Host> RenderScheduler for RootInner<H> {
    fn request_render(&self) {
        // Failures are already logged by the render loop.
        self.schedule().ok();
    }
}

/// Creates a root on `mount` and renders `component` into it.
pub fn render<H: Host>(
    host: SharedHost<H>,
    mount: HandleId,
    component: Component,
    props: Props,
) -> Result<Root<H>, ReconcileError> {
    let root = Root::new(host, mount);
    root.render(component, props)?;
    Ok(root)
}
