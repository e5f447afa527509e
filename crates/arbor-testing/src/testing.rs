use arbor_core::{
    dispatch_event, shared, Component, Event, HandleId, Host, MemoryHost, MutationStats, Node,
    Props, ReconcileError, Root, RootOptions,
};
use arbor_router::{MemoryHistory, RouteConfig, RouteError, Router, RouterError, RouterOptions};

const TESTING: &str = "arbor::testing";

/// Headless harness for exercising a root in tests.
///
/// `ArborTestRule` owns a [`MemoryHost`] with a single `div` mount point and
/// exposes helpers for rendering content, firing events and inspecting the
/// produced markup without a real document.
pub struct ArborTestRule {
    root: Root<MemoryHost>,
    content: Option<Node>,
}

impl ArborTestRule {
    /// Create a new rule with the default root options.
    pub fn new() -> Self {
        Self::with_options(RootOptions::default())
    }

    pub fn with_options(options: RootOptions) -> Self {
        let host = shared(MemoryHost::new());
        let mount = host.borrow_mut().create_element("div");
        Self {
            root: Root::with_options(host, mount, options),
            content: None,
        }
    }

    /// Install `component` as the root content and render it.
    pub fn set_content(
        &mut self,
        component: Component,
        props: Props,
    ) -> Result<(), ReconcileError> {
        self.set_node(Node::component(component, props))
    }

    /// Install an arbitrary node as the root content and render it.
    pub fn set_node(&mut self, node: Node) -> Result<(), ReconcileError> {
        self.content = Some(node.clone());
        self.root.render_node(node)
    }

    /// Force a render of the installed content.
    pub fn rerender(&mut self) -> Result<(), ReconcileError> {
        self.root.rerender()
    }

    /// Returns whether content has been installed in this rule.
    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    pub fn root(&self) -> &Root<MemoryHost> {
        &self.root
    }

    pub fn mount(&self) -> HandleId {
        self.root.mount()
    }

    /// Markup rendered inside the mount point.
    pub fn html(&self) -> String {
        self.root.host().borrow().inner_html_of(self.mount())
    }

    /// Text content of the mount point.
    pub fn text(&self) -> String {
        self.root.host().borrow().text_content(self.mount())
    }

    pub fn render_count(&self) -> usize {
        self.root.render_count()
    }

    /// Host mutations since the last [`reset_mutations`](Self::reset_mutations).
    pub fn mutations(&self) -> MutationStats {
        self.root.host().borrow().mutations()
    }

    pub fn reset_mutations(&self) {
        self.root.host().borrow_mut().reset_mutations();
    }

    pub fn find_by_text(&self, text: &str) -> Option<HandleId> {
        self.root.host().borrow().find_by_text(self.mount(), text)
    }

    pub fn find_by_tag(&self, tag: &str) -> Option<HandleId> {
        self.root.host().borrow().find_by_tag(self.mount(), tag)
    }

    /// Bubbles `event` through the host tree.
    pub fn dispatch(&self, event: &Event) {
        dispatch_event(self.root.host(), event);
    }

    /// Clicks the first element whose text is `text`. Returns the event, or
    /// `None` when nothing matched.
    pub fn click_text(&self, text: &str) -> Option<Event> {
        let Some(target) = self.find_by_text(text) else {
            log::warn!(target: TESTING, "no element with text {text:?}");
            return None;
        };
        Some(self.click(target))
    }

    pub fn click(&self, target: HandleId) -> Event {
        let event = Event::click(target);
        self.dispatch(&event);
        event
    }

    /// Fires an `input` event carrying `value` at the first `tag` element.
    pub fn input(&self, tag: &str, value: &str) -> Option<Event> {
        let target = self.find_by_tag(tag)?;
        let event = Event::new("input", target).with_value(value);
        self.dispatch(&event);
        Some(event)
    }

    /// Dump the mount point and its subtree for debugging.
    pub fn dump_tree(&self) -> String {
        self.root.host().borrow().to_html(self.mount())
    }
}

impl Default for ArborTestRule {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for tests that only need temporary access to an
/// `ArborTestRule`.
pub fn run_test_root<R>(f: impl FnOnce(&mut ArborTestRule) -> R) -> R {
    let mut rule = ArborTestRule::new();
    f(&mut rule)
}

/// Headless harness around a [`Router`] backed by [`MemoryHistory`].
pub struct RouterTestRule {
    router: Router<MemoryHost>,
}

impl RouterTestRule {
    /// Hash-routed router starting at `initial`, e.g. `#/products`.
    pub fn new(initial: &str) -> Self {
        Self::with_options(initial, RouterOptions::default())
    }

    pub fn with_options(initial: &str, options: RouterOptions) -> Self {
        let host = shared(MemoryHost::new());
        let mount = host.borrow_mut().create_element("div");
        Self {
            router: Router::new(host, mount, MemoryHistory::new(initial), options),
        }
    }

    pub fn route(self, path: &str, component: Component) -> Result<Self, RouteError> {
        self.router.add_route(path, component)?;
        Ok(self)
    }

    pub fn route_config(self, config: RouteConfig) -> Result<Self, RouteError> {
        self.router.add_route_config(config)?;
        Ok(self)
    }

    /// Installs link interception and renders the initial location.
    pub fn start(&self) -> Result<(), RouterError> {
        self.router.init()
    }

    pub fn router(&self) -> &Router<MemoryHost> {
        &self.router
    }

    pub fn navigate(&self, path: &str) -> Result<(), RouterError> {
        self.router.navigate(path)
    }

    pub fn current_path(&self) -> String {
        self.router.current_path()
    }

    pub fn html(&self) -> String {
        let root = self.router.root();
        root.host().borrow().inner_html_of(root.mount())
    }

    pub fn text(&self) -> String {
        let root = self.router.root();
        root.host().borrow().text_content(root.mount())
    }

    /// History entries, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.router.with_history(|history| history.entries().to_vec())
    }

    /// Clicks the link whose text is `label`, the way a user would.
    pub fn click_link(&self, label: &str) -> Option<Event> {
        let root = self.router.root();
        let target = {
            let host = root.host().borrow();
            host.find_by_text(root.mount(), label).and_then(|found| {
                host.find_first(found, &|host, handle| host.tag_name(handle) == Some("a"))
            })
        };
        let Some(target) = target else {
            log::warn!(target: TESTING, "no link labelled {label:?}");
            return None;
        };
        let event = Event::click(target);
        dispatch_event(root.host(), &event);
        Some(event)
    }
}

#[cfg(test)]
#[path = "tests/testing_tests.rs"]
mod tests;
