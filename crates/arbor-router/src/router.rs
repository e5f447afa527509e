//! Router context: owns the root of its mount and drives route renders.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use arbor_core::diagnostics::ROUTER;
use arbor_core::{
    component, h, Component, Event, EventHandler, HandleId, Host, Node, Props, Rendered, Root,
    SharedHost,
};

use crate::error::{RouteError, RouterError};
use crate::history::{location_path, path_location, History, MemoryHistory};
use crate::pattern::Params;
use crate::route::{
    compose_chain, match_chain, route_props, ActiveRoute, RouteConfig, RouteProps, RouteRecord,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterOptions {
    /// Keep the route in the location fragment (`#/path`).
    pub use_hash_routing: bool,
    /// Origin whose absolute links are routed in-app, e.g. `https://shop.example`.
    pub origin: Option<String>,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            use_hash_routing: true,
            origin: None,
        }
    }
}

type BeforeHook = Rc<dyn Fn(&str, &str, Proceed)>;
type AfterHook = Rc<dyn Fn(&ActiveRoute, Option<&str>)>;

enum Resolved {
    Redirect(String, Params),
    Render(ActiveRoute, Node),
}

enum Decision {
    Allow,
    Redirect(String),
}

/// Continuation handed to a before-navigate hook.
///
/// Consumed by [`Proceed::allow`] or [`Proceed::redirect`]; dropping it
/// unused cancels the navigation. It may be kept and resolved later.
pub struct Proceed {
    to: String,
    resume: Option<Box<dyn FnOnce(Decision) -> Result<(), RouterError>>>,
}

impl Proceed {
    /// Target of the pending navigation.
    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn allow(mut self) -> Result<(), RouterError> {
        match self.resume.take() {
            Some(resume) => resume(Decision::Allow),
            None => Ok(()),
        }
    }

    pub fn redirect(mut self, path: impl Into<String>) -> Result<(), RouterError> {
        match self.resume.take() {
            Some(resume) => resume(Decision::Redirect(path.into())),
            None => Ok(()),
        }
    }
}

impl Drop for Proceed {
    fn drop(&mut self) {
        if self.resume.is_some() {
            log::debug!(target: ROUTER, "navigation to {} cancelled by guard", self.to);
        }
    }
}

impl fmt::Debug for Proceed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proceed").field("to", &self.to).finish()
    }
}

fn not_found(props: &Props) -> Rendered {
    Ok(h!(
        "div",
        Props::new(),
        format!("404 - Not Found: {}", props.pathname())
    ))
}

struct RouterInner<H: Host, Y: History> {
    root: Root<H>,
    options: RouterOptions,
    this: Weak<RouterInner<H, Y>>,
    history: RefCell<Y>,
    routes: RefCell<Vec<RouteRecord>>,
    not_found: Cell<Component>,
    navbar: Cell<Option<Component>>,
    before: RefCell<Option<BeforeHook>>,
    after: RefCell<Option<AfterHook>>,
    current_path: RefCell<String>,
    current_route: RefCell<Option<ActiveRoute>>,
    /// Pathnames whose redirects are being followed.
    redirects: RefCell<Vec<String>>,
}

/// Client-side router bound to one mount point.
///
/// Cloning shares the same router.
pub struct Router<H: Host, Y: History + 'static = MemoryHistory> {
    inner: Rc<RouterInner<H, Y>>,
}

impl<H: Host, Y: History + 'static> Clone for Router<H, Y> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<H: Host, Y: History + 'static> Router<H, Y> {
    pub fn new(host: SharedHost<H>, mount: HandleId, history: Y, options: RouterOptions) -> Self {
        let current = location_path(&history.location(), options.use_hash_routing);
        let inner = Rc::new_cyclic(|this| RouterInner {
            root: Root::new(host, mount),
            options,
            this: Weak::clone(this),
            history: RefCell::new(history),
            routes: RefCell::new(Vec::new()),
            not_found: Cell::new(component!(not_found)),
            navbar: Cell::new(None),
            before: RefCell::new(None),
            after: RefCell::new(None),
            current_path: RefCell::new(current),
            current_route: RefCell::new(None),
            redirects: RefCell::new(Vec::new()),
        });
        Self { inner }
    }

    /// Registers `component` at `path`.
    pub fn add_route(&self, path: &str, component: Component) -> Result<(), RouteError> {
        self.add_route_config(RouteConfig::new(path).component(component))
    }

    pub fn add_route_config(&self, config: RouteConfig) -> Result<(), RouteError> {
        let record = RouteRecord::compile(config, None)?;
        log::debug!(target: ROUTER, "route registered: {}", record.pattern.path());
        self.inner.routes.borrow_mut().push(record);
        Ok(())
    }

    /// Component rendered when no route matches; it receives `pathname`.
    pub fn set_not_found(&self, component: Component) {
        self.inner.not_found.set(component);
    }

    /// Component rendered above every route.
    pub fn set_navbar(&self, navbar: Option<Component>) {
        self.inner.navbar.set(navbar);
    }

    /// Installs the guard run before each navigation with `(to, from, proceed)`.
    pub fn before_navigate(&self, hook: impl Fn(&str, &str, Proceed) + 'static) {
        *self.inner.before.borrow_mut() = Some(Rc::new(hook));
    }

    /// Installs the hook run after each route render with `(route, previous path)`.
    pub fn after_navigate(&self, hook: impl Fn(&ActiveRoute, Option<&str>) + 'static) {
        *self.inner.after.borrow_mut() = Some(Rc::new(hook));
    }

    /// Intercepts link clicks on the mount and renders the current location.
    pub fn init(&self) -> Result<(), RouterError> {
        let weak = Weak::clone(&self.inner.this);
        let host = Rc::downgrade(self.inner.root.host());
        let handler = EventHandler::new(move |event: &Event| {
            let (Some(router), Some(host)) = (weak.upgrade(), host.upgrade()) else {
                return;
            };
            if let Some(path) = router.intercepted_path(&host, event) {
                event.prevent_default();
                if let Err(err) = router.navigate(&path) {
                    log::error!(target: ROUTER, "navigation to {path} failed: {err}");
                }
            }
        });
        let mount = self.inner.root.mount();
        self.inner
            .root
            .host()
            .borrow_mut()
            .set_listener(mount, "click", handler)
            .map_err(arbor_core::ReconcileError::from)?;
        self.inner.render_location(None)
    }

    /// Navigates to `path` (which may carry a query). A no-op when `path` is
    /// the current path.
    pub fn navigate(&self, path: &str) -> Result<(), RouterError> {
        self.inner.navigate(path)
    }

    pub fn back(&self) -> Result<(), RouterError> {
        self.go(-1)
    }

    pub fn forward(&self) -> Result<(), RouterError> {
        self.go(1)
    }

    fn go(&self, delta: isize) -> Result<(), RouterError> {
        let moved = self.inner.history.borrow_mut().go(delta);
        if !moved {
            return Ok(());
        }
        self.handle_location_change()
    }

    /// Re-renders for the history's current location, as after `popstate`
    /// or `hashchange`.
    pub fn handle_location_change(&self) -> Result<(), RouterError> {
        let from = self.current_path();
        self.inner.render_location(Some(from))
    }

    /// Renders the current location again.
    pub fn rerender(&self) -> Result<(), RouterError> {
        self.inner.render_location(None)
    }

    pub fn current_path(&self) -> String {
        self.inner.current_path.borrow().clone()
    }

    pub fn current_route(&self) -> Option<ActiveRoute> {
        self.inner.current_route.borrow().clone()
    }

    pub fn root(&self) -> &Root<H> {
        &self.inner.root
    }

    pub fn options(&self) -> &RouterOptions {
        &self.inner.options
    }

    pub fn with_history<R>(&self, f: impl FnOnce(&Y) -> R) -> R {
        f(&self.inner.history.borrow())
    }
}

impl<H: Host, Y: History + 'static> RouterInner<H, Y> {
    fn navigate(&self, to: &str) -> Result<(), RouterError> {
        let from = self.current_path.borrow().clone();
        if to == from {
            log::trace!(target: ROUTER, "already at {to}");
            return Ok(());
        }
        let guard = self.before.borrow().clone();
        let Some(guard) = guard else {
            return self.commit(to, from);
        };
        let weak = Weak::clone(&self.this);
        let target = to.to_string();
        let previous = from.clone();
        let proceed = Proceed {
            to: to.to_string(),
            resume: Some(Box::new(move |decision| {
                let Some(router) = weak.upgrade() else {
                    return Ok(());
                };
                match decision {
                    Decision::Allow => router.commit(&target, previous),
                    Decision::Redirect(path) => {
                        log::debug!(target: ROUTER, "guard redirected {target} to {path}");
                        router.navigate(&path)
                    }
                }
            })),
        };
        guard(to, &from, proceed);
        Ok(())
    }

    fn commit(&self, to: &str, from: String) -> Result<(), RouterError> {
        log::debug!(target: ROUTER, "navigating {from} -> {to}");
        let location = path_location(to, self.options.use_hash_routing);
        self.history.borrow_mut().push(&location);
        self.render_location(Some(from))
    }

    /// Matches the history's location and renders the resulting tree.
    fn render_location(&self, from: Option<String>) -> Result<(), RouterError> {
        let location = self.history.borrow().location();
        let path = location_path(&location, self.options.use_hash_routing);
        *self.current_path.borrow_mut() = path.clone();
        let (pathname, search) = path.split_once('?').unwrap_or((path.as_str(), ""));
        let query: Params = url::form_urlencoded::parse(search.as_bytes())
            .into_owned()
            .collect();

        let resolved = {
            let routes = self.routes.borrow();
            let mut chain = Vec::new();
            match_chain(&routes, pathname, &mut chain);
            match chain.last() {
                Some(last) => match &last.redirect {
                    Some(redirect) => Resolved::Redirect(redirect.clone(), query),
                    None => {
                        let route = ActiveRoute {
                            pattern: Some(last.pattern.path().to_string()),
                            pathname: pathname.to_string(),
                            params: last.pattern.params(pathname).unwrap_or_default(),
                            query,
                            meta: last.meta.clone(),
                        };
                        let content = compose_chain(&chain, &route_props(&route));
                        Resolved::Render(route, content)
                    }
                },
                None => {
                    log::info!(target: ROUTER, "no route matches {pathname}");
                    let (route, content) = self.not_found_at(pathname, query);
                    Resolved::Render(route, content)
                }
            }
        };
        let (route, content) = match resolved {
            Resolved::Redirect(target, query) => {
                let target_path = target.split_once('?').map_or(target.as_str(), |(p, _)| p);
                let looped = target_path == pathname
                    || self.redirects.borrow().iter().any(|seen| seen == target_path);
                if !looped {
                    log::debug!(target: ROUTER, "{pathname} redirects to {target}");
                    self.redirects.borrow_mut().push(pathname.to_string());
                    let result = self.navigate(&target);
                    self.redirects.borrow_mut().pop();
                    return result;
                }
                log::error!(target: ROUTER, "redirect loop at {pathname} -> {target}");
                self.not_found_at(pathname, query)
            }
            Resolved::Render(route, content) => (route, content),
        };

        let mut children = Vec::with_capacity(2);
        if let Some(navbar) = self.navbar.get() {
            children.push(Node::component(navbar, Props::new().with_key("navbar")));
        }
        children.push(Node::boundary(content).with_key("route"));
        self.root.render_node(Node::fragment(children))?;

        *self.current_route.borrow_mut() = Some(route.clone());
        let after = self.after.borrow().clone();
        if let Some(after) = after {
            after(&route, from.as_deref());
        }
        Ok(())
    }

    fn not_found_at(&self, pathname: &str, query: Params) -> (ActiveRoute, Node) {
        let route = ActiveRoute {
            pattern: None,
            pathname: pathname.to_string(),
            params: Params::default(),
            query,
            meta: Params::default(),
        };
        let content = Node::component(self.not_found.get(), route_props(&route));
        (route, content)
    }

    /// In-app path for a click on (or inside) a link, if the router should
    /// handle it.
    fn intercepted_path(&self, host: &SharedHost<H>, event: &Event) -> Option<String> {
        if event.button() != 0 || event.modifiers().any() || event.default_prevented() {
            return None;
        }
        let host = host.borrow();
        let mut current = Some(event.target());
        let anchor = loop {
            let handle = current?;
            if host.tag_name(handle) == Some("a") {
                break handle;
            }
            current = host.parent(handle);
        };
        if host.attribute(anchor, "target").is_some() {
            return None;
        }
        let href = host.attribute(anchor, "href")?;
        if self.options.use_hash_routing {
            if let Some(path) = href.strip_prefix('#').filter(|path| path.starts_with('/')) {
                return Some(path.to_string());
            }
        }
        if href.starts_with('/') && !href.starts_with("//") {
            return Some(href.to_string());
        }
        let origin = self.options.origin.as_deref()?.trim_end_matches('/');
        let rest = href.strip_prefix(origin)?;
        if rest.is_empty() {
            Some("/".to_string())
        } else if rest.starts_with('/') {
            Some(rest.to_string())
        } else {
            None
        }
    }
}
