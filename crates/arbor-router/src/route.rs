//! Route records, nested matching and the props handed to route components.

use arbor_core::{create_node, Child, Component, Node, PropValue, Props};

use crate::error::RouteError;
use crate::pattern::{join_paths, Params, RoutePattern};

/// Declarative route registration.
///
/// Child paths are relative to the parent: `/admin` with child `users`
/// matches `/admin/users`.
#[derive(Debug, Clone, Default)]
pub struct RouteConfig {
    pub path: String,
    pub component: Option<Component>,
    pub children: Vec<RouteConfig>,
    pub redirect: Option<String>,
    pub meta: Params,
}

impl RouteConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn component(mut self, component: Component) -> Self {
        self.component = Some(component);
        self
    }

    pub fn child(mut self, child: RouteConfig) -> Self {
        self.children.push(child);
        self
    }

    pub fn redirect(mut self, to: impl Into<String>) -> Self {
        self.redirect = Some(to.into());
        self
    }

    pub fn meta(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(name.into(), value.into());
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RouteRecord {
    pub(crate) pattern: RoutePattern,
    pub(crate) component: Option<Component>,
    pub(crate) redirect: Option<String>,
    pub(crate) meta: Params,
    pub(crate) children: Vec<RouteRecord>,
}

impl RouteRecord {
    pub(crate) fn compile(config: RouteConfig, parent: Option<&str>) -> Result<Self, RouteError> {
        let path = match parent {
            Some(parent) => join_paths(parent, &config.path),
            None => config.path,
        };
        let pattern = RoutePattern::compile(&path)?;
        let children = config
            .children
            .into_iter()
            .map(|child| RouteRecord::compile(child, Some(pattern.path())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            pattern,
            component: config.component,
            redirect: config.redirect,
            meta: config.meta,
            children,
        })
    }
}

/// Collects the chain of routes matching `pathname`, outermost first.
///
/// Routes are tried in registration order. A route matches when its own
/// pattern matches exactly, or when it has children, `pathname` lies below
/// it and one of the children matches.
pub(crate) fn match_chain<'a>(
    routes: &'a [RouteRecord],
    pathname: &str,
    chain: &mut Vec<&'a RouteRecord>,
) -> bool {
    for route in routes {
        if route.pattern.is_match(pathname) {
            chain.push(route);
            match_chain(&route.children, pathname, chain);
            return true;
        }
        if !route.children.is_empty() && route.pattern.is_prefix_of(pathname) {
            chain.push(route);
            if match_chain(&route.children, pathname, chain) {
                return true;
            }
            chain.pop();
        }
    }
    false
}

/// The route a router last rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveRoute {
    /// Pattern of the deepest matched route; `None` when nothing matched.
    pub pattern: Option<String>,
    pub pathname: String,
    pub params: Params,
    pub query: Params,
    pub meta: Params,
}

impl ActiveRoute {
    pub fn is_not_found(&self) -> bool {
        self.pattern.is_none()
    }
}

pub(crate) const PARAMS: &str = "params";
pub(crate) const QUERY: &str = "query";
pub(crate) const PATHNAME: &str = "pathname";
pub(crate) const META: &str = "meta";
pub(crate) const OUTLET: &str = "outlet";

/// Route data carried in the props of route components.
pub trait RouteProps {
    fn params(&self) -> Params;
    fn param(&self, name: &str) -> Option<&str>;
    fn query(&self) -> Params;
    fn query_param(&self, name: &str) -> Option<&str>;
    fn pathname(&self) -> &str;
    fn route_meta(&self, name: &str) -> Option<&str>;
    /// Where the next route of the chain renders. Empty for the deepest route.
    fn outlet(&self) -> Node;
}

impl RouteProps for Props {
    fn params(&self) -> Params {
        self.map(PARAMS).cloned().unwrap_or_default()
    }

    fn param(&self, name: &str) -> Option<&str> {
        self.map(PARAMS)?.get(name).map(String::as_str)
    }

    fn query(&self) -> Params {
        self.map(QUERY).cloned().unwrap_or_default()
    }

    fn query_param(&self, name: &str) -> Option<&str> {
        self.map(QUERY)?.get(name).map(String::as_str)
    }

    fn pathname(&self) -> &str {
        self.text(PATHNAME).unwrap_or("/")
    }

    fn route_meta(&self, name: &str) -> Option<&str> {
        self.map(META)?.get(name).map(String::as_str)
    }

    fn outlet(&self) -> Node {
        Node::outlet(self.node(OUTLET).cloned())
    }
}

/// Props shared by every component of a matched chain.
pub(crate) fn route_props(route: &ActiveRoute) -> Props {
    Props::new()
        .set(PARAMS, PropValue::Map(route.params.clone()))
        .set(QUERY, PropValue::Map(route.query.clone()))
        .set(PATHNAME, route.pathname.as_str())
}

/// Nests the chain's components from the deepest outwards: each component
/// receives the node of the next one as its `outlet`.
pub(crate) fn compose_chain(chain: &[&RouteRecord], base: &Props) -> Node {
    let mut node: Option<Node> = None;
    for route in chain.iter().rev() {
        let Some(component) = route.component else {
            continue;
        };
        let mut props = base.clone();
        props.insert(META, PropValue::Map(route.meta.clone()));
        if let Some(child) = node.take() {
            props.insert(OUTLET, child);
        }
        node = Some(Node::component(component, props));
    }
    node.unwrap_or_default()
}

/// Anchor to `to`. Clicks on it are routed by the router that owns the mount.
pub fn link(to: &str, props: Props, children: Vec<Child>) -> Node {
    create_node("a", props.attr("href", to), children)
}
