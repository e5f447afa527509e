//! Node model: the immutable description a render produces.

use std::fmt;
use std::hash::Hash;

use crate::error::RenderError;
use crate::hash::hash_key;
use crate::html::escape_html;
use crate::props::Props;

pub type Key = u64;

pub type Rendered = Result<Node, RenderError>;

pub type RenderFn = fn(&Props) -> Rendered;

/// A component function together with a name used in logs and errors.
///
/// Two components are the same when they wrap the same function.
#[derive(Clone, Copy)]
pub struct Component {
    name: &'static str,
    render: RenderFn,
}

impl Component {
    pub const fn new(name: &'static str, render: RenderFn) -> Self {
        Self { name, render }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn call(&self, props: &Props) -> Rendered {
        (self.render)(props)
    }

    fn address(&self) -> *const () {
        self.render as *const ()
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl Eq for Component {}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.name)
    }
}

/// Wraps a component function, naming it after the function.
#[macro_export]
macro_rules! component {
    ($render:path) => {
        $crate::Component::new(stringify!($render), $render)
    };
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode {
    pub tag: String,
    pub props: Props,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComponentNode {
    pub component: Component,
    pub props: Props,
    /// Skip re-invocation while props stay shallow-equal.
    pub memoized: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FragmentNode {
    pub key: Option<Key>,
    pub children: Vec<Node>,
}

/// Renders `child`; if rendering it fails, renders `fallback` instead.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryNode {
    pub key: Option<Key>,
    pub child: Box<Node>,
    pub fallback: Box<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(ElementNode),
    Text(String),
    Component(ComponentNode),
    Fragment(FragmentNode),
    /// Placeholder a parent route fills with its nested route.
    Outlet(FragmentNode),
    Boundary(BoundaryNode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    Component,
    Fragment,
    Outlet,
    Boundary,
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn element(tag: impl Into<String>, props: Props, children: Vec<Node>) -> Self {
        Node::Element(ElementNode {
            tag: tag.into(),
            props,
            children,
        })
    }

    pub fn component(component: Component, props: Props) -> Self {
        Node::Component(ComponentNode {
            component,
            props,
            memoized: false,
        })
    }

    /// A component that is only re-invoked when its props change.
    pub fn memo(component: Component, props: Props) -> Self {
        Node::Component(ComponentNode {
            component,
            props,
            memoized: true,
        })
    }

    pub fn fragment(children: Vec<Node>) -> Self {
        Node::Fragment(FragmentNode {
            key: None,
            children,
        })
    }

    /// Renders nothing.
    pub fn empty() -> Self {
        Node::fragment(Vec::new())
    }

    pub fn outlet(child: Option<Node>) -> Self {
        Node::Outlet(FragmentNode {
            key: None,
            children: child.into_iter().collect(),
        })
    }

    pub fn boundary(child: Node) -> Self {
        Node::boundary_with_fallback(child, default_fallback())
    }

    pub fn boundary_with_fallback(child: Node, fallback: Node) -> Self {
        Node::Boundary(BoundaryNode {
            key: None,
            child: Box::new(child),
            fallback: Box::new(fallback),
        })
    }

    /// Sets the sibling identity key. Text nodes carry no key.
    pub fn with_key<K: Hash>(mut self, key: K) -> Self {
        let key = Some(hash_key(&key));
        match &mut self {
            Node::Element(element) => element.props.set_key(key),
            Node::Component(component) => component.props.set_key(key),
            Node::Fragment(fragment) | Node::Outlet(fragment) => fragment.key = key,
            Node::Boundary(boundary) => boundary.key = key,
            Node::Text(_) => {}
        }
        self
    }

    pub fn key(&self) -> Option<Key> {
        match self {
            Node::Element(element) => element.props.key(),
            Node::Component(component) => component.props.key(),
            Node::Fragment(fragment) | Node::Outlet(fragment) => fragment.key,
            Node::Boundary(boundary) => boundary.key,
            Node::Text(_) => None,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Element(_) => NodeKind::Element,
            Node::Text(_) => NodeKind::Text,
            Node::Component(_) => NodeKind::Component,
            Node::Fragment(_) => NodeKind::Fragment,
            Node::Outlet(_) => NodeKind::Outlet,
            Node::Boundary(_) => NodeKind::Boundary,
        }
    }

    pub fn is_fragment_like(&self) -> bool {
        matches!(self, Node::Fragment(_) | Node::Outlet(_))
    }

    pub(crate) fn fragment_children(&self) -> &[Node] {
        match self {
            Node::Fragment(fragment) | Node::Outlet(fragment) => &fragment.children,
            _ => &[],
        }
    }
}

impl Default for Node {
    fn default() -> Self {
        Node::empty()
    }
}

/// Fallback shown by a boundary whose child failed to render.
pub fn default_fallback() -> Node {
    Node::element(
        "div",
        Props::new().style("color", "red"),
        vec![Node::text("⚠️ Something went wrong.")],
    )
}

/// Element tag or component accepted by [`create_node`].
#[derive(Debug, Clone)]
pub enum Tag {
    Element(String),
    Component(Component),
}

impl From<&str> for Tag {
    fn from(tag: &str) -> Self {
        Tag::Element(tag.to_string())
    }
}

impl From<String> for Tag {
    fn from(tag: String) -> Self {
        Tag::Element(tag)
    }
}

impl From<Component> for Tag {
    fn from(component: Component) -> Self {
        Tag::Component(component)
    }
}

/// Anything that can appear in a child list.
#[derive(Debug, Clone)]
pub enum Child {
    Node(Node),
    Text(String),
    Many(Vec<Child>),
    Empty,
}

impl From<Node> for Child {
    fn from(node: Node) -> Self {
        Child::Node(node)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

impl From<&String> for Child {
    fn from(text: &String) -> Self {
        Child::Text(text.clone())
    }
}

impl From<()> for Child {
    fn from(_: ()) -> Self {
        Child::Empty
    }
}

impl<T: Into<Child>> From<Option<T>> for Child {
    fn from(child: Option<T>) -> Self {
        child.map_or(Child::Empty, Into::into)
    }
}

impl<T: Into<Child>> From<Vec<T>> for Child {
    fn from(children: Vec<T>) -> Self {
        Child::Many(children.into_iter().map(Into::into).collect())
    }
}

macro_rules! child_from_number {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Child {
            fn from(value: $ty) -> Self {
                Child::Text(value.to_string())
            }
        })*
    };
}

child_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// Builds a node from a tag or component, props and a child list.
///
/// The child list is flattened one level; anything nested deeper becomes a
/// fragment. Empty children are dropped. An element with an HTML payload
/// ignores its children. Component children travel in `props.children()`.
pub fn create_node(tag: impl Into<Tag>, mut props: Props, children: Vec<Child>) -> Node {
    let escape = props.escape_text();
    let mut flat = Vec::with_capacity(children.len());
    for child in children {
        match child {
            Child::Many(inner) => {
                for nested in inner {
                    push_child(&mut flat, nested, escape);
                }
            }
            other => push_child(&mut flat, other, escape),
        }
    }
    match tag.into() {
        Tag::Element(tag) => {
            if props.html().is_some() {
                flat.clear();
            }
            Node::element(tag, props, flat)
        }
        Tag::Component(component) => {
            props.set_children(flat);
            Node::component(component, props)
        }
    }
}

fn push_child(out: &mut Vec<Node>, child: Child, escape: bool) {
    match child {
        Child::Node(node) => out.push(node),
        Child::Text(text) if escape => out.push(Node::Text(escape_html(&text))),
        Child::Text(text) => out.push(Node::Text(text)),
        Child::Many(inner) => {
            let mut nested = Vec::with_capacity(inner.len());
            for child in inner {
                push_child(&mut nested, child, escape);
            }
            out.push(Node::fragment(nested));
        }
        Child::Empty => {}
    }
}

/// Authoring front-end over [`create_node`].
///
/// ```
/// use arbor_core::{h, Node, Props};
///
/// let node = h!("ul", Props::new().class("list"), h!("li", Props::new(), "one"), vec!["two", "three"]);
/// let Node::Element(list) = node else { panic!("expected an element") };
/// assert_eq!(list.children.len(), 3);
/// ```
#[macro_export]
macro_rules! h {
    ($tag:expr) => {
        $crate::create_node($tag, $crate::Props::new(), ::std::vec::Vec::new())
    };
    ($tag:expr, $props:expr $(, $child:expr)* $(,)?) => {
        $crate::create_node($tag, $props, ::std::vec![$($crate::Child::from($child)),*])
    };
}
