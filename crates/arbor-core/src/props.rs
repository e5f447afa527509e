//! Structured props: the reserved keys of a node each get their own field.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::event::{event_name, Event, EventHandler};
use crate::hash::hash_key;
use crate::host::{HandleId, PropertyValue};
use crate::html::sanitize_html;
use crate::owned::RefHolder;
use crate::{Key, Node};

/// Attributes written to the host as live properties instead of strings.
pub const PROPERTY_ATTRIBUTES: [&str; 6] =
    ["value", "checked", "disabled", "readonly", "selected", "hidden"];

pub fn is_property_attribute(name: &str) -> bool {
    PROPERTY_ATTRIBUTES.contains(&name)
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Text(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl AttrValue {
    /// String form for a generic attribute. `None` means the attribute is absent.
    pub fn attribute_text(&self) -> Option<Cow<'_, str>> {
        match self {
            AttrValue::Text(text) => Some(Cow::Borrowed(text)),
            AttrValue::Bool(true) => Some(Cow::Borrowed("")),
            AttrValue::Bool(false) => None,
            AttrValue::Int(value) => Some(Cow::Owned(value.to_string())),
            AttrValue::Float(value) => Some(Cow::Owned(value.to_string())),
        }
    }

    pub fn truthy(&self) -> bool {
        match self {
            AttrValue::Text(text) => !text.is_empty(),
            AttrValue::Bool(value) => *value,
            AttrValue::Int(value) => *value != 0,
            AttrValue::Float(value) => *value != 0.0,
        }
    }

    /// Live property form: `value` stays textual, the rest are flags.
    pub fn to_property(&self, name: &str) -> PropertyValue {
        if name == "value" {
            PropertyValue::Text(self.attribute_text().unwrap_or_default().into_owned())
        } else {
            PropertyValue::Bool(self.truthy())
        }
    }

    /// Property value written when the attribute disappears from the props.
    pub fn cleared_property(name: &str) -> PropertyValue {
        if name == "value" {
            PropertyValue::Text(String::new())
        } else {
            PropertyValue::Bool(false)
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

macro_rules! attr_from_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for AttrValue {
            fn from(value: $ty) -> Self {
                AttrValue::Int(value as i64)
            }
        })*
    };
}

attr_from_int!(i32, i64, u32, u64, usize);

/// Where an element's handle is published.
#[derive(Clone)]
pub enum NodeRef {
    Holder(RefHolder<Option<HandleId>>),
    Callback(Rc<dyn Fn(Option<HandleId>)>),
}

impl NodeRef {
    pub fn callback(f: impl Fn(Option<HandleId>) + 'static) -> Self {
        NodeRef::Callback(Rc::new(f))
    }

    pub(crate) fn assign(&self, handle: Option<HandleId>) {
        match self {
            NodeRef::Holder(holder) => holder.set_current(handle),
            NodeRef::Callback(callback) => callback(handle),
        }
    }

    pub fn ptr_eq(&self, other: &NodeRef) -> bool {
        match (self, other) {
            (NodeRef::Holder(a), NodeRef::Holder(b)) => a.ptr_eq(b),
            (NodeRef::Callback(a), NodeRef::Callback(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<RefHolder<Option<HandleId>>> for NodeRef {
    fn from(holder: RefHolder<Option<HandleId>>) -> Self {
        NodeRef::Holder(holder)
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Holder(holder) => f.debug_tuple("Holder").field(holder).finish(),
            NodeRef::Callback(_) => f.write_str("Callback"),
        }
    }
}

/// Inner HTML payload. `Raw` is trusted and written verbatim; `Sanitized`
/// passes through [`sanitize_html`] first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InnerHtml {
    Raw(String),
    Sanitized(String),
}

impl InnerHtml {
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            InnerHtml::Raw(html) => Cow::Borrowed(html),
            InnerHtml::Sanitized(html) => Cow::Owned(sanitize_html(html)),
        }
    }
}

/// Value handed to a component through its props.
#[derive(Clone)]
pub enum PropValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Node(Node),
    Nodes(Vec<Node>),
    Map(IndexMap<String, String>),
    Handler(EventHandler),
    Any(Rc<dyn Any>),
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropValue::Text(a), PropValue::Text(b)) => a == b,
            (PropValue::Int(a), PropValue::Int(b)) => a == b,
            (PropValue::Float(a), PropValue::Float(b)) => a == b,
            (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
            (PropValue::Node(a), PropValue::Node(b)) => a == b,
            (PropValue::Nodes(a), PropValue::Nodes(b)) => a == b,
            (PropValue::Map(a), PropValue::Map(b)) => a == b,
            (PropValue::Handler(a), PropValue::Handler(b)) => a.ptr_eq(b),
            (PropValue::Any(a), PropValue::Any(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Text(value) => write!(f, "{value:?}"),
            PropValue::Int(value) => write!(f, "{value}"),
            PropValue::Float(value) => write!(f, "{value}"),
            PropValue::Bool(value) => write!(f, "{value}"),
            PropValue::Node(node) => write!(f, "{node:?}"),
            PropValue::Nodes(nodes) => f.debug_list().entries(nodes).finish(),
            PropValue::Map(map) => f.debug_map().entries(map).finish(),
            PropValue::Handler(handler) => write!(f, "{handler:?}"),
            PropValue::Any(_) => f.write_str("Any(..)"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Text(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Text(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Int(value.into())
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<Node> for PropValue {
    fn from(value: Node) -> Self {
        PropValue::Node(value)
    }
}

impl From<Vec<Node>> for PropValue {
    fn from(value: Vec<Node>) -> Self {
        PropValue::Nodes(value)
    }
}

impl From<IndexMap<String, String>> for PropValue {
    fn from(value: IndexMap<String, String>) -> Self {
        PropValue::Map(value)
    }
}

impl From<EventHandler> for PropValue {
    fn from(value: EventHandler) -> Self {
        PropValue::Handler(value)
    }
}

/// Props of an element or component node.
///
/// Equality is shallow: handlers, refs and `Any` payloads compare by pointer.
#[derive(Clone, Default, PartialEq)]
pub struct Props {
    key: Option<Key>,
    class_name: Option<String>,
    attributes: IndexMap<String, AttrValue>,
    style: IndexMap<String, String>,
    events: IndexMap<String, EventHandler>,
    node_ref: Option<RefSlot>,
    html: Option<InnerHtml>,
    escape_text: bool,
    values: IndexMap<String, PropValue>,
}

#[derive(Clone, Debug)]
struct RefSlot(NodeRef);

impl PartialEq for RefSlot {
    fn eq(&self, other: &Self) -> bool {
        self.0.ptr_eq(&other.0)
    }
}

const CHILDREN: &str = "children";

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key<K: Hash>(mut self, key: K) -> Self {
        self.key = Some(hash_key(&key));
        self
    }

    pub(crate) fn set_key(&mut self, key: Option<Key>) {
        self.key = key;
    }

    pub fn class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.insert(property.into(), value.into());
        self
    }

    /// Registers a listener. `onClick` and `click` name the same event.
    pub fn on(self, name: &str, handler: impl Fn(&Event) + 'static) -> Self {
        self.on_handler(name, EventHandler::new(handler))
    }

    pub fn on_handler(mut self, name: &str, handler: impl Into<EventHandler>) -> Self {
        self.events.insert(event_name(name), handler.into());
        self
    }

    pub fn node_ref(mut self, node_ref: impl Into<NodeRef>) -> Self {
        self.node_ref = Some(RefSlot(node_ref.into()));
        self
    }

    /// Trusted markup, written verbatim.
    pub fn raw_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(InnerHtml::Raw(html.into()));
        self
    }

    /// Untrusted markup, sanitized before it reaches the host.
    pub fn safe_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(InnerHtml::Sanitized(html.into()));
        self
    }

    /// HTML-escape string children when the node is built.
    pub fn escaped(mut self) -> Self {
        self.escape_text = true;
        self
    }

    pub fn set(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn set_any<T: Any>(self, name: impl Into<String>, value: T) -> Self {
        self.set(name, PropValue::Any(Rc::new(value)))
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn key(&self) -> Option<Key> {
        self.key
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    pub fn attributes(&self) -> &IndexMap<String, AttrValue> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    pub fn styles(&self) -> &IndexMap<String, String> {
        &self.style
    }

    pub fn events(&self) -> &IndexMap<String, EventHandler> {
        &self.events
    }

    pub fn get_node_ref(&self) -> Option<&NodeRef> {
        self.node_ref.as_ref().map(|slot| &slot.0)
    }

    pub fn html(&self) -> Option<&InnerHtml> {
        self.html.as_ref()
    }

    pub fn escape_text(&self) -> bool {
        self.escape_text
    }

    pub fn values(&self) -> &IndexMap<String, PropValue> {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.values.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name)? {
            PropValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.values.get(name)? {
            PropValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        match self.values.get(name)? {
            PropValue::Float(value) => Some(*value),
            PropValue::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(PropValue::Bool(true)))
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        match self.values.get(name)? {
            PropValue::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn map(&self, name: &str) -> Option<&IndexMap<String, String>> {
        match self.values.get(name)? {
            PropValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn handler(&self, name: &str) -> Option<&EventHandler> {
        match self.values.get(name)? {
            PropValue::Handler(handler) => Some(handler),
            _ => None,
        }
    }

    pub fn any<T: Any>(&self, name: &str) -> Option<Rc<T>> {
        match self.values.get(name)? {
            PropValue::Any(value) => Rc::clone(value).downcast::<T>().ok(),
            _ => None,
        }
    }

    /// Children passed to a component node.
    pub fn children(&self) -> &[Node] {
        match self.values.get(CHILDREN) {
            Some(PropValue::Nodes(nodes)) => nodes,
            _ => &[],
        }
    }

    pub(crate) fn set_children(&mut self, children: Vec<Node>) {
        if children.is_empty() {
            self.values.shift_remove(CHILDREN);
        } else {
            self.values.insert(CHILDREN.to_string(), PropValue::Nodes(children));
        }
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Props");
        if let Some(key) = self.key {
            debug.field("key", &key);
        }
        if let Some(class_name) = &self.class_name {
            debug.field("class_name", class_name);
        }
        if !self.attributes.is_empty() {
            debug.field("attributes", &self.attributes);
        }
        if !self.style.is_empty() {
            debug.field("style", &self.style);
        }
        if !self.events.is_empty() {
            debug.field("events", &self.events.keys().collect::<Vec<_>>());
        }
        if let Some(html) = &self.html {
            debug.field("html", html);
        }
        if !self.values.is_empty() {
            debug.field("values", &self.values);
        }
        debug.finish()
    }
}
