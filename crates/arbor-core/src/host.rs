//! The live UI tree the reconciler drives.
//!
//! [`Host`] is the seam between the reconciler and whatever owns real UI
//! objects (a browser document, a native toolkit, a terminal buffer).
//! [`MemoryHost`] is the in-memory implementation used by tests, the string
//! renderer's callers and the demo app.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::event::EventHandler;
use crate::html::{escape_html, is_void_element};

pub type HandleId = usize;

pub type SharedHost<H> = Rc<RefCell<H>>;

pub fn shared<H: Host>(host: H) -> SharedHost<H> {
    Rc::new(RefCell::new(host))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    Missing { handle: HandleId },
    NotAnElement { handle: HandleId },
    NotAChild { parent: HandleId, child: HandleId },
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::Missing { handle } => write!(f, "handle {handle} missing"),
            HostError::NotAnElement { handle } => write!(f, "handle {handle} is not an element"),
            HostError::NotAChild { parent, child } => {
                write!(f, "handle {child} is not a child of {parent}")
            }
        }
    }
}

impl std::error::Error for HostError {}

/// Live property value (as opposed to a string attribute).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Text(String),
    Bool(bool),
}

pub trait Host: Any {
    fn create_element(&mut self, tag: &str) -> HandleId;
    fn create_text(&mut self, text: &str) -> HandleId;

    /// Inserts `child` under `parent` before `before`, or last when `before`
    /// is `None`. A child already attached somewhere is moved.
    fn insert_before(
        &mut self,
        parent: HandleId,
        child: HandleId,
        before: Option<HandleId>,
    ) -> Result<(), HostError>;
    fn remove_child(&mut self, parent: HandleId, child: HandleId) -> Result<(), HostError>;
    /// Frees `handle` and everything below it.
    fn release(&mut self, handle: HandleId) -> Result<(), HostError>;

    fn parent(&self, handle: HandleId) -> Option<HandleId>;
    fn tag_name(&self, handle: HandleId) -> Option<&str>;

    fn text(&self, handle: HandleId) -> Option<&str>;
    fn set_text(&mut self, handle: HandleId, text: &str) -> Result<(), HostError>;

    fn attribute(&self, handle: HandleId, name: &str) -> Option<&str>;
    fn set_attribute(&mut self, handle: HandleId, name: &str, value: &str)
        -> Result<(), HostError>;
    fn remove_attribute(&mut self, handle: HandleId, name: &str) -> Result<(), HostError>;

    fn style(&self, handle: HandleId, property: &str) -> Option<&str>;
    fn set_style(&mut self, handle: HandleId, property: &str, value: &str)
        -> Result<(), HostError>;
    fn remove_style(&mut self, handle: HandleId, property: &str) -> Result<(), HostError>;

    fn property(&self, handle: HandleId, name: &str) -> Option<PropertyValue>;
    fn set_property(
        &mut self,
        handle: HandleId,
        name: &str,
        value: PropertyValue,
    ) -> Result<(), HostError>;

    fn inner_html(&self, handle: HandleId) -> Option<&str>;
    /// Replaces the element's content wholesale; existing children are released.
    fn set_inner_html(&mut self, handle: HandleId, html: &str) -> Result<(), HostError>;

    fn listener(&self, handle: HandleId, event: &str) -> Option<EventHandler>;
    fn set_listener(
        &mut self,
        handle: HandleId,
        event: &str,
        handler: EventHandler,
    ) -> Result<(), HostError>;
    fn remove_listener(&mut self, handle: HandleId, event: &str) -> Result<(), HostError>;
}

/// Counts of host writes since the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationStats {
    pub created: usize,
    pub inserted: usize,
    pub moved: usize,
    pub removed: usize,
    pub text_writes: usize,
    pub attribute_writes: usize,
    pub style_writes: usize,
    pub property_writes: usize,
    pub listener_writes: usize,
    pub html_writes: usize,
}

impl MutationStats {
    pub fn total(&self) -> usize {
        self.created
            + self.inserted
            + self.moved
            + self.removed
            + self.text_writes
            + self.attribute_writes
            + self.style_writes
            + self.property_writes
            + self.listener_writes
            + self.html_writes
    }
}

#[derive(Default)]
struct ElementData {
    tag: String,
    attributes: IndexMap<String, String>,
    style: IndexMap<String, String>,
    properties: IndexMap<String, PropertyValue>,
    inner_html: Option<String>,
    listeners: IndexMap<String, EventHandler>,
}

enum HostNodeKind {
    Element(ElementData),
    Text(String),
}

struct HostNode {
    kind: HostNodeKind,
    parent: Option<HandleId>,
    children: Vec<HandleId>,
}

#[derive(Default)]
pub struct MemoryHost {
    nodes: Vec<Option<HostNode>>,
    stats: MutationStats,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mutations(&self) -> MutationStats {
        self.stats
    }

    pub fn reset_mutations(&mut self) {
        self.stats = MutationStats::default();
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, handle: HandleId) -> bool {
        matches!(self.nodes.get(handle), Some(Some(_)))
    }

    pub fn children(&self, handle: HandleId) -> Vec<HandleId> {
        self.node(handle)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    /// Concatenated text of every text handle below `handle`.
    pub fn text_content(&self, handle: HandleId) -> String {
        let mut out = String::new();
        self.collect_text(handle, &mut out);
        out
    }

    fn collect_text(&self, handle: HandleId, out: &mut String) {
        let Some(node) = self.node(handle) else {
            return;
        };
        match &node.kind {
            HostNodeKind::Text(text) => out.push_str(text),
            HostNodeKind::Element(data) => {
                if let Some(html) = &data.inner_html {
                    out.push_str(html);
                }
                for &child in &node.children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// Serialises the children of `handle` (the handle itself excluded).
    pub fn inner_html_of(&self, handle: HandleId) -> String {
        let mut out = String::new();
        if let Some(node) = self.node(handle) {
            if let HostNodeKind::Element(ElementData {
                inner_html: Some(html),
                ..
            }) = &node.kind
            {
                out.push_str(html);
            }
            for &child in &node.children {
                self.write_html(child, &mut out);
            }
        }
        out
    }

    /// Serialises `handle` and its subtree. Live properties are not reflected,
    /// as a browser's `outerHTML` does not reflect them either.
    pub fn to_html(&self, handle: HandleId) -> String {
        let mut out = String::new();
        self.write_html(handle, &mut out);
        out
    }

    fn write_html(&self, handle: HandleId, out: &mut String) {
        let Some(node) = self.node(handle) else {
            return;
        };
        match &node.kind {
            HostNodeKind::Text(text) => out.push_str(&escape_html(text)),
            HostNodeKind::Element(data) => {
                out.push('<');
                out.push_str(&data.tag);
                for (name, value) in &data.attributes {
                    out.push_str(&format!(" {name}=\"{}\"", escape_html(value)));
                }
                if !data.style.is_empty() {
                    let style: String = data
                        .style
                        .iter()
                        .map(|(property, value)| format!("{property}:{value};"))
                        .collect();
                    out.push_str(&format!(" style=\"{}\"", escape_html(&style)));
                }
                out.push('>');
                if is_void_element(&data.tag) {
                    return;
                }
                if let Some(html) = &data.inner_html {
                    out.push_str(html);
                }
                for &child in &node.children {
                    self.write_html(child, out);
                }
                out.push_str(&format!("</{}>", data.tag));
            }
        }
    }

    /// Depth-first search from `root` (inclusive) for an element with `tag`.
    pub fn find_by_tag(&self, root: HandleId, tag: &str) -> Option<HandleId> {
        self.find_first(root, &|host, handle| host.tag_name(handle) == Some(tag))
    }

    /// Depth-first search for an element whose text content equals `text`.
    pub fn find_by_text(&self, root: HandleId, text: &str) -> Option<HandleId> {
        self.find_first(root, &|host, handle| {
            host.tag_name(handle).is_some() && host.text_content(handle) == text
        })
    }

    pub fn find_by_attribute(&self, root: HandleId, name: &str, value: &str) -> Option<HandleId> {
        self.find_first(root, &|host, handle| host.attribute(handle, name) == Some(value))
    }

    pub fn find_first(
        &self,
        root: HandleId,
        predicate: &dyn Fn(&MemoryHost, HandleId) -> bool,
    ) -> Option<HandleId> {
        let node = self.node(root)?;
        if predicate(self, root) {
            return Some(root);
        }
        node.children
            .iter()
            .find_map(|&child| self.find_first(child, predicate))
    }

    fn node(&self, handle: HandleId) -> Option<&HostNode> {
        self.nodes.get(handle).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, handle: HandleId) -> Result<&mut HostNode, HostError> {
        self.nodes
            .get_mut(handle)
            .and_then(Option::as_mut)
            .ok_or(HostError::Missing { handle })
    }

    fn element(&self, handle: HandleId) -> Option<&ElementData> {
        match &self.node(handle)?.kind {
            HostNodeKind::Element(data) => Some(data),
            HostNodeKind::Text(_) => None,
        }
    }

    fn element_mut(&mut self, handle: HandleId) -> Result<&mut ElementData, HostError> {
        match &mut self.node_mut(handle)?.kind {
            HostNodeKind::Element(data) => Ok(data),
            HostNodeKind::Text(_) => Err(HostError::NotAnElement { handle }),
        }
    }

    fn push(&mut self, kind: HostNodeKind) -> HandleId {
        self.stats.created += 1;
        let id = self.nodes.len();
        self.nodes.push(Some(HostNode {
            kind,
            parent: None,
            children: Vec::new(),
        }));
        id
    }

    fn detach(&mut self, child: HandleId) -> Result<(), HostError> {
        let parent = self.node_mut(child)?.parent.take();
        if let Some(parent) = parent {
            let siblings = &mut self.node_mut(parent)?.children;
            siblings.retain(|&sibling| sibling != child);
        }
        Ok(())
    }

    fn free(&mut self, handle: HandleId) {
        let Some(node) = self.nodes.get_mut(handle).and_then(Option::take) else {
            return;
        };
        for child in node.children {
            self.free(child);
        }
    }
}

impl Host for MemoryHost {
    fn create_element(&mut self, tag: &str) -> HandleId {
        self.push(HostNodeKind::Element(ElementData {
            tag: tag.to_string(),
            ..ElementData::default()
        }))
    }

    fn create_text(&mut self, text: &str) -> HandleId {
        self.push(HostNodeKind::Text(text.to_string()))
    }

    fn insert_before(
        &mut self,
        parent: HandleId,
        child: HandleId,
        before: Option<HandleId>,
    ) -> Result<(), HostError> {
        if before == Some(child) {
            return Ok(());
        }
        self.element_mut(parent)?;
        if let Some(anchor) = before {
            if self.parent(anchor) != Some(parent) {
                return Err(HostError::NotAChild {
                    parent,
                    child: anchor,
                });
            }
        }
        let moving = self.node_mut(child)?.parent == Some(parent);
        self.detach(child)?;
        let siblings = &mut self.node_mut(parent)?.children;
        let index = before
            .and_then(|anchor| siblings.iter().position(|&sibling| sibling == anchor))
            .unwrap_or(siblings.len());
        siblings.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        if moving {
            self.stats.moved += 1;
        } else {
            self.stats.inserted += 1;
        }
        Ok(())
    }

    fn remove_child(&mut self, parent: HandleId, child: HandleId) -> Result<(), HostError> {
        if self.parent(child) != Some(parent) {
            return Err(HostError::NotAChild { parent, child });
        }
        self.detach(child)?;
        self.stats.removed += 1;
        Ok(())
    }

    fn release(&mut self, handle: HandleId) -> Result<(), HostError> {
        if self.parent(handle).is_some() {
            self.detach(handle)?;
            self.stats.removed += 1;
        } else {
            self.node_mut(handle)?;
        }
        self.free(handle);
        Ok(())
    }

    fn parent(&self, handle: HandleId) -> Option<HandleId> {
        self.node(handle)?.parent
    }

    fn tag_name(&self, handle: HandleId) -> Option<&str> {
        self.element(handle).map(|data| data.tag.as_str())
    }

    fn text(&self, handle: HandleId) -> Option<&str> {
        match &self.node(handle)?.kind {
            HostNodeKind::Text(text) => Some(text),
            HostNodeKind::Element(_) => None,
        }
    }

    fn set_text(&mut self, handle: HandleId, text: &str) -> Result<(), HostError> {
        match &mut self.node_mut(handle)?.kind {
            HostNodeKind::Text(current) => {
                *current = text.to_string();
                self.stats.text_writes += 1;
                Ok(())
            }
            HostNodeKind::Element(_) => Err(HostError::NotAnElement { handle }),
        }
    }

    fn attribute(&self, handle: HandleId, name: &str) -> Option<&str> {
        self.element(handle)?.attributes.get(name).map(String::as_str)
    }

    fn set_attribute(
        &mut self,
        handle: HandleId,
        name: &str,
        value: &str,
    ) -> Result<(), HostError> {
        self.element_mut(handle)?
            .attributes
            .insert(name.to_string(), value.to_string());
        self.stats.attribute_writes += 1;
        Ok(())
    }

    fn remove_attribute(&mut self, handle: HandleId, name: &str) -> Result<(), HostError> {
        if self.element_mut(handle)?.attributes.shift_remove(name).is_some() {
            self.stats.attribute_writes += 1;
        }
        Ok(())
    }

    fn style(&self, handle: HandleId, property: &str) -> Option<&str> {
        self.element(handle)?.style.get(property).map(String::as_str)
    }

    fn set_style(
        &mut self,
        handle: HandleId,
        property: &str,
        value: &str,
    ) -> Result<(), HostError> {
        self.element_mut(handle)?
            .style
            .insert(property.to_string(), value.to_string());
        self.stats.style_writes += 1;
        Ok(())
    }

    fn remove_style(&mut self, handle: HandleId, property: &str) -> Result<(), HostError> {
        if self.element_mut(handle)?.style.shift_remove(property).is_some() {
            self.stats.style_writes += 1;
        }
        Ok(())
    }

    fn property(&self, handle: HandleId, name: &str) -> Option<PropertyValue> {
        self.element(handle)?.properties.get(name).cloned()
    }

    fn set_property(
        &mut self,
        handle: HandleId,
        name: &str,
        value: PropertyValue,
    ) -> Result<(), HostError> {
        self.element_mut(handle)?
            .properties
            .insert(name.to_string(), value);
        self.stats.property_writes += 1;
        Ok(())
    }

    fn inner_html(&self, handle: HandleId) -> Option<&str> {
        self.element(handle)?.inner_html.as_deref()
    }

    fn set_inner_html(&mut self, handle: HandleId, html: &str) -> Result<(), HostError> {
        let children = std::mem::take(&mut self.node_mut(handle)?.children);
        for child in children {
            self.free(child);
        }
        self.element_mut(handle)?.inner_html = if html.is_empty() {
            None
        } else {
            Some(html.to_string())
        };
        self.stats.html_writes += 1;
        Ok(())
    }

    fn listener(&self, handle: HandleId, event: &str) -> Option<EventHandler> {
        self.element(handle)?.listeners.get(event).cloned()
    }

    fn set_listener(
        &mut self,
        handle: HandleId,
        event: &str,
        handler: EventHandler,
    ) -> Result<(), HostError> {
        self.element_mut(handle)?
            .listeners
            .insert(event.to_string(), handler);
        self.stats.listener_writes += 1;
        Ok(())
    }

    fn remove_listener(&mut self, handle: HandleId, event: &str) -> Result<(), HostError> {
        if self.element_mut(handle)?.listeners.shift_remove(event).is_some() {
            self.stats.listener_writes += 1;
        }
        Ok(())
    }
}

impl fmt::Debug for MemoryHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryHost")
            .field("handles", &self.len())
            .field("stats", &self.stats)
            .finish()
    }
}
