#![doc = r"Core runtime pieces for Arbor: node model, reconciler, hooks and the host abstraction."]

pub extern crate self as arbor_core;

pub mod collections;
pub mod diagnostics;
mod error;
pub mod event;
pub mod hash;
pub mod hooks;
pub mod host;
pub mod html;
pub mod instance_context;
mod node;
pub mod owned;
pub mod platform;
pub mod props;
mod reconcile;
mod root;

pub use error::{ReconcileError, RenderError};
pub use event::{dispatch_event, event_name, Event, EventHandler, Modifiers};
pub use hooks::{
    use_callback, use_effect, use_effect_always, use_memo, use_reducer, use_ref, use_state,
    ActiveFlag, Dispatch, EffectResult, EffectScope, SetState,
};
pub use host::{
    shared, HandleId, Host, HostError, MemoryHost, MutationStats, PropertyValue, SharedHost,
};
pub use html::{escape_html, render_to_string, sanitize_html};
pub use node::{
    create_node, default_fallback, BoundaryNode, Child, Component, ComponentNode, ElementNode,
    FragmentNode, Key, Node, NodeKind, RenderFn, Rendered, Tag,
};
pub use owned::RefHolder;
pub use platform::RenderScheduler;
pub use props::{AttrValue, InnerHtml, NodeRef, PropValue, Props};
pub use reconcile::ChildDiffStrategy;
pub use root::{render, Root, RootOptions};

#[cfg(test)]
#[path = "tests/node_tests.rs"]
mod node_tests;

#[cfg(test)]
#[path = "tests/reconcile_tests.rs"]
mod reconcile_tests;

#[cfg(test)]
#[path = "tests/keyed_tests.rs"]
mod keyed_tests;

#[cfg(test)]
#[path = "tests/props_tests.rs"]
mod props_tests;

#[cfg(test)]
#[path = "tests/hooks_tests.rs"]
mod hooks_tests;

#[cfg(test)]
#[path = "tests/html_tests.rs"]
mod html_tests;
