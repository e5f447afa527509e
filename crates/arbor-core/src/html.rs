//! HTML escaping, sanitizing and string rendering.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::RenderError;
use crate::hooks::HookCells;
use crate::instance_context;
use crate::node::Node;
use crate::props::{AttrValue, Props};

const VOID_ELEMENTS: [&str; 15] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta", "param",
    "source", "track", "wbr",
];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// `fontSize` -> `font-size`. Already kebab-cased names pass through.
pub fn css_property_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

static BLOCK_TAGS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["script", "iframe", "object", "style"]
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>"))
                .expect("block tag pattern")
        })
        .collect()
});

static STRAY_TAGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</?(?:script|iframe|object|embed|link|style)\b[^>]*>")
        .expect("stray tag pattern")
});

static EVENT_ATTRIBUTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+on[a-z]+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#)
        .expect("event attribute pattern")
});

static JAVASCRIPT_ATTRIBUTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"(?i)\s+[^\s=/>]+\s*=\s*"#,
        r#"(?:"[^"]*javascript\s*:[^"]*""#,
        r#"|'[^']*javascript\s*:[^']*'"#,
        r#"|[^\s>"']*javascript\s*:[^\s>]*)"#
    ))
    .expect("javascript attribute pattern")
});

static JAVASCRIPT_URLS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript\s*:").expect("javascript url pattern"));

/// Strips `script`, `iframe`, `object`, `embed`, `link` and `style` tags,
/// `on*` attributes and attributes holding `javascript:` URLs from `html`.
///
/// Passes repeat until nothing changes, so removing one match cannot
/// assemble another out of the text around it.
pub fn sanitize_html(html: &str) -> String {
    let mut out = html.to_string();
    loop {
        let before = out.len();
        for pattern in BLOCK_TAGS.iter() {
            out = pattern.replace_all(&out, "").into_owned();
        }
        for pattern in [
            &*STRAY_TAGS,
            &*EVENT_ATTRIBUTES,
            &*JAVASCRIPT_ATTRIBUTES,
            &*JAVASCRIPT_URLS,
        ] {
            out = pattern.replace_all(&out, "").into_owned();
        }
        if out.len() == before {
            return out;
        }
    }
}

/// Renders `node` to an HTML string without a host.
///
/// Components run once against throwaway hook cells: hooks yield their
/// initial values and effects are never run.
pub fn render_to_string(node: &Node) -> Result<String, RenderError> {
    let mut out = String::new();
    write_node(node, &mut out)?;
    Ok(out)
}

fn write_node(node: &Node, out: &mut String) -> Result<(), RenderError> {
    match node {
        Node::Text(text) => out.push_str(&escape_html(text)),
        Node::Fragment(fragment) | Node::Outlet(fragment) => {
            for child in &fragment.children {
                write_node(child, out)?;
            }
        }
        Node::Component(component) => {
            let cells = HookCells::detached(component.component.name());
            let rendered = {
                let _guard = instance_context::enter(&cells);
                component.component.call(&component.props)
            };
            let child = rendered.map_err(|err| err.in_component(component.component.name()))?;
            write_node(&child, out)?;
        }
        Node::Boundary(boundary) => {
            let mut inner = String::new();
            match write_node(&boundary.child, &mut inner) {
                Ok(()) => out.push_str(&inner),
                Err(err) => {
                    log::error!(target: crate::diagnostics::RUNTIME, "{err}");
                    write_node(&boundary.fallback, out)?;
                }
            }
        }
        Node::Element(element) => {
            out.push('<');
            out.push_str(&element.tag);
            write_attributes(&element.props, out);
            out.push('>');
            match element.props.html() {
                Some(html) => out.push_str(&html.render()),
                None => {
                    for child in &element.children {
                        write_node(child, out)?;
                    }
                }
            }
            if !is_void_element(&element.tag) {
                out.push_str(&format!("</{}>", element.tag));
            }
        }
    }
    Ok(())
}

fn write_attributes(props: &Props, out: &mut String) {
    if let Some(class_name) = props.class_name().filter(|class| !class.is_empty()) {
        out.push_str(&format!(" class=\"{}\"", escape_html(class_name)));
    }
    let style: String = props
        .styles()
        .iter()
        .map(|(property, value)| format!("{}:{value};", css_property_name(property)))
        .collect();
    if !style.is_empty() {
        out.push_str(&format!(" style=\"{}\"", escape_html(&style)));
    }
    for (name, value) in props.attributes() {
        match value {
            AttrValue::Bool(true) => out.push_str(&format!(" {name}")),
            AttrValue::Bool(false) => {}
            other => {
                if let Some(text) = other.attribute_text() {
                    out.push_str(&format!(" {name}=\"{}\"", escape_html(&text)));
                }
            }
        }
    }
}
