//! Prop reconciliation. Every write is preceded by a read of the live host
//! value, so re-applying the same props performs no host writes.

use crate::diagnostics::PATCH;
use crate::host::{HandleId, Host, HostError};
use crate::html::css_property_name;
use crate::props::{is_property_attribute, AttrValue, Props};

use super::Reconciler;

impl<H: Host> Reconciler<'_, H> {
    pub(crate) fn apply_props(
        &mut self,
        handle: HandleId,
        old: &Props,
        new: &Props,
    ) -> Result<(), HostError> {
        {
            let mut host = self.host.borrow_mut();
            let host = &mut *host;
            sync_class(host, handle, old, new)?;
            sync_attributes(host, handle, old, new)?;
            sync_style(host, handle, old, new)?;
            sync_events(host, handle, old, new)?;
            sync_html(host, handle, old, new)?;
        }
        // Ref callbacks run with the host released.
        sync_ref(handle, old, new);
        Ok(())
    }
}

fn sync_class<H: Host>(
    host: &mut H,
    handle: HandleId,
    old: &Props,
    new: &Props,
) -> Result<(), HostError> {
    match new.class_name() {
        Some(class_name) => {
            if host.attribute(handle, "class") != Some(class_name) {
                log::trace!(target: PATCH, "{handle}: class = {class_name:?}");
                host.set_attribute(handle, "class", class_name)?;
            }
        }
        None => {
            if old.class_name().is_some() && host.attribute(handle, "class").is_some() {
                host.remove_attribute(handle, "class")?;
            }
        }
    }
    Ok(())
}

fn sync_attributes<H: Host>(
    host: &mut H,
    handle: HandleId,
    old: &Props,
    new: &Props,
) -> Result<(), HostError> {
    for (name, value) in new.attributes() {
        if is_property_attribute(name) {
            let next = value.to_property(name);
            if host.property(handle, name).as_ref() != Some(&next) {
                log::trace!(target: PATCH, "{handle}: property {name} = {next:?}");
                host.set_property(handle, name, next)?;
            }
            continue;
        }
        match value.attribute_text() {
            Some(text) => {
                if host.attribute(handle, name) != Some(&*text) {
                    log::trace!(target: PATCH, "{handle}: {name} = {text:?}");
                    host.set_attribute(handle, name, &text)?;
                }
            }
            None => {
                if host.attribute(handle, name).is_some() {
                    host.remove_attribute(handle, name)?;
                }
            }
        }
    }
    for name in old.attributes().keys() {
        if new.attributes().contains_key(name) {
            continue;
        }
        if is_property_attribute(name) {
            let cleared = AttrValue::cleared_property(name);
            if host.property(handle, name).as_ref() != Some(&cleared) {
                host.set_property(handle, name, cleared)?;
            }
        } else if host.attribute(handle, name).is_some() {
            log::trace!(target: PATCH, "{handle}: removing {name}");
            host.remove_attribute(handle, name)?;
        }
    }
    Ok(())
}

fn sync_style<H: Host>(
    host: &mut H,
    handle: HandleId,
    old: &Props,
    new: &Props,
) -> Result<(), HostError> {
    for (property, value) in new.styles() {
        let name = css_property_name(property);
        if host.style(handle, &name) != Some(value.as_str()) {
            host.set_style(handle, &name, value)?;
        }
    }
    for property in old.styles().keys() {
        if new.styles().contains_key(property) {
            continue;
        }
        let name = css_property_name(property);
        if host.style(handle, &name).is_some() {
            host.remove_style(handle, &name)?;
        }
    }
    Ok(())
}

fn sync_events<H: Host>(
    host: &mut H,
    handle: HandleId,
    old: &Props,
    new: &Props,
) -> Result<(), HostError> {
    for (event, handler) in new.events() {
        let current = host.listener(handle, event);
        if !current.is_some_and(|current| current.ptr_eq(handler)) {
            log::trace!(target: PATCH, "{handle}: listener {event} replaced");
            host.set_listener(handle, event, handler.clone())?;
        }
    }
    for event in old.events().keys() {
        if !new.events().contains_key(event) && host.listener(handle, event).is_some() {
            host.remove_listener(handle, event)?;
        }
    }
    Ok(())
}

fn sync_html<H: Host>(
    host: &mut H,
    handle: HandleId,
    old: &Props,
    new: &Props,
) -> Result<(), HostError> {
    match new.html() {
        Some(html) => {
            let rendered = html.render();
            if host.inner_html(handle).unwrap_or_default() != rendered {
                log::trace!(target: PATCH, "{handle}: inner html replaced");
                host.set_inner_html(handle, &rendered)?;
            }
        }
        None => {
            if old.html().is_some() && host.inner_html(handle).is_some() {
                host.set_inner_html(handle, "")?;
            }
        }
    }
    Ok(())
}

fn sync_ref(handle: HandleId, old: &Props, new: &Props) {
    match (old.get_node_ref(), new.get_node_ref()) {
        (Some(previous), Some(next)) if previous.ptr_eq(next) => {}
        (previous, next) => {
            if let Some(previous) = previous {
                previous.assign(None);
            }
            if let Some(next) = next {
                next.assign(Some(handle));
            }
        }
    }
}
