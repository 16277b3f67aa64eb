use std::rc::Rc;

use crate::config::SiteConfig;
use crate::dom::{header_height, EventKind, Host, Target, View};
use crate::registry::{Behavior, InitRegistry};

const ANCHOR_SELECTOR: &str = "a[href^=\"#\"]";

/// The id an in-page link points at, if it points anywhere.
pub fn fragment_target(href: &str) -> Option<&str> {
    match href {
        "#" | "#!" => None,
        _ => href.strip_prefix('#').filter(|id| !id.is_empty()),
    }
}

pub fn init<H: Host>(host: &Rc<H>, registry: &InitRegistry, config: &SiteConfig) {
    if !registry.claim(Behavior::SmoothScroll) {
        return;
    }
    let view = Rc::clone(host);
    let fallback = config.fallback_header_height_px;
    host.on(Target::Document, EventKind::Click, move |e| {
        let Some(link) = e.target.as_ref().and_then(|t| view.closest(t, ANCHOR_SELECTOR)) else {
            return;
        };
        let Some(href) = view.attribute(&link, "href") else { return };
        let Some(section) = fragment_target(&href).and_then(|id| view.by_id(id)) else {
            return;
        };
        e.prevent_default();
        let top = view.viewport_top(&section) + view.scroll_y() - header_height(&*view, fallback);
        view.scroll_to(top);
    });
}
