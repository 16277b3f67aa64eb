use std::rc::Rc;

use log::debug;

use crate::config::SiteConfig;
use crate::dom::{Host, ObserverOptions, View};
use crate::registry::{Behavior, InitRegistry};

const SECTION_SELECTOR: &str = "[id]";
const LINK_SELECTOR: &str = ".nav-link[href^=\"#\"], .c-nav__link[href^=\"#\"]";
const ACTIVE_CLASS: &str = "active";

pub fn init<H: Host>(host: &Rc<H>, registry: &InitRegistry, config: &SiteConfig) {
    if !registry.claim(Behavior::ScrollSpy) {
        return;
    }
    let sections = host.query_all(SECTION_SELECTOR);
    let links = host.query_all(LINK_SELECTOR);
    if sections.is_empty() || links.is_empty() {
        debug!("Scroll spy inactive: {} sections, {} links", sections.len(), links.len());
        return;
    }

    let options = ObserverOptions {
        threshold: config.scroll_spy.threshold,
        root_margin: config.scroll_spy.root_margin.clone(),
    };
    let view = Rc::clone(host);
    let threshold = options.threshold;
    host.watch(&sections, &options, move |entries| {
        for entry in entries.iter().filter(|e| e.reaches(threshold)) {
            let Some(id) = view.attribute(&entry.target, "id") else { continue };
            highlight(&*view, &links, &id);
        }
    });
}

/// Marks the first link pointing at `#id` as the current one; at most one link stays active.
fn highlight<V: View>(view: &V, links: &[V::Node], id: &str) {
    for link in links {
        view.remove_class(link, ACTIVE_CLASS);
        view.remove_attribute(link, "aria-current");
    }
    let href = format!("#{id}");
    if let Some(link) = links
        .iter()
        .find(|link| view.attribute(link, "href").as_deref() == Some(href.as_str()))
    {
        view.add_class(link, ACTIVE_CLASS);
        view.set_attribute(link, "aria-current", "page");
    }
}
