use std::rc::Rc;

use log::debug;

use crate::config::SiteConfig;
use crate::dom::{Host, ObserverOptions, View};
use crate::registry::{Behavior, InitRegistry};

const REVEAL_SELECTOR: &str = ".card, .c-card, img, .hero-content, .benefit-item, .award-item";
const TRANSITION: &str = "opacity 0.8s ease-out, transform 0.8s ease-out";

pub fn init<H: Host>(host: &Rc<H>, registry: &InitRegistry, config: &SiteConfig) {
    if !registry.claim(Behavior::ScrollReveal) {
        return;
    }
    let elements = host.query_all(REVEAL_SELECTOR);
    if elements.is_empty() {
        debug!("Nothing to reveal on scroll");
        return;
    }

    let hidden_offset = format!("translateY({}px)", config.reveal.offset_px);
    for el in &elements {
        host.set_style(el, "opacity", "0");
        host.set_style(el, "transform", &hidden_offset);
        host.set_style(el, "transition", TRANSITION);
    }

    let options = ObserverOptions {
        threshold: config.reveal.threshold,
        root_margin: config.reveal.root_margin.clone(),
    };
    let view = Rc::clone(host);
    let threshold = options.threshold;
    host.watch(&elements, &options, move |entries| {
        for entry in entries.iter().filter(|e| e.reaches(threshold)) {
            // once revealed, later hover transforms must not be reset
            if view.style(&entry.target, "opacity").as_deref() == Some("1") {
                continue;
            }
            view.set_style(&entry.target, "opacity", "1");
            view.set_style(&entry.target, "transform", "translateY(0)");
        }
    });
    debug!("Scroll reveal watching {} elements", elements.len());
}
