use std::rc::Rc;

use log::debug;

use crate::config::SiteConfig;
use crate::dom::{EventKind, Host, Target, View};
use crate::registry::{Behavior, InitRegistry};
use crate::timing::throttle;

const BUTTON_CLASS: &str = "scroll-to-top";
const ARIA_LABEL: &str = "Nach oben scrollen";

const BUTTON_STYLE: &[(&str, &str)] = &[
    ("position", "fixed"),
    ("bottom", "30px"),
    ("right", "30px"),
    ("width", "50px"),
    ("height", "50px"),
    ("border-radius", "50%"),
    ("background", "var(--color-primary)"),
    ("color", "white"),
    ("border", "none"),
    ("font-size", "24px"),
    ("cursor", "pointer"),
    ("opacity", "0"),
    ("transition", "opacity 0.3s ease-in-out, transform 0.3s ease-in-out"),
    ("z-index", "1000"),
    ("box-shadow", "0 4px 12px rgba(0,0,0,0.2)"),
];

pub fn init<H: Host>(host: &Rc<H>, registry: &InitRegistry, config: &SiteConfig) {
    if !registry.claim(Behavior::ScrollToTop) {
        return;
    }
    let (Some(body), Some(button)) = (host.body(), host.create_element("button")) else {
        return;
    };
    host.add_class(&button, BUTTON_CLASS);
    host.set_text(&button, "↑");
    host.set_attribute(&button, "aria-label", ARIA_LABEL);
    for (property, value) in BUTTON_STYLE {
        host.set_style(&button, property, value);
    }
    host.append_child(&body, &button);

    let show_after = config.scroll_to_top.show_after_px;
    let mut on_scroll = {
        let view = Rc::clone(host);
        let button = button.clone();
        throttle(Rc::clone(host), config.scroll_to_top.throttle_ms, move || {
            let (opacity, scale) = if view.scroll_y() > show_after {
                ("1", "scale(1)")
            } else {
                ("0", "scale(0.8)")
            };
            view.set_style(&button, "opacity", opacity);
            view.set_style(&button, "transform", scale);
        })
    };
    host.on(Target::Window, EventKind::Scroll, move |_| on_scroll());

    {
        let view = Rc::clone(host);
        host.on(Target::Node(button.clone()), EventKind::Click, move |_| view.scroll_to(0.0));
    }
    for (kind, scale) in [(EventKind::MouseEnter, "scale(1.1)"), (EventKind::MouseLeave, "scale(1)")] {
        let view = Rc::clone(host);
        let target = button.clone();
        host.on(Target::Node(button.clone()), kind, move |_| {
            view.set_style(&target, "transform", scale);
        });
    }
    debug!("Scroll-to-top control added");
}
