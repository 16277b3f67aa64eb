use std::rc::Rc;

use log::debug;

use crate::config::SiteConfig;
use crate::dom::{EventKind, Host, Target, View};
use crate::registry::{Behavior, InitRegistry};

const INTERACTIVE_SELECTOR: &str = ".btn, .c-button, .card, .c-card";
const HOVER_TRANSFORM: &str = "translateY(-2px) scale(1.02)";
const REST_TRANSFORM: &str = "translateY(0) scale(1)";
const RIPPLE_SIZE_PX: f64 = 20.0;
const RIPPLE_KEYFRAMES: &str = "@keyframes ripple { to { transform: scale(4); opacity: 0; } }";

const RIPPLE_STYLE: &[(&str, &str)] = &[
    ("position", "absolute"),
    ("border-radius", "50%"),
    ("background", "rgba(255, 255, 255, 0.6)"),
    ("width", "20px"),
    ("height", "20px"),
    ("pointer-events", "none"),
    ("animation", "ripple 0.6s ease-out"),
];

pub fn init<H: Host>(host: &Rc<H>, registry: &InitRegistry, config: &SiteConfig) {
    if !registry.claim(Behavior::InteractionEffects) {
        return;
    }
    let elements = host.query_all(INTERACTIVE_SELECTOR);
    for el in &elements {
        {
            let view = Rc::clone(host);
            let el2 = el.clone();
            host.on(Target::Node(el.clone()), EventKind::MouseEnter, move |_| {
                view.set_style(&el2, "transform", HOVER_TRANSFORM);
            });
        }
        {
            let view = Rc::clone(host);
            let el2 = el.clone();
            host.on(Target::Node(el.clone()), EventKind::MouseLeave, move |_| {
                view.set_style(&el2, "transform", REST_TRANSFORM);
            });
        }

        let view = Rc::clone(host);
        let el2 = el.clone();
        let lifetime = config.ripple.duration_ms;
        host.on(Target::Node(el.clone()), EventKind::MouseDown, move |e| {
            spawn_ripple(&view, &el2, e.offset, lifetime);
        });
    }

    inject_keyframes(&**host);
    debug!("Micro-interactions wired on {} elements", elements.len());
}

fn spawn_ripple<H: Host>(host: &Rc<H>, el: &H::Node, (x, y): (f64, f64), lifetime_ms: u32) {
    let Some(ripple) = host.create_element("span") else { return };
    for (property, value) in RIPPLE_STYLE {
        host.set_style(&ripple, property, value);
    }
    let half = RIPPLE_SIZE_PX / 2.0;
    host.set_style(&ripple, "left", &format!("{}px", x - half));
    host.set_style(&ripple, "top", &format!("{}px", y - half));

    host.set_style(el, "position", "relative");
    host.set_style(el, "overflow", "hidden");
    host.append_child(el, &ripple);

    let view = Rc::clone(host);
    host.set_timeout(lifetime_ms, Box::new(move || view.remove(&ripple)));
}

fn inject_keyframes<V: View>(view: &V) {
    let (Some(head), Some(style)) = (view.head(), view.create_element("style")) else {
        return;
    };
    view.set_text(&style, RIPPLE_KEYFRAMES);
    view.append_child(&head, &style);
}
