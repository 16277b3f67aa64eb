use std::rc::Rc;

use crate::dom::{EventKind, Host, Target, View};
use crate::registry::{Behavior, InitRegistry};

const CARD_SELECTOR: &str = ".card, .c-card";

const LIFTED: &[(&str, &str)] = &[
    ("transition", "all 0.3s ease-in-out"),
    ("transform", "translateY(-8px) scale(1.02)"),
    ("box-shadow", "0 12px 24px rgba(44, 95, 45, 0.2)"),
];

const RESTING: &[(&str, &str)] = &[
    ("transform", "translateY(0) scale(1)"),
    ("box-shadow", "var(--shadow-sm)"),
];

pub fn init<H: Host>(host: &Rc<H>, registry: &InitRegistry) {
    if !registry.claim(Behavior::CardHover) {
        return;
    }
    for card in host.query_all(CARD_SELECTOR) {
        for (kind, styles) in [(EventKind::MouseEnter, LIFTED), (EventKind::MouseLeave, RESTING)] {
            let view = Rc::clone(host);
            let target = card.clone();
            host.on(Target::Node(card.clone()), kind, move |_| {
                for (property, value) in styles {
                    view.set_style(&target, property, value);
                }
            });
        }
    }
}
