use std::rc::Rc;

use crate::config::SiteConfig;
use crate::dom::{EventKind, Host, Target, View};
use crate::registry::{Behavior, InitRegistry};
use crate::timing::throttle;

const HERO_SELECTOR: &str = ".hero-section";

pub fn init<H: Host>(host: &Rc<H>, registry: &InitRegistry, config: &SiteConfig) {
    if !registry.claim(Behavior::Parallax) {
        return;
    }
    let Some(hero) = host.query(HERO_SELECTOR) else { return };

    let view = Rc::clone(host);
    let rate = config.parallax.rate;
    let mut on_scroll = throttle(Rc::clone(host), config.parallax.throttle_ms, move || {
        let offset = view.scroll_y() * rate;
        view.set_style(&hero, "transform", &format!("translate3d(0, {offset}px, 0)"));
    });
    host.on(Target::Window, EventKind::Scroll, move |_| on_scroll());
}
