use std::rc::Rc;

use log::{debug, info};

pub mod config;
pub mod dom;
pub mod error;
pub mod registry;
pub mod timing;

pub mod components {
    pub mod card_hover;
    pub mod count_up;
    pub mod interactions;
    pub mod media;
    pub mod nav_menu;
    pub mod parallax;
    pub mod scroll_reveal;
    pub mod scroll_spy;
    pub mod scroll_to_top;
    pub mod smooth_scroll;
}
pub mod forms;

pub use config::SiteConfig;
pub use dom::{EventKind, Host, Target, Timers, View};
pub use error::ConfigError;
pub use registry::{Behavior, InitRegistry};

use components::{
    card_hover, count_up, interactions, media, nav_menu, parallax, scroll_reveal, scroll_spy,
    scroll_to_top, smooth_scroll,
};

/// Wires every behavior against the current document.
///
/// Safe to call repeatedly with the same registry: each behavior is wired at most once.
pub fn init<H: Host>(host: &Rc<H>, registry: &InitRegistry, config: &SiteConfig) {
    info!("Initializing site behaviors");
    nav_menu::init(host, registry, config);
    scroll_reveal::init(host, registry, config);
    media::init(host, registry);
    interactions::init(host, registry, config);
    forms::init(host, registry, config);
    smooth_scroll::init(host, registry, config);
    scroll_spy::init(host, registry, config);
    count_up::init(host, registry, config);
    scroll_to_top::init(host, registry, config);
    parallax::init(host, registry, config);
    card_hover::init(host, registry);
}

/// Wires every behavior now, or on `DOMContentLoaded` while the document is still loading.
///
/// The configuration block is read when wiring happens, so one placed after
/// this script in the markup is still honored.
pub fn start_with<H: Host>(host: &Rc<H>, loading: bool) {
    let registry = InitRegistry::new();
    if !loading {
        init(host, &registry, &SiteConfig::load(&**host));
        return;
    }
    debug!("Document still loading, waiting for DOMContentLoaded");
    let page = Rc::clone(host);
    host.on(Target::Document, EventKind::DomContentLoaded, move |_| {
        init(&page, &registry, &SiteConfig::load(&*page));
    });
}
