use std::rc::Rc;

use log::debug;

use crate::config::SiteConfig;
use crate::dom::{EventKind, Host, Target, View};
use crate::registry::{Behavior, InitRegistry};
use crate::timing::debounce;

const TOGGLE_SELECTOR: &str = ".navbar-toggler, .c-nav__toggle";
const MENU_SELECTOR: &str = ".navbar-collapse, #navbarNav";
const LINK_SELECTOR: &str = ".nav-link, .c-nav__link";
const OPEN_CLASS: &str = "show";
const NO_SCROLL_CLASS: &str = "u-no-scroll";
const OPEN_HEIGHT: &str = "calc(100vh - var(--nav-h) - var(--space-md) * 2)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuEvent {
    ToggleClick,
    OutsideClick,
    Escape,
    LinkClick,
    Resize { width: f64 },
}

impl MenuState {
    pub fn next(self, event: MenuEvent, breakpoint: f64) -> MenuState {
        match (self, event) {
            (MenuState::Closed, MenuEvent::ToggleClick) => MenuState::Open,
            (MenuState::Open, MenuEvent::ToggleClick) => MenuState::Closed,
            (MenuState::Open, MenuEvent::Resize { width }) if width < breakpoint => MenuState::Open,
            (MenuState::Open, _) => MenuState::Closed,
            (MenuState::Closed, _) => MenuState::Closed,
        }
    }
}

/// The collapsible menu and its toggle. The open state lives on the menu's class list.
struct Menu<H: Host> {
    host: Rc<H>,
    toggle: H::Node,
    menu: H::Node,
    breakpoint: f64,
}

impl<H: Host> Menu<H> {
    fn state(&self) -> MenuState {
        if self.host.has_class(&self.menu, OPEN_CLASS) {
            MenuState::Open
        } else {
            MenuState::Closed
        }
    }

    fn handle(&self, event: MenuEvent) {
        let current = self.state();
        let next = current.next(event, self.breakpoint);
        if next != current {
            self.render(next);
        }
    }

    fn render(&self, state: MenuState) {
        let host = &self.host;
        let open = state == MenuState::Open;
        if open {
            host.add_class(&self.menu, OPEN_CLASS);
            host.set_style(&self.menu, "height", OPEN_HEIGHT);
        } else {
            host.remove_class(&self.menu, OPEN_CLASS);
            host.set_style(&self.menu, "height", "0");
        }
        host.set_attribute(&self.toggle, "aria-expanded", if open { "true" } else { "false" });
        if let Some(body) = host.body() {
            if open {
                host.add_class(&body, NO_SCROLL_CLASS);
            } else {
                host.remove_class(&body, NO_SCROLL_CLASS);
            }
        }
    }
}

pub fn init<H: Host>(host: &Rc<H>, registry: &InitRegistry, config: &SiteConfig) {
    if !registry.claim(Behavior::NavigationMenu) {
        return;
    }
    let (Some(toggle), Some(menu)) = (host.query(TOGGLE_SELECTOR), host.query(MENU_SELECTOR)) else {
        debug!("No navigation toggle or menu on this page");
        return;
    };

    let links = host.query_within(&menu, LINK_SELECTOR);
    let menu = Rc::new(Menu {
        host: Rc::clone(host),
        toggle: toggle.clone(),
        menu,
        breakpoint: config.nav.breakpoint_px,
    });

    {
        let menu = Rc::clone(&menu);
        host.on(Target::Node(toggle), EventKind::Click, move |e| {
            e.prevent_default();
            menu.handle(MenuEvent::ToggleClick);
        });
    }

    {
        let menu = Rc::clone(&menu);
        host.on(Target::Document, EventKind::KeyDown, move |e| {
            if e.key.as_deref() == Some("Escape") {
                menu.handle(MenuEvent::Escape);
            }
        });
    }

    {
        let menu = Rc::clone(&menu);
        host.on(Target::Document, EventKind::Click, move |e| {
            let Some(target) = e.target.as_ref() else { return };
            let host = &menu.host;
            if !host.contains(&menu.menu, target) && !host.contains(&menu.toggle, target) {
                menu.handle(MenuEvent::OutsideClick);
            }
        });
    }

    let link_count = links.len();
    for link in links {
        let menu = Rc::clone(&menu);
        host.on(Target::Node(link), EventKind::Click, move |_| {
            menu.handle(MenuEvent::LinkClick)
        });
    }

    let mut on_resize = debounce(Rc::clone(host), config.nav.resize_debounce_ms, move || {
        let width = menu.host.inner_width();
        menu.handle(MenuEvent::Resize { width });
    });
    host.on(Target::Window, EventKind::Resize, move |_| on_resize());
    debug!("Navigation menu wired with {link_count} links");
}
