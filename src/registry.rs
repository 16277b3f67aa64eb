use std::cell::RefCell;
use std::collections::BTreeSet;

use log::debug;

/// One entry per independently wired page behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Behavior {
    NavigationMenu,
    ScrollReveal,
    MediaAttributes,
    InteractionEffects,
    FormValidation,
    SmoothScroll,
    ScrollSpy,
    CountUp,
    ScrollToTop,
    Parallax,
    CardHover,
}

impl Behavior {
    pub const ALL: [Behavior; 11] = [
        Behavior::NavigationMenu,
        Behavior::ScrollReveal,
        Behavior::MediaAttributes,
        Behavior::InteractionEffects,
        Behavior::FormValidation,
        Behavior::SmoothScroll,
        Behavior::ScrollSpy,
        Behavior::CountUp,
        Behavior::ScrollToTop,
        Behavior::Parallax,
        Behavior::CardHover,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Behavior::NavigationMenu => "navigation-menu",
            Behavior::ScrollReveal => "scroll-reveal",
            Behavior::MediaAttributes => "media-attributes",
            Behavior::InteractionEffects => "interaction-effects",
            Behavior::FormValidation => "form-validation",
            Behavior::SmoothScroll => "smooth-scroll",
            Behavior::ScrollSpy => "scroll-spy",
            Behavior::CountUp => "count-up",
            Behavior::ScrollToTop => "scroll-to-top",
            Behavior::Parallax => "parallax",
            Behavior::CardHover => "card-hover",
        }
    }
}

/// Tracks which behaviors have already been wired for a page.
///
/// A behavior is flagged before it looks for its markup, so a page missing the
/// markup still counts the behavior as initialized.
#[derive(Debug, Default)]
pub struct InitRegistry {
    wired: RefCell<BTreeSet<Behavior>>,
}

impl InitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true for the first claim of `behavior`, false afterwards.
    pub fn claim(&self, behavior: Behavior) -> bool {
        let first = self.wired.borrow_mut().insert(behavior);
        if !first {
            debug!("{} already initialized, skipping", behavior.name());
        }
        first
    }

    pub fn is_initialized(&self, behavior: Behavior) -> bool {
        self.wired.borrow().contains(&behavior)
    }
}
