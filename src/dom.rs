//! Host abstraction the page behaviors are written against.
//!
//! [`View`] covers document queries, mutations, event listeners and
//! intersection observation; [`Timers`] covers one-shot and repeating timers.
//! The browser implementation lives in [`browser`], an in-memory one for tests
//! in `fake`.

use std::cell::Cell;
use std::ops::ControlFlow;

pub mod browser;
#[cfg(test)]
pub mod fake;

/// Where a listener is attached.
#[derive(Debug, Clone, PartialEq)]
pub enum Target<N> {
    Window,
    Document,
    Node(N),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Click,
    KeyDown,
    Resize,
    Scroll,
    MouseEnter,
    MouseLeave,
    MouseDown,
    Blur,
    Input,
    Submit,
    DomContentLoaded,
}

impl EventKind {
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::KeyDown => "keydown",
            EventKind::Resize => "resize",
            EventKind::Scroll => "scroll",
            EventKind::MouseEnter => "mouseenter",
            EventKind::MouseLeave => "mouseleave",
            EventKind::MouseDown => "mousedown",
            EventKind::Blur => "blur",
            EventKind::Input => "input",
            EventKind::Submit => "submit",
            EventKind::DomContentLoaded => "DOMContentLoaded",
        }
    }

    /// Listeners for these never cancel the default action.
    pub fn is_passive(self) -> bool {
        matches!(self, EventKind::Resize | EventKind::Scroll)
    }
}

/// The parts of a DOM event the behaviors read.
#[derive(Debug)]
pub struct DomEvent<N> {
    pub target: Option<N>,
    pub key: Option<String>,
    /// Pointer position relative to the target's padding edge.
    pub offset: (f64, f64),
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl<N> DomEvent<N> {
    pub fn new(target: Option<N>) -> Self {
        Self {
            target,
            key: None,
            offset: (0.0, 0.0),
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_offset(mut self, x: f64, y: f64) -> Self {
        self.offset = (x, y);
        self
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

pub type Handler<N> = Box<dyn FnMut(&DomEvent<N>)>;

/// Options for an intersection subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverOptions {
    /// Visible fraction of the target that triggers the callback.
    pub threshold: f64,
    /// CSS margin applied to the viewport, e.g. `0px 0px -50px 0px`.
    pub root_margin: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Intersection<N> {
    pub target: N,
    pub is_intersecting: bool,
    pub ratio: f64,
}

impl<N> Intersection<N> {
    /// True when at least `threshold` of the target is inside the root.
    ///
    /// Observers also report crossings below their threshold, including the
    /// initial notification sent right after `observe`.
    pub fn reaches(&self, threshold: f64) -> bool {
        self.is_intersecting && self.ratio >= threshold
    }
}

pub type IntersectionCallback<N> = Box<dyn FnMut(&[Intersection<N>])>;

/// Document access for page behaviors.
///
/// Selectors are plain CSS selectors. Lookups that find nothing return `None` or
/// an empty list; mutations on detached nodes are allowed and have no effect on
/// the rendered page.
pub trait View {
    type Node: Clone + PartialEq + 'static;

    fn query(&self, selector: &str) -> Option<Self::Node>;
    fn query_all(&self, selector: &str) -> Vec<Self::Node>;
    /// Matching descendants of `scope`, in document order.
    fn query_within(&self, scope: &Self::Node, selector: &str) -> Vec<Self::Node>;
    fn by_id(&self, id: &str) -> Option<Self::Node>;
    fn body(&self) -> Option<Self::Node>;
    fn head(&self) -> Option<Self::Node>;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;
    /// True when `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;
    fn closest(&self, node: &Self::Node, selector: &str) -> Option<Self::Node>;
    fn create_element(&self, tag: &str) -> Option<Self::Node>;
    fn append_child(&self, parent: &Self::Node, child: &Self::Node);
    fn remove(&self, node: &Self::Node);

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;
    fn add_class(&self, node: &Self::Node, class: &str);
    fn remove_class(&self, node: &Self::Node, class: &str);

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);
    fn remove_attribute(&self, node: &Self::Node, name: &str);

    fn has_attribute(&self, node: &Self::Node, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    /// Inline style value, `None` when unset.
    fn style(&self, node: &Self::Node, property: &str) -> Option<String>;
    fn set_style(&self, node: &Self::Node, property: &str, value: &str);

    fn text(&self, node: &Self::Node) -> String;
    fn set_text(&self, node: &Self::Node, text: &str);
    fn set_inner_html(&self, node: &Self::Node, html: &str);

    /// Current value of a form control; empty for anything else.
    fn field_value(&self, node: &Self::Node) -> String;
    fn is_checked(&self, node: &Self::Node) -> bool;
    fn focus(&self, node: &Self::Node);
    /// Smoothly scrolls `node` to the vertical center of the viewport.
    fn scroll_into_view(&self, node: &Self::Node);

    fn offset_height(&self, node: &Self::Node) -> f64;
    /// Distance from the viewport top to the node's border box.
    fn viewport_top(&self, node: &Self::Node) -> f64;
    fn scroll_y(&self) -> f64;
    fn inner_width(&self) -> f64;
    /// Smoothly scrolls the window to `top`.
    fn scroll_to(&self, top: f64);
    fn navigate(&self, url: &str);

    fn listen(&self, target: Target<Self::Node>, kind: EventKind, handler: Handler<Self::Node>);
    fn observe(
        &self,
        targets: &[Self::Node],
        options: &ObserverOptions,
        callback: IntersectionCallback<Self::Node>,
    );

    fn on<F>(&self, target: Target<Self::Node>, kind: EventKind, handler: F)
    where
        F: FnMut(&DomEvent<Self::Node>) + 'static,
        Self: Sized,
    {
        self.listen(target, kind, Box::new(handler));
    }

    fn watch<F>(&self, targets: &[Self::Node], options: &ObserverOptions, callback: F)
    where
        F: FnMut(&[Intersection<Self::Node>]) + 'static,
        Self: Sized,
    {
        self.observe(targets, options, Box::new(callback));
    }
}

/// Fire-and-forget timers.
pub trait Timers {
    fn set_timeout(&self, millis: u32, callback: Box<dyn FnOnce()>);
    /// Calls `callback` every `millis` until it returns `ControlFlow::Break`.
    fn set_interval(&self, millis: u32, callback: Box<dyn FnMut() -> ControlFlow<()>>);
}

/// Everything a behavior needs from its environment.
pub trait Host: View + Timers + 'static {}

impl<T: View + Timers + 'static> Host for T {}

pub const HEADER_SELECTOR: &str = ".l-header";

/// Height of the sticky page header, `fallback` when there is none.
pub fn header_height<V: View + ?Sized>(view: &V, fallback: f64) -> f64 {
    view.query(HEADER_SELECTOR)
        .map(|header| view.offset_height(&header))
        .unwrap_or(fallback)
}
