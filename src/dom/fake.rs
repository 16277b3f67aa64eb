//! In-memory document with a virtual clock, used by the unit tests.
//!
//! Supports compound selectors (`tag`, `.class`, `#id`, `[attr]`, `[attr="v"]`,
//! `[attr^="v"]`, `[attr*="v"]`), descendant combinators and selector lists.

use std::cell::{Cell, RefCell};
use std::ops::ControlFlow;
use std::rc::Rc;

use super::{
    DomEvent, EventKind, Handler, Intersection, IntersectionCallback, ObserverOptions, Target,
    Timers, View,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Default)]
struct Node {
    tag: String,
    attrs: Vec<(String, String)>,
    classes: Vec<String>,
    styles: Vec<(String, String)>,
    text: String,
    inner_html: Option<String>,
    value: String,
    checked: bool,
    offset_height: f64,
    viewport_top: f64,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

struct Listener {
    target: Target<NodeId>,
    kind: EventKind,
    handler: Rc<RefCell<Handler<NodeId>>>,
}

struct Observer {
    targets: Vec<NodeId>,
    options: ObserverOptions,
    callback: Rc<RefCell<IntersectionCallback<NodeId>>>,
}

enum Task {
    Once(Box<dyn FnOnce()>),
    Every(u32, Box<dyn FnMut() -> ControlFlow<()>>),
}

struct Pending {
    due: u64,
    seq: u64,
    task: Task,
}

pub struct FakeDom {
    nodes: RefCell<Vec<Node>>,
    listeners: RefCell<Vec<Listener>>,
    observers: RefCell<Vec<Observer>>,
    timers: RefCell<Vec<Pending>>,
    now: Cell<u64>,
    seq: Cell<u64>,
    scroll_y: Cell<f64>,
    inner_width: Cell<f64>,
    scrolls: RefCell<Vec<f64>>,
    scrolled_into_view: RefCell<Vec<NodeId>>,
    focused: Cell<Option<NodeId>>,
    navigated: RefCell<Option<String>>,
}

const HTML: NodeId = NodeId(0);
const HEAD: NodeId = NodeId(1);
const BODY: NodeId = NodeId(2);

impl FakeDom {
    pub fn new() -> Rc<Self> {
        let dom = FakeDom {
            nodes: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            observers: RefCell::new(Vec::new()),
            timers: RefCell::new(Vec::new()),
            now: Cell::new(0),
            seq: Cell::new(0),
            scroll_y: Cell::new(0.0),
            inner_width: Cell::new(1280.0),
            scrolls: RefCell::new(Vec::new()),
            scrolled_into_view: RefCell::new(Vec::new()),
            focused: Cell::new(None),
            navigated: RefCell::new(None),
        };
        let html = dom.detached("html");
        let head = dom.detached("head");
        let body = dom.detached("body");
        dom.attach(html, head);
        dom.attach(html, body);
        Rc::new(dom)
    }

    pub fn body_id(&self) -> NodeId {
        BODY
    }

    pub fn head_id(&self) -> NodeId {
        HEAD
    }

    /// Appends a new element under `parent`. `class`, `value` and `checked`
    /// attributes seed the corresponding element state.
    pub fn add(&self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let id = self.detached(tag);
        for (name, value) in attrs {
            match *name {
                "value" => self.node_mut(id, |n| n.value = value.to_string()),
                "checked" => self.node_mut(id, |n| n.checked = true),
                _ => {}
            }
            self.set_attribute(&id, name, value);
        }
        self.attach(parent, id);
        id
    }

    fn detached(&self, tag: &str) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(Node {
            tag: tag.to_ascii_lowercase(),
            ..Node::default()
        });
        NodeId(nodes.len() - 1)
    }

    fn attach(&self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let mut nodes = self.nodes.borrow_mut();
        nodes[child.0].parent = Some(parent);
        nodes[parent.0].children.push(child);
    }

    fn detach(&self, child: NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        if let Some(parent) = nodes[child.0].parent.take() {
            nodes[parent.0].children.retain(|c| *c != child);
        }
    }

    fn node<R>(&self, id: NodeId, f: impl FnOnce(&Node) -> R) -> R {
        f(&self.nodes.borrow()[id.0])
    }

    fn node_mut<R>(&self, id: NodeId, f: impl FnOnce(&mut Node) -> R) -> R {
        f(&mut self.nodes.borrow_mut()[id.0])
    }

    pub fn set_offset_height(&self, id: NodeId, height: f64) {
        self.node_mut(id, |n| n.offset_height = height);
    }

    pub fn set_viewport_top(&self, id: NodeId, top: f64) {
        self.node_mut(id, |n| n.viewport_top = top);
    }

    pub fn set_value(&self, id: NodeId, value: &str) {
        self.node_mut(id, |n| n.value = value.to_string());
    }

    pub fn set_checked(&self, id: NodeId, checked: bool) {
        self.node_mut(id, |n| n.checked = checked);
    }

    pub fn inner_html(&self, id: NodeId) -> Option<String> {
        self.node(id, |n| n.inner_html.clone())
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        id == HTML || self.ancestors(id).contains(&HTML)
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id, |n| n.children.clone())
    }

    fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.node(id, |n| n.parent);
        while let Some(parent) = current {
            out.push(parent);
            current = self.node(parent, |n| n.parent);
        }
        out
    }

    fn descendants(&self, scope: NodeId, out: &mut Vec<NodeId>) {
        for child in self.children(scope) {
            out.push(child);
            self.descendants(child, out);
        }
    }

    fn document_order(&self) -> Vec<NodeId> {
        let mut out = vec![HTML];
        self.descendants(HTML, &mut out);
        out
    }

    fn matches(&self, id: NodeId, selector: &str) -> bool {
        split_top_level(selector, ',')
            .iter()
            .any(|complex| self.matches_complex(id, complex))
    }

    fn matches_complex(&self, id: NodeId, complex: &str) -> bool {
        let compounds = split_top_level(complex, ' ');
        let Some((last, rest)) = compounds.split_last() else {
            return false;
        };
        if !self.matches_compound(id, last) {
            return false;
        }
        let mut ancestors = self.ancestors(id).into_iter();
        rest.iter()
            .rev()
            .all(|compound| ancestors.any(|a| self.matches_compound(a, compound)))
    }

    fn matches_compound(&self, id: NodeId, compound: &str) -> bool {
        parse_compound(compound).iter().all(|part| match part {
            Part::Tag(tag) => tag == "*" || self.node(id, |n| n.tag == *tag),
            Part::Class(class) => self.has_class(&id, class),
            Part::Id(value) => self.attribute(&id, "id").as_deref() == Some(value.as_str()),
            Part::Attr(name, op, value) => match self.attribute(&id, name) {
                None => false,
                Some(actual) => match op {
                    AttrOp::Exists => true,
                    AttrOp::Equals => actual == *value,
                    AttrOp::Prefix => actual.starts_with(value.as_str()),
                    AttrOp::Contains => actual.contains(value.as_str()),
                },
            },
        })
    }

    fn dispatch(&self, path: &[Target<NodeId>], kind: EventKind, event: &DomEvent<NodeId>) {
        for target in path {
            let handlers: Vec<_> = self
                .listeners
                .borrow()
                .iter()
                .filter(|l| l.kind == kind && l.target == *target)
                .map(|l| Rc::clone(&l.handler))
                .collect();
            for handler in handlers {
                (&mut *handler.borrow_mut())(event);
            }
            if event.propagation_stopped() {
                break;
            }
        }
    }

    fn bubble_path(&self, id: NodeId) -> Vec<Target<NodeId>> {
        let mut path = vec![Target::Node(id)];
        path.extend(self.ancestors(id).into_iter().map(Target::Node));
        path.push(Target::Document);
        path
    }

    pub fn click(&self, id: NodeId) -> DomEvent<NodeId> {
        let event = DomEvent::new(Some(id));
        self.dispatch(&self.bubble_path(id), EventKind::Click, &event);
        event
    }

    pub fn key_down(&self, key: &str) -> DomEvent<NodeId> {
        let event = DomEvent::new(Some(BODY)).with_key(key);
        self.dispatch(&self.bubble_path(BODY), EventKind::KeyDown, &event);
        event
    }

    pub fn mouse_enter(&self, id: NodeId) {
        let event = DomEvent::new(Some(id));
        self.dispatch(&[Target::Node(id)], EventKind::MouseEnter, &event);
    }

    pub fn mouse_leave(&self, id: NodeId) {
        let event = DomEvent::new(Some(id));
        self.dispatch(&[Target::Node(id)], EventKind::MouseLeave, &event);
    }

    pub fn mouse_down(&self, id: NodeId, x: f64, y: f64) {
        let event = DomEvent::new(Some(id)).with_offset(x, y);
        self.dispatch(&self.bubble_path(id), EventKind::MouseDown, &event);
    }

    pub fn blur(&self, id: NodeId) {
        let event = DomEvent::new(Some(id));
        self.dispatch(&[Target::Node(id)], EventKind::Blur, &event);
    }

    /// Replaces the control's value and fires `input`.
    pub fn type_into(&self, id: NodeId, value: &str) {
        self.set_value(id, value);
        let event = DomEvent::new(Some(id));
        self.dispatch(&self.bubble_path(id), EventKind::Input, &event);
    }

    pub fn submit(&self, form: NodeId) -> DomEvent<NodeId> {
        let event = DomEvent::new(Some(form));
        self.dispatch(&self.bubble_path(form), EventKind::Submit, &event);
        event
    }

    pub fn resize(&self, width: f64) {
        self.inner_width.set(width);
        let event = DomEvent::new(None);
        self.dispatch(&[Target::Window], EventKind::Resize, &event);
    }

    /// Moves the viewport as a user scroll would and fires `scroll`.
    pub fn user_scroll(&self, y: f64) {
        self.scroll_y.set(y);
        let event = DomEvent::new(None);
        self.dispatch(&[Target::Window], EventKind::Scroll, &event);
    }

    pub fn dom_content_loaded(&self) {
        let event = DomEvent::new(None);
        self.dispatch(&[Target::Document], EventKind::DomContentLoaded, &event);
    }

    /// Reports `ratio` of `id` as visible to every observer watching it,
    /// whatever the observer's threshold.
    pub fn intersect(&self, id: NodeId, ratio: f64) {
        let callbacks: Vec<_> = self
            .observers
            .borrow()
            .iter()
            .filter(|o| o.targets.contains(&id))
            .map(|o| Rc::clone(&o.callback))
            .collect();
        let entry = Intersection {
            target: id,
            is_intersecting: ratio > 0.0,
            ratio,
        };
        for callback in callbacks {
            (&mut *callback.borrow_mut())(std::slice::from_ref(&entry));
        }
    }

    /// Runs every timer due within the next `millis`, in due order.
    pub fn advance(&self, millis: u64) {
        let end = self.now.get() + millis;
        loop {
            let next = {
                let mut timers = self.timers.borrow_mut();
                let index = timers
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.due <= end)
                    .min_by_key(|(_, p)| (p.due, p.seq))
                    .map(|(i, _)| i);
                index.map(|i| timers.remove(i))
            };
            let Some(pending) = next else { break };
            self.now.set(pending.due);
            match pending.task {
                Task::Once(callback) => callback(),
                Task::Every(millis, mut callback) => {
                    if callback().is_continue() {
                        self.schedule(millis, Task::Every(millis, callback));
                    }
                }
            }
        }
        self.now.set(end);
    }

    fn schedule(&self, millis: u32, task: Task) {
        let seq = self.seq.get() + 1;
        self.seq.set(seq);
        let due = self.now.get() + u64::from(millis.max(1));
        self.timers.borrow_mut().push(Pending { due, seq, task });
    }

    pub fn now(&self) -> u64 {
        self.now.get()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    pub fn observer_options(&self) -> Vec<ObserverOptions> {
        self.observers.borrow().iter().map(|o| o.options.clone()).collect()
    }

    pub fn scrolls(&self) -> Vec<f64> {
        self.scrolls.borrow().clone()
    }

    pub fn scrolled_into_view(&self) -> Vec<NodeId> {
        self.scrolled_into_view.borrow().clone()
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused.get()
    }

    pub fn navigated(&self) -> Option<String> {
        self.navigated.borrow().clone()
    }
}

impl View for FakeDom {
    type Node = NodeId;

    fn query(&self, selector: &str) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        self.document_order()
            .into_iter()
            .filter(|id| self.matches(*id, selector))
            .collect()
    }

    fn query_within(&self, scope: &NodeId, selector: &str) -> Vec<NodeId> {
        let mut all = Vec::new();
        self.descendants(*scope, &mut all);
        all.into_iter().filter(|id| self.matches(*id, selector)).collect()
    }

    fn by_id(&self, id: &str) -> Option<NodeId> {
        self.document_order()
            .into_iter()
            .find(|n| self.attribute(n, "id").as_deref() == Some(id))
    }

    fn body(&self) -> Option<NodeId> {
        Some(BODY)
    }

    fn head(&self) -> Option<NodeId> {
        Some(HEAD)
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.node(*node, |n| n.parent)
    }

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        node == ancestor || self.ancestors(*node).contains(ancestor)
    }

    fn closest(&self, node: &NodeId, selector: &str) -> Option<NodeId> {
        std::iter::once(*node)
            .chain(self.ancestors(*node))
            .find(|id| self.matches(*id, selector))
    }

    fn create_element(&self, tag: &str) -> Option<NodeId> {
        Some(self.detached(tag))
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) {
        self.attach(*parent, *child);
    }

    fn remove(&self, node: &NodeId) {
        self.detach(*node);
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.node(*node, |n| n.classes.iter().any(|c| c == class))
    }

    fn add_class(&self, node: &NodeId, class: &str) {
        self.node_mut(*node, |n| {
            if !n.classes.iter().any(|c| c == class) {
                n.classes.push(class.to_string());
            }
        });
    }

    fn remove_class(&self, node: &NodeId, class: &str) {
        self.node_mut(*node, |n| n.classes.retain(|c| c != class));
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.node(*node, |n| {
            if name == "class" {
                return (!n.classes.is_empty()).then(|| n.classes.join(" "));
            }
            n.attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        })
    }

    fn set_attribute(&self, node: &NodeId, name: &str, value: &str) {
        self.node_mut(*node, |n| {
            if name == "class" {
                n.classes = value.split_whitespace().map(str::to_string).collect();
                return;
            }
            match n.attrs.iter_mut().find(|(k, _)| k == name) {
                Some(entry) => entry.1 = value.to_string(),
                None => n.attrs.push((name.to_string(), value.to_string())),
            }
        });
    }

    fn remove_attribute(&self, node: &NodeId, name: &str) {
        self.node_mut(*node, |n| {
            if name == "class" {
                n.classes.clear();
            }
            n.attrs.retain(|(k, _)| k != name);
        });
    }

    fn style(&self, node: &NodeId, property: &str) -> Option<String> {
        self.node(*node, |n| {
            n.styles
                .iter()
                .find(|(k, _)| k == property)
                .map(|(_, v)| v.clone())
        })
    }

    fn set_style(&self, node: &NodeId, property: &str, value: &str) {
        self.node_mut(*node, |n| match n.styles.iter_mut().find(|(k, _)| k == property) {
            Some(entry) => entry.1 = value.to_string(),
            None => n.styles.push((property.to_string(), value.to_string())),
        });
    }

    fn text(&self, node: &NodeId) -> String {
        let mut text = self.node(*node, |n| n.text.clone());
        for child in self.children(*node) {
            text.push_str(&self.text(&child));
        }
        text
    }

    fn set_text(&self, node: &NodeId, text: &str) {
        for child in self.children(*node) {
            self.detach(child);
        }
        self.node_mut(*node, |n| {
            n.text = text.to_string();
            n.inner_html = None;
        });
    }

    fn set_inner_html(&self, node: &NodeId, html: &str) {
        for child in self.children(*node) {
            self.detach(child);
        }
        self.node_mut(*node, |n| {
            n.text.clear();
            n.inner_html = Some(html.to_string());
        });
    }

    fn field_value(&self, node: &NodeId) -> String {
        self.node(*node, |n| match n.tag.as_str() {
            "input" | "textarea" | "select" => {
                if n.value.is_empty() && n.attrs.iter().any(|(k, v)| k == "type" && v == "checkbox") {
                    "on".to_string()
                } else {
                    n.value.clone()
                }
            }
            _ => String::new(),
        })
    }

    fn is_checked(&self, node: &NodeId) -> bool {
        self.node(*node, |n| n.checked)
    }

    fn focus(&self, node: &NodeId) {
        self.focused.set(Some(*node));
    }

    fn scroll_into_view(&self, node: &NodeId) {
        self.scrolled_into_view.borrow_mut().push(*node);
    }

    fn offset_height(&self, node: &NodeId) -> f64 {
        self.node(*node, |n| n.offset_height)
    }

    fn viewport_top(&self, node: &NodeId) -> f64 {
        self.node(*node, |n| n.viewport_top)
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y.get()
    }

    fn inner_width(&self) -> f64 {
        self.inner_width.get()
    }

    fn scroll_to(&self, top: f64) {
        self.scrolls.borrow_mut().push(top);
        self.scroll_y.set(top);
    }

    fn navigate(&self, url: &str) {
        *self.navigated.borrow_mut() = Some(url.to_string());
    }

    fn listen(&self, target: Target<NodeId>, kind: EventKind, handler: Handler<NodeId>) {
        self.listeners.borrow_mut().push(Listener {
            target,
            kind,
            handler: Rc::new(RefCell::new(handler)),
        });
    }

    fn observe(
        &self,
        targets: &[NodeId],
        options: &ObserverOptions,
        callback: IntersectionCallback<NodeId>,
    ) {
        self.observers.borrow_mut().push(Observer {
            targets: targets.to_vec(),
            options: options.clone(),
            callback: Rc::new(RefCell::new(callback)),
        });
    }
}

impl Timers for FakeDom {
    fn set_timeout(&self, millis: u32, callback: Box<dyn FnOnce()>) {
        self.schedule(millis, Task::Once(callback));
    }

    fn set_interval(&self, millis: u32, callback: Box<dyn FnMut() -> ControlFlow<()>>) {
        self.schedule(millis, Task::Every(millis, callback));
    }
}

enum AttrOp {
    Exists,
    Equals,
    Prefix,
    Contains,
}

enum Part {
    Tag(String),
    Class(String),
    Id(String),
    Attr(String, AttrOp, String),
}

/// Splits on `sep` outside of `[...]` and quotes, dropping empty pieces.
fn split_top_level(input: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for c in input.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, c) if c == sep && depth == 0 => {
                if !current.trim().is_empty() {
                    parts.push(current.trim().to_string());
                }
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

fn parse_compound(compound: &str) -> Vec<Part> {
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';
    let chars: Vec<char> = compound.chars().collect();
    let mut parts = Vec::new();
    let mut i = 0;
    let take_ident = |i: &mut usize| {
        let start = *i;
        while *i < chars.len() && is_ident(chars[*i]) {
            *i += 1;
        }
        chars[start..*i].iter().collect::<String>()
    };
    while i < chars.len() {
        match chars[i] {
            '.' => {
                i += 1;
                parts.push(Part::Class(take_ident(&mut i)));
            }
            '#' => {
                i += 1;
                parts.push(Part::Id(take_ident(&mut i)));
            }
            '[' => {
                let end = chars[i..].iter().position(|c| *c == ']').map_or(chars.len(), |p| i + p);
                let body: String = chars[i + 1..end].iter().collect();
                parts.push(parse_attr(&body));
                i = end + 1;
            }
            '*' => {
                parts.push(Part::Tag("*".to_string()));
                i += 1;
            }
            _ => {
                let tag = take_ident(&mut i);
                if tag.is_empty() {
                    i += 1;
                } else {
                    parts.push(Part::Tag(tag.to_ascii_lowercase()));
                }
            }
        }
    }
    parts
}

fn parse_attr(body: &str) -> Part {
    let unquote = |v: &str| v.trim().trim_matches(|c| c == '"' || c == '\'').to_string();
    if let Some((name, value)) = body.split_once("^=") {
        Part::Attr(name.trim().to_string(), AttrOp::Prefix, unquote(value))
    } else if let Some((name, value)) = body.split_once("*=") {
        Part::Attr(name.trim().to_string(), AttrOp::Contains, unquote(value))
    } else if let Some((name, value)) = body.split_once('=') {
        Part::Attr(name.trim().to_string(), AttrOp::Equals, unquote(value))
    } else {
        Part::Attr(body.trim().to_string(), AttrOp::Exists, String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn selector_lists_match_in_document_order() {
        let dom = FakeDom::new();
        let nav = dom.add(dom.body_id(), "nav", &[("id", "navbarNav")]);
        let first = dom.add(nav, "a", &[("class", "c-nav__link"), ("href", "#top")]);
        let second = dom.add(nav, "a", &[("class", "nav-link"), ("href", "/about")]);

        assert_eq!(dom.query_all(".nav-link, .c-nav__link"), vec![first, second]);
        assert_eq!(dom.query_all(".nav-link[href^=\"#\"], .c-nav__link[href^=\"#\"]"), vec![first]);
        assert_eq!(dom.query("#navbarNav a[href=\"/about\"]"), Some(second));
        assert_eq!(dom.closest(&first, "nav"), Some(nav));
    }

    #[test]
    fn timers_fire_in_due_order() {
        let dom = FakeDom::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for (delay, label) in [(30, "c"), (10, "a"), (20, "b")] {
            let log = Rc::clone(&log);
            dom.set_timeout(delay, Box::new(move || log.borrow_mut().push(label)));
        }
        dom.advance(25);
        assert_eq!(dom.now(), 25);
        assert_eq!(*log.borrow(), vec!["a", "b"]);
        dom.advance(5);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert_eq!(dom.pending_timers(), 0);
    }

    #[test]
    fn removed_nodes_leave_queries() {
        let dom = FakeDom::new();
        let span = dom.add(dom.body_id(), "span", &[("class", "ripple")]);
        dom.remove(&span);
        assert!(dom.query(".ripple").is_none());
        assert!(!dom.is_attached(span));
    }
}
