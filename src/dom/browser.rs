//! [`View`] and [`Timers`] over the live document via `web-sys`.
//!
//! Listener and observer closures are leaked on purpose: they stay registered
//! until the page unloads.

use std::ops::ControlFlow;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use log::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Array;
use web_sys::{
    AddEventListenerOptions, Document, Element, Event, EventTarget, HtmlElement, HtmlInputElement,
    HtmlSelectElement, HtmlTextAreaElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, KeyboardEvent, MouseEvent, NodeList, ScrollBehavior,
    ScrollIntoViewOptions, ScrollLogicalPosition, ScrollToOptions, Window,
};

use super::{
    DomEvent, EventKind, Handler, Intersection, IntersectionCallback, ObserverOptions, Target,
    Timers, View,
};

pub struct BrowserHost {
    window: Window,
    document: Document,
}

impl BrowserHost {
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self { window, document })
    }

    pub fn is_loading(&self) -> bool {
        self.document.ready_state() == "loading"
    }

    fn event_target(&self, target: Target<Element>) -> EventTarget {
        match target {
            Target::Window => self.window.clone().into(),
            Target::Document => self.document.clone().into(),
            Target::Node(el) => el.into(),
        }
    }
}

fn html(node: &Element) -> Option<&HtmlElement> {
    node.dyn_ref::<HtmlElement>()
}

fn elements(list: Result<NodeList, JsValue>) -> Vec<Element> {
    let Ok(list) = list else { return Vec::new() };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn to_dom_event(event: &Event) -> DomEvent<Element> {
    let target = event.target().and_then(|t| t.dyn_into::<Element>().ok());
    let mut dom_event = DomEvent::new(target);
    if let Some(keyboard) = event.dyn_ref::<KeyboardEvent>() {
        dom_event = dom_event.with_key(keyboard.key());
    }
    if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
        dom_event = dom_event.with_offset(f64::from(mouse.offset_x()), f64::from(mouse.offset_y()));
    }
    dom_event
}

impl View for BrowserHost {
    type Node = Element;

    fn query(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn query_all(&self, selector: &str) -> Vec<Element> {
        elements(self.document.query_selector_all(selector))
    }

    fn query_within(&self, scope: &Element, selector: &str) -> Vec<Element> {
        elements(scope.query_selector_all(selector))
    }

    fn by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn head(&self) -> Option<Element> {
        self.query("head")
    }

    fn parent(&self, node: &Element) -> Option<Element> {
        node.parent_element()
    }

    fn contains(&self, ancestor: &Element, node: &Element) -> bool {
        ancestor.contains(Some(&**node))
    }

    fn closest(&self, node: &Element, selector: &str) -> Option<Element> {
        node.closest(selector).ok().flatten()
    }

    fn create_element(&self, tag: &str) -> Option<Element> {
        self.document.create_element(tag).ok()
    }

    fn append_child(&self, parent: &Element, child: &Element) {
        let _ = parent.append_child(child);
    }

    fn remove(&self, node: &Element) {
        node.remove();
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn add_class(&self, node: &Element, class: &str) {
        let _ = node.class_list().add_1(class);
    }

    fn remove_class(&self, node: &Element, class: &str) {
        let _ = node.class_list().remove_1(class);
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&self, node: &Element, name: &str, value: &str) {
        let _ = node.set_attribute(name, value);
    }

    fn remove_attribute(&self, node: &Element, name: &str) {
        let _ = node.remove_attribute(name);
    }

    fn has_attribute(&self, node: &Element, name: &str) -> bool {
        node.has_attribute(name)
    }

    fn style(&self, node: &Element, property: &str) -> Option<String> {
        html(node)
            .and_then(|el| el.style().get_property_value(property).ok())
            .filter(|value| !value.is_empty())
    }

    fn set_style(&self, node: &Element, property: &str, value: &str) {
        if let Some(el) = html(node) {
            let _ = el.style().set_property(property, value);
        }
    }

    fn text(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn set_text(&self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn set_inner_html(&self, node: &Element, markup: &str) {
        node.set_inner_html(markup);
    }

    fn field_value(&self, node: &Element) -> String {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(textarea) = node.dyn_ref::<HtmlTextAreaElement>() {
            textarea.value()
        } else if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
            select.value()
        } else {
            String::new()
        }
    }

    fn is_checked(&self, node: &Element) -> bool {
        node.dyn_ref::<HtmlInputElement>()
            .map_or(false, |input| input.checked())
    }

    fn focus(&self, node: &Element) {
        if let Some(el) = html(node) {
            let _ = el.focus();
        }
    }

    fn scroll_into_view(&self, node: &Element) {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Center);
        node.scroll_into_view_with_scroll_into_view_options(&options);
    }

    fn offset_height(&self, node: &Element) -> f64 {
        html(node).map_or(0.0, |el| f64::from(el.offset_height()))
    }

    fn viewport_top(&self, node: &Element) -> f64 {
        node.get_bounding_client_rect().top()
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn inner_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|width| width.as_f64())
            .unwrap_or(0.0)
    }

    fn scroll_to(&self, top: f64) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn navigate(&self, url: &str) {
        if let Err(err) = self.window.location().set_href(url) {
            warn!("Navigation to {url} failed: {err:?}");
        }
    }

    fn listen(&self, target: Target<Element>, kind: EventKind, mut handler: Handler<Element>) {
        let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let dom_event = to_dom_event(&event);
            handler(&dom_event);
            if dom_event.default_prevented() {
                event.prevent_default();
            }
            if dom_event.propagation_stopped() {
                event.stop_propagation();
            }
        });
        let options = AddEventListenerOptions::new();
        options.set_passive(kind.is_passive());
        let result = self
            .event_target(target)
            .add_event_listener_with_callback_and_add_event_listener_options(
                kind.name(),
                callback.as_ref().unchecked_ref(),
                &options,
            );
        if let Err(err) = result {
            warn!("Could not listen for {}: {err:?}", kind.name());
        }
        callback.forget();
    }

    fn observe(
        &self,
        targets: &[Element],
        options: &ObserverOptions,
        mut callback: IntersectionCallback<Element>,
    ) {
        let js_callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, _observer: IntersectionObserver| {
                let batch: Vec<Intersection<Element>> = entries
                    .iter()
                    .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                    .map(|entry| Intersection {
                        target: entry.target(),
                        is_intersecting: entry.is_intersecting(),
                        ratio: entry.intersection_ratio(),
                    })
                    .collect();
                callback(&batch);
            },
        );
        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(&options.root_margin);
        match IntersectionObserver::new_with_options(js_callback.as_ref().unchecked_ref(), &init) {
            Ok(observer) => {
                for target in targets {
                    observer.observe(target);
                }
            }
            Err(err) => warn!("IntersectionObserver unavailable: {err:?}"),
        }
        js_callback.forget();
    }
}

impl Timers for BrowserHost {
    fn set_timeout(&self, millis: u32, callback: Box<dyn FnOnce()>) {
        Timeout::new(millis, callback).forget();
    }

    fn set_interval(&self, millis: u32, callback: Box<dyn FnMut() -> ControlFlow<()>>) {
        schedule_tick(millis, callback);
    }
}

/// Chains one-shot timeouts so a tick can stop the sequence from inside its own callback.
fn schedule_tick(millis: u32, mut callback: Box<dyn FnMut() -> ControlFlow<()>>) {
    Timeout::new(millis, move || {
        if callback().is_continue() {
            schedule_tick(millis, callback);
        }
    })
    .forget();
}

/// Wires every behavior against the live document once it is parsed.
pub fn start() {
    let Some(host) = BrowserHost::new() else {
        warn!("No window or document; site behaviors not started");
        return;
    };
    let loading = host.is_loading();
    crate::start_with(&Rc::new(host), loading);
}
