use std::ops::ControlFlow;
use std::rc::Rc;

use log::debug;

use crate::config::SiteConfig;
use crate::dom::{Host, ObserverOptions, View};
use crate::registry::{Behavior, InitRegistry};

const COUNTER_SELECTOR: &str = "[data-count]";
const COUNTED_CLASS: &str = "counted";

/// Parses the leading integer of `raw`, ignoring anything after it.
pub fn parse_target(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let (sign, digits) = match raw.as_bytes().first() {
        Some(b'-') => (-1, &raw[1..]),
        Some(b'+') => (1, &raw[1..]),
        _ => (1, raw),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// A running count towards `target`, advanced one tick at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterState {
    pub target: i64,
    pub current: f64,
    step: f64,
}

impl CounterState {
    pub fn new(target: i64, duration_ms: u32, tick_ms: u32) -> Self {
        let ticks = f64::from(duration_ms) / f64::from(tick_ms.max(1));
        Self {
            target,
            current: 0.0,
            step: target as f64 / ticks,
        }
    }

    /// Advances one tick and returns the text to display, `Break` with the final text.
    pub fn tick(&mut self) -> ControlFlow<String, String> {
        self.current += self.step;
        if self.current >= self.target as f64 {
            ControlFlow::Break(self.target.to_string())
        } else {
            ControlFlow::Continue((self.current.floor() as i64).to_string())
        }
    }
}

pub fn init<H: Host>(host: &Rc<H>, registry: &InitRegistry, config: &SiteConfig) {
    if !registry.claim(Behavior::CountUp) {
        return;
    }
    let counters = host.query_all(COUNTER_SELECTOR);
    if counters.is_empty() {
        debug!("No counters on this page");
        return;
    }

    let options = ObserverOptions {
        threshold: config.counter.threshold,
        root_margin: "0px".to_string(),
    };
    let view = Rc::clone(host);
    let threshold = options.threshold;
    let (duration_ms, tick_ms) = (config.counter.duration_ms, config.counter.tick_ms);
    host.watch(&counters, &options, move |entries| {
        for entry in entries.iter().filter(|e| e.reaches(threshold)) {
            let el = &entry.target;
            if view.has_class(el, COUNTED_CLASS) {
                continue;
            }
            let Some(target) = view.attribute(el, "data-count").and_then(|raw| parse_target(&raw))
            else {
                debug!("Skipping counter without a numeric target");
                continue;
            };
            view.add_class(el, COUNTED_CLASS);

            let mut state = CounterState::new(target, duration_ms, tick_ms);
            let display = Rc::clone(&view);
            let el = el.clone();
            view.set_interval(
                tick_ms,
                Box::new(move || match state.tick() {
                    ControlFlow::Continue(text) => {
                        display.set_text(&el, &text);
                        ControlFlow::Continue(())
                    }
                    ControlFlow::Break(text) => {
                        display.set_text(&el, &text);
                        ControlFlow::Break(())
                    }
                }),
            );
        }
    });
}
