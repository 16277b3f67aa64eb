//! Rate limiting for high-frequency window events.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::dom::Timers;

/// Collapses a burst of calls into one trailing call `wait_ms` after the last.
pub fn debounce<T, F>(timers: Rc<T>, wait_ms: u32, f: F) -> impl FnMut()
where
    T: Timers + ?Sized + 'static,
    F: FnMut() + 'static,
{
    let generation = Rc::new(Cell::new(0u64));
    let f = Rc::new(RefCell::new(f));
    move || {
        let current = generation.get().wrapping_add(1);
        generation.set(current);
        let generation = Rc::clone(&generation);
        let f = Rc::clone(&f);
        timers.set_timeout(
            wait_ms,
            Box::new(move || {
                if generation.get() == current {
                    (&mut *f.borrow_mut())();
                }
            }),
        );
    }
}

/// Runs `f` immediately, then ignores calls until `limit_ms` has passed.
pub fn throttle<T, F>(timers: Rc<T>, limit_ms: u32, mut f: F) -> impl FnMut()
where
    T: Timers + ?Sized + 'static,
    F: FnMut() + 'static,
{
    let busy = Rc::new(Cell::new(false));
    move || {
        if busy.get() {
            return;
        }
        f();
        busy.set(true);
        let busy = Rc::clone(&busy);
        timers.set_timeout(limit_ms, Box::new(move || busy.set(false)));
    }
}
