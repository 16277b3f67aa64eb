use std::rc::Rc;

use log::debug;

use crate::dom::{Host, View};
use crate::registry::{Behavior, InitRegistry};

const LOGO_CLASS: &str = "c-logo__img";
const FLUID_CLASS: &str = "img-fluid";

/// Adds lazy loading and responsive sizing to the media present right now.
/// Elements inserted later are not touched.
pub fn init<H: Host>(host: &Rc<H>, registry: &InitRegistry) {
    if !registry.claim(Behavior::MediaAttributes) {
        return;
    }
    let images = host.query_all("img");
    for img in &images {
        if !host.has_attribute(img, "loading") && !host.has_class(img, LOGO_CLASS) {
            host.set_attribute(img, "loading", "lazy");
        }
        if !host.has_class(img, FLUID_CLASS) {
            host.add_class(img, FLUID_CLASS);
        }
    }

    let videos = host.query_all("video");
    for video in &videos {
        if !host.has_attribute(video, "loading") {
            host.set_attribute(video, "loading", "lazy");
        }
    }
    debug!("Normalized {} images and {} videos", images.len(), videos.len());
}
