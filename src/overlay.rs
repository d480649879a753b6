use parallax_core::{NormalizedOffset, OffsetConsumer};
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::constants::{
    HINT_OVERLAY_ID, LAYER_CLASS, LAYER_DEPTH_DEFAULT, OVERLAY_ID, PERMISSION_PROMPT_ID, STATUS_ID,
};
use crate::{dom, input};

#[inline]
pub fn show(document: &web::Document, id: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        let cl = el.class_list();
        _ = cl.remove_1("hidden");
        // fallback for environments without CSS class
        _ = el.set_attribute("style", "");
    }
}

#[inline]
pub fn hide(document: &web::Document, id: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        let cl = el.class_list();
        _ = cl.add_1("hidden");
        // fallback
        _ = el.set_attribute("style", "display:none");
    }
}

#[inline]
pub fn is_hidden(document: &web::Document, id: &str) -> bool {
    if let Some(el) = document.get_element_by_id(id) {
        if el.class_list().contains("hidden") {
            return true;
        }
        return el
            .get_attribute("style")
            .map(|s| s.contains("display:none"))
            .unwrap_or(false);
    }
    false
}

#[inline]
pub fn toggle_hint(document: &web::Document) {
    if is_hidden(document, HINT_OVERLAY_ID) {
        show(document, HINT_OVERLAY_ID);
    } else {
        hide(document, HINT_OVERLAY_ID);
    }
}

pub fn show_permission_prompt(document: &web::Document) {
    show(document, PERMISSION_PROMPT_ID);
}

pub fn hide_permission_prompt(document: &web::Document) {
    hide(document, PERMISSION_PROMPT_ID);
}

/// Update the status line with the currently active source
pub fn set_status(document: &web::Document, source: parallax_core::Source) {
    if let Some(el) = document.get_element_by_id(STATUS_ID) {
        el.set_text_content(Some(input::source_label(source)));
    }
}

/// Overlay UI consumer: shifts the overlay a few pixels with the viewer.
/// The broadcaster's shaping already carries the pixel gain.
pub struct OverlayShift {
    element: web::HtmlElement,
}

impl OverlayShift {
    pub fn find(document: &web::Document) -> Option<Self> {
        dom::html_element(document, OVERLAY_ID).map(|element| Self { element })
    }
}

impl OffsetConsumer for OverlayShift {
    fn set_target_offset(&mut self, offset: NormalizedOffset) {
        _ = self
            .element
            .style()
            .set_property("transform", &input::overlay_transform(offset.x, offset.y));
    }
}

/// Parallax layer consumer: rotates every `.parallax-layer` by the shared
/// offset times its own `data-depth`.
pub struct ParallaxLayers {
    layers: Vec<(web::HtmlElement, f32)>,
}

impl ParallaxLayers {
    pub fn find(document: &web::Document) -> Option<Self> {
        let list = document.get_elements_by_class_name(LAYER_CLASS);
        let layers: Vec<(web::HtmlElement, f32)> = (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|el| {
                let depth = input::parse_depth(el.get_attribute("data-depth").as_deref(), LAYER_DEPTH_DEFAULT);
                el.dyn_into::<web::HtmlElement>().ok().map(|h| (h, depth))
            })
            .collect();
        if layers.is_empty() {
            None
        } else {
            Some(Self { layers })
        }
    }
}

impl OffsetConsumer for ParallaxLayers {
    fn set_target_offset(&mut self, offset: NormalizedOffset) {
        for (el, depth) in &self.layers {
            _ = el
                .style()
                .set_property("transform", &input::layer_transform(offset.x, offset.y, *depth));
        }
    }
}
