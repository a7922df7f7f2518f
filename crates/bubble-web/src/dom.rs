//! Applies engine surface ops to the page.

use std::collections::HashMap;

use bubble_engine::{Bubble, BubbleId, ElementKey, SurfaceOp};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

struct BubbleView {
    element: ElementKey,
    class: String,
}

pub struct DomSurface {
    document: Document,
    bubbles: HashMap<BubbleId, BubbleView>,
    /// Resolved elements; `None` once an id was found missing.
    elements: HashMap<ElementKey, Option<Element>>,
    toggle_hidden: bool,
}

impl DomSurface {
    pub fn new(document: Document, toggle_hidden: bool) -> Self {
        Self {
            document,
            bubbles: HashMap::new(),
            elements: HashMap::new(),
            toggle_hidden,
        }
    }

    pub fn register_bubble(&mut self, bubble: &Bubble, class: &str) {
        let view = BubbleView {
            element: bubble.element.clone(),
            class: class.to_owned(),
        };
        self.bubbles.insert(bubble.id.clone(), view);
    }

    pub fn apply(&mut self, op: &SurfaceOp) {
        match op {
            SurfaceOp::ShowBubble { bubble, text } => {
                let Some((el, class)) = self.bubble(bubble) else {
                    return;
                };
                if let Some(text) = text {
                    el.set_text_content(Some(text.as_str()));
                }
                if self.toggle_hidden {
                    if let Some(html) = el.dyn_ref::<HtmlElement>() {
                        html.set_hidden(false);
                        // Reflow so the class change transitions from the unhidden state.
                        let _ = html.offset_width();
                    }
                }
                let _ = el.class_list().add_1(&class);
            }
            SurfaceOp::HideBubble { bubble } => {
                let Some((el, class)) = self.bubble(bubble) else {
                    return;
                };
                let _ = el.class_list().remove_1(&class);
                if self.toggle_hidden {
                    set_hidden(&el, true);
                }
            }
            SurfaceOp::AddClass { target, class } => {
                if let Some(el) = self.element(target) {
                    let _ = el.class_list().add_1(class);
                }
            }
            SurfaceOp::RemoveClass { target, class } => {
                if let Some(el) = self.element(target) {
                    let _ = el.class_list().remove_1(class);
                }
            }
            SurfaceOp::RestartClass { target, class } => {
                if let Some(el) = self.element(target) {
                    let _ = el.class_list().remove_1(class);
                    if let Some(html) = el.dyn_ref::<HtmlElement>() {
                        let _ = html.offset_width();
                    }
                    let _ = el.class_list().add_1(class);
                }
            }
            SurfaceOp::SetHidden { target, hidden } => {
                if let Some(el) = self.element(target) {
                    set_hidden(&el, *hidden);
                }
            }
            SurfaceOp::SetExpanded { target, expanded } => {
                if let Some(el) = self.element(target) {
                    let value = if *expanded { "true" } else { "false" };
                    let _ = el.set_attribute("aria-expanded", value);
                }
            }
        }
    }

    fn bubble(&mut self, id: &BubbleId) -> Option<(Element, String)> {
        let Some(view) = self.bubbles.get(id) else {
            log::warn!("dom: bubble `{}` has no view", id);
            return None;
        };
        let (key, class) = (view.element.clone(), view.class.clone());
        self.element(&key).map(|el| (el, class))
    }

    fn element(&mut self, key: &ElementKey) -> Option<Element> {
        let document = &self.document;
        self.elements
            .entry(key.clone())
            .or_insert_with(|| {
                let found = document.get_element_by_id(key.as_str());
                if found.is_none() {
                    log::warn!("dom: no element `#{}`", key);
                }
                found
            })
            .clone()
    }
}

fn set_hidden(el: &Element, hidden: bool) {
    if let Some(html) = el.dyn_ref::<HtmlElement>() {
        html.set_hidden(hidden);
    }
}
