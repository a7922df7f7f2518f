//! DOM discovery and event wiring.
//!
//! Listeners translate DOM events into `StageInput`s and hand them to the
//! runner; nothing here decides what a gesture means.

use bubble_engine::{
    Binding, BubbleDescriptor, Gesture, HotspotBinding, HotspotId, StageConfig, StageInput,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, ErrorEvent, Event, EventTarget, KeyboardEvent, PromiseRejectionEvent};

use crate::runner::WiredHotspot;

/// Class toggled on group balloons (`.speech-bubble[data-group]`).
const GROUP_SHOW_CLASS: &str = "visible";

pub fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

/// `?debug=1` in the page URL.
pub fn debug_requested() -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let Ok(search) = window.location().search() else {
        return false;
    };
    web_sys::UrlSearchParams::new_with_str(&search)
        .ok()
        .and_then(|params| params.get("debug"))
        .as_deref()
        == Some("1")
}

/// Drop components whose required elements are missing from the page.
pub fn disable_missing(document: &Document, config: &mut StageConfig) {
    config.prune_missing(|id| document.get_element_by_id(id.as_str()).is_some());
}

/// Bubbles and hotspots declared in markup rather than in the manifest.
#[derive(Default)]
pub struct Scan {
    pub bubbles: Vec<BubbleDescriptor>,
    pub hotspots: Vec<(HotspotBinding, Element)>,
}

/// Discover `.balloon` and `.speech-bubble[data-group]` bubbles and
/// `data-balloon` / `data-group` hotspots inside the stage.
pub fn scan(document: &Document, config: &StageConfig) -> Scan {
    let scope = config
        .stage
        .as_ref()
        .map(|stage| format!("#{} ", stage))
        .unwrap_or_default();
    let mut scan = Scan::default();

    for el in select(document, &format!("{}.balloon", scope)) {
        let id = el.id();
        let Some(name) = id.strip_prefix(config.balloon_prefix.as_str()) else {
            log::debug!("scan: skipping balloon without `{}` id", config.balloon_prefix);
            continue;
        };
        let mut descriptor = BubbleDescriptor::new(name.trim());
        descriptor.element = Some(id.as_str().into());
        scan.bubbles.push(descriptor);
    }

    for el in select(document, &format!("{}.speech-bubble[data-group]", scope)) {
        let id = el.id();
        if id.is_empty() {
            log::warn!("scan: group bubble without an id; skipped");
            continue;
        }
        let mut descriptor = BubbleDescriptor::new(id);
        descriptor.group = el.get_attribute("data-group");
        descriptor.show_class = Some(GROUP_SHOW_CLASS.to_owned());
        scan.bubbles.push(descriptor);
    }

    for (i, el) in select(document, &format!("{}.hotspot", scope)).into_iter().enumerate() {
        let balloon = el.get_attribute("data-balloon");
        let group = el.get_attribute("data-group");
        let Some(binding) = Binding::from_data_attributes(balloon.as_deref(), group.as_deref())
        else {
            continue;
        };
        let id = match el.id() {
            id if id.is_empty() => format!("hotspot-{}", i),
            id => id,
        };
        if config.hotspots.iter().any(|h| h.id.as_str() == id) {
            continue;
        }
        scan.hotspots.push((HotspotBinding::new(HotspotId::from(id), binding), el));
    }

    log::debug!(
        "scan: {} bubbles, {} hotspots",
        scan.bubbles.len(),
        scan.hotspots.len()
    );
    scan
}

/// Attach every listener the stage needs. Listeners live as long as the page.
pub fn install(config: &StageConfig, hotspots: &[WiredHotspot]) -> Result<(), JsValue> {
    for (hotspot, el) in hotspots {
        wire_hotspot(hotspot, el)?;
    }

    let document = document()?;

    // Capture phase, so overlays that stop propagation still count.
    let selectors = config.interactive_selectors.join(",");
    listen(&document, "click", true, move |event| {
        if !inside_any(&event, &selectors) {
            dispatch(StageInput::ClickOutside);
        }
    })?;

    if let Some(waterfall) = &config.waterfall {
        let own: Vec<Element> = waterfall
            .own_elements()
            .filter_map(|key| document.get_element_by_id(key.as_str()))
            .collect();
        listen(&document, "click", false, move |event| {
            let target = event.target().and_then(|t| t.dyn_into::<web_sys::Node>().ok());
            let on_own = own.iter().any(|el| el.contains(target.as_ref()));
            if !on_own {
                dispatch(StageInput::ClickAwayFromWaterfall);
            }
        })?;
    }

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    listen(&window, "error", true, |event| {
        if let Some(e) = event.dyn_ref::<ErrorEvent>() {
            log::error!("{} ({}:{})", e.message(), e.filename(), e.lineno());
        } else if let Some(el) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) {
            log::warn!("resource error: <{}> #{}", el.tag_name().to_lowercase(), el.id());
        }
    })?;
    listen(&window, "unhandledrejection", false, |event| {
        if let Some(e) = event.dyn_ref::<PromiseRejectionEvent>() {
            log::error!("unhandled rejection: {:?}", e.reason());
        }
    })?;
    Ok(())
}

fn wire_hotspot(hotspot: &HotspotBinding, el: &Element) -> Result<(), JsValue> {
    let id = &hotspot.id;
    let plain = [
        ("mouseenter", Gesture::Enter),
        ("mouseleave", Gesture::Leave),
        ("focus", Gesture::Focus),
        ("blur", Gesture::Blur),
    ];
    for (kind, gesture) in plain {
        let id = id.clone();
        listen(el, kind, false, move |_| {
            dispatch(StageInput::hotspot(id.clone(), gesture));
        })?;
    }

    let click_id = id.clone();
    listen(el, "click", false, move |event| {
        event.prevent_default();
        dispatch(StageInput::hotspot(click_id.clone(), Gesture::Click));
    })?;

    let key_id = id.clone();
    listen(el, "keydown", false, move |event| {
        let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) else {
            return;
        };
        if key == "Enter" || key == " " {
            event.prevent_default();
            dispatch(StageInput::hotspot(key_id.clone(), Gesture::Activate));
        }
    })?;

    // Cancelling touchstart suppresses the synthesized mouse events, so
    // only hotspots that route the touch themselves may do it.
    if hotspot.binding.takes_touch() {
        let touch_id = id.clone();
        listen(el, "touchstart", false, move |event| {
            event.prevent_default();
            dispatch(StageInput::hotspot(touch_id.clone(), Gesture::TouchStart));
        })?;
    }
    Ok(())
}

fn dispatch(input: StageInput) {
    crate::with_runner(|r| r.dispatch(input));
}

fn listen(
    target: &EventTarget,
    kind: &str,
    capture: bool,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback_and_bool(
        kind,
        closure.as_ref().unchecked_ref(),
        capture,
    )?;
    closure.forget();
    Ok(())
}

fn inside_any(event: &Event, selectors: &str) -> bool {
    if selectors.is_empty() {
        return false;
    }
    let Some(el) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
        return false;
    };
    matches!(el.closest(selectors), Ok(Some(_)))
}

fn select(document: &Document, selector: &str) -> Vec<Element> {
    let Ok(list) = document.query_selector_all(selector) else {
        log::warn!("scan: bad selector `{}`", selector);
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}
