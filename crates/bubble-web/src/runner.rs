use std::cell::RefCell;
use std::rc::Rc;

use bubble_engine::{BubbleDescriptor, HotspotBinding, Stage, StageConfig, StageInput};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Element;

use crate::dom::DomSurface;
use crate::storage::BrowserStorage;
use crate::wiring;

/// A hotspot's binding and the element its gestures come from.
pub type WiredHotspot = (HotspotBinding, Element);

/// Owns the stage and the DOM surface it draws on.
///
/// Lives in the crate's `thread_local!` slot; event listeners and the frame
/// loop reach it through `with_runner`.
pub struct StageRunner {
    stage: Stage,
    surface: DomSurface,
    last_frame: Option<f64>,
}

impl StageRunner {
    /// Build the stage for this page. Returns the runner and the hotspot
    /// elements that need listeners.
    pub fn new(config: &StageConfig) -> Result<(Self, Vec<WiredHotspot>), JsValue> {
        let document = wiring::document()?;
        let mut config = config.clone();
        wiring::disable_missing(&document, &mut config);

        let mut stage = Stage::new(&config, Box::new(BrowserStorage))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let mut surface = DomSurface::new(document.clone(), config.toggle_hidden);
        for descriptor in &config.bubbles {
            register_view(&mut surface, &stage, descriptor, &config.bubble_class);
        }

        let mut hotspots = Vec::new();
        for hotspot in &config.hotspots {
            match document.get_element_by_id(hotspot.id.as_str()) {
                Some(el) => hotspots.push((hotspot.clone(), el)),
                None => log::warn!("hotspot `#{}` not found; disabled", hotspot.id),
            }
        }

        if config.scan_hotspots {
            let scan = wiring::scan(&document, &config);
            for descriptor in scan.bubbles {
                if stage.register_bubble(descriptor.to_bubble()) {
                    register_view(&mut surface, &stage, &descriptor, &config.bubble_class);
                }
            }
            for (binding, el) in scan.hotspots {
                if stage.bind_hotspot(binding.clone()) {
                    hotspots.push((binding, el));
                }
            }
        }

        let runner = Self {
            stage,
            surface,
            last_frame: None,
        };
        Ok((runner, hotspots))
    }

    /// One animation frame: advance virtual time by the real elapsed time.
    pub fn frame(&mut self, timestamp: f64) {
        if let Some(last) = self.last_frame {
            self.stage.advance(timestamp - last);
        }
        self.last_frame = Some(timestamp);
        self.flush();
    }

    pub fn dispatch(&mut self, input: StageInput) {
        self.stage.handle(input);
        self.flush();
    }

    pub fn enter_restricted(&mut self) -> &'static str {
        self.stage.enter_restricted()
    }

    /// Apply every pending surface op to the page.
    pub fn flush(&mut self) {
        for op in self.stage.drain_ops() {
            self.surface.apply(&op);
        }
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }
}

/// Give the surface a view of a registered bubble: the stage's element and
/// the descriptor's show class.
fn register_view(
    surface: &mut DomSurface,
    stage: &Stage,
    descriptor: &BubbleDescriptor,
    default_class: &str,
) {
    let class = descriptor.show_class.as_deref().unwrap_or(default_class);
    match stage.bubbles().get(&descriptor.id) {
        Some(bubble) => surface.register_bubble(bubble, class),
        None => log::warn!("bubble `{}` not registered with the stage", descriptor.id),
    }
}

type FrameCallback = Closure<dyn FnMut(f64)>;

/// Drive `StageRunner::frame` from `requestAnimationFrame` for the life of the page.
pub fn start_frames() -> Result<(), JsValue> {
    let slot: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
    let next = slot.clone();

    *slot.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
        crate::with_runner(|r| r.frame(timestamp));
        if let Some(callback) = next.borrow().as_ref() {
            if let Err(e) = request_frame(callback) {
                log::error!("requestAnimationFrame failed: {:?}", e);
            }
        }
    }) as Box<dyn FnMut(f64)>));

    let first = slot.borrow();
    match first.as_ref() {
        Some(callback) => request_frame(callback).map(|_| ()),
        None => Ok(()),
    }
}

fn request_frame(callback: &FrameCallback) -> Result<i32, JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window"))?
        .request_animation_frame(callback.as_ref().unchecked_ref())
}
