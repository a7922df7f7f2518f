pub mod dom;
pub mod runner;
pub mod storage;
pub mod wiring;

use std::cell::RefCell;

use bubble_engine::{StageConfig, StageInput};
use wasm_bindgen::prelude::*;

pub use runner::StageRunner;

thread_local! {
    static RUNNER: RefCell<Option<StageRunner>> = RefCell::new(None);
}

/// Run `f` against the live runner. Returns `None` before `stage_init`, or if
/// the runner is already borrowed (an event fired while ops were applied).
pub(crate) fn with_runner<R>(f: impl FnOnce(&mut StageRunner) -> R) -> Option<R> {
    RUNNER.with(|cell| {
        let Ok(mut slot) = cell.try_borrow_mut() else {
            log::warn!("stage busy; event dropped");
            return None;
        };
        slot.as_mut().map(f)
    })
}

/// Build the stage from a JSON manifest (or the library page defaults), wire
/// the page and start the frame loop.
#[wasm_bindgen]
pub fn stage_init(manifest: Option<String>) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let debug = wiring::debug_requested();
    let level = if debug { log::Level::Debug } else { log::Level::Info };
    let _ = console_log::init_with_level(level);

    let mut config = match manifest {
        Some(json) => StageConfig::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?,
        None => StageConfig::library(),
    };
    config.debug |= debug;

    let (runner, hotspots) = StageRunner::new(&config)?;
    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(runner);
    });

    wiring::install(&config, &hotspots)?;
    runner::start_frames()?;
    with_runner(|r| r.flush());
    log::info!("bubble-web: stage initialized ({} hotspots wired)", hotspots.len());
    Ok(())
}

#[wasm_bindgen(js_name = ejectForForbiddenScrolls)]
pub fn eject_for_forbidden_scrolls(reason: Option<String>) {
    let input = StageInput::Eject {
        reason: reason.unwrap_or_default(),
        epoch_ms: js_sys::Date::now() as u64,
    };
    with_runner(|r| r.dispatch(input));
}

/// Swear the oath and go to the restricted section.
#[wasm_bindgen]
pub fn enter() -> Result<(), JsValue> {
    let Some(path) = with_runner(|r| r.enter_restricted()) else {
        return Err(JsValue::from_str("stage not initialized"));
    };
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    window.location().set_href(path)
}

#[wasm_bindgen(js_name = stopAllRuns)]
pub fn stop_all_runs() {
    with_runner(|r| r.dispatch(StageInput::StopAll));
}
