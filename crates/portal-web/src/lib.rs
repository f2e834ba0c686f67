pub mod runner;

pub use runner::SimRunner;

use std::cell::RefCell;

use portal_engine::{InputEvent, LevelDesc, PortalKind, SimConfig};
use wasm_bindgen::prelude::*;

thread_local! {
    static RUNNER: RefCell<Option<SimRunner>> = const { RefCell::new(None) };
}

/// Run `f` against the live runner. `None` until `sim_init` succeeds.
fn with_runner<R>(f: impl FnOnce(&mut SimRunner) -> R) -> Option<R> {
    RUNNER.with(|cell| cell.borrow_mut().as_mut().map(f))
}

fn js_error(message: String) -> JsValue {
    js_sys::Error::new(&message).into()
}

/// Load a level and start simulating it. `config_json` may be empty to
/// use the default tuning.
#[wasm_bindgen]
pub fn sim_init(level_json: &str, config_json: &str) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let config = if config_json.trim().is_empty() {
        SimConfig::default()
    } else {
        SimConfig::from_json(config_json).map_err(|e| js_error(e.to_string()))?
    };
    let level = LevelDesc::from_json(level_json).map_err(|e| js_error(e.to_string()))?;
    let name = level.name.clone();
    let runner = SimRunner::new(level, config).map_err(|e| js_error(e.to_string()))?;

    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(runner);
    });
    log::info!("portal-web: level '{}' initialized", name);
    Ok(())
}

#[wasm_bindgen]
pub fn sim_tick(dt: f32) {
    with_runner(|r| r.tick(dt));
}

#[wasm_bindgen]
pub fn sim_key_down(key_code: u32) {
    with_runner(|r| r.push_input(InputEvent::KeyDown { key_code }));
}

#[wasm_bindgen]
pub fn sim_key_up(key_code: u32) {
    with_runner(|r| r.push_input(InputEvent::KeyUp { key_code }));
}

/// Fire a portal (0 = blue, 1 = orange) towards world coordinates (x, y).
#[wasm_bindgen]
pub fn sim_fire_portal(kind: u32, x: f32, y: f32) {
    let Some(kind) = PortalKind::from_wire(kind) else {
        log::warn!("unknown portal kind {}", kind);
        return;
    };
    with_runner(|r| r.push_input(InputEvent::FirePortal { kind, x, y }));
}

#[wasm_bindgen]
pub fn sim_restart() {
    with_runner(|r| r.push_input(InputEvent::Restart));
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn get_snapshot_ptr() -> *const f32 {
    with_runner(|r| r.snapshot_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_snapshot_len() -> u32 {
    with_runner(|r| r.snapshot_len()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_events_ptr() -> *const f32 {
    with_runner(|r| r.events_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_events_len() -> u32 {
    with_runner(|r| r.events_len()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn sim_is_won() -> bool {
    with_runner(|r| r.is_won()).unwrap_or(false)
}

#[wasm_bindgen]
pub fn sim_elapsed() -> f32 {
    with_runner(|r| r.elapsed()).unwrap_or(0.0)
}

#[wasm_bindgen]
pub fn sim_stars() -> u32 {
    with_runner(|r| r.stars()).unwrap_or(0)
}
