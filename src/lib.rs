//! Spelling Hive client crate.
//!
//! Mounts onto the server-rendered puzzle page: the letter hive, guess bar,
//! score/rank panels, found-words list with definitions, and the new-game
//! word-list picker. Game rules live on the server; this crate composes
//! guesses, talks to the JSON endpoints and renders what comes back.
//!
//! The state, wire and geometry layers are plain Rust and tested natively;
//! only `controller` and the render half of `view` need a browser.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

pub mod api;
pub mod config;
pub mod hive;
pub mod ranks;
pub mod state;
pub mod view;

mod controller;

use config::HiveConfig;
use controller::Controller;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

thread_local! {
    static CONTROLLER: RefCell<Option<Rc<Controller>>> = const { RefCell::new(None) };
}

fn mount(config: HiveConfig) -> Result<(), JsValue> {
    if CONTROLLER.with(|c| c.borrow().is_some()) {
        gloo::console::warn!("Spelling Hive already mounted; ignoring second start.");
        return Ok(());
    }
    let ctl = Controller::mount(config)?;
    CONTROLLER.with(|c| c.replace(Some(ctl)));
    Ok(())
}

/// Mount with default settings. Call once the page's DOM is ready.
#[wasm_bindgen]
pub fn start_hive() -> Result<(), JsValue> {
    mount(HiveConfig::default())
}

/// Mount with a JSON object overriding any `HiveConfig` fields.
#[wasm_bindgen]
pub fn start_hive_with_config(json: &str) -> Result<(), JsValue> {
    let config = HiveConfig::from_json(json).map_err(|e| JsValue::from_str(&format!("invalid hive config: {e}")))?;
    mount(config)
}
