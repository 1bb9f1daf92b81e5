mod api;
mod app;
mod components;
mod config;
mod data;
mod forms;
mod models;
mod nav;
mod pages;
mod session;
mod state;
mod storage;
mod telemetry;
mod toast;
mod util;
mod vm;

pub use app::App;

use leptos::prelude::*;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();
    telemetry::init(&config::EnvConfig::new().log_level);
    tracing::info!("sleepwell {} starting", env!("CARGO_PKG_VERSION"));
    mount_to_body(App);
}
