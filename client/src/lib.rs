//! Browser front end for the guided selfie capture flow.
//!
//! Each page calls one `init_*` export once its DOM is in place:
//! `init_intro_screen`, `init_permission_screen` or `init_capture_screen`.

use wasm_bindgen::prelude::*;

pub mod camera;

pub use camera::{BrowserCamera, BrowserStream, SessionStore};

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());

    log::info!("Selfie capture client initialized");
}
