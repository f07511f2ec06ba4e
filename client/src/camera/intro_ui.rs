use crate::camera::utils::{document, load_config, navigate, on_click};
use glowish_capture::CAPTURE_GUIDELINES;
use wasm_bindgen::prelude::*;

/// Guidelines page: lists the capture tips and offers the camera or the
/// manual upload.
#[wasm_bindgen]
pub fn init_intro_screen(config: JsValue) -> Result<(), JsValue> {
    let config = load_config(config)?;
    let document = document().ok_or("No document")?;

    if let Some(list) = document.get_element_by_id("guidelines-list") {
        list.set_inner_html("");
        for guideline in CAPTURE_GUIDELINES {
            let item = document.create_element("li")?;
            item.set_text_content(Some(guideline));
            list.append_child(&item)?;
        }
    }

    let permission_route = config.routes.permission.clone();
    on_click("take-selfie-btn", move || navigate(&permission_route));

    let upload_route = config.routes.manual_upload.clone();
    on_click("upload-photo-btn", move || navigate(&upload_route));

    log::info!("Intro screen initialized");
    Ok(())
}
