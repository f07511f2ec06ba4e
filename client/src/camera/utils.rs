use glowish_capture::CaptureConfig;
use std::cell::Cell;
use std::thread::LocalKey;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Readable text for a thrown JS value
pub fn js_error(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}

/// Read the page configuration. `undefined` or `null` means defaults.
pub fn load_config(value: JsValue) -> Result<CaptureConfig, JsValue> {
    let config: CaptureConfig = if value.is_undefined() || value.is_null() {
        CaptureConfig::default()
    } else {
        serde_wasm_bindgen::from_value(value)?
    };
    config
        .validate()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(config)
}

pub fn document() -> Option<web_sys::Document> {
    web_sys::window().and_then(|w| w.document())
}

pub fn element_by_id<T: JsCast>(id: &str) -> Option<T> {
    document()?
        .get_element_by_id(id)
        .and_then(|element| element.dyn_into::<T>().ok())
}

pub fn set_text(id: &str, text: &str) {
    if let Some(element) = element_by_id::<web_sys::Element>(id) {
        element.set_text_content(Some(text));
    }
}

pub fn set_class(id: &str, class_name: &str) {
    if let Some(element) = element_by_id::<web_sys::Element>(id) {
        element.set_class_name(class_name);
    }
}

pub fn set_visible(id: &str, visible: bool) {
    if let Some(element) = element_by_id::<web_sys::HtmlElement>(id) {
        let display_value = if visible { "" } else { "none" };
        element.style().set_property("display", display_value).ok();
    }
}

pub fn set_enabled(id: &str, enabled: bool) {
    if let Some(button) = element_by_id::<web_sys::HtmlButtonElement>(id) {
        button.set_disabled(!enabled);
    }
}

/// True the first time it is called for `flag`. Page handlers are bound
/// only then, so re-initializing a page does not stack listeners.
pub fn bind_once(flag: &'static LocalKey<Cell<bool>>) -> bool {
    !flag.with(|bound| bound.replace(true))
}

/// Attach a click handler for the lifetime of the page.
pub fn on_click(id: &str, handler: impl FnMut() + 'static) {
    on_event(id, "click", handler);
}

pub fn on_event(id: &str, event: &str, mut handler: impl FnMut() + 'static) {
    if let Some(element) = element_by_id::<web_sys::HtmlElement>(id) {
        let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            handler();
        }) as Box<dyn FnMut(_)>);

        if let Err(e) = element.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
            log::warn!("Could not bind '{}' on #{}: {}", event, id, js_error(&e));
        }
        closure.forget();
    } else {
        log::debug!("No #{} element, '{}' handler skipped", id, event);
    }
}

pub fn navigate(route: &str) {
    log::info!("Navigating to {}", route);
    if let Some(window) = web_sys::window() {
        if let Err(e) = window.location().set_href(route) {
            log::error!("Navigation to {} failed: {}", route, js_error(&e));
        }
    }
}
