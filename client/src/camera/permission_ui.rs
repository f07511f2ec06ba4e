use crate::camera::media_streams::BrowserCamera;
use crate::camera::utils::{bind_once, load_config, navigate, on_click, set_enabled, set_text, set_visible};
use glowish_capture::{probe_access, AccessOutcome, PermissionGate, PermissionState, Routes};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;

thread_local! {
    static PERMISSION_GATE: RefCell<Option<PermissionGate<BrowserCamera>>> = RefCell::new(None);
    static ROUTES: RefCell<(Routes, u32)> = RefCell::new((Routes::default(), 0));
    static HANDLERS_BOUND: Cell<bool> = Cell::new(false);
}

fn with_gate<R>(f: impl FnOnce(&mut PermissionGate<BrowserCamera>) -> R) -> Option<R> {
    PERMISSION_GATE.with(|slot| {
        let mut guard = slot.try_borrow_mut().ok()?;
        guard.as_mut().map(f)
    })
}

/// Label of the enable button for each gate state
pub fn enable_button_label(state: &PermissionState) -> &'static str {
    match state {
        PermissionState::Idle | PermissionState::Denied(_) => "Enable Camera Access",
        PermissionState::Requesting => "Requesting Access...",
        PermissionState::Granted => "Camera Enabled",
    }
}

#[wasm_bindgen]
pub fn init_permission_screen(config: JsValue) -> Result<(), JsValue> {
    let config = load_config(config)?;
    let gate = PermissionGate::new(Rc::new(BrowserCamera::probe()), config.camera.clone());
    PERMISSION_GATE.with(|slot| *slot.borrow_mut() = Some(gate));
    ROUTES.with(|routes| *routes.borrow_mut() = (config.routes.clone(), config.grant_redirect_delay_ms));

    if bind_once(&HANDLERS_BOUND) {
        bind_handlers();
    }

    render();
    log::info!("Permission screen initialized");
    Ok(())
}

/// Handlers read the routes of the latest initialization.
fn bind_handlers() {
    on_click("enable-camera-btn", || {
        let (capture_route, delay_ms) = ROUTES.with(|routes| {
            let routes = routes.borrow();
            (routes.0.capture.clone(), routes.1)
        });
        request_access(capture_route, delay_ms);
    });

    on_click("try-again-btn", || {
        with_gate(|gate| gate.try_again());
        render();
    });

    on_click("permission-upload-btn", || {
        navigate(&ROUTES.with(|routes| routes.borrow().0.manual_upload.clone()));
    });

    on_click("permission-back-btn", || {
        navigate(&ROUTES.with(|routes| routes.borrow().0.intro.clone()));
    });
}

fn request_access(capture_route: String, delay_ms: u32) {
    let Some((camera, constraints)) = with_gate(|gate| gate.begin_request()).flatten() else {
        log::debug!("Permission request already in progress");
        return;
    };
    render();

    wasm_bindgen_futures::spawn_local(async move {
        let outcome = probe_access(camera.as_ref(), &constraints).await;
        let outcome = with_gate(|gate| gate.finish_request(outcome));
        render();

        if let Some(AccessOutcome::Granted) = outcome {
            gloo_timers::future::TimeoutFuture::new(delay_ms).await;
            navigate(&capture_route);
        }
    });
}

fn render() {
    let Some((state, message)) = with_gate(|gate| (gate.state().clone(), gate.error_message())) else {
        return;
    };

    set_text("enable-camera-btn", enable_button_label(&state));
    set_enabled("enable-camera-btn", matches!(state, PermissionState::Idle));

    let denied = matches!(state, PermissionState::Denied(_));
    set_visible("enable-camera-btn", !denied);
    set_visible("permission-error", denied);
    set_visible("try-again-btn", denied);
    set_text("permission-error-message", message.unwrap_or(""));
    set_visible("permission-granted", state == PermissionState::Granted);
}
