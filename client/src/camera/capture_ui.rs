use crate::camera::media_streams::BrowserCamera;
use crate::camera::storage::SessionStore;
use crate::camera::utils::{
    bind_once, element_by_id, js_error, load_config, navigate, on_click, on_event, set_class, set_enabled,
    set_text, set_visible,
};
use glowish_capture::{Acquisition, Angle, CaptureScreen, PreviewMode, ScreenStatus, Step};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

type Screen = CaptureScreen<BrowserCamera, SessionStore>;

thread_local! {
    static CAPTURE_SCREEN: RefCell<Option<Screen>> = RefCell::new(None);
    static HANDLERS_BOUND: Cell<bool> = Cell::new(false);
}

/// Run `f` against the mounted screen. `None` when nothing is mounted or the
/// screen is already borrowed further up the stack.
fn with_screen<R>(f: impl FnOnce(&mut Screen) -> R) -> Option<R> {
    CAPTURE_SCREEN.with(|slot| {
        let mut guard = slot.try_borrow_mut().ok()?;
        guard.as_mut().map(f)
    })
}

pub fn status_text(status: &ScreenStatus) -> &'static str {
    match status {
        ScreenStatus::Acquiring => "Starting camera...",
        ScreenStatus::Ready => "",
        ScreenStatus::Reviewing => "Happy with this photo?",
        ScreenStatus::Error(e) => e.user_message(),
        ScreenStatus::HandoffFailed => "Your photos could not be saved. Please try again.",
        ScreenStatus::Completed => "All photos captured",
        ScreenStatus::Closed => "Camera closed",
    }
}

/// Class of the per-angle progress marker
pub fn step_class(angle: Angle, current: Option<Angle>, captured: bool) -> &'static str {
    if current == Some(angle) {
        "step current"
    } else if captured {
        "step done"
    } else {
        "step"
    }
}

/// Mount the capture screen and start acquiring the camera. Calling it again
/// replaces the previous instance, whose stream is released first.
#[wasm_bindgen]
pub fn init_capture_screen(config: JsValue) -> Result<(), JsValue> {
    let config = load_config(config)?;
    let video: web_sys::HtmlVideoElement = element_by_id("camera-preview").ok_or("Missing #camera-preview")?;
    let canvas: web_sys::HtmlCanvasElement = element_by_id("capture-canvas").ok_or("Missing #capture-canvas")?;

    let camera = Rc::new(BrowserCamera::with_preview(video, canvas)?);
    let store = SessionStore::open()?;

    drop(take_screen());

    let mut screen = CaptureScreen::new(camera, store, config);
    let acquisition = screen
        .mount()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    CAPTURE_SCREEN.with(|slot| *slot.borrow_mut() = Some(screen));

    if bind_once(&HANDLERS_BOUND) {
        bind_handlers()?;
    }

    spawn_acquisition(acquisition);
    render();
    log::info!("Capture screen initialized");
    Ok(())
}

/// Release the camera and drop the screen. Safe to call repeatedly.
#[wasm_bindgen]
pub fn unmount_capture_screen() {
    drop(take_screen());
}

fn take_screen() -> Option<Screen> {
    CAPTURE_SCREEN.with(|slot| slot.try_borrow_mut().ok().and_then(|mut guard| guard.take()))
}

fn spawn_acquisition(acquisition: Acquisition<BrowserCamera>) {
    wasm_bindgen_futures::spawn_local(async move {
        let outcome = acquisition.run().await;
        if let Some(Err(e)) = with_screen(|screen| screen.finish_mount(outcome)) {
            log::warn!("Camera unavailable: {}", e);
        }
        render();
    });
}

fn bind_handlers() -> Result<(), JsValue> {
    on_click("capture-btn", || {
        let still = with_screen(|screen| match screen.capture() {
            Ok(image) => Some(image.to_data_url()),
            Err(e) => {
                log::warn!("Capture failed: {}", e);
                None
            }
        })
        .flatten();

        if let (Some(url), Some(image)) = (still, element_by_id::<web_sys::HtmlImageElement>("review-image")) {
            image.set_src(&url);
        }
        render();
    });

    on_click("accept-btn", || advance(|screen| screen.accept()));
    on_click("skip-btn", || advance(|screen| screen.skip()));
    on_click("previous-btn", || advance(|screen| screen.previous()));

    on_click("handoff-retry-btn", || advance(|screen| screen.retry_handoff()));

    on_click("retake-btn", || {
        with_screen(|screen| screen.retake());
        render();
    });

    on_click("retry-btn", || {
        match with_screen(|screen| screen.retry()) {
            Some(Ok(acquisition)) => spawn_acquisition(acquisition),
            Some(Err(e)) => log::warn!("Retry refused: {}", e),
            None => {}
        }
        render();
    });

    on_click("back-btn", || {
        if let Some(route) = with_screen(|screen| screen.back().to_string()) {
            navigate(&route);
        }
    });

    on_click("capture-upload-btn", || {
        if let Some(route) = with_screen(|screen| screen.config().routes.manual_upload.clone()) {
            unmount_capture_screen();
            navigate(&route);
        }
    });

    // Capture stays disabled until the preview has a frame
    on_event("camera-preview", "loadeddata", render);
    on_event("camera-preview", "resize", render);

    let window = web_sys::window().ok_or("No window")?;
    let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
        unmount_capture_screen();
    }) as Box<dyn FnMut(_)>);
    window
        .add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref())
        .map_err(|e| JsValue::from_str(&js_error(&e)))?;
    closure.forget();

    Ok(())
}

/// Apply a sequencer move; completion hands the photos to the review page.
fn advance(op: impl FnOnce(&mut Screen) -> glowish_capture::Result<Step>) {
    let result = with_screen(|screen| (op(screen), screen.config().routes.review.clone()));
    match result {
        Some((Ok(Step::Completed(photos)), review_route)) => {
            log::info!("Capture complete with {} photos", photos.captured_count());
            navigate(&review_route);
        }
        Some((Ok(_), _)) => {}
        Some((Err(e), _)) => log::warn!("Step rejected: {}", e),
        None => {}
    }
    render();
}

fn render() {
    with_screen(|screen| render_screen(screen));
}

fn render_screen(screen: &Screen) {
    let status = screen.status();
    let controls = screen.controls();
    let current = screen.current_angle();

    set_text("capture-status", status_text(&status));

    if let Some(angle) = current {
        set_text("angle-name", angle.display_name());
        set_text("angle-instruction", angle.instruction());
        set_class("guide-overlay", &format!("guide-overlay {}", angle.guide().css_class()));
    }

    let progress = screen.progress();
    set_text(
        "angle-progress",
        &format!("{} of {}", progress.position.min(progress.total), progress.total),
    );
    for angle in Angle::ALL {
        set_class(
            &format!("step-{}", angle.as_str()),
            step_class(angle, current, screen.has_capture(angle)),
        );
    }

    let live = screen.preview_mode() == PreviewMode::Live;
    set_visible("camera-preview", live);
    set_visible("guide-overlay", live);
    set_visible("review-image", !live);

    set_visible(
        "live-controls",
        matches!(status, ScreenStatus::Acquiring | ScreenStatus::Ready),
    );
    set_visible("review-controls", status == ScreenStatus::Reviewing);
    set_enabled("capture-btn", controls.capture);
    set_enabled("skip-btn", controls.skip);
    set_enabled("previous-btn", controls.previous);
    set_enabled("accept-btn", controls.accept);
    set_enabled("retake-btn", controls.retake);

    let failed = matches!(status, ScreenStatus::Error(_) | ScreenStatus::HandoffFailed);
    set_visible("camera-error", failed);
    set_text("camera-error-message", if failed { status_text(&status) } else { "" });
    set_visible("retry-btn", controls.retry);
    set_visible("handoff-retry-btn", controls.retry_handoff);
    set_visible("capture-upload-btn", failed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use glowish_capture::AccessError;

    #[test]
    fn test_status_text() {
        assert_eq!(status_text(&ScreenStatus::Acquiring), "Starting camera...");
        assert_eq!(
            status_text(&ScreenStatus::Error(AccessError::NoDevice)),
            "No camera found on your device."
        );
        assert!(status_text(&ScreenStatus::HandoffFailed).contains("could not be saved"));
    }

    #[test]
    fn test_step_class() {
        assert_eq!(step_class(Angle::Right, Some(Angle::Right), true), "step current");
        assert_eq!(step_class(Angle::Front, Some(Angle::Right), true), "step done");
        assert_eq!(step_class(Angle::Left, Some(Angle::Right), false), "step");
        assert_eq!(step_class(Angle::Closeup, None, true), "step done");
    }
}
