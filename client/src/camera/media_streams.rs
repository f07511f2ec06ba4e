use crate::camera::frame_reader::FrameReader;
use crate::camera::utils::js_error;
use async_trait::async_trait;
use glowish_capture::{AccessError, CameraBackend, CaptureError, Frame, LiveStream, StreamConstraints};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{DomException, HtmlVideoElement, MediaStream, MediaStreamConstraints, MediaStreamTrack};

/// `HTMLMediaElement.HAVE_CURRENT_DATA`
const HAVE_CURRENT_DATA: u16 = 2;

pub async fn get_camera_stream(constraints: &StreamConstraints) -> Result<MediaStream, JsValue> {
    let window = web_sys::window().ok_or("No window")?;
    let navigator = window.navigator();
    let media_devices = navigator.media_devices()?;

    let media_constraints = MediaStreamConstraints::new();
    media_constraints.set_audio(&JsValue::FALSE);
    media_constraints.set_video(&create_camera_constraints(constraints)?);

    let promise = media_devices.get_user_media_with_constraints(&media_constraints)?;
    let stream_js = JsFuture::from(promise).await?;
    Ok(MediaStream::from(stream_js))
}

fn create_camera_constraints(constraints: &StreamConstraints) -> Result<JsValue, JsValue> {
    let obj = js_sys::Object::new();

    js_sys::Reflect::set(&obj, &"facingMode".into(), &constraints.facing.as_str().into())?;

    // width: { ideal: N }
    let width_obj = js_sys::Object::new();
    js_sys::Reflect::set(&width_obj, &"ideal".into(), &constraints.ideal_width.into())?;
    js_sys::Reflect::set(&obj, &"width".into(), &width_obj)?;

    // height: { ideal: N }
    let height_obj = js_sys::Object::new();
    js_sys::Reflect::set(&height_obj, &"ideal".into(), &constraints.ideal_height.into())?;
    js_sys::Reflect::set(&obj, &"height".into(), &height_obj)?;

    Ok(obj.into())
}

pub fn stop_stream(stream: &MediaStream) {
    let tracks = stream.get_tracks();
    for i in 0..tracks.length() {
        let track = MediaStreamTrack::from(tracks.get(i));
        track.stop();
    }
}

/// Map a rejected `getUserMedia` call to an access error.
fn access_error(err: JsValue) -> AccessError {
    match err.dyn_ref::<DomException>() {
        Some(exception) => AccessError::from_dom_error(&exception.name(), &exception.message()),
        None => AccessError::AcquisitionFailed(js_error(&err)),
    }
}

/// A `getUserMedia` stream, optionally shown in a preview element
pub struct BrowserStream {
    media: MediaStream,
    preview: Option<Preview>,
}

#[derive(Clone)]
struct Preview {
    video: HtmlVideoElement,
    reader: Rc<FrameReader>,
}

impl BrowserStream {
    pub fn media(&self) -> &MediaStream {
        &self.media
    }
}

impl LiveStream for BrowserStream {
    fn dimensions(&self) -> (u32, u32) {
        match &self.preview {
            Some(preview) if preview.video.ready_state() >= HAVE_CURRENT_DATA => {
                (preview.video.video_width(), preview.video.video_height())
            }
            _ => (0, 0),
        }
    }

    fn read_frame(&self) -> Result<Frame, CaptureError> {
        let preview = self.preview.as_ref().ok_or(CaptureError::NotReady)?;
        if preview.video.ready_state() < HAVE_CURRENT_DATA {
            return Err(CaptureError::NotReady);
        }
        preview
            .reader
            .read(&preview.video)
            .map_err(|e| CaptureError::FrameRead(js_error(&e)))
    }
}

/// Camera access through `navigator.mediaDevices`.
///
/// A probe camera only opens streams to trigger the permission prompt; a
/// preview camera also shows the stream it activates in a video element.
pub struct BrowserCamera {
    preview: Option<Preview>,
}

impl BrowserCamera {
    pub fn probe() -> Self {
        Self { preview: None }
    }

    pub fn with_preview(video: HtmlVideoElement, canvas: web_sys::HtmlCanvasElement) -> Result<Self, JsValue> {
        let reader = FrameReader::new(canvas)?;
        // Required for inline autoplay on iOS
        video.set_attribute("playsinline", "")?;
        video.set_muted(true);

        Ok(Self {
            preview: Some(Preview {
                video,
                reader: Rc::new(reader),
            }),
        })
    }
}

#[async_trait(?Send)]
impl CameraBackend for BrowserCamera {
    type Stream = BrowserStream;

    async fn acquire(&self, constraints: &StreamConstraints) -> Result<BrowserStream, AccessError> {
        let media = get_camera_stream(constraints).await.map_err(access_error)?;
        log::info!("Camera stream acquired ({} tracks)", media.get_tracks().length());

        Ok(BrowserStream {
            media,
            preview: self.preview.clone(),
        })
    }

    fn activate(&self, stream: &BrowserStream) {
        if let Some(preview) = &stream.preview {
            preview.video.set_src_object(Some(&stream.media));
            if let Err(e) = preview.video.play() {
                log::warn!("Preview playback did not start: {}", js_error(&e));
            }
        }
    }

    fn release(&self, stream: BrowserStream) {
        stop_stream(&stream.media);
        if let Some(preview) = &stream.preview {
            // A newer stream may already own the preview element
            let attached = preview
                .video
                .src_object()
                .map(|current| js_sys::Object::is(&current, &stream.media))
                .unwrap_or(false);
            if attached {
                preview.video.set_src_object(None);
            }
        }
        log::info!("Camera stream released");
    }
}
