use glowish_capture::Frame;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlVideoElement};

/// Copies the frame currently shown by a video element out through an
/// offscreen canvas.
pub struct FrameReader {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl FrameReader {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or("No 2d context")?
            .dyn_into::<CanvasRenderingContext2d>()?;

        Ok(Self { canvas, ctx })
    }

    /// Draw `video` at its native resolution and read the pixels back.
    pub fn read(&self, video: &HtmlVideoElement) -> Result<Frame, JsValue> {
        let width = video.video_width();
        let height = video.video_height();

        self.canvas.set_width(width);
        self.canvas.set_height(height);

        self.ctx.draw_image_with_html_video_element(video, 0.0, 0.0)?;
        let image_data = self
            .ctx
            .get_image_data(0.0, 0.0, width as f64, height as f64)?;

        Ok(Frame {
            width,
            height,
            rgba: image_data.data().0,
        })
    }
}
