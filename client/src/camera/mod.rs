//! Browser camera, storage and page wiring for the capture flow

pub mod utils;
pub mod media_streams;
pub mod frame_reader;
pub mod storage;
pub mod intro_ui;
pub mod permission_ui;
pub mod capture_ui;

pub use capture_ui::{init_capture_screen, unmount_capture_screen};
pub use intro_ui::init_intro_screen;
pub use media_streams::{BrowserCamera, BrowserStream};
pub use permission_ui::init_permission_screen;
pub use storage::SessionStore;
