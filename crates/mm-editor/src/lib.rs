pub mod canvas;
pub mod drag;
pub mod gesture;
pub mod input;
pub mod shortcuts;

pub use canvas::{CanvasController, CanvasIntent};
pub use input::{CaptureError, InputEvent, NoCapture, PointerCapture, PointerId};
