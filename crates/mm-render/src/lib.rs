pub mod frame;
pub mod hit;
pub mod paint;
pub mod svg;

pub use frame::{FrameSnapshot, NodeFrame, build_frame};
pub use hit::{hit_test, hit_test_rect, hit_test_screen};
pub use paint::{Theme, paint_frame};
pub use svg::connector_path_data;
