pub mod bounds;
pub mod config;
pub mod connector;
pub mod id;
pub mod layout;
pub mod measure;
pub mod model;
pub mod store;
pub mod transform;

pub use bounds::{content_bounds, fit_transform, node_rect};
pub use config::{CanvasConfig, ConfigError};
pub use connector::{Anchor, Connector, connectors};
pub use id::NodeId;
pub use layout::{place_child, row_slots};
pub use measure::{NoMetrics, NodeMetrics, SizeRegistry};
pub use model::*;
pub use store::{NodeStore, StoreError, StoreMutation};
pub use transform::{ScaleRange, ViewTransform};

// Re-export the geometry types used throughout the public API.
pub use kurbo::{Point, Rect, Size, Vec2};
