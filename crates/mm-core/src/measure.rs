//! Rendered-size registry.
//!
//! Node heights depend on their content (wrapped text, image aspect ratio),
//! so only the rendering layer knows them, and only after layout. It reports
//! sizes into a [`SizeRegistry`]; the fit and connector code read them back
//! through [`NodeMetrics`] and fall back to constants for anything missing.

use crate::id::NodeId;
use kurbo::Size;
use std::collections::HashMap;

/// Read access to measured node sizes.
pub trait NodeMetrics {
    /// The node's rendered size in content units, if it has been measured.
    fn rendered_size(&self, id: NodeId) -> Option<Size>;

    fn rendered_height(&self, id: NodeId) -> Option<f64> {
        self.rendered_size(id).map(|s| s.height)
    }
}

/// Provider for the first frame, before anything has been laid out.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetrics;

impl NodeMetrics for NoMetrics {
    fn rendered_size(&self, _id: NodeId) -> Option<Size> {
        None
    }
}

/// Measured sizes keyed by node, filled in by the rendering layer after layout.
#[derive(Debug, Clone, Default)]
pub struct SizeRegistry {
    sizes: HashMap<NodeId, Size>,
}

impl SizeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a measurement. Non-finite or negative sizes are dropped, since
    /// a detached element reports garbage rather than failing.
    pub fn record(&mut self, id: NodeId, size: Size) {
        let valid = size.width.is_finite()
            && size.height.is_finite()
            && size.width >= 0.0
            && size.height >= 0.0;
        if valid {
            log::trace!("measured {id}: {}x{}", size.width, size.height);
            self.sizes.insert(id, size);
        } else {
            log::debug!("discarding bogus measurement for {id}: {size:?}");
            self.sizes.remove(&id);
        }
    }

    pub fn forget(&mut self, id: NodeId) {
        self.sizes.remove(&id);
    }

    /// Drop measurements for nodes that no longer exist.
    pub fn retain_ids(&mut self, mut keep: impl FnMut(NodeId) -> bool) {
        self.sizes.retain(|id, _| keep(*id));
    }

    pub fn clear(&mut self) {
        self.sizes.clear();
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

impl NodeMetrics for SizeRegistry {
    fn rendered_size(&self, id: NodeId) -> Option<Size> {
        self.sizes.get(&id).copied()
    }
}

impl<M: NodeMetrics + ?Sized> NodeMetrics for &M {
    fn rendered_size(&self, id: NodeId) -> Option<Size> {
        (**self).rendered_size(id)
    }
}
