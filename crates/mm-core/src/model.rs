//! Node records displayed on the mind-map canvas.
//!
//! Nodes are flat records, not a tree: a child points at its parent through
//! `parent_id`, and that reference may dangle once the parent is removed.
//! The canvas only ever mutates `x`/`y`; everything else belongs to the
//! orchestration layer that creates the nodes.

use crate::id::NodeId;
use kurbo::Point;
use serde::{Deserialize, Serialize};

// ─── Kinds & actions ─────────────────────────────────────────────────────

/// What a node displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    /// A prompt typed by the user.
    Prompt,
    /// Text returned by the model.
    AiResponse,
    /// Generated image (`content` is a data URI).
    GeneratedImage,
    /// Generated video (`content` is a data URI or URL).
    GeneratedVideo,
    /// Placeholder while a request is in flight.
    Loading,
    Error,
    SystemMessage,
}

impl NodeKind {
    /// Stable name used in logs and host-facing JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prompt => "PROMPT",
            Self::AiResponse => "AI_RESPONSE",
            Self::GeneratedImage => "GENERATED_IMAGE",
            Self::GeneratedVideo => "GENERATED_VIDEO",
            Self::Loading => "LOADING",
            Self::Error => "ERROR",
            Self::SystemMessage => "SYSTEM_MESSAGE",
        }
    }

    pub fn is_media(self) -> bool {
        matches!(self, Self::GeneratedImage | Self::GeneratedVideo)
    }
}

/// Per-node action buttons; recorded on the nodes they produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeAction {
    FollowUp,
    Expand,
    Summarize,
    GenerateImage,
    GenerateVideo,
    Retry,
}

/// A file attached to a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAttachment {
    /// Base64 payload, without the `data:` prefix.
    #[serde(rename = "base64")]
    pub data: String,
    pub mime_type: String,
    pub name: String,
}

// ─── Node ────────────────────────────────────────────────────────────────

/// A single node on the canvas.
///
/// `x`/`y` is the top-left corner in content space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileAttachment>,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,
    #[serde(
        default,
        rename = "triggeredByAction",
        skip_serializing_if = "Option::is_none"
    )]
    pub triggered_by: Option<NodeAction>,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind, content: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            content: content.into(),
            file: None,
            x: 0.0,
            y: 0.0,
            parent_id: None,
            triggered_by: None,
        }
    }

    /// Place the node's top-left corner at `(x, y)`.
    #[must_use]
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: NodeId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    #[must_use]
    pub fn triggered_by(mut self, action: NodeAction) -> Self {
        self.triggered_by = Some(action);
        self
    }

    #[must_use]
    pub fn with_file(mut self, file: FileAttachment) -> Self {
        self.file = Some(file);
        self
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// `true` while the node is a placeholder for an in-flight request.
    pub fn is_pending(&self) -> bool {
        self.kind == NodeKind::Loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builder_sets_fields() {
        let parent = NodeId::intern("model_parent");
        let node = Node::new(NodeId::intern("model_child"), NodeKind::AiResponse, "hi")
            .at(10.0, 20.0)
            .with_parent(parent)
            .triggered_by(NodeAction::Expand);
        assert_eq!(node.position(), Point::new(10.0, 20.0));
        assert_eq!(node.parent_id, Some(parent));
        assert!(!node.is_root());
        assert!(!node.is_pending());
    }

    #[test]
    fn json_uses_host_field_names() {
        let node = Node::new(NodeId::intern("json_node"), NodeKind::GeneratedImage, "data:")
            .with_parent(NodeId::intern("json_parent"))
            .triggered_by(NodeAction::GenerateImage);
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["type"], "GENERATED_IMAGE");
        assert_eq!(value["parentId"], "json_parent");
        assert_eq!(value["triggeredByAction"], "GENERATE_IMAGE");
        assert!(value.get("file").is_none());
    }

    #[test]
    fn parses_host_record_with_attachment() {
        let json = r#"{
            "id": "p1",
            "type": "PROMPT",
            "content": "describe this",
            "file": { "base64": "AAAA", "mimeType": "image/png", "name": "a.png" },
            "x": 5,
            "y": -3.5
        }"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.kind, NodeKind::Prompt);
        assert!(node.is_root());
        let file = node.file.unwrap();
        assert_eq!(file.mime_type, "image/png");
        assert_eq!(file.data, "AAAA");
        assert_eq!(node.y, -3.5);
    }
}
