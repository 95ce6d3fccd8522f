//! Output payload: the canvas document consumed by the renderer. Field
//! names, side tags, and color codes are wire format and must not drift.

use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CanvasNodeKind {
    Text,
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

#[derive(Debug, Clone, Serialize)]
pub struct CanvasNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: CanvasNodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    pub color: String,
}

impl CanvasNode {
    /// A text card. Geometry is computed in f32 and rounded at this boundary.
    pub fn card(id: String, text: String, x: f32, y: f32, width: f32, height: f32, color: String) -> Self {
        Self {
            id,
            kind: CanvasNodeKind::Text,
            text: Some(text),
            label: None,
            x: x.round() as i64,
            y: y.round() as i64,
            width: width.round() as i64,
            height: height.round() as i64,
            color,
        }
    }

    /// A group bounding box.
    pub fn group(id: String, label: String, x: f32, y: f32, width: f32, height: f32, color: String) -> Self {
        Self {
            id,
            kind: CanvasNodeKind::Group,
            text: None,
            label: Some(label),
            x: x.round() as i64,
            y: y.round() as i64,
            width: width.round() as i64,
            height: height.round() as i64,
            color,
        }
    }

    pub fn is_card(&self) -> bool {
        self.kind == CanvasNodeKind::Text
    }

    pub fn is_group(&self) -> bool {
        self.kind == CanvasNodeKind::Group
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CanvasEdge {
    pub id: String,
    #[serde(rename = "fromNode")]
    pub from: String,
    #[serde(rename = "toNode")]
    pub to: String,
    #[serde(rename = "fromSide")]
    pub from_side: Side,
    #[serde(rename = "toSide")]
    pub to_side: Side,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Canvas {
    pub nodes: Vec<CanvasNode>,
    pub edges: Vec<CanvasEdge>,
}

impl Canvas {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn cards(&self) -> impl Iterator<Item = &CanvasNode> {
        self.nodes.iter().filter(|node| node.is_card())
    }

    pub fn groups(&self) -> impl Iterator<Item = &CanvasNode> {
        self.nodes.iter().filter(|node| node.is_group())
    }
}

/// Writes the payload pretty-printed, matching the persisted `.canvas`
/// document format.
pub fn write_canvas(path: &Path, canvas: &Canvas) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, canvas)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_field_names() {
        let node = CanvasNode::card(
            "n1".to_string(),
            "### hi".to_string(),
            10.4,
            20.6,
            360.0,
            91.0,
            "4".to_string(),
        );
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "n1",
                "type": "text",
                "text": "### hi",
                "x": 10,
                "y": 21,
                "width": 360,
                "height": 91,
                "color": "4",
            })
        );

        let edge = CanvasEdge {
            id: "edge-flow-0".to_string(),
            from: "n1".to_string(),
            to: "n2".to_string(),
            from_side: Side::Right,
            to_side: Side::Left,
            color: "4".to_string(),
            label: None,
        };
        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "edge-flow-0",
                "fromNode": "n1",
                "toNode": "n2",
                "fromSide": "right",
                "toSide": "left",
                "color": "4",
            })
        );
    }

    #[test]
    fn groups_serialize_label_not_text() {
        let node = CanvasNode::group(
            "group-p1".to_string(),
            "Phase 1: Setup".to_string(),
            0.0,
            0.0,
            900.0,
            600.0,
            "6".to_string(),
        );
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "group");
        assert_eq!(json["label"], "Phase 1: Setup");
        assert!(json.get("text").is_none());
    }
}
