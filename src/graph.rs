//! Input model for the classified conversation graph and the lenient JSON
//! ingestion in front of it. The classifier is an external, best-effort
//! oracle: payloads arrive fenced, truncated, or with legacy field names,
//! and everything short of a missing node sequence is absorbed here.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::GraphError;
use crate::policy::GraphMode;

static JSON_FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```json\s*\n?(.*?)\n?```").unwrap());
static ANY_FENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```\s*\n?(.*?)\n?```").unwrap());

/// Signal/noise classification of a node. Unknown tags degrade to signal so
/// a sloppy classifier response never silently hides content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Signal,
    Noise,
}

impl<'de> Deserialize<'de> for NodeKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(match tag.as_str() {
            "noise" => NodeKind::Noise,
            _ => NodeKind::Signal,
        })
    }
}

/// Card size class. Anything the classifier sends that is not recognizably
/// small or large reads as medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SizeClass {
    S,
    #[default]
    M,
    L,
}

impl<'de> Deserialize<'de> for SizeClass {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(match tag.as_str() {
            "S" | "s" => SizeClass::S,
            "L" | "l" => SizeClass::L,
            _ => SizeClass::M,
        })
    }
}

/// A thematic grouping of nodes. Phases with no non-noise members are
/// dropped during layout; a phase without a title is laid out but draws no
/// bounding box.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Phase {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphNode {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "phaseId")]
    pub phase_id: Option<String>,
    #[serde(default, rename = "type", alias = "classification", alias = "kind")]
    pub kind: NodeKind,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub label: String,
    #[serde(default, rename = "canvas_summary", alias = "body")]
    pub body: String,
    #[serde(default, rename = "qa_indices", alias = "source_indices", alias = "sourceIndices")]
    pub source_indices: Vec<usize>,
    #[serde(default)]
    pub size: Option<SizeClass>,
    #[serde(default, alias = "colorTag", alias = "color_tag")]
    pub color: Option<String>,
    #[serde(default)]
    pub is_off_topic: bool,
}

impl GraphNode {
    pub fn is_noise(&self) -> bool {
        self.is_off_topic || self.kind == NodeKind::Noise
    }
}

/// A semantic relation between two nodes. Directional in the data, rendered
/// without arrowheads by the consuming canvas.
#[derive(Debug, Clone, Deserialize)]
pub struct Relation {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// Policy echo the upstream pipeline injects back into the payload.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct GraphMeta {
    #[serde(default)]
    pub mode: Option<GraphMode>,
    #[serde(default, alias = "cardWidth")]
    pub card_width: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifiedGraph {
    #[serde(default)]
    pub main_topic: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub phases: Vec<Phase>,
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<Relation>,
    #[serde(default)]
    pub meta: Option<GraphMeta>,
}

/// One entry of the note-file mapping used to resolve back-link footers.
/// `index` uses the source's 1-based numbering.
#[derive(Debug, Clone, Deserialize)]
pub struct FileMapping {
    pub index: usize,
    #[serde(alias = "fileName")]
    pub file_name: String,
}

/// Parses a raw classifier response into a typed graph: payload extraction,
/// strict-then-lenient parsing with truncation repair, and the `nodes`
/// sequence contract check.
pub fn parse_classified_graph(raw: &str) -> Result<ClassifiedGraph, GraphError> {
    let value = extract_value(raw)?;
    graph_from_value(value)
}

/// Typed conversion from an already-parsed JSON value, applying the same
/// contract checks as [`parse_classified_graph`].
pub fn graph_from_value(value: Value) -> Result<ClassifiedGraph, GraphError> {
    // A bare array is an abbreviated single-section response.
    let value = match value {
        Value::Array(nodes) => json!({ "nodes": nodes, "edges": [] }),
        other => other,
    };
    let has_nodes = value.get("nodes").map(Value::is_array).unwrap_or(false);
    if !has_nodes {
        return Err(GraphError::InvalidNodes);
    }
    Ok(serde_json::from_value(value)?)
}

/// Locates and parses the JSON payload inside a model response. Candidates
/// are tried in order of confidence: a ```json fence, any fence whose body
/// is an object, the outermost brace span, and finally the tail from the
/// first brace onward with truncation repair applied.
fn extract_value(raw: &str) -> Result<Value, GraphError> {
    let mut first_error: Option<serde_json::Error> = None;
    let mut seen_candidate = false;

    let mut attempt = |payload: &str, repair: bool| -> Option<Value> {
        let payload = payload.trim();
        if payload.is_empty() {
            return None;
        }
        seen_candidate = true;
        match serde_json::from_str(payload) {
            Ok(value) => return Some(value),
            Err(err) => {
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
        if let Ok(value) = json5::from_str::<Value>(payload) {
            return Some(value);
        }
        if repair {
            let repaired = repair_truncated_json(payload);
            if let Ok(value) = serde_json::from_str(&repaired) {
                return Some(value);
            }
            if let Ok(value) = json5::from_str::<Value>(&repaired) {
                return Some(value);
            }
        }
        None
    };

    if let Some(caps) = JSON_FENCE_RE.captures(raw)
        && let Some(value) = attempt(&caps[1], true)
    {
        return Ok(value);
    }
    if let Some(caps) = ANY_FENCE_RE.captures(raw) {
        let body = caps[1].trim();
        if body.starts_with('{')
            && let Some(value) = attempt(body, true)
        {
            return Ok(value);
        }
    }
    if let Some(start) = raw.find(['{', '[']) {
        let close = if raw.as_bytes()[start] == b'{' { '}' } else { ']' };
        if let Some(end) = raw.rfind(close)
            && end > start
            && let Some(value) = attempt(&raw[start..=end], false)
        {
            return Ok(value);
        }
        // Likely cut off at the token limit: repair the whole tail.
        if let Some(value) = attempt(&raw[start..], true) {
            return Ok(value);
        }
    }

    match first_error {
        Some(err) if seen_candidate => Err(GraphError::Parse(err)),
        _ => Err(GraphError::MissingPayload),
    }
}

/// Best-effort repair for output cut off at the token limit: close a dangling
/// string, drop a trailing comma, then unwind the still-open containers in
/// nesting order.
fn repair_truncated_json(payload: &str) -> String {
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    for ch in payload.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => stack.push('}'),
            '[' if !in_string => stack.push(']'),
            '}' | ']' if !in_string => {
                stack.pop();
            }
            _ => {}
        }
    }

    let mut repaired = payload.trim_end().to_string();
    if in_string {
        repaired.push('"');
    }
    while repaired.trim_end().ends_with(',') {
        repaired.truncate(repaired.trim_end().len() - 1);
    }
    while let Some(close) = stack.pop() {
        repaired.push(close);
    }
    repaired
}
