//! Content shaping: turns raw conversation text and classified nodes into
//! the fixed-shape card strings the height estimator and layout consume.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

use crate::graph::{FileMapping, GraphNode, NodeKind};

pub const TRUNCATION_MARKER: &str = "...(truncated)";
pub const BASE64_PLACEHOLDER: &str = "[Base64 Image]";

/// Fenced code blocks longer than this many lines collapse to a placeholder.
const CODE_FOLD_THRESHOLD: usize = 6;
/// A card footer shows at most this many back-links before the overflow counter.
const MAX_FOOTER_LINKS: usize = 6;

static FENCED_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```(\w*)\n(.*?)```").unwrap());
static BASE64_IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"data:image/[a-zA-Z]+;base64,[^\s"')]+"#).unwrap());

/// Deterministic noise removal ahead of classification: folds long code
/// blocks, strips inline base64 image payloads, and hard-truncates to a
/// character budget. Idempotent; re-applying with the same or a larger
/// budget is a no-op.
pub fn smart_trim(text: &str, max_len: usize) -> String {
    if text.is_empty() {
        return String::new();
    }

    let folded = FENCED_CODE_RE.replace_all(text, |caps: &Captures| {
        let lang = &caps[1];
        let code = &caps[2];
        let lines = code.lines().count();
        if lines > CODE_FOLD_THRESHOLD {
            format!("```{lang}\n[Code: {lines} lines hidden]\n```")
        } else {
            caps[0].to_string()
        }
    });
    let cleaned = BASE64_IMAGE_RE.replace_all(&folded, BASE64_PLACEHOLDER);

    truncate_chars(&cleaned, max_len)
}

fn truncate_chars(text: &str, max_len: usize) -> String {
    let len = text.chars().count();
    if len <= max_len {
        return text.to_string();
    }
    // Text that already carries the marker over an in-budget prefix has been
    // trimmed before; cutting again would eat into the marker.
    if text.ends_with(TRUNCATION_MARKER)
        && len - TRUNCATION_MARKER.chars().count() <= max_len
    {
        return text.to_string();
    }
    let prefix: String = text.chars().take(max_len).collect();
    format!("{prefix}{TRUNCATION_MARKER}")
}

/// Back-link resolution table. The mapping input carries the source's
/// 1-based numbering; lookups use the node model's 0-based indices.
#[derive(Debug, Clone, Default)]
pub struct FileMap {
    entries: HashMap<usize, String>,
}

impl FileMap {
    pub fn from_mapping(mapping: &[FileMapping]) -> Self {
        let mut entries = HashMap::new();
        for file in mapping {
            if file.index == 0 {
                continue;
            }
            entries.insert(file.index - 1, file.file_name.clone());
        }
        Self { entries }
    }

    pub fn resolve(&self, index: usize) -> Option<&str> {
        self.entries.get(&index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything card assembly needs besides the node itself.
#[derive(Debug, Clone, Default)]
pub struct CardContext {
    pub session_title: String,
    pub base_path: String,
    pub files: FileMap,
}

impl CardContext {
    fn file_path(&self, file_name: &str) -> String {
        [self.base_path.as_str(), self.session_title.as_str(), file_name]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Assembles the final card text: heading, body, and a back-link footer for
/// nodes that trace to source items. Indices without a mapping entry are
/// omitted silently.
pub fn build_card_content(node: &GraphNode, ctx: &CardContext) -> String {
    let default_icon = match node.kind {
        NodeKind::Signal => "🟢",
        NodeKind::Noise => "🔸",
    };
    let icon = node
        .emoji
        .as_deref()
        .filter(|emoji| !emoji.is_empty())
        .unwrap_or(default_icon);
    let label = if node.label.is_empty() { "Node" } else { &node.label };

    let mut text = format!("### {icon} {label}\n\n");
    if node.body.is_empty() {
        text.push_str("(no summary)");
    } else {
        text.push_str(&node.body);
    }

    if !node.source_indices.is_empty() {
        text.push_str("\n\n---\n");
        let mut links = Vec::new();
        for &index in node.source_indices.iter().take(MAX_FOOTER_LINKS) {
            if let Some(file_name) = ctx.files.resolve(index) {
                links.push(format!("[[{}|QA{}]]", ctx.file_path(file_name), index + 1));
            }
        }
        if node.source_indices.len() > MAX_FOOTER_LINKS {
            links.push(format!("+{}more", node.source_indices.len() - MAX_FOOTER_LINKS));
        }
        // Links run horizontally to keep the footer a single row.
        text.push_str(&links.join(" "));
    }

    text
}
