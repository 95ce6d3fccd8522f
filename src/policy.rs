use serde::{Deserialize, Serialize};

/// Display tier selected from the raw conversation size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphMode {
    Simple,
    Story,
    Map,
    Architecture,
}

/// How aggressively the classifier is asked to merge items into topic nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrength {
    None,
    Medium,
    High,
    Maximum,
}

/// Adaptive density policy: advisory to the external classifier (it receives
/// the targets as generation constraints) and authoritative for the layout
/// engine (card width, grouping toggle, trim budgets).
#[derive(Debug, Clone, Serialize)]
pub struct GraphPolicy {
    pub mode: GraphMode,
    pub use_groups: bool,
    pub target_phase_count: usize,
    pub merge_strength: MergeStrength,
    pub nodes_per_group: usize,
    pub estimated_node_count: usize,
    pub card_width: f32,
    /// Per-item character budgets applied when trimming source text.
    pub max_question_len: usize,
    pub max_answer_len: usize,
}

impl GraphPolicy {
    /// Four-tier compression policy. Higher tiers keep a smaller share of the
    /// raw items and trade card count for card width.
    pub fn for_item_count(raw_count: usize) -> Self {
        if raw_count <= 15 {
            // Every item gets a card, no grouping.
            Self {
                mode: GraphMode::Simple,
                use_groups: false,
                target_phase_count: 0,
                merge_strength: MergeStrength::None,
                nodes_per_group: 10,
                estimated_node_count: raw_count,
                card_width: 360.0,
                max_question_len: 600,
                max_answer_len: 1200,
            }
        } else if raw_count <= 50 {
            // Light compression, keep most of the narrative flow.
            let estimated = (raw_count * 3).div_ceil(5);
            Self {
                mode: GraphMode::Story,
                use_groups: true,
                target_phase_count: estimated.div_ceil(6).clamp(2, 6),
                merge_strength: MergeStrength::Medium,
                nodes_per_group: 6,
                estimated_node_count: estimated,
                card_width: 380.0,
                max_question_len: 400,
                max_answer_len: 800,
            }
        } else if raw_count <= 120 {
            // Strong compression, merge recurring topics.
            let estimated = (raw_count * 3).div_ceil(10);
            Self {
                mode: GraphMode::Map,
                use_groups: true,
                target_phase_count: estimated.div_ceil(8).clamp(5, 10),
                merge_strength: MergeStrength::High,
                nodes_per_group: 8,
                estimated_node_count: estimated,
                card_width: 400.0,
                max_question_len: 200,
                max_answer_len: 400,
            }
        } else {
            // Super-node tier: the board is capped at 40 wide list cards.
            let estimated = (raw_count * 3).div_ceil(20).min(40);
            Self {
                mode: GraphMode::Architecture,
                use_groups: true,
                target_phase_count: estimated.div_ceil(5).clamp(1, 12),
                merge_strength: MergeStrength::Maximum,
                nodes_per_group: 5,
                estimated_node_count: estimated,
                card_width: 480.0,
                max_question_len: 150,
                max_answer_len: 300,
            }
        }
    }
}
