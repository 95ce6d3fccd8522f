//! Spatial layout: arranges shaped cards into a hub-and-satellite grid per
//! phase, tiles the phases into a grid of groups, and hands the placed
//! geometry to the edge router. Everything is recomputed from scratch per
//! invocation; there is no layout state between calls.

mod routing;
pub(crate) mod types;

pub use types::{CardPlan, GroupCursor, PhasePlan, PlacedCard, RoutedPhase};

use std::collections::HashMap;

use crate::canvas::{Canvas, CanvasNode};
use crate::config::LayoutConfig;
use crate::content::{CardContext, build_card_content};
use crate::graph::{ClassifiedGraph, GraphNode, SizeClass};
use crate::policy::GraphPolicy;
use crate::text_metrics::estimate_height;
use crate::theme::Theme;
use routing::{RoutingInput, route_edges};

/// Computes the full canvas payload for a classified graph. Never fails on
/// gap-level defects (missing sizes, unknown phase ids, dangling relation
/// endpoints); structural violations are rejected upstream during ingestion.
pub fn compute_layout(
    graph: &ClassifiedGraph,
    policy: &GraphPolicy,
    ctx: &CardContext,
    theme: &Theme,
    config: &LayoutConfig,
) -> Canvas {
    let live: Vec<&GraphNode> = graph.nodes.iter().filter(|node| !node.is_noise()).collect();
    if live.is_empty() {
        return Canvas::default();
    }

    let card_width = graph
        .meta
        .as_ref()
        .and_then(|meta| meta.card_width)
        .unwrap_or(policy.card_width);

    if graph.phases.is_empty() {
        layout_flat(graph, &live, card_width, ctx, theme, config)
    } else {
        layout_grouped(graph, &live, card_width, ctx, theme, config)
    }
}

/// Ungrouped mode: one implicit phase, no hub split, no bounding box. All
/// cards share the policy width and flow through a flat fixed-column grid.
fn layout_flat(
    graph: &ClassifiedGraph,
    nodes: &[&GraphNode],
    card_width: f32,
    ctx: &CardContext,
    theme: &Theme,
    config: &LayoutConfig,
) -> Canvas {
    let columns = config.satellite_columns.max(1);

    // First pass: shape and measure every card, collecting per-row heights.
    let mut plans = Vec::with_capacity(nodes.len());
    let mut row_heights: Vec<f32> = Vec::new();
    for (slot, node) in nodes.iter().enumerate() {
        let plan = card_plan(node, 0, slot, card_width, ctx, theme, config);
        let row = slot / columns;
        if row_heights.len() <= row {
            row_heights.push(0.0);
        }
        row_heights[row] = row_heights[row].max(plan.height);
        plans.push(plan);
    }

    // Second pass: positions. Row origins accumulate the preceding row
    // heights so a tall card never bleeds into the next row.
    let mut canvas = Canvas::default();
    let mut cards: HashMap<String, PlacedCard> = HashMap::new();
    for (slot, plan) in plans.iter().enumerate() {
        let column = slot % columns;
        let row = slot / columns;
        let x = column as f32 * (card_width + config.card_gap_x);
        let y: f32 = row_heights[..row]
            .iter()
            .map(|height| height + config.card_gap_y)
            .sum();
        canvas.nodes.push(CanvasNode::card(
            plan.id.clone(),
            plan.text.clone(),
            x,
            y,
            plan.width,
            plan.height,
            plan.color.clone(),
        ));
        cards.insert(plan.id.clone(), PlacedCard { x, y, phase: 0 });
    }

    canvas.edges = route_edges(
        &RoutingInput {
            phases: &[],
            cards: &cards,
            relations: &graph.edges,
            same_row_tolerance: config.same_row_tolerance,
        },
        theme,
    );
    canvas
}

fn layout_grouped(
    graph: &ClassifiedGraph,
    live: &[&GraphNode],
    card_width: f32,
    ctx: &CardContext,
    theme: &Theme,
    config: &LayoutConfig,
) -> Canvas {
    let phase_index: HashMap<&str, usize> = graph
        .phases
        .iter()
        .enumerate()
        .map(|(index, phase)| (phase.id.as_str(), index))
        .collect();

    let mut buckets: Vec<Vec<&GraphNode>> = vec![Vec::new(); graph.phases.len()];
    let mut orphans: Vec<&GraphNode> = Vec::new();
    for &node in live {
        match node.phase_id.as_deref().and_then(|id| phase_index.get(id)) {
            Some(&index) => buckets[index].push(node),
            None => orphans.push(node),
        }
    }

    // Active phases keep classifier order; phases nothing references are
    // dropped silently. Nodes naming an unknown phase survive in a trailing
    // untitled phase so no non-noise node ever falls off the board.
    let mut sections: Vec<(String, String, Vec<&GraphNode>)> = Vec::new();
    for (phase, members) in graph.phases.iter().zip(buckets) {
        if !members.is_empty() {
            sections.push((phase.id.clone(), phase.title.clone(), members));
        }
    }
    if !orphans.is_empty() {
        sections.push(("ungrouped".to_string(), String::new(), orphans));
    }

    // The hub is always rendered at the large size class, whatever the
    // classifier asked for.
    let hub_width = (card_width * config.large_scale).round();
    let mut plans = Vec::with_capacity(sections.len());
    for (index, (id, title, members)) in sections.iter().enumerate() {
        let hub = card_plan(members[0], index, 0, hub_width, ctx, theme, config);
        let satellites = members[1..]
            .iter()
            .enumerate()
            .map(|(slot, node)| {
                let width = size_width(node.size, card_width, config);
                card_plan(node, index, slot + 1, width, ctx, theme, config)
            })
            .collect();
        plans.push(PhasePlan {
            id: id.clone(),
            title: title.clone(),
            hub,
            satellites,
        });
    }

    let mut canvas = Canvas::default();
    let mut cards: HashMap<String, PlacedCard> = HashMap::new();
    let mut routed: Vec<RoutedPhase> = Vec::with_capacity(plans.len());
    let columns = config.group_columns.max(1);
    let mut cursor = GroupCursor::default();

    for (index, plan) in plans.iter().enumerate() {
        let placed = place_phase(plan, cursor.x, cursor.y, config);

        for (card, &(x, y)) in std::iter::once(&plan.hub)
            .chain(plan.satellites.iter())
            .zip(placed.positions.iter())
        {
            canvas.nodes.push(CanvasNode::card(
                card.id.clone(),
                card.text.clone(),
                x,
                y,
                card.width,
                card.height,
                card.color.clone(),
            ));
            cards.insert(card.id.clone(), PlacedCard { x, y, phase: index });
        }
        if !plan.title.is_empty() {
            canvas.nodes.push(CanvasNode::group(
                format!("group-{}", plan.id),
                plan.title.clone(),
                cursor.x,
                cursor.y,
                placed.width,
                placed.height,
                theme.group_color.clone(),
            ));
        }
        routed.push(RoutedPhase {
            hub: plan.hub.id.clone(),
            satellites: plan.satellites.iter().map(|satellite| satellite.id.clone()).collect(),
        });

        // Group tiling cursor: fill the row, then start the next one below
        // the tallest group of the row.
        cursor.row_height = cursor.row_height.max(placed.height);
        cursor.column += 1;
        if cursor.column >= columns {
            cursor.x = 0.0;
            cursor.y += cursor.row_height + config.group_gap_y;
            cursor.row_height = 0.0;
            cursor.column = 0;
        } else {
            cursor.x += placed.width + config.group_gap_x;
        }
    }

    canvas.edges = route_edges(
        &RoutingInput {
            phases: &routed,
            cards: &cards,
            relations: &graph.edges,
            same_row_tolerance: config.same_row_tolerance,
        },
        theme,
    );
    canvas
}

struct PlacedPhase {
    /// Hub position first, then satellites in grid order.
    positions: Vec<(f32, f32)>,
    width: f32,
    height: f32,
}

/// Packs one phase: hub centered on top, satellites in a fixed-column grid
/// beneath it, each satellite row centered within the inner content width.
fn place_phase(plan: &PhasePlan, phase_x: f32, phase_y: f32, config: &LayoutConfig) -> PlacedPhase {
    let columns = config.satellite_columns.max(1);
    let rows: Vec<&[CardPlan]> = plan.satellites.chunks(columns).collect();
    let row_width = |row: &[CardPlan]| -> f32 {
        row.iter().map(|card| card.width).sum::<f32>()
            + config.card_gap_x * row.len().saturating_sub(1) as f32
    };
    let inner_width = rows
        .iter()
        .map(|row| row_width(row))
        .fold(plan.hub.width, f32::max);

    let content_x = phase_x + config.group_padding;
    let content_y = phase_y + config.group_padding + config.group_title_band;

    let mut positions = Vec::with_capacity(plan.satellites.len() + 1);
    positions.push((content_x + (inner_width - plan.hub.width) / 2.0, content_y));
    let mut bottom = content_y + plan.hub.height;

    let mut row_y = bottom + config.card_gap_y;
    for row in &rows {
        let row_height = row.iter().map(|card| card.height).fold(0.0, f32::max);
        let mut x = content_x + (inner_width - row_width(row)) / 2.0;
        for card in row.iter() {
            positions.push((x, row_y));
            x += card.width + config.card_gap_x;
        }
        bottom = row_y + row_height;
        row_y = bottom + config.card_gap_y;
    }

    PlacedPhase {
        positions,
        width: inner_width + config.group_padding * 2.0,
        height: (bottom - phase_y) + config.group_padding,
    }
}

fn card_plan(
    node: &GraphNode,
    phase_index: usize,
    slot: usize,
    width: f32,
    ctx: &CardContext,
    theme: &Theme,
    config: &LayoutConfig,
) -> CardPlan {
    let id = if node.id.is_empty() {
        format!("node-{phase_index}-{slot}")
    } else {
        node.id.clone()
    };
    let text = build_card_content(node, ctx);
    let height = estimate_height(&text, width, &config.metrics);
    CardPlan {
        id,
        text,
        width,
        height,
        color: theme.resolve_card_color(node.color.as_deref()),
    }
}

fn size_width(size: Option<SizeClass>, card_width: f32, config: &LayoutConfig) -> f32 {
    let scale = match size.unwrap_or_default() {
        SizeClass::S => config.small_scale,
        SizeClass::M => 1.0,
        SizeClass::L => config.large_scale,
    };
    (card_width * scale).round()
}
