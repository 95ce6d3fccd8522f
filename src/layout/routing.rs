//! Edge routing over placed cards. Three edge families: intra-phase spokes,
//! classifier relations under the gateway rule (cross-phase relations are
//! upscaled to the two phase hubs), and sequential fallback flow when the
//! classifier supplied no relations at all.

use std::collections::{HashMap, HashSet};

use crate::canvas::{CanvasEdge, Side};
use crate::graph::Relation;
use crate::theme::Theme;

use super::types::{PlacedCard, RoutedPhase};

pub(super) struct RoutingInput<'a> {
    /// Active phases in layout order; empty in ungrouped mode.
    pub phases: &'a [RoutedPhase],
    /// Canvas id -> placed geometry for every card.
    pub cards: &'a HashMap<String, PlacedCard>,
    pub relations: &'a [Relation],
    pub same_row_tolerance: f32,
}

pub(super) fn route_edges(input: &RoutingInput<'_>, theme: &Theme) -> Vec<CanvasEdge> {
    let mut edges = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    // Family 1: hub -> satellite spokes. Seeded into the dedup set so a
    // classifier relation restating a spoke is not drawn twice.
    for phase in input.phases {
        for satellite in &phase.satellites {
            seen.insert((phase.hub.clone(), satellite.clone()));
            edges.push(CanvasEdge {
                id: format!("edge-spoke-{}-{}", phase.hub, satellite),
                from: phase.hub.clone(),
                to: satellite.clone(),
                from_side: Side::Bottom,
                to_side: Side::Top,
                color: theme.spoke_color.clone(),
                label: None,
            });
        }
    }

    // Family 2: classifier relations. Endpoints that resolve to different
    // phases are redirected onto the two phase hubs; duplicates after
    // redirection collapse onto the first occurrence.
    for (index, relation) in input.relations.iter().enumerate() {
        let Some(from) = input.cards.get(&relation.from) else {
            continue;
        };
        let Some(to) = input.cards.get(&relation.to) else {
            continue;
        };

        let (from_id, to_id, from_side, to_side, color) = if from.phase == to.phase {
            (
                relation.from.clone(),
                relation.to.clone(),
                Side::Bottom,
                Side::Top,
                theme.spoke_color.clone(),
            )
        } else {
            let from_hub = &input.phases[from.phase].hub;
            let to_hub = &input.phases[to.phase].hub;
            let (from_side, to_side) = hub_sides(
                input.cards[from_hub].y,
                input.cards[to_hub].y,
                input.same_row_tolerance,
            );
            (
                from_hub.clone(),
                to_hub.clone(),
                from_side,
                to_side,
                theme.flow_color.clone(),
            )
        };

        if from_id == to_id {
            continue;
        }
        if !seen.insert((from_id.clone(), to_id.clone())) {
            continue;
        }
        edges.push(CanvasEdge {
            id: format!("edge-rel-{index}"),
            from: from_id,
            to: to_id,
            from_side,
            to_side,
            color,
            label: relation.label.clone(),
        });
    }

    // Family 3: with no classifier relations at all, chain the phase hubs in
    // reading order so the board still flows.
    if input.relations.is_empty() {
        for (index, pair) in input.phases.windows(2).enumerate() {
            edges.push(CanvasEdge {
                id: format!("edge-flow-{index}"),
                from: pair[0].hub.clone(),
                to: pair[1].hub.clone(),
                from_side: Side::Right,
                to_side: Side::Left,
                color: theme.flow_color.clone(),
                label: None,
            });
        }
    }

    edges
}

/// Connection sides for a hub-to-hub edge, from the hubs' relative vertical
/// position: a target above the source loops around the right side, targets
/// on the same group row connect left-to-right, everything else flows
/// top-to-bottom.
fn hub_sides(from_y: f32, to_y: f32, tolerance: f32) -> (Side, Side) {
    if (to_y - from_y).abs() <= tolerance {
        (Side::Right, Side::Left)
    } else if to_y < from_y {
        (Side::Right, Side::Right)
    } else {
        (Side::Bottom, Side::Top)
    }
}
