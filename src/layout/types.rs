//! Internal records threaded through one layout invocation. Nothing here
//! survives past producing the output payload.

/// A shaped, measured card waiting for a position.
#[derive(Debug, Clone)]
pub struct CardPlan {
    pub id: String,
    pub text: String,
    pub width: f32,
    pub height: f32,
    pub color: String,
}

/// Hub/satellite split of one active phase.
///
/// The hub contract is positional: the first non-noise node listed for a
/// phase anchors it. Upstream data carries no explicit hub marker today; if
/// it grows one, it replaces this selection without touching the router.
#[derive(Debug)]
pub struct PhasePlan {
    pub id: String,
    pub title: String,
    pub hub: CardPlan,
    pub satellites: Vec<CardPlan>,
}

/// Final geometry of a card, kept for the router after the canvas nodes are
/// emitted.
#[derive(Debug, Clone, Copy)]
pub struct PlacedCard {
    pub x: f32,
    pub y: f32,
    /// Index into the active-phase list (0 in ungrouped mode).
    pub phase: usize,
}

/// Hub and satellite ids of one placed phase, in layout order.
#[derive(Debug, Clone)]
pub struct RoutedPhase {
    pub hub: String,
    pub satellites: Vec<String>,
}

/// Group tiling cursor. Owned by a single layout call; phase placement is a
/// fold over this value, never shared state.
#[derive(Debug, Default, Clone, Copy)]
pub struct GroupCursor {
    pub x: f32,
    pub y: f32,
    pub row_height: f32,
    pub column: usize,
}
