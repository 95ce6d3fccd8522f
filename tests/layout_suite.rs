use std::collections::BTreeSet;
use std::path::Path;

use logicmap::canvas::{Canvas, CanvasNode, Side};
use logicmap::config::{Config, LayoutConfig};
use logicmap::content::{CardContext, FileMap};
use logicmap::graph::{FileMapping, parse_classified_graph};
use logicmap::policy::GraphPolicy;
use logicmap::theme::Theme;
use logicmap::{GraphError, compute_layout, generate_canvas};

fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path).expect("fixture read failed")
}

fn mapping(count: usize) -> Vec<FileMapping> {
    let entries: Vec<serde_json::Value> = (1..=count)
        .map(|index| {
            serde_json::json!({
                "index": index,
                "fileName": format!("{index:03}-20260101-1200.md"),
            })
        })
        .collect();
    serde_json::from_value(serde_json::Value::Array(entries)).unwrap()
}

fn session_ctx(files: usize) -> CardContext {
    CardContext {
        session_title: "Session".to_string(),
        base_path: "Vault".to_string(),
        files: FileMap::from_mapping(&mapping(files)),
    }
}

fn layout_fixture(name: &str) -> Canvas {
    let raw = load_fixture(name);
    let graph = parse_classified_graph(&raw).expect("fixture parse failed");
    let policy = GraphPolicy::for_item_count(graph.nodes.len());
    compute_layout(
        &graph,
        &policy,
        &session_ctx(20),
        &Theme::canvas_default(),
        &LayoutConfig::default(),
    )
}

fn overlaps(a: &CanvasNode, b: &CanvasNode) -> bool {
    a.x < b.x + b.width && b.x < a.x + a.width && a.y < b.y + b.height && b.y < a.y + a.height
}

fn strictly_contains(group: &CanvasNode, card: &CanvasNode) -> bool {
    card.x > group.x
        && card.y > group.y
        && card.x + card.width < group.x + group.width
        && card.y + card.height < group.y + group.height
}

/// Structural invariants every well-formed fixture layout must satisfy.
fn assert_valid_canvas(canvas: &Canvas, raw: &str, fixture: &str) {
    let graph = parse_classified_graph(raw).expect("fixture parse failed");

    // Card ids are a bijection over the non-noise graph nodes.
    let expected: BTreeSet<&str> = graph
        .nodes
        .iter()
        .filter(|node| !node.is_noise())
        .map(|node| node.id.as_str())
        .collect();
    let actual: BTreeSet<&str> = canvas.cards().map(|card| card.id.as_str()).collect();
    assert_eq!(actual, expected, "{fixture}: card/node bijection broken");

    let ids: BTreeSet<&str> = canvas.nodes.iter().map(|node| node.id.as_str()).collect();
    for edge in &canvas.edges {
        assert!(ids.contains(edge.from.as_str()), "{fixture}: edge {} has dangling from", edge.id);
        assert!(ids.contains(edge.to.as_str()), "{fixture}: edge {} has dangling to", edge.id);
    }

    for node in &canvas.nodes {
        assert!(node.x >= 0 && node.y >= 0, "{fixture}: negative origin on {}", node.id);
        assert!(node.width > 0 && node.height > 0, "{fixture}: degenerate box on {}", node.id);
    }

    // Cards never overlap each other.
    let cards: Vec<&CanvasNode> = canvas.cards().collect();
    for (i, a) in cards.iter().enumerate() {
        for b in cards.iter().skip(i + 1) {
            assert!(!overlaps(a, b), "{fixture}: cards {} and {} overlap", a.id, b.id);
        }
    }

    // A group box either strictly contains a card or doesn't touch it, and
    // always holds at least one card.
    for group in canvas.groups() {
        let mut members = 0;
        for card in &cards {
            if overlaps(group, card) {
                assert!(
                    strictly_contains(group, card),
                    "{fixture}: card {} crosses the border of {}",
                    card.id,
                    group.id
                );
                members += 1;
            }
        }
        assert!(members > 0, "{fixture}: empty group {}", group.id);
    }
}

#[test]
fn layout_all_fixtures() {
    // Keep this list explicit so new fixture shapes are added intentionally.
    let fixtures = [
        "simple.json",
        "story.json",
        "satellites.json",
        "fallback.json",
        "orphan.json",
        "truncated.txt",
    ];

    for fixture in fixtures {
        let raw = load_fixture(fixture);
        let canvas = layout_fixture(fixture);
        assert!(!canvas.is_empty(), "{fixture}: empty canvas");
        assert_valid_canvas(&canvas, &raw, fixture);
    }
}

#[test]
fn simple_fixture_stays_ungrouped() {
    let canvas = layout_fixture("simple.json");
    assert_eq!(canvas.groups().count(), 0);
    // Four signal cards; the noise node never becomes a canvas entity.
    assert_eq!(canvas.cards().count(), 4);
    assert!(canvas.cards().all(|card| card.width == 360));
    // No phases means no hubs: no spokes and no fallback flow.
    assert!(canvas.edges.is_empty());
}

#[test]
fn story_fixture_routes_through_hubs() {
    let canvas = layout_fixture("story.json");

    // Hub-to-hub upscaling: n2->n4 and n3->n4 both land on the (n1, n4)
    // hub pair and collapse into one edge.
    let hub_edges: Vec<_> = canvas
        .edges
        .iter()
        .filter(|edge| edge.from == "n1" && edge.to == "n4")
        .collect();
    assert_eq!(hub_edges.len(), 1);
    assert_eq!(hub_edges[0].from_side, Side::Right);
    assert_eq!(hub_edges[0].to_side, Side::Left);
    assert!(!canvas.edges.iter().any(|edge| edge.from == "n3" && edge.to == "n4"));

    // Same-phase relations stay on the original endpoints and keep labels.
    let direct = canvas
        .edges
        .iter()
        .find(|edge| edge.from == "n2" && edge.to == "n3")
        .expect("direct same-phase edge missing");
    assert_eq!(direct.label.as_deref(), Some("led to"));

    // A relation restating an existing spoke is not drawn twice.
    let n1_to_n2: Vec<_> = canvas
        .edges
        .iter()
        .filter(|edge| edge.from == "n1" && edge.to == "n2")
        .collect();
    assert_eq!(n1_to_n2.len(), 1);
    assert!(n1_to_n2[0].id.starts_with("edge-spoke-"));

    // 3 spokes + 1 hub pair + 1 direct relation; the dangling n9 relation
    // is dropped silently and no fallback flow is added.
    assert_eq!(canvas.edges.len(), 5);

    // Hubs are forced to the large size class (simple-tier width 360 * 1.25).
    let hub = canvas.cards().find(|card| card.id == "n1").unwrap();
    assert_eq!(hub.width, 450);
    // Classifier color tags pass through when they name a palette entry.
    let tagged = canvas.cards().find(|card| card.id == "n4").unwrap();
    assert_eq!(tagged.color, "5");

    // The nine-index footer renders six links and an overflow counter.
    let text = tagged.text.as_deref().unwrap();
    assert_eq!(text.matches("[[Vault/Session/").count(), 6);
    assert!(text.contains("+3more"));
}

#[test]
fn seven_satellites_pack_into_three_rows() {
    let canvas = layout_fixture("satellites.json");
    let satellites: Vec<_> = canvas.cards().filter(|card| card.id != "hub").collect();
    assert_eq!(satellites.len(), 7);

    let rows: BTreeSet<i64> = satellites.iter().map(|card| card.y).collect();
    assert_eq!(rows.len(), 3, "expected ceil(7/3) satellite rows");

    let hub = canvas.cards().find(|card| card.id == "hub").unwrap();
    assert!(satellites.iter().all(|card| card.y > hub.y + hub.height));

    // Group height runs from the phase top to the lowest card bottom plus
    // the padding margin.
    let group = canvas.groups().next().expect("group box missing");
    let config = LayoutConfig::default();
    let lowest = canvas.cards().map(|card| card.y + card.height).max().unwrap();
    let expected = lowest - group.y + config.group_padding as i64;
    assert!((group.height - expected).abs() <= 1);
}

#[test]
fn fallback_flow_chains_phase_hubs() {
    let canvas = layout_fixture("fallback.json");
    let flows: Vec<_> = canvas
        .edges
        .iter()
        .filter(|edge| edge.id.starts_with("edge-flow-"))
        .collect();
    assert_eq!(flows.len(), 2);
    assert_eq!((flows[0].from.as_str(), flows[0].to.as_str()), ("a", "b"));
    assert_eq!((flows[1].from.as_str(), flows[1].to.as_str()), ("b", "c"));
    for flow in flows {
        assert_eq!(flow.from_side, Side::Right);
        assert_eq!(flow.to_side, Side::Left);
    }
}

#[test]
fn orphan_nodes_keep_their_relations() {
    let canvas = layout_fixture("orphan.json");
    assert_eq!(canvas.cards().count(), 3);
    // Only the titled phase draws a box; the synthetic orphan phase doesn't.
    assert_eq!(canvas.groups().count(), 1);
    // n1 and n2 resolved to different phases, so the relation runs hub to hub;
    // both happen to be their phase's hub here.
    assert!(canvas.edges.iter().any(|edge| edge.from == "n1" && edge.to == "n2"));
}

#[test]
fn truncated_response_still_lays_out() {
    let canvas = layout_fixture("truncated.txt");
    assert_eq!(canvas.cards().count(), 3);
    assert_eq!(canvas.groups().count(), 2);
    let fixed = canvas.cards().find(|card| card.id == "n3").unwrap();
    assert!(fixed.text.as_deref().unwrap().contains("Serialized the writers"));
}

#[test]
fn pipeline_is_deterministic() {
    let raw = load_fixture("story.json");
    let ctx = session_ctx(20);
    let first = generate_canvas(&raw, &ctx, Some(40), None).unwrap();
    let second = generate_canvas(&raw, &ctx, Some(40), None).unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn malformed_input_is_distinct_from_empty_output() {
    let ctx = CardContext::default();

    // Contract violation: nodes is not a sequence.
    let err = generate_canvas(r#"{"nodes": 42}"#, &ctx, None, None).unwrap_err();
    assert!(matches!(err, GraphError::InvalidNodes));

    // No payload at all.
    let err = generate_canvas("nothing to see here", &ctx, None, None).unwrap_err();
    assert!(matches!(err, GraphError::MissingPayload));

    // Geometric degeneracy: all nodes noise is an empty, well-formed canvas.
    let canvas = generate_canvas(
        r#"{"nodes": [{"id": "n1", "type": "noise"}]}"#,
        &ctx,
        None,
        None,
    )
    .unwrap();
    assert!(canvas.is_empty());
}

#[test]
fn config_overrides_apply() {
    let raw = load_fixture("fallback.json");
    let mut config = Config::default();
    config.layout.group_columns = 1;
    let canvas = generate_canvas(&raw, &CardContext::default(), None, Some(&config)).unwrap();

    // One group per row: every group starts at x = 0 and rows stack.
    let groups: Vec<_> = canvas.groups().collect();
    assert_eq!(groups.len(), 3);
    assert!(groups.iter().all(|group| group.x == 0));
    assert!(groups[0].y < groups[1].y && groups[1].y < groups[2].y);
}
