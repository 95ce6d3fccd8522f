use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use logicmap::config::LayoutConfig;
use logicmap::content::CardContext;
use logicmap::graph::parse_classified_graph;
use logicmap::policy::GraphPolicy;
use logicmap::theme::Theme;
use logicmap::{compute_layout, generate_canvas};
use std::hint::black_box;

fn dense_graph_source(phases: usize, nodes_per_phase: usize, extra_edges: usize) -> String {
    let mut phase_list = Vec::new();
    for p in 0..phases {
        phase_list.push(format!(
            r#"{{"id": "p{p}", "title": "Phase {}: Stage"}}"#,
            p + 1
        ));
    }

    let mut nodes = Vec::new();
    for p in 0..phases {
        for n in 0..nodes_per_phase {
            let index = p * nodes_per_phase + n;
            nodes.push(format!(
                r#"{{"id": "n{index}", "phase_id": "p{p}", "emoji": "🔹", "label": "Topic {index}", "canvas_summary": "• Wired [[Module {index}]] into the pipeline\n• Covered edge cases with tests", "qa_indices": [{index}]}}"#
            ));
        }
    }

    let total = phases * nodes_per_phase;
    let mut edges = Vec::new();
    for index in 0..extra_edges.min(total.saturating_sub(2)) {
        edges.push(format!(
            r#"{{"from": "n{}", "to": "n{}"}}"#,
            index,
            (index + 2) % total
        ));
    }

    format!(
        r#"{{"phases": [{}], "nodes": [{}], "edges": [{}]}}"#,
        phase_list.join(","),
        nodes.join(","),
        edges.join(",")
    )
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    for (phases, per_phase) in [(2usize, 5usize), (6, 8), (10, 12)] {
        let source = dense_graph_source(phases, per_phase, phases * per_phase / 2);
        let graph = parse_classified_graph(&source).unwrap();
        let policy = GraphPolicy::for_item_count(graph.nodes.len() * 3);
        let ctx = CardContext::default();
        let theme = Theme::canvas_default();
        let config = LayoutConfig::default();

        group.bench_with_input(
            BenchmarkId::new("compute", phases * per_phase),
            &graph,
            |b, graph| {
                b.iter(|| black_box(compute_layout(graph, &policy, &ctx, &theme, &config)));
            },
        );
    }
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let source = dense_graph_source(6, 8, 24);
    let ctx = CardContext::default();
    c.bench_function("pipeline/parse_and_layout", |b| {
        b.iter(|| black_box(generate_canvas(black_box(&source), &ctx, Some(160), None).unwrap()));
    });
}

criterion_group!(benches, bench_layout, bench_pipeline);
criterion_main!(benches);
