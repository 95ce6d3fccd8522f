pub mod canvas;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod content;
pub mod error;
pub mod graph;
pub mod layout;
pub mod policy;
pub mod text_metrics;
pub mod theme;

pub use canvas::{Canvas, CanvasEdge, CanvasNode, Side, write_canvas};
pub use config::{Config, LayoutConfig, load_config};
pub use content::{CardContext, FileMap, build_card_content, smart_trim};
pub use error::GraphError;
pub use graph::{ClassifiedGraph, parse_classified_graph};
pub use layout::compute_layout;
pub use policy::{GraphMode, GraphPolicy};
pub use text_metrics::estimate_height;
pub use theme::Theme;

#[cfg(feature = "cli")]
pub use cli::run;

/// Full pipeline over a raw classifier response: ingestion, density policy,
/// content shaping, height estimation, spatial layout, edge routing.
///
/// `raw_count` is the number of source conversation items; the density
/// policy falls back to the node count when the caller doesn't know it.
/// Passing no config derives the layout tunables from the effective mode
/// (the response's meta echo wins over the computed policy).
pub fn generate_canvas(
    raw: &str,
    ctx: &CardContext,
    raw_count: Option<usize>,
    config: Option<&Config>,
) -> Result<Canvas, GraphError> {
    let graph = parse_classified_graph(raw)?;
    let policy = GraphPolicy::for_item_count(raw_count.unwrap_or(graph.nodes.len()));

    let derived;
    let config = match config {
        Some(config) => config,
        None => {
            let mode = graph
                .meta
                .as_ref()
                .and_then(|meta| meta.mode)
                .unwrap_or(policy.mode);
            derived = Config {
                theme: Theme::canvas_default(),
                layout: LayoutConfig::for_mode(mode),
            };
            &derived
        }
    };

    Ok(compute_layout(&graph, &policy, ctx, &config.theme, &config.layout))
}
