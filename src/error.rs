use thiserror::Error;

/// Structural contract violations surfaced by graph ingestion.
///
/// Everything else the classifier gets wrong (missing sizes, unknown phase
/// ids, dangling relation endpoints) is absorbed with defaults downstream;
/// only a payload the engine cannot shape at all is reported to the caller.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("classifier response contains no JSON payload")]
    MissingPayload,

    #[error("`nodes` is missing or not an array")]
    InvalidNodes,

    #[error("failed to parse classifier JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
