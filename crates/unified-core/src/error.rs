/// Error types shared by the reconciliation core and the server crate.
///
/// The pipeline itself degrades instead of failing (no match, malformed entries and
/// short content are all substituted). The only errors that surface are failures
/// of the upstream mapping fetch, which propagate to the caller unchanged.

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("mapping document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("upstream mapping fetch failed: {0}")]
    Upstream(String),
}
