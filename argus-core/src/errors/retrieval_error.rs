/// Retrieval subsystem errors.
///
/// Most retrieval failures degrade in place (logged, replaced with an
/// empty result set); these variants cover the few that reach a caller.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("sub-query failed: {reason}")]
    SearchFailed { reason: String },

    #[error("re-ranking failed: {reason}")]
    RankingFailed { reason: String },

    #[error("fetch task panicked: {reason}")]
    TaskFailed { reason: String },
}
