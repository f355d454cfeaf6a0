//! Policy constants shared across the workspace.

/// Number of top-risk groups averaged into the overall scan risk score.
/// A policy knob, not a derived invariant: the headline risk should
/// reflect the worst few issues without being diluted by the long tail
/// or dominated by a single outlier.
pub const TOP_GROUPS_FOR_SCORE: usize = 3;

/// Number of groups included in the compact (embedding-oriented) rendering.
pub const COMPACT_TOP_GROUPS: usize = 5;

/// Endpoints shown per group in the analyst rendering before `(+N more)`.
pub const ANALYST_ENDPOINT_PREVIEW: usize = 3;

/// Characters of preceding context scanned when classifying a code
/// block as vulnerable or fixed.
pub const CLASSIFY_CONTEXT_CHARS: usize = 200;

/// Default advisory page size requested from the feed.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Sentinel category id for rules absent from the taxonomy table.
pub const UNKNOWN_CATEGORY_ID: &str = "A00:unknown";
