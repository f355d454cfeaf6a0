//! Fenced code-block extraction and vulnerable/fixed classification.

use argus_core::constants::CLASSIFY_CONTEXT_CHARS;
use argus_core::models::{Advisory, CodeExampleRow, ExampleKind};

/// One fenced block with the prose that precedes it.
#[derive(Debug, Clone, PartialEq)]
pub struct FencedBlock {
    /// Fence info string, lowercased; "text" when absent.
    pub language: String,
    pub content: String,
    /// Up to [`CLASSIFY_CONTEXT_CHARS`] chars immediately before the fence.
    pub context: String,
}

/// Extract fenced code blocks from a markdown body. An unterminated
/// fence is dropped rather than swallowing the rest of the document.
pub fn extract_blocks(markdown: &str) -> Vec<FencedBlock> {
    let mut blocks = Vec::new();
    let mut search_from = 0;

    while let Some(rel) = markdown[search_from..].find("```") {
        let fence_start = search_from + rel;
        let info_start = fence_start + 3;
        let info_end = markdown[info_start..]
            .find('\n')
            .map(|i| info_start + i)
            .unwrap_or(markdown.len());
        let language = markdown[info_start..info_end].trim().to_lowercase();

        let body_start = (info_end + 1).min(markdown.len());
        let Some(close_rel) = markdown[body_start..].find("```") else {
            break;
        };
        let body_end = body_start + close_rel;

        let content = markdown[body_start..body_end].trim_end().to_string();
        if !content.trim().is_empty() {
            let context: String = markdown[..fence_start]
                .chars()
                .rev()
                .take(CLASSIFY_CONTEXT_CHARS)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            blocks.push(FencedBlock {
                language: if language.is_empty() {
                    "text".to_string()
                } else {
                    language
                },
                content,
                context,
            });
        }
        search_from = body_end + 3;
    }
    blocks
}

/// Classify a block from its preceding context.
///
/// Vocabulary-cue heuristic carried over from the original feed
/// tooling: fixed/patch wording wins over exploit wording, and
/// anything ambiguous defaults to vulnerable. Known to misfile blocks
/// whose cue appears after the fence; the tests pin that behavior.
pub fn classify(context: &str) -> ExampleKind {
    let context = context.to_lowercase();
    const FIXED_CUES: &[&str] = &[
        "fix", "patch", "remediat", "corrected", "safe version", "after upgrading", "instead use",
        "mitigation",
    ];
    const EXPLOIT_CUES: &[&str] = &["exploit", "proof of concept", "poc", "payload", "attacker can"];

    if FIXED_CUES.iter().any(|cue| context.contains(cue)) {
        return ExampleKind::Fixed;
    }
    if EXPLOIT_CUES.iter().any(|cue| context.contains(cue)) {
        return ExampleKind::Exploit;
    }
    ExampleKind::Vulnerable
}

/// Candidate examples for one advisory: one per (block × weakness id),
/// each carrying the blake3 content hash used as the dedup key.
pub fn candidates(advisory: &Advisory) -> Vec<CodeExampleRow> {
    let blocks = extract_blocks(&advisory.description);
    let mut out = Vec::with_capacity(blocks.len() * advisory.weakness_ids.len());
    for block in &blocks {
        let kind = classify(&block.context);
        let content_hash = blake3::hash(block.content.as_bytes()).to_hex().to_string();
        for weakness_id in &advisory.weakness_ids {
            out.push(CodeExampleRow {
                advisory_id: advisory.id.clone(),
                weakness_id: weakness_id.clone(),
                kind,
                language: block.language.clone(),
                content: block.content.clone(),
                content_hash: content_hash.clone(),
                ecosystem: advisory.ecosystem.clone(),
            });
        }
    }
    out
}
