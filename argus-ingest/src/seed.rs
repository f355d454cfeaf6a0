//! Seed the static category and weakness catalogs into a fresh store.
//!
//! Similarity search over the taxonomy tables needs embedded rows;
//! seeding runs once per store (upserts, so re-running is harmless).

use tracing::info;

use argus_core::errors::ArgusResult;
use argus_core::models::{CategoryRow, WeaknessRow};
use argus_core::taxonomy;
use argus_core::traits::{IEmbeddingProvider, IKnowledgeStore};

pub async fn seed_taxonomy(
    store: &dyn IKnowledgeStore,
    provider: &dyn IEmbeddingProvider,
) -> ArgusResult<(usize, usize)> {
    let categories = taxonomy::category_catalog();
    for (id, name, description) in &categories {
        let embedding = provider.embed(&format!("{name}: {description}")).await?;
        store.upsert_category(
            &CategoryRow {
                id: (*id).to_string(),
                name: (*name).to_string(),
                description: (*description).to_string(),
            },
            &embedding,
        )?;
    }

    let weaknesses = taxonomy::weakness_catalog();
    for (id, name, description, mitigation) in &weaknesses {
        let embedding = provider
            .embed(&format!("{name} ({id}): {description} {mitigation}"))
            .await?;
        store.upsert_weakness(
            &WeaknessRow {
                id: (*id).to_string(),
                name: (*name).to_string(),
                description: (*description).to_string(),
                mitigation: (*mitigation).to_string(),
            },
            &embedding,
        )?;
    }

    info!(
        categories = categories.len(),
        weaknesses = weaknesses.len(),
        "taxonomy seeded"
    );
    Ok((categories.len(), weaknesses.len()))
}
