//! Port traits for the external stage collaborators.
//!
//! The research, analysis, and writing stages are model- or search-backed
//! collaborators. Their only visible surface to the core is "given the
//! accumulated context, return this stage's structured output"; transport,
//! prompts, and providers never appear here. Infrastructure adapters
//! implement these traits — the `stages` crate ships scripted replay
//! implementations, and live providers are added as new adapters without
//! touching this crate.
//!
//! The aggregation stage has no port: ranking is deterministic and lives in
//! [`crate::ranking`].

use async_trait::async_trait;

use crate::errors::StageError;
use crate::types::{AppBrief, KeywordSet, ListingDraft};

/// Produces the tiered keyword set for a brief.
#[async_trait]
pub trait KeywordResearcher: Send + Sync {
    /// Researches keywords for `brief` and tiers them by priority.
    async fn research(&self, brief: &AppBrief) -> Result<KeywordSet, StageError>;
}

/// Summarises the competitive landscape into actionable notes.
#[async_trait]
pub trait CompetitorAnalyst: Send + Sync {
    /// Analyses competitors for `brief`, informed by the researched
    /// `keywords`. Each returned note is one standalone insight.
    async fn analyze(
        &self,
        brief: &AppBrief,
        keywords: &KeywordSet,
    ) -> Result<Vec<String>, StageError>;
}

/// Drafts candidate listings from the accumulated research.
#[async_trait]
pub trait ContentWriter: Send + Sync {
    /// Writes one or more listing variants from the brief, the keyword set,
    /// and the competitor notes.
    async fn write(
        &self,
        brief: &AppBrief,
        keywords: &KeywordSet,
        competitor_notes: &[String],
    ) -> Result<Vec<ListingDraft>, StageError>;
}
