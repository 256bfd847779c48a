//! Scripted replay collaborators.
//!
//! Each implementation returns pre-recorded stage output, so the full
//! pipeline contract — state ordering, inline validation, ranking — runs
//! offline. The CLI's `replay` subcommand and the integration tests both
//! drive the real machinery through these.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use pipeline::{
    AppBrief, CompetitorAnalyst, ContentWriter, KeywordResearcher, KeywordSet, ListingDraft,
    StageError,
};

/// Replays a pre-recorded keyword set.
#[derive(Debug, Clone)]
pub struct ScriptedResearcher {
    keyword_set: KeywordSet,
}

impl ScriptedResearcher {
    pub fn new(keyword_set: KeywordSet) -> Self {
        Self { keyword_set }
    }
}

#[async_trait]
impl KeywordResearcher for ScriptedResearcher {
    async fn research(&self, _brief: &AppBrief) -> Result<KeywordSet, StageError> {
        Ok(self.keyword_set.clone())
    }
}

/// Replays pre-recorded competitor notes.
#[derive(Debug, Clone)]
pub struct ScriptedAnalyst {
    notes: Vec<String>,
}

impl ScriptedAnalyst {
    pub fn new(notes: Vec<String>) -> Self {
        Self { notes }
    }
}

#[async_trait]
impl CompetitorAnalyst for ScriptedAnalyst {
    async fn analyze(
        &self,
        _brief: &AppBrief,
        _keywords: &KeywordSet,
    ) -> Result<Vec<String>, StageError> {
        Ok(self.notes.clone())
    }
}

/// Replays pre-recorded listing drafts.
#[derive(Debug, Clone)]
pub struct ScriptedWriter {
    drafts: Vec<ListingDraft>,
}

impl ScriptedWriter {
    pub fn new(drafts: Vec<ListingDraft>) -> Self {
        Self { drafts }
    }
}

#[async_trait]
impl ContentWriter for ScriptedWriter {
    async fn write(
        &self,
        _brief: &AppBrief,
        _keywords: &KeywordSet,
        _competitor_notes: &[String],
    ) -> Result<Vec<ListingDraft>, StageError> {
        Ok(self.drafts.clone())
    }
}

// ---------------------------------------------------------------------------

/// A full pre-recorded run: the brief plus the three stage outputs.
///
/// Deserialised from a replay file; splitting it yields one scripted
/// collaborator per stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayScript {
    pub brief: AppBrief,
    pub keyword_set: KeywordSet,
    pub competitor_notes: Vec<String>,
    pub drafts: Vec<ListingDraft>,
}

impl ReplayScript {
    /// Splits the script into the brief and its scripted collaborators.
    pub fn into_collaborators(
        self,
    ) -> (
        AppBrief,
        ScriptedResearcher,
        ScriptedAnalyst,
        ScriptedWriter,
    ) {
        (
            self.brief,
            ScriptedResearcher::new(self.keyword_set),
            ScriptedAnalyst::new(self.competitor_notes),
            ScriptedWriter::new(self.drafts),
        )
    }
}
