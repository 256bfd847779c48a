//! The session state one pipeline run accumulates.
//!
//! Stages write strictly in order: keyword research, then competitor
//! analysis, then content generation (one or more validated drafts,
//! append-only), then the final recommendation. A later stage may read every
//! earlier field but never rewrite one; a write out of sequence is an
//! [`AsoWorksError::OutOfOrderWrite`] and fatal to the run.
//!
//! The state is single-writer: the active run owns it by value, and nothing
//! here provides interior mutability. The validator and ranker themselves
//! are pure and may be called from any thread.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::compliance::ValidationReport;
use crate::errors::AsoWorksError;
use crate::identifiers::PipelineRunId;
use crate::ranking::RecommendationRecord;
use crate::types::{AppBrief, KeywordSet, ListingDraft, Platform, Timestamp};

// ---------------------------------------------------------------------------
// Stage vocabulary
// ---------------------------------------------------------------------------

/// The four stages of a run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    KeywordResearch,
    CompetitorAnalysis,
    ContentGeneration,
    Aggregation,
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageKind::KeywordResearch => write!(f, "keyword research"),
            StageKind::CompetitorAnalysis => write!(f, "competitor analysis"),
            StageKind::ContentGeneration => write!(f, "content generation"),
            StageKind::Aggregation => write!(f, "aggregation"),
        }
    }
}

// ---------------------------------------------------------------------------

/// Where a run currently is in the stage sequence.
///
/// [`Phase::ContentGeneration`] and [`Phase::Aggregation`] overlap on
/// purpose: once at least one draft has landed, further drafts may still be
/// appended until the recommendation is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No keyword set yet; only the keyword-research stage may write.
    KeywordResearch,
    /// Keywords recorded; awaiting competitor notes.
    CompetitorAnalysis,
    /// Notes recorded; awaiting the first draft.
    ContentGeneration,
    /// At least one draft recorded; more drafts or the recommendation may land.
    Aggregation,
    /// Recommendation written; the state is terminal.
    Complete,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::KeywordResearch => write!(f, "keyword research"),
            Phase::CompetitorAnalysis => write!(f, "competitor analysis"),
            Phase::ContentGeneration => write!(f, "content generation"),
            Phase::Aggregation => write!(f, "aggregation"),
            Phase::Complete => write!(f, "complete"),
        }
    }
}

// ---------------------------------------------------------------------------
// Draft slots
// ---------------------------------------------------------------------------

/// A draft together with one validation report per target platform.
///
/// This is the unit the content-generation stage appends and the ranker
/// consumes. The draft is immutable once it occupies a slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedDraft {
    /// The candidate listing.
    pub draft: ListingDraft,
    /// One report per target platform, keyed by platform.
    pub reports: BTreeMap<Platform, ValidationReport>,
}

impl ValidatedDraft {
    /// `true` if every platform report passed.
    pub fn passed_everywhere(&self) -> bool {
        self.reports.values().all(|r| r.passed)
    }

    /// Blocking violations summed across all platform reports.
    pub fn total_issues(&self) -> usize {
        self.reports.values().map(|r| r.issues.len()).sum()
    }

    /// Warnings summed across all platform reports.
    pub fn total_warnings(&self) -> usize {
        self.reports.values().map(|r| r.warnings.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Ordered accumulator for one run.
///
/// Fields populate strictly in stage order; setters reject anything else
/// with [`AsoWorksError::OutOfOrderWrite`]. `drafts` is append-only, every
/// other field is write-once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineState {
    run_id: PipelineRunId,
    started_at: Timestamp,
    brief: AppBrief,
    keyword_set: Option<KeywordSet>,
    competitor_notes: Option<Vec<String>>,
    drafts: Vec<ValidatedDraft>,
    recommendation: Option<RecommendationRecord>,
}

impl PipelineState {
    /// Opens a fresh state for `brief` under a new run id.
    pub fn new(brief: AppBrief) -> Self {
        Self {
            run_id: PipelineRunId::new_random(),
            started_at: Timestamp::now(),
            brief,
            keyword_set: None,
            competitor_notes: None,
            drafts: Vec::new(),
            recommendation: None,
        }
    }

    pub fn run_id(&self) -> PipelineRunId {
        self.run_id
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    pub fn brief(&self) -> &AppBrief {
        &self.brief
    }

    pub fn keyword_set(&self) -> Option<&KeywordSet> {
        self.keyword_set.as_ref()
    }

    pub fn competitor_notes(&self) -> Option<&[String]> {
        self.competitor_notes.as_deref()
    }

    pub fn drafts(&self) -> &[ValidatedDraft] {
        &self.drafts
    }

    pub fn recommendation(&self) -> Option<&RecommendationRecord> {
        self.recommendation.as_ref()
    }

    /// The phase the next write must belong to.
    pub fn phase(&self) -> Phase {
        if self.keyword_set.is_none() {
            Phase::KeywordResearch
        } else if self.competitor_notes.is_none() {
            Phase::CompetitorAnalysis
        } else if self.drafts.is_empty() {
            Phase::ContentGeneration
        } else if self.recommendation.is_none() {
            Phase::Aggregation
        } else {
            Phase::Complete
        }
    }

    /// `true` once the recommendation has been written.
    pub fn is_complete(&self) -> bool {
        matches!(self.phase(), Phase::Complete)
    }

    /// Records the keyword-research output. Write-once.
    pub fn set_keyword_set(&mut self, keyword_set: KeywordSet) -> Result<(), AsoWorksError> {
        if self.phase() != Phase::KeywordResearch {
            return Err(self.out_of_order(StageKind::KeywordResearch));
        }
        tracing::debug!(
            run_id = %self.run_id,
            primary = keyword_set.primary().len(),
            secondary = keyword_set.secondary().len(),
            long_tail = keyword_set.long_tail().len(),
            "keyword set recorded"
        );
        self.keyword_set = Some(keyword_set);
        Ok(())
    }

    /// Records the competitor-analysis notes. Write-once.
    pub fn set_competitor_notes(&mut self, notes: Vec<String>) -> Result<(), AsoWorksError> {
        if self.phase() != Phase::CompetitorAnalysis {
            return Err(self.out_of_order(StageKind::CompetitorAnalysis));
        }
        tracing::debug!(run_id = %self.run_id, notes = notes.len(), "competitor notes recorded");
        self.competitor_notes = Some(notes);
        Ok(())
    }

    /// Appends one validated draft. Allowed any time after competitor notes
    /// land and before the recommendation is written.
    pub fn push_draft(&mut self, validated: ValidatedDraft) -> Result<(), AsoWorksError> {
        match self.phase() {
            Phase::ContentGeneration | Phase::Aggregation => {
                tracing::debug!(
                    run_id = %self.run_id,
                    index = self.drafts.len(),
                    strategy = %validated.draft.strategy_label(),
                    passed = validated.passed_everywhere(),
                    "draft recorded"
                );
                self.drafts.push(validated);
                Ok(())
            }
            _ => Err(self.out_of_order(StageKind::ContentGeneration)),
        }
    }

    /// Writes the terminal recommendation.
    ///
    /// Requires at least one draft, and `chosen_index` must point into the
    /// draft list.
    pub fn set_recommendation(
        &mut self,
        recommendation: RecommendationRecord,
    ) -> Result<(), AsoWorksError> {
        if self.phase() != Phase::Aggregation {
            return Err(self.out_of_order(StageKind::Aggregation));
        }
        if recommendation.chosen_index >= self.drafts.len() {
            return Err(AsoWorksError::InvalidInput {
                message: format!(
                    "chosen_index {} is out of range for {} drafts",
                    recommendation.chosen_index,
                    self.drafts.len()
                ),
            });
        }
        tracing::debug!(
            run_id = %self.run_id,
            chosen = recommendation.chosen_index,
            "recommendation recorded"
        );
        self.recommendation = Some(recommendation);
        Ok(())
    }

    fn out_of_order(&self, attempted: StageKind) -> AsoWorksError {
        AsoWorksError::OutOfOrderWrite {
            attempted,
            phase: self.phase(),
        }
    }
}
