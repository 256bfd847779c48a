//! The sequential stage runner.
//!
//! One [`StageRunner::run`] call is one pipeline run: the runner owns the
//! session state for the whole run, so the single-writer contract holds by
//! construction. Stages execute strictly in order; no stage starts before
//! its predecessor's write has landed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Instrument;

use pipeline::{
    rank, validate, AppBrief, AsoWorksError, CompetitorAnalyst, ComplianceRules, ContentWriter,
    KeywordResearcher, PipelineState, StageError, StageKind, StoreTarget, ValidatedDraft,
};

use crate::retry::{with_retry, RetryConfig};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a run ended without a terminal state: either the core rejected a
/// write or input, or a collaborator failed beyond the retry budget.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Domain(#[from] AsoWorksError),

    #[error(transparent)]
    Stage(#[from] StageError),
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Settings for one runner instance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Stores every draft is validated against.
    #[serde(default)]
    pub target: StoreTarget,

    /// Guideline rules the validator applies.
    #[serde(default)]
    pub rules: ComplianceRules,

    /// Back-off schedule for collaborator calls.
    #[serde(default)]
    pub retry: RetryConfig,
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Drives the four stages in fixed order, feeding each collaborator the
/// accumulated session state and validating every draft inline.
///
/// The aggregation stage is fully deterministic: it is the ranking rubric in
/// [`pipeline::ranking`], not another collaborator.
pub struct StageRunner<R, A, W> {
    researcher: R,
    analyst: A,
    writer: W,
    config: RunnerConfig,
}

impl<R, A, W> StageRunner<R, A, W>
where
    R: KeywordResearcher,
    A: CompetitorAnalyst,
    W: ContentWriter,
{
    pub fn new(researcher: R, analyst: A, writer: W, config: RunnerConfig) -> Self {
        Self {
            researcher,
            analyst,
            writer,
            config,
        }
    }

    /// Runs the full pipeline for `brief`, returning the terminal state.
    ///
    /// On error the partially filled state is discarded; a run either
    /// completes or is abandoned entirely.
    pub async fn run(&self, brief: AppBrief) -> Result<PipelineState, RunnerError> {
        let state = PipelineState::new(brief);
        let span = tracing::info_span!("pipeline_run", run_id = %state.run_id());
        self.run_inner(state).instrument(span).await
    }

    async fn run_inner(&self, mut state: PipelineState) -> Result<PipelineState, RunnerError> {
        let platforms = self.config.target.platforms();
        tracing::info!(
            app = %state.brief().name,
            target = %self.config.target,
            "pipeline run started"
        );

        // Stage 1: keyword research.
        let keywords = with_retry(&self.config.retry, || {
            self.researcher.research(state.brief())
        })
        .instrument(tracing::info_span!("stage", kind = %StageKind::KeywordResearch))
        .await?;
        state.set_keyword_set(keywords.clone())?;

        // Stage 2: competitor analysis.
        let notes = with_retry(&self.config.retry, || {
            self.analyst.analyze(state.brief(), &keywords)
        })
        .instrument(tracing::info_span!("stage", kind = %StageKind::CompetitorAnalysis))
        .await?;
        state.set_competitor_notes(notes.clone())?;

        // Stage 3: content generation, validated inline per target platform.
        let drafts = with_retry(&self.config.retry, || {
            self.writer.write(state.brief(), &keywords, &notes)
        })
        .instrument(tracing::info_span!("stage", kind = %StageKind::ContentGeneration))
        .await?;
        if drafts.is_empty() {
            return Err(AsoWorksError::EmptyInput {
                what: "content generation produced no drafts".to_string(),
            }
            .into());
        }
        for draft in drafts {
            let mut reports = BTreeMap::new();
            for &platform in &platforms {
                let report = validate(&draft, platform, &self.config.rules)?;
                reports.insert(platform, report);
            }
            state.push_draft(ValidatedDraft { draft, reports })?;
        }

        // Stage 4: deterministic aggregation.
        let recommendation = rank(state.drafts(), &keywords)?;
        tracing::info!(
            chosen = recommendation.chosen_index,
            drafts = state.drafts().len(),
            "pipeline run complete"
        );
        state.set_recommendation(recommendation)?;

        Ok(state)
    }
}
