// End-to-end runner tests: the full stage sequence driven by scripted and
// deliberately faulty collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use pipeline::{
    AppBrief, AppName, AsoWorksError, CompetitorAnalyst, Keyword, KeywordResearcher, KeywordSet,
    ListingDraft, Platform, StageError, StageKind, StoreTarget, StrategyLabel,
};
use stages::{
    ReplayScript, RunnerConfig, RunnerError, ScriptedAnalyst, ScriptedResearcher, ScriptedWriter,
    StageRunner,
};

fn kw(s: &str) -> Keyword {
    Keyword::new(s).unwrap()
}

fn brief() -> AppBrief {
    AppBrief {
        name: AppName::new("FitTrack").unwrap(),
        category: "Health & Fitness".to_string(),
        description: "An AI workout planner that adapts to your progress".to_string(),
    }
}

fn keyword_set() -> KeywordSet {
    KeywordSet::new(
        vec![kw("fitness tracker"), kw("workout planner")],
        vec![kw("workout")],
        vec![kw("ai workout plan generator")],
    )
    .unwrap()
}

fn long_description() -> String {
    "Meet the fitness tracker that plans every workout for you. Adaptive \
     training schedules, automatic progress charts, and gentle reminders \
     keep you moving, whether you are starting out or chasing a new \
     personal best."
        .to_string()
}

fn drafts() -> Vec<ListingDraft> {
    vec![
        // Title is 35 characters: fails ios, passes android.
        ListingDraft::new(
            "AI Fitness Tracker - Smart Workouts",
            "Your AI training partner",
            long_description(),
            vec![kw("fitness tracker"), kw("workout")],
            StrategyLabel::new("SEO-Optimized").unwrap(),
        )
        .unwrap(),
        ListingDraft::new(
            "AI Fitness Tracker",
            "Smart workout plans",
            long_description(),
            vec![kw("fitness tracker"), kw("workout")],
            StrategyLabel::new("Compact-Title").unwrap(),
        )
        .unwrap(),
    ]
}

fn replay_script() -> ReplayScript {
    ReplayScript {
        brief: brief(),
        keyword_set: keyword_set(),
        competitor_notes: vec![
            "top rivals lead with habit streaks".to_string(),
            "few competitors mention adaptive plans".to_string(),
        ],
        drafts: drafts(),
    }
}

#[tokio::test]
async fn test_replay_run_reaches_a_terminal_state() {
    let (brief, researcher, analyst, writer) = replay_script().into_collaborators();
    let runner = StageRunner::new(researcher, analyst, writer, RunnerConfig::default());

    let state = runner.run(brief).await.unwrap();

    assert!(state.is_complete());
    assert!(state.keyword_set().is_some());
    assert_eq!(state.competitor_notes().unwrap().len(), 2);
    assert_eq!(state.drafts().len(), 2);

    // Both stores were validated independently for every draft.
    for slot in state.drafts() {
        assert_eq!(slot.reports.len(), 2);
        assert!(slot.reports.contains_key(&Platform::Ios));
        assert!(slot.reports.contains_key(&Platform::Android));
    }

    // The overlong first variant fails ios, so the compact variant wins.
    assert!(!state.drafts()[0].passed_everywhere());
    assert!(state.drafts()[1].passed_everywhere());
    assert_eq!(state.recommendation().unwrap().chosen_index, 1);
}

#[tokio::test]
async fn test_single_store_target_produces_one_report_per_draft() {
    let (brief, researcher, analyst, writer) = replay_script().into_collaborators();
    let config = RunnerConfig {
        target: StoreTarget::Android,
        ..RunnerConfig::default()
    };
    let runner = StageRunner::new(researcher, analyst, writer, config);

    let state = runner.run(brief).await.unwrap();
    for slot in state.drafts() {
        assert_eq!(slot.reports.len(), 1);
        assert!(slot.reports.contains_key(&Platform::Android));
    }
    // Both variants pass the android title limit; the first listed wins the tie.
    assert_eq!(state.recommendation().unwrap().chosen_index, 0);
}

// ---------------------------------------------------------------------------
// Faulty collaborators
// ---------------------------------------------------------------------------

/// Fails a configured number of times before succeeding. The call counter is
/// shared so tests can assert on it after the runner consumes the value.
struct FlakyResearcher {
    failures: usize,
    calls: Arc<AtomicUsize>,
    keyword_set: KeywordSet,
}

#[async_trait]
impl KeywordResearcher for FlakyResearcher {
    async fn research(&self, _brief: &AppBrief) -> Result<KeywordSet, StageError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            Err(StageError::Upstream {
                stage: StageKind::KeywordResearch,
                message: "provider returned 503".to_string(),
            })
        } else {
            Ok(self.keyword_set.clone())
        }
    }
}

/// Always rejects with a non-retryable error.
struct RejectingAnalyst;

#[async_trait]
impl CompetitorAnalyst for RejectingAnalyst {
    async fn analyze(
        &self,
        _brief: &AppBrief,
        _keywords: &KeywordSet,
    ) -> Result<Vec<String>, StageError> {
        Err(StageError::Rejected {
            stage: StageKind::CompetitorAnalysis,
            message: "response held no notes".to_string(),
        })
    }
}

/// Counts calls so tests can assert whether the stage was reached.
struct CountingAnalyst {
    calls: Arc<AtomicUsize>,
    notes: Vec<String>,
}

#[async_trait]
impl CompetitorAnalyst for CountingAnalyst {
    async fn analyze(
        &self,
        _brief: &AppBrief,
        _keywords: &KeywordSet,
    ) -> Result<Vec<String>, StageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.notes.clone())
    }
}

#[tokio::test(start_paused = true)]
async fn test_transient_failures_are_retried_until_success() {
    let script = replay_script();
    let research_calls = Arc::new(AtomicUsize::new(0));
    let researcher = FlakyResearcher {
        failures: 2,
        calls: Arc::clone(&research_calls),
        keyword_set: script.keyword_set.clone(),
    };
    let analyst = CountingAnalyst {
        calls: Arc::new(AtomicUsize::new(0)),
        notes: script.competitor_notes.clone(),
    };
    let writer = ScriptedWriter::new(script.drafts.clone());
    let runner = StageRunner::new(researcher, analyst, writer, RunnerConfig::default());

    // The paused clock advances through both back-off sleeps instantly.
    let state = runner.run(script.brief).await.unwrap();
    assert!(state.is_complete());
    assert_eq!(research_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_retry_budget_is_finite() {
    let script = replay_script();
    let research_calls = Arc::new(AtomicUsize::new(0));
    let analyst_calls = Arc::new(AtomicUsize::new(0));
    let researcher = FlakyResearcher {
        failures: usize::MAX,
        calls: Arc::clone(&research_calls),
        keyword_set: script.keyword_set.clone(),
    };
    let analyst = CountingAnalyst {
        calls: Arc::clone(&analyst_calls),
        notes: script.competitor_notes.clone(),
    };
    let writer = ScriptedWriter::new(script.drafts.clone());
    let runner = StageRunner::new(researcher, analyst, writer, RunnerConfig::default());

    let err = runner.run(script.brief).await.unwrap_err();
    assert!(matches!(
        err,
        RunnerError::Stage(StageError::Upstream { .. })
    ));
    // Default budget is 5 attempts; the next stage was never reached.
    assert_eq!(research_calls.load(Ordering::SeqCst), 5);
    assert_eq!(analyst_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_non_retryable_failure_aborts_immediately() {
    let script = replay_script();
    let researcher = ScriptedResearcher::new(script.keyword_set.clone());
    let writer = ScriptedWriter::new(script.drafts.clone());
    let runner = StageRunner::new(researcher, RejectingAnalyst, writer, RunnerConfig::default());

    let err = runner.run(script.brief).await.unwrap_err();
    assert!(matches!(
        err,
        RunnerError::Stage(StageError::Rejected { .. })
    ));
}

#[tokio::test]
async fn test_empty_draft_list_surfaces_empty_input() {
    let script = replay_script();
    let researcher = ScriptedResearcher::new(script.keyword_set.clone());
    let analyst = ScriptedAnalyst::new(script.competitor_notes.clone());
    let runner = StageRunner::new(
        researcher,
        analyst,
        ScriptedWriter::new(vec![]),
        RunnerConfig::default(),
    );

    let err = runner.run(script.brief).await.unwrap_err();
    assert!(matches!(
        err,
        RunnerError::Domain(AsoWorksError::EmptyInput { .. })
    ));
}
