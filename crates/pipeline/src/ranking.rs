//! Variant ranking: the deterministic aggregation step.
//!
//! Every validated draft is scored with a fixed rubric; fully compliant
//! drafts are preferred outright; ties always break toward the lowest index
//! so identical inputs select identically. The winning record explains which
//! criterion decided the outcome.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::errors::AsoWorksError;
use crate::state::ValidatedDraft;
use crate::types::{Keyword, KeywordSet};

// ---------------------------------------------------------------------------
// Rubric vocabulary
// ---------------------------------------------------------------------------

/// A criterion in the ranking rubric; the keys of a score breakdown.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCriterion {
    /// 1.0 for a fully compliant draft, otherwise 0.2 off per issue,
    /// floored at 0.
    Compliance,
    /// Fraction of the researched primary + secondary keywords the draft's
    /// keyword list carries.
    KeywordCoverage,
    /// 0.05 off per warning.
    WarningPenalty,
    /// Compliance + coverage − warning penalty. Not floored.
    Total,
    /// The runner-up's total, recorded for transparency.
    RunnerUpTotal,
}

impl std::fmt::Display for ScoreCriterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreCriterion::Compliance => write!(f, "compliance"),
            ScoreCriterion::KeywordCoverage => write!(f, "keyword coverage"),
            ScoreCriterion::WarningPenalty => write!(f, "warning penalty"),
            ScoreCriterion::Total => write!(f, "total"),
            ScoreCriterion::RunnerUpTotal => write!(f, "runner-up total"),
        }
    }
}

// ---------------------------------------------------------------------------

/// The terminal record of a run: which variant won and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    /// Index into the run's draft list.
    pub chosen_index: usize,
    /// Per-criterion numbers for the winner, plus the runner-up's total
    /// when a runner-up exists.
    pub score_breakdown: BTreeMap<ScoreCriterion, f64>,
    /// Generated explanation naming the deciding criterion.
    pub rationale: String,
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

struct DraftScore {
    compliance: f64,
    coverage: f64,
    penalty: f64,
    total: f64,
    issues: usize,
}

fn score_draft(validated: &ValidatedDraft, targets: &[&Keyword]) -> DraftScore {
    let issues = validated.total_issues();
    let compliance = if validated.passed_everywhere() {
        1.0
    } else {
        (1.0 - 0.2 * issues as f64).max(0.0)
    };

    // An empty target union is vacuously covered.
    let coverage = if targets.is_empty() {
        1.0
    } else {
        let hits = targets
            .iter()
            .filter(|target| {
                validated
                    .draft
                    .keywords()
                    .iter()
                    .any(|kw| kw.matches(target.as_str()))
            })
            .count();
        hits as f64 / targets.len() as f64
    };

    let penalty = 0.05 * validated.total_warnings() as f64;

    DraftScore {
        compliance,
        coverage,
        penalty,
        total: compliance + coverage - penalty,
        issues,
    }
}

/// `true` if the draft at `a` outranks the draft at `b` under the fallback
/// ordering used when no draft is fully compliant: fewest issues, then
/// highest total. Strict, so equal drafts keep the earlier index.
fn less_violating(a: &DraftScore, b: &DraftScore) -> bool {
    a.issues < b.issues || (a.issues == b.issues && a.total > b.total)
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// Scores `drafts` against the researched `keyword_set` and selects the
/// winning variant.
///
/// When at least one draft passed validation on every platform, only those
/// drafts compete on total score. When none did, the least-violating draft
/// wins and the rationale records that fact. Ties break toward the lowest
/// index.
pub fn rank(
    drafts: &[ValidatedDraft],
    keyword_set: &KeywordSet,
) -> Result<RecommendationRecord, AsoWorksError> {
    if drafts.is_empty() {
        return Err(AsoWorksError::EmptyInput {
            what: "ranking requires at least one draft".to_string(),
        });
    }

    // Dedup the target union case-insensitively so coverage is a true fraction.
    let mut seen = HashSet::new();
    let targets: Vec<&Keyword> = keyword_set
        .expected_keywords()
        .filter(|kw| seen.insert(kw.as_str().to_lowercase()))
        .collect();

    let scores: Vec<DraftScore> = drafts.iter().map(|d| score_draft(d, &targets)).collect();

    let any_passed = drafts.iter().any(ValidatedDraft::passed_everywhere);
    let candidates: Vec<usize> = if any_passed {
        (0..drafts.len())
            .filter(|&i| drafts[i].passed_everywhere())
            .collect()
    } else {
        (0..drafts.len()).collect()
    };

    let outranks = |a: &DraftScore, b: &DraftScore| {
        if any_passed {
            a.total > b.total
        } else {
            less_violating(a, b)
        }
    };

    let mut chosen = candidates[0];
    for &i in &candidates[1..] {
        if outranks(&scores[i], &scores[chosen]) {
            chosen = i;
        }
    }

    let runner_up = candidates
        .iter()
        .copied()
        .filter(|&i| i != chosen)
        .reduce(|best, i| if outranks(&scores[i], &scores[best]) { i } else { best });

    let winner = &scores[chosen];
    let mut score_breakdown = BTreeMap::from([
        (ScoreCriterion::Compliance, winner.compliance),
        (ScoreCriterion::KeywordCoverage, winner.coverage),
        (ScoreCriterion::WarningPenalty, winner.penalty),
        (ScoreCriterion::Total, winner.total),
    ]);
    if let Some(ru) = runner_up {
        score_breakdown.insert(ScoreCriterion::RunnerUpTotal, scores[ru].total);
    }

    let rationale = build_rationale(drafts, &scores, chosen, runner_up, any_passed);

    tracing::debug!(
        chosen,
        total = winner.total,
        candidates = candidates.len(),
        fully_compliant = any_passed,
        "variants ranked"
    );

    Ok(RecommendationRecord {
        chosen_index: chosen,
        score_breakdown,
        rationale,
    })
}

/// Names the criterion that contributed most of the winner's margin over the
/// runner-up; ties resolve in rubric order.
fn deciding_criterion(winner: &DraftScore, runner_up: &DraftScore) -> ScoreCriterion {
    let deltas = [
        (ScoreCriterion::Compliance, winner.compliance - runner_up.compliance),
        (
            ScoreCriterion::KeywordCoverage,
            winner.coverage - runner_up.coverage,
        ),
        (
            ScoreCriterion::WarningPenalty,
            runner_up.penalty - winner.penalty,
        ),
    ];
    let mut deciding = deltas[0];
    for candidate in &deltas[1..] {
        if candidate.1.abs() > deciding.1.abs() {
            deciding = *candidate;
        }
    }
    deciding.0
}

fn build_rationale(
    drafts: &[ValidatedDraft],
    scores: &[DraftScore],
    chosen: usize,
    runner_up: Option<usize>,
    any_passed: bool,
) -> String {
    let label = drafts[chosen].draft.strategy_label();
    let body = match runner_up {
        Some(ru) => {
            let criterion = deciding_criterion(&scores[chosen], &scores[ru]);
            format!(
                "variant {chosen} ('{label}') totals {:.2} against {:.2} for variant {ru}; \
                 {criterion} contributed most of the margin",
                scores[chosen].total, scores[ru].total
            )
        }
        None if drafts.len() > 1 => format!(
            "variant {chosen} ('{label}') is the only variant that passed validation on every platform"
        ),
        None => format!(
            "variant {chosen} ('{label}') is the only draft, totalling {:.2}",
            scores[chosen].total
        ),
    };
    if any_passed {
        body
    } else {
        format!(
            "no draft passed validation on every target platform; choosing the least-violating draft: {body}"
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::compliance::ValidationReport;
    use crate::identifiers::StrategyLabel;
    use crate::types::{ListingDraft, Platform};

    fn kw(s: &str) -> Keyword {
        Keyword::new(s).unwrap()
    }

    fn report(platform: Platform, issues: usize, warnings: usize) -> ValidationReport {
        ValidationReport {
            platform,
            issues: (0..issues).map(|i| format!("issue {i}")).collect(),
            warnings: (0..warnings).map(|i| format!("warning {i}")).collect(),
            recommendations: vec![],
            passed: issues == 0,
            title_length: 10,
            description_length: 200,
        }
    }

    fn validated(keywords: &[&str], issues: usize, warnings: usize) -> ValidatedDraft {
        let draft = ListingDraft::new(
            "FitTrack",
            "Smart plans",
            "Track workouts and progress.",
            keywords.iter().map(|k| kw(k)).collect(),
            StrategyLabel::new("Test").unwrap(),
        )
        .unwrap();
        ValidatedDraft {
            draft,
            reports: BTreeMap::from([(Platform::Ios, report(Platform::Ios, issues, warnings))]),
        }
    }

    fn ten_targets() -> KeywordSet {
        KeywordSet::new(
            vec![kw("k1"), kw("k2"), kw("k3"), kw("k4"), kw("k5")],
            vec![kw("k6"), kw("k7"), kw("k8"), kw("k9"), kw("k10")],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn empty_draft_list_is_rejected() {
        assert!(matches!(
            rank(&[], &ten_targets()),
            Err(AsoWorksError::EmptyInput { .. })
        ));
    }

    #[test]
    fn highest_total_among_compliant_drafts_wins() {
        // Totals: 1.2 (passed), 0.5 (failed), 1.4 (passed).
        let drafts = vec![
            validated(&["k1", "k2"], 0, 0),
            validated(&["k1"], 3, 0),
            validated(&["k1", "k2", "k3", "k4"], 0, 0),
        ];
        let record = rank(&drafts, &ten_targets()).unwrap();
        assert_eq!(record.chosen_index, 2);
        assert!((record.score_breakdown[&ScoreCriterion::Total] - 1.4).abs() < 1e-9);
        assert!((record.score_breakdown[&ScoreCriterion::RunnerUpTotal] - 1.2).abs() < 1e-9);
        assert!(record.rationale.contains("keyword coverage"));
    }

    #[test]
    fn ties_always_select_the_lowest_index() {
        let drafts = vec![validated(&["k1"], 0, 0), validated(&["k1"], 0, 0)];
        let record = rank(&drafts, &ten_targets()).unwrap();
        assert_eq!(record.chosen_index, 0);
    }

    #[test]
    fn coverage_is_monotone_in_matched_keywords() {
        let narrower = rank(&[validated(&["k1"], 0, 0)], &ten_targets()).unwrap();
        let wider = rank(&[validated(&["k1", "k2"], 0, 0)], &ten_targets()).unwrap();
        assert!(
            wider.score_breakdown[&ScoreCriterion::Total]
                > narrower.score_breakdown[&ScoreCriterion::Total]
        );
    }

    #[test]
    fn compliance_floors_at_zero() {
        let drafts = vec![validated(&[], 7, 0)];
        let record = rank(&drafts, &ten_targets()).unwrap();
        assert_eq!(record.score_breakdown[&ScoreCriterion::Compliance], 0.0);
    }

    #[test]
    fn warnings_subtract_from_the_total() {
        let quiet = rank(&[validated(&["k1"], 0, 0)], &ten_targets()).unwrap();
        let noisy = rank(&[validated(&["k1"], 0, 2)], &ten_targets()).unwrap();
        let delta = quiet.score_breakdown[&ScoreCriterion::Total]
            - noisy.score_breakdown[&ScoreCriterion::Total];
        assert!((delta - 0.1).abs() < 1e-9);
    }

    #[test]
    fn least_violating_draft_wins_when_none_pass() {
        let drafts = vec![validated(&["k1", "k2"], 2, 0), validated(&["k1"], 1, 0)];
        let record = rank(&drafts, &ten_targets()).unwrap();
        assert_eq!(record.chosen_index, 1);
        assert!(record.rationale.contains("least-violating"));
    }

    #[test]
    fn fully_compliant_draft_beats_a_higher_scoring_violator() {
        // The violator out-scores on coverage but is never eligible while a
        // compliant draft exists.
        let drafts = vec![
            validated(
                &["k1", "k2", "k3", "k4", "k5", "k6", "k7", "k8", "k9", "k10"],
                1,
                0,
            ),
            validated(&["k1"], 0, 0),
        ];
        let record = rank(&drafts, &ten_targets()).unwrap();
        assert_eq!(record.chosen_index, 1);
    }

    #[test]
    fn empty_target_union_is_vacuously_covered() {
        let set = KeywordSet::new(vec![], vec![], vec![kw("niche phrase")]).unwrap();
        let record = rank(&[validated(&[], 0, 0)], &set).unwrap();
        assert_eq!(
            record.score_breakdown[&ScoreCriterion::KeywordCoverage],
            1.0
        );
    }
}
