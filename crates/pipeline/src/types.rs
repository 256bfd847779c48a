//! Shared value types for the AsoWorks listing domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types
//! carry meaningful values with invariants (e.g. a [`KeywordSet`]'s tiers are
//! pairwise disjoint, a [`ListingDraft`]'s title is non-empty) and
//! participate in domain computations.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AsoWorksError;
use crate::identifiers::{AppName, StrategyLabel};

// ---------------------------------------------------------------------------
// Platforms
// ---------------------------------------------------------------------------

/// An app store a listing can be published to.
///
/// Guideline limits differ per platform; they live in
/// [`crate::compliance::ComplianceRules`], not here, so a guideline update is
/// a data change rather than a code change.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Apple App Store.
    Ios,
    /// Google Play.
    Android,
}

impl Platform {
    /// Both supported platforms, in canonical order.
    pub const ALL: [Platform; 2] = [Platform::Ios, Platform::Android];
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Ios => write!(f, "ios"),
            Platform::Android => write!(f, "android"),
        }
    }
}

impl FromStr for Platform {
    type Err = AsoWorksError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ios" => Ok(Platform::Ios),
            "android" => Ok(Platform::Android),
            other => Err(AsoWorksError::InvalidInput {
                message: format!("unknown platform '{other}' (expected 'ios' or 'android')"),
            }),
        }
    }
}

// ---------------------------------------------------------------------------

/// Which stores a run validates drafts against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreTarget {
    Ios,
    Android,
    /// Validate against both stores; each platform produces its own report.
    Both,
}

impl StoreTarget {
    /// Expands the target into concrete platforms, in canonical order.
    pub fn platforms(self) -> Vec<Platform> {
        match self {
            StoreTarget::Ios => vec![Platform::Ios],
            StoreTarget::Android => vec![Platform::Android],
            StoreTarget::Both => Platform::ALL.to_vec(),
        }
    }
}

impl Default for StoreTarget {
    fn default() -> Self {
        StoreTarget::Both
    }
}

impl std::fmt::Display for StoreTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreTarget::Ios => write!(f, "ios"),
            StoreTarget::Android => write!(f, "android"),
            StoreTarget::Both => write!(f, "both"),
        }
    }
}

impl FromStr for StoreTarget {
    type Err = AsoWorksError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ios" => Ok(StoreTarget::Ios),
            "android" => Ok(StoreTarget::Android),
            "both" => Ok(StoreTarget::Both),
            other => Err(AsoWorksError::InvalidInput {
                message: format!(
                    "unknown store target '{other}' (expected 'ios', 'android', or 'both')"
                ),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Keywords
// ---------------------------------------------------------------------------

/// A single keyword or key phrase (e.g. `"fitness tracker"`).
///
/// Stored verbatim; comparisons throughout the domain are case-insensitive,
/// so `"Fitness"` and `"fitness"` are the same keyword.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Keyword(String);

impl Keyword {
    /// Creates a [`Keyword`], returning `None` if the trimmed value is empty.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into().trim().to_string();
        if v.is_empty() {
            None
        } else {
            Some(Self(v))
        }
    }

    /// Returns the keyword as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive equality against an arbitrary string.
    pub fn matches(&self, other: &str) -> bool {
        self.0.to_lowercase() == other.to_lowercase()
    }

    /// Length in characters (not bytes).
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------

/// Keyword-research output: keywords grouped by priority tier.
///
/// Tiers are pairwise disjoint (case-insensitive): a keyword belongs to at
/// most one tier. Order within a tier is priority order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordSet {
    primary: Vec<Keyword>,
    secondary: Vec<Keyword>,
    long_tail: Vec<Keyword>,
}

impl KeywordSet {
    /// Builds a [`KeywordSet`], rejecting any keyword that is listed more
    /// than once across the three tiers.
    pub fn new(
        primary: Vec<Keyword>,
        secondary: Vec<Keyword>,
        long_tail: Vec<Keyword>,
    ) -> Result<Self, AsoWorksError> {
        let mut seen = HashSet::new();
        for kw in primary.iter().chain(&secondary).chain(&long_tail) {
            if !seen.insert(kw.as_str().to_lowercase()) {
                return Err(AsoWorksError::InvalidInput {
                    message: format!("keyword '{kw}' is listed more than once across tiers"),
                });
            }
        }
        Ok(Self {
            primary,
            secondary,
            long_tail,
        })
    }

    /// High-relevance keywords the listing should lead with.
    pub fn primary(&self) -> &[Keyword] {
        &self.primary
    }

    /// Medium-relevance keywords.
    pub fn secondary(&self) -> &[Keyword] {
        &self.secondary
    }

    /// Specific lower-competition phrases.
    pub fn long_tail(&self) -> &[Keyword] {
        &self.long_tail
    }

    /// Keywords a finished draft is expected to carry: the union of the
    /// primary and secondary tiers, in tier order.
    pub fn expected_keywords(&self) -> impl Iterator<Item = &Keyword> {
        self.primary.iter().chain(&self.secondary)
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

// ---------------------------------------------------------------------------
// Briefs and drafts
// ---------------------------------------------------------------------------

/// What the user wants optimised: the app, its store category, and a
/// free-text description of what it does.
///
/// The sole input to a pipeline run; every stage reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppBrief {
    /// Product name.
    pub name: AppName,
    /// Store category (e.g. `"Health & Fitness"`).
    pub category: String,
    /// Free-text description of the app's functionality and audience.
    pub description: String,
}

// ---------------------------------------------------------------------------

/// One complete candidate listing produced by the content-generation stage.
///
/// Immutable once constructed; validation reports and the final
/// recommendation refer to a draft by its position in the session state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingDraft {
    title: String,
    subtitle: String,
    description: String,
    keywords: Vec<Keyword>,
    strategy_label: StrategyLabel,
}

impl ListingDraft {
    /// Builds a draft, enforcing the structural invariants: the title is
    /// non-empty and `keywords` holds no case-insensitive duplicates.
    pub fn new(
        title: impl Into<String>,
        subtitle: impl Into<String>,
        description: impl Into<String>,
        keywords: Vec<Keyword>,
        strategy_label: StrategyLabel,
    ) -> Result<Self, AsoWorksError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(AsoWorksError::InvalidInput {
                message: "draft title must not be empty".to_string(),
            });
        }
        let mut seen = HashSet::new();
        for kw in &keywords {
            if !seen.insert(kw.as_str().to_lowercase()) {
                return Err(AsoWorksError::InvalidInput {
                    message: format!("duplicate keyword '{kw}' in draft"),
                });
            }
        }
        Ok(Self {
            title,
            subtitle: subtitle.into(),
            description: description.into(),
            keywords,
            strategy_label,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn subtitle(&self) -> &str {
        &self.subtitle
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Backend keywords, insertion order = priority order.
    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    pub fn strategy_label(&self) -> &StrategyLabel {
        &self.strategy_label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(s: &str) -> Keyword {
        Keyword::new(s).unwrap()
    }

    #[test]
    fn platform_parsing_is_case_insensitive() {
        assert_eq!("iOS".parse::<Platform>().unwrap(), Platform::Ios);
        assert_eq!(" ANDROID ".parse::<Platform>().unwrap(), Platform::Android);
        assert!(matches!(
            "windows".parse::<Platform>(),
            Err(AsoWorksError::InvalidInput { .. })
        ));
    }

    #[test]
    fn store_target_expands_to_platforms() {
        assert_eq!(StoreTarget::Ios.platforms(), vec![Platform::Ios]);
        assert_eq!(
            "both".parse::<StoreTarget>().unwrap().platforms(),
            vec![Platform::Ios, Platform::Android]
        );
    }

    #[test]
    fn keyword_rejects_blank_input() {
        assert!(Keyword::new("   ").is_none());
        assert_eq!(kw("  fitness ").as_str(), "fitness");
    }

    #[test]
    fn keyword_matching_ignores_case() {
        assert!(kw("Fitness Tracker").matches("fitness tracker"));
        assert!(!kw("fitness").matches("fitness tracker"));
    }

    #[test]
    fn keyword_set_rejects_overlapping_tiers() {
        let err = KeywordSet::new(
            vec![kw("fitness")],
            vec![kw("workout"), kw("Fitness")],
            vec![],
        );
        assert!(matches!(err, Err(AsoWorksError::InvalidInput { .. })));
    }

    #[test]
    fn expected_keywords_are_primary_then_secondary() {
        let set = KeywordSet::new(
            vec![kw("fitness")],
            vec![kw("workout")],
            vec![kw("home workout no equipment")],
        )
        .unwrap();
        let expected: Vec<&str> = set.expected_keywords().map(Keyword::as_str).collect();
        assert_eq!(expected, vec!["fitness", "workout"]);
    }

    #[test]
    fn draft_rejects_empty_title_and_duplicate_keywords() {
        let label = StrategyLabel::new("SEO-Optimized").unwrap();
        assert!(matches!(
            ListingDraft::new("  ", "", "desc", vec![], label.clone()),
            Err(AsoWorksError::InvalidInput { .. })
        ));
        assert!(matches!(
            ListingDraft::new(
                "Title",
                "",
                "desc",
                vec![kw("fitness"), kw("FITNESS")],
                label
            ),
            Err(AsoWorksError::InvalidInput { .. })
        ));
    }
}
