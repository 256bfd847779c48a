//! Guideline compliance validation for listing copy.
//!
//! [`validate`] is a pure function: one draft, one platform, one rules table
//! in; one [`ValidationReport`] out. Rules run in a fixed order and emit
//! findings in a stable order (fields title → subtitle → description, terms
//! and keywords in the order given), so identical input always yields an
//! identical report.
//!
//! Limits and term lists are data ([`ComplianceRules`]), not control flow; a
//! store-guideline update is a configuration change.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::AsoWorksError;
use crate::types::{ListingDraft, Platform};

// ---------------------------------------------------------------------------
// Rules tables
// ---------------------------------------------------------------------------

/// Character limits for one platform's listing fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformLimits {
    /// Hard title limit, in characters. Exceeding it is a blocking issue.
    pub title_limit: usize,
    /// Hard description limit, in characters.
    pub description_limit: usize,
    /// Soft description floor, in characters. Shorter copy draws a warning.
    pub description_floor: usize,
}

impl PlatformLimits {
    /// Apple App Store limits: 30-character title, 4000-character description.
    pub const IOS: PlatformLimits = PlatformLimits {
        title_limit: 30,
        description_limit: 4000,
        description_floor: 150,
    };

    /// Google Play limits: 50-character title, 4000-character description.
    pub const ANDROID: PlatformLimits = PlatformLimits {
        title_limit: 50,
        description_limit: 4000,
        description_floor: 150,
    };
}

// ---------------------------------------------------------------------------

/// The full rules table the validator runs against.
///
/// Deserialisable from TOML so deployments can track guideline changes
/// without a rebuild; [`ComplianceRules::default`] carries the documented
/// store limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceRules {
    /// Limits applied to iOS reports.
    #[serde(default = "default_ios_limits")]
    pub ios: PlatformLimits,

    /// Limits applied to Android reports.
    #[serde(default = "default_android_limits")]
    pub android: PlatformLimits,

    /// Fraction of the description that may be literal keyword matches
    /// before the stuffing warning fires.
    #[serde(default = "default_density_threshold")]
    pub keyword_density_threshold: f64,

    /// Case-insensitive substrings that must not appear in visible copy.
    /// Matches are blocking issues.
    #[serde(default = "default_prohibited_terms")]
    pub prohibited_terms: Vec<String>,

    /// Advisory copy guidance attached to every report. Never affects
    /// pass/fail.
    #[serde(default = "default_recommendations")]
    pub recommendations: Vec<String>,
}

fn default_ios_limits() -> PlatformLimits {
    PlatformLimits::IOS
}

fn default_android_limits() -> PlatformLimits {
    PlatformLimits::ANDROID
}

fn default_density_threshold() -> f64 {
    0.30
}

fn default_prohibited_terms() -> Vec<String> {
    ["best app ever", "#1", "guaranteed", "top rated", "free download"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_recommendations() -> Vec<String> {
    [
        "Use natural language",
        "Focus on user benefits",
        "Include a clear call-to-action",
        "Use bullet points for readability",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for ComplianceRules {
    fn default() -> Self {
        Self {
            ios: default_ios_limits(),
            android: default_android_limits(),
            keyword_density_threshold: default_density_threshold(),
            prohibited_terms: default_prohibited_terms(),
            recommendations: default_recommendations(),
        }
    }
}

impl ComplianceRules {
    /// The limits table for `platform`.
    pub fn limits(&self, platform: Platform) -> PlatformLimits {
        match platform {
            Platform::Ios => self.ios,
            Platform::Android => self.android,
        }
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// The validator's verdict for one draft on one platform.
///
/// Issues are blocking guideline violations; warnings flag quality risks
/// that do not block publication. Both are ordinary output — a report full
/// of findings is still a successful validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// The platform whose rules produced this report.
    pub platform: Platform,
    /// Blocking violations, in rule order.
    pub issues: Vec<String>,
    /// Non-blocking findings, in rule order.
    pub warnings: Vec<String>,
    /// Advisory guidance; never affects `passed`.
    pub recommendations: Vec<String>,
    /// `true` iff `issues` is empty.
    pub passed: bool,
    /// Title length in characters.
    pub title_length: usize,
    /// Description length in characters.
    pub description_length: usize,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Checks `draft` against `rules` for one `platform`.
///
/// Pure and deterministic: no I/O, no shared state, stable finding order.
/// The `Err` arm is reserved for structural misuse (an empty title slipped
/// past construction); guideline findings land in the report.
pub fn validate(
    draft: &ListingDraft,
    platform: Platform,
    rules: &ComplianceRules,
) -> Result<ValidationReport, AsoWorksError> {
    if draft.title().trim().is_empty() {
        return Err(AsoWorksError::InvalidInput {
            message: "cannot validate a draft with an empty title".to_string(),
        });
    }

    let limits = rules.limits(platform);
    let mut issues = Vec::new();
    let mut warnings = Vec::new();

    let title_length = draft.title().chars().count();
    let description_length = draft.description().chars().count();

    // Rule 1: title length.
    if title_length > limits.title_limit {
        issues.push(format!(
            "title exceeds {platform} limit of {} characters ({title_length})",
            limits.title_limit
        ));
    }

    // Rule 2: keyword stuffing. Every whole-word occurrence counts toward
    // density, so a description that is 40% repeated keyword text crosses
    // the default 30% line.
    if description_length > 0 {
        let matched: usize = draft
            .keywords()
            .iter()
            .map(|kw| whole_word_occurrences(draft.description(), kw.as_str()) * kw.char_len())
            .sum();
        let density = matched as f64 / description_length as f64;
        if density > rules.keyword_density_threshold {
            warnings.push(format!(
                "keyword density {density:.2} of description exceeds {:.2} (possible keyword stuffing)",
                rules.keyword_density_threshold
            ));
        }
    }

    // Rule 3: prohibited terms. Fields in display order, terms in table order.
    for (field, text) in [
        ("title", draft.title()),
        ("subtitle", draft.subtitle()),
        ("description", draft.description()),
    ] {
        let lowered = text.to_lowercase();
        for term in &rules.prohibited_terms {
            if lowered.contains(&term.to_lowercase()) {
                issues.push(format!("prohibited term '{term}' found in {field}"));
            }
        }
    }

    // Rule 4: description length.
    if description_length == 0 {
        issues.push("description is empty".to_string());
    } else if description_length > limits.description_limit {
        issues.push(format!(
            "description exceeds {platform} limit of {} characters ({description_length})",
            limits.description_limit
        ));
    } else if description_length < limits.description_floor {
        warnings.push(format!(
            "description under {} characters ({description_length}); too little detail to convert",
            limits.description_floor
        ));
    }

    // Rule 5: keyword integration across all visible copy.
    if !draft.keywords().is_empty() {
        let integrated = draft.keywords().iter().any(|kw| {
            [draft.title(), draft.subtitle(), draft.description()]
                .iter()
                .any(|text| whole_word_occurrences(text, kw.as_str()) > 0)
        });
        if !integrated {
            warnings.push("no keywords integrated into visible copy".to_string());
        }
    }

    let passed = issues.is_empty();
    tracing::debug!(
        %platform,
        passed,
        issues = issues.len(),
        warnings = warnings.len(),
        "draft validated"
    );

    Ok(ValidationReport {
        platform,
        issues,
        warnings,
        recommendations: rules.recommendations.clone(),
        passed,
        title_length,
        description_length,
    })
}

/// Counts whole-word, case-insensitive occurrences of `phrase` in `text`.
fn whole_word_occurrences(text: &str, phrase: &str) -> usize {
    let pattern = format!(r"(?i)\b{}\b", regex::escape(phrase));
    // Escaped literals always compile.
    let re = Regex::new(&pattern).expect("escaped keyword pattern");
    re.find_iter(text).count()
}
