//! Core domain for AsoWorks.
//!
//! This crate contains every domain concept used throughout the listing
//! pipeline: the value types and their invariants, the guideline compliance
//! validator, the variant-ranking rubric, the session-state contract, the
//! error taxonomy, and the port traits the external stage collaborators
//! implement.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* a run accumulates and how drafts are judged; the
//! `stages` crate sequences the work, and infrastructure adapters supply the
//! collaborators.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype domain identifiers (`StrategyLabel`, `PipelineRunId`, …) |
//! | [`types`] | Shared value types (`ListingDraft`, `KeywordSet`, `Platform`, …) |
//! | [`compliance`] | Guideline rules tables and the compliance validator |
//! | [`ranking`] | The fixed scoring rubric and variant selection |
//! | [`state`] | The write-once/append-only session state for one run |
//! | [`errors`] | Error taxonomy and retry-policy types |
//! | [`ports`] | Traits the external stage collaborators implement |

pub mod compliance;
pub mod errors;
pub mod identifiers;
pub mod ports;
pub mod ranking;
pub mod state;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use compliance::{validate, ComplianceRules, PlatformLimits, ValidationReport};
pub use errors::{AsoWorksError, RetryPolicy, StageError};
pub use identifiers::{AppName, PipelineRunId, StrategyLabel};
pub use ports::{CompetitorAnalyst, ContentWriter, KeywordResearcher};
pub use ranking::{rank, RecommendationRecord, ScoreCriterion};
pub use state::{Phase, PipelineState, StageKind, ValidatedDraft};
pub use types::{AppBrief, Keyword, KeywordSet, ListingDraft, Platform, StoreTarget, Timestamp};
