//! Stage orchestration for AsoWorks.
//!
//! The [`StageRunner`] drives the four stages in fixed order — keyword
//! research, competitor analysis, content generation, aggregation — feeding
//! each collaborator the accumulated session state, validating every draft
//! inline, and ranking deterministically at the end. Collaborator calls are
//! retried per [`RetryConfig`]; the deterministic core is never retried.
//!
//! ## Architectural Layer
//!
//! **Orchestration.** This crate sequences calls between the domain logic in
//! [`pipeline`] and whatever implements the collaborator ports. It adds no
//! domain rules of its own.

pub mod retry;
pub mod runner;
pub mod scripted;

pub use retry::{with_retry, RetryConfig};
pub use runner::{RunnerConfig, RunnerError, StageRunner};
pub use scripted::{ReplayScript, ScriptedAnalyst, ScriptedResearcher, ScriptedWriter};
