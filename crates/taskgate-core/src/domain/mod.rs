//! Domain models for taskgate.
//!
//! Canonical definitions for the artifacts a run produces:
//! - `TaskSpec`: the declarative request
//! - `OrchestratedPlan`: the normalized request bound to a run
//! - `PreflightReport`: token/cost estimate and budget approval
//! - `ExecutionPackage`: the contract handed to the worker
//! - `WorkerOutput`: what the worker produced
//! - `AuditReport`: one of four post-execution judgments
//! - `FinalReleaseArtifact`: the release decision

pub mod audit;
pub mod error;
pub mod package;
pub mod plan;
pub mod preflight;
pub mod release;
pub mod task;
pub mod worker;

pub use audit::{AuditKind, AuditReport, AuditStatus};
pub use error::{Result, TaskgateError, ValidationError};
pub use package::{ExecutionPackage, IoSchemas, PackageTest, PackageTools};
pub use plan::{Complexity, DerivedMetrics, OrchestratedPlan};
pub use preflight::{CostEstimate, PreflightReport, RecommendedCaps, TokenEstimate};
pub use release::{AuditTally, FinalReleaseArtifact, NextAction, ReleaseStatus};
pub use task::{Budget, RiskLevel, Skill, TaskSpec, TaskTools, ToolAllowList};
pub use worker::{ToolCallRecord, WorkerOutput, WorkerStatus};
