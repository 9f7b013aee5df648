//! Taskgate Core Library
//!
//! Cost-bounded, capability-scoped decision pipeline for model-driven workers:
//! normalize a task, price it, pick a model tier, package it for a worker,
//! execute under tool authorization, audit the result and decide on release.

pub mod audit;
pub mod capability;
pub mod config;
pub mod domain;
pub mod escalation;
pub mod metrics;
pub mod normalize;
pub mod obs;
pub mod package;
pub mod pipeline;
pub mod planner;
pub mod preflight;
pub mod provider;
pub mod release;
pub mod store;
pub mod telemetry;
pub mod transport;
pub mod validation;
pub mod worker;

pub use domain::{
    AuditKind, AuditReport, AuditStatus, AuditTally, Budget, ExecutionPackage,
    FinalReleaseArtifact, NextAction, OrchestratedPlan, PreflightReport, ReleaseStatus, Result,
    RiskLevel, Skill, TaskSpec, TaskgateError, ToolCallRecord, ValidationError, WorkerOutput,
    WorkerStatus,
};

pub use audit::{run_audits, AuditContext, AuditSet};
pub use capability::{
    authorize, AuthorizationDecision, JsonlTraceLog, MemoryTraceLog, RouteError, ToolCall,
    ToolRouter, TraceEntry, TraceRecorder, TraceStatus,
};
pub use config::{ModelLadder, ModelPrice, PipelineConfig};
pub use escalation::{select_model, EscalationInput, EscalationRule, ModelDecision};
pub use normalize::{normalize_task, orchestrate};
pub use package::build_package;
pub use pipeline::{Pipeline, RunFailure, RunOutcome, RunResponse, RunSummary};
pub use planner::{plan_skills, SkillPlan};
pub use preflight::run_preflight;
pub use provider::{provider_from_env, LlmProvider, OpenAiProvider, SyntheticProvider};
pub use release::run_release_gate;
pub use metrics::METRICS;
pub use store::{ArtifactLocator, ArtifactStore, FsArtifactStore, MemoryArtifactStore, StoreError};
pub use telemetry::init_tracing;
pub use transport::{ServerRegistry, StubTransport, ToolTransport};
pub use validation::{validate, SchemaKind};
pub use worker::run_worker;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
