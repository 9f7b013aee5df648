//! Capability-scoped tool boundary.
//!
//! # Modules
//!
//! - [`scope`]: allow-set intersection and the pure authorization predicate
//! - [`trace`]: append-only trace of every authorization decision
//! - [`router`]: authorize, trace, then invoke the transport under a timeout
//! - [`error`]: denial and routing failures

pub mod error;
pub mod router;
pub mod scope;
pub mod trace;

pub use error::{CapabilityError, RouteError, RouteResult};
pub use router::ToolRouter;
pub use scope::{
    allowed_for_skill, authorize, intersect, package_scope, AuthorizationDecision, ToolCall,
    DENIAL_REASON,
};
pub use trace::{JsonlTraceLog, MemoryTraceLog, TraceEntry, TraceRecorder, TraceStatus, TRACE_FILE_NAME};
