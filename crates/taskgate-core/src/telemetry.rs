//! Tracing subscriber setup for the `taskgate` binary.
//!
//! Filter precedence: `TASKGATE_LOG`, then `RUST_LOG`, then the level passed
//! to [`init_tracing`] applied to the taskgate crates only (dependencies such
//! as the HTTP client stay at `warn`).
//!
//! JSON lines carry the enclosing `taskgate.run` span so every event of a run
//! can be grouped by `run_id`.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable with a taskgate-specific filter directive.
pub const ENV_LOG: &str = "TASKGATE_LOG";

/// Filter used when neither `TASKGATE_LOG` nor `RUST_LOG` is set.
pub fn default_directives(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    format!("warn,taskgate_core={level},taskgate={level}")
}

fn build_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_env(ENV_LOG)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

/// Install the global subscriber. Logs go to stderr; stdout is left for
/// command output. Later calls are no-ops.
pub fn init_tracing(json: bool, level: Level) {
    let registry = tracing_subscriber::registry().with(build_filter(level));

    let installed = if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };

    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
