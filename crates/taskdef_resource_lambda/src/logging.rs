use std::sync::OnceLock;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Installs the process-wide tracing subscriber once.
///
/// Output is JSON by default so CloudWatch Logs Insights can parse fields;
/// `TASKDEF_LOG_FORMAT=text` switches to compact text for local runs. The
/// filter defaults to `info` when `RUST_LOG` is unset.
pub fn init_tracing() {
    TRACING_INIT.get_or_init(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let text = std::env::var("TASKDEF_LOG_FORMAT")
            .map(|value| value.eq_ignore_ascii_case("text"))
            .unwrap_or(false);

        // Lambda already stamps every line with the ingestion time.
        let result = if text {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().compact().without_time())
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_current_span(false).without_time())
                .try_init()
        };

        if let Err(err) = result {
            eprintln!("tracing init skipped: {err}");
        }
    });
}
