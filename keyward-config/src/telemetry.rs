use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::models::Environment;

pub use tracing_subscriber::util::TryInitError;

/// Install the global subscriber for `env`.
///
/// `RUST_LOG` takes precedence over the environment's default level. `local`
/// gets human-readable output; `dev` and `prod` log JSON lines.
pub fn init_tracing(env: Environment) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(env.default_log_filter()));
    let registry = tracing_subscriber::registry().with(filter);

    if env.json_logs() {
        registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init()
    } else {
        registry.with(fmt::layer().pretty()).try_init()
    }
}
