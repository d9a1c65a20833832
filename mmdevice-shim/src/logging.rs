//! Tracing subscriber setup for the probe binary and the C ABI.

use tracing::warn;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "mmdevice_shim=info";

/// Install a formatting subscriber.
///
/// An explicit `filter` wins; otherwise `RUST_LOG` is used, then
/// `mmdevice_shim=info`. An explicit filter that fails to parse falls back
/// to the default and is reported at `warn`. Returns false if a global
/// subscriber was already installed, which makes repeated calls harmless.
pub fn init(filter: Option<&str>) -> bool {
    let (env_filter, rejected) = match filter.map(EnvFilter::try_new) {
        Some(Ok(env_filter)) => (env_filter, None),
        Some(Err(error)) => (EnvFilter::new(DEFAULT_FILTER), Some(error)),
        None => (
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
            None,
        ),
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok();

    // Reported after installation so the warning has a subscriber to reach
    if let Some(error) = rejected {
        warn!(?filter, %error, "ignoring invalid log filter, using {DEFAULT_FILTER}");
    }
    installed
}
