use tracing_subscriber::EnvFilter;

/// Installs a formatting subscriber filtered by `RUST_LOG`, defaulting to
/// `info`. Calling it again once a subscriber is installed is a no-op.
pub fn init_tracing() {
    init_tracing_with("info");
}

/// Like [`init_tracing`] with an explicit fallback directive used when
/// `RUST_LOG` is unset or invalid.
pub fn init_tracing_with(default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_initialisation_is_harmless() {
        init_tracing_with("debug");
        init_tracing();
        tracing::info!("subscriber installed");
    }
}
