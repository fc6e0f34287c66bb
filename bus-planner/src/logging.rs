//! Tracing subscriber setup.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber.
///
/// The filter comes from `RUST_LOG`; an unset or invalid value falls back to
/// `info`. Calling this twice leaves the first subscriber in place.
pub fn init() {
    let default_level = LevelFilter::INFO;
    let filter = std::env::var(EnvFilter::DEFAULT_ENV)
        .ok()
        .and_then(|directives| match EnvFilter::try_new(&directives) {
            Ok(filter) => Some(filter),
            Err(err) => {
                eprintln!(
                    "invalid {}, falling back to level '{default_level}': {err}",
                    EnvFilter::DEFAULT_ENV
                );
                None
            }
        })
        .unwrap_or_else(|| EnvFilter::new(default_level.to_string()));

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init();
        init();
        tracing::info!("logging initialised");
    }
}
