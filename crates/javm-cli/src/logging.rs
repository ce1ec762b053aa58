//! Tracing subscriber setup

use anyhow::Context;
use tracing_subscriber::EnvFilter;

/// Filter used when neither `--log` nor `RUST_LOG` is set
pub const DEFAULT_FILTER: &str = "warn";

/// Build the log filter: explicit directives win over `RUST_LOG`
pub fn filter(directives: Option<&str>) -> anyhow::Result<EnvFilter> {
    match directives {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter '{}'", directives)),
        None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

/// Install the global subscriber, writing to stderr
pub fn init(directives: Option<&str>) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(filter(directives)?)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(anyhow::Error::msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_filter() {
        let filter = filter(Some("javm_core=debug,warn")).unwrap();
        assert!(filter.to_string().contains("javm_core=debug"));
    }

    #[test]
    fn test_invalid_filter_rejected() {
        assert!(filter(Some("javm_core=loud")).is_err());
    }
}
